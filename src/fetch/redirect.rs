use std::sync::LazyLock;

use regex::Regex;

const REDIRECT_CLOSE: &str = "</redirect>";

static NEW_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<newLocation>(.*?)</newLocation>").expect("new location pattern is valid")
});

/// Target URL of an in-body redirect directive, if the body carries one.
///
/// The directive looks like
/// `<redirect><newLocation>https://new.example/feed</newLocation></redirect>`.
pub fn resolve(body: &str) -> Option<String> {
    if !body.contains(REDIRECT_CLOSE) {
        return None;
    }

    let target = NEW_LOCATION.captures(body)?.get(1)?.as_str().trim();
    if target.is_empty() {
        None
    } else {
        Some(target.to_string())
    }
}
