/// Markers opening the item section of RSS and Atom documents.
const ITEM_MARKERS: &[&str] = &["<item", "<entry"];

/// Replace HTML entities (`&lt;`, `&amp;`, `&#8217;`...) with their characters.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// The part of a feed document that carries its items, without the channel
/// envelope. Documents without items are returned whole.
pub fn content_body(text: &str) -> &str {
    let start = ITEM_MARKERS.iter().filter_map(|m| text.find(m)).min();

    match start {
        Some(index) => text[index..].trim(),
        None => text.trim(),
    }
}
