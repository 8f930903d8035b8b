use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::domain::{FeedInfo, FeedItem};

/// A standalone HTML page ready to be opened.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub title: String,
    pub html: String,
}

pub fn render_feed(info: &FeedInfo, title: &str) -> RenderedDocument {
    RenderedDocument {
        title: title.to_string(),
        html: render_page(title, info.channel.link.as_deref(), &info.items, false),
    }
}

/// One page for items gathered from several feeds; each item names its source.
pub fn render_unified(title: &str, items: &[FeedItem]) -> RenderedDocument {
    RenderedDocument {
        title: title.to_string(),
        html: render_page(title, None, items, true),
    }
}

fn render_page(title: &str, link: Option<&str>, items: &[FeedItem], show_source: bool) -> String {
    let mut html = String::with_capacity(1024 + items.len() * 512);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", encode_text(title)));
    html.push_str("</head>\n<body>\n");

    match link {
        Some(href) => html.push_str(&format!(
            "<h1><a href=\"{}\">{}</a></h1>\n",
            encode_double_quoted_attribute(href),
            encode_text(title)
        )),
        None => html.push_str(&format!("<h1>{}</h1>\n", encode_text(title))),
    }

    for item in items {
        html.push_str("<article class=\"item\">\n");
        match item.link.as_deref() {
            Some(href) => html.push_str(&format!(
                "<h2><a href=\"{}\">{}</a></h2>\n",
                encode_double_quoted_attribute(href),
                encode_text(&item.title)
            )),
            None => html.push_str(&format!("<h2>{}</h2>\n", encode_text(&item.title))),
        }

        let mut meta = Vec::new();
        if show_source {
            meta.push(encode_text(&item.source).into_owned());
        }
        if let Some(published) = item.published {
            meta.push(published.format("%Y-%m-%d %H:%M").to_string());
        }
        if !meta.is_empty() {
            html.push_str(&format!("<p class=\"meta\">{}</p>\n", meta.join(" · ")));
        }

        // Descriptions are feed-provided markup and are kept as such.
        if let Some(description) = item.description.as_deref() {
            html.push_str(&format!("<div class=\"description\">{}</div>\n", description));
        }
        html.push_str("</article>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
