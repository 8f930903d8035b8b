pub mod feed_rs_parser;
pub mod render;
pub mod text;
pub mod traits;

pub use feed_rs_parser::FeedRsParser;
pub use render::{render_unified, RenderedDocument};
pub use traits::FeedParser;
