pub mod http;
pub mod redirect;
pub mod traits;

pub use http::{insecure_variant, HttpFetcher};
pub use traits::Fetcher;
