mod fetcher;
mod http_fetcher;

pub use fetcher::Fetcher;
pub use http_fetcher::{create_http_client, HttpFetcher};
