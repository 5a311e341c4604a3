pub mod fetcher;
pub mod news_cache;
