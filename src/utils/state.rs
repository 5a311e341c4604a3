use crate::services::news_cache::NewsCache;

#[derive(Clone)]
pub struct AppState {
    pub news_cache: NewsCache,
}
