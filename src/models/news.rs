use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSource {
    pub id: Option<String>,
    pub name: String,
}

/// A single article as served to clients. `url` identifies it in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsEntry {
    pub title: String,
    pub source: NewsSource,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: String,
    pub author: String,
    pub description: String,
    pub content: String,
}

// Upstream (Bing News) payload. Only `image` and its thumbnail are optional.

#[derive(Debug, Deserialize)]
pub struct UpstreamResponse {
    pub value: Vec<UpstreamArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamArticle {
    pub name: String,
    pub url: String,
    pub date_published: String,
    pub description: String,
    pub provider: Vec<UpstreamProvider>,
    #[serde(default)]
    pub image: Option<UpstreamImage>,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamProvider {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamImage {
    #[serde(default)]
    pub thumbnail: Option<UpstreamThumbnail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamThumbnail {
    pub content_url: String,
}

impl UpstreamArticle {
    /// Returns `None` when the article lists no provider.
    pub fn into_entry(self) -> Option<NewsEntry> {
        let first = self.provider.first()?.name.clone();
        let author = self
            .provider
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Some(NewsEntry {
            title: self.name,
            source: NewsSource {
                id: Some(first.clone()),
                name: first,
            },
            url: self.url,
            url_to_image: self
                .image
                .and_then(|image| image.thumbnail)
                .map(|thumbnail| thumbnail.content_url),
            published_at: self.date_published,
            author,
            content: self.description.clone(),
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_upstream_article() {
        let article: UpstreamArticle = serde_json::from_value(json!({
            "name": "Verstappen wins",
            "url": "https://example.com/a",
            "datePublished": "2025-06-01T10:00:00.0000000Z",
            "description": "Race recap",
            "provider": [{"name": "Reuters"}, {"name": "AP"}],
            "image": {"thumbnail": {"contentUrl": "https://example.com/a.jpg", "width": 700}}
        }))
        .unwrap();

        let entry = article.into_entry().unwrap();
        assert_eq!(entry.title, "Verstappen wins");
        assert_eq!(entry.source.id.as_deref(), Some("Reuters"));
        assert_eq!(entry.source.name, "Reuters");
        assert_eq!(entry.author, "Reuters AP");
        assert_eq!(entry.url_to_image.as_deref(), Some("https://example.com/a.jpg"));
        assert_eq!(entry.description, "Race recap");
        assert_eq!(entry.content, "Race recap");
    }

    #[test]
    fn missing_thumbnail_leaves_image_empty() {
        let article: UpstreamArticle = serde_json::from_value(json!({
            "name": "t",
            "url": "u",
            "datePublished": "d",
            "description": "x",
            "provider": [{"name": "P"}],
            "image": {}
        }))
        .unwrap();
        assert_eq!(article.into_entry().unwrap().url_to_image, None);
    }

    #[test]
    fn article_without_provider_does_not_map() {
        let article: UpstreamArticle = serde_json::from_value(json!({
            "name": "t",
            "url": "u",
            "datePublished": "d",
            "description": "x",
            "provider": []
        }))
        .unwrap();
        assert!(article.into_entry().is_none());
    }

    #[test]
    fn entry_serializes_in_client_shape() {
        let entry = NewsEntry {
            title: "t".into(),
            source: NewsSource {
                id: None,
                name: "s".into(),
            },
            url: "u".into(),
            url_to_image: None,
            published_at: "p".into(),
            author: "a".into(),
            description: "d".into(),
            content: "c".into(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["urlToImage"], serde_json::Value::Null);
        assert_eq!(value["publishedAt"], "p");
        assert_eq!(value["source"]["id"], serde_json::Value::Null);
    }
}
