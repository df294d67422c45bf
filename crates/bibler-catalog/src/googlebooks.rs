use bibler_core::CatalogConfig;
use serde_json::Value;

use crate::error::Result;
use crate::http::HttpClient;

const BASE_URL: &str = "https://www.googleapis.com/books/v1";

/// `imageLinks` variants, largest first.
const IMAGE_LINK_KEYS: &[&str] = &[
    "extraLarge",
    "large",
    "medium",
    "small",
    "thumbnail",
    "smallThumbnail",
];

pub struct GoogleBooksClient {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_params(BASE_URL, api_key)
    }

    pub fn with_params(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: HttpClient::new("bibler-catalog/0.1"),
            base_url: base_url.to_string(),
            api_key,
        }
    }

    /// The API key is read from the environment variable named in the
    /// config; covers still resolve without one, at a lower quota.
    pub fn from_config(config: &CatalogConfig) -> Self {
        let api_key = std::env::var(&config.google_books_api_key_env)
            .ok()
            .filter(|key| !key.is_empty());
        Self::with_params(&config.google_books_base_url, api_key)
    }

    /// Cover URL for an exact ISBN match, when the volume carries images.
    pub async fn by_isbn(&self, isbn: &str) -> Result<Option<String>> {
        let url = self.volumes_url(&format!("isbn:{isbn}"), None);
        let json: Value = self.client.get_json(&url).await?;
        Ok(pick_image_link(&json))
    }

    /// Cover URL for the best title/author match.
    pub async fn by_query(&self, title: &str, author: &str) -> Result<Option<String>> {
        let query = if author.is_empty() {
            title.to_string()
        } else {
            format!("{title} inauthor:{author}")
        };
        let url = self.volumes_url(&query, Some(1));
        let json: Value = self.client.get_json(&url).await?;
        Ok(pick_image_link(&json))
    }

    fn volumes_url(&self, query: &str, max_results: Option<u32>) -> String {
        let mut url = format!("{}/volumes?q={}", self.base_url, urlencoding::encode(query));
        if let Some(max) = max_results {
            url.push_str(&format!("&maxResults={max}"));
        }
        if let Some(key) = &self.api_key {
            url.push_str(&format!("&key={}", urlencoding::encode(key)));
        }
        url
    }
}

/// First populated image link of the first volume, upgraded to https.
fn pick_image_link(response: &Value) -> Option<String> {
    let links = response
        .get("items")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|vol| vol.get("volumeInfo"))
        .and_then(|info| info.get("imageLinks"))?;

    IMAGE_LINK_KEYS
        .iter()
        .find_map(|key| {
            links
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .map(upgrade_to_https)
}

fn upgrade_to_https(url: &str) -> String {
    match url.strip_prefix("http:") {
        Some(rest) => format!("https:{rest}"),
        None => url.to_string(),
    }
}
