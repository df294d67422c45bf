use bibler_core::{BookDraft, CatalogConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::http::HttpClient;

const BASE_URL: &str = "https://openlibrary.org";
const COVERS_BASE_URL: &str = "https://covers.openlibrary.org";
const SUGGEST_LIMIT: usize = 5;
const MAX_ISBNS: usize = 5;

/// Words too common, in Spanish or English, to anchor a search on.
const STOPWORDS: &[&str] = &[
    "el", "la", "los", "las", "de", "del", "the", "a", "an", "y", "o", "en", "un", "una",
];

fn has_relevant_token(query: &str) -> bool {
    query
        .split_whitespace()
        .any(|t| t.chars().count() >= 4 && !STOPWORDS.contains(&t.to_lowercase().as_str()))
}

/// One search hit, trimmed down to what the add form needs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Suggestion {
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub cover_id: Option<i64>,
    pub isbns: Vec<String>,
}

impl Suggestion {
    pub fn from_doc(v: &Value, covers_base_url: &str) -> Self {
        let title = v
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let author = v
            .get("author_name")
            .and_then(Value::as_array)
            .and_then(|arr| arr.first())
            .and_then(Value::as_str)
            .or_else(|| v.get("author_name").and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();

        let cover_id = v.get("cover_i").and_then(Value::as_i64);
        let cover_url = cover_id.map(|id| format!("{covers_base_url}/b/id/{id}-M.jpg"));

        let isbns = v
            .get("isbn")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .take(MAX_ISBNS)
                    .map(ToOwned::to_owned)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Self {
            title,
            author,
            cover_url,
            cover_id,
            isbns,
        }
    }

    /// Prefill for the add form. The medium cover stands in until the
    /// resolver chain has picked a better one.
    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            status: None,
            cover: self.cover_url.clone(),
        }
    }
}

pub struct OpenLibraryClient {
    client: HttpClient,
    base_url: String,
    covers_base_url: String,
    limit: usize,
}

impl OpenLibraryClient {
    pub fn new() -> Self {
        Self::with_params(BASE_URL, COVERS_BASE_URL, SUGGEST_LIMIT)
    }

    pub fn with_params(base_url: &str, covers_base_url: &str, limit: usize) -> Self {
        Self {
            client: HttpClient::new("bibler-catalog/0.1"),
            base_url: base_url.to_string(),
            covers_base_url: covers_base_url.to_string(),
            limit,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::with_params(
            &config.open_library_base_url,
            &config.covers_base_url,
            config.suggest_limit,
        )
    }

    /// Top search hits for a query typed into the add form. A query whose
    /// every token is shorter than four characters or a stopword returns
    /// empty without touching the network.
    pub async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>> {
        if !has_relevant_token(query) {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/search.json?q={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            self.limit
        );
        let json: Value = self.client.get_json(&url).await?;

        let suggestions = json
            .get("docs")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .take(self.limit)
                    .map(|doc| Suggestion::from_doc(doc, &self.covers_base_url))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(suggestions)
    }

    /// Like `suggest`, but a failed lookup degrades to no suggestions.
    pub async fn suggest_or_empty(&self, query: &str) -> Vec<Suggestion> {
        match self.suggest(query).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::warn!("suggestion lookup failed: {e}");
                Vec::new()
            }
        }
    }
}

impl Default for OpenLibraryClient {
    fn default() -> Self {
        Self::new()
    }
}
