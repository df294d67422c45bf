use std::sync::Arc;

use async_trait::async_trait;
use bibler_core::CatalogConfig;

use crate::error::Result;
use crate::googlebooks::GoogleBooksClient;
use crate::openlibrary::Suggestion;

const COVERS_BASE_URL: &str = "https://covers.openlibrary.org";

/// Everything known about a book when we go hunting for its cover.
#[derive(Debug, Clone, Default)]
pub struct CoverCandidate {
    pub title: String,
    pub author: String,
    pub isbns: Vec<String>,
    pub cover_id: Option<i64>,
}

impl From<&Suggestion> for CoverCandidate {
    fn from(suggestion: &Suggestion) -> Self {
        Self {
            title: suggestion.title.clone(),
            author: suggestion.author.clone(),
            isbns: suggestion.isbns.clone(),
            cover_id: suggestion.cover_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCover {
    pub url: String,
    pub source: String,
}

/// One rung of the resolution ladder. Returning `Ok(None)` means the
/// source does not apply to this candidate or came up empty; an error
/// is logged by the resolver and the chain moves on.
#[async_trait]
pub trait CoverSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn resolve(&self, candidate: &CoverCandidate) -> Result<Option<ResolvedCover>>;
}

/// Google volumes queried per ISBN; modern editions usually have the
/// best scans. One ISBN failing does not stop the loop.
struct GoogleByIsbn {
    client: Arc<GoogleBooksClient>,
}

#[async_trait]
impl CoverSource for GoogleByIsbn {
    fn name(&self) -> &'static str {
        "google-isbn"
    }

    async fn resolve(&self, candidate: &CoverCandidate) -> Result<Option<ResolvedCover>> {
        for isbn in &candidate.isbns {
            match self.client.by_isbn(isbn).await {
                Ok(Some(url)) => {
                    return Ok(Some(ResolvedCover {
                        url,
                        source: "google".to_string(),
                    }));
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("google cover lookup for isbn {isbn} failed: {e}"),
            }
        }
        Ok(None)
    }
}

/// Open Library's by-ISBN cover endpoint. The URL is constructed rather
/// than fetched, so any candidate with an ISBN resolves here.
struct OpenLibraryByIsbn {
    covers_base_url: String,
}

#[async_trait]
impl CoverSource for OpenLibraryByIsbn {
    fn name(&self) -> &'static str {
        "openlibrary-isbn"
    }

    async fn resolve(&self, candidate: &CoverCandidate) -> Result<Option<ResolvedCover>> {
        Ok(candidate.isbns.first().map(|isbn| ResolvedCover {
            url: format!("{}/b/isbn/{isbn}-L.jpg", self.covers_base_url),
            source: "openlibrary".to_string(),
        }))
    }
}

/// Open Library by numeric cover id, also constructed.
struct OpenLibraryByCoverId {
    covers_base_url: String,
}

#[async_trait]
impl CoverSource for OpenLibraryByCoverId {
    fn name(&self) -> &'static str {
        "openlibrary-cover-id"
    }

    async fn resolve(&self, candidate: &CoverCandidate) -> Result<Option<ResolvedCover>> {
        Ok(candidate.cover_id.map(|id| ResolvedCover {
            url: format!("{}/b/id/{id}-L.jpg", self.covers_base_url),
            source: "openlibrary".to_string(),
        }))
    }
}

/// Last resort: Google by title and author.
struct GoogleByQuery {
    client: Arc<GoogleBooksClient>,
}

#[async_trait]
impl CoverSource for GoogleByQuery {
    fn name(&self) -> &'static str {
        "google-query"
    }

    async fn resolve(&self, candidate: &CoverCandidate) -> Result<Option<ResolvedCover>> {
        if candidate.title.is_empty() {
            return Ok(None);
        }
        let url = self
            .client
            .by_query(&candidate.title, &candidate.author)
            .await?;
        Ok(url.map(|url| ResolvedCover {
            url,
            source: "google".to_string(),
        }))
    }
}

/// Runs the sources in order and keeps the first hit. Total failure
/// yields `None` and the caller stays on the placeholder cover.
pub struct CoverResolver {
    sources: Vec<Box<dyn CoverSource>>,
}

impl CoverResolver {
    pub fn new(google: Arc<GoogleBooksClient>, covers_base_url: &str) -> Self {
        Self {
            sources: vec![
                Box::new(GoogleByIsbn {
                    client: Arc::clone(&google),
                }),
                Box::new(OpenLibraryByIsbn {
                    covers_base_url: covers_base_url.to_string(),
                }),
                Box::new(OpenLibraryByCoverId {
                    covers_base_url: covers_base_url.to_string(),
                }),
                Box::new(GoogleByQuery { client: google }),
            ],
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(
            Arc::new(GoogleBooksClient::from_config(config)),
            &config.covers_base_url,
        )
    }

    pub async fn resolve_best_cover(&self, candidate: &CoverCandidate) -> Option<ResolvedCover> {
        for source in &self.sources {
            match source.resolve(candidate).await {
                Ok(Some(cover)) => return Some(cover),
                Ok(None) => {}
                Err(e) => tracing::warn!("cover source {} failed: {e}", source.name()),
            }
        }
        None
    }
}

impl Default for CoverResolver {
    fn default() -> Self {
        Self::new(Arc::new(GoogleBooksClient::new(None)), COVERS_BASE_URL)
    }
}
