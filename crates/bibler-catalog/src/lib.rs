//! Remote metadata for the add flow: Open Library suggestions, Google
//! Books covers, and the chain that picks the best cover available.

pub mod error;
pub mod http;
pub mod gate;
pub mod openlibrary;
pub mod googlebooks;
pub mod covers;

pub use covers::{CoverCandidate, CoverResolver, CoverSource, ResolvedCover};
pub use error::{CatalogError, Result};
pub use gate::{RequestGate, RequestToken};
pub use googlebooks::GoogleBooksClient;
pub use openlibrary::{OpenLibraryClient, Suggestion};
