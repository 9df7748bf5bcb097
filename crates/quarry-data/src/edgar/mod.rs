//! SEC EDGAR access: HTTP client, filing search, and index navigation.

pub mod client;
pub mod index;
pub mod search;

pub use client::{EdgarClient, pad_cik};
pub use index::parse_index_page;
pub use search::{FilingLink, FilingQuery, parse_search_results};
