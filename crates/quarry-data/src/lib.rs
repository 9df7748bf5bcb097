#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/quarry/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod edgar;
pub mod error;

pub use edgar::{EdgarClient, FilingLink, FilingQuery};
pub use error::{DataError, Result};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
