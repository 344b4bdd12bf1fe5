//! Reelname-Common: Shared types, records, and utilities.
//!
//! This crate provides the vocabulary shared by the parser, the provider
//! clients, and the resolver:
//!
//! - **Core Types**: [`MediaType`] classification and [`ProviderKind`] names
//! - **Records**: the normalized [`MetadataRecord`] every provider produces
//! - **Path Utilities**: media extension detection and stripping
//! - **Error Handling**: the provider failure taxonomy and result alias
//!
//! # Examples
//!
//! ```
//! use reelname_common::{MediaType, ProviderKind, Error, Result};
//! use reelname_common::paths::strip_media_extension;
//!
//! let kind: ProviderKind = "tvmaze".parse().unwrap();
//! assert_eq!(kind, ProviderKind::Tvmaze);
//!
//! assert_eq!(MediaType::default(), MediaType::Unknown);
//! assert_eq!(strip_media_extension("Show.S01E01.mkv"), "Show.S01E01");
//!
//! fn example() -> Result<()> {
//!     Err(Error::configuration("tmdb api key missing"))
//! }
//! ```

pub mod error;
pub mod paths;
pub mod record;
pub mod types;

pub use error::{Error, Result};
pub use record::{EpisodeRecord, MetadataRecord, MovieRecord};
pub use types::*;
