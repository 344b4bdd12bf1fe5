//! Metadata lookup across external providers.
//!
//! # Module layout
//!
//! - [`provider`] -- The [`MetadataProvider`] trait and provider descriptors.
//! - [`providers`] -- Concrete implementations for all nine services.
//! - [`registry`] -- Owns the providers and their shared limiters.
//! - [`resolver`] -- Routes a parsed filename through a fallback chain.
//! - [`anidb_titles`] -- AniDB title dump cache and fuzzy title search.
//! - [`rate_limit`] -- Minimum-gap request throttling.
//! - [`http`] -- Shared HTTP plumbing for providers.

pub mod anidb_titles;
pub mod http;
pub mod provider;
pub mod providers;
pub mod rate_limit;
pub mod registry;
pub mod resolver;

pub use anidb_titles::{TitleCache, TitleIndex, TitleMatch};
pub use provider::{MetadataProvider, ProviderDescriptor};
pub use rate_limit::RateLimiter;
pub use registry::ProviderRegistry;
pub use resolver::Resolver;
