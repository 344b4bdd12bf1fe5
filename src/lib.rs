//! Reelname - media filename resolution and renaming
//!
//! This library crate exposes the resolver, the providers, and the
//! filename formatter used by the `reelname` binary.
//!
//! ```rust,ignore
//! use reelname::{config::Config, format::format, metadata::Resolver};
//!
//! let config = Config::default();
//! let resolver = Resolver::from_config(&config)?;
//! if let Some(record) = resolver.resolve("The.Mandalorian.S01E02.mkv", None).await {
//!     println!("{}", format(&record, &config.format.tv_pattern));
//! }
//! ```

pub mod config;
pub mod format;
pub mod metadata;
pub mod rename;

pub use format::format;
pub use metadata::Resolver;
