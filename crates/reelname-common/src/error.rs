//! Common error types used throughout reelname.
//!
//! The variants mirror the four ways a metadata lookup can go wrong: the
//! network failed, the upstream answered but had nothing, the answer could
//! not be understood, or the provider was never configured. Filesystem and
//! input errors round it out for the rename front end.

/// Common error type for reelname.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Timeout, DNS failure, refused connection, or a non-success status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The upstream rejected the credential (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A well-formed response that contained no match.
    #[error("No match upstream: {0}")]
    UpstreamEmpty(String),

    /// A response whose shape did not match what the provider expects.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A required credential or setting is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new Transport error.
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new Unauthorized error.
    pub fn unauthorized<S: Into<String>>(msg: S) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Create a new UpstreamEmpty error.
    pub fn upstream_empty<S: Into<String>>(msg: S) -> Self {
        Self::UpstreamEmpty(msg.into())
    }

    /// Create a new Parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new Configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this failure came from the network layer rather than the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Unauthorized(_) | Self::Io(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::transport("connection refused");
        assert_eq!(err.to_string(), "Transport error: connection refused");

        let err = Error::unauthorized("tvdb returned HTTP 401");
        assert_eq!(err.to_string(), "Unauthorized: tvdb returned HTTP 401");
        assert!(err.is_transport());

        let err = Error::upstream_empty("no results for 'Foo'");
        assert_eq!(err.to_string(), "No match upstream: no results for 'Foo'");

        let err = Error::parse("missing field `id`");
        assert_eq!(err.to_string(), "Parse error: missing field `id`");

        let err = Error::configuration("tmdb api key missing");
        assert_eq!(err.to_string(), "Configuration error: tmdb api key missing");

        let err = Error::invalid_input("empty pattern");
        assert_eq!(err.to_string(), "Invalid input: empty pattern");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_transport());
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let err = Error::from(json_err);
        assert!(matches!(err, Error::Parse(_)));
        assert!(!err.is_transport());
    }
}
