//! Unified error type.

use std::io;

/// Everything that can go wrong while writing a response.
///
/// None of these ever reach the caller of a [`Responder`](crate::Responder)
/// operation. They are handed to the [`ErrorLogger`](crate::ErrorLogger) and
/// the response degrades to `500 Internal Server Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The payload could not be converted to JSON.
    #[error("failed to marshal JSON response: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The payload serialized to the literal `null`.
    #[error("marshalled body was null")]
    NullBody,

    /// The sink rejected the body bytes.
    #[error("failed to write JSON body to response: {0}")]
    Write(#[from] io::Error),

    /// The sink accepted only part of the body.
    #[error("short write to response: wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// The redirect target does not parse as a URL or URL reference.
    #[error("invalid redirect location {location:?}: {source}")]
    InvalidLocation {
        location: String,
        #[source]
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_step() {
        assert_eq!(Error::NullBody.to_string(), "marshalled body was null");

        let e = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
        assert_eq!(e.to_string(), "failed to write JSON body to response: peer gone");

        let e = Error::ShortWrite { written: 3, expected: 10 };
        assert_eq!(e.to_string(), "short write to response: wrote 3 of 10 bytes");
    }

    #[test]
    fn io_failure_is_exposed_as_source() {
        use std::error::Error as _;

        let e = Error::from(io::Error::other("boom"));
        let source = e.source().expect("write error carries its io cause");
        assert_eq!(source.to_string(), "boom");
    }
}
