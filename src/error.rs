//! Crate error type
//!
//! Only `Setup` is fatal, and only before the render loop is running.
//! Detection and extraction failures are absorbed by the detection feed.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Camera, detector, canvas or frame-size setup failed
    Setup(String),
    /// A single detector call failed
    Detection(String),
    /// Malformed detector output (e.g. a landmark set with no points)
    InvalidInput(String),
    /// Settings failed to parse or validate
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Setup(msg) => write!(f, "setup error: {msg}"),
            Error::Detection(msg) => write!(f, "detection error: {msg}"),
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
