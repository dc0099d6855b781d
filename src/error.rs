use std::{fmt, io, string::FromUtf8Error};

use thiserror::Error;

/// Everything that can stop a document from being rewritten.
///
/// A front matter block that fails to decode is not an error. The document
/// is then formatted as if it had no front matter.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading the input failed.
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),

    /// The input is not UTF-8.
    #[error("input is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// The front matter could not be encoded back to YAML.
    #[error("failed to encode front matter: {0}")]
    Encode(#[from] serde_yaml::Error),

    /// The Markdown body could not be formatted.
    #[error("failed to format markdown: {0}")]
    Render(#[from] fmt::Error),

    /// Writing the output failed.
    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),
}

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
