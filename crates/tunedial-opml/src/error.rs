//! Error taxonomy: format, fetch and persistence failures.
//!
//! None of these are allowed to take down the navigation loop; the app
//! reports them on the status line and carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Malformed or unsupported directory document structure. Fatal to the
/// affected subtree's load, never to sibling state.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid XML attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("invalid XML escape: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("xml write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("`{kind}` outline must not contain nested outlines")]
    UnexpectedChildren { kind: &'static str },

    #[error("outline is missing required attribute `{0}`")]
    MissingAttribute(&'static str),
}

/// Network or IO failure while fetching a document or playlist.
/// Recoverable: the node being activated keeps its state so the user
/// can retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Favourites write failure. Reported but non-fatal; the in-memory
/// favourites stay valid for the rest of the session.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("could not write favourites to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Anything an activation step can surface.
#[derive(Debug, Error)]
pub enum ActivateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Format(#[from] FormatError),
}
