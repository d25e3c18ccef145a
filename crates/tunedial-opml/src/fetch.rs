//! Fetch primitive: URL or local path to raw bytes.
//!
//! The core is single-threaded and synchronous, so fetches are blocking
//! calls; the UI loop draws each progress message before the next one
//! proceeds. The trait seam exists so tests can substitute an in-memory
//! fetcher.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::FetchError;

/// Where a document or playlist comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    /// `http(s)://…` is a URL, anything else a local path.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::Path(PathBuf::from(s))
        }
    }
}

pub trait Fetch {
    fn fetch(&self, source: &Source) -> Result<Vec<u8>, FetchError>;
}

/// Production fetcher: blocking reqwest for URLs, `std::fs` for paths.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, source: &Source) -> Result<Vec<u8>, FetchError> {
        match source {
            Source::Url(url) => {
                let response = self.client.get(url).send()?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        status: status.as_u16(),
                        url: url.clone(),
                    });
                }
                Ok(response.bytes()?.to_vec())
            }
            Source::Path(path) => std::fs::read(path).map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_parse_distinguishes_urls_from_paths() {
        assert_eq!(
            Source::parse("https://opml.radiotime.com/"),
            Source::Url("https://opml.radiotime.com/".to_string())
        );
        assert_eq!(
            Source::parse("/home/me/favourites.opml"),
            Source::Path(PathBuf::from("/home/me/favourites.opml"))
        );
    }
}
