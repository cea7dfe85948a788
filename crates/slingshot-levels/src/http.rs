//! Client for the level storage API.
//!
//! ```text
//! GET    {base}/levels/{id}   -> { "blocks": [...] }
//! POST   {base}/levels        <- { "blocks": [...] }   -> { "id": "...", "message": "..." }
//! PUT    {base}/levels/{id}   <- { "blocks": [...] }
//! DELETE {base}/levels/{id}
//! ```
//!
//! Uses the blocking reqwest client: levels are loaded once at startup,
//! sequentially, before the frame loop begins.

use serde::Deserialize;

use crate::document::{Level, LevelDocument};
use crate::source::{LevelSink, LevelSource};
use crate::LevelError;

/// Base URL of the storage API used by the level editor.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api/v1";

#[derive(Debug, Deserialize)]
struct SaveResponse {
    id: String,
}

/// [`LevelSource`] / [`LevelSink`] over the HTTP storage API.
#[derive(Debug, Clone)]
pub struct HttpLevelSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpLevelSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn level_url(&self, id: &str) -> String {
        format!("{}/levels/{}", self.base_url, encode_segment(id))
    }

    fn http_err(id: &str, details: impl std::fmt::Display) -> LevelError {
        LevelError::Http {
            id: id.to_owned(),
            details: details.to_string(),
        }
    }

    fn check(
        id: &str,
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, LevelError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LevelError::NotFound { id: id.to_owned() });
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Self::http_err(id, format!("status {status}: {body}")));
        }
        Ok(response)
    }
}

impl Default for HttpLevelSource {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl LevelSource for HttpLevelSource {
    fn fetch(&self, id: &str) -> Result<Level, LevelError> {
        let response = self
            .client
            .get(self.level_url(id))
            .send()
            .map_err(|e| Self::http_err(id, e))?;
        let text = Self::check(id, response)?
            .text()
            .map_err(|e| Self::http_err(id, e))?;
        let document: LevelDocument =
            serde_json::from_str(&text).map_err(|source| LevelError::Parse {
                id: id.to_owned(),
                source,
            })?;
        Ok(Level::new(id, document))
    }
}

impl LevelSink for HttpLevelSource {
    fn save(&mut self, id: Option<&str>, document: &LevelDocument) -> Result<String, LevelError> {
        match id {
            Some(id) => {
                let response = self
                    .client
                    .put(self.level_url(id))
                    .json(document)
                    .send()
                    .map_err(|e| Self::http_err(id, e))?;
                Self::check(id, response)?;
                Ok(id.to_owned())
            }
            None => {
                let response = self
                    .client
                    .post(format!("{}/levels", self.base_url))
                    .json(document)
                    .send()
                    .map_err(|e| Self::http_err("<new>", e))?;
                let saved: SaveResponse = Self::check("<new>", response)?
                    .json()
                    .map_err(|e| Self::http_err("<new>", e))?;
                Ok(saved.id)
            }
        }
    }

    fn delete(&mut self, id: &str) -> Result<(), LevelError> {
        let response = self
            .client
            .delete(self.level_url(id))
            .send()
            .map_err(|e| Self::http_err(id, e))?;
        Self::check(id, response).map(|_| ())
    }
}

/// Percent-encode a path segment (RFC 3986 unreserved characters pass through).
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_urls_are_encoded() {
        let source = HttpLevelSource::new("http://localhost:3000/api/v1/");
        assert_eq!(source.base_url(), "http://localhost:3000/api/v1");
        assert_eq!(
            source.level_url("my level/2"),
            "http://localhost:3000/api/v1/levels/my%20level%2F2"
        );
        assert_eq!(
            source.level_url("spike1"),
            "http://localhost:3000/api/v1/levels/spike1"
        );
    }

    #[test]
    fn unreachable_server_is_an_http_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let source = HttpLevelSource::new("http://127.0.0.1:9");
        assert!(matches!(
            source.fetch("level1"),
            Err(LevelError::Http { .. })
        ));
    }
}
