//! Client for the external dictionary service (pronunciation and
//! suggestion lookups). One attempt per call; failures surface as
//! [`DictionaryError`] and become `502` at the HTTP boundary.

use std::io::Read;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("dictionary service returned HTTP {0}")]
    Status(u16),

    #[error("dictionary service unreachable: {0}")]
    Transport(String),

    #[error("dictionary response unreadable: {0}")]
    Body(#[from] std::io::Error),

    #[error("dictionary service error {code}: {message}")]
    Api { code: i64, message: String },
}

impl From<ureq::Error> for DictionaryError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => Self::Status(code),
            ureq::Error::Transport(transport) => Self::Transport(transport.to_string()),
        }
    }
}

/// One suggestion returned for a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub explain: String,
    #[serde(default)]
    pub entry: String,
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    result: SuggestStatus,
    #[serde(default)]
    data: Option<SuggestData>,
}

#[derive(Debug, Deserialize)]
struct SuggestStatus {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestData {
    #[serde(default)]
    entries: Vec<Translation>,
}

fn suggestions(response: SuggestResponse) -> Result<Vec<Translation>, DictionaryError> {
    if response.result.code != 200 {
        return Err(DictionaryError::Api {
            code: response.result.code,
            message: response.result.msg.unwrap_or_default(),
        });
    }
    Ok(response.data.map(|d| d.entries).unwrap_or_default())
}

/// Blocking HTTP client; call from `spawn_blocking`.
#[derive(Clone)]
pub struct DictionaryClient {
    agent: ureq::Agent,
    base_url: String,
}

impl DictionaryClient {
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// MP3 pronunciation of `word`.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx status, or an unreadable body.
    pub fn voice(&self, word: &str) -> Result<Vec<u8>, DictionaryError> {
        let url = format!("{}/dictvoice", self.base_url);
        debug!(%url, word, "fetching pronunciation");
        let response = self
            .agent
            .get(&url)
            .query("audio", word)
            .query("type", "1")
            .call()?;

        let mut bytes = Vec::new();
        response.into_reader().read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Suggestions for `word`.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx status, malformed JSON, or a
    /// `result.code` other than 200.
    pub fn translate(&self, word: &str) -> Result<Vec<Translation>, DictionaryError> {
        let url = format!("{}/suggest", self.base_url);
        debug!(%url, word, "fetching suggestions");
        let response: SuggestResponse = self
            .agent
            .get(&url)
            .query("q", word)
            .query("le", "zh")
            .query("doctype", "json")
            .call()?
            .into_json()?;
        suggestions(response)
    }
}
