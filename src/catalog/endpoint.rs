//! A single probeable model endpoint.

use serde::{Deserialize, Serialize};

/// Path appended to an endpoint's base URL when probing.
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// One configured model endpoint, keyed by `(provider, model name)` in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEndpoint {
    /// Base URL of the API, without the `/v1/...` suffix
    pub url: String,
    /// Model identifier sent in the request body
    pub model: String,
    /// Static bearer token
    pub access_token: String,
}

impl ModelEndpoint {
    pub fn new(url: impl Into<String>, model: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            access_token: token.into(),
        }
    }

    /// Full URL of the chat completions route. The base URL is used as-is.
    pub fn completions_url(&self) -> String {
        format!("{}{}", self.url, CHAT_COMPLETIONS_PATH)
    }

    /// Copy of this endpoint with the token masked for display.
    pub fn masked(&self) -> Self {
        Self {
            url: self.url.clone(),
            model: self.model.clone(),
            access_token: mask_token(&self.access_token),
        }
    }
}

/// Keep the last four characters of a token, mask the rest.
///
/// Tokens of eight characters or fewer are masked entirely.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
