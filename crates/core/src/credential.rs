// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential keys and the environment-variable fallback chain.
//!
//! Per-user secrets are stored encrypted and released only through the
//! daemon with a valid session token. When a user has no stored secret for
//! a key, the daemon may fall back to its own environment.

use serde::{Deserialize, Serialize};

/// Which secret an executor needs for a given agent tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialKey {
    AnthropicApiKey,
    OpenAiApiKey,
    GeminiApiKey,
    /// The tool authenticates out-of-band (e.g. OpenCode server URL).
    None,
}

impl CredentialKey {
    /// Environment variable consulted as a fallback when the user has no
    /// stored credential. `None` has no fallback.
    pub fn env_var(self) -> Option<&'static str> {
        match self {
            CredentialKey::AnthropicApiKey => Some("ANTHROPIC_API_KEY"),
            CredentialKey::OpenAiApiKey => Some("OPENAI_API_KEY"),
            CredentialKey::GeminiApiKey => Some("GEMINI_API_KEY"),
            CredentialKey::None => None,
        }
    }

    /// Resolve the fallback value from the current process environment.
    pub fn env_fallback(self) -> Option<String> {
        let var = self.env_var()?;
        std::env::var(var).ok().filter(|v| !v.is_empty())
    }
}

crate::simple_display! {
    CredentialKey {
        AnthropicApiKey => "ANTHROPIC_API_KEY",
        OpenAiApiKey => "OPENAI_API_KEY",
        GeminiApiKey => "GEMINI_API_KEY",
        None => "NONE",
    }
}

/// A stored per-user secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub user_id: crate::UserId,
    pub key: CredentialKey,
    pub value: String,
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
