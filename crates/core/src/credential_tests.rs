// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn env_var_mapping() {
    assert_eq!(CredentialKey::AnthropicApiKey.env_var(), Some("ANTHROPIC_API_KEY"));
    assert_eq!(CredentialKey::OpenAiApiKey.env_var(), Some("OPENAI_API_KEY"));
    assert_eq!(CredentialKey::GeminiApiKey.env_var(), Some("GEMINI_API_KEY"));
    assert_eq!(CredentialKey::None.env_var(), None);
}

#[test]
fn display_matches_wire_names() {
    assert_eq!(CredentialKey::AnthropicApiKey.to_string(), "ANTHROPIC_API_KEY");
    assert_eq!(CredentialKey::None.to_string(), "NONE");
}

#[test]
#[serial(credential_env)]
fn env_fallback_reads_process_env() {
    std::env::set_var("GEMINI_API_KEY", "gk-test");
    assert_eq!(CredentialKey::GeminiApiKey.env_fallback(), Some("gk-test".to_string()));
    std::env::remove_var("GEMINI_API_KEY");
    assert_eq!(CredentialKey::GeminiApiKey.env_fallback(), None);
}

#[test]
#[serial(credential_env)]
fn env_fallback_ignores_empty_values() {
    std::env::set_var("GEMINI_API_KEY", "");
    assert_eq!(CredentialKey::GeminiApiKey.env_fallback(), None);
    std::env::remove_var("GEMINI_API_KEY");
}
