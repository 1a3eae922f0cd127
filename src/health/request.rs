//! Minimal chat completion body used as a probe.

use serde::Serialize;

/// Prompt sent by every probe.
pub const PROBE_PROMPT: &str = "test";

/// Token cap keeping the probe cheap.
pub const PROBE_MAX_TOKENS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeMessage {
    pub role: &'static str,
    pub content: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeRequest<'a> {
    pub model: &'a str,
    pub messages: [ProbeMessage; 1],
    pub max_tokens: u32,
}

impl<'a> ProbeRequest<'a> {
    pub fn for_model(model: &'a str) -> Self {
        Self {
            model,
            messages: [ProbeMessage {
                role: "user",
                content: PROBE_PROMPT,
            }],
            max_tokens: PROBE_MAX_TOKENS,
        }
    }
}
