//! The opaque per-conversation state round-tripped between turns.
//!
//! The voice platform is stateless: everything the dialog engine knows about
//! an ongoing conversation must be encoded into the response and handed back
//! with the next request. This is that value object, with a defined schema
//! instead of ad-hoc untyped attributes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-conversation dialog state.
///
/// `drafts` maps a target-date slot string to the ordered text parts dictated
/// for that date so far; a draft is only ever addressed through its own date
/// key. `drafting` is true while the user is actively dictating parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub drafts: BTreeMap<String, Vec<String>>,
    pub drafting: bool,
}

impl SessionState {
    /// Decodes the state from the prior turn's output. `Null` (a fresh
    /// session) decodes to the default state; anything else malformed is an
    /// error the caller treats as a protocol violation.
    pub fn decode(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value.clone())
    }

    pub fn encode(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("session state is always serializable")
    }

    pub fn draft_parts(&self, date: &str) -> &[String] {
        self.drafts.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn draft_text(&self, date: &str) -> String {
        self.draft_parts(date).join(". ")
    }
}
