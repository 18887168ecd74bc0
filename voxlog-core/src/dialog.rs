//! The turn protocol: what a stateless voice platform sends per turn and what
//! the engine hands back.
//!
//! Phase and confirmation values arrive as raw wire strings; parsing them into
//! the enums here is the engine's job, and an unknown value is a protocol
//! violation, not user error.

use std::collections::HashMap;

use strum_macros::{AsRefStr, EnumString};

/// Slot-filling lifecycle of an intent, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogPhase {
    Started,
    InProgress,
    Completed,
}

/// Confirmation status of an intent or a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Confirmation {
    None,
    Confirmed,
    Denied,
}

/// A named argument extracted from user speech.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slot {
    pub value: String,
    /// Raw wire string; [`Confirmation`] is parsed from it per turn.
    pub confirmation: String,
    /// Platform-side entity resolution (e.g. the unit of a relative date:
    /// `DAYS`, `MONTHS`, `YEARS`), `None` when the resolver found no match.
    pub resolution: Option<String>,
}

/// The current intent with its slots, as delivered by the platform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intent {
    pub name: String,
    pub confirmation: String,
    pub slots: HashMap<String, Slot>,
}

impl Intent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            confirmation: "NONE".to_string(),
            slots: HashMap::new(),
        }
    }

    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(
            name.into(),
            Slot {
                value: value.into(),
                confirmation: "NONE".to_string(),
                resolution: None,
            },
        );
        self
    }

    pub fn with_confirmation(mut self, confirmation: impl Into<String>) -> Self {
        self.confirmation = confirmation.into();
        self
    }

    pub fn with_resolved_slot(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        resolution: impl Into<String>,
    ) -> Self {
        self.slots.insert(
            name.into(),
            Slot {
                value: value.into(),
                confirmation: "NONE".to_string(),
                resolution: Some(resolution.into()),
            },
        );
        self
    }

    pub fn with_slot_confirmation(
        mut self,
        name: impl Into<String>,
        confirmation: impl Into<String>,
    ) -> Self {
        let slot = self.slots.entry(name.into()).or_default();
        slot.confirmation = confirmation.into();
        self
    }

    /// The slot's value, or `""` when the slot is absent or unfilled.
    pub fn slot_value(&self, name: &str) -> &str {
        self.slots.get(name).map(|s| s.value.as_str()).unwrap_or("")
    }

    pub fn slot_confirmation(&self, name: &str) -> &str {
        self.slots
            .get(name)
            .map(|s| s.confirmation.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("NONE")
    }

    pub fn slot_resolution(&self, name: &str) -> Option<&str> {
        self.slots.get(name).and_then(|s| s.resolution.as_deref())
    }

    /// Blanks a slot's value while keeping its metadata, used to force the
    /// platform to re-elicit it.
    pub fn clear_slot_value(&mut self, name: &str) {
        if let Some(slot) = self.slots.get_mut(name) {
            slot.value.clear();
        }
    }
}

/// What the platform should do after speaking the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Hand slot-filling back to the platform's dialog model.
    Delegate,
    /// Ask the user for one specific slot.
    ElicitSlot(String),
    /// Ask the user to confirm one specific slot.
    ConfirmSlot(String),
    /// Ask the user to confirm the whole intent.
    ConfirmIntent,
}

/// Kind of request the platform delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Launch,
    Intent,
    SessionEnded,
}

/// One full turn's input. `session` is the opaque state emitted by the
/// previous turn; `dialog_phase` and confirmation strings are raw wire values.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub kind: RequestKind,
    pub intent: Intent,
    pub dialog_phase: String,
    pub locale: String,
    pub access_token: String,
    pub user_id: String,
    pub session: serde_json::Value,
}

impl TurnRequest {
    pub fn launch() -> Self {
        Self {
            kind: RequestKind::Launch,
            intent: Intent::default(),
            dialog_phase: String::new(),
            locale: "en-US".to_string(),
            access_token: String::new(),
            user_id: String::new(),
            session: serde_json::Value::Null,
        }
    }

    pub fn intent(intent: Intent, dialog_phase: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Intent,
            intent,
            dialog_phase: dialog_phase.into(),
            locale: "en-US".to_string(),
            access_token: String::new(),
            user_id: String::new(),
            session: serde_json::Value::Null,
        }
    }

    pub fn session_ended() -> Self {
        Self {
            kind: RequestKind::SessionEnded,
            intent: Intent::default(),
            dialog_phase: String::new(),
            locale: "en-US".to_string(),
            access_token: String::new(),
            user_id: String::new(),
            session: serde_json::Value::Null,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_session(mut self, session: serde_json::Value) -> Self {
        self.session = session;
        self
    }
}

/// One full turn's output.
#[derive(Debug, Clone, Default)]
pub struct TurnResponse {
    pub speech: String,
    pub reprompt: Option<String>,
    pub directive: Option<Directive>,
    /// Opaque state to hand back with the next request.
    pub session: serde_json::Value,
    /// Replacement intent for the platform's dialog model, e.g. with a slot
    /// value blanked so it gets re-elicited.
    pub updated_intent: Option<Intent>,
    pub end_session: bool,
}

impl TurnResponse {
    pub fn speak(text: impl Into<String>, session: serde_json::Value) -> Self {
        Self {
            speech: text.into(),
            session,
            ..Self::default()
        }
    }

    pub fn with_reprompt(mut self, text: impl Into<String>) -> Self {
        self.reprompt = Some(text.into());
        self
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directive = Some(directive);
        self
    }

    pub fn with_updated_intent(mut self, intent: Intent) -> Self {
        self.updated_intent = Some(intent);
        self
    }

    pub fn ending_session(mut self) -> Self {
        self.end_session = true;
        self
    }
}
