//! Pre-playback gates and their session cache.

use std::collections::BTreeMap;

use crate::{
    foundation::error::{SlideError, SlideResult},
    model::presentation::Presentation,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum GateKind {
    Password,
    UnsafeContent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum GateOutcome {
    Passed,
    Proceed,
    Abort,
    /// Skipped because the embedding context is trusted.
    Bypassed,
}

/// User decision on the unsafe-content warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnsafeChoice {
    Abort,
    Proceed,
}

/// Remote password check. One call is one round trip.
///
/// `Ok(Some(_))` carries the unlocked presentation payload, `Ok(None)` is a rejection and `Err`
/// a transport or server failure.
pub trait PasswordValidator {
    fn validate(&mut self, presentation_id: i64, password: &str) -> SlideResult<Option<Presentation>>;
}

/// Validator that accepts a single fixed password and counts its requests.
#[derive(Clone, Debug)]
pub struct FixedPasswordValidator {
    password: String,
    payload: Option<Presentation>,
    requests: u32,
}

impl FixedPasswordValidator {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            payload: None,
            requests: 0,
        }
    }

    /// Presentation returned on success, replacing the locked one.
    pub fn with_payload(mut self, payload: Presentation) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn requests(&self) -> u32 {
        self.requests
    }
}

impl PasswordValidator for FixedPasswordValidator {
    fn validate(&mut self, presentation_id: i64, password: &str) -> SlideResult<Option<Presentation>> {
        self.requests += 1;
        if password != self.password {
            return Ok(None);
        }
        Ok(Some(self.payload.clone().unwrap_or_else(|| Presentation {
            id: presentation_id,
            ..Presentation::default()
        })))
    }
}

/// Validator for presentations that never ask for a password.
#[derive(Clone, Copy, Debug, Default)]
pub struct RejectAllValidator;

impl PasswordValidator for RejectAllValidator {
    fn validate(&mut self, _presentation_id: i64, _password: &str) -> SlideResult<Option<Presentation>> {
        Err(SlideError::gate("no password validator configured"))
    }
}

/// Result of one password submission.
#[derive(Clone, Debug, PartialEq)]
pub enum PasswordAttempt {
    /// Validator accepted; carries the unlocked payload when it returned a non-empty one.
    Accepted(Option<Box<Presentation>>),
    /// Already accepted earlier in this session; no request was made.
    Cached,
    Rejected { attempt: u32 },
}

/// Gate responses remembered for one presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct GateEntry {
    password_passed: bool,
    password_attempts: u32,
    unsafe_choice: Option<UnsafeChoice>,
}

/// Session-lifetime memory of gate responses, keyed by presentation id.
#[derive(Clone, Debug, Default)]
pub struct GateCache {
    entries: BTreeMap<i64, GateEntry>,
}

impl GateCache {
    fn entry(&self, presentation_id: i64) -> GateEntry {
        self.entries
            .get(&presentation_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn password_passed(&self, presentation_id: i64) -> bool {
        self.entry(presentation_id).password_passed
    }

    pub fn password_attempts(&self, presentation_id: i64) -> u32 {
        self.entry(presentation_id).password_attempts
    }

    pub fn unsafe_choice(&self, presentation_id: i64) -> Option<UnsafeChoice> {
        self.entry(presentation_id).unsafe_choice
    }

    /// Submit a password. A cached pass short-circuits without touching `validator`; validator
    /// failures count as rejections so the prompt can reopen.
    #[tracing::instrument(skip(self, validator, password))]
    pub fn submit_password(
        &mut self,
        validator: &mut dyn PasswordValidator,
        presentation_id: i64,
        password: &str,
    ) -> PasswordAttempt {
        let entry = self.entries.entry(presentation_id).or_default();
        if entry.password_passed {
            return PasswordAttempt::Cached;
        }
        entry.password_attempts += 1;
        match validator.validate(presentation_id, password) {
            Ok(Some(payload)) => {
                entry.password_passed = true;
                let payload = (!payload.slides.is_empty()).then(|| Box::new(payload));
                PasswordAttempt::Accepted(payload)
            }
            Ok(None) => PasswordAttempt::Rejected {
                attempt: entry.password_attempts,
            },
            Err(err) => {
                tracing::warn!(error = %err, "password validation failed");
                PasswordAttempt::Rejected {
                    attempt: entry.password_attempts,
                }
            }
        }
    }

    /// Record the unsafe-content decision. The first answer for a presentation sticks.
    pub fn choose_unsafe(&mut self, presentation_id: i64, choice: UnsafeChoice) -> UnsafeChoice {
        *self
            .entries
            .entry(presentation_id)
            .or_default()
            .unsafe_choice
            .get_or_insert(choice)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/gates.rs"]
mod tests;
