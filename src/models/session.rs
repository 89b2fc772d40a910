//! Session state threaded through the captcha-gated protocol.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::InmateRecord;

/// Token proving a captcha was solved; sent on every authenticated call.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Keys are credentials; only a prefix ever reaches the logs.
impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey({})", self)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        if prefix.len() < self.0.len() {
            write!(f, "{prefix}…")
        } else {
            f.write_str(&prefix)
        }
    }
}

/// Server-issued cursor echoed on the next call.
///
/// The vendor sends it as a JSON number, but nothing here depends on that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewKey {
    Number(i64),
    Text(String),
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKey::Number(n) => write!(f, "{n}"),
            ViewKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ViewKey {
    fn from(value: i64) -> Self {
        ViewKey::Number(value)
    }
}

/// Lifecycle of a single jail crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Uninitialized,
    CaptchaPending,
    RosterFetched,
    Enriching,
    Complete,
    CaptchaFailed,
    RosterFailed,
}

impl SessionState {
    /// Whether `next` is a legal successor of this state.
    pub fn can_advance_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Uninitialized, CaptchaPending)
                | (Uninitialized, CaptchaFailed)
                | (CaptchaPending, RosterFetched)
                | (CaptchaPending, RosterFailed)
                | (RosterFetched, Enriching)
                | (Enriching, Complete)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Complete | SessionState::CaptchaFailed | SessionState::RosterFailed
        )
    }
}

/// Credentials for one authenticated request, taken from the session at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub session_key: SessionKey,
    pub view_key: Option<ViewKey>,
}

/// Mutable state of one facility's crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JailSession {
    pub base_url: String,
    pub facility: String,
    #[serde(skip)]
    session_key: SessionKey,
    view_key: Option<ViewKey>,
    state: SessionState,
    pub inmates: Vec<InmateRecord>,
}

impl JailSession {
    pub fn new(base_url: impl Into<String>, facility: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            facility: facility.into(),
            session_key: SessionKey::default(),
            view_key: None,
            state: SessionState::Uninitialized,
            inmates: Vec::new(),
        }
    }

    pub fn session_key(&self) -> &SessionKey {
        &self.session_key
    }

    pub fn view_key(&self) -> Option<&ViewKey> {
        self.view_key.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Install a freshly validated key. Empty keys are ignored.
    pub fn set_session_key(&mut self, key: SessionKey) {
        if !key.is_empty() {
            self.session_key = key;
        }
    }

    /// Record the cursor from a successful response.
    pub fn observe_view_key(&mut self, view_key: ViewKey) {
        self.view_key = Some(view_key);
    }

    /// Move to `next`, refusing transitions the lifecycle does not allow.
    pub fn advance(&mut self, next: SessionState) -> Result<()> {
        if self.state.is_terminal() {
            return Err(AppError::session(
                &self.facility,
                format!("session already finished as {:?}", self.state),
            ));
        }
        if !self.state.can_advance_to(next) {
            return Err(AppError::session(
                &self.facility,
                format!("illegal transition {:?} -> {:?}", self.state, next),
            ));
        }
        log::debug!("[{}] {:?} -> {:?}", self.facility, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Snapshot credentials for the next call.
    pub fn request_context(&self) -> Result<RequestContext> {
        if self.session_key.is_empty() {
            return Err(AppError::session(
                &self.facility,
                "no validated session key",
            ));
        }
        Ok(RequestContext {
            session_key: self.session_key.clone(),
            view_key: self.view_key.clone(),
        })
    }

    /// Number of records that received detail.
    pub fn enriched_count(&self) -> usize {
        self.inmates.iter().filter(|i| i.enriched).count()
    }
}
