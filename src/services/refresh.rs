// src/services/refresh.rs

//! Captcha-refresh policy for authenticated calls.
//!
//! Any authenticated call may come back with "captcha required"; the server's
//! cadence is not predictable, so every call site goes through here instead
//! of guessing when a refresh is due.

use std::future::Future;

use crate::error::{AppError, Result};
use crate::models::{CaptchaGated, JailSession, RequestContext, SessionKey};
use crate::services::CaptchaGate;

/// How many times a call may refresh the session key and resend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptchaRefresh {
    max_refreshes: u32,
}

impl CaptchaRefresh {
    /// Surface "captcha required" to the caller immediately.
    pub const fn never() -> Self {
        Self { max_refreshes: 0 }
    }

    /// Refresh once, resend once.
    pub const fn once() -> Self {
        Self { max_refreshes: 1 }
    }

    /// Upper bound on requests issued by one `send`.
    pub fn max_requests(&self) -> u32 {
        self.max_refreshes + 1
    }

    /// Issue `call` with the session's current credentials.
    ///
    /// On "captcha required" the session key is replaced through `gate` and
    /// the same call is rebuilt and resent, up to the refresh budget. On any
    /// other response the response's ViewKey and rotated key are written
    /// into `session` before it is returned, so the next call is built from
    /// the freshest values. Captcha-required responses never touch the
    /// cursor.
    pub async fn send<R, F, Fut>(
        &self,
        session: &mut JailSession,
        gate: &CaptchaGate<'_>,
        mut call: F,
    ) -> Result<R>
    where
        R: CaptchaGated,
        F: FnMut(RequestContext) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let mut requests = 0;
        loop {
            let response = call(session.request_context()?).await?;
            requests += 1;

            if !response.captcha_required() {
                if let Some(view_key) = response.view_key() {
                    session.observe_view_key(view_key.clone());
                }
                if let Some(key) = response.rotated_key() {
                    session.set_session_key(SessionKey::new(key));
                }
                return Ok(response);
            }

            if requests >= self.max_requests() {
                return Err(AppError::CaptchaRequired {
                    facility: session.facility.clone(),
                    requests,
                });
            }

            log::info!(
                "[{}] Captcha required (request {requests}); refreshing session key",
                session.facility
            );
            let key = gate.acquire().await?;
            session.set_session_key(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budgets() {
        assert_eq!(CaptchaRefresh::never().max_requests(), 1);
        assert_eq!(CaptchaRefresh::once().max_requests(), 2);
    }
}
