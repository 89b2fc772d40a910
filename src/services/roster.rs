// src/services/roster.rs

//! Session-initiating roster call.

use crate::error::{AppError, Result};
use crate::models::{InmateRecord, JailSession};
use crate::services::{CaptchaGate, CaptchaRefresh, RosterApi};

/// Fetches the inmate stub list with a freshly validated key.
pub struct RosterFetcher<'a> {
    api: &'a dyn RosterApi,
    gate: &'a CaptchaGate<'a>,
}

impl<'a> RosterFetcher<'a> {
    pub fn new(api: &'a dyn RosterApi, gate: &'a CaptchaGate<'a>) -> Self {
        Self { api, gate }
    }

    /// Populate `session.inmates` and the first ViewKey.
    ///
    /// No internal retry: a rejected key here usually means validation is
    /// failing systemically, so the caller decides whether to start over.
    pub async fn fetch(&self, session: &mut JailSession) -> Result<usize> {
        let api = self.api;
        let facility = session.facility.clone();

        let response = CaptchaRefresh::never()
            .send(session, self.gate, move |ctx| api.open_session(ctx))
            .await
            .map_err(|e| match e {
                AppError::CaptchaRequired { .. } => {
                    AppError::session(&facility, "captcha still required after validation")
                }
                other => other,
            })?;

        if let Some(message) = response.error_message.as_deref().filter(|m| !m.trim().is_empty()) {
            return Err(AppError::session(&facility, message));
        }
        if session.view_key().is_none() {
            return Err(AppError::session(&facility, "roster response carried no view key"));
        }

        session.inmates = response
            .stubs
            .unwrap_or_default()
            .into_iter()
            .map(InmateRecord::from)
            .collect();

        log::info!("[{facility}] Found {} inmates", session.inmates.len());
        Ok(session.inmates.len())
    }
}
