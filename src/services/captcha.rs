// src/services/captcha.rs

//! Captcha gate: challenge → solve → validate, within a fixed budget.
//!
//! Attempts are independent. A failed attempt's challenge key, image and
//! any key echoed back by a non-matching validation are all discarded; the
//! next attempt always starts from a fresh challenge.

use crate::error::{AppError, Result};
use crate::models::SessionKey;
use crate::services::{CaptchaSolver, RosterApi};

/// Attempts per gate run unless configured otherwise.
pub const MAX_CAPTCHA_ATTEMPTS: u32 = 5;

/// Produces validated session keys for one facility.
pub struct CaptchaGate<'a> {
    api: &'a dyn RosterApi,
    solver: &'a CaptchaSolver,
    max_attempts: u32,
}

impl<'a> CaptchaGate<'a> {
    pub fn new(api: &'a dyn RosterApi, solver: &'a CaptchaSolver) -> Self {
        Self::with_attempts(api, solver, MAX_CAPTCHA_ATTEMPTS)
    }

    pub fn with_attempts(api: &'a dyn RosterApi, solver: &'a CaptchaSolver, max_attempts: u32) -> Self {
        Self {
            api,
            solver,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Run the gate until a key validates or the budget is spent.
    ///
    /// Exhaustion returns `CaptchaExhausted` carrying the last attempt's error.
    pub async fn acquire(&self) -> Result<SessionKey> {
        let facility = self.api.facility();
        let mut last = None;

        for attempt in 1..=self.max_attempts {
            match self.attempt().await {
                Ok(key) => {
                    log::info!("[{facility}] Captcha matched on attempt {attempt}, key {key}");
                    return Ok(key);
                }
                Err(e) => {
                    log::warn!(
                        "[{facility}] ({attempt}/{}) Captcha attempt failed: {}",
                        self.max_attempts,
                        e.chain()
                    );
                    last = Some(Box::new(e));
                }
            }
        }

        Err(AppError::CaptchaExhausted {
            attempts: self.max_attempts,
            last,
        })
    }

    /// One challenge/solve/validate round.
    async fn attempt(&self) -> Result<SessionKey> {
        let challenge = self.api.new_challenge().await?;

        // A malformed answer never reaches the validation endpoint.
        let answer = self.solver.solve(&challenge.inline_image).await?;

        let validation = self.api.validate(&challenge.key, &answer).await?;
        if !validation.matched {
            return Err(AppError::CaptchaMismatch { answer });
        }

        match validation.key.filter(|k| !k.is_empty()) {
            Some(key) => Ok(SessionKey::new(key)),
            None => Err(AppError::CaptchaKeyMissing { answer }),
        }
    }
}
