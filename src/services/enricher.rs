// src/services/enricher.rs

//! Per-inmate detail enrichment.

use crate::error::{AppError, Result};
use crate::models::JailSession;
use crate::services::{CaptchaGate, CaptchaRefresh, RosterApi};

/// Fills one roster record with cases, charges, holds and special fields.
pub struct InmateEnricher<'a> {
    api: &'a dyn RosterApi,
    gate: &'a CaptchaGate<'a>,
}

impl<'a> InmateEnricher<'a> {
    pub fn new(api: &'a dyn RosterApi, gate: &'a CaptchaGate<'a>) -> Self {
        Self { api, gate }
    }

    /// Enrich `session.inmates[index]` in place.
    ///
    /// A captcha challenge mid-call triggers one refresh and one resend.
    /// Failures scoped to this inmate come back as `Enrichment`; an exhausted
    /// captcha budget is returned as-is because it ends the session.
    pub async fn enrich(&self, session: &mut JailSession, index: usize) -> Result<()> {
        let arrest_no = match session.inmates.get(index) {
            Some(record) => record.arrest_no().to_string(),
            None => {
                return Err(AppError::validation(format!(
                    "no roster entry at position {index}"
                )));
            }
        };

        let api = self.api;
        let arrest = arrest_no.as_str();
        let result = CaptchaRefresh::once()
            .send(session, self.gate, move |ctx| api.fetch_inmate(arrest, ctx))
            .await;

        let detail = match result {
            Ok(detail) => detail,
            Err(e @ AppError::CaptchaExhausted { .. }) => return Err(e),
            Err(e) => return Err(AppError::enrichment(arrest_no, e)),
        };

        let record = &mut session.inmates[index];
        record.apply_detail(&detail);
        log::info!(
            "[{}] Updated inmate {:?}. Cases: {} Charges: {} Holds: {} Booked: {}",
            session.facility,
            arrest_no,
            record.cases.len(),
            record.charges.len(),
            record.holds.len(),
            record.special.booking_date.as_deref().unwrap_or("-"),
        );
        Ok(())
    }
}
