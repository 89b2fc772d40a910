// src/services/roster_api.rs

//! Transport for the four roster-service endpoints.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{
    CaptchaChallenge, CaptchaPayload, CaptchaValidation, InmateResponse, RequestContext,
    RosterResponse,
};
use crate::utils::http::{get_json, post_json};
use crate::utils::url::RosterEndpoints;

/// The roster service as seen by the protocol components.
///
/// Implementations only move bytes; captcha and cursor handling live in the
/// callers. Every method is one bounded request/response.
#[async_trait]
pub trait RosterApi: Send + Sync {
    /// Facility slug this API instance talks to.
    fn facility(&self) -> &str;

    /// Fetch a brand-new challenge image and key.
    async fn new_challenge(&self) -> Result<CaptchaChallenge>;

    /// Submit a solver answer for a challenge.
    async fn validate(&self, challenge_key: &str, answer: &str) -> Result<CaptchaValidation>;

    /// Session-initiating roster call.
    async fn open_session(&self, ctx: RequestContext) -> Result<RosterResponse>;

    /// Per-inmate detail call.
    async fn fetch_inmate(&self, arrest_no: &str, ctx: RequestContext) -> Result<InmateResponse>;
}

/// `RosterApi` over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpRosterApi {
    client: Client,
    endpoints: RosterEndpoints,
}

impl HttpRosterApi {
    pub fn new(client: Client, base_url: &str, facility: &str) -> Result<Self> {
        Ok(Self {
            client,
            endpoints: RosterEndpoints::new(base_url, facility)?,
        })
    }
}

#[async_trait]
impl RosterApi for HttpRosterApi {
    fn facility(&self) -> &str {
        self.endpoints.facility()
    }

    async fn new_challenge(&self) -> Result<CaptchaChallenge> {
        let url = self.endpoints.challenge()?;
        let referer = self.endpoints.jail_page()?;
        get_json(&self.client, &url, Some(&referer)).await
    }

    async fn validate(&self, challenge_key: &str, answer: &str) -> Result<CaptchaValidation> {
        let url = self.endpoints.validate()?;
        let referer = self.endpoints.jail_page()?;
        let body = CaptchaPayload::answer(challenge_key, answer);
        post_json(&self.client, &url, &body, Some(&referer)).await
    }

    async fn open_session(&self, ctx: RequestContext) -> Result<RosterResponse> {
        let url = self.endpoints.roster()?;
        let body = CaptchaPayload::authenticated(ctx.session_key.as_str());
        post_json(&self.client, &url, &body, None).await
    }

    async fn fetch_inmate(&self, arrest_no: &str, ctx: RequestContext) -> Result<InmateResponse> {
        let view_key = ctx.view_key.as_ref().ok_or_else(|| {
            AppError::session(self.facility(), "detail call issued before any view key")
        })?;
        let url = self.endpoints.inmate(arrest_no, view_key)?;
        let body = CaptchaPayload::authenticated(ctx.session_key.as_str());
        post_json(&self.client, &url, &body, None).await
    }
}
