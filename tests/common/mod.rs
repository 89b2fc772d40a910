//! Scripted in-memory roster service and vision model.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jtt::error::{AppError, Result};
use jtt::models::{
    CaptchaChallenge, CaptchaValidation, InmateResponse, InmateStub, RequestContext,
    RosterResponse, SpecialField, ViewKey,
};
use jtt::pipeline::CrawlContext;
use jtt::services::{CaptchaSolver, RosterApi, VisionCompletion};
use jtt::utils::Pacing;

pub const FACILITY: &str = "test-county-jail";
pub const BASE_URL: &str = "https://roster.test";

/// One request seen by `ScriptedApi`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Challenge,
    Validate {
        challenge_key: String,
        answer: String,
    },
    OpenSession {
        session_key: String,
        view_key: Option<ViewKey>,
    },
    Inmate {
        arrest_no: String,
        session_key: String,
        view_key: Option<ViewKey>,
    },
}

/// Roster service that replays queued responses and records every call.
///
/// Challenges are numbered `c1`, `c2`, ... An empty validation queue answers
/// "matched" with key `key{n}` for the n-th validation.
#[derive(Default)]
pub struct ScriptedApi {
    calls: Mutex<Vec<Call>>,
    validations: Mutex<VecDeque<Result<CaptchaValidation>>>,
    rosters: Mutex<VecDeque<Result<RosterResponse>>>,
    inmates: Mutex<VecDeque<Result<InmateResponse>>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_validation(&self, validation: Result<CaptchaValidation>) -> &Self {
        self.validations.lock().unwrap().push_back(validation);
        self
    }

    pub fn push_roster(&self, roster: Result<RosterResponse>) -> &Self {
        self.rosters.lock().unwrap().push_back(roster);
        self
    }

    pub fn push_inmate(&self, detail: Result<InmateResponse>) -> &Self {
        self.inmates.lock().unwrap().push_back(detail);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn challenges(&self) -> usize {
        self.count(|c| matches!(c, Call::Challenge))
    }

    pub fn validate_calls(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Validate {
                    challenge_key,
                    answer,
                } => Some((challenge_key, answer)),
                _ => None,
            })
            .collect()
    }

    pub fn roster_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::OpenSession { .. }))
    }

    /// `(arrest_no, session_key, view_key)` for every detail call, in order.
    pub fn inmate_calls(&self) -> Vec<(String, String, Option<ViewKey>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Inmate {
                    arrest_no,
                    session_key,
                    view_key,
                } => Some((arrest_no, session_key, view_key)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.len()
    }
}

#[async_trait]
impl RosterApi for ScriptedApi {
    fn facility(&self) -> &str {
        FACILITY
    }

    async fn new_challenge(&self) -> Result<CaptchaChallenge> {
        self.record(Call::Challenge);
        let n = self.challenges();
        Ok(CaptchaChallenge {
            key: format!("c{n}"),
            inline_image: format!("data:image/png;base64,IMG{n}"),
        })
    }

    async fn validate(&self, challenge_key: &str, answer: &str) -> Result<CaptchaValidation> {
        self.record(Call::Validate {
            challenge_key: challenge_key.to_string(),
            answer: answer.to_string(),
        });
        let n = self.validate_calls().len();
        self.validations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(matched(&format!("key{n}"))))
    }

    async fn open_session(&self, ctx: RequestContext) -> Result<RosterResponse> {
        self.record(Call::OpenSession {
            session_key: ctx.session_key.as_str().to_string(),
            view_key: ctx.view_key,
        });
        self.rosters
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::validation("unscripted roster call")))
    }

    async fn fetch_inmate(&self, arrest_no: &str, ctx: RequestContext) -> Result<InmateResponse> {
        self.record(Call::Inmate {
            arrest_no: arrest_no.to_string(),
            session_key: ctx.session_key.as_str().to_string(),
            view_key: ctx.view_key,
        });
        self.inmates
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::validation("unscripted inmate call")))
    }
}

/// Vision model replaying queued answers; `AB12` once the queue is empty.
#[derive(Default)]
pub struct ScriptedVision {
    answers: Mutex<VecDeque<Result<Vec<String>>>>,
    images: Mutex<Vec<String>>,
}

impl ScriptedVision {
    pub fn with_answers<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vision = Self::default();
        for answer in answers {
            vision.push(Ok(vec![answer.into()]));
        }
        vision
    }

    pub fn push(&self, answer: Result<Vec<String>>) {
        self.answers.lock().unwrap().push_back(answer);
    }

    pub fn images(&self) -> Vec<String> {
        self.images.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionCompletion for ScriptedVision {
    async fn complete(&self, _instruction: &str, inline_image: &str) -> Result<Vec<String>> {
        self.images.lock().unwrap().push(inline_image.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(vec!["AB12".to_string()]))
    }
}

pub fn solver(vision: ScriptedVision) -> (CaptchaSolver, Arc<ScriptedVision>) {
    let vision = Arc::new(vision);
    (CaptchaSolver::new(vision.clone()), vision)
}

/// Crawl context with production pacing; run it under a paused clock.
pub fn context(vision: ScriptedVision) -> (CrawlContext, Arc<ScriptedVision>) {
    let (solver, vision) = solver(vision);
    let ctx = CrawlContext {
        client: reqwest::Client::new(),
        solver,
        pacing: Pacing::from_millis(500, 1500),
        captcha_attempts: 5,
    };
    (ctx, vision)
}

pub fn matched(key: &str) -> CaptchaValidation {
    CaptchaValidation {
        matched: true,
        key: Some(key.to_string()),
    }
}

pub fn mismatched() -> CaptchaValidation {
    CaptchaValidation {
        matched: false,
        key: Some("stale".to_string()),
    }
}

pub fn stub(arrest_no: &str) -> InmateStub {
    InmateStub {
        arrest_no: arrest_no.to_string(),
        agency_name: Some("County Sheriff".to_string()),
        ..InmateStub::default()
    }
}

pub fn roster(view_key: i64, arrests: &[&str]) -> RosterResponse {
    RosterResponse {
        view_key: Some(ViewKey::from(view_key)),
        stubs: Some(arrests.iter().map(|a| stub(a)).collect()),
        ..RosterResponse::default()
    }
}

pub fn detail(view_key: i64, charges: usize) -> InmateResponse {
    InmateResponse {
        view_key: Some(ViewKey::from(view_key)),
        charges: Some(vec![Default::default(); charges]),
        cases: Some(Vec::new()),
        holds: None,
        special_fields: Some(vec![SpecialField {
            label: "Booking Date".to_string(),
            value: Some("6/28/2024 10:22:44 AM".to_string()),
        }]),
        ..InmateResponse::default()
    }
}

pub fn captcha_required() -> InmateResponse {
    InmateResponse {
        captcha_required: true,
        ..InmateResponse::default()
    }
}

pub fn roster_captcha_required() -> RosterResponse {
    RosterResponse {
        captcha_required: true,
        ..RosterResponse::default()
    }
}
