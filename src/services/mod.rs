//! Service layer for the roster crawler.
//!
//! This module contains the captcha-gated session protocol:
//! - Captcha reading (`CaptchaSolver` over a `VisionCompletion`)
//! - Session key acquisition (`CaptchaGate`)
//! - Refresh-and-resend policy for authenticated calls (`CaptchaRefresh`)
//! - Roster and per-inmate calls (`RosterFetcher`, `InmateEnricher`)

mod captcha;
mod enricher;
mod refresh;
mod roster;
mod roster_api;
mod solver;
mod vision;

pub use captcha::{CaptchaGate, MAX_CAPTCHA_ATTEMPTS};
pub use enricher::InmateEnricher;
pub use refresh::CaptchaRefresh;
pub use roster::RosterFetcher;
pub use roster_api::{HttpRosterApi, RosterApi};
pub use solver::{CaptchaSolver, SOLUTION_LEN, SOLVER_INSTRUCTION, is_valid_solution};
pub use vision::{OpenAiVision, VisionCompletion};
