// src/models/mod.rs

//! Domain models for the roster crawler.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod inmate;
pub mod protocol;
mod session;

// Re-export all public types
pub use config::{Config, CrawlerConfig, JailConfig, SolverConfig, StorageConfig};
pub use inmate::{
    Case, Charge, Hold, InmateRecord, InmateStub, SpecialField, SpecialFields, SpecialLabel,
};
pub use protocol::{
    CaptchaChallenge, CaptchaGated, CaptchaPayload, CaptchaValidation, InmateResponse,
    RosterResponse,
};
pub use session::{JailSession, RequestContext, SessionKey, SessionState, ViewKey};
