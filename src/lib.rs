// src/lib.rs

//! JailTracker roster crawler library.

#[cfg(feature = "s3")]
pub mod config;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
