// src/services/solver.rs

//! Captcha solver.
//!
//! Reads the captcha through a vision collaborator and rejects anything
//! that cannot be one of this vendor's codes before it costs a validation
//! round trip.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::services::VisionCompletion;

/// Instruction sent alongside every captcha image.
pub const SOLVER_INSTRUCTION: &str = "The user will send you images containing a single word of \
     obfuscated text. Reply only with the text in the image, with no spaces or quotes.";

/// Length of every captcha this vendor issues.
pub const SOLUTION_LEN: usize = 4;

/// Exactly four ASCII letters or digits.
pub fn is_valid_solution(answer: &str) -> bool {
    answer.len() == SOLUTION_LEN && answer.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Turns captcha images into candidate codes.
#[derive(Clone)]
pub struct CaptchaSolver {
    vision: Arc<dyn VisionCompletion>,
}

impl CaptchaSolver {
    pub fn new(vision: Arc<dyn VisionCompletion>) -> Self {
        Self { vision }
    }

    /// Solve one inline image.
    ///
    /// Fails with `Solver` when the collaborator fails or returns nothing,
    /// and with `SolverFormat` when its first answer is not a valid code.
    pub async fn solve(&self, inline_image: &str) -> Result<String> {
        let candidates = self
            .vision
            .complete(SOLVER_INSTRUCTION, inline_image)
            .await
            .map_err(|e| AppError::solver(e.chain()))?;

        let answer = candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::solver("no candidates in completion"))?;

        if !is_valid_solution(&answer) {
            return Err(AppError::SolverFormat { answer });
        }
        log::debug!("Solver read captcha as {answer:?}");
        Ok(answer)
    }
}
