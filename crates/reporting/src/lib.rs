use serde::{Deserialize, Serialize};

use staticlink_core::{Status, VerificationResult};

pub mod human;
pub mod json;

pub use human::render_human;
pub use json::{render_json, render_json_many, VerificationReport};

/// Process exit code for a verdict. Warnings are advisory and still pass.
pub fn exit_code(status: Status) -> i32 {
    match status {
        Status::Success | Status::Warning => 0,
        Status::Error => 1,
    }
}

/// Human-readable report plus the exit code the caller should use.
pub fn render(result: &VerificationResult, verbose: bool) -> (String, i32) {
    (render_human(result, verbose), exit_code(result.status()))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepStats {
    pub total: u32,
    pub passed: u32,
    pub warned: u32,
    pub failed: u32,
}

impl SweepStats {
    pub fn from_results(results: &[VerificationResult]) -> Self {
        let mut stats = SweepStats::default();
        for result in results {
            stats.total = stats.total.saturating_add(1);
            match result.status() {
                Status::Success => stats.passed = stats.passed.saturating_add(1),
                Status::Warning => stats.warned = stats.warned.saturating_add(1),
                Status::Error => stats.failed = stats.failed.saturating_add(1),
            }
        }
        stats
    }

    /// An empty sweep fails: nothing was verified.
    pub fn exit_code(&self) -> i32 {
        if self.total == 0 || self.failed > 0 {
            1
        } else {
            0
        }
    }

    pub fn human_summary(&self) -> String {
        if self.total == 0 {
            return "No binaries found to verify.".to_string();
        }
        format!(
            "Verified {} binaries: {} passed, {} with warnings, {} failed.",
            self.total, self.passed, self.warned, self.failed
        )
    }
}
