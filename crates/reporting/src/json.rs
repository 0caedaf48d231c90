use anyhow::{Context, Result};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use staticlink_core::{BinaryIdentity, VerificationResult};

/// Machine-readable envelope around one verification.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport<'a> {
    pub result: &'a VerificationResult,
    pub sha256: Option<String>,
    pub generated_at: String,
    pub exit_code: i32,
}

impl<'a> VerificationReport<'a> {
    /// The hash is omitted when the binary cannot be read, e.g. it does not exist.
    pub fn new(result: &'a VerificationResult) -> Self {
        let sha256 = BinaryIdentity::from_path(result.binary())
            .ok()
            .map(|identity| identity.sha256);
        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            result,
            sha256,
            generated_at,
            exit_code: crate::exit_code(result.status()),
        }
    }
}

pub fn render_json(result: &VerificationResult) -> Result<String> {
    let report = VerificationReport::new(result);
    serde_json::to_string_pretty(&report).context("render report JSON")
}

pub fn render_json_many(results: &[VerificationResult]) -> Result<String> {
    let reports: Vec<_> = results.iter().map(VerificationReport::new).collect();
    serde_json::to_string_pretty(&reports).context("render report JSON")
}
