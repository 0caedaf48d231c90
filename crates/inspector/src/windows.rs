//! `dumpbin /dependents` output parsing.

use std::path::Path;
use std::time::Duration;

use staticlink_core::{InspectError, Platform, RawDependency};

use crate::command::ToolCommand;
use crate::DependencySource;

const DEPENDENCIES_MARKER: &str = "Image has the following dependencies:";
const SUMMARY_PREFIX: &str = "Summary";
/// Present in every dump of a file dumpbin could read.
const FILE_TYPE_MARKER: &str = "File Type:";

pub struct DumpbinSource {
    program: String,
    timeout: Duration,
}

impl DumpbinSource {
    pub fn new(program: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            timeout,
        }
    }
}

impl DependencySource for DumpbinSource {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn tool(&self) -> &str {
        &self.program
    }

    fn extract(&self, binary: &Path) -> Result<Vec<RawDependency>, InspectError> {
        let output = ToolCommand::new(
            &self.program,
            &["/dependents"],
            binary.to_path_buf(),
            self.timeout,
        )
        .run()?;
        if !output.status.success() {
            return Err(InspectError::ToolError {
                tool: self.program.clone(),
                message: output.failure_text(),
            });
        }
        parse_dumpbin_output(&output.stdout).ok_or_else(|| InspectError::ToolError {
            tool: self.program.clone(),
            message: format!("unrecognized output: {}", output.failure_text()),
        })
    }
}

/// Returns `None` when the output is not a dumpbin file dump at all.
pub fn parse_dumpbin_output(output: &str) -> Option<Vec<RawDependency>> {
    if !output.contains(FILE_TYPE_MARKER) {
        return None;
    }

    let mut deps = Vec::new();
    let mut in_dependencies = false;
    for line in output.lines() {
        let line = line.trim();
        if line.contains(DEPENDENCIES_MARKER) {
            in_dependencies = true;
            continue;
        }
        if !in_dependencies {
            continue;
        }
        if line.starts_with(SUMMARY_PREFIX) {
            break;
        }
        if line.to_ascii_lowercase().ends_with(".dll") {
            deps.push(RawDependency::new(line, None));
        }
    }
    Some(deps)
}
