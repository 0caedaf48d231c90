//! `ldd` output parsing.
//!
//! Typical output:
//!
//! ```text
//!     linux-vdso.so.1 (0x00007ffd6b5f2000)
//!     libssl.so.3 => /lib/x86_64-linux-gnu/libssl.so.3 (0x00007f2a1c600000)
//!     libfoo.so.1 => not found
//!     /lib64/ld-linux-x86-64.so.2 (0x00007f2a1cb8a000)
//! ```

use std::path::Path;
use std::time::Duration;

use tracing::debug;

use staticlink_core::{InspectError, Platform, RawDependency};

use crate::command::ToolCommand;
use crate::{file_name, DependencySource};

/// Markers `ldd` prints for binaries with no dynamic section.
const STATIC_MARKERS: &[&str] = &["not a dynamic executable", "not a dynamic", "statically linked"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LddOutput {
    NotDynamic,
    Dependencies(Vec<RawDependency>),
}

pub struct LddSource {
    program: String,
    timeout: Duration,
}

impl LddSource {
    pub fn new(program: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            timeout,
        }
    }
}

impl DependencySource for LddSource {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn tool(&self) -> &str {
        &self.program
    }

    fn extract(&self, binary: &Path) -> Result<Vec<RawDependency>, InspectError> {
        let output = ToolCommand::new(&self.program, &[], binary.to_path_buf(), self.timeout).run()?;
        // ldd exits non-zero for static binaries, so the marker wins over the status.
        match parse_ldd_output(&output.combined()) {
            LddOutput::NotDynamic => {
                debug!(binary = %binary.display(), "ldd reports no dynamic section");
                Ok(Vec::new())
            }
            LddOutput::Dependencies(_) if !output.status.success() => Err(InspectError::ToolError {
                tool: self.program.clone(),
                message: output.failure_text(),
            }),
            LddOutput::Dependencies(deps) => Ok(deps),
        }
    }
}

pub fn parse_ldd_output(output: &str) -> LddOutput {
    if STATIC_MARKERS.iter().any(|marker| output.contains(marker)) {
        return LddOutput::NotDynamic;
    }
    LddOutput::Dependencies(output.lines().filter_map(parse_ldd_line).collect())
}

fn parse_ldd_line(line: &str) -> Option<RawDependency> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some((name, target)) = line.split_once("=>") {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let path = target
            .split_whitespace()
            .next()
            .filter(|token| *token != "not" && !token.starts_with('('))
            .map(str::to_string);
        return Some(RawDependency::new(name, path));
    }

    // Entries without `=>`: the vDSO and the program interpreter.
    let token = line.split_whitespace().next()?;
    if token.ends_with(':') || !token.contains(".so") {
        return None;
    }
    let path = token.starts_with('/').then(|| token.to_string());
    Some(RawDependency::new(file_name(token), path))
}
