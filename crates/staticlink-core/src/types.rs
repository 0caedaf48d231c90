use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// A dependency as read from the inspection tool, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDependency {
    pub name: String,
    pub path: Option<String>,
}

impl RawDependency {
    pub fn new(name: impl Into<String>, path: Option<String>) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }
}

/// A classified dependency. Only built from a [`RawDependency`] plus a verdict
/// on whether it belongs to the operating system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub path: Option<String>,
    pub is_system: bool,
}

impl Dependency {
    pub fn classified(raw: RawDependency, is_system: bool) -> Self {
        Self {
            name: raw.name,
            path: raw.path,
            is_system,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Success,
    Warning,
    Error,
}

impl Status {
    pub fn symbol(self) -> &'static str {
        match self {
            Status::Success => "✓",
            Status::Warning => "⚠",
            Status::Error => "✗",
        }
    }
}

/// Outcome of one verification run. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    status: Status,
    platform: Platform,
    binary: PathBuf,
    dependencies: Vec<Dependency>,
    message: String,
    details: Vec<String>,
}

impl VerificationResult {
    pub fn new(
        status: Status,
        platform: Platform,
        binary: PathBuf,
        dependencies: Vec<Dependency>,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self {
            status,
            platform,
            binary,
            dependencies,
            message: message.into(),
            details,
        }
    }

    /// An ERROR result with no dependencies.
    pub fn error(
        platform: Platform,
        binary: PathBuf,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self::new(Status::Error, platform, binary, Vec::new(), message, details)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }

    pub fn system_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|dep| dep.is_system)
    }

    pub fn third_party_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|dep| !dep.is_system)
    }
}
