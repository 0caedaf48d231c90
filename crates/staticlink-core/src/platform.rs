use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating system the verification runs on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Unsupported(String),
}

impl Platform {
    /// Detects the host platform. Not cached: every call looks again.
    pub fn detect() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "linux" => Platform::Linux,
            "macos" | "darwin" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Unsupported(name.trim().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
            Platform::Windows => "Windows",
            Platform::Unsupported(name) => name.as_str(),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Platform::Unsupported(_))
    }

    /// Suggested fix when the platform's inspection tool cannot be run.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            Platform::Linux => Some("Install the binutils / libc-bin package that provides ldd"),
            Platform::MacOs => Some("Install Xcode Command Line Tools (xcode-select --install)"),
            Platform::Windows => Some(
                "Install Visual Studio or the Windows SDK and run from a Developer Command Prompt",
            ),
            Platform::Unsupported(_) => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.name().to_string()
    }
}

impl From<String> for Platform {
    fn from(name: String) -> Self {
        Platform::from_name(&name)
    }
}
