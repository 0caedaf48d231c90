use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::platform::Platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub inspector: InspectorConfig,
    pub policy: PolicyConfig,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    pub timeout_secs: u64,
    pub ldd: String,
    pub otool: String,
    pub dumpbin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Default for `--strict` when the flag is not given.
    pub strict: bool,
    /// Largest all-system dependency count macOS still passes without review.
    pub macos_max_system_deps: usize,
    /// The C runtime every macOS binary links against.
    pub macos_runtime: String,
}

/// Platform-keyed system library markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub linux: Vec<Matcher>,
    pub macos: Vec<Matcher>,
    pub windows: Vec<Matcher>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matcher {
    pub field: MatchField,
    pub kind: MatchKind,
    pub pattern: String,
    #[serde(default)]
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    /// The reported path, falling back to the name when no path is known.
    Path,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Contains,
    Prefix,
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

impl Matcher {
    pub fn path_contains(pattern: &str) -> Self {
        Self {
            field: MatchField::Path,
            kind: MatchKind::Contains,
            pattern: pattern.to_string(),
            case_insensitive: false,
        }
    }

    pub fn path_prefix(pattern: &str) -> Self {
        Self {
            field: MatchField::Path,
            kind: MatchKind::Prefix,
            pattern: pattern.to_string(),
            case_insensitive: false,
        }
    }

    pub fn name_contains_ignore_case(pattern: &str) -> Self {
        Self {
            field: MatchField::Name,
            kind: MatchKind::Contains,
            pattern: pattern.to_string(),
            case_insensitive: true,
        }
    }
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            ldd: "ldd".to_string(),
            otool: "otool".to_string(),
            dumpbin: "dumpbin".to_string(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            strict: false,
            macos_max_system_deps: 3,
            macos_runtime: "/usr/lib/libSystem.B.dylib".to_string(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            linux: ["/lib/", "/usr/lib/", "linux-vdso", "ld-linux"]
                .into_iter()
                .map(Matcher::path_contains)
                .collect(),
            macos: ["/usr/lib/", "/System/Library/"]
                .into_iter()
                .map(Matcher::path_prefix)
                .collect(),
            windows: ["kernel32", "ntdll", "msvcrt", "ucrtbase"]
                .into_iter()
                .map(Matcher::name_contains_ignore_case)
                .collect(),
        }
    }
}

impl ClassifierConfig {
    /// Matchers for a platform. Unsupported platforms have none.
    pub fn for_platform(&self, platform: &Platform) -> &[Matcher] {
        match platform {
            Platform::Linux => self.linux.as_slice(),
            Platform::MacOs => self.macos.as_slice(),
            Platform::Windows => self.windows.as_slice(),
            Platform::Unsupported(_) => &[],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            inspector: InspectorConfig::default(),
            policy: PolicyConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("parse config TOML")?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        let output = toml::to_string_pretty(self).context("render config TOML")?;
        Ok(output)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read config at {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    /// Loads the config if the file exists, otherwise the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default_config());
        }
        debug!(path = %path.display(), "loading config");
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config dir {}", parent.display()))?;
        }
        let contents = self.to_toml_string()?;
        fs::write(path, contents).with_context(|| format!("write config at {}", path.display()))?;
        Ok(())
    }
}

impl ConfigPaths {
    pub fn resolve() -> Result<Self> {
        let project_dirs = ProjectDirs::from("io", "staticlink", "staticlink")
            .ok_or_else(|| anyhow::anyhow!("unable to determine project directories"))?;
        let config_dir = project_dirs.config_dir().to_path_buf();
        Ok(Self {
            config_path: config_dir.join("config.toml"),
            config_dir,
        })
    }
}
