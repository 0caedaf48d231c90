use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use staticlink_core::{InspectError, InspectorConfig, Platform, RawDependency};

pub mod command;
pub mod env;
pub mod linux;
pub mod macos;
pub mod windows;

pub use linux::LddSource;
pub use macos::OtoolSource;
pub use windows::DumpbinSource;

/// A platform's way of listing the shared libraries a binary links against.
pub trait DependencySource {
    fn platform(&self) -> Platform;

    /// Program name of the external tool this source runs.
    fn tool(&self) -> &str;

    /// Lists dependencies in the order the tool reports them.
    fn extract(&self, binary: &Path) -> Result<Vec<RawDependency>, InspectError>;
}

/// Raw dependencies of one binary, together with where they were read.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub platform: Platform,
    pub dependencies: Vec<RawDependency>,
}

pub struct Inspector {
    config: InspectorConfig,
}

impl Inspector {
    pub fn new(config: InspectorConfig) -> Self {
        Self { config }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Picks the dependency source for a platform.
    pub fn source_for(&self, platform: &Platform) -> Result<Box<dyn DependencySource>, InspectError> {
        let timeout = self.timeout();
        let source: Box<dyn DependencySource> = match platform {
            Platform::Linux => Box::new(LddSource::new(&self.config.ldd, timeout)),
            Platform::MacOs => Box::new(OtoolSource::new(&self.config.otool, timeout)),
            Platform::Windows => Box::new(DumpbinSource::new(&self.config.dumpbin, timeout)),
            Platform::Unsupported(name) => {
                return Err(InspectError::UnsupportedPlatform(name.clone()))
            }
        };
        Ok(source)
    }

    /// Detects the host platform and lists the binary's dependencies with its tool.
    pub fn extract(&self, binary: &Path) -> Result<Extraction, InspectError> {
        self.extract_on(Platform::detect(), binary)
    }

    /// Lists the binary's dependencies with the tool for an already detected platform.
    pub fn extract_on(&self, platform: Platform, binary: &Path) -> Result<Extraction, InspectError> {
        let source = self.source_for(&platform)?;
        let dependencies = run_source(source.as_ref(), binary)?;
        Ok(Extraction {
            platform,
            dependencies,
        })
    }
}

/// Runs one source with logging around it.
pub fn run_source(
    source: &dyn DependencySource,
    binary: &Path,
) -> Result<Vec<RawDependency>, InspectError> {
    debug!(tool = source.tool(), platform = %source.platform(), binary = %binary.display(), "extract dependencies");
    let dependencies = source.extract(binary)?;
    info!(
        tool = source.tool(),
        binary = %binary.display(),
        count = dependencies.len(),
        "dependencies extracted"
    );
    Ok(dependencies)
}

/// Last path component of a reported library, or the token itself.
pub(crate) fn file_name(token: &str) -> String {
    Path::new(token)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| token.to_string())
}
