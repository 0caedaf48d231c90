pub mod config;
pub mod error;
pub mod identity;
pub mod platform;
pub mod types;

pub use config::{ClassifierConfig, Config, ConfigPaths, InspectorConfig, MatchField, MatchKind, Matcher, PolicyConfig};
pub use error::InspectError;
pub use identity::BinaryIdentity;
pub use platform::Platform;
pub use types::{Dependency, RawDependency, Status, VerificationResult};
