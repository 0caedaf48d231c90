use std::process::Command;

/// Variables that inject libraries into every process the loader starts.
/// Left in place they show up in the tool's output as extra dependencies.
pub const SCRUBBED_VARS: &[&str] = &["LD_PRELOAD", "LD_AUDIT", "DYLD_INSERT_LIBRARIES"];

pub fn sanitize_env(command: &mut Command) {
    for name in SCRUBBED_VARS {
        command.env_remove(name);
    }
}
