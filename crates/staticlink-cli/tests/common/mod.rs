#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated HOME and config directory so the user's own config never leaks in.
pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub home: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let home = root.join("home");
        fs::create_dir_all(&home).expect("create isolated home");
        Self {
            _tmp: tmp,
            root,
            home,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("staticlink");
        cmd.env("HOME", &self.home)
            .env("XDG_CONFIG_HOME", self.home.join(".config"))
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write fixture");
        path
    }

    /// A shell script standing in for an inspection tool.
    #[cfg(unix)]
    pub fn fake_tool(&self, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.write(name, &format!("#!/bin/sh\n{script}\n"));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod tool");
        path
    }

    /// Config file that swaps `ldd` for `tool`.
    pub fn config_with_ldd(&self, tool: &Path, timeout_secs: u64) -> PathBuf {
        self.write(
            "config.toml",
            &format!(
                "[inspector]\ntimeout_secs = {timeout_secs}\nldd = \"{}\"\n",
                tool.display()
            ),
        )
    }
}
