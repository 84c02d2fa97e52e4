// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Where watchlater keeps its configuration, session token and logs.
//!
//! All paths are resolved once and cached for the life of the process. A
//! custom data directory (for tests or portable installs) must be set before
//! any other path is requested.

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

const APP_DIR: &str = "watchlater";

static HOME_DIR: OnceLock<PathBuf> = OnceLock::new();

static CUSTOM_DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

static CURRENT_DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

pub fn home_dir() -> &'static PathBuf {
    HOME_DIR.get_or_init(|| dirs::home_dir().expect("failed to determine home directory"))
}

pub fn config_dir() -> &'static PathBuf {
    CONFIG_DIR.get_or_init(|| {
        if let Some(custom_dir) = CUSTOM_DATA_DIR.get() {
            custom_dir.join("config")
        } else if let Some(dir) = dirs::config_dir() {
            dir.join(APP_DIR)
        } else {
            home_dir().join(".config").join(APP_DIR)
        }
    })
}

pub fn data_dir() -> &'static PathBuf {
    CURRENT_DATA_DIR.get_or_init(|| {
        if let Some(custom_dir) = CUSTOM_DATA_DIR.get() {
            custom_dir.clone()
        } else if let Some(dir) = dirs::data_local_dir() {
            dir.join(APP_DIR)
        } else {
            home_dir().join(".local").join("share").join(APP_DIR)
        }
    })
}

/// Overrides the data directory root; config lives under `<dir>/config`.
///
/// # Panics
///
/// If called after `data_dir` or `config_dir` was resolved, or if the
/// directory cannot be created.
pub fn set_custom_data_dir<P: ?Sized + AsRef<Path>>(dir: &P) -> &'static PathBuf {
    if CURRENT_DATA_DIR.get().is_some() || CONFIG_DIR.get().is_some() {
        panic!("set_custom_data_dir called after data_dir or config_dir was initialized");
    }
    CUSTOM_DATA_DIR.get_or_init(|| {
        let mut path = dir.as_ref().to_path_buf();
        if path.is_relative() {
            if let Ok(abs) = path.canonicalize() {
                path = abs;
            }
        }

        std::fs::create_dir_all(&path).unwrap_or_else(|e| {
            panic!(
                "failed to create custom data directory {}: {e}",
                path.display()
            )
        });

        path
    })
}

pub fn logs_dir() -> &'static PathBuf {
    static LOGS_DIR: OnceLock<PathBuf> = OnceLock::new();
    LOGS_DIR.get_or_init(|| data_dir().join("logs"))
}

/// `config.toml` inside the config directory.
pub fn config_file() -> &'static PathBuf {
    static CONFIG_FILE: OnceLock<PathBuf> = OnceLock::new();
    CONFIG_FILE.get_or_init(|| config_dir().join("config.toml"))
}

/// Persisted session token.
pub fn token_file() -> &'static PathBuf {
    static TOKEN_FILE: OnceLock<PathBuf> = OnceLock::new();
    TOKEN_FILE.get_or_init(|| config_dir().join("token"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_data_dir_holds_everything() {
        let tempdir = tempfile::TempDir::new().unwrap();
        let root = set_custom_data_dir(tempdir.path()).clone();

        assert_eq!(data_dir(), &root);
        assert_eq!(config_file(), &root.join("config").join("config.toml"));
        assert_eq!(token_file(), &root.join("config").join("token"));
        assert_eq!(logs_dir(), &root.join("logs"));
    }
}
