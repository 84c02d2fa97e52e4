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

use std::{io::ErrorKind, path::Path};

use bon::Builder;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use snafu::{ResultExt, Whatever, whatever};
use watchlater_client::ClientConfig;
use watchlater_common_telemetry::logging::{LoggingOptions, parse_level};
use watchlater_core::SortOption;

/// Configuration for the application, read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SmartDefault, Builder)]
#[serde(default)]
pub struct AppConfig {
    /// REST backend settings
    #[builder(default)]
    pub client:       ClientConfig,
    /// Logging goes to files only so it never mixes with command output
    #[default(_code = "quiet_logging()")]
    #[builder(default = quiet_logging())]
    pub logging:      LoggingOptions,
    /// Order used by `list` when no `--sort` is given
    #[builder(default)]
    pub default_sort: SortOption,
}

fn quiet_logging() -> LoggingOptions { LoggingOptions::builder().append_stdout(false).build() }

impl AppConfig {
    /// Reads the config at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, Whatever> {
        let config: Self = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .with_whatever_context(|_| format!("Failed to parse {}", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(e)
                    .with_whatever_context(|_| format!("Failed to read {}", path.display()));
            }
        };
        if let Some(Err(e)) = config.logging.level.as_deref().map(parse_level) {
            whatever!("{}: {e}", path.display());
        }
        Ok(config)
    }

    /// Fills the log directory from the platform layout when unset.
    #[must_use]
    pub fn with_default_log_dir(mut self) -> Self {
        if self.logging.dir.is_empty() {
            self.logging.dir = watchlater_paths::logs_dir().display().to_string();
        }
        self
    }
}
