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

use std::time::Duration;

use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SmartDefault, bon::Builder)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the REST API; a trailing slash is added when missing
    #[default(_code = "DEFAULT_BASE_URL.to_string()")]
    #[builder(default = DEFAULT_BASE_URL.to_string(), into)]
    pub base_url:     String,

    /// Per-request timeout in seconds (default: 10)
    #[default = 10]
    #[builder(default = 10)]
    pub timeout_secs: u64,

    #[default(_code = "concat!(\"watchlater/\", env!(\"CARGO_PKG_VERSION\")).to_string()")]
    #[builder(default = concat!("watchlater/", env!("CARGO_PKG_VERSION")).to_string(), into)]
    pub user_agent:   String,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"timeout_secs": 3}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert!(config.user_agent.starts_with("watchlater/"));
    }

    #[test]
    fn builder_matches_default() {
        assert_eq!(ClientConfig::builder().build(), ClientConfig::default());
        let config = ClientConfig::builder().base_url("https://api.example.com").build();
        assert_eq!(config.base_url, "https://api.example.com");
    }
}
