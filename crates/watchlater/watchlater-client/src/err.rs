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

use std::path::PathBuf;

use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid base url {url:?}"))]
    InvalidBaseUrl {
        url:    String,
        source: url::ParseError,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Failed to build http client"))]
    BuildClient {
        source: reqwest::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Failed to do file operation on {}", path.display()))]
    FileIO {
        source: std::io::Error,
        path:   PathBuf,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Unexpected status {status}{}", body_suffix(body)))]
    UnexpectedStatus {
        status: u16,
        body:   String,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Failed to decode response body"))]
    Decode {
        source: serde_json::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("Failed to encode request body"))]
    Encode {
        source: serde_json::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}
