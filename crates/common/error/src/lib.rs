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

//! Shared error classification for the watch-later crates.
//!
//! Every crate keeps its own `snafu` error enum; this crate only provides the
//! common vocabulary used to classify those errors, both when turning a
//! remote HTTP status into an error and when deciding how an error should be
//! surfaced to the user.

use std::{any::Any, error::Error as StdError};

use http::StatusCode as HttpStatusCode;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, strum_macros::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusCode {
    InvalidArgument,
    NotFound,
    Unauthorized,
    Forbidden,
    Unavailable,
    Cancelled,
    Internal,
    Unknown,
}

impl StatusCode {
    /// Classifies a response status returned by a remote service.
    ///
    /// Returns `None` for success statuses.
    pub fn from_http(status: HttpStatusCode) -> Option<Self> {
        if status.is_success() {
            return None;
        }
        let code = match status {
            HttpStatusCode::BAD_REQUEST | HttpStatusCode::UNPROCESSABLE_ENTITY => {
                Self::InvalidArgument
            }
            HttpStatusCode::UNAUTHORIZED => Self::Unauthorized,
            HttpStatusCode::FORBIDDEN => Self::Forbidden,
            HttpStatusCode::NOT_FOUND => Self::NotFound,
            HttpStatusCode::BAD_GATEWAY
            | HttpStatusCode::SERVICE_UNAVAILABLE
            | HttpStatusCode::GATEWAY_TIMEOUT => Self::Unavailable,
            s if s.is_server_error() => Self::Internal,
            _ => Self::Unknown,
        };
        Some(code)
    }

    /// Whether the status means the caller's credential was rejected.
    pub fn is_auth_failure(self) -> bool { matches!(self, Self::Unauthorized | Self::Forbidden) }
}

pub trait ErrorExt: StdError {
    fn status_code(&self) -> StatusCode { StatusCode::Unknown }

    fn as_any(&self) -> &dyn Any;

    /// Message suitable for showing outside the process.
    ///
    /// Internal failures only expose their code; everything else shows the
    /// error followed by its innermost cause.
    fn output_msg(&self) -> String
    where
        Self: Sized,
    {
        match self.status_code() {
            StatusCode::Unknown | StatusCode::Internal => {
                format!("Internal error: {}", self.status_code().as_ref())
            }
            _ => match self.root_cause() {
                Some(root) => format!("{self}: {root}"),
                None => format!("{self}"),
            },
        }
    }

    fn root_cause(&self) -> Option<&dyn StdError>
    where
        Self: Sized,
    {
        let mut source = self.source()?;
        while let Some(next) = source.source() {
            source = next;
        }
        Some(source)
    }
}
