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

use std::any::Any;

use snafu::Snafu;
use watchlater_error::{ErrorExt, StatusCode};

use crate::model::{DraftField, EntryId};

pub type Result<T> = std::result::Result<T, Error>;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Request to {endpoint} failed"))]
    Network {
        endpoint: String,
        source:   BoxedError,
        #[snafu(implicit)]
        loc:      snafu::Location,
    },
    #[snafu(display("Credential rejected: {message}"))]
    Auth {
        message: String,
        #[snafu(implicit)]
        loc:     snafu::Location,
    },
    #[snafu(display("Invalid playlist: {field} is required"))]
    Validation {
        field: DraftField,
        #[snafu(implicit)]
        loc:   snafu::Location,
    },
    #[snafu(display("Request rejected with status {status}: {message}"))]
    Rejected {
        status:  u16,
        message: String,
        #[snafu(implicit)]
        loc:     snafu::Location,
    },
    #[snafu(display("Playlist {id} not found"))]
    NotFound {
        id:  EntryId,
        #[snafu(implicit)]
        loc: snafu::Location,
    },
    #[snafu(display("Unknown sort option {value:?}"))]
    UnknownSortOption {
        value: String,
        #[snafu(implicit)]
        loc:   snafu::Location,
    },
    #[snafu(display("Operation cancelled"))]
    OperationCancelled {
        #[snafu(implicit)]
        loc: snafu::Location,
    },
}

impl Error {
    /// Whether this error must end the current session.
    pub fn is_auth(&self) -> bool { matches!(self, Self::Auth { .. }) }
}

impl ErrorExt for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Network { .. } => StatusCode::Unavailable,
            Self::Auth { .. } => StatusCode::Unauthorized,
            Self::Validation { .. } | Self::Rejected { .. } | Self::UnknownSortOption { .. } => {
                StatusCode::InvalidArgument
            }
            Self::NotFound { .. } => StatusCode::NotFound,
            Self::OperationCancelled { .. } => StatusCode::Cancelled,
        }
    }

    fn as_any(&self) -> &dyn Any { self }
}
