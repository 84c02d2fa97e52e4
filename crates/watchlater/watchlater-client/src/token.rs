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

//! Persisted session token.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use snafu::ResultExt;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::err::{FileIOSnafu, Result};

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }

    /// Stored token, or `None` when there is no file or it is blank.
    pub async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_owned()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context(FileIOSnafu {
                path: self.path.clone(),
            }),
        }
    }

    /// Writes through a temp file and renames it into place.
    pub async fn save(&self, token: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .context(FileIOSnafu { path: dir })?;
        }
        let tmpfile_path = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmpfile_path)
            .await
            .context(FileIOSnafu {
                path: tmpfile_path.clone(),
            })?;
        file.write_all(token.trim().as_bytes())
            .await
            .context(FileIOSnafu {
                path: tmpfile_path.clone(),
            })?;
        file.flush().await.context(FileIOSnafu {
            path: tmpfile_path.clone(),
        })?;
        file.sync_all().await.context(FileIOSnafu {
            path: tmpfile_path.clone(),
        })?;
        tokio::fs::rename(&tmpfile_path, &self.path)
            .await
            .context(FileIOSnafu {
                path: self.path.clone(),
            })?;
        info!("Updated session token at: {:?}", self.path);
        Ok(())
    }

    /// Removes the token. A missing file is not an error.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Removed session token at: {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context(FileIOSnafu {
                path: self.path.clone(),
            }),
        }
    }
}
