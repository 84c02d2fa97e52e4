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

//! Collaborator seams: the data service and identity resolution.
//!
//! [`memory`] holds in-process implementations used by tests and offline
//! runs.

use async_trait::async_trait;

use crate::{
    err::Result,
    model::{EntryId, Identity, NewEntry, PlaylistEntry, UserId},
};

#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Every entry, for the anonymous view.
    async fn fetch_all(&self) -> Result<Vec<PlaylistEntry>>;

    async fn fetch_by_owner(&self, owner: &UserId) -> Result<Vec<PlaylistEntry>>;

    /// Fails with `Validation` when `content` or `sauce` is blank.
    async fn create_entry(&self, entry: &NewEntry) -> Result<PlaylistEntry>;

    /// Fails with `NotFound` when `id` does not exist.
    async fn delete_entry(&self, id: EntryId) -> Result<()>;
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Fails with `Auth` for an invalid or expired token.
    async fn resolve_identity(&self, token: &str) -> Result<Identity>;
}

pub mod memory {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use parking_lot::RwLock;
    use snafu::{OptionExt, ensure};

    use super::{IdentityResolver, PlaylistStore};
    use crate::{
        err::{AuthSnafu, NotFoundSnafu, Result, ValidationSnafu},
        model::{DraftField, EntryId, Identity, NewEntry, PlaylistEntry, UserId},
    };

    #[derive(Debug, Clone)]
    struct Owned {
        owner: Option<UserId>,
        entry: PlaylistEntry,
    }

    /// Entries kept in insertion order. New entries belong to the owner set
    /// with [`MemoryStore::act_as`].
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        entries: RwLock<Vec<Owned>>,
        next_id: RwLock<i64>,
        acting:  RwLock<Option<UserId>>,
    }

    impl MemoryStore {
        pub fn new() -> Self { Self::default() }

        /// Owner recorded on subsequently created entries.
        pub fn act_as(&self, owner: Option<UserId>) { *self.acting.write() = owner; }

        /// Seeds an entry as-is, keeping its id.
        pub fn insert(&self, owner: Option<UserId>, entry: PlaylistEntry) {
            let mut next = self.next_id.write();
            *next = (*next).max(entry.id.0);
            self.entries.write().push(Owned { owner, entry });
        }

        pub fn len(&self) -> usize { self.entries.read().len() }

        pub fn is_empty(&self) -> bool { self.entries.read().is_empty() }
    }

    #[async_trait]
    impl PlaylistStore for MemoryStore {
        async fn fetch_all(&self) -> Result<Vec<PlaylistEntry>> {
            Ok(self.entries.read().iter().map(|o| o.entry.clone()).collect())
        }

        async fn fetch_by_owner(&self, owner: &UserId) -> Result<Vec<PlaylistEntry>> {
            Ok(self
                .entries
                .read()
                .iter()
                .filter(|o| o.owner.as_ref() == Some(owner))
                .map(|o| o.entry.clone())
                .collect())
        }

        async fn create_entry(&self, entry: &NewEntry) -> Result<PlaylistEntry> {
            ensure!(
                !entry.content.trim().is_empty(),
                ValidationSnafu {
                    field: DraftField::Content,
                }
            );
            ensure!(
                !entry.sauce.trim().is_empty(),
                ValidationSnafu {
                    field: DraftField::Sauce,
                }
            );
            let id = {
                let mut next = self.next_id.write();
                *next += 1;
                EntryId(*next)
            };
            let created = PlaylistEntry {
                id,
                content: entry.content.clone(),
                sauce: entry.sauce.clone(),
                app: entry.app.clone(),
                date: entry.date.clone(),
                time: entry.time.clone(),
            };
            self.entries.write().push(Owned {
                owner: self.acting.read().clone(),
                entry: created.clone(),
            });
            Ok(created)
        }

        async fn delete_entry(&self, id: EntryId) -> Result<()> {
            let mut entries = self.entries.write();
            let pos = entries
                .iter()
                .position(|o| o.entry.id == id)
                .context(NotFoundSnafu { id })?;
            entries.remove(pos);
            Ok(())
        }
    }

    /// Fixed token table.
    #[derive(Debug, Default)]
    pub struct MemoryIdentity {
        tokens: RwLock<HashMap<String, UserId>>,
    }

    impl MemoryIdentity {
        pub fn new() -> Self { Self::default() }

        pub fn with_token(self, token: impl Into<String>, user: UserId) -> Self {
            self.tokens.write().insert(token.into(), user);
            self
        }

        /// Invalidates a token, as if it had expired server-side.
        pub fn revoke(&self, token: &str) { self.tokens.write().remove(token); }
    }

    #[async_trait]
    impl IdentityResolver for MemoryIdentity {
        async fn resolve_identity(&self, token: &str) -> Result<Identity> {
            let id = self
                .tokens
                .read()
                .get(token)
                .cloned()
                .context(AuthSnafu {
                    message: "unknown or expired token",
                })?;
            Ok(Identity { id })
        }
    }
}
