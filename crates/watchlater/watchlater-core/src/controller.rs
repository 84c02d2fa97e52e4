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

//! Page-level state machine.
//!
//! Loads move the controller through `Loading` into `Loaded` or
//! `LoadFailed`. Every load takes a generation number when it starts; only
//! the load holding the newest generation may write the collection, so a
//! slow response can never overwrite a newer one. Starting a load also
//! cancels the fetch of the load it supersedes.
//!
//! Policies:
//! - a failed load keeps the last good collection and reports through the
//!   notification;
//! - a successful create or delete is followed by a full re-fetch;
//! - an auth failure signs the session out and reloads the anonymous scope.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::Local;
use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use watchlater_error::ErrorExt;

use crate::{
    collab::{IdentityResolver, PlaylistStore},
    dialog::CreateDialog,
    err::{Error, Result},
    model::{DraftField, EntryId, PlaylistEntry},
    notify::{Notice, Notification},
    session::Session,
    sort::{SortOption, sort_entries},
    view::{DataScope, Presentation, ViewMode},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum LoadPhase {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading,
    Loaded,
    LoadFailed,
}

/// How a single load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The collection was replaced with this many entries.
    Applied(usize),
    /// The fetch failed; the previous collection is still shown.
    Failed,
    /// A newer load had started before this one finished.
    Stale,
    /// Superseded while still fetching.
    Cancelled,
    /// The credential was rejected; the session was signed out and the
    /// anonymous scope reloaded.
    SignedOut,
}

#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    pub phase:        LoadPhase,
    /// Sorted by `sort`
    pub entries:      Vec<PlaylistEntry>,
    pub sort:         SortOption,
    pub view:         ViewMode,
    pub dialog:       CreateDialog,
    pub notification: Notification,
}

struct LoadTicket {
    generation: u64,
    cancel:     CancellationToken,
    scope:      DataScope,
}

#[derive(Clone)]
pub struct ListController {
    inner: Arc<Inner>,
}

struct Inner {
    store:      Arc<dyn PlaylistStore>,
    identity:   Arc<dyn IdentityResolver>,
    session:    Session,
    state:      RwLock<ControllerState>,
    generation: AtomicU64,
    /// Generation and cancel token of the newest load still fetching.
    in_flight:  Mutex<Option<(u64, CancellationToken)>>,
}

impl ListController {
    pub fn new(
        store: Arc<dyn PlaylistStore>,
        identity: Arc<dyn IdentityResolver>,
        session: Session,
    ) -> Self {
        Self::with_sort(store, identity, session, SortOption::default())
    }

    pub fn with_sort(
        store: Arc<dyn PlaylistStore>,
        identity: Arc<dyn IdentityResolver>,
        session: Session,
        sort: SortOption,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                identity,
                session,
                state: RwLock::new(ControllerState {
                    sort,
                    ..ControllerState::default()
                }),
                generation: AtomicU64::new(0),
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn session(&self) -> &Session { &self.inner.session }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ControllerState { self.inner.state.read().clone() }

    pub fn phase(&self) -> LoadPhase { self.inner.state.read().phase }

    pub fn entries(&self) -> Vec<PlaylistEntry> { self.inner.state.read().entries.clone() }

    pub fn presentation(&self) -> Presentation {
        let state = self.inner.state.read();
        Presentation::compose(
            state.view,
            self.inner.session.scope(),
            state.sort,
            &state.entries,
        )
    }

    /// Fetches the collection for the current identity.
    ///
    /// Several reloads may run at once; only the most recently started one
    /// is applied. A rejected credential signs out and reloads the public
    /// collection; `SignedOut` is returned whether or not that reload
    /// succeeds, and [`Self::phase`] tells which.
    pub async fn reload(&self) -> LoadOutcome {
        let outcome = self.load_once().await;
        if outcome == LoadOutcome::SignedOut
            && self.load_once().await == LoadOutcome::Failed
        {
            // Keep the sign-out notice over the load failure.
            self.notify(Notice::SignedOut, None);
        }
        outcome
    }

    pub async fn set_sort(&self, sort: SortOption) -> LoadOutcome {
        self.inner.state.write().sort = sort;
        debug!(%sort, "sort option changed");
        self.reload().await
    }

    pub async fn toggle_view(&self) -> LoadOutcome {
        let view = {
            let mut state = self.inner.state.write();
            state.view = state.view.toggled();
            state.view
        };
        debug!(%view, "view mode toggled");
        self.reload().await
    }

    /// To be called when the session changed outside the controller.
    pub async fn identity_changed(&self) -> LoadOutcome { self.reload().await }

    pub async fn sign_in(&self, token: impl Into<String>) -> LoadOutcome {
        self.inner.session.sign_in(token);
        self.reload().await
    }

    pub async fn sign_out(&self) -> LoadOutcome {
        self.inner.session.sign_out();
        self.reload().await
    }

    pub async fn delete(&self, id: EntryId) -> Result<()> {
        match self.inner.store.delete_entry(id).await {
            Ok(()) => {
                info!(%id, "playlist deleted");
                self.notify(Notice::Deleted, None);
                self.reload().await;
                Ok(())
            }
            Err(err) => {
                warn!(%id, error = %err, "delete failed");
                self.action_failed(&err, Notice::DeleteFailed).await;
                Err(err)
            }
        }
    }

    /// Opens the create dialog if creating is offered in the current view.
    pub fn open_create_dialog(&self) -> bool {
        if !self.presentation().show_create {
            return false;
        }
        self.inner.state.write().dialog.open();
        true
    }

    pub fn update_form(&self, field: DraftField, value: impl Into<String>) {
        self.inner.state.write().dialog.set_field(field, value);
    }

    pub fn close_create_dialog(&self) { self.inner.state.write().dialog.close(); }

    /// Submits the dialog form. On success the dialog closes and the
    /// collection is re-fetched; on failure the form is kept.
    pub async fn submit_create(&self) -> Result<PlaylistEntry> {
        let draft = self.inner.state.read().dialog.submit();
        let new_entry = match draft.and_then(|d| d.into_new_entry(Local::now().naive_local())) {
            Ok(new_entry) => new_entry,
            Err(err) => {
                self.notify(Notice::CreateFailed, Some(err.output_msg()));
                return Err(err);
            }
        };

        match self.inner.store.create_entry(&new_entry).await {
            Ok(created) => {
                info!(id = %created.id, app = %created.app, "playlist created");
                {
                    let mut state = self.inner.state.write();
                    state.dialog.close();
                    state.notification.show(Notice::Created, None);
                }
                self.reload().await;
                Ok(created)
            }
            Err(err) => {
                warn!(error = %err, "create failed");
                self.action_failed(&err, Notice::CreateFailed).await;
                Err(err)
            }
        }
    }

    pub fn dismiss_notification(&self) { self.inner.state.write().notification.dismiss(); }

    fn notify(&self, notice: Notice, detail: Option<String>) {
        self.inner.state.write().notification.show(notice, detail);
    }

    async fn action_failed(&self, err: &Error, notice: Notice) {
        if err.is_auth() && self.inner.session.sign_out() {
            self.notify(Notice::SignedOut, None);
            if self.reload().await == LoadOutcome::Failed {
                self.notify(Notice::SignedOut, None);
            }
        } else {
            self.notify(notice, Some(err.output_msg()));
        }
    }

    async fn load_once(&self) -> LoadOutcome {
        let ticket = self.begin_load();
        let fetched = tokio::select! {
            biased;
            () = ticket.cancel.cancelled() => Err(crate::err::OperationCancelledSnafu.build()),
            result = self.fetch(ticket.scope) => result,
        };
        self.finish_load(&ticket, fetched)
    }

    fn begin_load(&self) -> LoadTicket {
        let scope = self.inner.session.scope();
        let cancel = CancellationToken::new();
        let mut in_flight = self.inner.in_flight.lock();
        let mut state = self.inner.state.write();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((previous, token)) = in_flight.replace((generation, cancel.clone())) {
            debug!(previous, generation, "superseding in-flight load");
            token.cancel();
        }
        state.phase = LoadPhase::Loading;
        LoadTicket {
            generation,
            cancel,
            scope,
        }
    }

    async fn fetch(&self, scope: DataScope) -> Result<Vec<PlaylistEntry>> {
        match (scope, self.inner.session.token()) {
            (DataScope::Owned, Some(token)) => {
                let identity = self
                    .inner
                    .identity
                    .resolve_identity(&token)
                    .await?
                    .validated()?;
                self.inner.store.fetch_by_owner(&identity.id).await
            }
            _ => self.inner.store.fetch_all().await,
        }
    }

    fn finish_load(&self, ticket: &LoadTicket, fetched: Result<Vec<PlaylistEntry>>) -> LoadOutcome {
        let outcome = {
            let mut state = self.inner.state.write();
            if self.inner.generation.load(Ordering::SeqCst) != ticket.generation {
                return match fetched {
                    Err(Error::OperationCancelled { .. }) => LoadOutcome::Cancelled,
                    _ => {
                        debug!(generation = ticket.generation, "discarding stale load result");
                        LoadOutcome::Stale
                    }
                };
            }
            match fetched {
                Ok(entries) => {
                    state.entries = sort_entries(&entries, state.sort);
                    state.phase = LoadPhase::Loaded;
                    info!(
                        scope = %ticket.scope,
                        sort = %state.sort,
                        count = state.entries.len(),
                        "playlists loaded"
                    );
                    LoadOutcome::Applied(state.entries.len())
                }
                Err(Error::OperationCancelled { .. }) => LoadOutcome::Cancelled,
                Err(err) => {
                    warn!(scope = %ticket.scope, error = %err, "loading playlists failed");
                    state.phase = LoadPhase::LoadFailed;
                    // The kept collection may predate a sort change.
                    state.entries = sort_entries(&state.entries, state.sort);
                    if err.is_auth() && self.inner.session.sign_out() {
                        state.notification.show(Notice::SignedOut, None);
                        LoadOutcome::SignedOut
                    } else {
                        state.notification.show(Notice::LoadFailed, Some(err.output_msg()));
                        LoadOutcome::Failed
                    }
                }
            }
        };

        let mut in_flight = self.inner.in_flight.lock();
        if in_flight
            .as_ref()
            .is_some_and(|(generation, _)| *generation == ticket.generation)
        {
            *in_flight = None;
        }
        outcome
    }
}
