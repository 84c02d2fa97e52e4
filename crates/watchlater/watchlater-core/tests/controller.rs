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

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use parking_lot::Mutex;
use snafu::IntoError;
use tokio::sync::{Notify, oneshot};
use watchlater_common_telemetry::init_default_ut_logging;
use watchlater_core::{
    DraftField, EntryId, Error, IdentityResolver, Layout, ListController, LoadOutcome, LoadPhase,
    NewEntry, Notice, PlaylistEntry, PlaylistStore, Result, Session, SortOption, UserId,
    ViewMode,
    collab::memory::{MemoryIdentity, MemoryStore},
    err::NetworkSnafu,
    sort_entries,
};

const TOKEN: &str = "token-alice";

fn entry(id: i64, content: &str, date: &str) -> PlaylistEntry {
    PlaylistEntry {
        id:      EntryId(id),
        content: content.into(),
        sauce:   format!("https://www.youtube.com/watch?v={id}"),
        app:     "youtube".into(),
        date:    date.into(),
        time:    "12:00".into(),
    }
}

fn alice() -> UserId { UserId::new("alice") }

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert(Some(alice()), entry(1, "banana", "2024-01-01"));
    store.insert(None, entry(2, "Apple", "2024-01-03"));
    store.insert(Some(alice()), entry(3, "cherry", "2024-01-02"));
    store.act_as(Some(alice()));
    store
}

/// Memory store that can park fetches and inject failures.
struct GatedStore {
    inner:   MemoryStore,
    gates:   Mutex<VecDeque<oneshot::Receiver<()>>>,
    entered: Notify,
    failing: AtomicBool,
    fetches: AtomicUsize,
}

impl GatedStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            gates: Mutex::new(VecDeque::new()),
            entered: Notify::new(),
            failing: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Parks the next fetch until the returned sender fires or is dropped.
    fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().push_back(rx);
        tx
    }

    fn set_failing(&self, failing: bool) { self.failing.store(failing, Ordering::SeqCst); }

    async fn gate(&self) -> Result<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().pop_front();
        if let Some(rx) = gate {
            self.entered.notify_one();
            let _ = rx.await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(NetworkSnafu {
                endpoint: "memory://playlists",
            }
            .into_error(Box::new(std::io::Error::other("backend down"))));
        }
        Ok(())
    }
}

#[async_trait]
impl PlaylistStore for GatedStore {
    async fn fetch_all(&self) -> Result<Vec<PlaylistEntry>> {
        self.gate().await?;
        self.inner.fetch_all().await
    }

    async fn fetch_by_owner(&self, owner: &UserId) -> Result<Vec<PlaylistEntry>> {
        self.gate().await?;
        self.inner.fetch_by_owner(owner).await
    }

    async fn create_entry(&self, entry: &NewEntry) -> Result<PlaylistEntry> {
        self.inner.create_entry(entry).await
    }

    async fn delete_entry(&self, id: EntryId) -> Result<()> { self.inner.delete_entry(id).await }
}

fn identity() -> Arc<MemoryIdentity> { Arc::new(MemoryIdentity::new().with_token(TOKEN, alice())) }

fn controller(store: &Arc<GatedStore>, session: Session) -> ListController {
    ListController::new(store.clone(), identity(), session)
}

fn ids(controller: &ListController) -> Vec<i64> {
    controller.entries().iter().map(|e| e.id.0).collect()
}

#[tokio::test]
async fn anonymous_load_lists_everything_as_table() {
    init_default_ut_logging();
    let store = Arc::new(GatedStore::new(seeded_store()));
    let controller = controller(&store, Session::anonymous());
    assert_eq!(controller.phase(), LoadPhase::Idle);

    assert_eq!(controller.reload().await, LoadOutcome::Applied(3));
    assert_eq!(controller.phase(), LoadPhase::Loaded);
    assert_eq!(ids(&controller), [2, 3, 1]);

    let presentation = controller.presentation();
    assert_eq!(presentation.layout, Layout::Table);
    assert!(!presentation.show_create);
    assert!(!controller.open_create_dialog());
}

#[tokio::test]
async fn signed_in_load_lists_owned_entries_as_cards() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    let controller = controller(&store, Session::signed_in(TOKEN));

    assert_eq!(controller.reload().await, LoadOutcome::Applied(2));
    assert_eq!(ids(&controller), [3, 1]);

    let presentation = controller.presentation();
    assert_eq!(presentation.layout, Layout::CardGrid);
    assert!(presentation.show_create && presentation.show_sort);
    assert_eq!(presentation.body.ids(), [EntryId(3), EntryId(1)]);
}

#[tokio::test]
async fn sort_change_refetches_and_reorders() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    let controller = controller(&store, Session::anonymous());
    controller.reload().await;

    assert_eq!(
        controller.set_sort(SortOption::ContentAsc).await,
        LoadOutcome::Applied(3)
    );
    let contents: Vec<_> = controller.entries().into_iter().map(|e| e.content).collect();
    assert_eq!(contents, ["Apple", "banana", "cherry"]);
    assert_eq!(store.fetches.load(Ordering::SeqCst), 2);

    controller.set_sort(SortOption::DateAsc).await;
    assert_eq!(ids(&controller), [1, 3, 2]);
}

#[tokio::test]
async fn view_toggle_switches_to_feed_table() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    let controller = controller(&store, Session::signed_in(TOKEN));
    controller.reload().await;

    assert_eq!(controller.toggle_view().await, LoadOutcome::Applied(2));
    let presentation = controller.presentation();
    assert_eq!(controller.snapshot().view, ViewMode::Feed);
    assert_eq!(presentation.title, "Video Feed");
    assert_eq!(presentation.layout, Layout::Table);
    assert!(!controller.open_create_dialog());
}

#[tokio::test]
async fn rapid_sort_changes_apply_only_the_last() {
    init_default_ut_logging();
    let store = Arc::new(GatedStore::new(seeded_store()));
    let controller = controller(&store, Session::anonymous());
    controller.reload().await;

    let _gate = store.hold_next();
    let slow = tokio::spawn({
        let controller = controller.clone();
        async move { controller.set_sort(SortOption::ContentDesc).await }
    });
    store.entered.notified().await;

    let fast = controller.set_sort(SortOption::DateAsc).await;
    assert_eq!(fast, LoadOutcome::Applied(3));

    let slow = slow.await.unwrap();
    assert!(
        matches!(slow, LoadOutcome::Cancelled | LoadOutcome::Stale),
        "{slow:?}"
    );
    let state = controller.snapshot();
    assert_eq!(state.sort, SortOption::DateAsc);
    assert_eq!(state.phase, LoadPhase::Loaded);
    assert_eq!(ids(&controller), [1, 3, 2]);
}

#[tokio::test]
async fn failed_load_keeps_last_good_collection() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    let controller = controller(&store, Session::anonymous());
    controller.reload().await;

    store.set_failing(true);
    assert_eq!(
        controller.set_sort(SortOption::ContentAsc).await,
        LoadOutcome::Failed
    );
    let state = controller.snapshot();
    assert_eq!(state.phase, LoadPhase::LoadFailed);
    assert_eq!(state.entries.len(), 3);
    assert_eq!(state.notification.notice(), Some(Notice::LoadFailed));

    store.set_failing(false);
    assert_eq!(controller.reload().await, LoadOutcome::Applied(3));
    assert_eq!(controller.phase(), LoadPhase::Loaded);
}

#[tokio::test]
async fn failed_load_after_sort_change_reorders_kept_entries() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    let controller = controller(&store, Session::anonymous());
    controller.reload().await;
    let loaded = controller.entries();

    store.set_failing(true);
    controller.set_sort(SortOption::ContentAsc).await;

    let state = controller.snapshot();
    assert_eq!(state.sort, SortOption::ContentAsc);
    assert_eq!(state.entries, sort_entries(&loaded, SortOption::ContentAsc));
    let presentation = controller.presentation();
    assert_eq!(presentation.sort, SortOption::ContentAsc);
    assert_eq!(presentation.body.ids(), [EntryId(2), EntryId(1), EntryId(3)]);
}

#[tokio::test]
async fn sign_out_notice_survives_failed_public_reload() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    store.set_failing(true);
    let identity = identity();
    identity.revoke(TOKEN);
    let session = Session::signed_in(TOKEN);
    let controller = ListController::new(store.clone(), identity, session.clone());

    assert_eq!(controller.reload().await, LoadOutcome::SignedOut);
    assert!(!session.is_signed_in());
    let state = controller.snapshot();
    assert_eq!(state.phase, LoadPhase::LoadFailed);
    assert_eq!(state.notification.notice(), Some(Notice::SignedOut));
    assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expired_token_signs_out_and_shows_public_list() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    let identity = identity();
    identity.revoke(TOKEN);
    let session = Session::signed_in(TOKEN);
    let controller = ListController::new(store.clone(), identity, session.clone());

    assert_eq!(controller.reload().await, LoadOutcome::SignedOut);
    assert!(!session.is_signed_in());
    let state = controller.snapshot();
    assert_eq!(state.phase, LoadPhase::Loaded);
    assert_eq!(state.entries.len(), 3);
    assert_eq!(state.notification.notice(), Some(Notice::SignedOut));
    assert_eq!(controller.presentation().layout, Layout::Table);
}

#[tokio::test]
async fn deleting_missing_id_reports_and_keeps_collection() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    let controller = controller(&store, Session::signed_in(TOKEN));
    controller.reload().await;
    let before = controller.entries();
    let fetches = store.fetches.load(Ordering::SeqCst);

    let err = controller.delete(EntryId(404)).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    let state = controller.snapshot();
    assert_eq!(state.entries, before);
    assert_eq!(state.notification.notice(), Some(Notice::DeleteFailed));
    assert_eq!(
        state.notification.message().unwrap(),
        "Error deleting playlist: Playlist 404 not found"
    );
    assert_eq!(store.fetches.load(Ordering::SeqCst), fetches);
}

#[tokio::test]
async fn delete_refetches_collection() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    let controller = controller(&store, Session::signed_in(TOKEN));
    controller.reload().await;

    controller.delete(EntryId(3)).await.unwrap();
    assert_eq!(ids(&controller), [1]);
    assert_eq!(
        controller.snapshot().notification.notice(),
        Some(Notice::Deleted)
    );
}

#[tokio::test]
async fn create_flow_closes_dialog_and_refetches() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    let controller = controller(&store, Session::signed_in(TOKEN));
    controller.reload().await;

    assert!(controller.open_create_dialog());
    controller.update_form(DraftField::Content, "Conference talk");
    controller.update_form(DraftField::Sauce, "https://vimeo.com/76979871");
    controller.update_form(DraftField::Date, "2024-02-01");
    controller.update_form(DraftField::Time, "09:30");

    let created = controller.submit_create().await.unwrap();
    assert_eq!(created.app, "vimeo");

    let state = controller.snapshot();
    assert!(!state.dialog.is_open());
    assert_eq!(state.notification.notice(), Some(Notice::Created));
    assert_eq!(state.entries.first().map(|e| e.id), Some(created.id));
    assert_eq!(state.entries.len(), 3);
}

#[tokio::test]
async fn invalid_create_keeps_dialog_open() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    let controller = controller(&store, Session::signed_in(TOKEN));
    controller.reload().await;

    assert!(controller.open_create_dialog());
    controller.update_form(DraftField::Sauce, "https://youtu.be/x");
    let err = controller.submit_create().await.unwrap_err();
    assert!(matches!(err, Error::Validation { field: DraftField::Content, .. }));

    let state = controller.snapshot();
    assert!(state.dialog.is_open());
    assert_eq!(state.dialog.form().sauce, "https://youtu.be/x");
    assert_eq!(state.notification.notice(), Some(Notice::CreateFailed));
    assert_eq!(store.inner.len(), 3);

    controller.dismiss_notification();
    controller.close_create_dialog();
    let state = controller.snapshot();
    assert!(!state.notification.is_open());
    assert!(!state.dialog.is_open());
}

#[tokio::test]
async fn sign_in_and_out_switch_scope() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    let controller = controller(&store, Session::anonymous());
    controller.reload().await;
    assert_eq!(controller.entries().len(), 3);

    assert_eq!(controller.sign_in(TOKEN).await, LoadOutcome::Applied(2));
    assert_eq!(controller.presentation().layout, Layout::CardGrid);

    assert_eq!(controller.sign_out().await, LoadOutcome::Applied(3));
    assert_eq!(controller.presentation().layout, Layout::Table);
}

struct RejectingIdentity;

#[async_trait]
impl IdentityResolver for RejectingIdentity {
    async fn resolve_identity(&self, _token: &str) -> Result<watchlater_core::Identity> {
        Err(watchlater_core::err::AuthSnafu {
            message: "expired",
        }
        .build())
    }
}

#[tokio::test]
async fn identity_change_is_picked_up_on_reload() {
    let store = Arc::new(GatedStore::new(seeded_store()));
    let session = Session::anonymous();
    let controller =
        ListController::new(store.clone(), Arc::new(RejectingIdentity), session.clone());
    controller.reload().await;

    session.sign_in("whatever");
    assert_eq!(controller.identity_changed().await, LoadOutcome::SignedOut);
    assert!(!session.is_signed_in());
    assert_eq!(controller.entries().len(), 3);
}
