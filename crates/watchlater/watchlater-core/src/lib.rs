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

//! Headless core of the watch-later page.
//!
//! [`ListController`] owns the playlist collection together with the sort,
//! view, dialog and notification state, and drives loads against the
//! [`PlaylistStore`] and [`IdentityResolver`] collaborators. Renderers read a
//! [`Presentation`] from it and never touch the collaborators directly.

pub mod app_name;
pub mod collab;
pub mod controller;
pub mod dialog;
pub mod err;
pub mod model;
pub mod notify;
pub mod session;
pub mod sort;
pub mod view;

pub use app_name::{Platform, UNKNOWN_APP, derive_app_name};
pub use collab::{IdentityResolver, PlaylistStore};
pub use controller::{ControllerState, ListController, LoadOutcome, LoadPhase};
pub use dialog::CreateDialog;
pub use err::{Error, Result};
pub use model::{DraftField, EntryDraft, EntryId, Identity, NewEntry, PlaylistEntry, UserId};
pub use notify::{Notice, Notification};
pub use session::{AuthState, Session};
pub use sort::{SortOption, sort_entries};
pub use view::{Body, CardModel, DataScope, Layout, Presentation, TableRow, ViewMode};
