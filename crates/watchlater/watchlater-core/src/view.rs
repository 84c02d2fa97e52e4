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

//! Composition of what the page shows from view mode and identity.
//!
//! Renderers consume a [`Presentation`]; they never branch on the session or
//! the view mode themselves.

use crate::{
    model::{EntryId, PlaylistEntry},
    sort::SortOption,
};

/// Card media aspect ratio (16:9).
pub const CARD_ASPECT_RATIO: f32 = 16.0 / 9.0;

pub const TABLE_COLUMNS: [&str; 5] = ["Content", "App", "Source", "Date", "Time"];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Playlists,
    Feed,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Playlists => Self::Feed,
            Self::Feed => Self::Playlists,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Playlists => "Playlists",
            Self::Feed => "Video Feed",
        }
    }

    /// Label of the button that switches away from this mode.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Playlists => "Switch to Views",
            Self::Feed => "Switch to Playlists",
        }
    }
}

/// Which data set is loaded: everyone's entries or the signed-in user's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DataScope {
    All,
    Owned,
}

impl DataScope {
    pub fn for_session(signed_in: bool) -> Self {
        if signed_in {
            Self::Owned
        } else {
            Self::All
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    CardGrid,
    Table,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardModel {
    pub id:           EntryId,
    /// Uppercased first letter of the platform name
    pub avatar:       char,
    pub app:          String,
    pub content:      String,
    /// Media URL handed to the embedded player
    pub sauce:        String,
    /// "date at time"
    pub caption:      String,
    pub aspect_ratio: f32,
}

impl From<&PlaylistEntry> for CardModel {
    fn from(entry: &PlaylistEntry) -> Self {
        let avatar = entry
            .app
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('?');
        Self {
            id: entry.id,
            avatar,
            app: entry.app.clone(),
            content: entry.content.clone(),
            sauce: entry.sauce.clone(),
            caption: entry.scheduled_label(),
            aspect_ratio: CARD_ASPECT_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id:      EntryId,
    pub content: String,
    pub app:     String,
    pub sauce:   String,
    pub date:    String,
    pub time:    String,
}

impl TableRow {
    /// Cells in [`TABLE_COLUMNS`] order.
    pub fn cells(&self) -> [&str; 5] {
        [&self.content, &self.app, &self.sauce, &self.date, &self.time]
    }
}

impl From<&PlaylistEntry> for TableRow {
    fn from(entry: &PlaylistEntry) -> Self {
        Self {
            id:      entry.id,
            content: entry.content.clone(),
            app:     entry.app.clone(),
            sauce:   entry.sauce.clone(),
            date:    entry.date.clone(),
            time:    entry.time.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Cards(Vec<CardModel>),
    Table(Vec<TableRow>),
}

impl Body {
    pub fn len(&self) -> usize {
        match self {
            Self::Cards(cards) => cards.len(),
            Self::Table(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn ids(&self) -> Vec<EntryId> {
        match self {
            Self::Cards(cards) => cards.iter().map(|c| c.id).collect(),
            Self::Table(rows) => rows.iter().map(|r| r.id).collect(),
        }
    }
}

/// Everything a renderer needs for one frame of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub title:        &'static str,
    pub toggle_label: &'static str,
    pub scope:        DataScope,
    pub layout:       Layout,
    /// The create button is offered
    pub show_create:  bool,
    /// The sort selector is offered
    pub show_sort:    bool,
    pub sort:         SortOption,
    pub body:         Body,
}

impl Presentation {
    /// Cards only for the signed-in playlist view; every other combination
    /// renders the table.
    pub fn compose(
        view: ViewMode,
        scope: DataScope,
        sort: SortOption,
        entries: &[PlaylistEntry],
    ) -> Self {
        let personal = view == ViewMode::Playlists && scope == DataScope::Owned;
        let (layout, body) = if personal {
            (
                Layout::CardGrid,
                Body::Cards(entries.iter().map(CardModel::from).collect()),
            )
        } else {
            (
                Layout::Table,
                Body::Table(entries.iter().map(TableRow::from).collect()),
            )
        };
        Self {
            title: view.title(),
            toggle_label: view.toggle_label(),
            scope,
            layout,
            show_create: personal,
            show_sort: personal,
            sort,
            body,
        }
    }
}
