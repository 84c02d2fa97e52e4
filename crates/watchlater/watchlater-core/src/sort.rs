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

//! Ordering of the playlist collection.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::{
    err::{Result, UnknownSortOptionSnafu},
    model::PlaylistEntry,
};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum_macros::EnumString,
    strum_macros::Display,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SortOption {
    /// Most recent date and time first
    #[default]
    DateDesc,
    /// Oldest date and time first
    DateAsc,
    /// Content A to Z, ignoring case
    ContentAsc,
    /// Content Z to A, ignoring case
    ContentDesc,
}

impl SortOption {
    /// Parses the wire name (`dateDesc`, `dateAsc`, `contentAsc`,
    /// `contentDesc`). Anything else is rejected rather than defaulted.
    pub fn parse(value: &str) -> Result<Self> {
        value.parse::<Self>().map_err(|_| {
            UnknownSortOptionSnafu {
                value: value.to_owned(),
            }
            .build()
        })
    }

    /// Returns the display label for this sort option.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DateDesc => "Newest First",
            Self::DateAsc => "Oldest First",
            Self::ContentAsc => "Content (A-Z)",
            Self::ContentDesc => "Content (Z-A)",
        }
    }
}

/// Returns `entries` ordered by `option`, leaving the input untouched.
///
/// The sort is stable in every mode: entries with equal keys keep their
/// input order, including under the descending options. Entries without a
/// parseable date rank as the oldest.
pub fn sort_entries(entries: &[PlaylistEntry], option: SortOption) -> Vec<PlaylistEntry> {
    let mut sorted = entries.to_vec();
    match option {
        SortOption::DateDesc => sorted.sort_by_cached_key(|e| Reverse(e.timestamp())),
        SortOption::DateAsc => sorted.sort_by_cached_key(PlaylistEntry::timestamp),
        SortOption::ContentAsc => sorted.sort_by_cached_key(|e| content_key(&e.content)),
        SortOption::ContentDesc => sorted.sort_by_cached_key(|e| Reverse(content_key(&e.content))),
    }
    sorted
}

/// Case-insensitive key; `String` ordering then compares code points.
fn content_key(content: &str) -> String { content.to_lowercase() }
