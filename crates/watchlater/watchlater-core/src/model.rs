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

//! Playlist entries as exchanged with the data service, and the draft that
//! the create dialog builds.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use snafu::ensure;

use crate::{
    app_name::derive_app_name,
    err::{AuthSnafu, Result, ValidationSnafu},
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const TIME_FORMAT: &str = "%H:%M";

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", TIME_FORMAT];

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
    derive_more::FromStr,
)]
#[serde(transparent)]
pub struct EntryId(pub i64);

/// Owner identifier. The identity service may send it as a string or a
/// number; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Signed(n) => Self(n.to_string()),
            Raw::Unsigned(n) => Self(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
}

impl Identity {
    /// Rejects identities without a usable id.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.id.as_str().trim().is_empty(),
            AuthSnafu {
                message: "identity has no id",
            }
        );
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id:      EntryId,
    pub content: String,
    /// Source URL of the video.
    pub sauce:   String,
    #[serde(default)]
    pub app:     String,
    #[serde(default)]
    pub date:    String,
    #[serde(default)]
    pub time:    String,
}

impl PlaylistEntry {
    /// Combined date and time, if the date parses.
    ///
    /// A missing or malformed time with a valid date is taken as midnight.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()?;
        match parse_time(&self.time) {
            Some(time) => Some(date.and_time(time)),
            None => date.and_hms_opt(0, 0, 0),
        }
    }

    /// "`date` at `time`", as shown under a card.
    pub fn scheduled_label(&self) -> String { format!("{} at {}", self.date, self.time) }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum DraftField {
    Content,
    Sauce,
    Date,
    Time,
}

/// Form state of the create dialog. Every field may still be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryDraft {
    pub content: String,
    pub sauce:   String,
    pub date:    String,
    pub time:    String,
}

impl EntryDraft {
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Content => self.content = value,
            DraftField::Sauce => self.sauce = value,
            DraftField::Date => self.date = value,
            DraftField::Time => self.time = value,
        }
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Content => &self.content,
            DraftField::Sauce => &self.sauce,
            DraftField::Date => &self.date,
            DraftField::Time => &self.time,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.content.trim().is_empty(),
            ValidationSnafu {
                field: DraftField::Content,
            }
        );
        ensure!(
            !self.sauce.trim().is_empty(),
            ValidationSnafu {
                field: DraftField::Sauce,
            }
        );
        Ok(())
    }

    /// Builds the creation request, filling a blank date or time from `now`
    /// and deriving `app` from the source URL.
    pub fn into_new_entry(self, now: NaiveDateTime) -> Result<NewEntry> {
        self.validate()?;
        let date = non_blank_or(self.date, || now.format(DATE_FORMAT).to_string());
        let time = non_blank_or(self.time, || now.format(TIME_FORMAT).to_string());
        let sauce = self.sauce.trim().to_owned();
        Ok(NewEntry {
            content: self.content.trim().to_owned(),
            app: derive_app_name(&sauce),
            sauce,
            date,
            time,
        })
    }
}

fn non_blank_or(value: String, fallback: impl FnOnce() -> String) -> String {
    if value.trim().is_empty() {
        fallback()
    } else {
        value.trim().to_owned()
    }
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub content: String,
    pub sauce:   String,
    pub app:     String,
    pub date:    String,
    pub time:    String,
}
