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

//! The page's single transient notification (snackbar).

use std::time::{Duration, Instant};

pub const AUTO_HIDE: Duration = Duration::from_millis(6000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Notice {
    #[display("Playlist deleted successfully")]
    Deleted,
    #[display("Error deleting playlist")]
    DeleteFailed,
    #[display("Playlist created successfully")]
    Created,
    #[display("Error creating playlist")]
    CreateFailed,
    #[display("Error loading playlists")]
    LoadFailed,
    #[display("Session expired, please sign in again")]
    SignedOut,
}

impl Notice {
    pub fn is_error(self) -> bool { !matches!(self, Self::Deleted | Self::Created) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Shown {
    notice:   Notice,
    detail:   Option<String>,
    shown_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    current:   Option<Shown>,
    auto_hide: Duration,
}

impl Default for Notification {
    fn default() -> Self { Self::new(AUTO_HIDE) }
}

impl Notification {
    pub fn new(auto_hide: Duration) -> Self {
        Self {
            current: None,
            auto_hide,
        }
    }

    /// Replaces whatever is showing.
    pub fn show(&mut self, notice: Notice, detail: Option<String>) {
        self.show_at(notice, detail, Instant::now());
    }

    pub fn show_at(&mut self, notice: Notice, detail: Option<String>, now: Instant) {
        self.current = Some(Shown {
            notice,
            detail,
            shown_at: now,
        });
    }

    pub fn dismiss(&mut self) { self.current = None; }

    pub fn is_open(&self) -> bool { self.current.is_some() }

    pub fn notice(&self) -> Option<Notice> { self.current.as_ref().map(|s| s.notice) }

    pub fn detail(&self) -> Option<&str> { self.current.as_ref().and_then(|s| s.detail.as_deref()) }

    /// Message text, with the error detail appended when there is one.
    pub fn message(&self) -> Option<String> {
        self.current.as_ref().map(|shown| match &shown.detail {
            Some(detail) => format!("{}: {detail}", shown.notice),
            None => shown.notice.to_string(),
        })
    }

    /// Hides the notification once its auto-hide period has elapsed.
    /// Returns whether it was hidden by this call.
    pub fn expire(&mut self, now: Instant) -> bool {
        let elapsed = self
            .current
            .as_ref()
            .is_some_and(|shown| now.saturating_duration_since(shown.shown_at) >= self.auto_hide);
        if elapsed {
            self.current = None;
        }
        elapsed
    }
}
