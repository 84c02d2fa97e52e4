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

//! Shared sign-in state.
//!
//! A [`Session`] is handed to the controller explicitly; cloning it shares
//! the same underlying state, so a sign-out seen by one holder is seen by
//! all of them.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::info;

use crate::view::DataScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AuthState {
    SignedOut,
    SignedIn,
}

#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    token: RwLock<Option<String>>,
    state: watch::Sender<AuthState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn anonymous() -> Self { Self::from_token(None) }

    pub fn signed_in(token: impl Into<String>) -> Self { Self::from_token(Some(token.into())) }

    /// Blank tokens count as signed out.
    pub fn from_token(token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        let state = if token.is_some() {
            AuthState::SignedIn
        } else {
            AuthState::SignedOut
        };
        let (tx, _rx) = watch::channel(state);
        Self {
            inner: Arc::new(SessionInner {
                token: RwLock::new(token),
                state: tx,
            }),
        }
    }

    pub fn token(&self) -> Option<String> { self.inner.token.read().clone() }

    pub fn state(&self) -> AuthState { *self.inner.state.borrow() }

    pub fn is_signed_in(&self) -> bool { self.state() == AuthState::SignedIn }

    pub fn scope(&self) -> DataScope { DataScope::for_session(self.is_signed_in()) }

    /// Receives every sign-in state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> { self.inner.state.subscribe() }

    pub fn sign_in(&self, token: impl Into<String>) {
        let token = token.into();
        if token.trim().is_empty() {
            self.sign_out();
            return;
        }
        *self.inner.token.write() = Some(token);
        self.inner.state.send_replace(AuthState::SignedIn);
        info!("session signed in");
    }

    /// Drops the token. Returns whether the session was signed in.
    pub fn sign_out(&self) -> bool {
        let had_token = self.inner.token.write().take().is_some();
        self.inner.state.send_replace(AuthState::SignedOut);
        if had_token {
            info!("session signed out");
        }
        had_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_anonymous() {
        let session = Session::from_token(Some("  ".into()));
        assert!(!session.is_signed_in());
        assert_eq!(session.scope(), DataScope::All);
        assert_eq!(session.token(), None);
    }

    #[test]
    fn clones_share_state() {
        let session = Session::signed_in("abc");
        let other = session.clone();
        assert_eq!(other.scope(), DataScope::Owned);
        assert!(session.sign_out());
        assert!(!other.is_signed_in());
        assert!(!other.sign_out());
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let session = Session::anonymous();
        let mut rx = session.subscribe();
        session.sign_in("token-1");
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), AuthState::SignedIn);
        assert_eq!(session.token().as_deref(), Some("token-1"));

        session.sign_out();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), AuthState::SignedOut);
    }
}
