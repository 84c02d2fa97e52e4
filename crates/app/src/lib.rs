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

//! Command orchestration: wires the persisted session, the REST
//! collaborators and a [`ListController`] together for one command.

mod config;
pub mod render;

use std::sync::Arc;

pub use config::AppConfig;
use snafu::{ResultExt, Whatever, whatever};
use tracing::{info, warn};
use watchlater_client::{ApiClient, TokenStore};
use watchlater_core::{
    DraftField, EntryId, IdentityResolver, ListController, LoadOutcome, Notice, PlaylistStore,
    Session, SortOption, ViewMode,
};
use watchlater_error::ErrorExt;

/// Fields of the `add` command.
#[derive(Debug, Clone, Default)]
pub struct AddRequest {
    pub content: String,
    pub sauce:   String,
    pub date:    Option<String>,
    pub time:    Option<String>,
}

pub struct App {
    store:        Arc<dyn PlaylistStore>,
    identity:     Arc<dyn IdentityResolver>,
    session:      Session,
    tokens:       TokenStore,
    default_sort: SortOption,
}

impl AppConfig {
    /// Restores the saved session and connects to the REST backend.
    pub async fn open(self) -> Result<App, Whatever> {
        let tokens = TokenStore::new(watchlater_paths::token_file());
        let token = tokens
            .load()
            .await
            .whatever_context("Failed to load session token")?;
        let session = Session::from_token(token);
        let api = Arc::new(
            ApiClient::open(&self.client)
                .whatever_context("Failed to open api client")?
                .with_session(session.clone()),
        );
        info!(base = %api.base_url(), signed_in = session.is_signed_in(), "app opened");
        Ok(App::new(
            api.clone(),
            api,
            session,
            tokens,
            self.default_sort,
        ))
    }
}

impl App {
    pub fn new(
        store: Arc<dyn PlaylistStore>,
        identity: Arc<dyn IdentityResolver>,
        session: Session,
        tokens: TokenStore,
        default_sort: SortOption,
    ) -> Self {
        Self {
            store,
            identity,
            session,
            tokens,
            default_sort,
        }
    }

    pub fn session(&self) -> &Session { &self.session }

    fn controller(&self, sort: SortOption) -> ListController {
        ListController::with_sort(
            self.store.clone(),
            self.identity.clone(),
            self.session.clone(),
            sort,
        )
    }

    /// Loads and renders the collection.
    pub async fn list(&self, sort: Option<SortOption>, view: ViewMode) -> Result<String, Whatever> {
        let was_signed_in = self.session.is_signed_in();
        let controller = self.controller(sort.unwrap_or(self.default_sort));
        let outcome = if controller.snapshot().view == view {
            controller.reload().await
        } else {
            controller.toggle_view().await
        };
        self.forget_expired_token(was_signed_in).await?;

        let mut out = String::new();
        if let Some(message) = controller.snapshot().notification.message() {
            out.push_str(&message);
            out.push('\n');
        }
        if outcome == LoadOutcome::Failed && controller.entries().is_empty() {
            whatever!("{}", out.trim_end());
        }
        out.push_str(&render::presentation(&controller.presentation()));
        Ok(out)
    }

    /// Creates an entry through the create dialog.
    pub async fn add(&self, request: AddRequest) -> Result<String, Whatever> {
        let was_signed_in = self.session.is_signed_in();
        let controller = self.controller(self.default_sort);
        if !controller.open_create_dialog() {
            whatever!("Sign in to add playlists");
        }
        controller.update_form(DraftField::Content, request.content);
        controller.update_form(DraftField::Sauce, request.sauce);
        if let Some(date) = request.date {
            controller.update_form(DraftField::Date, date);
        }
        if let Some(time) = request.time {
            controller.update_form(DraftField::Time, time);
        }

        let result = controller.submit_create().await;
        self.forget_expired_token(was_signed_in).await?;
        let message = notification_text(&controller);
        match result {
            Ok(created) => Ok(format!(
                "{message}\n#{} {} ({}) {}\n",
                created.id,
                created.content,
                created.app,
                created.scheduled_label()
            )),
            Err(_) => whatever!("{message}"),
        }
    }

    pub async fn delete(&self, id: EntryId) -> Result<String, Whatever> {
        let was_signed_in = self.session.is_signed_in();
        let controller = self.controller(self.default_sort);
        let result = controller.delete(id).await;
        self.forget_expired_token(was_signed_in).await?;
        let message = notification_text(&controller);
        match result {
            Ok(()) => Ok(format!("{message}\n")),
            Err(_) => whatever!("{message}"),
        }
    }

    /// Checks the token with the identity service before saving it.
    pub async fn login(&self, token: &str) -> Result<String, Whatever> {
        let token = token.trim();
        if token.is_empty() {
            whatever!("Token must not be empty");
        }
        let identity = match self.identity.resolve_identity(token).await {
            Ok(identity) => identity,
            Err(err) => whatever!("Sign in failed: {}", err.output_msg()),
        };
        self.tokens
            .save(token)
            .await
            .whatever_context("Failed to save session token")?;
        self.session.sign_in(token);
        info!(user = %identity.id, "signed in");
        Ok(format!("Signed in as {}\n", identity.id))
    }

    pub async fn logout(&self) -> Result<String, Whatever> {
        self.tokens
            .clear()
            .await
            .whatever_context("Failed to remove session token")?;
        let was_signed_in = self.session.sign_out();
        Ok(if was_signed_in {
            "Signed out\n".to_owned()
        } else {
            "Not signed in\n".to_owned()
        })
    }

    pub async fn whoami(&self) -> Result<String, Whatever> {
        let Some(token) = self.session.token() else {
            return Ok("Not signed in\n".to_owned());
        };
        match self.identity.resolve_identity(&token).await {
            Ok(identity) => Ok(format!("{}\n", identity.id)),
            Err(err) if err.is_auth() => {
                self.session.sign_out();
                self.forget_expired_token(true).await?;
                whatever!("{}", Notice::SignedOut)
            }
            Err(err) => whatever!("{}", err.output_msg()),
        }
    }

    /// Removes the saved token once the session was ended by a rejected
    /// credential.
    async fn forget_expired_token(&self, was_signed_in: bool) -> Result<(), Whatever> {
        if was_signed_in && !self.session.is_signed_in() {
            warn!("session expired, removing saved token");
            self.tokens
                .clear()
                .await
                .whatever_context("Failed to remove session token")?;
        }
        Ok(())
    }
}

fn notification_text(controller: &ListController) -> String {
    controller
        .snapshot()
        .notification
        .message()
        .unwrap_or_default()
}
