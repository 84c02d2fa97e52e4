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

//! REST client for the playlist backend.
//!
//! Responses are classified with [`StatusCode::from_http`]: rejected
//! credentials become `Auth`, rejected drafts become `Rejected`, a missing
//! entry on delete becomes `NotFound`, and every other failure (transport,
//! unexpected status, undecodable body) becomes `Network`.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{
    Method,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use snafu::{IntoError, ResultExt};
use tracing::{debug, instrument, warn};
use url::Url;
use watchlater_core::{
    Error as CoreError, EntryId, Identity, IdentityResolver, NewEntry, PlaylistEntry,
    PlaylistStore, Result, Session, UserId,
    err::{AuthSnafu, BoxedError, NetworkSnafu, NotFoundSnafu, RejectedSnafu},
};
use watchlater_error::StatusCode;

use crate::{
    config::ClientConfig,
    err::{
        BuildClientSnafu, DecodeSnafu, EncodeSnafu, InvalidBaseUrlSnafu, Result as ClientResult,
        UnexpectedStatusSnafu,
    },
};

const JSON: &str = "application/json";

/// Cheaply cloneable handle; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http:    reqwest::Client,
    base:    Url,
    session: Option<Session>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base.as_str())
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn open(config: &ClientConfig) -> ClientResult<Self> {
        let base = normalize_base(&config.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .context(BuildClientSnafu)?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base,
                session: None,
            }),
        })
    }

    /// Attaches the session's token as a bearer credential on data requests.
    #[must_use]
    pub fn with_session(self, session: Session) -> Self {
        Self {
            inner: Arc::new(Inner {
                http:    self.inner.http.clone(),
                base:    self.inner.base.clone(),
                session: Some(session),
            }),
        }
    }

    pub fn base_url(&self) -> &Url { &self.inner.base }

    #[instrument(skip(self), err(Display))]
    pub async fn get_playlists(&self) -> Result<Vec<PlaylistEntry>> {
        let url = self.endpoint(&["playlists"])?;
        let body = self.send(Method::GET, url.clone(), None, None).await?;
        decode(&url, &body)
    }

    #[instrument(skip(self), err(Display))]
    pub async fn get_user_playlists(&self, owner: &UserId) -> Result<Vec<PlaylistEntry>> {
        let url = self.endpoint(&["playlists", "user", owner.as_str()])?;
        let body = self.send(Method::GET, url.clone(), None, None).await?;
        decode(&url, &body)
    }

    #[instrument(skip(self, entry), fields(sauce = %entry.sauce), err(Display))]
    pub async fn post_playlist(&self, entry: &NewEntry) -> Result<PlaylistEntry> {
        let url = self.endpoint(&["playlists"])?;
        let payload = serde_json::to_vec(entry)
            .context(EncodeSnafu)
            .map_err(|e| network(&url, e))?;
        let body = self
            .send(Method::POST, url.clone(), Some(payload), None)
            .await?;
        decode(&url, &body)
    }

    #[instrument(skip(self), err(Display))]
    pub async fn delete_playlist(&self, id: EntryId) -> Result<()> {
        let url = self.endpoint(&["playlists", &id.to_string()])?;
        match self.send(Method::DELETE, url, None, None).await {
            Err(CoreError::Network { source, .. })
                if is_status(&source, http::StatusCode::NOT_FOUND) =>
            {
                NotFoundSnafu { id }.fail()
            }
            other => other.map(|_| ()),
        }
    }

    #[instrument(skip_all, err(Display))]
    pub async fn get_current_user(&self, token: &str) -> Result<Identity> {
        let url = self.endpoint(&["users", "me"])?;
        let body = self.send(Method::GET, url.clone(), None, Some(token)).await?;
        decode::<Identity>(&url, &body)?.validated()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                network(
                    &self.inner.base,
                    format!("base url {} cannot carry a path", self.inner.base),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        payload: Option<Vec<u8>>,
        token: Option<&str>,
    ) -> Result<Bytes> {
        let session_token = self.inner.session.as_ref().and_then(Session::token);
        let bearer = token.map(str::to_owned).or(session_token);

        let mut request = self
            .inner
            .http
            .request(method.clone(), url.clone())
            .header(ACCEPT, JSON);
        if let Some(bearer) = bearer {
            request = request.bearer_auth(bearer);
        }
        if let Some(payload) = payload {
            request = request.header(CONTENT_TYPE, JSON).body(payload);
        }

        debug!(%method, %url, "sending request");
        let response = request.send().await.map_err(|e| network(&url, e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| network(&url, e))?;

        match StatusCode::from_http(status) {
            None => Ok(body),
            Some(code) => {
                let text = String::from_utf8_lossy(&body).trim().to_owned();
                warn!(%method, %url, status = status.as_u16(), "request failed");
                Err(classify(&url, code, status.as_u16(), text))
            }
        }
    }
}

#[async_trait]
impl PlaylistStore for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<PlaylistEntry>> { self.get_playlists().await }

    async fn fetch_by_owner(&self, owner: &UserId) -> Result<Vec<PlaylistEntry>> {
        self.get_user_playlists(owner).await
    }

    async fn create_entry(&self, entry: &NewEntry) -> Result<PlaylistEntry> {
        self.post_playlist(entry).await
    }

    async fn delete_entry(&self, id: EntryId) -> Result<()> { self.delete_playlist(id).await }
}

#[async_trait]
impl IdentityResolver for ApiClient {
    async fn resolve_identity(&self, token: &str) -> Result<Identity> {
        self.get_current_user(token).await
    }
}

fn normalize_base(raw: &str) -> ClientResult<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).context(InvalidBaseUrlSnafu { url: raw })
}

fn network(url: &Url, err: impl Into<BoxedError>) -> CoreError {
    NetworkSnafu {
        endpoint: url.as_str(),
    }
    .into_error(err.into())
}

fn decode<T: DeserializeOwned>(url: &Url, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .context(DecodeSnafu)
        .map_err(|e| network(url, e))
}

fn classify(url: &Url, code: StatusCode, status: u16, body: String) -> CoreError {
    match code {
        code if code.is_auth_failure() => AuthSnafu {
            message: if body.is_empty() {
                format!("status {status}")
            } else {
                body
            },
        }
        .build(),
        StatusCode::InvalidArgument => RejectedSnafu {
            status,
            message: body,
        }
        .build(),
        _ => network(url, UnexpectedStatusSnafu { status, body }.build()),
    }
}

fn is_status(source: &BoxedError, expected: http::StatusCode) -> bool {
    matches!(
        source.downcast_ref::<crate::err::Error>(),
        Some(crate::err::Error::UnexpectedStatus { status, .. }) if *status == expected.as_u16()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::open(&ClientConfig::builder().base_url(base).build()).unwrap()
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(
            client("http://localhost:5000/api").base_url().as_str(),
            "http://localhost:5000/api/"
        );
        assert_eq!(
            client("http://localhost:5000/api/").base_url().as_str(),
            "http://localhost:5000/api/"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ApiClient::open(&ClientConfig::builder().base_url("not a url").build())
            .unwrap_err();
        assert!(matches!(err, crate::err::Error::InvalidBaseUrl { .. }));
    }

    #[test]
    fn endpoints_join_under_base() {
        let api = client("http://localhost:5000/api");
        assert_eq!(
            api.endpoint(&["playlists"]).unwrap().as_str(),
            "http://localhost:5000/api/playlists"
        );
        assert_eq!(
            api.endpoint(&["playlists", "user", "u 1"]).unwrap().as_str(),
            "http://localhost:5000/api/playlists/user/u%201"
        );
        assert_eq!(
            api.endpoint(&["users", "me"]).unwrap().as_str(),
            "http://localhost:5000/api/users/me"
        );
    }

    #[test]
    fn statuses_are_classified() {
        let url = Url::parse("http://localhost/api/playlists").unwrap();

        let auth = classify(&url, StatusCode::Unauthorized, 401, String::new());
        assert!(auth.is_auth());
        assert_eq!(auth.to_string(), "Credential rejected: status 401");

        let forbidden = classify(&url, StatusCode::Forbidden, 403, "nope".into());
        assert!(forbidden.is_auth());

        let rejected = classify(&url, StatusCode::InvalidArgument, 422, "sauce missing".into());
        assert!(matches!(rejected, CoreError::Rejected { status: 422, .. }));

        let missing = classify(&url, StatusCode::NotFound, 404, String::new());
        match missing {
            CoreError::Network { ref source, .. } => {
                assert!(is_status(source, http::StatusCode::NOT_FOUND));
            }
            other => panic!("unexpected {other:?}"),
        }

        let server = classify(&url, StatusCode::Internal, 500, "boom".into());
        assert!(matches!(server, CoreError::Network { .. }));
    }

    #[test]
    fn undecodable_body_is_a_network_error() {
        let url = Url::parse("http://localhost/api/playlists").unwrap();
        let err = decode::<Vec<PlaylistEntry>>(&url, b"<html>").unwrap_err();
        assert!(matches!(err, CoreError::Network { .. }));
    }

    #[test]
    fn decodes_playlists_and_identity() {
        let url = Url::parse("http://localhost/api/playlists").unwrap();
        let body = br#"[{"id":3,"content":"Talk","sauce":"https://youtu.be/x","app":"youtube",
            "date":"2024-01-02","time":"10:00"}]"#;
        let entries: Vec<PlaylistEntry> = decode(&url, body).unwrap();
        assert_eq!(entries[0].id, EntryId(3));

        let identity: Identity = decode(&url, br#"{"id":42}"#).unwrap();
        assert_eq!(identity.id.as_str(), "42");
    }

    mod wire {
        use tokio::{
            io::{AsyncReadExt, AsyncWriteExt},
            net::{TcpListener, TcpStream},
            sync::oneshot,
        };
        use super::*;

        /// Answers a single request with `status` and `body`, handing back the
        /// raw request text with header names lowercased.
        async fn serve_once(
            status: u16,
            body: &'static str,
        ) -> (String, oneshot::Receiver<String>) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base = format!("http://{}/api", listener.local_addr().unwrap());
            let (tx, rx) = oneshot::channel();
            tokio::spawn(async move {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: \
                     {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
                let _ = tx.send(request);
            });
            (base, rx)
        }

        async fn read_request(socket: &mut TcpStream) -> String {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                    let length = head
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|value| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            String::from_utf8_lossy(&buf).to_lowercase()
        }

        #[tokio::test]
        async fn current_user_sends_bearer_token() {
            let (base, request) = serve_once(200, r#"{"id":"alice"}"#).await;
            let identity = client(&base).get_current_user("tok-1").await.unwrap();
            assert_eq!(identity.id.as_str(), "alice");

            let request = request.await.unwrap();
            assert!(request.starts_with("get /api/users/me http/1.1"), "{request}");
            assert!(request.contains("authorization: bearer tok-1"), "{request}");
        }

        #[tokio::test]
        async fn session_token_is_forwarded_on_fetches() {
            let (base, request) = serve_once(200, "[]").await;
            let api = client(&base).with_session(Session::signed_in("tok-2"));
            assert!(api.fetch_all().await.unwrap().is_empty());

            let request = request.await.unwrap();
            assert!(request.starts_with("get /api/playlists http/1.1"), "{request}");
            assert!(request.contains("authorization: bearer tok-2"), "{request}");
        }

        #[tokio::test]
        async fn anonymous_fetch_has_no_credential() {
            let (base, request) = serve_once(200, "[]").await;
            client(&base).fetch_all().await.unwrap();
            assert!(!request.await.unwrap().contains("authorization:"));
        }

        #[tokio::test]
        async fn owner_fetch_targets_user_path() {
            let (base, request) = serve_once(200, "[]").await;
            client(&base)
                .fetch_by_owner(&UserId::new("42"))
                .await
                .unwrap();
            let request = request.await.unwrap();
            assert!(request.starts_with("get /api/playlists/user/42 http/1.1"), "{request}");
        }

        #[tokio::test]
        async fn create_posts_json_with_app() {
            let created = r#"{"id":9,"content":"Jam","sauce":"https://vimeo.com/1",
                "app":"vimeo","date":"2024-06-01","time":"18:00"}"#;
            let (base, request) = serve_once(201, created).await;
            let entry = NewEntry {
                content: "Jam".into(),
                sauce:   "https://vimeo.com/1".into(),
                app:     "vimeo".into(),
                date:    "2024-06-01".into(),
                time:    "18:00".into(),
            };
            let created = client(&base).create_entry(&entry).await.unwrap();
            assert_eq!(created.id, EntryId(9));

            let request = request.await.unwrap();
            assert!(request.starts_with("post /api/playlists http/1.1"), "{request}");
            assert!(request.contains("content-type: application/json"), "{request}");
            assert!(request.contains(r#""app":"vimeo""#), "{request}");
        }

        #[tokio::test]
        async fn delete_of_missing_entry_is_not_found() {
            let (base, request) = serve_once(404, "").await;
            let err = client(&base).delete_entry(EntryId(7)).await.unwrap_err();
            assert!(
                matches!(err, CoreError::NotFound { id: EntryId(7), .. }),
                "{err:?}"
            );
            assert!(
                request
                    .await
                    .unwrap()
                    .starts_with("delete /api/playlists/7 http/1.1")
            );
        }

        #[tokio::test]
        async fn rejected_token_on_fetch_is_auth() {
            let (base, _request) = serve_once(401, "").await;
            let api = client(&base).with_session(Session::signed_in("stale"));
            assert!(api.fetch_all().await.unwrap_err().is_auth());
        }

        #[tokio::test]
        async fn server_validation_is_rejected() {
            let (base, _request) = serve_once(422, "sauce is required").await;
            let entry = NewEntry {
                content: "Jam".into(),
                sauce:   String::new(),
                app:     "unknown".into(),
                date:    "2024-06-01".into(),
                time:    "18:00".into(),
            };
            let err = client(&base).create_entry(&entry).await.unwrap_err();
            let CoreError::Rejected { status, ref message, .. } = err else {
                panic!("expected a rejection, got {err:?}");
            };
            assert_eq!((status, message.as_str()), (422, "sauce is required"));
        }
    }
}
