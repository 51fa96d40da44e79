//! `AuthenticatedRequestClient`: one request in, one classified outcome out.
//!
//! This is the only place habitkit touches the network. Every exchange
//! follows the same steps:
//!   1. Refuse locally if there is no session and the path is not a
//!      bootstrap endpoint
//!   2. Build headers (JSON content type, bearer credential if held)
//!   3. Dispatch through the transport, bounded by the configured timeout
//!   4. Classify the response and update the session as a side effect
//!
//! Nothing is retried. The habit endpoints are not idempotent on the
//! server side, so every failure goes back to the caller exactly once.

use std::sync::Arc;

use habitkit_protocol::{
    access_token, challenge_session, encode_payload, Method, Payload,
    ProtocolError, RequestDescriptor, ResponseBody, ResponseOutcome,
};
use habitkit_session::{Credential, SessionSnapshot, SessionStore};
use habitkit_transport::{
    HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
};

use crate::{ClientConfig, HabitkitError, HabitsApi};

/// Returned without a network call when a protected path is requested
/// with no active session.
pub const NO_ACTIVE_SESSION: &str = "no active session";

/// Used for a 401/403 whose body has no `message`.
pub const SESSION_REJECTED: &str =
    "session expired or credential rejected, please log in again";

/// Returned when a sign-in reply lands after the session was changed by
/// something else (a logout, another sign-in). The reply is discarded.
pub const SESSION_SUPERSEDED: &str =
    "session changed while the request was in flight";

/// Used for any other error status whose body has no `message`.
pub const REQUEST_FAILED: &str = "request failed";

/// Performs authenticated exchanges against the habit API and keeps the
/// session in step with what the server says.
///
/// Generic over the transport so tests can swap in an in-memory one; the
/// default is [`ReqwestTransport`].
///
/// The client is `Send + Sync` whenever its transport is, so it can sit
/// in an `Arc` and serve concurrent tasks. Session writes are serialized
/// inside [`SessionStore`]; completion order between concurrent requests
/// is not defined.
pub struct AuthenticatedRequestClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    session: Arc<SessionStore>,
    config: ClientConfig,
}

impl AuthenticatedRequestClient<ReqwestTransport> {
    /// Validates `config` and builds a client on a `reqwest` transport.
    ///
    /// # Errors
    /// - [`HabitkitError::Config`] if the config is unusable
    /// - [`HabitkitError::Transport`] if the HTTP client cannot be built
    pub fn new(config: ClientConfig) -> Result<Self, HabitkitError> {
        config.validate()?;
        let transport =
            ReqwestTransport::new(config.timeout, &config.user_agent)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: HttpTransport> AuthenticatedRequestClient<T> {
    /// Builds a client on a caller-supplied transport.
    ///
    /// The config is taken as-is; call [`ClientConfig::validate`] first
    /// if it did not come from the builder.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            transport,
            session: Arc::new(SessionStore::new()),
            config,
        }
    }

    /// The session this client reads and writes.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resumes a session from a credential obtained earlier, without a
    /// login round trip.
    ///
    /// # Errors
    /// [`HabitkitError::Session`] if `token` is blank.
    pub fn restore_session(&self, token: &str) -> Result<(), HabitkitError> {
        self.session.set_active(token)?;
        tracing::info!("session restored from a saved credential");
        Ok(())
    }

    /// Shorthand for `session().is_authenticated()`.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Typed access to the habit endpoints.
    pub fn habits(&self) -> HabitsApi<'_, T> {
        HabitsApi::new(self)
    }

    // -----------------------------------------------------------------
    // Core exchange
    // -----------------------------------------------------------------

    /// Performs one exchange and classifies the result.
    ///
    /// Never fails and never panics: every failure mode is a
    /// [`ResponseOutcome`] variant. Side effects on the session:
    /// - 401/403 → the credential this request sent is dropped, unless a
    ///   newer one replaced it meanwhile
    /// - 2xx with a token on login/change-password → the token becomes
    ///   the active credential, unless the session changed meanwhile
    ///   (then `AuthError` with [`SESSION_SUPERSEDED`])
    pub async fn execute(
        &self,
        descriptor: &RequestDescriptor,
    ) -> ResponseOutcome {
        self.exchange(descriptor, None).await
    }

    /// `execute`, plus recording a challenge for `challenge_user` when the
    /// reply carries one.
    async fn exchange(
        &self,
        descriptor: &RequestDescriptor,
        challenge_user: Option<&str>,
    ) -> ResponseOutcome {
        let method = descriptor.method();
        let path = descriptor.normalized_path();

        // --- Step 1: local short-circuit ---
        // One snapshot serves the check, the header and the late write,
        // so a concurrent logout cannot slip in between them.
        let snapshot = self.session.snapshot();
        let credential = snapshot.credential.as_ref();
        if credential.is_none() && !self.config.endpoints.is_bootstrap(path) {
            tracing::debug!(%method, path, "no active session, request not sent");
            return ResponseOutcome::auth_error(NO_ACTIVE_SESSION);
        }

        // --- Step 2: headers and body ---
        let request = match self.build_request(
            method,
            path,
            descriptor.payload(),
            credential,
        ) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(%method, path, error = %e, "could not encode request");
                return ResponseOutcome::TransportError {
                    message: format!("could not encode request: {e}"),
                };
            }
        };

        // --- Step 3: dispatch ---
        tracing::debug!(
            %method,
            url = %request.url,
            authorized = credential.is_some(),
            "sending request"
        );
        let response = match tokio::time::timeout(
            self.config.timeout,
            self.transport.send(request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(%method, path, error = %e, "transport failure");
                return ResponseOutcome::TransportError {
                    message: e.to_string(),
                };
            }
            Err(_) => {
                tracing::warn!(%method, path, timeout = ?self.config.timeout, "request timed out");
                return ResponseOutcome::TransportError {
                    message: TransportError::Timeout.to_string(),
                };
            }
        };

        // --- Step 4: classify ---
        let outcome = self.classify(path, response, &snapshot, challenge_user);
        tracing::debug!(%method, path, outcome = outcome.kind(), "request complete");
        outcome
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Payload>,
        credential: Option<&Credential>,
    ) -> Result<HttpRequest, ProtocolError> {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if let Some(credential) = credential {
            headers.push((
                "Authorization".to_string(),
                format!("Bearer {}", credential.as_str()),
            ));
        }

        let body = payload.map(encode_payload).transpose()?;

        Ok(HttpRequest {
            method,
            url: self.config.url_for(path),
            headers,
            body,
        })
    }

    /// Maps a response to an outcome. Order matters: auth rejections
    /// first, then other error statuses, then the success shapes.
    fn classify(
        &self,
        path: &str,
        response: HttpResponse,
        sent: &SessionSnapshot,
        challenge_user: Option<&str>,
    ) -> ResponseOutcome {
        let status = response.status;
        let body = ResponseBody::parse(&response.body);

        if status == 401 || status == 403 {
            let revoked = sent
                .credential
                .as_ref()
                .is_some_and(|rejected| self.session.revoke_if(rejected));
            let message = body.message().unwrap_or(SESSION_REJECTED).to_string();
            tracing::warn!(status, path, revoked, "server rejected the session");
            return ResponseOutcome::AuthError { message };
        }

        if !response.is_success() {
            let message = body.message().unwrap_or(REQUEST_FAILED).to_string();
            tracing::warn!(status, path, %message, "server returned an error");
            return ResponseOutcome::ServerError { status, message };
        }

        if let Some(json) = body.as_json() {
            if let Some(session) = challenge_session(json) {
                tracing::info!(path, "identity provider requires a password change");
                if let Some(username) = challenge_user {
                    match self.session.set_pending_if(sent.generation, &session, username) {
                        Ok(true) => {}
                        Ok(false) => {
                            tracing::warn!(path, "challenge arrived after the session changed");
                            return ResponseOutcome::auth_error(SESSION_SUPERSEDED);
                        }
                        Err(e) => {
                            tracing::warn!(path, error = %e, "challenge not recorded");
                        }
                    }
                }
                return ResponseOutcome::ChallengeRequired { session };
            }

            if self.config.endpoints.issues_credential(path) {
                if let Some(token) = access_token(json) {
                    match self.session.set_active_if(sent.generation, &token) {
                        Ok(true) => {}
                        Ok(false) => {
                            tracing::warn!(path, "credential arrived after the session changed");
                            return ResponseOutcome::auth_error(SESSION_SUPERSEDED);
                        }
                        Err(e) => {
                            tracing::warn!(path, error = %e, "credential not installed");
                        }
                    }
                }
            }
        }

        ResponseOutcome::success(body.into_payload())
    }

    // -----------------------------------------------------------------
    // Bootstrap operations
    // -----------------------------------------------------------------

    /// Creates an account. The identity provider mails a temporary
    /// password; the first login with it returns a challenge.
    pub async fn register(&self, email: &str) -> ResponseOutcome {
        let mut payload = Payload::new();
        payload.insert(self.config.fields.email.clone(), email.into());
        let descriptor =
            RequestDescriptor::post(&self.config.endpoints.register, payload);
        self.execute(&descriptor).await
    }

    /// Signs in.
    ///
    /// - token in the response → session becomes `Active`
    /// - challenge in the response → session becomes `PendingChallenge`
    ///   for `username`, and the caller should collect a new password
    ///   and call [`change_password`](Self::change_password)
    pub async fn login(&self, username: &str, password: &str) -> ResponseOutcome {
        let mut payload = Payload::new();
        payload.insert(self.config.fields.username.clone(), username.into());
        payload.insert(self.config.fields.password.clone(), password.into());
        let descriptor =
            RequestDescriptor::post(&self.config.endpoints.login, payload);

        self.exchange(&descriptor, Some(username)).await
    }

    /// Answers a password-change challenge. On success the returned token
    /// becomes the active credential and the pending marker is gone.
    pub async fn change_password(
        &self,
        username: &str,
        session: &str,
        new_password: &str,
    ) -> ResponseOutcome {
        let fields = &self.config.fields;
        let mut payload = Payload::new();
        payload.insert(fields.username.clone(), username.into());
        payload.insert(fields.session.clone(), session.into());
        payload.insert(fields.new_password.clone(), new_password.into());
        let descriptor = RequestDescriptor::post(
            &self.config.endpoints.change_password,
            payload,
        );
        self.execute(&descriptor).await
    }

    /// Answers the challenge stored by the last [`login`](Self::login),
    /// so the caller does not have to keep the username and session token
    /// around itself.
    ///
    /// Returns `AuthError` without a network call if nothing is pending.
    pub async fn complete_challenge(&self, new_password: &str) -> ResponseOutcome {
        let Some(pending) = self.session.pending_challenge() else {
            return ResponseOutcome::auth_error("no password change is pending");
        };
        self.change_password(&pending.username, &pending.session_token, new_password)
            .await
    }

    /// Forgets the credential and any pending challenge. Local only: the
    /// bearer token is not revoked at the provider.
    pub fn logout(&self) -> ResponseOutcome {
        self.session.clear();
        let mut body = Payload::new();
        body.insert("message".to_string(), "logged out".into());
        ResponseOutcome::success(body)
    }

    // -----------------------------------------------------------------
    // Passthrough
    // -----------------------------------------------------------------

    pub async fn get(&self, path: &str) -> ResponseOutcome {
        self.execute(&RequestDescriptor::get(path)).await
    }

    pub async fn post(&self, path: &str, payload: Payload) -> ResponseOutcome {
        self.execute(&RequestDescriptor::post(path, payload)).await
    }

    pub async fn put(&self, path: &str, payload: Payload) -> ResponseOutcome {
        self.execute(&RequestDescriptor::put(path, payload)).await
    }

    pub async fn delete(
        &self,
        path: &str,
        payload: Option<Payload>,
    ) -> ResponseOutcome {
        self.execute(&RequestDescriptor::delete(path, payload)).await
    }
}

// =========================================================================
// Tests
// =========================================================================
