//! Authentication coordinator - core business logic
//!
//! Owns the [`AuthState`] machine and sequences sign-in, registration,
//! sign-out, current-user lookups and token refresh. Transient failures are
//! retried by the [`ApiRetryExecutor`]; this layer only adds the semantic
//! refresh-and-retry-once step for auth failures.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use campus_domain::{
    AuthState, ClientConfig, ConfigError, DomainError, DomainResult, ErrorKind, LoginRequest,
    ProfileUpdate, RefreshRequest, RegisterRequest, TokenPair, TokenResponse, UserSummary,
};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::ports::{TokenStore, TokenStoreError};
use super::state::AuthStateStore;
use super::validation::{validate_credentials, validate_profile_update};
use crate::classifier::{ApiFailure, ErrorClassifier, ErrorCodeTable};
use crate::retry::ApiRetryExecutor;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};

/// Authentication coordinator
///
/// One instance per process. All methods take `&self` and may be called
/// concurrently; token save/clear and refresh are serialized internally so
/// that concurrent auth failures trigger at most one refresh request.
pub struct AuthCoordinator {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
    retry: ApiRetryExecutor,
    state: AuthStateStore,
    session_lock: Mutex<()>,
    /// Bumped whenever a session is established or ended. Only written while
    /// `session_lock` is held.
    epoch: AtomicU64,
    cancel: RwLock<CancellationToken>,
}

impl AuthCoordinator {
    /// Create a coordinator in the `Unauthenticated` state.
    ///
    /// Call [`initialize`](Self::initialize) (or use [`start`](Self::start))
    /// to derive the initial state from the token store.
    ///
    /// # Errors
    /// `ConfigError` when the configuration fails validation.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let classifier =
            Arc::new(ErrorClassifier::new(ErrorCodeTable::from(config.error_codes.clone())));
        let retry = ApiRetryExecutor::from_settings(&config.retry, classifier)?;

        Ok(Self {
            config,
            transport,
            tokens,
            retry,
            state: AuthStateStore::default(),
            session_lock: Mutex::new(()),
            epoch: AtomicU64::new(0),
            cancel: RwLock::new(CancellationToken::new()),
        })
    }

    /// [`new`](Self::new) followed by [`initialize`](Self::initialize).
    pub async fn start(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ConfigError> {
        let coordinator = Self::new(config, transport, tokens)?;
        coordinator.initialize().await;
        Ok(coordinator)
    }

    /// Derive the state from the token store: `Authenticated` (without a
    /// user yet) when an access token is stored, `Unauthenticated` otherwise.
    #[instrument(skip_all)]
    pub async fn initialize(&self) -> AuthState {
        match self.tokens.access_token().await {
            Ok(Some(_)) => {
                self.state.keep_authenticated();
                info!("Restored session from stored access token");
            }
            Ok(None) => {
                self.state.sign_out();
                debug!("No stored session");
            }
            Err(e) => {
                self.state.sign_out();
                warn!(error = %e, "Token store unreadable, starting unauthenticated");
            }
        }
        self.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> AuthState {
        self.state.current()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for an endpoint path under the configured base and version.
    pub fn endpoint_url(&self, path: &str) -> String {
        self.config.endpoint_url(path)
    }

    /// Cancel every call currently in flight.
    ///
    /// Each cancelled call resolves to a cancelled `UnknownError`; calls
    /// started afterwards are unaffected.
    pub fn cancel_in_flight(&self) {
        let previous = std::mem::replace(&mut *self.cancel.write(), CancellationToken::new());
        previous.cancel();
        info!("Cancelled in-flight calls");
    }

    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<UserSummary> {
        if let Err(error) = validate_credentials(email, password) {
            return DomainResult::error(error);
        }
        let body = LoginRequest { email: email.trim().to_string(), password: password.to_string() };
        let scope = self.call_scope();
        self.sign_in(&scope, &self.config.endpoints.login, &body).await.into()
    }

    #[instrument(skip_all)]
    pub async fn register(&self, request: RegisterRequest) -> DomainResult<UserSummary> {
        if let Err(error) = validate_credentials(&request.email, &request.password) {
            return DomainResult::error(error);
        }
        let body = RegisterRequest { email: request.email.trim().to_string(), ..request };
        let scope = self.call_scope();
        self.sign_in(&scope, &self.config.endpoints.register, &body).await.into()
    }

    /// Sign out.
    ///
    /// The server call is best effort: local tokens are cleared and the state
    /// becomes `Unauthenticated` whatever the server answered. Only a failure
    /// to clear local storage is reported as an error.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> DomainResult<()> {
        let scope = self.call_scope();

        match self.tokens.access_token().await {
            Ok(Some(token)) => {
                let request =
                    ApiRequest::post(self.endpoint_url(&self.config.endpoints.logout)).with_bearer(token);
                let result = self.retry.execute(&scope, move || self.send(request.clone())).await;
                if let Some(error) = result.error_ref() {
                    warn!(kind = %error.kind, "Server logout failed, clearing local session anyway");
                }
            }
            Ok(None) => debug!("No access token, skipping server logout"),
            Err(e) => warn!(error = %e, "Could not read access token, skipping server logout"),
        }

        let _guard = self.session_lock.lock().await;
        self.end_session_locked().await.map_err(DomainError::from).into()
    }

    /// Fetch the signed-in user, refreshing the session once on an auth
    /// failure.
    #[instrument(skip_all)]
    pub async fn get_current_user(&self) -> DomainResult<UserSummary> {
        let scope = self.call_scope();
        let epoch = self.epoch();
        let url = self.endpoint_url(&self.config.endpoints.current_user);
        let result = self
            .run_authorized(&scope, move |token| {
                self.send_json::<UserSummary>(ApiRequest::get(url.clone()).with_bearer(token))
            })
            .await;
        self.remember_user(epoch, &result).await;
        result
    }

    #[instrument(skip_all)]
    pub async fn update_profile(&self, update: ProfileUpdate) -> DomainResult<UserSummary> {
        if let Err(error) = validate_profile_update(&update) {
            return DomainResult::error(error);
        }
        let request = match ApiRequest::put(self.endpoint_url(&self.config.endpoints.profile)).with_json(&update) {
            Ok(request) => request,
            Err(e) => return DomainResult::error(self.classify_transport(e)),
        };

        let scope = self.call_scope();
        let epoch = self.epoch();
        let result = self
            .run_authorized(&scope, move |token| {
                self.send_json::<UserSummary>(request.clone().with_bearer(token))
            })
            .await;
        self.remember_user(epoch, &result).await;
        result
    }

    /// Refresh the token pair now.
    ///
    /// Shares the single-flight guard with the reactive refresh: if another
    /// call refreshed while this one waited, no second request is sent.
    #[instrument(skip_all)]
    pub async fn refresh_session(&self) -> DomainResult<()> {
        let seen = match self.tokens.access_token().await {
            Ok(token) => token,
            Err(e) => return DomainResult::error(e.into()),
        };
        let scope = self.call_scope();
        self.refresh_single_flight(&scope, seen.as_deref()).await.map(|_| ()).into()
    }

    /// Run an arbitrary bearer-authenticated call.
    ///
    /// `operation` receives the access token and performs a single attempt;
    /// it is retried on transient failures and replayed once with a fresh
    /// token after an auth failure.
    pub async fn authorized<T, F, Fut>(&self, operation: F) -> DomainResult<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, ApiFailure>>,
    {
        let scope = self.call_scope();
        self.run_authorized(&scope, operation).await
    }

    /// [`authorized`](Self::authorized) that also stops when `cancel` fires.
    pub async fn authorized_with_cancel<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        operation: F,
    ) -> DomainResult<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, ApiFailure>>,
    {
        let scope = self.call_scope();
        let run = self.run_authorized(&scope, operation);
        tokio::pin!(run);

        tokio::select! {
            biased;
            result = &mut run => result,
            () = cancel.cancelled() => {
                scope.cancel();
                run.await
            }
        }
    }

    /// Send `request` with the current bearer token and decode a JSON reply.
    pub async fn authorized_json<T: DeserializeOwned>(&self, request: ApiRequest) -> DomainResult<T> {
        self.authorized(move |token| self.send_json::<T>(request.clone().with_bearer(token))).await
    }

    fn call_scope(&self) -> CancellationToken {
        self.cancel.read().child_token()
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    async fn sign_in<B: Serialize + ?Sized>(
        &self,
        cancel: &CancellationToken,
        path: &str,
        body: &B,
    ) -> Result<UserSummary, DomainError> {
        let request = ApiRequest::post(self.endpoint_url(path))
            .with_json(body)
            .map_err(|e| self.classify_transport(e))?;
        let tokens: TokenPair = self
            .retry
            .execute(cancel, move || self.send_json::<TokenResponse>(request.clone()))
            .await
            .into_result()?
            .into();

        let epoch = {
            let _guard = self.session_lock.lock().await;
            if let Err(e) = self.tokens.save(&tokens).await {
                error!(error = %e, "Failed to store tokens after sign-in");
                self.clear_session_locked().await;
                return Err(e.into());
            }
            self.epoch.fetch_add(1, Ordering::AcqRel) + 1
        };

        let request = ApiRequest::get(self.endpoint_url(&self.config.endpoints.current_user))
            .with_bearer(tokens.access_token.clone());
        let user = self
            .retry
            .execute(cancel, move || self.send_json::<UserSummary>(request.clone()))
            .await
            .into_result();

        let _guard = self.session_lock.lock().await;
        if self.epoch() != epoch {
            warn!("Session replaced or ended while signing in");
            return Err(DomainError::auth("Session ended during sign-in"));
        }
        match user {
            Ok(user) => {
                self.state.authenticate(user.clone());
                info!(user_id = %user.id, "Session established");
                Ok(user)
            }
            Err(error) => {
                warn!(kind = %error.kind, "Could not load user after sign-in, discarding tokens");
                self.clear_session_locked().await;
                Err(error)
            }
        }
    }

    async fn run_authorized<T, F, Fut>(&self, cancel: &CancellationToken, operation: F) -> DomainResult<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, ApiFailure>>,
    {
        let seen = match self.tokens.access_token().await {
            Ok(token) => token,
            Err(e) => return DomainResult::error(e.into()),
        };

        if let Some(token) = seen.as_deref() {
            match self.retry.execute(cancel, || operation(token.to_string())).await {
                DomainResult::Error { error } if error.is_auth() => {
                    debug!("Access token rejected, refreshing session");
                }
                other => return other,
            }
        }

        let fresh = match self.refresh_single_flight(cancel, seen.as_deref()).await {
            Ok(token) => token,
            Err(error) => return DomainResult::error(error),
        };

        let retried = self.retry.execute(cancel, || operation(fresh.clone())).await;
        if retried.error_ref().is_some_and(DomainError::is_auth) {
            let _guard = self.session_lock.lock().await;
            let stored = self.tokens.access_token().await.ok().flatten();
            if stored.as_deref() == Some(fresh.as_str()) {
                info!("Refreshed token rejected, signing out");
                self.clear_session_locked().await;
            }
        }
        retried
    }

    /// Refresh unless someone else already did since `seen` was read.
    ///
    /// Returns the access token to use for the replay.
    async fn refresh_single_flight(
        &self,
        cancel: &CancellationToken,
        seen: Option<&str>,
    ) -> Result<String, DomainError> {
        let _guard = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(DomainError::cancelled()),
            guard = self.session_lock.lock() => guard,
        };

        if let Some(current) = self.tokens.access_token().await? {
            if seen != Some(current.as_str()) {
                debug!("Session already refreshed by a concurrent call");
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.tokens.refresh_token().await? else {
            info!("No refresh token available, signing out");
            self.clear_session_locked().await;
            return Err(DomainError::auth("Not authenticated"));
        };

        let request = ApiRequest::post(self.endpoint_url(&self.config.endpoints.refresh))
            .with_json(&RefreshRequest { refresh_token })
            .map_err(|e| self.classify_transport(e))?;
        let refreshed = self
            .retry
            .execute(cancel, move || self.send_json::<TokenResponse>(request.clone()))
            .await
            .into_result();

        match refreshed {
            Ok(response) => {
                let tokens = TokenPair::from(response);
                if let Err(e) = self.tokens.save(&tokens).await {
                    // The old refresh token may already be spent.
                    error!(error = %e, "Failed to store refreshed tokens, signing out");
                    self.clear_session_locked().await;
                    return Err(e.into());
                }
                self.state.keep_authenticated();
                info!("Session refreshed");
                Ok(tokens.access_token)
            }
            Err(error)
                if error.is_cancelled()
                    || matches!(error.kind, ErrorKind::NetworkError | ErrorKind::ServerError) =>
            {
                warn!(kind = %error.kind, "Token refresh failed, keeping stored tokens");
                Err(error)
            }
            Err(error) => {
                info!(kind = %error.kind, "Refresh token rejected, signing out");
                self.clear_session_locked().await;
                Err(DomainError::auth("Session expired").with_details(error.message))
            }
        }
    }

    /// Caller must hold `session_lock`.
    async fn end_session_locked(&self) -> Result<(), TokenStoreError> {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        let cleared = self.tokens.clear().await;
        if self.state.sign_out() {
            info!("Auth state changed to unauthenticated");
        }
        cleared
    }

    /// Caller must hold `session_lock`.
    async fn clear_session_locked(&self) {
        if let Err(e) = self.end_session_locked().await {
            error!(error = %e, "Failed to clear stored tokens");
        }
    }

    /// Record the user returned by a call started in session `epoch`.
    ///
    /// Ignored when that session has since ended or been replaced.
    async fn remember_user(&self, epoch: u64, result: &DomainResult<UserSummary>) {
        let Some(user) = result.data() else {
            return;
        };
        let _guard = self.session_lock.lock().await;
        if self.epoch() != epoch || !self.tokens.has_access_token().await {
            debug!("Session ended while the call was in flight, keeping auth state");
            return;
        }
        if self.state.authenticate(user.clone()) {
            debug!(user_id = %user.id, "Auth state updated with current user");
        }
    }

    fn classify_transport(&self, error: TransportError) -> DomainError {
        self.retry.classifier().classify(&ApiFailure::from(error)).error
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiFailure> {
        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiFailure::Status(response))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiFailure> {
        let response = self.send(request).await?;
        response.json().map_err(|e| ApiFailure::decode(&e))
    }
}

impl std::fmt::Debug for AuthCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCoordinator")
            .field("base_url", &self.config.base_url)
            .field("state", &self.state.current())
            .finish_non_exhaustive()
    }
}
