//! Token lifecycle: expiry checks, single-flight refresh, and 401 retry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::Utc;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use pillbox_core::error::AuthError;
use pillbox_core::{
    AccessToken, AuthTokens, CredentialPair, CredentialStore, Envelope, Error, NoopObserver,
    RefreshToken, Result, SessionObserver, TokenStatus, UserProfile,
};

use crate::client::HttpClient;
use crate::config::ClientConfig;
use crate::endpoints::{REFRESH_TOKEN, RefreshTokenRequest};
use crate::request::{ApiRequest, Auth};

type RefreshFlight = Shared<BoxFuture<'static, Result<AccessToken>>>;

/// The in-flight refresh, if any.
///
/// `generation` increases with every flight started so a flight only ever
/// clears its own entry.
#[derive(Default)]
struct RefreshSlot {
    generation: u64,
    flight: Option<RefreshFlight>,
}

/// Outcome of one dispatch of an authenticated request.
enum Attempt<T> {
    Success(T),
    /// The server answered 401.
    AuthExpired,
    Failed(Error),
}

/// API client that keeps the stored access token valid.
///
/// Every request marked [`Auth::Access`] carries an access token that is
/// not within the expiry buffer, refreshing first when needed. At most one
/// refresh call is in flight per client; everyone who needs a token while
/// it runs waits for that same refresh. A 401 triggers one refresh and one
/// resend, never more.
///
/// Cloning is cheap and clones share the refresh gate.
#[derive(Clone)]
pub struct TokenClient {
    session: Arc<Session>,
    refresh: Arc<Mutex<RefreshSlot>>,
}

/// Everything a refresh needs. Kept apart from the refresh slot so a flight
/// parked in the slot never keeps the slot itself alive.
struct Session {
    http: HttpClient,
    store: CredentialStore,
    observer: Arc<dyn SessionObserver>,
    config: ClientConfig,
}

/// Builder for [`TokenClient`].
pub struct TokenClientBuilder {
    config: ClientConfig,
    store: Option<CredentialStore>,
    observer: Option<Arc<dyn SessionObserver>>,
}

impl TokenClientBuilder {
    /// Use this credential store. Defaults to an in-memory store.
    pub fn store(mut self, store: CredentialStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Notify this observer when the session ends involuntarily.
    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> Result<TokenClient> {
        let http = HttpClient::new(&self.config)?;
        Ok(TokenClient {
            session: Arc::new(Session {
                http,
                store: self.store.unwrap_or_else(CredentialStore::in_memory),
                observer: self.observer.unwrap_or_else(|| Arc::new(NoopObserver)),
                config: self.config,
            }),
            refresh: Arc::new(Mutex::new(RefreshSlot::default())),
        })
    }
}

impl TokenClient {
    pub fn builder(config: ClientConfig) -> TokenClientBuilder {
        TokenClientBuilder {
            config,
            store: None,
            observer: None,
        }
    }

    /// Create a client over `store` with no session observer.
    pub fn new(config: ClientConfig, store: CredentialStore) -> Result<Self> {
        Self::builder(config).store(store).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.session.config
    }

    pub fn store(&self) -> &CredentialStore {
        &self.session.store
    }

    /// Returns a usable access token, refreshing first if the stored one is
    /// expired.
    ///
    /// `Ok(None)` means no credentials are stored. Refresh failures are
    /// returned as errors; by then the session has already been ended.
    #[instrument(skip(self))]
    pub async fn valid_access_token(&self) -> Result<Option<AccessToken>> {
        let Some(pair) = self.session.store.load().await? else {
            debug!("No stored credentials");
            return Ok(None);
        };

        if !pair.access_expired_at(Utc::now(), self.session.config.expiry_buffer) {
            return Ok(Some(pair.access_token));
        }

        debug!(expiry = %pair.access_expiry, "Access token expired or about to");
        self.refresh_after(Some(pair.access_token)).await.map(Some)
    }

    /// Exchange the refresh token for a new pair.
    ///
    /// Joins the refresh already in flight if there is one. Otherwise always
    /// contacts the server, provided an unexpired refresh token is stored.
    pub async fn refresh(&self) -> Result<AccessToken> {
        self.refresh_after(None).await
    }

    /// Same as [`refresh`](Self::refresh); for callers that want to rotate
    /// tokens explicitly.
    pub async fn force_refresh(&self) -> Result<AccessToken> {
        self.refresh().await
    }

    /// Refresh because `stale` was found unusable.
    ///
    /// If another flight already replaced `stale` with a valid token, that
    /// token is returned without a network call.
    async fn refresh_after(&self, stale: Option<AccessToken>) -> Result<AccessToken> {
        let flight = {
            let mut slot = lock(&self.refresh);
            match &slot.flight {
                Some(flight) => {
                    debug!("Joining refresh in flight");
                    flight.clone()
                }
                None => {
                    slot.generation += 1;
                    let generation = slot.generation;
                    let session = Arc::clone(&self.session);
                    let gate: Weak<Mutex<RefreshSlot>> = Arc::downgrade(&self.refresh);
                    let flight = async move {
                        let result = session.run_refresh(stale).await;
                        if let Some(gate) = gate.upgrade() {
                            let mut slot = lock(&gate);
                            if slot.generation == generation {
                                slot.flight = None;
                            }
                        }
                        result
                    }
                    .boxed()
                    .shared();
                    slot.flight = Some(flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    /// Send a request and decode its envelope.
    ///
    /// For [`Auth::Access`] requests a 401 causes one refresh and one resend;
    /// a second 401 ends the session with [`AuthError::SessionExpired`].
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn request<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<Envelope<T>> {
        match request.auth_mode() {
            Auth::None => self.session.http.send(request, None).await?.into_envelope(),
            Auth::Refresh => {
                let refresh = self.session.store.load().await?.map(|pair| pair.refresh_token);
                self.session
                    .http
                    .send(request, refresh.as_ref().map(RefreshToken::as_str))
                    .await?
                    .into_envelope()
            }
            Auth::Access => self.request_with_retry(request).await,
        }
    }

    async fn request_with_retry<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<Envelope<T>> {
        let token = self.valid_access_token().await?;

        match self.attempt(request, token.as_ref()).await {
            Attempt::Success(envelope) => return Ok(envelope),
            Attempt::Failed(err) => return Err(err),
            Attempt::AuthExpired => info!("Access token rejected, refreshing and retrying once"),
        }

        let fresh = self.refresh_after(token).await?;

        match self.attempt(request, Some(&fresh)).await {
            Attempt::Success(envelope) => Ok(envelope),
            Attempt::Failed(err) => Err(err),
            Attempt::AuthExpired => {
                warn!("Access token rejected after refresh");
                Err(self.session.end_session_with(AuthError::SessionExpired.into()).await)
            }
        }
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Attempt<Envelope<T>> {
        let response = match self.session.http.send(request, token.map(AccessToken::as_str)).await {
            Ok(response) => response,
            Err(err) => return Attempt::Failed(err),
        };

        if response.status == 401 {
            return Attempt::AuthExpired;
        }

        match response.into_envelope() {
            Ok(envelope) => Attempt::Success(envelope),
            Err(err) => Attempt::Failed(err),
        }
    }

    /// `GET` an authenticated path and return its `data`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Ok(self.request(&ApiRequest::get(path)).await?.data)
    }

    /// `POST` a JSON body to an authenticated path and return its `data`.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        Ok(self.request(&ApiRequest::post(path).json(body)?).await?.data)
    }

    /// True if a credential pair is stored and its refresh token is usable.
    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self
            .session
            .store
            .load()
            .await?
            .is_some_and(|pair| !pair.refresh_expired_at(Utc::now(), self.session.config.expiry_buffer)))
    }

    /// Expiry summary of the stored pair, if any.
    pub async fn token_status(&self) -> Result<Option<TokenStatus>> {
        Ok(self
            .session
            .store
            .load()
            .await?
            .map(|pair| pair.status_at(Utc::now(), self.session.config.expiry_buffer)))
    }

    pub async fn current_user(&self) -> Result<Option<UserProfile>> {
        self.session.store.load_user().await
    }

    /// Persist credentials (and the user, when given) after login or registration.
    pub async fn store_login(&self, pair: &CredentialPair, user: Option<&UserProfile>) -> Result<()> {
        self.session.store.save(pair).await?;
        if let Some(user) = user {
            self.session.store.save_user(user).await?;
        }
        Ok(())
    }

    /// Remove credentials and the stored user. Does not notify the observer.
    pub async fn end_session(&self) -> Result<()> {
        self.session.store.clear().await?;
        self.session.store.clear_user().await?;
        info!("Session ended");
        Ok(())
    }
}

impl Session {
    #[instrument(skip_all)]
    async fn run_refresh(&self, stale: Option<AccessToken>) -> Result<AccessToken> {
        let now = Utc::now();
        let buffer = self.config.expiry_buffer;

        let Some(pair) = self.store.load().await? else {
            return Err(self
                .end_session_with(
                    AuthError::RefreshUnavailable {
                        reason: "no refresh token stored".to_string(),
                    }
                    .into(),
                )
                .await);
        };

        if let Some(stale) = &stale {
            if pair.access_token != *stale && !pair.access_expired_at(now, buffer) {
                debug!("Stored token already replaced, skipping refresh");
                return Ok(pair.access_token);
            }
        }

        if pair.refresh_expired_at(now, buffer) {
            return Err(self
                .end_session_with(
                    AuthError::RefreshUnavailable {
                        reason: "refresh token expired".to_string(),
                    }
                    .into(),
                )
                .await);
        }

        info!("Refreshing tokens");
        let fresh = match self.request_new_pair(&pair.refresh_token).await {
            Ok(fresh) => fresh,
            Err(err) => return Err(self.end_session_with(err).await),
        };

        self.store.save(&fresh).await?;
        debug!(expiry = %fresh.access_expiry, "Tokens refreshed");
        Ok(fresh.access_token)
    }

    /// Call the refresh endpoint. Every failure is a [`AuthError::RefreshFailed`].
    async fn request_new_pair(&self, refresh: &RefreshToken) -> Result<CredentialPair> {
        let request = ApiRequest::post(REFRESH_TOKEN)
            .auth(Auth::Refresh)
            .json(&RefreshTokenRequest {
                refresh_token: refresh.as_str(),
            })?;

        let response = self
            .http
            .send(&request, Some(refresh.as_str()))
            .await
            .map_err(|e| refresh_failed(None, e.to_string()))?;

        let status = response.status;
        let envelope: Envelope<AuthTokens> = response.into_envelope().map_err(|e| {
            let reason = match e {
                Error::Api(api) => api.message,
                other => other.to_string(),
            };
            refresh_failed(Some(status), reason)
        })?;

        envelope
            .data
            .into_pair()
            .map_err(|reason| refresh_failed(Some(status), reason))
    }

    /// Clear stored credentials and notify the observer. Returns `err` for propagation.
    async fn end_session_with(&self, err: Error) -> Error {
        warn!(error = %err, "Ending session");
        if let Err(clear_err) = self.store.clear().await {
            warn!(error = %clear_err, "Failed to clear credentials");
        }
        self.observer.session_ended(&err);
        err
    }
}

fn refresh_failed(status: Option<u16>, reason: String) -> Error {
    AuthError::RefreshFailed { status, reason }.into()
}

fn lock(slot: &Mutex<RefreshSlot>) -> MutexGuard<'_, RefreshSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl std::fmt::Debug for TokenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenClient")
            .field("base_url", self.session.http.base_url())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
