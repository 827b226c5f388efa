//! Typed wrappers for the auth endpoints.

use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use pillbox_core::{AccessToken, Credentials, Envelope, Error, Result, UserProfile};

use crate::endpoints::{
    self, AuthSession, ChangePasswordRequest, EmailRequest, EmailTokenRequest, LoginRequest,
    NewAccount, ResetPasswordRequest,
};
use crate::request::{ApiRequest, Auth};
use crate::token_client::TokenClient;

/// The auth endpoints, on top of a [`TokenClient`].
///
/// Login and registration persist the returned tokens and user; logout
/// always clears them locally.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: TokenClient,
}

impl AuthApi {
    pub fn new(client: TokenClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &TokenClient {
        &self.client
    }

    /// Create an account and start a session for it.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn register(&self, account: &NewAccount) -> Result<UserProfile> {
        let request = ApiRequest::post(endpoints::REGISTER)
            .unauthenticated()
            .json(account)?;
        self.start_session(&request).await
    }

    /// Log in with email and password.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile> {
        let request = ApiRequest::post(endpoints::LOGIN)
            .unauthenticated()
            .json(&LoginRequest {
                email: credentials.email(),
                password: credentials.password(),
            })?;
        self.start_session(&request).await
    }

    async fn start_session(&self, request: &ApiRequest) -> Result<UserProfile> {
        let envelope: Envelope<AuthSession> = self.client.request(request).await?;
        let pair = envelope
            .data
            .tokens
            .into_pair()
            .map_err(|reason| Error::malformed(200, reason))?;

        self.client.store_login(&pair, Some(&envelope.data.user)).await?;
        info!(user = %envelope.data.user.id, "Session started");
        Ok(envelope.data.user)
    }

    /// Revoke the refresh token on the server and end the local session.
    ///
    /// The local session is cleared whatever the server says; its error, if
    /// any, is still returned. Without stored credentials no call is made.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<String> {
        if self.client.store().load().await?.is_none() {
            self.client.end_session().await?;
            return Ok("Not logged in".to_string());
        }

        let request = ApiRequest::post(endpoints::LOGOUT)
            .auth(Auth::Refresh)
            .body(json!({}));
        let result = self.client.request::<Value>(&request).await;

        self.client.end_session().await?;
        match result {
            Ok(envelope) => Ok(envelope.message),
            Err(err) => {
                warn!(error = %err, "Server-side logout failed");
                Err(err)
            }
        }
    }

    /// Rotate the token pair now.
    pub async fn refresh_tokens(&self) -> Result<AccessToken> {
        self.client.force_refresh().await
    }

    /// Confirm an email address with the emailed code.
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, email: &str, token: &str) -> Result<String> {
        self.send_unauthenticated(endpoints::VERIFY_EMAIL, &EmailTokenRequest { email, token })
            .await
    }

    /// Ask for another verification email.
    #[instrument(skip(self))]
    pub async fn send_verification_email(&self, email: &str) -> Result<String> {
        self.send_unauthenticated(endpoints::SEND_VERIFICATION_EMAIL, &EmailRequest { email })
            .await
    }

    /// Start a password reset.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        self.send_unauthenticated(endpoints::FORGOT_PASSWORD, &EmailRequest { email })
            .await
    }

    /// Check a password reset code before asking for the new password.
    #[instrument(skip(self, token))]
    pub async fn verify_reset_password(&self, email: &str, token: &str) -> Result<String> {
        self.send_unauthenticated(
            endpoints::VERIFY_RESET_PASSWORD,
            &EmailTokenRequest { email, token },
        )
        .await
    }

    /// Set a new password using a reset code.
    #[instrument(skip(self, token, password))]
    pub async fn reset_password(&self, email: &str, token: &str, password: &str) -> Result<String> {
        self.send_unauthenticated(
            endpoints::RESET_PASSWORD,
            &ResetPasswordRequest {
                email,
                token,
                password,
            },
        )
        .await
    }

    /// Change the password of the signed-in user.
    ///
    /// Goes through the access-token path, so an expired token is refreshed
    /// and a 401 is retried once.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<String> {
        let request = ApiRequest::post(endpoints::CHANGE_PASSWORD).json(&ChangePasswordRequest {
            current_password,
            new_password,
        })?;
        let envelope: Envelope<Value> = self.client.request(&request).await?;
        Ok(envelope.message)
    }

    /// Fetch the profile of the signed-in user and store it.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile> {
        let user: UserProfile = self.client.get(endpoints::ME).await?;
        self.client.store().save_user(&user).await?;
        Ok(user)
    }

    async fn send_unauthenticated<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<String> {
        let request = ApiRequest::post(path).unauthenticated().json(body)?;
        let envelope: Envelope<Value> = self.client.request(&request).await?;
        Ok(envelope.message)
    }
}
