//! Outgoing request description.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use pillbox_core::Result;
use pillbox_core::error::InvalidInputError;

/// Which credential a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Auth {
    /// A valid access token, refreshed as needed, with one retry on 401.
    #[default]
    Access,
    /// The stored refresh token. Used by logout; no retry.
    Refresh,
    /// No credential. A 401 is an ordinary API error.
    None,
}

/// A request against the API, relative to the configured base URL.
///
/// Requests are cheap to clone so the same request can be resent after a
/// token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    auth: Auth,
}

impl ApiRequest {
    /// Create a request with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth: Auth::Access,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set a JSON body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize a value as the JSON body.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Other {
            message: format!("request body is not serializable: {}", e),
        })?;
        Ok(self.body(value))
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Choose the credential this request carries.
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Shorthand for `auth(Auth::None)`.
    pub fn unauthenticated(self) -> Self {
        self.auth(Auth::None)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body_json(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn auth_mode(&self) -> Auth {
        self.auth
    }

    /// Returns true if this request carries an access token.
    pub fn requires_access_token(&self) -> bool {
        self.auth == Auth::Access
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_to_access_auth() {
        let req = ApiRequest::get("/medications");
        assert_eq!(req.auth_mode(), Auth::Access);
        assert!(req.requires_access_token());
        assert!(req.body_json().is_none());
    }

    #[test]
    fn builder_sets_fields() {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
        }

        let req = ApiRequest::post("/auth/forgot-password")
            .json(&Body {
                email: "ada@example.com",
            })
            .unwrap()
            .query("lang", "en")
            .unauthenticated();

        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.path(), "/auth/forgot-password");
        assert_eq!(req.body_json(), Some(&json!({"email": "ada@example.com"})));
        assert_eq!(req.query_params(), &[("lang".to_string(), "en".to_string())]);
        assert!(!req.requires_access_token());
    }
}
