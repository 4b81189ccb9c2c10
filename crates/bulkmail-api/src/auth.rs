//! Login and registration payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Body of `POST /login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Account email.
    pub email: &'a str,
    /// Account password.
    pub password: &'a str,
}

impl fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login response.
#[derive(Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent calls.
    pub token: String,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /register`.
#[derive(Clone, Serialize)]
pub struct RegisterRequest<'a> {
    /// Display name.
    pub name: &'a str,
    /// Account email.
    pub email: &'a str,
    /// Account password.
    pub password: &'a str,
}

impl fmt::Debug for RegisterRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn login_request_json() {
        let request = LoginRequest {
            email: "a@b.com",
            password: "pw",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["email"], "a@b.com");
        assert_eq!(json["password"], "pw");
        assert!(!format!("{request:?}").contains("pw\""));
    }

    #[test]
    fn login_response_hides_token() {
        let response: LoginResponse = serde_json::from_str(r#"{"token":"jwt.abc"}"#).unwrap();
        assert_eq!(response.token, "jwt.abc");
        assert!(!format!("{response:?}").contains("jwt.abc"));
    }
}
