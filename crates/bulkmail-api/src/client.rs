//! HTTP client for the user and mail APIs.

use reqwest::{Client as HttpClient, RequestBuilder, Response};
use tracing::debug;
use url::Url;

use crate::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::error::{Error, ErrorResponse, Result};
use crate::mail::{HistoryEntry, SendRequest};
use crate::profile::{Profile, ProviderSettings};

/// Default base URL of the user API.
pub const DEFAULT_USER_API: &str = "http://localhost:5000/api/user";

/// Default base URL of the mail API.
pub const DEFAULT_MAIL_API: &str = "http://localhost:5000/api/mail";

/// Base URLs of the two API surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// User API (`/login`, `/register`, `/me`, `/settings`).
    pub user_api: Url,
    /// Mail API (`/send`, `/history`).
    pub mail_api: Url,
}

impl Endpoints {
    /// Creates endpoints from two base URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if either URL is invalid or cannot carry a path.
    pub fn new(user_api: impl AsRef<str>, mail_api: impl AsRef<str>) -> Result<Self> {
        let endpoints = Self {
            user_api: Url::parse(user_api.as_ref())?,
            mail_api: Url::parse(mail_api.as_ref())?,
        };
        for base in [&endpoints.user_api, &endpoints.mail_api] {
            if base.cannot_be_a_base() {
                return Err(Error::InvalidConfig(format!("{base} cannot be a base URL")));
            }
        }
        Ok(endpoints)
    }

    /// URL of a user API route.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path.
    pub fn user(&self, route: &str) -> Result<Url> {
        join(&self.user_api, route)
    }

    /// URL of a mail API route.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path.
    pub fn mail(&self, route: &str) -> Result<Url> {
        join(&self.mail_api, route)
    }
}

/// Appends one path segment, keeping the base path (`/api/user` + `login`).
fn join(base: &Url, route: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::InvalidConfig(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .push(route);
    Ok(url)
}

/// API client. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    endpoints: Endpoints,
    http: HttpClient,
    token: Option<String>,
}

impl Client {
    /// Creates a new unauthenticated client.
    #[must_use]
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            http: HttpClient::new(),
            token: None,
        }
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replaces the bearer token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Returns true if a bearer token is set.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The configured endpoints.
    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Logs in and returns the bearer token.
    ///
    /// The token is not stored on the client; callers decide where it lives.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are rejected.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let url = self.endpoints.user("login")?;
        debug!(%url, email, "Logging in");
        let response = self
            .http
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let url = self.endpoints.user("register")?;
        debug!(%url, email, "Registering account");
        let response = self
            .http
            .post(url)
            .json(&RegisterRequest {
                name,
                email,
                password,
            })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Fetches the logged-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    pub async fn me(&self) -> Result<Profile> {
        let url = self.endpoints.user("me")?;
        let response = self.authorized(self.http.get(url))?.send().await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// Updates the outbound provider settings.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    pub async fn update_settings(&self, settings: &ProviderSettings) -> Result<()> {
        let url = self.endpoints.user("settings")?;
        debug!(%url, provider = %settings.provider, "Updating settings");
        let response = self
            .authorized(self.http.put(url))?
            .json(settings)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Sends one message to one recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in, the transport fails, or the server
    /// answers with a non-success status.
    pub async fn send_mail(&self, request: &SendRequest) -> Result<()> {
        let url = self.endpoints.mail("send")?;
        debug!(
            %url,
            recipient = %request.recipient,
            attachments = request.attachments.len(),
            "Sending mail"
        );
        let response = self
            .authorized(self.http.post(url))?
            .multipart(request.to_form())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Fetches the server-side send history, in server order (oldest first).
    ///
    /// # Errors
    ///
    /// Returns an error if not logged in or the request fails.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let url = self.endpoints.mail("history")?;
        let response = self.authorized(self.http.get(url))?.send().await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.token.as_deref().ok_or(Error::Unauthenticated)?;
        Ok(request.bearer_auth(token))
    }
}

/// Maps non-success responses to [`Error::Api`].
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let error = serde_json::from_str::<ErrorResponse>(&body).unwrap_or_default();
    debug!(status = status.as_u16(), "Request failed");
    Err(error.into_error(status.as_u16()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mail::{AttachmentPart, DeliveryStatus};
    use crate::profile::Provider;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> Client {
        let base = server.url();
        Client::new(
            Endpoints::new(format!("{base}/api/user"), format!("{base}/api/mail")).unwrap(),
        )
    }

    mod endpoints_tests {
        use super::*;

        #[test]
        fn keeps_base_path() {
            let endpoints = Endpoints::new(DEFAULT_USER_API, DEFAULT_MAIL_API).unwrap();
            assert_eq!(
                endpoints.user("login").unwrap().as_str(),
                "http://localhost:5000/api/user/login"
            );
            assert_eq!(
                endpoints.mail("send").unwrap().as_str(),
                "http://localhost:5000/api/mail/send"
            );
        }

        #[test]
        fn tolerates_trailing_slash() {
            let endpoints =
                Endpoints::new("https://api.example.com/user/", "https://api.example.com/mail/")
                    .unwrap();
            assert_eq!(
                endpoints.mail("history").unwrap().as_str(),
                "https://api.example.com/mail/history"
            );
        }

        #[test]
        fn rejects_non_base_urls() {
            assert!(matches!(
                Endpoints::new("mailto:a@b.com", DEFAULT_MAIL_API),
                Err(Error::InvalidConfig(_))
            ));
            assert!(matches!(
                Endpoints::new("not a url", DEFAULT_MAIL_API),
                Err(Error::Url(_))
            ));
        }
    }

    #[tokio::test]
    async fn login_returns_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/user/login")
            .match_body(Matcher::Json(serde_json::json!({
                "email": "ada@example.com",
                "password": "secret"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token":"tok-123"}"#)
            .create_async()
            .await;

        let response = client_for(&server)
            .login("ada@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(response.token, "tok-123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn login_failure_carries_server_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/user/login")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"Invalid credentials"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .login("ada@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn register_accepts_created() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/user/register")
            .match_body(Matcher::PartialJson(serde_json::json!({"name": "Ada"})))
            .with_status(201)
            .create_async()
            .await;

        client_for(&server)
            .register("Ada", "ada@example.com", "secret")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn me_requires_token() {
        let server = mockito::Server::new_async().await;
        let err = client_for(&server).me().await.unwrap_err();
        assert!(matches!(err, Error::Unauthenticated));
    }

    #[tokio::test]
    async fn me_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/user/me")
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"name":"Ada","email":"ada@example.com","provider":"zoho","createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-02T00:00:00Z"}"#,
            )
            .create_async()
            .await;

        let profile = client_for(&server).with_token("tok-123").me().await.unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.provider(), Some(Provider::Zoho));
    }

    #[tokio::test]
    async fn update_settings_puts_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/user/settings")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::Json(serde_json::json!({
                "from_mail": "ada@gmail.com",
                "app_password": "abcd",
                "provider": "gmail"
            })))
            .with_status(200)
            .create_async()
            .await;

        let settings = ProviderSettings {
            from_mail: "ada@gmail.com".to_string(),
            app_password: "abcd".to_string(),
            provider: Provider::Gmail,
        };
        client_for(&server)
            .with_token("tok")
            .update_settings(&settings)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_mail_posts_multipart() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/mail/send")
            .match_header("authorization", "Bearer tok")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="recruiterEmail"\r\n\r\nhr@acme\.io"#.to_string()),
                Matcher::Regex(r#"name="subject"\r\n\r\nHello"#.to_string()),
                Matcher::Regex(r#"name="attachments"; filename="cv\.pdf""#.to_string()),
            ]))
            .with_status(200)
            .create_async()
            .await;

        let request = SendRequest::new("hr@acme.io", "Hello", "<b>Hi</b>")
            .attach(AttachmentPart::new("cv.pdf", b"%PDF-1.4".to_vec()));
        client_for(&server)
            .with_token("tok")
            .send_mail(&request)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_mail_failure_without_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/mail/send")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let err = client_for(&server)
            .with_token("tok")
            .send_mail(&SendRequest::new("a@b.co", "s", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { status: 500, message: None }));
    }

    #[tokio::test]
    async fn history_decodes_entries() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/mail/history")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"recruiterEmail":"a@x.com","subject":"One","status":"success","attachmentsCount":0,"sentAt":"2024-01-01T00:00:00Z"},
                    {"recruiterEmail":"b@y.com","subject":"Two","status":"failed","attachmentsCount":1,"sentAt":"2024-01-02T00:00:00Z","errorMessage":"Rejected"}
                ]"#,
            )
            .create_async()
            .await;

        let history = client_for(&server).with_token("tok").history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].status, DeliveryStatus::Failed);
    }
}
