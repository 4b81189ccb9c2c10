//! # bulkmail-api
//!
//! HTTP client for the bulkmail backend.
//!
//! The backend exposes two surfaces:
//!
//! - **User API**: `POST /login`, `POST /register`, `GET /me`, `PUT /settings`
//! - **Mail API**: `POST /send` (multipart, one recipient per call), `GET /history`
//!
//! Authenticated calls carry `Authorization: Bearer <token>`. Failures with a
//! non-success status surface as [`Error::Api`] carrying the server's `error`
//! message when one was sent.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bulkmail_api::{Client, DEFAULT_MAIL_API, DEFAULT_USER_API, Endpoints, SendRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let endpoints = Endpoints::new(DEFAULT_USER_API, DEFAULT_MAIL_API)?;
//!     let client = Client::new(endpoints);
//!     let login = client.login("me@example.com", "password").await?;
//!     let client = client.with_token(login.token);
//!
//!     client
//!         .send_mail(&SendRequest::new("hr@acme.io", "Hello", "<p>Hi!</p>"))
//!         .await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod auth;
mod client;
mod error;
pub mod mail;
pub mod profile;

pub use auth::LoginResponse;
pub use client::{Client, DEFAULT_MAIL_API, DEFAULT_USER_API, Endpoints};
pub use error::{Error, ErrorResponse, Result};
pub use mail::{AttachmentPart, DeliveryStatus, HistoryEntry, SendRequest};
pub use profile::{Profile, Provider, ProviderSettings, UnknownProvider};
