//! Account profile and outbound provider settings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outbound mail provider the server sends through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Gmail (app password).
    Gmail,
    /// Zoho Mail.
    Zoho,
    /// Outlook / Office 365.
    Outlook,
    /// Yahoo Mail.
    Yahoo,
}

impl Provider {
    /// All supported providers.
    pub const ALL: [Self; 4] = [Self::Gmail, Self::Zoho, Self::Outlook, Self::Yahoo];

    /// Wire identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gmail => "gmail",
            Self::Zoho => "zoho",
            Self::Outlook => "outlook",
            Self::Yahoo => "yahoo",
        }
    }

    /// Get display name for the provider.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Gmail => "Gmail",
            Self::Zoho => "Zoho",
            Self::Outlook => "Outlook / Office 365",
            Self::Yahoo => "Yahoo",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown provider name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown provider: {0} (expected gmail, zoho, outlook or yahoo)")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gmail" => Ok(Self::Gmail),
            "zoho" => Ok(Self::Zoho),
            "outlook" | "office365" => Ok(Self::Outlook),
            "yahoo" => Ok(Self::Yahoo),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// The logged-in user as returned by `GET /me`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Provider identifier; empty or absent until configured.
    #[serde(default)]
    pub provider: Option<String>,
    /// Sender address used for outbound mail.
    #[serde(default)]
    pub from_mail: Option<String>,
    /// Provider app password.
    #[serde(default)]
    pub app_password: Option<String>,
    /// Account creation time.
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last profile update.
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Parsed provider, if one is configured and recognised.
    #[must_use]
    pub fn provider(&self) -> Option<Provider> {
        self.provider.as_deref().and_then(|p| p.parse().ok())
    }

    /// Extracts the provider settings portion of the profile.
    #[must_use]
    pub fn settings(&self) -> Option<ProviderSettings> {
        Some(ProviderSettings {
            from_mail: self.from_mail.clone().unwrap_or_default(),
            app_password: self.app_password.clone().unwrap_or_default(),
            provider: self.provider()?,
        })
    }
}

/// Body of `PUT /settings`.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderSettings {
    /// Sender address.
    pub from_mail: String,
    /// Provider app password.
    pub app_password: String,
    /// Provider.
    pub provider: Provider,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("from_mail", &self.from_mail)
            .field("app_password", &"<redacted>")
            .field("provider", &self.provider)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod provider_tests {
        use super::*;

        #[test]
        fn parse_known() {
            assert_eq!("gmail".parse::<Provider>().unwrap(), Provider::Gmail);
            assert_eq!(" Zoho ".parse::<Provider>().unwrap(), Provider::Zoho);
            assert_eq!("OUTLOOK".parse::<Provider>().unwrap(), Provider::Outlook);
            assert_eq!("yahoo".parse::<Provider>().unwrap(), Provider::Yahoo);
        }

        #[test]
        fn parse_unknown() {
            let err = "aol".parse::<Provider>().unwrap_err();
            assert_eq!(err, UnknownProvider("aol".to_string()));
        }

        #[test]
        fn serializes_lowercase() {
            let json = serde_json::to_string(&Provider::Outlook).unwrap();
            assert_eq!(json, r#""outlook""#);
        }

        #[test]
        fn display_round_trips() {
            for provider in Provider::ALL {
                assert_eq!(provider.to_string().parse::<Provider>().unwrap(), provider);
            }
        }
    }

    #[test]
    fn profile_from_server_json() {
        let json = r#"{
            "name": "Ada",
            "email": "ada@example.com",
            "provider": "gmail",
            "from_mail": "ada@gmail.com",
            "app_password": "abcd efgh",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-02T11:30:00Z"
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.provider(), Some(Provider::Gmail));
        let settings = profile.settings().unwrap();
        assert_eq!(settings.from_mail, "ada@gmail.com");
        assert!(profile.created_at.is_some());
    }

    #[test]
    fn profile_without_provider() {
        let json = r#"{"name":"Bo","email":"bo@example.com","provider":"","createdAt":null,"updatedAt":null}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.provider(), None);
        assert!(profile.settings().is_none());
    }

    #[test]
    fn settings_debug_redacts_password() {
        let settings = ProviderSettings {
            from_mail: "a@b.com".to_string(),
            app_password: "hunter2".to_string(),
            provider: Provider::Yahoo,
        };
        assert!(!format!("{settings:?}").contains("hunter2"));
    }
}
