//! Instagram Graph API integration.
//!
//! Two concerns live here: the per-user connection record
//! ([`InstagramAccount`]) and the Graph client that establishes and uses it.
//! Publishing follows the Graph API's two-step protocol: create a media
//! container for an image URL + caption, then publish the container.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[cfg(feature = "clients")]
use time::Duration;

#[cfg(feature = "clients")]
use crate::PostprepError;
#[cfg(feature = "clients")]
use crate::Result;

/// A user's Instagram connection: who they are on the graph and the
/// long-lived token that lets us post on their behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramAccount {
    /// Our own user identifier the connection belongs to.
    pub user_id: String,
    /// The account's id on the Instagram graph.
    pub instagram_user_id: String,
    pub username: String,
    pub access_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub token_expires_at: OffsetDateTime,
}

impl InstagramAccount {
    /// Whether the stored token has passed its expiry.
    pub fn is_token_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.token_expires_at
    }
}

#[cfg(feature = "clients")]
const OAUTH_TOKEN_URL: &str = "https://api.instagram.com/oauth/access_token";
#[cfg(feature = "clients")]
const GRAPH_BASE: &str = "https://graph.instagram.com";

#[cfg(feature = "clients")]
#[derive(Deserialize)]
struct ShortLivedToken {
    access_token: String,
}

#[cfg(feature = "clients")]
#[derive(Deserialize)]
struct LongLivedToken {
    access_token: String,
    expires_in: i64,
}

#[cfg(feature = "clients")]
#[derive(Deserialize)]
struct Profile {
    id: String,
    username: String,
}

/// Client for the Instagram OAuth + Graph endpoints.
#[cfg(feature = "clients")]
pub struct InstagramClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
}

#[cfg(feature = "clients")]
impl InstagramClient {
    /// Create a client for the given app credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Exchange an OAuth authorization code for a connected account.
    ///
    /// Three round-trips, mirroring the platform's flow: code → short-lived
    /// token, short-lived → long-lived token, then a profile fetch for the
    /// graph id and username. The expiry on the returned record is computed
    /// from the long-lived token's `expires_in`.
    pub async fn connect(&self, code: &str, redirect_uri: &str, user_id: &str) -> Result<InstagramAccount> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
            ("code", code),
        ];

        let response = self.client.post(OAUTH_TOKEN_URL).form(&form).send().await?;
        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PostprepError::TokenExchange(detail));
        }
        let short: ShortLivedToken = response
            .json()
            .await
            .map_err(|e| PostprepError::TokenExchange(e.to_string()))?;

        let response = self
            .client
            .get(format!("{GRAPH_BASE}/access_token"))
            .query(&[
                ("grant_type", "ig_exchange_token"),
                ("client_secret", self.client_secret.as_str()),
                ("access_token", short.access_token.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PostprepError::TokenExchange(
                "long-lived token exchange failed".to_string(),
            ));
        }
        let long: LongLivedToken = response
            .json()
            .await
            .map_err(|e| PostprepError::TokenExchange(e.to_string()))?;

        let response = self
            .client
            .get(format!("{GRAPH_BASE}/me"))
            .query(&[
                ("fields", "id,username"),
                ("access_token", long.access_token.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PostprepError::TokenExchange("profile fetch failed".to_string()));
        }
        let profile: Profile = response
            .json()
            .await
            .map_err(|e| PostprepError::TokenExchange(e.to_string()))?;

        tracing::info!(username = %profile.username, "connected Instagram account");

        Ok(InstagramAccount {
            user_id: user_id.to_string(),
            instagram_user_id: profile.id,
            username: profile.username,
            access_token: long.access_token,
            token_expires_at: OffsetDateTime::now_utc() + Duration::seconds(long.expires_in),
        })
    }

    /// Publish an image + caption to a connected account.
    ///
    /// Step one creates a media container for the image URL; step two
    /// publishes it. Returns the created post's id. Either step answering
    /// without an `id` surfaces the API's error payload.
    pub async fn publish(&self, account: &InstagramAccount, image_url: &str, caption: &str) -> Result<String> {
        let creation_id = {
            let response = self
                .client
                .post(format!("{GRAPH_BASE}/{}/media", account.instagram_user_id))
                .query(&[
                    ("image_url", image_url),
                    ("caption", caption),
                    ("access_token", account.access_token.as_str()),
                ])
                .send()
                .await?;
            let payload: serde_json::Value = response.json().await?;
            payload["id"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| PostprepError::MediaCreate(graph_error(&payload)))?
        };

        tracing::debug!(%creation_id, "media container created");

        let response = self
            .client
            .post(format!("{GRAPH_BASE}/{}/media_publish", account.instagram_user_id))
            .query(&[
                ("creation_id", creation_id.as_str()),
                ("access_token", account.access_token.as_str()),
            ])
            .send()
            .await?;
        let payload: serde_json::Value = response.json().await?;
        let post_id = payload["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PostprepError::MediaPublish(graph_error(&payload)))?;

        tracing::info!(%post_id, username = %account.username, "post published");

        Ok(post_id)
    }
}

/// Pull a readable message out of a Graph API error payload.
#[cfg(feature = "clients")]
fn graph_error(payload: &serde_json::Value) -> String {
    payload["error"]["message"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn account() -> InstagramAccount {
        InstagramAccount {
            user_id: "user-1".to_string(),
            instagram_user_id: "17841400000000000".to_string(),
            username: "bakery".to_string(),
            access_token: "IGQVJ...".to_string(),
            token_expires_at: datetime!(2026-06-01 00:00:00 UTC),
        }
    }

    #[test]
    fn test_account_serde_round_trip() {
        let original = account();
        let json = serde_json::to_string(&original).unwrap();
        let parsed: InstagramAccount = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_token_expiry_check() {
        let account = account();
        assert!(!account.is_token_expired(datetime!(2026-05-31 23:59:59 UTC)));
        assert!(account.is_token_expired(datetime!(2026-06-01 00:00:00 UTC)));
    }

    #[cfg(feature = "clients")]
    #[test]
    fn test_graph_error_prefers_message() {
        let payload = serde_json::json!({"error": {"message": "Invalid image URL", "code": 9004}});
        assert_eq!(graph_error(&payload), "Invalid image URL");

        let bare = serde_json::json!({"status": "weird"});
        assert!(graph_error(&bare).contains("weird"));
    }
}
