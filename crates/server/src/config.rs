//! Server configuration from environment variables.
//!
//! Collaborator credentials are optional at startup: endpoints whose
//! collaborator is unconfigured answer with an explanatory error instead of
//! preventing the rest of the service from running.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

const DEFAULT_BIND: &str = "0.0.0.0:8787";

/// Instagram app credentials used for the OAuth exchange.
#[derive(Debug, Clone)]
pub struct InstagramAppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Everything the server reads from its environment.
///
/// - `POSTPREP_BIND`: listen address (default `0.0.0.0:8787`)
/// - `POSTPREP_STORE_DIR`: account store root (default: platform data dir)
/// - `OPENROUTER_API_KEY`: caption provider key
/// - `INSTAGRAM_CLIENT_ID` / `INSTAGRAM_CLIENT_SECRET` / `INSTAGRAM_REDIRECT_URI`
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub store_dir: Option<PathBuf>,
    pub openrouter_api_key: Option<String>,
    pub instagram: Option<InstagramAppConfig>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind = env::var("POSTPREP_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_string())
            .parse()
            .context("POSTPREP_BIND is not a valid socket address")?;

        let store_dir = env::var_os("POSTPREP_STORE_DIR").map(PathBuf::from);

        let openrouter_api_key = non_empty(env::var("OPENROUTER_API_KEY").ok());

        let instagram = match (
            non_empty(env::var("INSTAGRAM_CLIENT_ID").ok()),
            non_empty(env::var("INSTAGRAM_CLIENT_SECRET").ok()),
            non_empty(env::var("INSTAGRAM_REDIRECT_URI").ok()),
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => {
                Some(InstagramAppConfig { client_id, client_secret, redirect_uri })
            }
            (None, None, None) => None,
            _ => anyhow::bail!(
                "INSTAGRAM_CLIENT_ID, INSTAGRAM_CLIENT_SECRET, and INSTAGRAM_REDIRECT_URI must be set together"
            ),
        };

        Ok(Self { bind, store_dir, openrouter_api_key, instagram })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
