//! # Application Configuration
//!
//! Env-driven configuration, read once at startup and carried inside
//! [`crate::state::AppState`]. Nothing in the request path reads the
//! environment.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `WAYFARE_PORT` | Listen port | `8080` |
//! | `DATABASE_URL` | Postgres connection string | unset → data routes 503 |
//! | `WAYFARE_JWT_SECRET` | HS256 session-token secret | required in `main` |
//! | `WAYFARE_SESSION_TTL_HOURS` | Session token lifetime | `720` (30 days) |
//! | `WAYFARE_WEBHOOK_SECRET` | Shared secret for the payment webhook | unset → webhook 503 |
//! | `WAYFARE_CONNECT_CLIENT_ID` | Payment-provider OAuth client id | unset → connect 503 |
//! | `WAYFARE_CONNECT_SECRET` | Payment-provider OAuth client secret | unset → connect 503 |
//! | `WAYFARE_CONNECT_AUTHORIZE_URL` | Provider authorize endpoint | Stripe Connect |
//! | `WAYFARE_CONNECT_TOKEN_URL` | Provider token endpoint | Stripe Connect |
//! | `WAYFARE_CONNECT_REDIRECT_URI` | Our callback URI | required with client id |
//! | `WAYFARE_S3_BUCKET` | Media bucket | unset → media routes 503 |
//! | `WAYFARE_S3_ENDPOINT` | Custom S3-compatible endpoint | AWS default |
//! | `WAYFARE_S3_PUBLIC_BASE_URL` | Public URL base for uploaded objects | derived from bucket |

use crate::auth::SecretString;

/// Payment-provider OAuth connect settings.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub authorize_url: String,
    pub token_url: String,
    pub redirect_uri: String,
}

/// Object-storage settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub public_base_url: String,
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: SecretString,
    pub session_ttl_hours: i64,
    pub webhook_secret: Option<SecretString>,
    pub connect: Option<ConnectConfig>,
    pub storage: Option<StorageConfig>,
}

impl AppConfig {
    /// Configuration for tests: fixed secret, no optional integrations.
    pub fn for_tests() -> Self {
        Self {
            port: 8080,
            jwt_secret: SecretString::new("test-secret"),
            session_ttl_hours: 1,
            webhook_secret: None,
            connect: None,
            storage: None,
        }
    }

    /// Read configuration from the environment.
    ///
    /// Optional integrations (webhook, connect, storage) are `None` when
    /// their variables are absent; the corresponding routes answer 503.
    pub fn from_env() -> Result<Self, String> {
        let port = match std::env::var("WAYFARE_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| format!("WAYFARE_PORT is not a valid port: {raw}"))?,
            Err(_) => 8080,
        };

        let jwt_secret = std::env::var("WAYFARE_JWT_SECRET")
            .map(|s| SecretString::new(&s))
            .map_err(|_| "WAYFARE_JWT_SECRET must be set".to_string())?;

        let session_ttl_hours = match std::env::var("WAYFARE_SESSION_TTL_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|_| format!("WAYFARE_SESSION_TTL_HOURS is not a number: {raw}"))?,
            Err(_) => 720,
        };

        let webhook_secret = std::env::var("WAYFARE_WEBHOOK_SECRET")
            .ok()
            .map(|s| SecretString::new(&s));

        let connect = match std::env::var("WAYFARE_CONNECT_CLIENT_ID") {
            Ok(client_id) => {
                let client_secret = std::env::var("WAYFARE_CONNECT_SECRET")
                    .map(|s| SecretString::new(&s))
                    .map_err(|_| {
                        "WAYFARE_CONNECT_SECRET must be set when WAYFARE_CONNECT_CLIENT_ID is"
                            .to_string()
                    })?;
                let redirect_uri = std::env::var("WAYFARE_CONNECT_REDIRECT_URI").map_err(|_| {
                    "WAYFARE_CONNECT_REDIRECT_URI must be set when WAYFARE_CONNECT_CLIENT_ID is"
                        .to_string()
                })?;
                Some(ConnectConfig {
                    client_id,
                    client_secret,
                    authorize_url: std::env::var("WAYFARE_CONNECT_AUTHORIZE_URL")
                        .unwrap_or_else(|_| {
                            "https://connect.stripe.com/oauth/authorize".to_string()
                        }),
                    token_url: std::env::var("WAYFARE_CONNECT_TOKEN_URL")
                        .unwrap_or_else(|_| "https://connect.stripe.com/oauth/token".to_string()),
                    redirect_uri,
                })
            }
            Err(_) => None,
        };

        let storage = match std::env::var("WAYFARE_S3_BUCKET") {
            Ok(bucket) => {
                let public_base_url = std::env::var("WAYFARE_S3_PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| format!("https://{bucket}.s3.amazonaws.com"));
                Some(StorageConfig {
                    bucket,
                    endpoint: std::env::var("WAYFARE_S3_ENDPOINT").ok(),
                    public_base_url,
                })
            }
            Err(_) => None,
        };

        Ok(Self {
            port,
            jwt_secret,
            session_ttl_hours,
            webhook_secret,
            connect,
            storage,
        })
    }
}
