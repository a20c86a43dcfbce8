use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockoutConfig {
    /// Failed logins allowed before the account freezes.
    pub max_attempts: i32,
    /// How long a frozen account stays frozen.
    pub freeze_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Upper bound on each call to the identity provider.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub lockout: LockoutConfig,
    pub google: GoogleConfig,
    /// Whether GET /api/note/get-note/:id is readable without a token.
    pub public_note_reads: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let lockout = LockoutConfig {
            max_attempts: std::env::var("MAX_FAILED_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(5),
            freeze_secs: std::env::var("FREEZE_SECS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(5 * 60),
        };
        let google = GoogleConfig {
            client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            timeout_secs: std::env::var("GOOGLE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        let public_note_reads = std::env::var("NOTE_PUBLIC_READS")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        Ok(Self {
            database_url,
            jwt,
            lockout,
            google,
            public_note_reads,
        })
    }
}
