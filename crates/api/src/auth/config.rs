use anyhow::Context;

/// Auth settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
}

impl AuthConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string());
        let jwt_expiration_hours = std::env::var("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<u64>()
            .context("JWT_EXPIRATION_HOURS must be an integer")?;

        Ok(Self {
            jwt_secret,
            jwt_expiration_hours,
        })
    }
}
