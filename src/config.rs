use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    /// Allowed browser origins. Empty, or containing `*`, means any origin
    /// without credentials.
    pub cors_origins: Vec<String>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| format!("Missing required environment variable: {key}"))
        };
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.is_empty() {
            return Err("JWT_SECRET must not be empty".to_string());
        }

        let database_max_connections: u32 = or("DATABASE_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|e| format!("Invalid DATABASE_MAX_CONNECTIONS: {e}"))?;

        let host: IpAddr = or("HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid HOST: {e}"))?;

        let port: u16 = or("PORT", "4000")
            .parse()
            .map_err(|e| format!("Invalid PORT: {e}"))?;

        let cors_origins = or("CORS_ORIGIN", "")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let log_level = or("LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            database_max_connections,
            jwt_secret,
            host,
            port,
            cors_origins,
            log_level,
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}
