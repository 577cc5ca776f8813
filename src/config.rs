use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub detail_mode: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_hours: std::env::var("JWT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
        };
        let engine = EngineConfig {
            base_url: std::env::var("ENGINE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
            timeout_secs: std::env::var("ENGINE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
            detail_mode: std::env::var("ENGINE_DETAIL_MODE")
                .unwrap_or_else(|_| "concise".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            engine,
        })
    }
}
