use axum_helpers::JwtConfig;
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_parse_or, env_required, server::ServerConfig,
};
use database::postgres::PostgresConfig;
use database::{MissingChildPolicy, RetryConfig};

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub retry: RetryConfig,
    pub jwt: JwtConfig,
    /// Comma-separated origins, or `*`
    pub cors_origins: String,
    /// Applied to child updates that match no row under the parent
    pub missing_child_policy: MissingChildPolicy,
    pub run_migrations: bool,
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            database: PostgresConfig::from_env()?,
            retry: RetryConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            cors_origins: env_required("CORS_ALLOWED_ORIGIN")?,
            missing_child_policy: env_parse_or(
                "MISSING_CHILD_POLICY",
                MissingChildPolicy::default(),
            )?,
            run_migrations: env_parse_or("RUN_MIGRATIONS", true)?,
        })
    }
}
