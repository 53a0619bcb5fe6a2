use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::voting::ReputationPoints;

/// Configuration for the Asklet service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskletConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Reputation weights
    pub reputation: ReputationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Rate limit per minute per IP
    pub rate_limit_per_minute: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub postgres_url: String,
    /// Enable PostgreSQL (if false, uses in-memory storage only)
    pub postgres_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    pub level: String,
}

/// Reputation weights applied by votes and answer acceptance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Points per question vote, applied to the question author
    pub question_vote: i64,
    /// Points per answer vote, applied to the answer author
    pub answer_vote: i64,
    /// Points refunded when a voter switches sides
    pub vote_refund: i64,
    /// Points awarded to an answer author on acceptance
    pub accept_bonus: i64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            question_vote: 5,
            answer_vote: 10,
            vote_refund: 2,
            accept_bonus: 15,
        }
    }
}

impl ReputationConfig {
    /// Convert to ReputationPoints for use by the vote and acceptance services
    pub fn to_points(&self) -> ReputationPoints {
        ReputationPoints {
            question_vote: self.question_vote,
            answer_vote: self.answer_vote,
            vote_refund: self.vote_refund,
            accept_bonus: self.accept_bonus,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            postgres_url: "postgresql://localhost:5432/asklet".to_string(),
            postgres_enabled: false,
        }
    }
}

impl Default for AskletConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            security: SecurityConfig {
                rate_limit_per_minute: 120,
            },
            database: DatabaseConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            reputation: ReputationConfig::default(),
        }
    }
}

impl AskletConfig {
    /// Load configuration from environment variables and validate it
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var("ASKLET_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = env::var("ASKLET_PORT") {
            config.server.port = port.parse().context("Invalid ASKLET_PORT value")?;
        }

        if let Ok(rate_limit) = env::var("ASKLET_RATE_LIMIT_PER_MINUTE") {
            config.security.rate_limit_per_minute = rate_limit
                .parse()
                .context("Invalid ASKLET_RATE_LIMIT_PER_MINUTE value")?;
        }

        if let Ok(url) = env::var("ASKLET_POSTGRES_URL") {
            config.database.postgres_url = url;
        }

        if let Ok(enabled) = env::var("ASKLET_POSTGRES_ENABLED") {
            config.database.postgres_enabled = enabled
                .parse()
                .context("Invalid ASKLET_POSTGRES_ENABLED value")?;
        }

        if let Ok(log_level) = env::var("ASKLET_LOG_LEVEL") {
            config.logging.level = log_level;
        }

        if let Ok(points) = env::var("ASKLET_REPUTATION_QUESTION_VOTE") {
            config.reputation.question_vote = points
                .parse()
                .context("Invalid ASKLET_REPUTATION_QUESTION_VOTE value")?;
        }

        if let Ok(points) = env::var("ASKLET_REPUTATION_ANSWER_VOTE") {
            config.reputation.answer_vote = points
                .parse()
                .context("Invalid ASKLET_REPUTATION_ANSWER_VOTE value")?;
        }

        if let Ok(points) = env::var("ASKLET_REPUTATION_VOTE_REFUND") {
            config.reputation.vote_refund = points
                .parse()
                .context("Invalid ASKLET_REPUTATION_VOTE_REFUND value")?;
        }

        if let Ok(points) = env::var("ASKLET_REPUTATION_ACCEPT_BONUS") {
            config.reputation.accept_bonus = points
                .parse()
                .context("Invalid ASKLET_REPUTATION_ACCEPT_BONUS value")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for consistency
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be non-zero"));
        }

        if self.security.rate_limit_per_minute == 0 {
            return Err(anyhow::anyhow!("Rate limit must be non-zero"));
        }

        if self.database.postgres_enabled && self.database.postgres_url.is_empty() {
            return Err(anyhow::anyhow!(
                "PostgreSQL is enabled but no connection string is configured"
            ));
        }

        if self.reputation.vote_refund < 0 {
            return Err(anyhow::anyhow!("Vote refund cannot be negative"));
        }

        Ok(())
    }
}
