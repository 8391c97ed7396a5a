use clap::{Parser, ValueEnum};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, compact lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "brewery_bot", about = "Conversational beer ordering bot (console transport)")]
pub struct Config {
    /// sqlx connection string of the catalog and order database.
    #[arg(long, env = "BREWERY_DATABASE_URL", default_value = "sqlite://brewery.db?mode=rwc")]
    pub database_url: String,

    /// Seconds between catalog refreshes.
    #[arg(long, env = "BREWERY_REFRESH_INTERVAL_SECS", default_value_t = 300)]
    pub refresh_interval_secs: u64,

    /// Deadline for one catalog fetch.
    #[arg(long, env = "BREWERY_REFRESH_TIMEOUT_SECS", default_value_t = 10)]
    pub refresh_timeout_secs: u64,

    /// Deadline for one order submission.
    #[arg(long, env = "BREWERY_SUBMIT_TIMEOUT_SECS", default_value_t = 10)]
    pub submit_timeout_secs: u64,

    /// Idle seconds after which a conversation lane task is stopped.
    #[arg(long, env = "BREWERY_LANE_IDLE_SECS", default_value_t = 600)]
    pub lane_idle_secs: u64,

    /// Mailbox capacity of each cart actor and conversation lane.
    #[arg(long, env = "BREWERY_MAILBOX_SIZE", default_value_t = 32)]
    pub mailbox_size: usize,

    #[arg(long, env = "BREWERY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Insert a small demo catalog when the beers table is empty.
    #[arg(long)]
    pub seed_demo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub refresh_interval: Duration,
    pub refresh_timeout: Duration,
    pub submit_timeout: Duration,
    pub lane_idle: Duration,
}

/// Everything `ShopSystem::start` needs besides its collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopSettings {
    pub timeouts: Timeouts,
    pub mailbox_size: usize,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            timeouts: Timeouts {
                refresh_interval: Duration::from_secs(300),
                refresh_timeout: Duration::from_secs(10),
                submit_timeout: Duration::from_secs(10),
                lane_idle: Duration::from_secs(600),
            },
            mailbox_size: 32,
        }
    }
}

impl Config {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            refresh_interval: Duration::from_secs(self.refresh_interval_secs),
            refresh_timeout: Duration::from_secs(self.refresh_timeout_secs),
            submit_timeout: Duration::from_secs(self.submit_timeout_secs),
            lane_idle: Duration::from_secs(self.lane_idle_secs.max(1)),
        }
    }

    pub fn settings(&self) -> ShopSettings {
        ShopSettings { timeouts: self.timeouts(), mailbox_size: self.mailbox_size.max(1) }
    }
}
