//! Command-line configuration

use std::path::PathBuf;

use clap::{Args, Parser};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Storefront checkout configuration
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Price a storefront cart and print a receipt", long_about = None)]
pub struct StorefrontConfig {
    /// Directory containing `products/`, `coupons/` and `carts/` fixture files
    #[arg(short, long, env = "STOREFRONT_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Fixture set name
    #[arg(short, long, env = "STOREFRONT_SET", default_value = "default")]
    pub set: String,

    /// Coupon code to apply
    #[arg(short, long, env = "STOREFRONT_COUPON")]
    pub coupon: Option<String>,

    /// Complete the order after printing the receipt
    #[arg(long)]
    pub checkout: bool,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
