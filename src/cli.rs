use clap::Parser;

use crate::config::{AppConfig, DataSource};
use crate::service::RequestStatus;

/// Browse payment requests from a GraphQL backend, declined ones by default.
#[derive(Parser, Debug)]
#[command(name = "declined-payments", version)]
pub struct Cli {
    /// Use generated mock data instead of a backend
    #[arg(long)]
    pub mock: bool,

    /// GraphQL endpoint URL
    #[arg(long, env = "DECLINED_ENDPOINT")]
    pub endpoint: Option<String>,

    /// API key sent as x-api-key
    #[arg(long, env = "DECLINED_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Records requested per page (1-100)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Status the server filters on
    #[arg(long)]
    pub status: Option<RequestStatus>,

    /// Print the table to stdout instead of opening the TUI
    #[arg(long)]
    pub dump: bool,

    /// Maximum pages to follow in --dump mode (at least 1)
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_pages: u64,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Layers command-line values over the stored config.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
            config.source = DataSource::Graphql;
        }
        if let Some(key) = &self.api_key {
            config.api_key = key.clone();
        }
        if self.mock {
            config.source = DataSource::Mock;
        }
        if let Some(size) = self.page_size {
            config.page_size = size;
        }
        if let Some(status) = self.status {
            config.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_switches_to_graphql() {
        let cli = Cli::parse_from([
            "declined-payments",
            "--endpoint",
            "https://api.example.com/graphql",
            "--api-key",
            "k",
        ]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.source, DataSource::Graphql);
        assert!(config.is_complete());
    }

    #[test]
    fn test_mock_wins_over_endpoint() {
        let cli = Cli::parse_from(["declined-payments", "--endpoint", "https://x", "--mock"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.source, DataSource::Mock);
    }

    #[test]
    fn test_status_and_page_size() {
        let cli = Cli::parse_from(["declined-payments", "--status", "accepted", "--page-size", "50"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.status, RequestStatus::Accepted);
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_bad_status_rejected() {
        assert!(Cli::try_parse_from(["declined-payments", "--status", "lost"]).is_err());
    }

    #[test]
    fn test_max_pages_must_be_positive() {
        assert!(Cli::try_parse_from(["declined-payments", "--dump", "--max-pages", "0"]).is_err());
        let cli = Cli::parse_from(["declined-payments", "--dump", "--max-pages", "1"]);
        assert_eq!(cli.max_pages, 1);
        assert_eq!(Cli::parse_from(["declined-payments"]).max_pages, 5);
    }
}
