use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::collector::{CollectorConfig, Credentials, Provider, RIOT_MATCH_URL, OPENDOTA_MATCH_URL};
use crate::storage::Tier;

/// Collect League of Legends and Dota 2 match records for analysis
#[derive(Parser, Debug, Clone)]
#[command(name = "esports-collector", version, about)]
pub struct Config {
    /// Riot Games API key (sent as X-Riot-Token)
    #[arg(long, env = "RIOT_API_KEY", hide_env_values = true)]
    pub riot_api_key: Option<String>,

    /// Steam Web API key (checked at startup, not used for fetching)
    #[arg(long, env = "STEAM_API_KEY", hide_env_values = true)]
    pub steam_api_key: Option<String>,

    /// Directory for raw match records
    #[arg(long, env = "RAW_DATA_DIR", default_value = "data/raw")]
    pub raw_dir: PathBuf,

    /// Directory for processed tables
    #[arg(long, env = "PROCESSED_DATA_DIR", default_value = "data/processed")]
    pub processed_dir: PathBuf,

    /// Riot match-v5 endpoint
    #[arg(long, env = "RIOT_MATCH_URL", default_value = RIOT_MATCH_URL)]
    pub riot_match_url: String,

    /// OpenDota match endpoint
    #[arg(long, env = "OPENDOTA_MATCH_URL", default_value = OPENDOTA_MATCH_URL)]
    pub opendota_match_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch a batch of matches and save them as JSON
    Fetch {
        /// Match API to query
        #[arg(long, value_enum)]
        provider: Provider,

        /// File name under the storage root
        #[arg(long, short)]
        output: String,

        /// Storage root to write into
        #[arg(long, value_enum, default_value = "raw")]
        tier: Tier,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,

        /// Match ids, fetched in the order given
        #[arg(required = true)]
        match_ids: Vec<String>,
    },

    /// Write the empty sample dataset
    Sample {
        #[arg(long, short, default_value = "sample.json")]
        output: String,

        #[arg(long)]
        pretty: bool,
    },
}

impl Config {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            riot: non_empty(&self.riot_api_key),
            steam: non_empty(&self.steam_api_key),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.raw_dir == self.processed_dir {
            anyhow::bail!("raw and processed directories must differ");
        }
        Ok(())
    }

    pub fn collector_config(&self) -> CollectorConfig {
        let mut base_urls = HashMap::new();
        base_urls.insert(Provider::Riot, self.riot_match_url.clone());
        base_urls.insert(Provider::OpenDota, self.opendota_match_url.clone());
        CollectorConfig {
            credentials: self.credentials(),
            raw_dir: self.raw_dir.clone(),
            processed_dir: self.processed_dir.clone(),
            base_urls,
        }
    }
}

fn non_empty(key: &Option<String>) -> Option<String> {
    key.as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["esports-collector"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_fetch_command() {
        let config = parse(&[
            "--riot-api-key",
            "RGAPI-abc",
            "fetch",
            "--provider",
            "riot",
            "--output",
            "lol.json",
            "NA1_1",
            "NA1_2",
        ]);
        match config.command {
            Command::Fetch {
                provider,
                ref output,
                tier,
                pretty,
                ref match_ids,
            } => {
                assert_eq!(provider, Provider::Riot);
                assert_eq!(output, "lol.json");
                assert_eq!(tier, Tier::Raw);
                assert!(!pretty);
                assert_eq!(match_ids, &vec!["NA1_1".to_string(), "NA1_2".to_string()]);
            }
            _ => panic!("expected fetch"),
        }
        assert_eq!(config.credentials().riot.as_deref(), Some("RGAPI-abc"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fetch_requires_ids() {
        let res = Config::try_parse_from([
            "esports-collector",
            "fetch",
            "--provider",
            "opendota",
            "--output",
            "d.json",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_sample_defaults() {
        let config = parse(&["--raw-dir", "/tmp/r", "--processed-dir", "/tmp/p", "sample"]);
        match config.command {
            Command::Sample { ref output, pretty } => {
                assert_eq!(output, "sample.json");
                assert!(!pretty);
            }
            _ => panic!("expected sample"),
        }
        let cc = config.collector_config();
        assert_eq!(cc.raw_dir, PathBuf::from("/tmp/r"));
        assert_eq!(cc.processed_dir, PathBuf::from("/tmp/p"));
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = parse(&["--riot-api-key", "  ", "--steam-api-key", "", "sample"]);
        let creds = config.credentials();
        assert!(creds.riot.is_none());
        assert!(creds.steam.is_none());
    }

    #[test]
    fn test_missing_riot_key_is_not_a_config_error() {
        let config = parse(&["fetch", "--provider", "riot", "-o", "lol.json", "NA1_1"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_same_dirs_rejected() {
        let config = parse(&["--raw-dir", "data", "--processed-dir", "data", "sample"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_overrides() {
        let config = parse(&["--opendota-match-url", "http://localhost:8080/matches", "sample"]);
        let cc = config.collector_config();
        assert_eq!(cc.base_url(Provider::OpenDota), "http://localhost:8080/matches");
    }
}
