use std::fmt;
use std::time::Duration;

use clap::ValueEnum;

/// Riot match-v5 endpoint (Americas routing).
pub const RIOT_MATCH_URL: &str = "https://americas.api.riotgames.com/lol/match/v5/matches";
/// OpenDota match endpoint.
pub const OPENDOTA_MATCH_URL: &str = "https://api.opendota.com/api/matches";

/// A remote match-history API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Provider {
    /// League of Legends via the Riot Games API
    Riot,
    /// Dota 2 via OpenDota
    #[value(name = "opendota")]
    OpenDota,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Riot => "riot",
            Provider::OpenDota => "opendota",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Riot => RIOT_MATCH_URL,
            Provider::OpenDota => OPENDOTA_MATCH_URL,
        }
    }

    /// Header carrying the API key, if the provider authenticates requests.
    pub fn auth_header(&self) -> Option<&'static str> {
        match self {
            Provider::Riot => Some("X-Riot-Token"),
            Provider::OpenDota => None,
        }
    }

    /// Whether an HTTP 429 is waited out and retried. Elsewhere it is a
    /// plain rejection.
    pub fn honours_retry_after(&self) -> bool {
        matches!(self, Provider::Riot)
    }

    /// Fixed pause after each match id, whatever its outcome.
    pub fn request_delay(&self) -> Duration {
        match self {
            Provider::Riot => Duration::from_millis(1200),
            Provider::OpenDota => Duration::from_millis(1000),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque match identifier. Riot uses strings like `NA1_4567890123`,
/// OpenDota plain integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchId(String);

impl MatchId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        MatchId(s.to_string())
    }
}

impl From<String> for MatchId {
    fn from(s: String) -> Self {
        MatchId(s)
    }
}

impl From<u64> for MatchId {
    fn from(n: u64) -> Self {
        MatchId(n.to_string())
    }
}

/// API keys read once at startup. `steam` is carried for completeness;
/// no fetch path uses it.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub riot: Option<String>,
    pub steam: Option<String>,
}

impl Credentials {
    pub fn key_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Riot => self.riot.as_deref(),
            Provider::OpenDota => None,
        }
    }

    /// Names of the keys that are not configured.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.riot.as_deref().map_or(true, str::is_empty) {
            missing.push("RIOT_API_KEY");
        }
        if self.steam.as_deref().map_or(true, str::is_empty) {
            missing.push("STEAM_API_KEY");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_delays() {
        assert_eq!(Provider::Riot.request_delay(), Duration::from_millis(1200));
        assert_eq!(Provider::OpenDota.request_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_only_riot_authenticates() {
        assert_eq!(Provider::Riot.auth_header(), Some("X-Riot-Token"));
        assert_eq!(Provider::OpenDota.auth_header(), None);

        let creds = Credentials {
            riot: Some("RGAPI-abc".into()),
            steam: Some("steam-key".into()),
        };
        assert_eq!(creds.key_for(Provider::Riot), Some("RGAPI-abc"));
        assert_eq!(creds.key_for(Provider::OpenDota), None);
    }

    #[test]
    fn test_only_riot_honours_429() {
        assert!(Provider::Riot.honours_retry_after());
        assert!(!Provider::OpenDota.honours_retry_after());
    }

    #[test]
    fn test_missing_keys() {
        assert_eq!(
            Credentials::default().missing(),
            vec!["RIOT_API_KEY", "STEAM_API_KEY"]
        );
        let creds = Credentials {
            riot: Some("RGAPI-abc".into()),
            steam: Some(String::new()),
        };
        assert_eq!(creds.missing(), vec!["STEAM_API_KEY"]);
    }

    #[test]
    fn test_match_id_from_integer_and_string() {
        assert_eq!(MatchId::from(7_654_321_u64).as_str(), "7654321");
        assert_eq!(MatchId::from("NA1_4567890123").to_string(), "NA1_4567890123");
    }

    #[test]
    fn test_provider_value_names() {
        assert_eq!(Provider::from_str("opendota", true), Ok(Provider::OpenDota));
        assert_eq!(Provider::from_str("riot", true), Ok(Provider::Riot));
    }
}
