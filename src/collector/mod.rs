pub mod provider;
pub mod retry;
pub mod transport;

pub use provider::{Credentials, MatchId, Provider, OPENDOTA_MATCH_URL, RIOT_MATCH_URL};
pub use transport::{HttpReply, HttpTransport, MatchTransport, TransportError};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::storage::{Storage, StorageError, Tier};
use retry::{backoff_delay, jitter, parse_retry_after, MAX_ATTEMPTS};

/// One match as returned by a provider. Shape is provider-specific and
/// left unchecked here.
pub type MatchRecord = Value;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("invalid base URL for {provider}: {url}")]
    InvalidBaseUrl { provider: Provider, url: String },
}

/// Everything the collector needs, resolved up front.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub credentials: Credentials,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    /// Overrides for the provider match endpoints
    pub base_urls: HashMap<Provider, String>,
}

impl CollectorConfig {
    pub fn new(credentials: Credentials) -> Self {
        CollectorConfig {
            credentials,
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            base_urls: HashMap::new(),
        }
    }

    pub fn base_url(&self, provider: Provider) -> &str {
        self.base_urls
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_else(|| provider.default_base_url())
    }
}

/// How a single match id ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Fetched { attempts: u32 },
    /// Non-retryable response; no further attempts were made.
    Abandoned { status: u16, attempts: u32 },
    /// Every attempt was used up by transient failures or rate limiting.
    Exhausted { attempts: u32 },
}

impl MatchOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            MatchOutcome::Fetched { attempts }
            | MatchOutcome::Abandoned { attempts, .. }
            | MatchOutcome::Exhausted { attempts } => *attempts,
        }
    }
}

/// Records in input order, plus what happened to each id.
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    pub records: Vec<MatchRecord>,
    pub outcomes: Vec<(MatchId, MatchOutcome)>,
}

impl FetchResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn abandoned(&self) -> impl Iterator<Item = &MatchId> {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, MatchOutcome::Abandoned { .. }))
            .map(|(id, _)| id)
    }
}

/// Result of a single attempt.
enum Attempt {
    Fetched(MatchRecord),
    RateLimited(std::time::Duration),
    Rejected { status: u16 },
    NetworkFailure,
}

/// Sequential, rate-limit-aware match fetcher with local JSON storage.
pub struct Collector {
    transport: Arc<dyn MatchTransport>,
    credentials: Credentials,
    base_urls: HashMap<Provider, String>,
    storage: Storage,
}

impl Collector {
    /// Build a collector over HTTP. Creates both storage roots.
    pub fn new(config: CollectorConfig) -> Result<Self, CollectorError> {
        let transport = HttpTransport::new()?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: CollectorConfig,
        transport: Arc<dyn MatchTransport>,
    ) -> Result<Self, CollectorError> {
        for key in config.credentials.missing() {
            warn!("{} not found in environment; requests needing it will be unauthenticated", key);
        }

        let mut base_urls = HashMap::new();
        for provider in [Provider::Riot, Provider::OpenDota] {
            let url = config.base_url(provider).trim_end_matches('/').to_string();
            if Url::parse(&url).is_err() {
                return Err(CollectorError::InvalidBaseUrl { provider, url });
            }
            base_urls.insert(provider, url);
        }

        let storage = Storage::open(config.raw_dir.clone(), config.processed_dir.clone())?;

        Ok(Collector {
            transport,
            credentials: config.credentials,
            base_urls,
            storage,
        })
    }

    fn match_url(&self, provider: Provider, id: &MatchId) -> String {
        let base = self
            .base_urls
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_else(|| provider.default_base_url());
        format!("{}/{}", base, id)
    }

    fn headers(&self, provider: Provider) -> Vec<(&'static str, String)> {
        match (provider.auth_header(), self.credentials.key_for(provider)) {
            (Some(name), Some(key)) => vec![(name, key.to_string())],
            _ => Vec::new(),
        }
    }

    /// Fetch every id in order, one request at a time. Individual failures
    /// are logged and skipped; this never fails as a whole.
    pub async fn fetch_batch<I>(&self, match_ids: I, provider: Provider) -> FetchResult
    where
        I: IntoIterator,
        I::Item: Into<MatchId>,
    {
        let mut result = FetchResult::default();

        for id in match_ids.into_iter().map(Into::into) {
            let (record, outcome) = self.fetch_one(&id, provider).await;
            if let Some(record) = record {
                result.records.push(record);
            }
            result.outcomes.push((id, outcome));
            tokio::time::sleep(provider.request_delay()).await;
        }

        info!(
            "Fetched {}/{} {} matches",
            result.records.len(),
            result.outcomes.len(),
            provider
        );
        result
    }

    async fn fetch_one(&self, id: &MatchId, provider: Provider) -> (Option<MatchRecord>, MatchOutcome) {
        let url = self.match_url(provider, id);
        let headers = self.headers(provider);

        for attempt in 0..MAX_ATTEMPTS {
            let attempts = attempt + 1;
            match self.attempt(&url, &headers, id, provider).await {
                Attempt::Fetched(record) => {
                    return (Some(record), MatchOutcome::Fetched { attempts });
                }
                Attempt::Rejected { status } => {
                    return (None, MatchOutcome::Abandoned { status, attempts });
                }
                Attempt::RateLimited(wait) => {
                    warn!("Rate limited on {}. Waiting {}s...", id, wait.as_secs());
                    tokio::time::sleep(wait).await;
                }
                Attempt::NetworkFailure => {
                    if attempts < MAX_ATTEMPTS {
                        tokio::time::sleep(backoff_delay(attempt, jitter())).await;
                    }
                }
            }
        }

        warn!("Giving up on match {} after {} attempts", id, MAX_ATTEMPTS);
        (None, MatchOutcome::Exhausted { attempts: MAX_ATTEMPTS })
    }

    async fn attempt(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        id: &MatchId,
        provider: Provider,
    ) -> Attempt {
        let reply = match self.transport.get(url, headers).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error fetching match {}: {}", id, e);
                return Attempt::NetworkFailure;
            }
        };

        match reply.status {
            200 => match serde_json::from_str(&reply.body) {
                Ok(record) => Attempt::Fetched(record),
                Err(e) => {
                    error!("Match {} returned unparseable body: {}", id, e);
                    Attempt::NetworkFailure
                }
            },
            429 if provider.honours_retry_after() => {
                Attempt::RateLimited(parse_retry_after(reply.retry_after.as_deref()))
            }
            status => {
                error!("Error {} for match {}: {}", status, id, reply.body);
                Attempt::Rejected { status }
            }
        }
    }

    /// Serialize `data` to `name` under the `tier` root. Overwrites.
    pub fn persist<T: Serialize + ?Sized>(
        &self,
        data: &T,
        name: &str,
        tier: Tier,
        pretty: bool,
    ) -> Result<PathBuf, CollectorError> {
        Ok(self.storage.persist(data, name, tier, pretty)?)
    }

    pub fn load<T: DeserializeOwned>(&self, name: &str, tier: Tier) -> Result<T, CollectorError> {
        Ok(self.storage.load(name, tier)?)
    }
}

/// Empty demo scaffold for smoke-testing the storage path.
pub fn sample_dataset() -> Value {
    json!({
        "matches": [],
        "players": [],
        "teams": []
    })
}
