//! Rhyme lookup: normalize a word, fetch its page, keep the candidates that look like words.
//!
//! A [RhymeFetcher] holds no state between calls. Each lookup opens its own
//! session through a [Connector] and closes it before returning. Results echo
//! the query word so a caller juggling overlapping lookups can drop stale ones.

use std::future::Future;
use std::time::{Duration, Instant};

use serde::Serialize;
use url::Url;

use crate::markup::{RhymeMarkup, RifmeMarkup};
use crate::transport::{Connector, HttpConnector, Session};

pub const DEFAULT_BASE_URL: &str = "https://rifme.net/r/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; Rifmo/",
    env!("CARGO_PKG_VERSION"),
    "; rhyme lookup)"
);
pub const DEFAULT_LIMIT: usize = 100;

/// Everything a fetcher needs to reach the lookup service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// The encoded word is appended to this as the last path segment.
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
    /// Used by [RhymeFetcher::fetch_default].
    pub default_limit: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default URL is valid"),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_limit: DEFAULT_LIMIT,
        }
    }
}

/// Candidates for one query, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rhymes {
    /// The word exactly as the caller passed it.
    pub query: String,
    pub words: Vec<String>,
}

impl Rhymes {
    fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            words: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }
}

pub struct RhymeFetcher<C = HttpConnector, M = RifmeMarkup> {
    config: FetcherConfig,
    connector: C,
    markup: M,
}

impl RhymeFetcher {
    /// Fetcher over HTTP, reading rifme.net-style pages.
    pub fn new(config: FetcherConfig) -> Self {
        Self::with_parts(config, HttpConnector, RifmeMarkup::default())
    }
}

impl<C: Connector, M: RhymeMarkup> RhymeFetcher<C, M> {
    pub fn with_parts(config: FetcherConfig, connector: C, markup: M) -> Self {
        Self {
            config,
            connector,
            markup,
        }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Look up rhymes for `word`, at most `limit` of them.
    ///
    /// A blank word is not an error: it yields no rhymes and makes no request.
    pub async fn lookup(&self, word: &str, limit: usize) -> Result<Rhymes, LookupError> {
        self.lookup_until(word, limit, std::future::pending()).await
    }

    /// Like [Self::lookup], but gives up with [LookupError::Cancelled] once `cancel` resolves.
    pub async fn lookup_until<F>(
        &self,
        word: &str,
        limit: usize,
        cancel: F,
    ) -> Result<Rhymes, LookupError>
    where
        F: Future<Output = ()>,
    {
        if limit == 0 {
            return Err(LookupError::InvalidLimit);
        }
        let query = word.trim();
        if query.is_empty() {
            return Ok(Rhymes::empty(word));
        }

        let started = Instant::now();
        let host = self.config.base_url.host_str().unwrap_or_default();
        match self.run(query, limit, cancel).await {
            Ok(words) => {
                tracing::debug!(
                    host,
                    found = words.len(),
                    elapsed_ms = elapsed_ms(started),
                    "rhyme lookup done"
                );
                Ok(Rhymes {
                    query: word.to_string(),
                    words,
                })
            }
            Err(e) => {
                let elapsed_ms = elapsed_ms(started);
                if e == LookupError::Cancelled {
                    tracing::debug!(host, elapsed_ms, "rhyme lookup cancelled");
                } else {
                    tracing::warn!(kind = e.kind(), host, elapsed_ms, error = %e, "rhyme lookup failed");
                }
                Err(e)
            }
        }
    }

    /// Rhymes for `word`, or nothing if the lookup failed for any reason.
    pub async fn fetch_rhymes(&self, word: &str, limit: usize) -> Vec<String> {
        self.lookup(word, limit)
            .await
            .map(|r| r.words)
            .unwrap_or_default()
    }

    /// [Self::fetch_rhymes] with the configured default limit.
    pub async fn fetch_default(&self, word: &str) -> Vec<String> {
        self.fetch_rhymes(word, self.config.default_limit).await
    }

    async fn run<F>(&self, query: &str, limit: usize, cancel: F) -> Result<Vec<String>, LookupError>
    where
        F: Future<Output = ()>,
    {
        let url = request_url(&self.config.base_url, query)?;
        let session = self.connector.connect(&self.config)?;
        tracing::debug!(%url, "requesting rhymes");
        let page = tokio::select! {
            res = session.get_text(&url) => res,
            _ = cancel => Err(LookupError::Cancelled),
        };
        session.close();
        Ok(collect_rhymes(&self.markup, &page?, query, limit))
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Lower-cases `query` and appends it to `base` as one percent-encoded path segment.
pub fn request_url(base: &Url, query: &str) -> Result<Url, LookupError> {
    let word = query.to_lowercase();
    // `.` and `..` would be resolved away instead of sent.
    if word == "." || word == ".." {
        return Err(LookupError::Encode(word));
    }
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| LookupError::Encode(base.to_string()))?
        .pop_if_empty()
        .push(&word);
    Ok(url)
}

/// Exact candidates first, then looser ones if there is room left.
fn collect_rhymes<M: RhymeMarkup>(markup: &M, html: &str, query: &str, limit: usize) -> Vec<String> {
    let mut words = Vec::new();
    admit(&mut words, markup.exact(html), query, limit);
    if words.len() < limit {
        admit(&mut words, markup.looser(html), query, limit);
    }
    words
}

fn admit(words: &mut Vec<String>, raw: Vec<String>, query: &str, limit: usize) {
    for value in raw {
        if words.len() >= limit {
            break;
        }
        let candidate = value.trim();
        if is_valid_rhyme(candidate, query) {
            words.push(candidate.to_string());
        }
    }
}

/// A usable candidate: one word of letters, hyphens and apostrophes, not a URL, not the query itself.
pub fn is_valid_rhyme(candidate: &str, query: &str) -> bool {
    !candidate.is_empty()
        && candidate != query
        && !candidate.contains("://")
        && candidate
            .chars()
            .all(|c| c.is_alphabetic() || c == '-' || c == '\'')
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("limit must be positive")]
    InvalidLimit,
    #[error("cannot build lookup URL for {0:?}")]
    Encode(String),
    #[error("failed to set up HTTP client: {0}")]
    Client(String),
    #[error("rhyme lookup timed out")]
    Timeout,
    #[error("could not connect to rhyme service: {0}")]
    Connect(String),
    #[error("rhyme request failed: {0}")]
    Request(String),
    #[error("rhyme service answered with HTTP {0}")]
    Status(u16),
    #[error("could not read rhyme page: {0}")]
    Body(String),
    #[error("lookup cancelled")]
    Cancelled,
}

impl LookupError {
    /// Short stable name, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::InvalidLimit => "invalid_limit",
            LookupError::Encode(_) => "encode",
            LookupError::Client(_) => "client",
            LookupError::Timeout => "timeout",
            LookupError::Connect(_) => "connect",
            LookupError::Request(_) => "request",
            LookupError::Status(_) => "status",
            LookupError::Body(_) => "body",
            LookupError::Cancelled => "cancelled",
        }
    }
}
