//! SEC EDGAR HTTP client with rate limiting.

use crate::error::{DataError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Default rate limit: 10 requests per second (SEC requirement)
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// User agent for SEC EDGAR requests (SEC requires identifying information)
const USER_AGENT: &str = "quarry/0.1 (contact@example.com)";

/// Company information from the tickers endpoint.
/// The SEC returns: {"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}, ...}
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct CompanyInfo {
    /// CIK as a number (SEC returns this as an integer despite the name)
    cik_str: u64,
    /// Ticker symbol
    ticker: String,
    /// Company name
    title: String,
}

/// Rate limiter to ensure we don't exceed SEC's rate limits
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// Rate-limited SEC EDGAR client.
pub struct EdgarClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl EdgarClient {
    /// Create a new EDGAR client with default settings (10 req/sec).
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(DEFAULT_RATE_LIMIT)
    }

    /// Create a new EDGAR client with a custom rate limit.
    ///
    /// # Arguments
    /// * `min_interval` - Minimum duration between requests
    pub fn with_rate_limit(min_interval: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
        })
    }

    /// Fetch a URL and return the response body as text.
    ///
    /// Used for search pages, filing index pages, and the instance
    /// document itself.
    ///
    /// # Errors
    /// Returns `DataError::EdgarApi` on a non-success HTTP status and
    /// `DataError::Network` on transport failures.
    pub async fn get(&self, url: &str) -> Result<String> {
        self.rate_limiter.lock().await.wait().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(DataError::Network)?;

        if !response.status().is_success() {
            return Err(DataError::EdgarApi(format!(
                "Failed to fetch {}: HTTP {}",
                url,
                response.status()
            )));
        }

        response.text().await.map_err(DataError::Network)
    }

    /// Look up a company's CIK number from its ticker symbol.
    ///
    /// # Arguments
    /// * `ticker` - Stock ticker symbol (e.g., "AIG")
    ///
    /// # Returns
    /// The company's CIK number as a zero-padded 10-digit string
    ///
    /// # Errors
    /// Returns `DataError::CikNotFound` if the ticker is not found
    pub async fn get_company_cik(&self, ticker: &str) -> Result<String> {
        if ticker.is_empty() {
            return Err(DataError::InvalidSymbol("Empty ticker".to_string()));
        }

        let ticker_upper = ticker.to_uppercase();

        self.rate_limiter.lock().await.wait().await;

        let url = "https://www.sec.gov/files/company_tickers.json";
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(DataError::Network)?;

        if !response.status().is_success() {
            return Err(DataError::EdgarApi(format!(
                "Failed to fetch company tickers: HTTP {}",
                response.status()
            )));
        }

        // Parse as a map of index -> CompanyInfo
        let data: HashMap<String, CompanyInfo> = response
            .json()
            .await
            .map_err(|e| DataError::Parse(format!("Failed to parse company tickers: {}", e)))?;

        for company in data.values() {
            if company.ticker.to_uppercase() == ticker_upper {
                return Ok(pad_cik(&company.cik_str.to_string()));
            }
        }

        Err(DataError::CikNotFound(ticker.to_string()))
    }
}

/// Pad a CIK to 10 digits as required by SEC URLs.
pub fn pad_cik(cik: &str) -> String {
    format!("{:0>10}", cik)
}

impl std::fmt::Debug for EdgarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgarClient").finish_non_exhaustive()
    }
}
