//! HTTP access to the nightly build system.

use std::time::Duration;

use tracing::{debug, instrument};

use nightly_checker::{BuildSource, BuildSummary, CheckerError, Config, Result};

/// Default timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for constructing a [`NightlyClient`].
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use nightly_client::{ClientOptions, NightlyClient};
///
/// # fn example() -> nightly_checker::Result<()> {
/// let options = ClientOptions::new(
///     "https://lhcb-nightlies.web.cern.ch/nightly/",
///     "https://lhcb-nightlies.web.cern.ch/api/v1/nightly",
/// )
/// .with_timeout(Duration::from_secs(10));
/// let client = NightlyClient::new(options)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// URL of the index page listing `slot/id/` entries.
    pub main_page: String,
    /// Base URL for per-build summary documents.
    pub api_page: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientOptions {
    /// Creates options pointing at the given index and API pages.
    #[must_use]
    pub fn new(main_page: impl Into<String>, api_page: impl Into<String>) -> Self {
        Self {
            main_page: main_page.into(),
            api_page: api_page.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates options from a checker configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.main_page, &config.api_page)
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP implementation of [`BuildSource`].
///
/// Request failures are reported as transient fetch errors, which degrade
/// the affected (slot, date) pair instead of aborting the run. A response
/// that cannot be decoded as a summary document is reported as malformed,
/// so the resolver walks past that build.
#[derive(Debug, Clone)]
pub struct NightlyClient {
    http: reqwest::Client,
    main_page: String,
    api_page: String,
}

impl NightlyClient {
    /// Creates a client from the given options.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be constructed, which
    /// indicates a broken TLS or system configuration.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| {
                CheckerError::config_validation(
                    format!("failed to construct HTTP client: {e}"),
                    "check the system TLS configuration",
                )
            })?;
        debug!(
            main_page = %options.main_page,
            api_page = %options.api_page,
            "nightly client ready"
        );
        Ok(Self {
            http,
            main_page: options.main_page,
            api_page: options.api_page,
        })
    }

    /// Returns the URL of the summary document for one (slot, build id).
    #[must_use]
    pub fn summary_url(&self, slot: &str, build_id: u64) -> String {
        format!(
            "{}/{slot}/{build_id}/summary",
            self.api_page.trim_end_matches('/')
        )
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CheckerError::transient_fetch(url, e.to_string()))?;
        response
            .error_for_status()
            .map_err(|e| CheckerError::transient_fetch(url, e.to_string()))
    }
}

impl BuildSource for NightlyClient {
    #[instrument(skip(self))]
    async fn fetch_index(&self) -> Result<String> {
        let url = self.main_page.clone();
        let body = self
            .get(&url)
            .await?
            .text()
            .await
            .map_err(|e| CheckerError::transient_fetch(&url, e.to_string()))?;
        debug!(url, bytes = body.len(), "fetched index page");
        Ok(body)
    }

    #[instrument(skip(self))]
    async fn fetch_summary(&self, slot: &str, build_id: u64) -> Result<BuildSummary> {
        let url = self.summary_url(slot, build_id);
        let summary = self
            .get(&url)
            .await?
            .json::<BuildSummary>()
            .await
            .map_err(|e| CheckerError::malformed_summary(slot, build_id, e.to_string()))?;
        debug!(url, "fetched build summary");
        Ok(summary)
    }
}
