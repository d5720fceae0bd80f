use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::RemoteTask;
use crate::Config;

pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com/todos";

/// Every way a fetch can fail. The UI shows one message whatever the cause.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Could not connect to the task API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Task API answered with HTTP {0}")]
    Status(u16),
    #[error("Task API returned an unexpected payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub use_system_proxy: bool,
}

impl RemoteFetcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            use_system_proxy: true,
        }
    }

    pub fn without_proxy(mut self) -> Self {
        self.use_system_proxy = false;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.api_url.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            read_timeout: Duration::from_secs(config.read_timeout_secs),
            use_system_proxy: config.use_system_proxy,
        }
    }

    /// Single GET against the endpoint. No retry, no partial result.
    pub fn fetch_all(&self) -> Result<Vec<RemoteTask>, FetchError> {
        let mut builder = reqwest::blocking::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.read_timeout);
        if !self.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        let response = client.get(&self.endpoint).send()?;
        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, status = status.as_u16(), "remote fetch rejected");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text()?;
        let tasks = parse_remote_tasks(&body)?;
        info!(endpoint = %self.endpoint, count = tasks.len(), "fetched remote tasks");
        Ok(tasks)
    }

    /// Run `fetch_all` on a background thread; the outcome arrives on the returned channel
    pub fn spawn_fetch(&self, generation: u64) -> Receiver<FetchOutcome> {
        let (tx, rx) = mpsc::channel();
        let fetcher = self.clone();
        thread::spawn(move || {
            let result = fetcher.fetch_all();
            if let Err(ref e) = result {
                warn!(generation, error = %e, "remote fetch failed");
            }
            // receiver gone means the screen was left
            let _ = tx.send(FetchOutcome { generation, result });
        });
        rx
    }
}

/// Decode the API's JSON array. Any malformed element fails the whole payload.
pub fn parse_remote_tasks(body: &str) -> Result<Vec<RemoteTask>, FetchError> {
    Ok(serde_json::from_str(body)?)
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub result: Result<Vec<RemoteTask>, FetchError>,
}

/// Request-generation counter. Outcomes from older generations are dropped.
#[derive(Debug, Default)]
pub struct FetchTracker {
    current: u64,
    in_flight: bool,
}

impl FetchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request and return its generation
    pub fn begin(&mut self) -> u64 {
        self.current += 1;
        self.in_flight = true;
        self.current
    }

    /// Invalidate whatever is in flight
    pub fn cancel(&mut self) {
        self.current += 1;
        self.in_flight = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn accept(&mut self, outcome: FetchOutcome) -> Option<Result<Vec<RemoteTask>, FetchError>> {
        if self.in_flight && outcome.generation == self.current {
            self.in_flight = false;
            Some(outcome.result)
        } else {
            info!(generation = outcome.generation, current = self.current, "discarding stale fetch result");
            None
        }
    }
}
