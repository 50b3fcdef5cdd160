use crate::api::retry::{execute_with_timeout, retry_with_backoff, RetryPolicy};
use crate::api::shapes::{
    decode_identity, decode_traffic, first_match, top_level_keys, ShapeMatcher, IDENTITY_SHAPES,
    TRAFFIC_SHAPES,
};
use crate::config::ApiConfig;
use crate::errors::{AppError, AppResult, FetchError, FetchResult};
use crate::observer::{ReportEvent, ReportObserver};
use crate::types::{Identity, ReportPeriod, TrafficRecord};
use crate::utils::time::format_api_timestamp;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Header carrying the account API key
pub const API_KEY_HEADER: &str = "X-Smtp2go-Api-Key";

/// Lists the account's SMTP users
pub const SMTP_USERS_ENDPOINT: &str = "/users/smtp/view";

/// Email history, grouped by username for a date range
pub const EMAIL_HISTORY_ENDPOINT: &str = "/stats/email_history";

/// SMTP2GO API client
///
/// Both queries swallow failures into empty results: a missing identity list
/// or traffic list produces a zero-activity report rather than an aborted run.
pub struct Smtp2GoClient {
    http: reqwest::Client,
    config: ApiConfig,
    observer: Arc<dyn ReportObserver>,
}

impl Smtp2GoClient {
    pub fn new(config: ApiConfig, observer: Arc<dyn ReportObserver>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            observer,
        })
    }

    /// Retrieve all registered SMTP users
    pub async fn list_identities(&self) -> Vec<Identity> {
        let response = match self.post(SMTP_USERS_ENDPOINT, json!({})).await {
            Ok(response) => response,
            Err(error) => {
                self.observer.observe(ReportEvent::FetchFailed { error });
                return Vec::new();
            }
        };

        self.extract(SMTP_USERS_ENDPOINT, IDENTITY_SHAPES, &response)
            .iter()
            .filter_map(|entry| self.decode(SMTP_USERS_ENDPOINT, entry, decode_identity))
            .collect()
    }

    /// Retrieve per-username traffic counters for `period`
    pub async fn get_traffic(&self, period: &ReportPeriod) -> Vec<TrafficRecord> {
        let payload = json!({
            "group_by": "username",
            "start_date": format_api_timestamp(&period.start),
            "end_date": format_api_timestamp(&period.end),
        });

        let response = match self.post(EMAIL_HISTORY_ENDPOINT, payload).await {
            Ok(response) => response,
            Err(error) => {
                self.observer.observe(ReportEvent::FetchFailed { error });
                return Vec::new();
            }
        };

        self.extract(EMAIL_HISTORY_ENDPOINT, TRAFFIC_SHAPES, &response)
            .iter()
            .filter_map(|entry| self.decode(EMAIL_HISTORY_ENDPOINT, entry, decode_traffic))
            .collect()
    }

    /// POST `payload` to `endpoint` with retries
    async fn post(&self, endpoint: &str, payload: Value) -> FetchResult<Value> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let policy = RetryPolicy::from(&self.config);
        let url = url.as_str();
        let payload = &payload;

        retry_with_backoff(&policy, endpoint, self.observer.as_ref(), move || {
            self.send_once(endpoint, url, payload)
        })
        .await
    }

    async fn send_once(&self, endpoint: &str, url: &str, payload: &Value) -> FetchResult<Value> {
        self.observer.observe(ReportEvent::RequestStarted {
            endpoint: endpoint.to_string(),
        });
        debug!("API payload for {}: {}", endpoint, payload);

        execute_with_timeout(self.config.timeout_seconds, endpoint, async {
            let response = self
                .http
                .post(url)
                .header(API_KEY_HEADER, self.config.api_key.as_str())
                .json(payload)
                .send()
                .await
                .map_err(|e| FetchError::Transport {
                    endpoint: endpoint.to_string(),
                    message: e.to_string(),
                })?;

            let status = response.status();
            self.observer.observe(ReportEvent::ResponseReceived {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });

            let body = response.text().await.map_err(|e| FetchError::Transport {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

            if !status.is_success() {
                debug!("Response text from {}: {}", endpoint, body);
                return Err(FetchError::Status {
                    endpoint: endpoint.to_string(),
                    status: status.as_u16(),
                });
            }

            serde_json::from_str::<Value>(&body).map_err(|e| FetchError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })
        })
        .await
    }

    /// Apply the shape matchers; an unrecognised envelope yields no records
    fn extract<'a>(
        &self,
        endpoint: &str,
        shapes: &[ShapeMatcher],
        response: &'a Value,
    ) -> &'a [Value] {
        match first_match(shapes, response) {
            Some((shape, records)) => {
                self.observer.observe(ReportEvent::ShapeMatched {
                    endpoint: endpoint.to_string(),
                    shape,
                    records: records.len(),
                });
                records.as_slice()
            }
            None => {
                self.observer.observe(ReportEvent::ShapeUnmatched {
                    endpoint: endpoint.to_string(),
                    keys: top_level_keys(response),
                });
                &[]
            }
        }
    }

    fn decode<T>(
        &self,
        endpoint: &str,
        entry: &Value,
        decoder: fn(&Value) -> Result<T, String>,
    ) -> Option<T> {
        match decoder(entry) {
            Ok(record) => Some(record),
            Err(reason) => {
                self.observer.observe(ReportEvent::RecordSkipped {
                    endpoint: endpoint.to_string(),
                    reason,
                });
                None
            }
        }
    }
}
