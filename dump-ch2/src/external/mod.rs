//! Clients for the Mirakurun/mirakc and EPGStation HTTP APIs.

pub mod epgstation;
pub mod mirakurun;

use std::future::Future;

use log::debug;
use reqwest::header::HeaderMap;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::config::ConfigError;
use crate::error::{DumpError, Result};

pub use epgstation::{EpgStationChannel, EpgStationClient, EpgStationProgram, EpgStationSchedule};
pub use mirakurun::{MirakurunClient, MirakurunService};

/// Source of Mirakurun-style services (`GET /api/services`).
pub trait ServiceSource {
    fn get_services(&self) -> impl Future<Output = Result<Vec<MirakurunService>>>;
}

/// Source of EPGStation channels (`GET /api/channels`).
pub trait ChannelSource {
    fn get_channels(&self) -> impl Future<Output = Result<Vec<EpgStationChannel>>>;
}

/// Source of per-channel program schedules.
pub trait ScheduleSource {
    /// Schedules for `days` days starting at `start_at` (UNIX epoch milliseconds).
    fn get_channel_schedules(
        &self,
        channel_id: u64,
        start_at: i64,
        days: u32,
    ) -> impl Future<Output = Result<Vec<EpgStationSchedule>>>;
}

/// JSON-over-HTTP helper shared by the API clients.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    headers: HeaderMap,
}

impl ApiClient {
    pub fn new(http: Client, base_url: Url, headers: HeaderMap) -> Self {
        Self {
            http,
            base_url,
            headers,
        }
    }

    /// Build `<base>/<path>?<query>`.
    pub fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConfigError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(path.split('/'));
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// GET a URL and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .http
            .get(url.clone())
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DumpError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        serde_json::from_slice(&body).map_err(|source| DumpError::Json {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Client::new(), Url::parse(base).unwrap(), HeaderMap::new())
    }

    #[test]
    fn test_url_join() {
        let api = client("http://127.0.0.1:40772/");
        assert_eq!(
            api.url("api/services", &[]).unwrap().as_str(),
            "http://127.0.0.1:40772/api/services"
        );
    }

    #[test]
    fn test_url_with_query() {
        let api = client("http://epg.local:8888/");
        let url = api.url(
            "api/schedules/3273601024",
            &[
                ("startAt", "1700000000000".to_string()),
                ("days", "7".to_string()),
                ("isHalfWidth", "true".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "http://epg.local:8888/api/schedules/3273601024?startAt=1700000000000&days=7&isHalfWidth=true"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let api = client("http://proxy.local/mirakurun/");
        assert_eq!(
            api.url("api/services", &[]).unwrap().as_str(),
            "http://proxy.local/mirakurun/api/services"
        );
    }
}
