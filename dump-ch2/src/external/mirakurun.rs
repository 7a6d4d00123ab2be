//! Mirakurun / mirakc API client.

use ch2_format::ChannelType;
use log::info;
use serde::Deserialize;

use super::{ApiClient, ServiceSource};
use crate::error::Result;

/// A service from `GET /api/services`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirakurunService {
    pub id: u64,
    pub service_id: u16,
    pub network_id: u16,
    #[serde(default)]
    pub transport_stream_id: Option<u16>,
    pub name: String,
    #[serde(default, rename = "type")]
    pub service_type: Option<u8>,
    #[serde(default)]
    pub remote_control_key_id: Option<u16>,
    pub channel: MirakurunChannel,
}

/// The physical channel a service is broadcast on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MirakurunChannel {
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    #[serde(default)]
    pub channel: Option<String>,
}

/// Mirakurun / mirakc client.
#[derive(Debug, Clone)]
pub struct MirakurunClient {
    api: ApiClient,
}

impl MirakurunClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl ServiceSource for MirakurunClient {
    async fn get_services(&self) -> Result<Vec<MirakurunService>> {
        let url = self.api.url("api/services", &[])?;
        info!("Fetching Mirakurun services: {}", url);
        self.api.get_json(url).await
    }
}
