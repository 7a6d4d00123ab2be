//! EPGStation API client.

use ch2_format::ChannelType;
use log::info;
use serde::Deserialize;

use super::{ApiClient, ChannelSource, ScheduleSource};
use crate::error::Result;

/// A channel from `GET /api/channels`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpgStationChannel {
    pub id: u64,
    pub service_id: u16,
    pub network_id: u16,
    pub name: String,
    pub half_width_name: String,
    pub channel_type: ChannelType,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default, rename = "type")]
    pub service_type: Option<u8>,
    #[serde(default)]
    pub remote_control_key_id: Option<u16>,
}

/// One entry of `GET /api/schedules/{channelId}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EpgStationSchedule {
    #[serde(default)]
    pub programs: Vec<EpgStationProgram>,
}

impl EpgStationSchedule {
    pub fn has_programs(&self) -> bool {
        !self.programs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpgStationProgram {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub start_at: i64,
    #[serde(default)]
    pub end_at: i64,
    #[serde(default)]
    pub name: String,
}

/// EPGStation client.
#[derive(Debug, Clone)]
pub struct EpgStationClient {
    api: ApiClient,
}

impl EpgStationClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl ChannelSource for EpgStationClient {
    async fn get_channels(&self) -> Result<Vec<EpgStationChannel>> {
        let url = self.api.url("api/channels", &[])?;
        info!("Fetching EPGStation channels: {}", url);
        self.api.get_json(url).await
    }
}

impl ScheduleSource for EpgStationClient {
    async fn get_channel_schedules(
        &self,
        channel_id: u64,
        start_at: i64,
        days: u32,
    ) -> Result<Vec<EpgStationSchedule>> {
        let url = self.api.url(
            &format!("api/schedules/{}", channel_id),
            &[
                ("startAt", start_at.to_string()),
                ("days", days.to_string()),
                ("isHalfWidth", "true".to_string()),
            ],
        )?;
        info!("Fetching EPGStation schedules: channel_id={} url={}", channel_id, url);
        self.api.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_channel() {
        let json = r#"{
            "id": 3273601024,
            "serviceId": 1024,
            "networkId": 32736,
            "name": "ＮＨＫ総合１・東京",
            "halfWidthName": "NHK総合1・東京",
            "hasLogoData": true,
            "channelType": "GR",
            "channel": "27",
            "type": 1,
            "remoteControlKeyId": 1
        }"#;

        let channel: EpgStationChannel = serde_json::from_str(json).unwrap();
        assert_eq!(channel.id, 3273601024);
        assert_eq!(channel.half_width_name, "NHK総合1・東京");
        assert_eq!(channel.channel_type, ChannelType::GR);
        assert_eq!(channel.service_type, Some(1));
        assert_eq!(channel.remote_control_key_id, Some(1));
    }

    #[test]
    fn test_deserialize_schedules() {
        let json = r#"[
            {
                "channel": { "id": 1, "serviceId": 101, "networkId": 4, "name": "NHK BS", "hasLogoData": false, "channelType": "BS" },
                "programs": [
                    { "id": 10, "channelId": 1, "startAt": 1700000000000, "endAt": 1700003600000, "isFree": true, "name": "ニュース" }
                ]
            },
            { "programs": [] }
        ]"#;

        let schedules: Vec<EpgStationSchedule> = serde_json::from_str(json).unwrap();
        assert_eq!(schedules.len(), 2);
        assert!(schedules[0].has_programs());
        assert_eq!(schedules[0].programs[0].name, "ニュース");
        assert!(!schedules[1].has_programs());
    }
}
