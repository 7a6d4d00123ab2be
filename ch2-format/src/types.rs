//! Type definitions for the `.ch2` channel file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// First header line of every `.ch2` file.
pub const HEADER_TITLE: &str = "; TVTest チャンネル設定ファイル";

/// Second header line describing the column layout.
pub const HEADER_COLUMNS: &str =
    "; 名称,チューニング空間,チャンネル,リモコン番号,サービスタイプ,サービスID,ネットワークID,TSID,状態";

/// Line separator used by TVTest.
pub const LINE_SEPARATOR: &str = "\r\n";

/// Channel type (tuning space category) as reported by Mirakurun/EPGStation.
///
/// - GR: Digital terrestrial television (地上波デジタル)
/// - BS: BS satellite (BS衛星)
/// - CS: 110度CS satellite (110度CS衛星)
/// - SKY: 124/128度CS (スカパー!プレミアムサービス)
///
/// Any other label is kept verbatim so that it can still be written as a
/// tuning space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChannelType {
    GR,
    BS,
    CS,
    SKY,
    Other(String),
}

impl ChannelType {
    /// Label written in the `;#SPACE(...)` comment.
    pub fn label(&self) -> &str {
        match self {
            ChannelType::GR => "GR",
            ChannelType::BS => "BS",
            ChannelType::CS => "CS",
            ChannelType::SKY => "SKY",
            ChannelType::Other(label) => label,
        }
    }

    /// Whether this is a satellite band whose services are ordered by service ID.
    pub fn is_satellite(&self) -> bool {
        matches!(self, ChannelType::BS | ChannelType::CS | ChannelType::SKY)
    }

    /// Sort key for the canonical tuning space order: GR, BS, CS, SKY, then
    /// every other label alphabetically.
    pub fn canonical_key(&self) -> (u8, &str) {
        match self {
            ChannelType::GR => (0, ""),
            ChannelType::BS => (1, ""),
            ChannelType::CS => (2, ""),
            ChannelType::SKY => (3, ""),
            ChannelType::Other(label) => (4, label),
        }
    }
}

impl From<&str> for ChannelType {
    fn from(value: &str) -> Self {
        match value {
            "GR" => ChannelType::GR,
            "BS" => ChannelType::BS,
            "CS" => ChannelType::CS,
            "SKY" => ChannelType::SKY,
            other => ChannelType::Other(other.to_string()),
        }
    }
}

impl From<String> for ChannelType {
    fn from(value: String) -> Self {
        ChannelType::from(value.as_str())
    }
}

impl From<ChannelType> for String {
    fn from(value: ChannelType) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// ARIB service type (`service_type` of the service descriptor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceType(pub u8);

impl ServiceType {
    /// デジタルTVサービス
    pub const VIDEO: ServiceType = ServiceType(0x01);
    /// デジタル音声サービス
    pub const AUDIO: ServiceType = ServiceType(0x02);
    /// 臨時映像サービス
    pub const TEMPORARY_VIDEO: ServiceType = ServiceType(0xA1);
    /// 臨時音声サービス
    pub const TEMPORARY_AUDIO: ServiceType = ServiceType(0xA2);
    /// プロモーション映像サービス
    pub const PROMOTION_VIDEO: ServiceType = ServiceType(0xA5);
    /// プロモーション音声サービス
    pub const PROMOTION_AUDIO: ServiceType = ServiceType(0xA6);

    /// Markers in a service name that identify a radio service.
    const AUDIO_NAME_MARKERS: [&'static str; 3] = ["ラジオ", "FM", "ＦＭ"];

    /// Whether the code denotes a viewable (video or audio) service.
    pub fn is_video_or_audio(self) -> bool {
        matches!(
            self,
            ServiceType::VIDEO
                | ServiceType::TEMPORARY_VIDEO
                | ServiceType::PROMOTION_VIDEO
                | ServiceType::AUDIO
                | ServiceType::TEMPORARY_AUDIO
                | ServiceType::PROMOTION_AUDIO
        )
    }

    /// Classify a service.
    ///
    /// An explicit code is passed through and reported as valid only when it is
    /// a video or audio service. Without one, the name decides: radio names are
    /// audio, everything else is video.
    pub fn classify(name: &str, explicit: Option<u8>) -> (ServiceType, bool) {
        match explicit {
            Some(code) => {
                let service_type = ServiceType(code);
                (service_type, service_type.is_video_or_audio())
            }
            None => {
                if Self::AUDIO_NAME_MARKERS.iter().any(|m| name.contains(m)) {
                    (ServiceType::AUDIO, true)
                } else {
                    (ServiceType::VIDEO, true)
                }
            }
        }
    }
}

/// One data line of a `.ch2` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ch2Channel {
    /// 名称
    pub name: String,
    /// チューニング空間
    pub space: u32,
    /// チャンネル
    pub channel: u32,
    /// リモコン番号
    pub remote_control_key: u16,
    /// サービスタイプ
    pub service_type: ServiceType,
    /// サービスID
    pub service_id: u16,
    /// ネットワークID
    pub network_id: u16,
    /// TSID
    pub transport_stream_id: u16,
    /// 状態
    pub enabled: bool,
}

impl fmt::Display for Ch2Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{},{}",
            self.name,
            self.space,
            self.channel,
            self.remote_control_key,
            self.service_type.0,
            self.service_id,
            self.network_id,
            self.transport_stream_id,
            u8::from(self.enabled),
        )
    }
}

/// A tuning space: one channel type and its channels in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuningSpace {
    pub index: u32,
    pub channel_type: ChannelType,
    pub channels: Vec<Ch2Channel>,
}

impl TuningSpace {
    /// The `;#SPACE(index,label)` comment line.
    pub fn comment(&self) -> String {
        format!(";#SPACE({},{})", self.index, self.channel_type.label())
    }
}

/// A complete `.ch2` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ch2Document {
    pub spaces: Vec<TuningSpace>,
}

impl Ch2Document {
    /// Total number of data lines.
    pub fn channel_count(&self) -> usize {
        self.spaces.iter().map(|s| s.channels.len()).sum()
    }

    /// Iterate over every data line in output order.
    pub fn channels(&self) -> impl Iterator<Item = &Ch2Channel> {
        self.spaces.iter().flat_map(|s| s.channels.iter())
    }
}
