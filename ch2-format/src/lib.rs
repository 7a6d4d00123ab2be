//! Data model and codec for TVTest/BonDriver `.ch2` channel files.
//!
//! A `.ch2` file is a Shift_JIS (CP932) text file with CRLF separators:
//!
//! ```text
//! ; TVTest チャンネル設定ファイル
//! ; 名称,チューニング空間,チャンネル,リモコン番号,サービスタイプ,サービスID,ネットワークID,TSID,状態
//! ;#SPACE(0,GR)
//! NHK総合,0,0,1,1,1024,32736,32736,1
//! ```
//!
//! # Example
//!
//! ```rust
//! use ch2_format::{Ch2Channel, Ch2Document, ChannelType, ServiceType, TuningSpace, render_document};
//!
//! let document = Ch2Document {
//!     spaces: vec![TuningSpace {
//!         index: 0,
//!         channel_type: ChannelType::GR,
//!         channels: vec![Ch2Channel {
//!             name: "NHK総合".to_string(),
//!             space: 0,
//!             channel: 0,
//!             remote_control_key: 1,
//!             service_type: ServiceType::VIDEO,
//!             service_id: 101,
//!             network_id: 1,
//!             transport_stream_id: 0,
//!             enabled: true,
//!         }],
//!     }],
//! };
//!
//! let text = render_document(&document);
//! assert!(text.ends_with(";#SPACE(0,GR)\r\nNHK総合,0,0,1,1,101,1,0,1"));
//! ```

pub mod codec;
pub mod error;
pub mod types;

pub use codec::{encode_document, render_document};
pub use error::Ch2Error;
pub use types::{
    Ch2Channel, Ch2Document, ChannelType, ServiceType, TuningSpace, HEADER_COLUMNS, HEADER_TITLE,
    LINE_SEPARATOR,
};
