//! Channel list generation.
//!
//! Turns source records into a [`Ch2Document`]:
//! 1. Group records by channel type (tuning space), in first-seen or canonical order
//! 2. Number tuning spaces sequentially
//! 3. Sort BS/CS/SKY spaces by service ID
//! 4. Number channels within each space, after sorting
//! 5. Classify the service type and decide whether the channel is enabled

use std::collections::HashMap;

use ch2_format::{Ch2Channel, Ch2Document, ChannelType, ServiceType, TuningSpace};
use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::config::SpaceOrder;
use crate::error::Result;
use crate::external::{EpgStationChannel, MirakurunService, ScheduleSource};
use crate::normalize::NameFormatter;

/// Number of days of schedule checked when stripping channels.
pub const SCHEDULE_DAYS: u32 = 7;

/// Source-neutral channel record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    /// Mirakurun service ID / EPGStation channel ID (both are NID * 100000 + SID).
    pub id: u64,
    pub name: String,
    pub half_width_name: Option<String>,
    pub service_id: u16,
    pub network_id: u16,
    pub remote_control_key_id: Option<u16>,
    pub channel_type: ChannelType,
    pub service_type: Option<u8>,
}

impl ChannelRecord {
    /// Remote control key, falling back to the service ID when unset or zero.
    pub fn remote_control_key(&self) -> u16 {
        match self.remote_control_key_id {
            Some(key) if key > 0 => key,
            _ => self.service_id,
        }
    }
}

impl From<MirakurunService> for ChannelRecord {
    fn from(service: MirakurunService) -> Self {
        Self {
            id: service.id,
            name: service.name,
            half_width_name: None,
            service_id: service.service_id,
            network_id: service.network_id,
            remote_control_key_id: service.remote_control_key_id,
            channel_type: service.channel.channel_type,
            service_type: service.service_type,
        }
    }
}

impl From<EpgStationChannel> for ChannelRecord {
    fn from(channel: EpgStationChannel) -> Self {
        Self {
            id: channel.id,
            name: channel.name,
            half_width_name: Some(channel.half_width_name),
            service_id: channel.service_id,
            network_id: channel.network_id,
            remote_control_key_id: channel.remote_control_key_id,
            channel_type: channel.channel_type,
            service_type: channel.service_type,
        }
    }
}

/// Transport stream IDs keyed by record ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsidTable {
    tsids: HashMap<u64, u16>,
}

impl TsidTable {
    /// Collect the known (present and non-zero) TSIDs of a service list.
    pub fn from_services(services: &[MirakurunService]) -> Self {
        let tsids = services
            .iter()
            .filter_map(|s| match s.transport_stream_id {
                Some(tsid) if tsid != 0 => Some((s.id, tsid)),
                _ => None,
            })
            .collect();
        Self { tsids }
    }

    /// Entries of `self` win; `fallback` fills the gaps.
    pub fn or(mut self, fallback: TsidTable) -> Self {
        for (id, tsid) in fallback.tsids {
            self.tsids.entry(id).or_insert(tsid);
        }
        self
    }

    /// TSID for a record, 0 when unknown.
    pub fn get(&self, id: u64) -> u16 {
        self.tsids.get(&id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.tsids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tsids.is_empty()
    }
}

/// Group records by channel type.
///
/// Records keep their relative order inside a group. Groups are ordered by
/// first appearance, or GR/BS/CS/SKY/others for [`SpaceOrder::Canonical`].
pub fn group_by_channel_type(
    records: Vec<ChannelRecord>,
    order: SpaceOrder,
) -> Vec<(ChannelType, Vec<ChannelRecord>)> {
    let mut groups: Vec<(ChannelType, Vec<ChannelRecord>)> = Vec::new();

    for record in records {
        match groups.iter_mut().find(|(t, _)| *t == record.channel_type) {
            Some((_, members)) => members.push(record),
            None => groups.push((record.channel_type.clone(), vec![record])),
        }
    }

    if order == SpaceOrder::Canonical {
        groups.sort_by(|(a, _), (b, _)| a.canonical_key().cmp(&b.canonical_key()));
    }

    groups
}

/// Builds `.ch2` documents.
pub struct ChannelListBuilder {
    formatter: Box<dyn NameFormatter>,
    strip: bool,
    space_order: SpaceOrder,
}

impl ChannelListBuilder {
    pub fn new(formatter: Box<dyn NameFormatter>, strip: bool, space_order: SpaceOrder) -> Self {
        Self {
            formatter,
            strip,
            space_order,
        }
    }

    /// Build the document.
    ///
    /// With strip enabled, every channel with a valid service type costs one
    /// schedule request covering [`SCHEDULE_DAYS`] days from `now`. Request
    /// failures abort the build.
    pub async fn build<S: ScheduleSource>(
        &self,
        records: Vec<ChannelRecord>,
        tsids: &TsidTable,
        schedules: &S,
        now: DateTime<Utc>,
    ) -> Result<Ch2Document> {
        let start_at = now.timestamp_millis();
        let mut spaces = Vec::new();

        for (space_idx, (channel_type, mut members)) in
            group_by_channel_type(records, self.space_order)
                .into_iter()
                .enumerate()
        {
            let space = space_idx as u32;

            if channel_type.is_satellite() {
                members.sort_by_key(|r| r.service_id);
            }

            let mut channels = Vec::with_capacity(members.len());
            for (channel_idx, record) in members.iter().enumerate() {
                let (service_type, valid) = ServiceType::classify(&record.name, record.service_type);

                let enabled = if !valid {
                    debug!(
                        "Disabling {} (id={}): service type 0x{:02X} is not video or audio",
                        record.name, record.id, service_type.0
                    );
                    false
                } else if self.strip {
                    let entries = schedules
                        .get_channel_schedules(record.id, start_at, SCHEDULE_DAYS)
                        .await?;
                    let has_programs = entries.iter().any(|e| e.has_programs());
                    if !has_programs {
                        debug!("Disabling {} (id={}): no scheduled programs", record.name, record.id);
                    }
                    has_programs
                } else {
                    true
                };

                channels.push(Ch2Channel {
                    name: self
                        .formatter
                        .format_name(&record.name, record.half_width_name.as_deref()),
                    space,
                    channel: channel_idx as u32,
                    remote_control_key: record.remote_control_key(),
                    service_type,
                    service_id: record.service_id,
                    network_id: record.network_id,
                    transport_stream_id: tsids.get(record.id),
                    enabled,
                });
            }

            debug!(
                "Generated tuning space {}: {} ({} channels)",
                space,
                channel_type,
                channels.len()
            );

            spaces.push(TuningSpace {
                index: space,
                channel_type,
                channels,
            });
        }

        let document = Ch2Document { spaces };
        info!(
            "Built channel list: {} tuning spaces, {} channels ({} enabled)",
            document.spaces.len(),
            document.channel_count(),
            document.channels().filter(|c| c.enabled).count()
        );

        Ok(document)
    }
}
