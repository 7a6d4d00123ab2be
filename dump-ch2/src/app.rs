//! The dump pipeline: fetch, build, encode, write.

use std::path::PathBuf;

use chrono::Utc;
use log::info;
use reqwest::Client;

use crate::builder::{ChannelListBuilder, ChannelRecord, TsidTable};
use crate::config::{BonDriverType, Endpoint, Settings};
use crate::error::{DumpError, Result};
use crate::external::{
    ApiClient, ChannelSource, EpgStationClient, MirakurunClient, MirakurunService, ServiceSource,
};
use crate::normalize;

/// Where channel records come from.
pub enum ChannelSourceKind {
    /// Mirakurun/mirakc services are the records.
    Tuner,
    /// EPGStation channels are the records.
    Scheduler,
}

impl From<BonDriverType> for ChannelSourceKind {
    fn from(value: BonDriverType) -> Self {
        match value {
            BonDriverType::Mirakurun | BonDriverType::Mirakc => ChannelSourceKind::Tuner,
            BonDriverType::EpgStation => ChannelSourceKind::Scheduler,
        }
    }
}

fn api_client(http: &Client, endpoint: &Endpoint, settings: &Settings) -> Result<ApiClient> {
    Ok(ApiClient::new(
        http.clone(),
        endpoint.base_url()?,
        settings.headers.clone(),
    ))
}

/// Build the transport stream ID table: the secondary tuner source wins over
/// the primary services.
async fn transport_stream_ids<S: ServiceSource>(
    services: &[MirakurunService],
    secondary: Option<&S>,
) -> Result<TsidTable> {
    let primary = TsidTable::from_services(services);
    match secondary {
        Some(source) => {
            let secondary = TsidTable::from_services(&source.get_services().await?);
            info!(
                "Loaded {} transport stream IDs from the secondary source ({} from the primary)",
                secondary.len(),
                primary.len()
            );
            Ok(secondary.or(primary))
        }
        None => Ok(primary),
    }
}

/// Run one dump and return the path of the written file.
pub async fn execute(settings: &Settings) -> Result<PathBuf> {
    let http = Client::new();
    let mirakurun = MirakurunClient::new(api_client(&http, &settings.mirakurun, settings)?);
    let epgstation = EpgStationClient::new(api_client(&http, &settings.epgstation, settings)?);
    let tsid_source = settings
        .tsid_source
        .as_ref()
        .map(|endpoint| api_client(&http, endpoint, settings).map(MirakurunClient::new))
        .transpose()?;

    let services = mirakurun.get_services().await?;
    info!("Fetched {} services from {}", services.len(), settings.mirakurun);

    let tsids = transport_stream_ids(&services, tsid_source.as_ref()).await?;

    let records: Vec<ChannelRecord> = match ChannelSourceKind::from(settings.bondriver_type) {
        ChannelSourceKind::Tuner => services.into_iter().map(ChannelRecord::from).collect(),
        ChannelSourceKind::Scheduler => {
            let channels = epgstation.get_channels().await?;
            info!("Fetched {} channels from {}", channels.len(), settings.epgstation);
            channels.into_iter().map(ChannelRecord::from).collect()
        }
    };

    let builder = ChannelListBuilder::new(
        normalize::formatter(settings.normalize),
        settings.strip,
        settings.space_order,
    );
    let document = builder
        .build(records, &tsids, &epgstation, Utc::now())
        .await?;

    let encoded = ch2_format::encode_document(&document)?;
    tokio::fs::write(&settings.output, &encoded)
        .await
        .map_err(|source| DumpError::Write {
            path: settings.output.clone(),
            source,
        })?;

    info!(
        "Wrote {} ({} bytes)",
        settings.output.display(),
        encoded.len()
    );
    Ok(settings.output.clone())
}
