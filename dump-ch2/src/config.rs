//! Configuration: BonDriver type, API endpoints, request headers and the
//! optional TOML configuration file.
//!
//! Values are merged with the following precedence:
//! 1. Command line arguments
//! 2. Configuration file (`--config`, or `dump-ch2.toml` in the working directory)
//! 3. Built-in defaults

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::context::Args;

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "dump-ch2.toml";

pub const DEFAULT_SCHEME: &str = "http";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_MIRAKURUN_PORT: u16 = 40772;
pub const DEFAULT_EPGSTATION_PORT: u16 = 8888;
pub const DEFAULT_LOG_RETENTION_DAYS: u64 = 7;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid BonDriver type: {0} (expected BonDriver_Mirakurun, BonDriver_mirakc or BonDriver_EPGStation)")]
    InvalidBonDriverType(String),

    #[error("BonDriver type is required (--type or `type` in the config file)")]
    MissingBonDriverType,

    #[error("Invalid request header {0:?} (expected \"Key: Value\")")]
    InvalidHeader(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Target BonDriver, which also decides where channel records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonDriverType {
    /// BonDriver_Mirakurun: services from Mirakurun.
    Mirakurun,
    /// BonDriver_mirakc: services from mirakc (Mirakurun compatible API).
    Mirakc,
    /// BonDriver_EPGStation: channels from EPGStation.
    EpgStation,
}

impl BonDriverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BonDriverType::Mirakurun => "BonDriver_Mirakurun",
            BonDriverType::Mirakc => "BonDriver_mirakc",
            BonDriverType::EpgStation => "BonDriver_EPGStation",
        }
    }

    /// Default output file name, e.g. `BonDriver_EPGStation.ch2`.
    pub fn default_output(&self) -> PathBuf {
        PathBuf::from(format!("{}.ch2", self.as_str()))
    }
}

impl FromStr for BonDriverType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BonDriver_Mirakurun" => Ok(BonDriverType::Mirakurun),
            "BonDriver_mirakc" => Ok(BonDriverType::Mirakc),
            "BonDriver_EPGStation" => Ok(BonDriverType::EpgStation),
            other => Err(ConfigError::InvalidBonDriverType(other.to_string())),
        }
    }
}

impl fmt::Display for BonDriverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order of tuning spaces in the output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SpaceOrder {
    /// Order in which channel types first appear in the API response
    #[default]
    FirstSeen,
    /// GR, BS, CS, SKY, then other channel types alphabetically
    Canonical,
}

/// An HTTP API endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    fn resolve(
        scheme: Option<&String>,
        host: Option<&String>,
        port: Option<u16>,
        section: &EndpointSection,
        default_port: u16,
    ) -> Self {
        Self {
            scheme: scheme
                .or(section.scheme.as_ref())
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| DEFAULT_SCHEME.to_string()),
            host: host
                .or(section.host.as_ref())
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: port.or(section.port).unwrap_or(default_port),
        }
    }

    /// Base URL with a trailing slash, e.g. `http://127.0.0.1:40772/`.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = format!("{}://{}:{}/", self.scheme, self.host, self.port);
        Url::parse(&url).map_err(|e| ConfigError::InvalidUrl {
            reason: e.to_string(),
            url,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Parse "Key: Value" request headers. Keys and values are trimmed; repeated
/// keys are all sent.
pub fn parse_headers(raw: &[String]) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    for header in raw {
        let (key, value) = header
            .split_once(':')
            .ok_or_else(|| ConfigError::InvalidHeader(header.clone()))?;

        let name = HeaderName::from_bytes(key.trim().as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(header.clone()))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| ConfigError::InvalidHeader(header.clone()))?;

        headers.append(name, value);
    }

    Ok(headers)
}

/// Configuration file format.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(rename = "type")]
    pub bondriver_type: Option<String>,
    pub output: Option<PathBuf>,
    pub normalize: Option<bool>,
    pub strip: Option<bool>,
    pub space_order: Option<SpaceOrder>,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub mirakurun: EndpointSection,
    #[serde(default)]
    pub epgstation: EndpointSection,
    #[serde(default)]
    pub tsid_source: EndpointSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct EndpointSection {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoggingSection {
    pub log_dir: Option<PathBuf>,
    pub retention_days: Option<u64>,
    pub level: Option<String>,
}

/// Load a configuration file.
pub fn load_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pick the configuration file: explicit path > auto-detect > none.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        default_path.exists().then_some(default_path)
    })
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub log_dir: Option<PathBuf>,
    pub retention_days: u64,
    pub level: Option<String>,
    pub verbose: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bondriver_type: BonDriverType,
    pub output: PathBuf,
    pub mirakurun: Endpoint,
    pub epgstation: Endpoint,
    /// Secondary Mirakurun/mirakc for transport stream IDs.
    pub tsid_source: Option<Endpoint>,
    pub headers: HeaderMap,
    pub normalize: bool,
    pub strip: bool,
    pub space_order: SpaceOrder,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Merge command line arguments over the configuration file.
    pub fn resolve(args: &Args, file: ConfigFile) -> Result<Self, ConfigError> {
        let bondriver_type: BonDriverType = args
            .bondriver_type
            .as_deref()
            .or(file.bondriver_type.as_deref())
            .ok_or(ConfigError::MissingBonDriverType)?
            .trim()
            .parse()?;

        let output = args
            .output
            .clone()
            .or(file.output)
            .unwrap_or_else(|| bondriver_type.default_output());

        let mirakurun = Endpoint::resolve(
            args.mirakurun_scheme.as_ref(),
            args.mirakurun_host.as_ref(),
            args.mirakurun_port,
            &file.mirakurun,
            DEFAULT_MIRAKURUN_PORT,
        );
        let epgstation = Endpoint::resolve(
            args.epgstation_scheme.as_ref(),
            args.epgstation_host.as_ref(),
            args.epgstation_port,
            &file.epgstation,
            DEFAULT_EPGSTATION_PORT,
        );

        let tsid_source = if args.tsid_host.is_some() || file.tsid_source.host.is_some() {
            Some(Endpoint::resolve(
                args.tsid_scheme.as_ref(),
                args.tsid_host.as_ref(),
                args.tsid_port,
                &file.tsid_source,
                DEFAULT_MIRAKURUN_PORT,
            ))
        } else {
            None
        };

        let raw_headers: Vec<String> = file
            .headers
            .iter()
            .chain(args.headers.iter())
            .cloned()
            .collect();
        let headers = parse_headers(&raw_headers)?;

        // Validate endpoints up front so a bad host fails before any request.
        mirakurun.base_url()?;
        epgstation.base_url()?;
        if let Some(endpoint) = &tsid_source {
            endpoint.base_url()?;
        }

        Ok(Self {
            bondriver_type,
            output,
            mirakurun,
            epgstation,
            tsid_source,
            headers,
            normalize: args.normalize || file.normalize.unwrap_or(false),
            strip: args.strip || file.strip.unwrap_or(false),
            space_order: args.space_order.or(file.space_order).unwrap_or_default(),
            logging: LoggingSettings {
                log_dir: args.log_dir.clone().or(file.logging.log_dir),
                retention_days: args
                    .log_retention_days
                    .or(file.logging.retention_days)
                    .unwrap_or(DEFAULT_LOG_RETENTION_DAYS),
                level: file.logging.level,
                verbose: args.verbose,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("dump-ch2").chain(argv.iter().copied()))
    }

    #[test]
    fn test_bondriver_type_parse() {
        assert_eq!(
            "BonDriver_Mirakurun".parse::<BonDriverType>().unwrap(),
            BonDriverType::Mirakurun
        );
        assert_eq!(
            "BonDriver_mirakc".parse::<BonDriverType>().unwrap(),
            BonDriverType::Mirakc
        );
        assert_eq!(
            "BonDriver_EPGStation".parse::<BonDriverType>().unwrap(),
            BonDriverType::EpgStation
        );
        assert!(matches!(
            "BonDriver_PT3".parse::<BonDriverType>(),
            Err(ConfigError::InvalidBonDriverType(t)) if t == "BonDriver_PT3"
        ));
    }

    #[test]
    fn test_defaults() {
        let settings =
            Settings::resolve(&args(&["-t", "BonDriver_Mirakurun"]), ConfigFile::default())
                .unwrap();

        assert_eq!(settings.bondriver_type, BonDriverType::Mirakurun);
        assert_eq!(settings.output, PathBuf::from("BonDriver_Mirakurun.ch2"));
        assert_eq!(
            settings.mirakurun.base_url().unwrap().as_str(),
            "http://127.0.0.1:40772/"
        );
        assert_eq!(
            settings.epgstation.base_url().unwrap().as_str(),
            "http://127.0.0.1:8888/"
        );
        assert!(settings.tsid_source.is_none());
        assert!(settings.headers.is_empty());
        assert!(!settings.normalize);
        assert!(!settings.strip);
        assert_eq!(settings.space_order, SpaceOrder::FirstSeen);
        assert_eq!(settings.logging.retention_days, 7);
        assert_eq!(settings.logging.log_dir, None);
    }

    #[test]
    fn test_missing_type() {
        let err = Settings::resolve(&args(&[]), ConfigFile::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBonDriverType));
    }

    #[test]
    fn test_invalid_type_rejected() {
        let err = Settings::resolve(&args(&["--type", "BonDriver_Foo"]), ConfigFile::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBonDriverType(_)));
    }

    #[test]
    fn test_command_line_overrides_config_file() {
        let file: ConfigFile = toml::from_str(
            r#"
            type = "BonDriver_mirakc"
            output = "from-file.ch2"
            normalize = true
            space_order = "canonical"
            headers = ["X-From-File: 1"]

            [mirakurun]
            host = "tuner.local"
            port = 40773

            [epgstation]
            scheme = "https"
            host = "epg.local"

            [tsid_source]
            host = "tuner2.local"

            [logging]
            log_dir = "logs"
            retention_days = 3
            level = "warn"
            "#,
        )
        .unwrap();

        let settings = Settings::resolve(
            &args(&[
                "-t",
                "BonDriver_EPGStation",
                "--mirakurun-port",
                "50000",
                "-H",
                "Authorization: Basic Zm9vOmJhcg==",
                "-s",
            ]),
            file,
        )
        .unwrap();

        assert_eq!(settings.bondriver_type, BonDriverType::EpgStation);
        assert_eq!(settings.output, PathBuf::from("from-file.ch2"));
        assert_eq!(settings.mirakurun.to_string(), "http://tuner.local:50000");
        assert_eq!(settings.epgstation.to_string(), "https://epg.local:8888");
        assert_eq!(
            settings.tsid_source.as_ref().map(|e| e.to_string()),
            Some("http://tuner2.local:40772".to_string())
        );
        assert!(settings.normalize);
        assert!(settings.strip);
        assert_eq!(settings.space_order, SpaceOrder::Canonical);
        assert_eq!(settings.headers.len(), 2);
        assert_eq!(settings.headers["x-from-file"], "1");
        assert_eq!(settings.headers["authorization"], "Basic Zm9vOmJhcg==");
        assert_eq!(settings.logging.log_dir, Some(PathBuf::from("logs")));
        assert_eq!(settings.logging.retention_days, 3);
        assert_eq!(settings.logging.level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&[
            " X-Api-Key :  secret ".to_string(),
            "Cookie: a=1".to_string(),
            "Cookie: b=2".to_string(),
        ])
        .unwrap();
        assert_eq!(headers["x-api-key"], "secret");
        assert_eq!(headers.get_all("cookie").iter().count(), 2);

        assert!(matches!(
            parse_headers(&["no separator".to_string()]),
            Err(ConfigError::InvalidHeader(_))
        ));
        assert!(matches!(
            parse_headers(&["bad name: x".to_string()]),
            Err(ConfigError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_invalid_host() {
        let err = Settings::resolve(
            &args(&["-t", "BonDriver_Mirakurun", "--mirakurun-host", "bad host"]),
            ConfigFile::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump-ch2.toml");
        std::fs::write(&path, "type = \"BonDriver_EPGStation\"\nstrip = true\n").unwrap();

        let file = load_config(&path).unwrap();
        assert_eq!(file.bondriver_type.as_deref(), Some("BonDriver_EPGStation"));
        assert_eq!(file.strip, Some(true));

        std::fs::write(&path, "type = [").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));

        assert!(matches!(
            load_config(&dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
