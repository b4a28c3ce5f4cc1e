use crate::error::{Result, StormError};
use crate::filter::{FilterConfig, NAPA_OUTLIER_REFNUM};
use crate::loader::DEFAULT_SOURCE_URL;
use crate::reports::DEFAULT_TOP_N;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Rank storm event types by casualties and economic damage.
#[derive(Parser, Debug, Clone)]
#[command(name = "storm-report", version, about)]
pub struct Args {
    /// Compressed storm database extract (.bz2, .gz or plain CSV)
    #[arg(long, env = "STORM_SOURCE", default_value = "repdata_data_StormData.csv.bz2")]
    pub source: PathBuf,

    /// Parsed-dataset snapshot; reused when present
    #[arg(long, env = "STORM_CACHE", default_value = "storm_cache.json")]
    pub cache: PathBuf,

    /// Where to download the source from when it is missing
    #[arg(long, env = "STORM_URL", default_value = DEFAULT_SOURCE_URL)]
    pub url: String,

    /// Directory for CSV and JSON outputs
    #[arg(long, env = "STORM_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Rows shown per ranking
    #[arg(long, env = "STORM_TOP", default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// First day of the analysis window (YYYY-MM-DD)
    #[arg(long, env = "STORM_SINCE", default_value = "1996-01-01")]
    pub since: String,

    /// REFNUM to drop as a known outlier; 0 disables
    #[arg(long, env = "STORM_EXCLUDE_REF", default_value_t = NAPA_OUTLIER_REFNUM)]
    pub exclude_ref: u64,

    /// Ignore and do not write the dataset snapshot
    #[arg(long, env = "STORM_NO_CACHE")]
    pub no_cache: bool,

    /// Also print every normalized event type with its record count
    #[arg(long, env = "STORM_LIST_LABELS")]
    pub list_labels: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "STORM_LOG", default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn filter_config(&self) -> Result<FilterConfig> {
        let since = NaiveDate::parse_from_str(self.since.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| StormError::Config(format!("invalid --since date: {}", self.since)))?;
        let excluded_ref = match self.exclude_ref {
            0 => None,
            id => Some(id),
        };
        Ok(FilterConfig {
            since,
            excluded_ref,
        })
    }
}
