use crate::error::{Result, StormError};
use crate::types::{RawRow, StormRecord};
use crate::util::{parse_begin_date, parse_count_safe, parse_f64_safe, parse_u64_safe, text_or};
use bzip2::read::MultiBzDecoder;
use csv::{ErrorKind, ReaderBuilder, StringRecord};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Public mirror of the NOAA storm database extract.
pub const DEFAULT_SOURCE_URL: &str =
    "https://d396qusza40orc.cloudfront.net/repdata%2Fdata%2FStormData.csv.bz2";

const DOWNLOAD_TIMEOUT_SECS: u64 = 600;

/// Stand-in for an `EVTYPE` that is missing or blank.
pub const UNKNOWN_EVENT_TYPE: &str = "?";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
    pub bad_dates: usize,
}

/// Where a dataset came from on this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    Cache,
    Parsed(LoadReport),
}

/// Open `path`, choosing a decompressor from its extension.
fn open_source(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| StormError::file(path, e))?;
    let reader = BufReader::new(file);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    Ok(match ext.as_deref() {
        Some("bz2") => Box::new(MultiBzDecoder::new(reader)),
        Some("gz") => Box::new(MultiGzDecoder::new(reader)),
        _ => Box::new(reader),
    })
}

/// Turn one CSV row into a record. The flag is false when the begin date
/// did not parse.
fn to_record(row: RawRow) -> (StormRecord, bool) {
    let begin_date = parse_begin_date(row.begin_date.as_deref());
    let record = StormRecord {
        state: text_or(row.state, ""),
        county_name: text_or(row.county_name, ""),
        // Kept verbatim apart from surrounding blanks; the normalizer owns
        // every other rewrite.
        event_type: match text_or(row.event_type, "") {
            t if t.is_empty() => UNKNOWN_EVENT_TYPE.to_string(),
            t => t,
        },
        begin_date,
        reference_id: parse_u64_safe(row.ref_num.as_deref()).unwrap_or(0),
        fatalities: parse_count_safe(row.fatalities.as_deref()).unwrap_or(0),
        injuries: parse_count_safe(row.injuries.as_deref()).unwrap_or(0),
        prop_dmg_magnitude: parse_f64_safe(row.prop_dmg.as_deref())
            .filter(|v| *v >= 0.0)
            .unwrap_or(0.0),
        prop_dmg_exp: text_or(row.prop_dmg_exp, ""),
        crop_dmg_magnitude: parse_f64_safe(row.crop_dmg.as_deref())
            .filter(|v| *v >= 0.0)
            .unwrap_or(0.0),
        crop_dmg_exp: text_or(row.crop_dmg_exp, ""),
        remarks: text_or(row.remarks, ""),
    };
    (record, begin_date.is_some())
}

/// Parse delimited storm data.
///
/// Fields are decoded lossily so a stray Latin-1 byte cannot cost a row.
/// Rows that still fail to deserialize are counted and skipped; read and
/// decompression failures abort the parse.
pub fn parse_reader<R: Read>(reader: R) -> Result<(Vec<StormRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = StringRecord::from_byte_record_lossy(rdr.byte_headers()?.clone());
    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for result in rdr.byte_records() {
        let raw = match result {
            Ok(r) => r,
            Err(e) if matches!(e.kind(), ErrorKind::Io(_)) => return Err(e.into()),
            Err(_) => {
                report.total_rows += 1;
                report.parse_errors += 1;
                continue;
            }
        };
        report.total_rows += 1;
        let decoded = StringRecord::from_byte_record_lossy(raw);
        let row: RawRow = match decoded.deserialize(Some(&headers)) {
            Ok(r) => r,
            Err(_) => {
                report.parse_errors += 1;
                continue;
            }
        };
        let (record, date_ok) = to_record(row);
        if !date_ok {
            report.bad_dates += 1;
        }
        records.push(record);
    }
    Ok((records, report))
}

pub fn parse_file(path: &Path) -> Result<(Vec<StormRecord>, LoadReport)> {
    parse_reader(open_source(path)?)
}

/// Snapshot store for the parsed, column-pruned dataset.
pub trait DatasetCache {
    /// `Ok(None)` when there is no usable snapshot.
    fn load(&self) -> Result<Option<Vec<StormRecord>>>;
    fn store(&self, records: &[StormRecord]) -> Result<()>;
}

/// Obtains the raw source file when it is missing locally.
pub trait SourceFetcher {
    fn fetch(&self, dest: &Path) -> Result<()>;
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Write through a sibling temp file and rename it over `path`.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let mut tmp = NamedTempFile::new_in(parent_dir(path)).map_err(|e| StormError::file(path, e))?;
    write(&mut tmp)?;
    tmp.persist(path)
        .map_err(|e| StormError::file(path, e.error))?;
    Ok(())
}

/// JSON snapshot at a fixed path.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCache { path: path.into() }
    }
}

impl DatasetCache for FileCache {
    fn load(&self) -> Result<Option<Vec<StormRecord>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.path).map_err(|e| StormError::file(&self.path, e))?;
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(records) => Ok(Some(records)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable cache");
                Ok(None)
            }
        }
    }

    fn store(&self, records: &[StormRecord]) -> Result<()> {
        write_atomically(&self.path, |tmp| {
            let mut w = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut w, records)?;
            w.flush().map_err(|e| StormError::file(&self.path, e))
        })
    }
}

/// Cache that never hits and discards writes (`--no-cache`).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl DatasetCache for NoCache {
    fn load(&self) -> Result<Option<Vec<StormRecord>>> {
        Ok(None)
    }

    fn store(&self, _records: &[StormRecord]) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    url: String,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        HttpFetcher { url: url.into() }
    }
}

impl SourceFetcher for HttpFetcher {
    fn fetch(&self, dest: &Path) -> Result<()> {
        let fetch_err = |source: reqwest::Error| StormError::Fetch {
            url: self.url.clone(),
            source,
        };
        info!(url = %self.url, dest = %dest.display(), "downloading source");
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()
            .map_err(fetch_err)?;
        let mut resp = client.get(&self.url).send().map_err(fetch_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StormError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        write_atomically(dest, |tmp| {
            let bytes = resp.copy_to(tmp.as_file_mut()).map_err(fetch_err)?;
            info!(bytes, "download complete");
            Ok(())
        })
    }
}

/// Check the cache, else parse the source (fetching it first if absent),
/// then refresh the cache.
pub fn load_dataset(
    source: &Path,
    cache: &dyn DatasetCache,
    fetcher: &dyn SourceFetcher,
) -> Result<(Vec<StormRecord>, LoadOrigin)> {
    if let Some(records) = cache.load()? {
        info!(records = records.len(), "loaded dataset from cache");
        return Ok((records, LoadOrigin::Cache));
    }
    if !source.exists() {
        fetcher.fetch(source)?;
    }
    info!(source = %source.display(), "parsing source");
    let (records, report) = parse_file(source)?;
    info!(
        rows = report.total_rows,
        parse_errors = report.parse_errors,
        bad_dates = report.bad_dates,
        "parsed source"
    );
    if records.is_empty() {
        return Err(StormError::EmptySource(source.to_path_buf()));
    }
    cache.store(&records)?;
    Ok((records, LoadOrigin::Parsed(report)))
}
