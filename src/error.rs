use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Per-record problems (bad dates, unparsable rows, unknown exponent codes)
/// are counted by the stage that sees them and never surface here.
#[derive(Error, Debug)]
pub enum StormError {
    /// A file could not be opened, read or written.
    #[error("I/O error on {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cache encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// The download of the raw source failed before a response arrived.
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetching {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The source decoded cleanly but held no data rows.
    #[error("No rows found in {0}")]
    EmptySource(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StormError {
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StormError::File {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_names_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let msg = StormError::file("/data/StormData.csv.bz2", io_err).to_string();
        assert!(msg.contains("/data/StormData.csv.bz2"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_http_status_display() {
        let err = StormError::HttpStatus {
            url: "https://example.org/storm.csv.bz2".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Fetching https://example.org/storm.csv.bz2 returned HTTP 404"
        );
    }

    #[test]
    fn test_empty_source_display() {
        let err = StormError::EmptySource(PathBuf::from("StormData.csv.bz2"));
        assert_eq!(err.to_string(), "No rows found in StormData.csv.bz2");
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: StormError = json_err.into();
        assert!(err.to_string().starts_with("Cache encoding error"));
    }
}
