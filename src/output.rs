use crate::error::{Result, StormError};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(|e| StormError::file(path, e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|e| StormError::file(path, e))?;
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    match render_table(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LabelCountRow;
    use tempfile::TempDir;

    fn rows() -> Vec<LabelCountRow> {
        vec![
            LabelCountRow {
                event_type: "HAIL".to_string(),
                records: 3,
            },
            LabelCountRow {
                event_type: "TORNADO".to_string(),
                records: 2,
            },
        ]
    }

    #[test]
    fn test_write_csv_uses_renamed_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("labels.csv");
        write_csv(&path, &rows()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "EventType,Records\nHAIL,3\nTORNADO,2\n");
    }

    #[test]
    fn test_write_json_pretty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.json");
        write_json(&path, &serde_json::json!({"records_retained": 5})).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["records_retained"], 5);
    }

    #[test]
    fn test_render_table_limits_rows() {
        let table = render_table(&rows(), 1).unwrap();
        assert!(table.contains("| EventType | Records |"));
        assert!(table.contains("HAIL"));
        assert!(!table.contains("TORNADO"));
        assert!(render_table::<LabelCountRow>(&[], 5).is_none());
    }
}
