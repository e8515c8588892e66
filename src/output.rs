//! CSV output, appended to per location across runs.

use std::{
    fs::{self, OpenOptions},
    path::Path,
};

use anyhow::Result;
use log::warn;
use serde_json::Value;

use crate::flatten::{fieldnames, flatten, RawRecord};

/// Appends a batch of records to `path` as CSV rows.
///
/// Does nothing for an empty batch. A header row is written only when the
/// file is empty before this call; it is derived from the batch's first
/// record. Rows always emit fields in that first record's order, with an
/// empty cell for any field a record lacks. The file handle lives only for
/// the duration of the call, so everything written here survives a later
/// crash.
pub fn append_records(records: &[RawRecord], path: &Path) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;
    let header = fieldnames(&records[0]);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if needs_header {
        writer.write_record(&header)?;
    }

    for record in records {
        let mut flat = flatten(record);
        let row: Vec<String> = header
            .iter()
            .map(|field| flat.remove(field).map(cell).unwrap_or_default())
            .collect();

        if !flat.is_empty() {
            warn!(
                "record has fields missing from the header of {}: {:?}",
                path.display(),
                flat.keys().collect::<Vec<_>>()
            );
        }

        writer.write_record(&row)?;
    }

    writer.flush()?;

    Ok(())
}

fn cell(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn should_not_create_file_for_empty_batch() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("empty.csv");

        append_records(&[], &path).unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn should_write_header_then_rows() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("out.csv");
        let records = vec![
            record(json!({ "temp": 10.5, "weather": { "icon": "c01d" } })),
            record(json!({ "temp": 9.0, "weather": { "icon": "c02d" } })),
        ];

        append_records(&records, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, ["temp,weather.icon", "10.5,c01d", "9.0,c02d"]);
    }

    #[test]
    fn should_not_repeat_header_on_second_append() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("out.csv");
        let first = vec![record(json!({ "temp": 10.5 }))];
        let second = vec![record(json!({ "temp": 11.0 }))];

        append_records(&first, &path).unwrap();
        append_records(&second, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, ["temp", "10.5", "11.0"]);
    }

    #[test]
    fn should_write_empty_cell_for_missing_field() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("out.csv");
        let records = vec![
            record(json!({ "temp": 10.5, "rh": 80 })),
            record(json!({ "temp": 9.0 })),
        ];

        append_records(&records, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, ["temp,rh", "10.5,80", "9.0,"]);
    }

    #[test]
    fn should_render_nulls_as_empty_cells() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("out.csv");
        let records = vec![record(json!({ "temp": null, "rh": 80 }))];

        append_records(&records, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, ["temp,rh", ",80"]);
    }

    #[test]
    fn should_create_missing_output_folder() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("data").join("out.csv");
        let records = vec![record(json!({ "temp": 10.5 }))];

        append_records(&records, &path).unwrap();

        assert!(path.exists());
    }
}
