//! CSV edit-log loading

use std::collections::HashSet;

use anyhow::Result;
use polars::prelude::*;

use crate::data::EditRecord;

/// Load the tabular edit log from a CSV file.
///
/// The file must carry `item` and `editor` columns; a `timestamp` column is
/// picked up when present. Rows missing an item or editor identifier are a
/// data-quality issue, not a failure: they are skipped and counted.
///
/// `sample_items` limits ingestion to the first N distinct item ids in row
/// order; every record of a sampled item is kept no matter where it appears
/// in the file.
pub fn load_edit_log(path: &str, sample_items: Option<usize>) -> Result<Vec<EditRecord>> {
    log::info!("Reading edit log: {}", path);

    if !std::path::Path::new(path).exists() {
        return Err(anyhow::anyhow!("File not found: {}", path));
    }

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()?
        .collect()?;

    log::info!("File schema: {:?}", df.schema());
    log::info!("Loaded {} edit rows", df.height());

    let item_col = df.column("item")?.str()?;
    let editor_col = df.column("editor")?.str()?;
    // Timestamps are optional and unused downstream; ignore the column if it
    // parsed as something other than strings.
    let ts_col = df.column("timestamp").ok().and_then(|c| c.str().ok());

    // Sampling keeps the first N distinct items in row order.
    let allowed: Option<HashSet<&str>> = sample_items.map(|limit| {
        let mut items = HashSet::with_capacity(limit);
        for i in 0..df.height() {
            if items.len() >= limit {
                break;
            }
            if let Some(item) = item_col.get(i) {
                if !item.is_empty() {
                    items.insert(item);
                }
            }
        }
        items
    });

    let mut records = Vec::with_capacity(df.height());
    let mut skipped = 0usize;

    for i in 0..df.height() {
        let item = item_col.get(i).unwrap_or_default();
        let editor = editor_col.get(i).unwrap_or_default();

        if item.is_empty() || editor.is_empty() {
            skipped += 1;
            continue;
        }

        if let Some(ref allowed) = allowed {
            if !allowed.contains(item) {
                continue;
            }
        }

        let timestamp = ts_col
            .as_ref()
            .and_then(|col| col.get(i))
            .map(|s| s.to_string());

        records.push(EditRecord {
            item: item.to_string(),
            editor: editor.to_string(),
            timestamp,
        });
    }

    if skipped > 0 {
        log::warn!("Skipped {} rows with a missing item or editor id", skipped);
    }
    log::info!("Kept {} edit records", records.len());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_rows_and_skips_malformed() {
        let path = write_temp_csv(
            "coedit_load_basic.csv",
            "item,editor,timestamp\nI1,A,2021-01-01\nI1,,2021-01-02\nI2,B,\n",
        );

        let records = load_edit_log(path.to_str().unwrap(), None).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].item, "I1");
        assert_eq!(records[0].editor, "A");
        assert_eq!(records[0].timestamp.as_deref(), Some("2021-01-01"));
        assert_eq!(records[1].editor, "B");
        assert_eq!(records[1].timestamp, None);
    }

    #[test]
    fn sampling_keeps_all_records_of_sampled_items() {
        // I1 reappears after I2; the sample of one item must still keep it.
        let path = write_temp_csv(
            "coedit_load_sample.csv",
            "item,editor\nI1,A\nI2,B\nI1,C\n",
        );

        let records = load_edit_log(path.to_str().unwrap(), Some(1)).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.item == "I1"));
    }

    #[test]
    fn timestamp_column_is_optional() {
        let path = write_temp_csv("coedit_load_no_ts.csv", "item,editor\nI1,A\n");

        let records = load_edit_log(path.to_str().unwrap(), None).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_edit_log("/nonexistent/edit_log.csv", None);
        assert!(result.is_err());
    }
}
