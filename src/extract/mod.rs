// src/extract/mod.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::{borrow::Cow, panic};
use tracing::{debug, warn};

use crate::error::{Error, Result};

mod record;

pub use record::{Column, Record, RecordSet, COLUMN_COUNT};

static TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("table selector should parse"));
static ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("row selector should parse"));
static CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("cell selector should parse"));

/// Turn a raw HTML page into records, one per table row that has a name.
///
/// Never fails: anything the parser cannot cope with yields an empty set.
pub fn extract(html: &[u8]) -> RecordSet {
    match try_extract(html) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, bytes = html.len(), "discarding unparsable page");
            RecordSet::new()
        }
    }
}

/// Like [`extract`], but reports a parser breakdown as [`Error::ParseFailed`].
pub fn try_extract(html: &[u8]) -> Result<RecordSet> {
    let text = String::from_utf8_lossy(html);
    if let Cow::Owned(_) = text {
        debug!("page is not valid UTF-8, decoded lossily");
    }

    let doc = panic::catch_unwind(|| Html::parse_document(&text))
        .map_err(|payload| Error::ParseFailed(panic_message(payload.as_ref())))?;

    let mut records = RecordSet::new();
    for table in doc.select(&TABLE) {
        for row in table.select(&ROW) {
            let record = record_from_row(row);
            if record.is_valid() {
                records.push(record);
            }
        }
    }

    debug!(rows = records.len(), "extracted records");
    Ok(records)
}

/// Cells are assigned by position; each takes the trimmed text of its last
/// line. Cells past [`COLUMN_COUNT`] still advance the position.
fn record_from_row(row: ElementRef<'_>) -> Record {
    let mut record = Record::default();
    for (position, cell) in row.select(&CELL).enumerate() {
        let Some(column) = Column::at(position) else {
            continue;
        };
        let text: String = cell.text().collect();
        if let Some(line) = text.lines().last() {
            *record.field_mut(column) = line.trim().to_string();
        }
    }
    record
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "parser panicked".to_string()
    }
}
