// src/publish.rs

use tracing::error;

use crate::error::Result;
use crate::extract::RecordSet;

/// What goes on the wire when serialization cannot produce anything better.
pub const EMPTY_ARRAY: &[u8] = b"[]";

/// Serialize records as a JSON array. Serialization errors are logged and
/// replaced by an empty array so the response is always valid JSON.
pub fn publish(records: &RecordSet) -> Vec<u8> {
    match try_publish(records) {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, rows = records.len(), "json serialization failed");
            EMPTY_ARRAY.to_vec()
        }
    }
}

pub fn try_publish(records: &RecordSet) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract, Record};
    use serde_json::Value;

    #[test]
    fn test_empty_set_is_empty_array() {
        assert_eq!(publish(&RecordSet::new()), b"[]");
    }

    #[test]
    fn test_keys_and_order() {
        let records = vec![
            Record {
                name: "ACME".into(),
                deal: "buy".into(),
                price: "10.5".into(),
                volume: "1000".into(),
                change: "+1.2".into(),
            },
            Record {
                name: "Globex".into(),
                ..Default::default()
            },
        ];
        let body = publish(&records);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"[{"name":"ACME","deal":"buy","price":"10.5","volume":"1000","change":"+1.2"},{"name":"Globex","deal":"","price":"","volume":"","change":""}]"#
        );
    }

    #[test]
    fn test_extract_then_publish() {
        let html = "<table>\
            <tr><th>Name</th><th>Deal</th></tr>\
            <tr><td>ACME</td><td>buy</td><td>10.5</td><td>1000</td><td>+1.2</td></tr>\
            <tr><td></td><td>x</td><td>y</td></tr>\
            <tr><td>Globex</td><td>sell</td><td>3</td><td>7</td><td>-0.4</td><td>extra</td></tr>\
            </table>";
        let body = publish(&extract(html.as_bytes()));

        let parsed: Value = serde_json::from_slice(&body).unwrap();
        let rows = parsed.as_array().expect("top level should be an array");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "ACME");
        assert_eq!(rows[0]["change"], "+1.2");
        assert_eq!(rows[1]["name"], "Globex");
        assert_eq!(rows[1]["change"], "-0.4");
        assert_eq!(rows[1].as_object().unwrap().len(), 5);

        let back: Vec<Record> = serde_json::from_slice(&body).unwrap();
        assert_eq!(back, extract(html.as_bytes()));
    }

    #[test]
    fn test_no_table_publishes_empty_array() {
        let body = publish(&extract(b"<html><body>closed today</body></html>"));
        assert_eq!(body, EMPTY_ARRAY);
    }
}
