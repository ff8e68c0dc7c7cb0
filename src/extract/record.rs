// src/extract/record.rs

use serde::{Deserialize, Serialize};

/// Number of leading cells in a row that map onto record fields.
pub const COLUMN_COUNT: usize = 5;

/// Positional meaning of a table cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Deal,
    Price,
    Volume,
    Change,
}

impl Column {
    /// Cell position → column. Index is the 0-based position within the row.
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Name,
        Column::Deal,
        Column::Price,
        Column::Volume,
        Column::Change,
    ];

    /// Column for the cell at `position`, or `None` for positions past the
    /// mapped range.
    pub fn at(position: usize) -> Option<Self> {
        Self::ALL.get(position).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Deal => "deal",
            Column::Price => "price",
            Column::Volume => "volume",
            Column::Change => "change",
        }
    }
}

/// One market-data row. Fields are opaque text; absent cells stay empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub deal: String,
    pub price: String,
    pub volume: String,
    pub change: String,
}

impl Record {
    pub fn field(&self, column: Column) -> &str {
        match column {
            Column::Name => &self.name,
            Column::Deal => &self.deal,
            Column::Price => &self.price,
            Column::Volume => &self.volume,
            Column::Change => &self.change,
        }
    }

    pub fn field_mut(&mut self, column: Column) -> &mut String {
        match column {
            Column::Name => &mut self.name,
            Column::Deal => &mut self.deal,
            Column::Price => &mut self.price,
            Column::Volume => &mut self.volume,
            Column::Change => &mut self.change,
        }
    }

    /// A record is kept only when it has a name.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Valid records in document row order.
pub type RecordSet = Vec<Record>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_positions() {
        assert_eq!(Column::at(0), Some(Column::Name));
        assert_eq!(Column::at(4), Some(Column::Change));
        assert_eq!(Column::at(COLUMN_COUNT), None);
        assert_eq!(Column::at(42), None);
    }

    #[test]
    fn test_field_mut_targets_matching_field() {
        let mut r = Record::default();
        for column in Column::ALL {
            *r.field_mut(column) = column.as_str().to_uppercase();
        }
        assert_eq!(r.name, "NAME");
        assert_eq!(r.deal, "DEAL");
        assert_eq!(r.price, "PRICE");
        assert_eq!(r.volume, "VOLUME");
        assert_eq!(r.change, "CHANGE");
        assert_eq!(r.field(Column::Price), "PRICE");
    }

    #[test]
    fn test_validity_depends_on_name_only() {
        let mut r = Record {
            deal: "buy".into(),
            ..Default::default()
        };
        assert!(!r.is_valid());
        r.name = "ACME".into();
        assert!(r.is_valid());
    }
}
