//! Production-order quantity matrices.
//!
//! The order-entry side produces a color × size quantity matrix; the forecast
//! resolver consumes it. The core compares size labels purely as strings -
//! translating a numeric size scheme into canonical labels is the caller's
//! job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Size label scheme tag supplied by the order source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeFormat {
    /// Letter sizes (XS..XXL plus free-form extensions).
    #[default]
    Standard,
    /// Numeric sizes (waist/length, EU sizes, ...).
    Numeric,
}

impl SizeFormat {
    /// Canonical string form, matching the serde representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Numeric => "numeric",
        }
    }
}

impl std::fmt::Display for SizeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SizeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "numeric" => Ok(Self::Numeric),
            other => Err(format!("unknown size format: {other}")),
        }
    }
}

/// One color row of an order: per-size unit counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityRow {
    /// Color label.
    pub color: String,
    /// Units ordered per size label.
    pub per_size_qty: BTreeMap<String, u32>,
}

impl QuantityRow {
    /// Create a row from `(size, qty)` pairs.
    #[must_use]
    pub fn new(color: impl Into<String>, quantities: &[(&str, u32)]) -> Self {
        Self {
            color: color.into(),
            per_size_qty: quantities
                .iter()
                .map(|(size, qty)| ((*size).to_owned(), *qty))
                .collect(),
        }
    }

    /// Total units across every size of this row.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.per_size_qty.values().map(|qty| u64::from(*qty)).sum()
    }

    /// Total units at exactly the given size labels. Labels absent from the
    /// row count zero; row sizes outside `sizes` are not counted.
    #[must_use]
    pub fn total_at_sizes<S: AsRef<str>>(&self, sizes: &[S]) -> u64 {
        let mut seen: Vec<&str> = Vec::with_capacity(sizes.len());
        let mut total = 0_u64;
        for size in sizes {
            let label = size.as_ref();
            // A duplicated label in the scope still counts each row cell once.
            if seen.contains(&label) {
                continue;
            }
            seen.push(label);
            total += u64::from(self.per_size_qty.get(label).copied().unwrap_or(0));
        }
        total
    }
}

/// The color × size quantity matrix of one production order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderQuantityMatrix(pub Vec<QuantityRow>);

impl OrderQuantityMatrix {
    /// Rows whose color is one of the given labels.
    pub fn rows_for_colors<'a, S: AsRef<str>>(
        &'a self,
        colors: &'a [S],
    ) -> impl Iterator<Item = &'a QuantityRow> {
        self.0
            .iter()
            .filter(|row| colors.iter().any(|color| color.as_ref() == row.color))
    }

    /// Total units across the whole order.
    #[must_use]
    pub fn grand_total(&self) -> u64 {
        self.0.iter().map(QuantityRow::total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_total() {
        let row = QuantityRow::new("Red", &[("S", 4), ("M", 6), ("L", 10)]);
        assert_eq!(row.total(), 20);
    }

    #[test]
    fn test_total_at_sizes_excludes_other_sizes() {
        let row = QuantityRow::new("Red", &[("S", 4), ("M", 6), ("L", 10)]);
        assert_eq!(row.total_at_sizes(&["S", "M"]), 10);
        assert_eq!(row.total_at_sizes(&["XL"]), 0);
    }

    #[test]
    fn test_total_at_sizes_ignores_duplicate_labels() {
        let row = QuantityRow::new("Red", &[("S", 4)]);
        assert_eq!(row.total_at_sizes(&["S", "S"]), 4);
    }

    #[test]
    fn test_grand_total_spans_rows() {
        let matrix = OrderQuantityMatrix(vec![
            QuantityRow::new("Red", &[("S", 10), ("M", 10)]),
            QuantityRow::new("Blue", &[("S", 5), ("L", 5)]),
        ]);
        assert_eq!(matrix.grand_total(), 30);
    }

    #[test]
    fn test_rows_for_colors_filters() {
        let matrix = OrderQuantityMatrix(vec![
            QuantityRow::new("Red", &[("S", 1)]),
            QuantityRow::new("Blue", &[("S", 2)]),
            QuantityRow::new("Green", &[("S", 3)]),
        ]);

        let matched: Vec<&str> = matrix
            .rows_for_colors(&["Red", "Green"])
            .map(|row| row.color.as_str())
            .collect();
        assert_eq!(matched, vec!["Red", "Green"]);
    }
}
