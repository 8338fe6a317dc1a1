//! Consumption rules: converting produced quantities into material requirements.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a consumption ratio relates produced units to required material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionMethod {
    /// Required = produced × ratio (e.g., 4 buttons per garment).
    ItemsPerUnit,
    /// Required = produced ÷ ratio (e.g., one fabric roll covers 50 garments).
    UnitsPerItem,
}

/// A quantitative consumption rule attached to an instruction.
///
/// Absence of a rule means the instruction carries no quantitative forecast,
/// only descriptive text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionRule {
    /// Ratio semantics.
    pub method: ConsumptionMethod,
    /// The ratio itself. Interpretation depends on `method`.
    pub ratio: Decimal,
}

impl ConsumptionRule {
    /// Create a new consumption rule.
    #[must_use]
    pub const fn new(method: ConsumptionMethod, ratio: Decimal) -> Self {
        Self { method, ratio }
    }

    /// Resolve a produced quantity into a required material quantity.
    ///
    /// Returns `None` for a `UnitsPerItem` rule with a zero ratio: the rule
    /// cannot produce a quantity, and the caller skips the line rather than
    /// dividing by zero.
    #[must_use]
    pub fn required_for(&self, produced_qty: u64) -> Option<Decimal> {
        let qty = Decimal::from(produced_qty);
        match self.method {
            ConsumptionMethod::ItemsPerUnit => Some(qty * self.ratio),
            ConsumptionMethod::UnitsPerItem => {
                if self.ratio.is_zero() {
                    None
                } else {
                    Some(qty / self.ratio)
                }
            }
        }
    }
}
