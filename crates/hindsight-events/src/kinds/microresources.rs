//! On-foot micro-resource records.

use hindsight_types::{Category, CountSlot};
use rust_decimal::Decimal;
use tracing::debug;

use crate::capability::{InventoryTarget, MicroResourceEffect};
use crate::fields::Fields;

/// `CollectItems` / `DropItems`: goods moved into or out of the backpack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackpackTransfer {
    /// Micro-resource category; `None` if not recognised.
    pub category: Option<Category>,
    /// Internal name, lower-cased.
    pub name: String,
    /// Localised name.
    pub name_localised: String,
    /// Units gained (positive) or lost (negative).
    pub delta: i32,
    /// Whether the goods were stolen.
    pub stolen: bool,
}

impl BackpackTransfer {
    pub(crate) fn from_fields(f: Fields<'_>, dropped: bool) -> Self {
        let count = f.count("Count");
        Self {
            category: Category::from_name(&f.str("Type")).filter(|c| c.is_micro_resource()),
            name: f.lower("Name"),
            name_localised: f.str("Name_Localised"),
            delta: if dropped { count.saturating_neg() } else { count },
            stolen: f.bool("Stolen"),
        }
    }
}

impl MicroResourceEffect for BackpackTransfer {
    fn update_micro_resources(&self, target: &mut dyn InventoryTarget) {
        let Some(category) = self.category else {
            debug!(item = %self.name, "backpack transfer with unknown category ignored");
            return;
        };
        target.apply_delta(category, &self.name, CountSlot::Backpack, self.delta, Decimal::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decorated_category_is_understood() {
        let doc = json!({ "Name": "HealthPack", "Type": "Consumable", "Count": 2 });
        let t = Fields::of(&doc).map(|f| BackpackTransfer::from_fields(f, true)).unwrap_or_default();
        assert_eq!(t.category, Some(Category::Consumable));
        assert_eq!(t.delta, -2);

        let doc = json!({ "Name": "x", "Type": "$MICRORESOURCE_CATEGORY_Data;", "Count": 1 });
        let t = Fields::of(&doc).map(|f| BackpackTransfer::from_fields(f, false)).unwrap_or_default();
        assert_eq!(t.category, Some(Category::Data));
    }
}
