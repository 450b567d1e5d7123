//! Engineering material records.

use hindsight_types::{Category, CountSlot};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::capability::{InventoryTarget, MaterialEffect};
use crate::fields::{Fields, saturate_i32};

/// `MaterialCollected` / `MaterialDiscarded`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaterialChange {
    /// Material category; `None` if the journal named one we do not know.
    pub category: Option<Category>,
    /// Material internal name, lower-cased.
    pub name: String,
    /// Units gained (positive) or lost (negative).
    pub delta: i32,
}

impl MaterialChange {
    pub(crate) fn from_fields(f: Fields<'_>, discarded: bool) -> Self {
        let count = f.count("Count");
        Self {
            category: Category::from_name(&f.str("Category")).filter(|c| c.is_material()),
            name: f.lower("Name"),
            delta: if discarded { count.saturating_neg() } else { count },
        }
    }
}

impl MaterialEffect for MaterialChange {
    fn update_materials(&self, target: &mut dyn InventoryTarget) {
        let Some(category) = self.category else {
            debug!(material = %self.name, "material change with unknown category ignored");
            return;
        };
        target.apply_delta(category, &self.name, CountSlot::Ship, self.delta, Decimal::ZERO);
    }
}

/// `Materials`: the full material store listing, written at game start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaterialsListing {
    /// Raw materials.
    pub raw: Vec<(String, i32)>,
    /// Manufactured materials.
    pub manufactured: Vec<(String, i32)>,
    /// Encoded materials.
    pub encoded: Vec<(String, i32)>,
}

impl MaterialsListing {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        let list = |key: &str| -> Vec<(String, i32)> {
            f.objects(key)
                .map(|m| (m.lower("Name"), m.count("Count")))
                .collect()
        };
        Self {
            raw: list("Raw"),
            manufactured: list("Manufactured"),
            encoded: list("Encoded"),
        }
    }
}

impl MaterialEffect for MaterialsListing {
    fn update_materials(&self, target: &mut dyn InventoryTarget) {
        target.update(Category::Raw, &self.raw, CountSlot::Ship);
        target.update(Category::Manufactured, &self.manufactured, CountSlot::Ship);
        target.update(Category::Encoded, &self.encoded, CountSlot::Ship);
    }
}

/// `EngineerCraft`: an engineer consumed materials for a modification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineerCraft {
    /// Engineer name.
    pub engineer: String,
    /// Blueprint name.
    pub blueprint: String,
    /// Lower-cased material names and units consumed.
    pub ingredients: Vec<(String, i32)>,
}

impl EngineerCraft {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        // Old journals write `{ "iron": 2 }`, newer ones `[{ "Name": "iron", "Count": 2 }]`.
        let ingredients = match f.get("Ingredients") {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(name, count)| {
                    let count = count.as_i64().map_or(0, saturate_i32);
                    (name.to_lowercase(), count)
                })
                .collect(),
            _ => f
                .objects("Ingredients")
                .map(|i| (i.lower("Name"), i.count("Count")))
                .collect(),
        };
        Self {
            engineer: f.str("Engineer"),
            blueprint: f.str("Blueprint"),
            ingredients,
        }
    }
}

impl MaterialEffect for EngineerCraft {
    fn update_materials(&self, target: &mut dyn InventoryTarget) {
        for (name, count) in &self.ingredients {
            target.craft(name, *count);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn discard_is_negative() {
        let doc = json!({ "Category": "Raw", "Name": "Iron", "Count": 3 });
        let change = Fields::of(&doc).map(|f| MaterialChange::from_fields(f, true)).unwrap_or_default();
        assert_eq!(change.category, Some(Category::Raw));
        assert_eq!(change.name, "iron");
        assert_eq!(change.delta, -3);
    }

    #[test]
    fn non_material_category_is_rejected() {
        let doc = json!({ "Category": "Commodity", "Name": "Gold", "Count": 1 });
        let change = Fields::of(&doc).map(|f| MaterialChange::from_fields(f, false)).unwrap_or_default();
        assert_eq!(change.category, None);
    }

    #[test]
    fn craft_ingredients_in_both_layouts() {
        let old = json!({ "Ingredients": { "Iron": 2, "Nickel": 1 } });
        let new = json!({ "Ingredients": [ { "Name": "Iron", "Count": 2 }, { "Name": "Nickel", "Count": 1 } ] });
        let a = Fields::of(&old).map(EngineerCraft::from_fields).unwrap_or_default();
        let b = Fields::of(&new).map(EngineerCraft::from_fields).unwrap_or_default();
        assert_eq!(a.ingredients, b.ingredients);
        assert_eq!(a.ingredients.len(), 2);
    }
}
