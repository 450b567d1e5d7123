//! Commodities, engineering materials and micro-resources.
//!
//! One versioned store keyed by lower-cased internal name holds every item
//! family. Each item carries two counts: slot 0 for the ship hold, material
//! store or locker, slot 1 for the on-foot backpack.

use std::collections::BTreeMap;
use std::sync::Arc;

use hindsight_events::{EventRecord, InventoryTarget};
use hindsight_store::{GenerationalMap, StoreReader};
use hindsight_types::{Category, CountSlot, Generation, Holding};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::catalog::Catalog;
use crate::error::StateError;
use crate::Accumulator;

/// How a count change combines with the stored count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeMode {
    /// Replace the stored count, unclamped.
    Set,
    /// Add to the stored count, never going below zero.
    Add,
}

/// Versioned inventory of every item family.
#[derive(Debug)]
pub struct MaterialCommodityList {
    items: GenerationalMap<String, Holding>,
    catalog: Arc<Catalog>,
}

impl MaterialCommodityList {
    /// An empty inventory resolving item names through `catalog`.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            items: GenerationalMap::new(),
            catalog,
        }
    }

    /// A read-only handle for other threads.
    pub fn reader(&self) -> StoreReader<String, Holding> {
        self.items.reader()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    fn change(
        &mut self,
        category: Category,
        fd_name: &str,
        slot: CountSlot,
        amount: i32,
        mode: ChangeMode,
        price: Decimal,
    ) {
        let key = fd_name.to_lowercase();
        let mut holding = self.items.get_latest(&key).map_or_else(
            || Holding::new(self.catalog.resolve(category, &key)),
            |h| (*h).clone(),
        );

        let before = holding.count(slot);
        let after = match mode {
            ChangeMode::Set => amount,
            ChangeMode::Add => before.saturating_add(amount).max(0),
        };
        if after == before {
            return;
        }

        let bought = mode == ChangeMode::Add && slot == CountSlot::Ship && amount > 0 && after > 0;
        if bought {
            holding.price = average_price(holding.price, before, amount, price, after)
                .unwrap_or(holding.price);
        }
        if let Some(count) = holding.count_mut(slot) {
            *count = after;
        }

        trace!(item = %key, ?slot, before, after, "inventory count changed");
        self.items.put(key, holding);
    }

    /// Zero `slot` of every latest holding matching `predicate`.
    fn zero_where<P>(&mut self, slot: CountSlot, predicate: P)
    where
        P: Fn(&Holding) -> bool,
    {
        let matching = self
            .items
            .latest_values(|h| h.count(slot) > 0 && predicate(h));
        for (key, holding) in matching {
            let mut zeroed = (*holding).clone();
            if let Some(count) = zeroed.count_mut(slot) {
                *count = 0;
            }
            self.items.put(key, zeroed);
        }
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Item `fd_name` as of `generation`.
    pub fn get(&self, fd_name: &str, generation: Generation) -> Option<Arc<Holding>> {
        self.items.get(&fd_name.to_lowercase(), generation)
    }

    /// Latest version of item `fd_name`.
    pub fn latest(&self, fd_name: &str) -> Option<Arc<Holding>> {
        self.items.get_latest(&fd_name.to_lowercase())
    }

    /// Every item ever seen, as of `generation`.
    pub fn snapshot(&self, generation: Generation) -> BTreeMap<String, Arc<Holding>> {
        self.items.snapshot(generation)
    }

    /// Engineering materials as of `generation`, by category then name.
    pub fn materials_sorted(&self, generation: Generation) -> Vec<Arc<Holding>> {
        self.sorted(generation, Category::is_material)
    }

    /// Commodities as of `generation`, by name.
    pub fn commodities_sorted(&self, generation: Generation) -> Vec<Arc<Holding>> {
        self.sorted(generation, Category::is_commodity)
    }

    /// Micro-resources as of `generation`, by category then name.
    pub fn micro_resources_sorted(&self, generation: Generation) -> Vec<Arc<Holding>> {
        self.sorted(generation, Category::is_micro_resource)
    }

    fn sorted(&self, generation: Generation, family: fn(Category) -> bool) -> Vec<Arc<Holding>> {
        let mut list: Vec<Arc<Holding>> = self
            .items
            .snapshot_where(generation, |h| family(h.category()))
            .into_values()
            .collect();
        list.sort_by(|a, b| {
            a.category()
                .cmp(&b.category())
                .then_with(|| a.descriptor.name.cmp(&b.descriptor.name))
        });
        list
    }

    /// Total of `slot` across `categories` as of `generation`.
    pub fn total(&self, generation: Generation, slot: CountSlot, categories: &[Category]) -> i64 {
        self.items
            .snapshot_where(generation, |h| categories.contains(&h.category()))
            .values()
            .map(|h| i64::from(h.count(slot)))
            .fold(0_i64, i64::saturating_add)
    }

    /// Units of cargo in the ship's hold.
    pub fn cargo_count(&self, generation: Generation) -> i64 {
        self.total(generation, CountSlot::Ship, &[Category::Commodity])
    }

    /// Units of encoded data materials.
    pub fn data_count(&self, generation: Generation) -> i64 {
        self.total(generation, CountSlot::Ship, &[Category::Encoded])
    }

    /// Units of raw and manufactured materials.
    pub fn materials_count(&self, generation: Generation) -> i64 {
        self.total(
            generation,
            CountSlot::Ship,
            &[Category::Raw, Category::Manufactured],
        )
    }

    /// Units of micro-resources in the locker.
    pub fn micro_resources_count(&self, generation: Generation) -> i64 {
        self.total(generation, CountSlot::Ship, &Category::MICRO_RESOURCES)
    }

    /// Units of micro-resources in the backpack.
    pub fn backpack_count(&self, generation: Generation) -> i64 {
        self.total(generation, CountSlot::Backpack, &Category::MICRO_RESOURCES)
    }
}

/// Weighted average unit price after buying `bought` units at `unit_price`
/// on top of `held` units at `current`.
fn average_price(
    current: Decimal,
    held: i32,
    bought: i32,
    unit_price: Decimal,
    total: i32,
) -> Option<Decimal> {
    let previous_cost = Decimal::from(held).checked_mul(current)?;
    let new_cost = Decimal::from(bought).checked_mul(unit_price)?;
    previous_cost
        .checked_add(new_cost)?
        .checked_div(Decimal::from(total))
}

impl InventoryTarget for MaterialCommodityList {
    fn set_value(&mut self, category: Category, fd_name: &str, slot: CountSlot, value: i32) {
        self.change(category, fd_name, slot, value, ChangeMode::Set, Decimal::ZERO);
    }

    fn apply_delta(
        &mut self,
        category: Category,
        fd_name: &str,
        slot: CountSlot,
        delta: i32,
        price: Decimal,
    ) {
        self.change(category, fd_name, slot, delta, ChangeMode::Add, price);
    }

    fn craft(&mut self, fd_name: &str, count: i32) {
        let key = fd_name.to_lowercase();
        let Some(latest) = self.items.get_latest(&key) else {
            debug!(item = %key, "craft consumed an item never seen");
            return;
        };
        let before = latest.count(CountSlot::Ship);
        let after = before.saturating_sub(count).max(0);
        if after == before {
            return;
        }
        let mut holding = (*latest).clone();
        if let Some(c) = holding.count_mut(CountSlot::Ship) {
            *c = after;
        }
        self.items.put(key, holding);
    }

    fn clear(&mut self, slot: CountSlot, categories: &[Category]) {
        self.zero_where(slot, |h| categories.contains(&h.category()));
    }

    fn update(&mut self, category: Category, values: &[(String, i32)], slot: CountSlot) {
        let listed = |h: &Holding| {
            values
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case(&h.descriptor.fd_name))
        };
        // Held-but-unlisted is decided against the state before this listing.
        let stale: Vec<String> = self
            .items
            .latest_values(|h| h.category() == category && h.count(slot) > 0 && !listed(h))
            .into_iter()
            .map(|(key, _)| key)
            .collect();

        for (name, value) in values {
            self.set_value(category, name, slot, *value);
        }
        for key in stale {
            self.set_value(category, &key, slot, 0);
        }
    }
}

impl Accumulator for MaterialCommodityList {
    const NAME: &'static str = "inventory";

    fn process(&mut self, record: &EventRecord) -> Result<Generation, StateError> {
        if !record.affects_inventory() {
            return Ok(self.items.current_generation());
        }
        let fail = |e| StateError::store(Self::NAME, record.kind(), e);

        self.items.begin_generation().map_err(fail)?;
        if let Some(effect) = record.as_commodity() {
            effect.update_commodities(self);
        }
        if let Some(effect) = record.as_material() {
            effect.update_materials(self);
        }
        if let Some(effect) = record.as_micro_resource() {
            effect.update_micro_resources(self);
        }
        self.items.finish_generation().map_err(fail)
    }

    fn current_generation(&self) -> Generation {
        self.items.current_generation()
    }
}
