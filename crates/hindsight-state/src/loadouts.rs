//! Suit loadouts.
//!
//! A loadout is versioned as one unit: fitting or removing a module clones
//! the whole loadout, slot map included, and appends the clone.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hindsight_events::{EventRecord, LoadoutTarget};
use hindsight_store::{GenerationalMap, StoreReader};
use hindsight_types::{Generation, LoadoutId, LoadoutModule, SuitId, SuitLoadout};
use tracing::{debug, warn};

use crate::Accumulator;
use crate::error::StateError;

/// Store key for the loadout list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadoutKey {
    /// Marker recording which loadout is in use.
    Current,
    /// A loadout.
    Loadout(LoadoutId),
}

/// Versioned list of suit loadouts, including deleted ones.
#[derive(Debug, Default)]
pub struct SuitLoadoutList {
    loadouts: GenerationalMap<LoadoutKey, SuitLoadout>,
}

impl SuitLoadoutList {
    /// An empty loadout list.
    pub fn new() -> Self {
        Self::default()
    }

    /// A read-only handle for other threads.
    pub fn reader(&self) -> StoreReader<LoadoutKey, SuitLoadout> {
        self.loadouts.reader()
    }

    fn by_id<P>(&self, generation: Generation, predicate: P) -> BTreeMap<LoadoutId, Arc<SuitLoadout>>
    where
        P: Fn(&SuitLoadout) -> bool,
    {
        self.loadouts
            .snapshot_where(generation, predicate)
            .into_iter()
            .filter_map(|(key, loadout)| match key {
                LoadoutKey::Loadout(id) => Some((id, loadout)),
                LoadoutKey::Current => None,
            })
            .collect()
    }

    /// Every loadout ever created as of `generation`, deleted ones included.
    pub fn loadouts(&self, generation: Generation) -> BTreeMap<LoadoutId, Arc<SuitLoadout>> {
        self.by_id(generation, |_| true)
    }

    /// Live loadouts built on `suit_id` as of `generation`.
    pub fn loadouts_for_suit(
        &self,
        generation: Generation,
        suit_id: SuitId,
    ) -> BTreeMap<LoadoutId, Arc<SuitLoadout>> {
        self.by_id(generation, |l| l.suit_id == suit_id && !l.deleted)
    }

    /// Loadout `id` as of `generation`.
    pub fn loadout(&self, id: LoadoutId, generation: Generation) -> Option<Arc<SuitLoadout>> {
        self.loadouts.get(&LoadoutKey::Loadout(id), generation)
    }

    /// The loadout in use as of `generation`.
    pub fn current_id(&self, generation: Generation) -> Option<LoadoutId> {
        self.loadouts
            .get(&LoadoutKey::Current, generation)
            .map(|marker| marker.id)
    }

    /// Clone the latest version of `id`, apply `edit`, and append the clone
    /// if anything changed.
    fn amend<F>(&mut self, time: DateTime<Utc>, id: LoadoutId, action: &'static str, edit: F)
    where
        F: FnOnce(&mut SuitLoadout),
    {
        let key = LoadoutKey::Loadout(id);
        let Some(last) = self.loadouts.get_latest(&key) else {
            warn!(loadout = %id, action, "change to a loadout never seen");
            return;
        };
        let mut next = (*last).clone();
        edit(&mut next);
        if next == *last {
            debug!(loadout = %id, action, "loadout change had no effect");
            return;
        }
        next.event_time = time;
        self.loadouts.put(key, next);
    }
}

impl LoadoutTarget for SuitLoadoutList {
    fn has_loadout(&self, id: LoadoutId) -> bool {
        self.loadouts.contains_key(&LoadoutKey::Loadout(id))
    }

    fn create(
        &mut self,
        time: DateTime<Utc>,
        id: LoadoutId,
        name: &str,
        suit_id: SuitId,
        modules: &[LoadoutModule],
    ) {
        let loadout = SuitLoadout {
            event_time: time,
            id,
            suit_id,
            name: String::from(name),
            deleted: false,
            modules: modules
                .iter()
                .map(|m| (m.slot_name.clone(), m.clone()))
                .collect(),
        };
        self.loadouts.put(LoadoutKey::Loadout(id), loadout);
    }

    fn delete(&mut self, time: DateTime<Utc>, id: LoadoutId) {
        if self
            .loadouts
            .get_latest(&LoadoutKey::Loadout(id))
            .is_some_and(|l| l.deleted)
        {
            warn!(loadout = %id, "deleted a loadout already deleted");
            return;
        }
        self.amend(time, id, "delete", |l| l.deleted = true);
    }

    fn delete_for_suit(&mut self, time: DateTime<Utc>, suit_id: SuitId) {
        let owned = self
            .loadouts
            .latest_values(|l| !l.deleted && l.suit_id == suit_id);
        for (key, _) in owned {
            if let LoadoutKey::Loadout(id) = key {
                self.delete(time, id);
            }
        }
    }

    fn equip(&mut self, time: DateTime<Utc>, id: LoadoutId, module: LoadoutModule) {
        self.amend(time, id, "equip", |l| {
            l.modules.insert(module.slot_name.clone(), module);
        });
    }

    fn remove(&mut self, time: DateTime<Utc>, id: LoadoutId, slot_name: &str) {
        self.amend(time, id, "remove", |l| {
            l.modules.remove(slot_name);
        });
    }

    fn rename(&mut self, time: DateTime<Utc>, id: LoadoutId, name: &str) {
        self.amend(time, id, "rename", |l| l.name = String::from(name));
    }

    fn switch_to(&mut self, time: DateTime<Utc>, id: LoadoutId) {
        if self
            .loadouts
            .get_latest(&LoadoutKey::Current)
            .is_some_and(|m| m.id == id)
        {
            return;
        }
        self.loadouts
            .put(LoadoutKey::Current, SuitLoadout::marker(time, id));
    }
}

impl Accumulator for SuitLoadoutList {
    const NAME: &'static str = "loadouts";

    fn process(&mut self, record: &EventRecord) -> Result<Generation, StateError> {
        let Some(effect) = record.as_loadout() else {
            return Ok(self.loadouts.current_generation());
        };
        let fail = |e| StateError::store(Self::NAME, record.kind(), e);

        self.loadouts.begin_generation().map_err(fail)?;
        effect.update_loadouts(record.header(), self);
        self.loadouts.finish_generation().map_err(fail)
    }

    fn current_generation(&self) -> Generation {
        self.loadouts.current_generation()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hindsight_events::decode;

    use super::*;

    const CREATE: &str = r#"{"timestamp":"2021-05-20T18:00:00Z","event":"CreateSuitLoadout","SuitID":1700,"SuitName":"UtilitySuit_Class1","LoadoutID":4293000001,"LoadoutName":"Dom","Modules":[{"SlotName":"PrimaryWeapon1","SuitModuleID":1701,"ModuleName":"Wpn_M_AssaultRifle_Kinetic_FAuto","ModuleName_Localised":"Karma AR-50"}]}"#;
    const EQUIP: &str = r#"{"timestamp":"2021-05-20T18:05:00Z","event":"LoadoutEquipModule","LoadoutName":"Dom","SuitID":1700,"LoadoutID":4293000001,"SlotName":"SecondaryWeapon","ModuleName":"Wpn_S_Pistol_Kinetic_SAuto","ModuleName_Localised":"Karma P-15","SuitModuleID":1702}"#;
    const REMOVE: &str = r#"{"timestamp":"2021-05-20T18:06:00Z","event":"LoadoutRemoveModule","LoadoutID":4293000001,"SlotName":"PrimaryWeapon1","ModuleName":"Wpn_M_AssaultRifle_Kinetic_FAuto"}"#;
    const RENAME: &str = r#"{"timestamp":"2021-05-20T18:07:00Z","event":"RenameSuitLoadout","LoadoutID":4293000001,"LoadoutName":"Sneaky"}"#;
    const DELETE: &str = r#"{"timestamp":"2021-05-20T18:08:00Z","event":"DeleteSuitLoadout","SuitID":1700,"LoadoutID":4293000001}"#;
    const SELL: &str = r#"{"timestamp":"2021-05-20T18:09:00Z","event":"SellSuit","SuitID":1700,"Price":1}"#;
    const ACTIVATE: &str = r#"{"timestamp":"2021-05-20T17:00:00Z","event":"SuitLoadout","SuitID":1800,"SuitName":"ExplorationSuit_Class1","LoadoutID":4293000009,"LoadoutName":"Scout","Modules":[]}"#;

    const ID: LoadoutId = LoadoutId(4_293_000_001);

    #[test]
    fn module_changes_clone_the_whole_loadout() {
        let mut list = SuitLoadoutList::new();
        let created = list.process(&decode(CREATE)).unwrap();
        let equipped = list.process(&decode(EQUIP)).unwrap();
        let removed = list.process(&decode(REMOVE)).unwrap();

        let slots = |g| -> Vec<String> {
            list.loadout(ID, g).unwrap().modules.keys().cloned().collect()
        };
        assert_eq!(slots(created), vec!["primaryweapon1"]);
        assert_eq!(slots(equipped), vec!["primaryweapon1", "secondaryweapon"]);
        assert_eq!(slots(removed), vec!["secondaryweapon"]);
    }

    #[test]
    fn rename_and_delete() {
        let mut list = SuitLoadoutList::new();
        list.process(&decode(CREATE)).unwrap();
        let renamed = list.process(&decode(RENAME)).unwrap();
        let deleted = list.process(&decode(DELETE)).unwrap();

        assert_eq!(list.loadout(ID, renamed).unwrap().name, "Sneaky");
        assert!(list.loadout(ID, deleted).unwrap().deleted);
        assert_eq!(list.loadouts(deleted).len(), 1);
        assert!(list.loadouts_for_suit(deleted, SuitId(1700)).is_empty());
        assert_eq!(list.loadouts_for_suit(renamed, SuitId(1700)).len(), 1);

        // A second delete is a no-op.
        assert_eq!(list.process(&decode(DELETE)).unwrap(), deleted);
    }

    #[test]
    fn selling_suit_deletes_its_loadouts() {
        let mut list = SuitLoadoutList::new();
        list.process(&decode(CREATE)).unwrap();
        list.process(&decode(ACTIVATE)).unwrap();
        let g = list.process(&decode(SELL)).unwrap();
        assert!(list.loadouts_for_suit(g, SuitId(1700)).is_empty());
        assert_eq!(list.loadouts_for_suit(g, SuitId(1800)).len(), 1);
    }

    #[test]
    fn unnamed_loadout_is_listed_and_deleted_with_its_suit() {
        const UNNAMED: &str = r#"{"timestamp":"2021-05-20T18:00:00Z","event":"CreateSuitLoadout","SuitID":1700,"SuitName":"UtilitySuit_Class1","LoadoutID":4293000001,"Modules":[]}"#;
        let mut list = SuitLoadoutList::new();
        let created = list.process(&decode(UNNAMED)).unwrap();
        assert_eq!(created, Generation(1));
        assert_eq!(list.loadouts(created).len(), 1);
        assert_eq!(list.loadouts_for_suit(created, SuitId(1700)).len(), 1);

        let sold = list.process(&decode(SELL)).unwrap();
        assert_eq!(sold, Generation(2));
        assert!(list.loadout(ID, sold).unwrap().deleted);
        assert!(list.loadouts_for_suit(sold, SuitId(1700)).is_empty());
    }

    #[test]
    fn current_marker_is_not_listed_as_a_loadout() {
        let mut list = SuitLoadoutList::new();
        let g = list.process(&decode(ACTIVATE)).unwrap();
        assert_eq!(list.loadouts(g).keys().copied().collect::<Vec<_>>(), vec![LoadoutId(4_293_000_009)]);
    }

    #[test]
    fn activation_creates_unseen_loadout_and_switches() {
        let mut list = SuitLoadoutList::new();
        let g = list.process(&decode(ACTIVATE)).unwrap();
        assert_eq!(g, Generation(1));
        assert_eq!(list.current_id(g), Some(LoadoutId(4_293_000_009)));
        assert_eq!(list.loadout(LoadoutId(4_293_000_009), g).unwrap().name, "Scout");

        // Same loadout again: nothing to record.
        assert_eq!(list.process(&decode(ACTIVATE)).unwrap(), g);
    }

    #[test]
    fn equip_on_unknown_loadout_is_ignored() {
        let mut list = SuitLoadoutList::new();
        assert_eq!(list.process(&decode(EQUIP)).unwrap(), Generation::ZERO);
    }
}
