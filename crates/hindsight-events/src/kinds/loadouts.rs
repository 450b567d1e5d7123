//! Suit loadout records.
//!
//! `SuitLoadout` (written whenever the commander changes loadout, including
//! at game start) and `CreateSuitLoadout` carry the same full description of
//! a loadout; they differ in what they do with it.

use hindsight_types::{LoadoutId, LoadoutModule, SuitId, SuitModuleId};

use crate::capability::{EventHeader, LoadoutEffect, LoadoutTarget, SuitEffect, SuitTarget};
use crate::fields::Fields;

fn module_from_fields(f: Fields<'_>) -> LoadoutModule {
    LoadoutModule {
        slot_name: f.lower("SlotName"),
        suit_module_id: SuitModuleId(f.u64("SuitModuleID")),
        module_name: f.lower("ModuleName"),
        module_name_localised: f.str("ModuleName_Localised"),
    }
}

/// Full description of a loadout as written in journal records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadoutDetails {
    /// Suit the loadout is built on.
    pub suit_id: SuitId,
    /// Suit type internal name, lower-cased.
    pub suit_name: String,
    /// Localised suit name.
    pub suit_name_localised: String,
    /// Loadout identifier.
    pub loadout_id: LoadoutId,
    /// Loadout name.
    pub loadout_name: String,
    /// Fitted modules.
    pub modules: Vec<LoadoutModule>,
}

impl LoadoutDetails {
    fn from_fields(f: Fields<'_>) -> Self {
        Self {
            suit_id: SuitId(f.u64("SuitID")),
            suit_name: f.lower("SuitName"),
            suit_name_localised: f.str("SuitName_Localised"),
            loadout_id: LoadoutId(f.u64("LoadoutID")),
            loadout_name: f.str("LoadoutName"),
            modules: f.objects("Modules").map(module_from_fields).collect(),
        }
    }

    fn create(&self, header: EventHeader, target: &mut dyn LoadoutTarget) {
        target.create(
            header.timestamp,
            self.loadout_id,
            &self.loadout_name,
            self.suit_id,
            &self.modules,
        );
    }
}

/// `SuitLoadout`: the commander is now using this suit and loadout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadoutActivation {
    /// The loadout now in use.
    pub details: LoadoutDetails,
}

impl LoadoutActivation {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        Self {
            details: LoadoutDetails::from_fields(f),
        }
    }
}

impl SuitEffect for LoadoutActivation {
    fn update_suits(&self, header: EventHeader, target: &mut dyn SuitTarget) {
        target.switch_to(header.timestamp, self.details.suit_id);
    }
}

impl LoadoutEffect for LoadoutActivation {
    fn update_loadouts(&self, header: EventHeader, target: &mut dyn LoadoutTarget) {
        // Loadouts created before the journal began first appear here.
        if !target.has_loadout(self.details.loadout_id) {
            self.details.create(header, target);
        }
        target.switch_to(header.timestamp, self.details.loadout_id);
    }
}

/// `CreateSuitLoadout`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadoutCreation {
    /// The new loadout.
    pub details: LoadoutDetails,
}

impl LoadoutCreation {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        Self {
            details: LoadoutDetails::from_fields(f),
        }
    }
}

impl LoadoutEffect for LoadoutCreation {
    fn update_loadouts(&self, header: EventHeader, target: &mut dyn LoadoutTarget) {
        self.details.create(header, target);
    }
}

/// `DeleteSuitLoadout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadoutDeletion {
    /// Suit the loadout was built on.
    pub suit_id: SuitId,
    /// Deleted loadout.
    pub loadout_id: LoadoutId,
}

impl LoadoutDeletion {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        Self {
            suit_id: SuitId(f.u64("SuitID")),
            loadout_id: LoadoutId(f.u64("LoadoutID")),
        }
    }
}

impl LoadoutEffect for LoadoutDeletion {
    fn update_loadouts(&self, header: EventHeader, target: &mut dyn LoadoutTarget) {
        target.delete(header.timestamp, self.loadout_id);
    }
}

/// `RenameSuitLoadout`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadoutRename {
    /// Renamed loadout.
    pub loadout_id: LoadoutId,
    /// The new name.
    pub loadout_name: String,
}

impl LoadoutRename {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        Self {
            loadout_id: LoadoutId(f.u64("LoadoutID")),
            loadout_name: f.str("LoadoutName"),
        }
    }
}

impl LoadoutEffect for LoadoutRename {
    fn update_loadouts(&self, header: EventHeader, target: &mut dyn LoadoutTarget) {
        target.rename(header.timestamp, self.loadout_id, &self.loadout_name);
    }
}

/// `LoadoutEquipModule`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleEquip {
    /// Loadout being changed.
    pub loadout_id: LoadoutId,
    /// The module and the slot it goes in.
    pub module: LoadoutModule,
}

impl ModuleEquip {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        Self {
            loadout_id: LoadoutId(f.u64("LoadoutID")),
            module: module_from_fields(f),
        }
    }
}

impl LoadoutEffect for ModuleEquip {
    fn update_loadouts(&self, header: EventHeader, target: &mut dyn LoadoutTarget) {
        target.equip(header.timestamp, self.loadout_id, self.module.clone());
    }
}

/// `LoadoutRemoveModule`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleRemoval {
    /// Loadout being changed.
    pub loadout_id: LoadoutId,
    /// Slot emptied, lower-cased.
    pub slot_name: String,
    /// Module taken out, lower-cased.
    pub module_name: String,
}

impl ModuleRemoval {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        Self {
            loadout_id: LoadoutId(f.u64("LoadoutID")),
            slot_name: f.lower("SlotName"),
            module_name: f.lower("ModuleName"),
        }
    }
}

impl LoadoutEffect for ModuleRemoval {
    fn update_loadouts(&self, header: EventHeader, target: &mut dyn LoadoutTarget) {
        target.remove(header.timestamp, self.loadout_id, &self.slot_name);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn loadout_modules_are_normalised() {
        let doc = json!({
            "SuitID": 1700, "SuitName": "UtilitySuit_Class1", "LoadoutID": 4293000001_u64,
            "LoadoutName": "Dom",
            "Modules": [
                { "SlotName": "PrimaryWeapon1", "SuitModuleID": 1701, "ModuleName": "Wpn_M_AssaultRifle_Kinetic_FAuto", "ModuleName_Localised": "Karma AR-50" }
            ]
        });
        let details = Fields::of(&doc).map(LoadoutDetails::from_fields).unwrap_or_default();
        assert_eq!(details.suit_name, "utilitysuit_class1");
        assert_eq!(details.loadout_id, LoadoutId(4_293_000_001));
        let module = details.modules.first().cloned().unwrap_or_default();
        assert_eq!(module.slot_name, "primaryweapon1");
        assert_eq!(module.module_name, "wpn_m_assaultrifle_kinetic_fauto");
        assert_eq!(module.module_name_localised, "Karma AR-50");
    }
}
