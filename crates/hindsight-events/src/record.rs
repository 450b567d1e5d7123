//! The decoded journal record.

use chrono::{DateTime, Utc};
use hindsight_types::EventKind;
use serde_json::Value;

use crate::capability::{
    CommodityEffect, EventHeader, LedgerEffect, LoadoutEffect, MaterialEffect, MicroResourceEffect,
    SuitEffect,
};
use crate::kinds::{
    BackpackTransfer, Booking, BuySuit, Cancellation, Cargo, Died, EjectCargo, EngineerCraft,
    LoadoutActivation, LoadoutCreation, LoadoutDeletion, LoadoutRename, MarketTrade,
    MaterialChange, MaterialsListing, ModuleEquip, ModuleRemoval, Resurrect, SellSuit,
};

/// Kind-specific content of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// `Died`.
    Died(Died),
    /// `SelfDestruct`.
    SelfDestruct,
    /// `Resurrect`.
    Resurrect(Resurrect),
    /// `BookTaxi`.
    BookTaxi(Booking),
    /// `CancelTaxi`.
    CancelTaxi(Cancellation),
    /// `BookDropship`.
    BookDropship(Booking),
    /// `CancelDropship`.
    CancelDropship(Cancellation),
    /// `DropshipDeploy`.
    DropshipDeploy,
    /// `MarketBuy`.
    MarketBuy(MarketTrade),
    /// `MarketSell`.
    MarketSell(MarketTrade),
    /// `EjectCargo`.
    EjectCargo(EjectCargo),
    /// `Cargo`.
    Cargo(Cargo),
    /// `MaterialCollected`.
    MaterialCollected(MaterialChange),
    /// `MaterialDiscarded`.
    MaterialDiscarded(MaterialChange),
    /// `Materials`.
    Materials(MaterialsListing),
    /// `EngineerCraft`.
    EngineerCraft(EngineerCraft),
    /// `CollectItems`.
    CollectItems(BackpackTransfer),
    /// `DropItems`.
    DropItems(BackpackTransfer),
    /// `BuySuit`.
    BuySuit(BuySuit),
    /// `SellSuit`.
    SellSuit(SellSuit),
    /// `SuitLoadout`.
    SuitLoadout(LoadoutActivation),
    /// `CreateSuitLoadout`.
    CreateSuitLoadout(LoadoutCreation),
    /// `DeleteSuitLoadout`.
    DeleteSuitLoadout(LoadoutDeletion),
    /// `RenameSuitLoadout`.
    RenameSuitLoadout(LoadoutRename),
    /// `LoadoutEquipModule`.
    LoadoutEquipModule(ModuleEquip),
    /// `LoadoutRemoveModule`.
    LoadoutRemoveModule(ModuleRemoval),
    /// Well-formed record of a kind nobody registered.
    Unknown,
    /// Input that did not decode.
    Malformed,
}

/// An immutable, decoded journal record.
///
/// The raw text is kept byte-for-byte so the record can be re-persisted or
/// re-decoded. The parsed document is kept alongside the typed payload for
/// equivalence checks and for consumers interested in fields the payload
/// does not model.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    header: EventHeader,
    raw: String,
    document: Value,
    payload: Payload,
}

impl EventRecord {
    pub(crate) const fn new(
        header: EventHeader,
        raw: String,
        document: Value,
        payload: Payload,
    ) -> Self {
        Self {
            header,
            raw,
            document,
            payload,
        }
    }

    /// Kind and timestamp.
    pub const fn header(&self) -> EventHeader {
        self.header
    }

    /// The record's kind.
    pub const fn kind(&self) -> EventKind {
        self.header.kind
    }

    /// The record's timestamp; `DateTime::<Utc>::MIN_UTC` if it did not parse.
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.header.timestamp
    }

    /// The text the record was decoded from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed document. Malformed input yields `{"BadJSON": <text>}`.
    pub const fn document(&self) -> &Value {
        &self.document
    }

    /// Kind-specific content.
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The `event` name as written in the document, or the kind's spelling.
    pub fn event_name(&self) -> &str {
        self.document
            .get("event")
            .and_then(Value::as_str)
            .unwrap_or_else(|| self.header.kind.as_str())
    }

    /// Whether this is an unknown or malformed placeholder.
    pub const fn is_placeholder(&self) -> bool {
        self.header.kind.is_placeholder()
    }

    // -----------------------------------------------------------------------
    // Capabilities
    // -----------------------------------------------------------------------

    /// Cargo hold changes, if the kind has any.
    pub fn as_commodity(&self) -> Option<&dyn CommodityEffect> {
        match &self.payload {
            Payload::Died(p) => Some(p),
            Payload::MarketBuy(p) | Payload::MarketSell(p) => Some(p),
            Payload::EjectCargo(p) => Some(p),
            Payload::Cargo(p) => Some(p),
            _ => None,
        }
    }

    /// Engineering material changes, if the kind has any.
    pub fn as_material(&self) -> Option<&dyn MaterialEffect> {
        match &self.payload {
            Payload::MaterialCollected(p) | Payload::MaterialDiscarded(p) => Some(p),
            Payload::Materials(p) => Some(p),
            Payload::EngineerCraft(p) => Some(p),
            _ => None,
        }
    }

    /// Backpack changes, if the kind has any.
    pub fn as_micro_resource(&self) -> Option<&dyn MicroResourceEffect> {
        match &self.payload {
            Payload::CollectItems(p) | Payload::DropItems(p) => Some(p),
            _ => None,
        }
    }

    /// Suit changes, if the kind has any.
    pub fn as_suit(&self) -> Option<&dyn SuitEffect> {
        match &self.payload {
            Payload::BuySuit(p) => Some(p),
            Payload::SellSuit(p) => Some(p),
            Payload::SuitLoadout(p) => Some(p),
            _ => None,
        }
    }

    /// Loadout changes, if the kind has any.
    pub fn as_loadout(&self) -> Option<&dyn LoadoutEffect> {
        match &self.payload {
            Payload::SellSuit(p) => Some(p),
            Payload::SuitLoadout(p) => Some(p),
            Payload::CreateSuitLoadout(p) => Some(p),
            Payload::DeleteSuitLoadout(p) => Some(p),
            Payload::RenameSuitLoadout(p) => Some(p),
            Payload::LoadoutEquipModule(p) => Some(p),
            Payload::LoadoutRemoveModule(p) => Some(p),
            _ => None,
        }
    }

    /// Credit movement, if the kind has any.
    pub fn as_ledger(&self) -> Option<&dyn LedgerEffect> {
        match &self.payload {
            Payload::Resurrect(p) => Some(p),
            Payload::BookTaxi(p) | Payload::BookDropship(p) => Some(p),
            Payload::CancelTaxi(p) | Payload::CancelDropship(p) => Some(p),
            Payload::MarketBuy(p) | Payload::MarketSell(p) => Some(p),
            Payload::BuySuit(p) => Some(p),
            Payload::SellSuit(p) => Some(p),
            _ => None,
        }
    }

    /// Whether the record changes any inventory family.
    pub fn affects_inventory(&self) -> bool {
        self.as_commodity().is_some()
            || self.as_material().is_some()
            || self.as_micro_resource().is_some()
    }
}
