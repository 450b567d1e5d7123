//! Kind-specific payloads and the mutations each one drives.
//!
//! Every payload is built by a total constructor over lenient [`Fields`]
//! access, so a record with missing or odd fields still decodes.
//!
//! [`Fields`]: crate::fields::Fields

pub mod death;
pub mod loadouts;
pub mod market;
pub mod materials;
pub mod microresources;
pub mod suits;
pub mod transport;

pub use death::{Died, Killer, Resurrect};
pub use loadouts::{
    LoadoutActivation, LoadoutCreation, LoadoutDeletion, LoadoutDetails, LoadoutRename, ModuleEquip,
    ModuleRemoval,
};
pub use market::{Cargo, EjectCargo, MarketTrade, TradeSide};
pub use materials::{EngineerCraft, MaterialChange, MaterialsListing};
pub use microresources::BackpackTransfer;
pub use suits::{BuySuit, SellSuit};
pub use transport::{Booking, Cancellation};
