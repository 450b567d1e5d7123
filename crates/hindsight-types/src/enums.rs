//! Enumeration types shared across the Hindsight workspace.
//!
//! - [`Category`] -- what kind of item an inventory key names.
//! - [`CountSlot`] -- which of the two per-item counts a mutation touches.
//! - [`EventKind`] -- the closed set of journal event kinds the decoder knows,
//!   plus the two placeholder kinds for unknown and malformed input.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The category of an inventory item.
///
/// Categories group into three families: ship cargo ([`Category::Commodity`]),
/// engineering materials (raw, manufactured, encoded) and on-foot
/// micro-resources (item, component, data, consumable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Category {
    /// Trade goods carried in the ship's cargo hold.
    Commodity,
    /// Raw engineering materials (elements).
    Raw,
    /// Encoded data materials.
    Encoded,
    /// Manufactured engineering materials.
    Manufactured,
    /// On-foot goods.
    Item,
    /// On-foot crafting components.
    Component,
    /// On-foot data.
    Data,
    /// On-foot consumables.
    Consumable,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Commodity,
        Self::Raw,
        Self::Encoded,
        Self::Manufactured,
        Self::Item,
        Self::Component,
        Self::Data,
        Self::Consumable,
    ];

    /// The on-foot micro-resource categories.
    pub const MICRO_RESOURCES: [Self; 4] =
        [Self::Item, Self::Component, Self::Data, Self::Consumable];

    /// The journal spelling of the category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Commodity => "Commodity",
            Self::Raw => "Raw",
            Self::Encoded => "Encoded",
            Self::Manufactured => "Manufactured",
            Self::Item => "Item",
            Self::Component => "Component",
            Self::Data => "Data",
            Self::Consumable => "Consumable",
        }
    }

    /// Parse a category name as written in journal records.
    ///
    /// Matching is case-insensitive. Micro-resource records spell categories
    /// as `$MICRORESOURCE_CATEGORY_Item;`; that decoration is stripped first.
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        let bare = strip_prefix_ignore_case(trimmed, "$MICRORESOURCE_CATEGORY_")
            .unwrap_or(trimmed)
            .trim_end_matches(';');
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(bare))
    }

    /// Whether this is an engineering material category.
    pub const fn is_material(self) -> bool {
        matches!(self, Self::Raw | Self::Encoded | Self::Manufactured)
    }

    /// Whether this is ship cargo.
    pub const fn is_commodity(self) -> bool {
        matches!(self, Self::Commodity)
    }

    /// Whether this is an on-foot micro-resource category.
    pub const fn is_micro_resource(self) -> bool {
        matches!(
            self,
            Self::Item | Self::Component | Self::Data | Self::Consumable
        )
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// CountSlot
// ---------------------------------------------------------------------------

/// Number of independent counts kept per inventory item.
pub const COUNT_SLOTS: usize = 2;

/// Which of an item's counts a mutation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CountSlot {
    /// Ship hold, material store, or on-foot locker.
    Ship,
    /// The on-foot backpack.
    Backpack,
}

impl CountSlot {
    /// Position of this slot in a counts array.
    pub const fn index(self) -> usize {
        match self {
            Self::Ship => 0,
            Self::Backpack => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// Generates [`EventKind`] together with its journal spelling table.
macro_rules! define_event_kinds {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident
        ),+ $(,)?
    ) => {
        /// The discriminant of a decoded journal record.
        ///
        /// Registered kinds carry their journal spelling as the variant name.
        /// [`EventKind::Unknown`] and [`EventKind::Malformed`] tag placeholder
        /// records and are not part of [`EventKind::REGISTERED`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub enum EventKind {
            $(
                $(#[$meta])*
                $variant,
            )+
            /// Well-formed record whose kind is not registered.
            Unknown,
            /// Input that could not be decoded into a record at all.
            Malformed,
        }

        impl EventKind {
            /// Every registered (non-placeholder) kind.
            pub const REGISTERED: &'static [Self] = &[$(Self::$variant),+];

            /// The journal spelling of this kind.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                    Self::Unknown => "Unknown",
                    Self::Malformed => "Malformed",
                }
            }
        }
    };
}

define_event_kinds! {
    /// The commander died.
    Died,
    /// The ship self-destructed.
    SelfDestruct,
    /// The commander was rebought after death.
    Resurrect,
    /// A shuttle flight was booked.
    BookTaxi,
    /// A shuttle flight was cancelled.
    CancelTaxi,
    /// A dropship flight was booked.
    BookDropship,
    /// A dropship flight was cancelled.
    CancelDropship,
    /// The commander deployed from a dropship.
    DropshipDeploy,
    /// Commodities bought at a market.
    MarketBuy,
    /// Commodities sold at a market.
    MarketSell,
    /// Cargo jettisoned.
    EjectCargo,
    /// Full cargo hold listing.
    Cargo,
    /// Engineering material picked up.
    MaterialCollected,
    /// Engineering material thrown away.
    MaterialDiscarded,
    /// Full engineering material listing.
    Materials,
    /// An engineer modification consumed materials.
    EngineerCraft,
    /// Micro-resource picked up into the backpack.
    CollectItems,
    /// Micro-resource dropped from the backpack.
    DropItems,
    /// A suit was bought.
    BuySuit,
    /// A suit was sold.
    SellSuit,
    /// The active suit loadout changed.
    SuitLoadout,
    /// A suit loadout was created.
    CreateSuitLoadout,
    /// A suit loadout was deleted.
    DeleteSuitLoadout,
    /// A suit loadout was renamed.
    RenameSuitLoadout,
    /// A module was fitted into a loadout slot.
    LoadoutEquipModule,
    /// A module was removed from a loadout slot.
    LoadoutRemoveModule,
}

impl EventKind {
    /// Whether this kind tags a placeholder record.
    pub const fn is_placeholder(self) -> bool {
        matches!(self, Self::Unknown | Self::Malformed)
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
