//! Type-safe identifier wrappers.
//!
//! Three families of identifiers flow through the engine:
//!
//! - [`Generation`] -- the version marker handed out by a versioned store
//!   after each fold step.
//! - Journal identifiers ([`SuitId`], [`LoadoutId`], [`SuitModuleId`]) --
//!   numeric ids assigned by the game and copied verbatim from the records.
//! - [`EntryId`] -- a UUID v7 assigned to every folded record by the history
//!   driver, used by persistence collaborators to key the raw document.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// A point in the history of one versioned store.
///
/// Generation 0 is the empty store. Every fold step that changed something
/// advances the counter by exactly one, so the sequence of generations a
/// store exposes is dense.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Generation(pub u32);

impl Generation {
    /// The generation of a store before anything has been written.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw generation number.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Return the raw generation number.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The generation after this one, or `None` on overflow.
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// The generation before this one, or `None` at [`Generation::ZERO`].
    pub const fn previous(self) -> Option<Self> {
        match self.0.checked_sub(1) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl core::fmt::Display for Generation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

impl From<u32> for Generation {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Journal identifiers
// ---------------------------------------------------------------------------

/// Generates a newtype wrapper around a numeric id copied from a journal record.
macro_rules! define_journal_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u64);

        impl $name {
            /// Return the inner numeric value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

define_journal_id! {
    /// Identifier of a purchased suit.
    SuitId
}

define_journal_id! {
    /// Identifier of a suit loadout.
    LoadoutId
}

define_journal_id! {
    /// Identifier of a module (weapon) fitted into a loadout slot.
    SuitModuleId
}

// ---------------------------------------------------------------------------
// Entry identifiers
// ---------------------------------------------------------------------------

/// Identifier assigned to a record when it is folded into a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntryId(pub Uuid);

impl EntryId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for EntryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
