//! Static item descriptions.
//!
//! The catalog is built once at startup and shared by `Arc`. Lookups of
//! items it does not list synthesize a descriptor from the internal name;
//! the catalog itself never changes after construction.

use std::collections::HashMap;

use hindsight_types::{Category, MaterialDescriptor};

/// Well-known items: category, internal name, display name.
const STANDARD_ITEMS: &[(Category, &str, &str)] = &[
    (Category::Commodity, "gold", "Gold"),
    (Category::Commodity, "silver", "Silver"),
    (Category::Commodity, "palladium", "Palladium"),
    (Category::Commodity, "tritium", "Tritium"),
    (Category::Commodity, "painite", "Painite"),
    (Category::Commodity, "lowtemperaturediamond", "Low Temperature Diamonds"),
    (Category::Commodity, "drones", "Limpet"),
    (Category::Raw, "iron", "Iron"),
    (Category::Raw, "nickel", "Nickel"),
    (Category::Raw, "carbon", "Carbon"),
    (Category::Raw, "sulphur", "Sulphur"),
    (Category::Raw, "phosphorus", "Phosphorus"),
    (Category::Manufactured, "chemicalstorageunits", "Chemical Storage Units"),
    (Category::Manufactured, "heatconductionwiring", "Heat Conduction Wiring"),
    (Category::Manufactured, "mechanicalscrap", "Mechanical Scrap"),
    (Category::Encoded, "shieldcyclerecordings", "Distorted Shield Cycle Recordings"),
    (Category::Encoded, "scrambledemissiondata", "Exceptional Scrambled Emission Data"),
    (Category::Encoded, "disruptedwakeechoes", "Atypical Disrupted Wake Echoes"),
    (Category::Item, "weaponschematic", "Weapon Schematic"),
    (Category::Component, "graphene", "Graphene"),
    (Category::Component, "circuitboard", "Circuit Board"),
    (Category::Data, "surveillancelogs", "Surveillance Logs"),
    (Category::Consumable, "healthpack", "Medkit"),
    (Category::Consumable, "energycell", "Energy Cell"),
];

/// Lookup table from lower-cased internal name to item description.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: HashMap<String, MaterialDescriptor>,
}

impl Catalog {
    /// An empty catalog: every lookup synthesizes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding the well-known items.
    pub fn standard() -> Self {
        Self::from_descriptors(STANDARD_ITEMS.iter().map(|(category, fd_name, name)| {
            MaterialDescriptor {
                category: *category,
                fd_name: String::from(*fd_name),
                name: String::from(*name),
            }
        }))
    }

    /// A catalog holding exactly `descriptors`. Later duplicates win.
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = MaterialDescriptor>,
    {
        let items = descriptors
            .into_iter()
            .map(|mut d| {
                d.fd_name = d.fd_name.to_lowercase();
                (d.fd_name.clone(), d)
            })
            .collect();
        Self { items }
    }

    /// The listed description of `fd_name`, if any.
    pub fn get(&self, fd_name: &str) -> Option<&MaterialDescriptor> {
        self.items.get(&fd_name.to_lowercase())
    }

    /// Description of `fd_name`, synthesized under `category` when unlisted.
    pub fn resolve(&self, category: Category, fd_name: &str) -> MaterialDescriptor {
        self.get(fd_name).cloned().unwrap_or_else(|| MaterialDescriptor {
            category,
            fd_name: fd_name.to_lowercase(),
            name: display_name(fd_name),
        })
    }

    /// Number of listed items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is listed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Readable fallback name: underscores become spaces, first letter upper.
fn display_name(fd_name: &str) -> String {
    let spaced = fd_name.replace('_', " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
