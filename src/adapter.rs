//! Built-in fallback presenters ("adapters"), keyed by dataset group.
//!
//! Dataset keys produced by the export sanitizer look like
//! `items_cdo` or `weapons_assets`: a group name plus a source-kind
//! suffix. Stripping the suffix yields the group used to pick a
//! code-defined adapter. Adapters fill the same role as external
//! presenters but ship with the binary, so a deployment with no
//! presenters document still renders sensible titles and stats.

use crate::presenter::{Presenter, PresenterSection};

/// Source-kind suffixes stripped from a dataset key to obtain its group.
const KIND_SUFFIXES: [&str; 2] = ["_cdo", "_assets"];

/// Code-defined fallback field selection for one dataset group.
#[derive(Debug, Clone, Copy)]
pub struct Adapter {
    pub group: &'static str,
    pub title_fields: &'static [&'static str],
    pub stats_fields: &'static [&'static str],
    pub sections: &'static [(&'static str, &'static [&'static str])],
}

/// The fixed adapter table. Groups mirror the sanitizer's batch aliases.
const ADAPTERS: [Adapter; 7] = [
    Adapter {
        group: "items",
        title_fields: &["DisplayName", "ItemName", "Name"],
        stats_fields: &["Weight", "Value", "Durability"],
        sections: &[("Item", &["Weight", "Value", "Durability", "StackSize"])],
    },
    Adapter {
        group: "weapons",
        title_fields: &["WeaponName", "DisplayName", "Name"],
        stats_fields: &["Damage", "AttackSpeed", "Durability"],
        sections: &[
            ("Combat", &["Damage", "AttackSpeed", "Range", "StaminaCost"]),
            ("Handling", &["Weight", "Durability", "WeaponType"]),
        ],
    },
    Adapter {
        group: "equipment",
        title_fields: &["DisplayName", "Name"],
        stats_fields: &["Armor", "Weight", "Durability"],
        sections: &[("Protection", &["Armor", "Weight", "Durability", "Slot"])],
    },
    Adapter {
        group: "status_effects",
        title_fields: &["EffectName", "DisplayName", "Name"],
        stats_fields: &["Duration", "Magnitude"],
        sections: &[("Effect", &["Duration", "Magnitude", "TickRate"])],
    },
    Adapter {
        group: "traits",
        title_fields: &["TraitName", "DisplayName", "Name"],
        stats_fields: &["Category", "Tier"],
        sections: &[],
    },
    Adapter {
        group: "crafting",
        title_fields: &["RecipeName", "DisplayName", "Name"],
        stats_fields: &["CraftTime", "Station"],
        sections: &[("Recipe", &["Ingredients", "CraftTime", "Station", "Output"])],
    },
    Adapter {
        group: "tech_tree",
        title_fields: &["TechName", "DisplayName", "Name"],
        stats_fields: &["Tier", "Cost"],
        sections: &[],
    },
];

/// Strip a known source-kind suffix from a dataset key.
pub fn group_of(dataset_key: &str) -> &str {
    for suffix in KIND_SUFFIXES {
        if let Some(group) = dataset_key.strip_suffix(suffix) {
            return group;
        }
    }
    dataset_key
}

/// Look up the built-in adapter for a dataset key, if its group has one.
pub fn adapter_for(dataset_key: &str) -> Option<&'static Adapter> {
    let group = group_of(dataset_key);
    ADAPTERS.iter().find(|adapter| adapter.group == group)
}

impl Adapter {
    /// View the adapter as a [`Presenter`] so record-view section
    /// handling has one code path.
    pub fn as_presenter(&self) -> Presenter {
        Presenter {
            title_fields: self.title_fields.iter().map(|s| s.to_string()).collect(),
            stats_fields: self.stats_fields.iter().map(|s| s.to_string()).collect(),
            sections: self
                .sections
                .iter()
                .map(|(title, fields)| PresenterSection {
                    title: title.to_string(),
                    fields: fields.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }
}
