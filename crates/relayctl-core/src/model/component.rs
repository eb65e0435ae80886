// ── Component identity ──
//
// A component is one functional unit on a device: a switch, a light, a
// cover, an input or a meter. Its numeric id is unique only within
// (device, type); the user-assigned name is the stable handle callers
// prefer. `ComponentTable` is the denormalized name snapshot the
// resolver caches per device.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── ComponentType ───────────────────────────────────────────────────

/// Type tag of a component.
///
/// The meter variants mirror the wire-level component families: `Em` is
/// the multi-phase energy meter, `Em1` the single-phase one, `Pm1` the
/// plain power meter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ComponentType {
    Switch,
    Light,
    Cover,
    Input,
    Em,
    Em1,
    Pm1,
}

impl ComponentType {
    /// Map a Gen1 settings/status section key onto the unified type.
    ///
    /// Gen1 names its per-type arrays after the hardware era: `relays`
    /// are switches, `rollers` are covers, `meters`/`emeters` are the
    /// power and single-phase energy meters.
    pub fn from_gen1_section(section: &str) -> Option<Self> {
        match section {
            "relays" => Some(Self::Switch),
            "lights" => Some(Self::Light),
            "rollers" => Some(Self::Cover),
            "inputs" => Some(Self::Input),
            "meters" => Some(Self::Pm1),
            "emeters" => Some(Self::Em1),
            _ => None,
        }
    }

    /// Synthetic display name for an unnamed component.
    pub fn key(self, id: u32) -> String {
        format!("{self}:{id}")
    }
}

// ── ComponentTable ──────────────────────────────────────────────────

/// Named components of one device: type → { id → name }.
///
/// Only components that actually carry a user-assigned name appear here.
/// BTreeMaps keep iteration ordered by id, which doubles as the
/// deterministic lowest-id tie-break for duplicate names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentTable {
    entries: BTreeMap<ComponentType, BTreeMap<u32, String>>,
}

impl ComponentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a named component.
    pub fn insert(&mut self, component_type: ComponentType, id: u32, name: impl Into<String>) {
        self.entries
            .entry(component_type)
            .or_default()
            .insert(id, name.into());
    }

    /// All names of one type, ordered by id.
    pub fn names(&self, component_type: ComponentType) -> Option<&BTreeMap<u32, String>> {
        self.entries.get(&component_type)
    }

    /// Case-insensitive name lookup. Duplicate names resolve to the
    /// lowest id.
    pub fn lookup(&self, component_type: ComponentType, name: &str) -> Option<u32> {
        self.entries.get(&component_type).and_then(|names| {
            names
                .iter()
                .find(|(_, n)| n.eq_ignore_ascii_case(name))
                .map(|(id, _)| *id)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (type, id → name) entries.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentType, &BTreeMap<u32, String>)> {
        self.entries.iter().map(|(t, names)| (*t, names))
    }
}

impl fmt::Display for ComponentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (component_type, names) in &self.entries {
            for (id, name) in names {
                if !first {
                    writeln!(f)?;
                }
                write!(f, "{component_type}:{id} = {name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn component_type_parses_case_insensitively() {
        assert_eq!(
            ComponentType::from_str("Switch").unwrap(),
            ComponentType::Switch
        );
        assert_eq!(
            ComponentType::from_str("COVER").unwrap(),
            ComponentType::Cover
        );
        assert!(ComponentType::from_str("thermostat").is_err());
    }

    #[test]
    fn gen1_sections_map_to_unified_types() {
        assert_eq!(
            ComponentType::from_gen1_section("relays"),
            Some(ComponentType::Switch)
        );
        assert_eq!(
            ComponentType::from_gen1_section("emeters"),
            Some(ComponentType::Em1)
        );
        assert_eq!(ComponentType::from_gen1_section("device"), None);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut table = ComponentTable::new();
        table.insert(ComponentType::Switch, 0, "Kitchen");
        assert_eq!(table.lookup(ComponentType::Switch, "kitchen"), Some(0));
        assert_eq!(table.lookup(ComponentType::Switch, "KITCHEN"), Some(0));
        assert_eq!(table.lookup(ComponentType::Cover, "kitchen"), None);
    }

    #[test]
    fn duplicate_names_resolve_to_lowest_id() {
        let mut table = ComponentTable::new();
        table.insert(ComponentType::Switch, 3, "Pump");
        table.insert(ComponentType::Switch, 1, "pump");
        assert_eq!(table.lookup(ComponentType::Switch, "PUMP"), Some(1));
    }

    #[test]
    fn synthetic_key_format() {
        assert_eq!(ComponentType::Cover.key(1), "cover:1");
    }
}
