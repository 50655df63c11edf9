//! Static zone reference data.
//!
//! The client names a zone one way when you enter it and another way in
//! `/who` output. Both are folded onto the entry name, which keys the
//! respawn table.

use phf::phf_map;

/// Respawn for zones missing from [`ZONE_RESPAWN_SECS`] (6:40).
pub const DEFAULT_RESPAWN_SECS: u64 = 400;

/// Respawn used before any zone has been seen (6:30).
pub const NO_ZONE_RESPAWN_SECS: u64 = 390;

/// `/who` zone name -> zone entry name.
///
/// No value is also a key, so a single lookup is always final.
pub static ZONE_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "Northern Karana" => "Northern Plains of Karana",
    "Eastern Karana" => "Eastern Plains of Karana",
    "Western Karana" => "Western Plains of Karana",
    "Eastern Commonlands" => "East Commonlands",
    "Western Commonlands" => "West Commonlands",
    "Gorge of King Xorbb" => "Beholder's Maze",
    "High Hold" => "Highpass Hold",
    "Innothule" => "Innothule Swamp",
    "Kithicor" => "Kithicor Forest",
    "Rathetear" => "Lake Rathetear",
    "North Ro" => "Northern Desert of Ro",
    "South Ro" => "Southern Desert of Ro",
    "Feerrott" => "The Feerrott",
    "Everfrost" => "Everfrost Peaks",
    "Oasis" => "Oasis of Marr",
    "Runnyeye" => "Clan Runnyeye",
    "Solusek B" => "Nagafen's Lair",
    "Solusek A" => "Solusek's Eye",
    "Splitpaw" => "Splitpaw Lair",
    "Solusek Ro" => "The Temple of Solusek Ro",
    "Qeynos Sewers" => "Qeynos Catacombs",
    "Kerra Isle" => "Kerra Island",
    "Toxxulia" => "Toxxulia Forest",
    "Warrens" => "The Warrens",
    "Ak`Anon" => "Ak'Anon",
    "Butcherblock" => "Butcherblock Mountains",
    "Kedge" => "Kedge Keep",
    "Mistmoore" => "Mistmoore Castle",
    "Unrest" => "The Estate of Unrest",
    "Burning Woods" => "Burning Wood",
    "Overthere" => "The Overthere",
    "Skyfire" => "Skyfire Mountains",
    "Charasis" => "Howling Stones",
    "Karnor" => "Karnor's Castle",
    "Kurn" => "Kurn's Tower",
    "Nurga" => "Mines of Nurga",
    "Sebilis" => "Old Sebilis",
    "Droga" => "Temple of Droga",
    "Great Divide" => "The Great Divide",
    "Iceclad" => "Iceclad Ocean",
    "Kael" => "Kael Drakkal",
    "Sirens" => "Siren's Grotto",
    "Frozen Shadow" => "Tower of Frozen Shadow",
    "Velketor" => "Velketor's Labyrinth",
};

/// Zone entry name -> default respawn in seconds.
pub static ZONE_RESPAWN_SECS: phf::Map<&'static str, u64> = phf_map! {
    // Outdoor zones mostly run the stock 6:40
    "Northern Plains of Karana" => 400,
    "Eastern Plains of Karana" => 400,
    "Western Plains of Karana" => 400,
    "East Commonlands" => 400,
    "West Commonlands" => 400,
    "Innothule Swamp" => 400,
    "Kithicor Forest" => 400,
    "Lake Rathetear" => 400,
    "Northern Desert of Ro" => 400,
    "Southern Desert of Ro" => 400,
    "Oasis of Marr" => 400,
    "The Feerrott" => 400,
    "Everfrost Peaks" => 400,
    "Butcherblock Mountains" => 400,
    "Toxxulia Forest" => 400,
    "Kerra Island" => 400,
    "Burning Wood" => 400,
    "The Overthere" => 400,
    "The Great Divide" => 400,
    "Iceclad Ocean" => 400,
    "Lake of Ill Omen" => 400,
    "Field of Bone" => 400,
    "Swamp of No Hope" => 400,
    "Frontier Mountains" => 400,
    "Dreadlands" => 400,
    "Skyfire Mountains" => 780,
    "Highpass Hold" => 1110,
    "Beholder's Maze" => 1320,
    "Clan Runnyeye" => 1320,
    "Splitpaw Lair" => 1320,
    "Qeynos Catacombs" => 1320,
    "The Warrens" => 1320,
    "Befallen" => 1080,
    "Blackburrow" => 1320,
    "Crushbone" => 1320,
    "Mistmoore Castle" => 1320,
    "The Estate of Unrest" => 1320,
    "Kedge Keep" => 1620,
    "Lower Guk" => 1680,
    "Upper Guk" => 1200,
    "Solusek's Eye" => 1080,
    "Nagafen's Lair" => 1620,
    "The Temple of Solusek Ro" => 1320,
    "Permafrost Caverns" => 1320,
    "Najena" => 1080,
    "Ak'Anon" => 1320,
    "Karnor's Castle" => 1620,
    "Kurn's Tower" => 1320,
    "Howling Stones" => 1320,
    "Mines of Nurga" => 1320,
    "Old Sebilis" => 1620,
    "Temple of Droga" => 1320,
    "City of Mist" => 1320,
    "Kael Drakkal" => 1680,
    "Siren's Grotto" => 1680,
    "Tower of Frozen Shadow" => 1320,
    "Velketor's Labyrinth" => 1680,
    "Dalnir" => 1320,
    "Chardok" => 1200,
    "Plane of Fear" => 28800,
    "Plane of Hate" => 28800,
};

/// Non-zone system messages that share the "You have entered" phrasing.
const NON_ZONE_ENTRIES: &[&str] = &[
    "an area where levitation effects do not function",
    "an Arena (PvP) area",
    "an area where Bind Affinity is allowed",
];

/// Fold a detected zone name onto its entry name. Unknown names pass through.
pub fn canonical_zone(name: &str) -> &str {
    ZONE_ALIASES.get(name).copied().unwrap_or(name)
}

/// Default respawn for a canonical zone name.
pub fn respawn_secs(canonical: &str) -> u64 {
    ZONE_RESPAWN_SECS
        .get(canonical)
        .copied()
        .unwrap_or(DEFAULT_RESPAWN_SECS)
}

/// The `/who` spelling of a canonical zone, for display.
pub fn who_name(canonical: &str) -> &str {
    ZONE_ALIASES
        .entries()
        .find(|(_, entry)| **entry == canonical)
        .map(|(who, _)| *who)
        .unwrap_or(canonical)
}

/// Whether the text after "You have entered " names a zone.
pub fn is_zone_entry_message(zone: &str) -> bool {
    !NON_ZONE_ENTRIES.iter().any(|entry| *entry == zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_never_chain() {
        for (who, canonical) in ZONE_ALIASES.entries() {
            assert!(
                !ZONE_ALIASES.contains_key(canonical),
                "{who} -> {canonical} is itself aliased"
            );
            assert_eq!(canonical_zone(canonical_zone(who)), *canonical);
        }
    }

    #[test]
    fn aliased_zones_have_respawn_entries() {
        for canonical in ZONE_ALIASES.values() {
            assert!(
                ZONE_RESPAWN_SECS.contains_key(canonical),
                "{canonical} missing from respawn table"
            );
        }
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(canonical_zone("The Arena"), "The Arena");
        assert_eq!(respawn_secs("The Arena"), DEFAULT_RESPAWN_SECS);
        assert_eq!(who_name("The Arena"), "The Arena");
    }

    #[test]
    fn who_names_resolve_both_ways() {
        assert_eq!(canonical_zone("Solusek B"), "Nagafen's Lair");
        assert_eq!(who_name("Nagafen's Lair"), "Solusek B");
        assert_eq!(respawn_secs(canonical_zone("Kedge")), 1620);
    }

    #[test]
    fn system_messages_are_not_zones() {
        assert!(!is_zone_entry_message("an area where levitation effects do not function"));
        assert!(is_zone_entry_message("The Arena"));
    }
}
