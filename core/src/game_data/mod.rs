mod zones;

pub use zones::{
    DEFAULT_RESPAWN_SECS, NO_ZONE_RESPAWN_SECS, ZONE_ALIASES, ZONE_RESPAWN_SECS, canonical_zone,
    is_zone_entry_message, respawn_secs, who_name,
};
