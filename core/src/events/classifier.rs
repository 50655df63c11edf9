//! Line classification.
//!
//! Rules are tried in a fixed order (kill, zone change, trigger) and the
//! first rule whose phrasing appears in the line decides the outcome, even
//! if it then yields nothing (a malformed kill line or a repeated zone).

use std::sync::LazyLock;

use regex::Regex;

use super::GameEvent;
use crate::game_data::{canonical_zone, is_zone_entry_message, respawn_secs};
use crate::state::SessionState;

const SLAIN_FIRST_PERSON: &str = "You have slain";
const SLAIN_THIRD_PERSON: &str = "has been slain by";

static KILL_FIRST_PERSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"You have slain (.+?)!").expect("valid regex"));
static KILL_THIRD_PERSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+?) has been slain by").expect("valid regex"));
static ZONE_ENTERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^You have entered (.+)\.$").expect("valid regex"));
static ZONE_WHO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^There (?:is 1 player|are \d+ players) in (.+)\.$").expect("valid regex")
});

/// Classify one normalized line, updating zone state on a zone change.
pub fn classify(line: &str, state: &mut SessionState) -> Option<GameEvent> {
    if line.contains(SLAIN_FIRST_PERSON) || line.contains(SLAIN_THIRD_PERSON) {
        return classify_kill(line, state);
    }

    if let Some(zone) = extract_zone(line) {
        return classify_zone(zone, state);
    }

    let identity = state.identity();
    state
        .triggers()
        .find_match(line, identity)
        .map(|rule| GameEvent::TriggerMatched {
            pattern: rule.pattern.clone(),
            payload: rule.payload.clone(),
        })
}

fn classify_kill(line: &str, state: &mut SessionState) -> Option<GameEvent> {
    let Some(subject) = extract_kill_subject(line) else {
        tracing::debug!(line, "Kill phrasing without a subject");
        return None;
    };
    let timestamp_millis = state.next_kill_millis(chrono::Utc::now().timestamp_millis());
    Some(GameEvent::Kill {
        subject: subject.to_string(),
        timestamp_millis,
        respawn_secs: state.kill_respawn_secs(),
    })
}

fn classify_zone(zone: &str, state: &mut SessionState) -> Option<GameEvent> {
    let canonical = canonical_zone(zone);
    let respawn_secs = respawn_secs(canonical);
    if !state.enter_zone(canonical, respawn_secs) {
        return None;
    }
    tracing::info!(zone = canonical, respawn_secs, "Zone changed");
    Some(GameEvent::ZoneChanged {
        zone: canonical.to_string(),
        respawn_secs,
    })
}

/// Name of the slain creature, trimmed. `None` if the line is malformed.
pub fn extract_kill_subject(line: &str) -> Option<&str> {
    let re = if line.contains(SLAIN_FIRST_PERSON) {
        &*KILL_FIRST_PERSON
    } else {
        &*KILL_THIRD_PERSON
    };
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|subject| !subject.is_empty())
}

/// Raw zone token from an entry or `/who` line.
pub fn extract_zone(line: &str) -> Option<&str> {
    if let Some(caps) = ZONE_ENTERED.captures(line) {
        let zone = caps.get(1)?.as_str();
        return is_zone_entry_message(zone).then_some(zone);
    }
    ZONE_WHO
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_data::{DEFAULT_RESPAWN_SECS, NO_ZONE_RESPAWN_SECS};
    use crate::state::{TriggerRule, TriggerSet};
    use eqtrak_types::TriggerPayload;

    fn subject(event: Option<GameEvent>) -> Option<String> {
        match event {
            Some(GameEvent::Kill { subject, .. }) => Some(subject),
            _ => None,
        }
    }

    #[test]
    fn extracts_first_person_kill() {
        let mut state = SessionState::default();
        let event = classify("You have slain a rat!", &mut state);
        assert_eq!(subject(event), Some("a rat".to_string()));
    }

    #[test]
    fn extracts_third_person_kill() {
        let mut state = SessionState::default();
        let event = classify("a decaying skeleton has been slain by Bort!", &mut state);
        assert_eq!(subject(event), Some("a decaying skeleton".to_string()));
    }

    #[test]
    fn subject_is_minimal_and_trimmed() {
        assert_eq!(extract_kill_subject("You have slain  a rat !  extra!"), Some("a rat"));
        assert_eq!(
            extract_kill_subject("  Fippy Darkpaw  has been slain by a guard has been slain by x"),
            Some("Fippy Darkpaw")
        );
    }

    #[test]
    fn malformed_kill_lines_yield_nothing() {
        let mut state = SessionState::default();
        state.set_triggers({
            let mut set = TriggerSet::new();
            set.push_global(TriggerRule::new(
                "slain",
                TriggerPayload::Speech {
                    text: "x".to_string(),
                },
            ));
            set
        });
        assert_eq!(classify("You have slain a rat", &mut state), None);
        assert_eq!(classify("has been slain by a rat", &mut state), None);
        assert_eq!(classify("You have slain !", &mut state), None);
    }

    #[test]
    fn being_slain_is_not_a_kill() {
        let mut state = SessionState::default();
        assert_eq!(classify("You have been slain by a rat!", &mut state), None);
    }

    #[test]
    fn kill_uses_resolved_respawn() {
        let mut state = SessionState::default();
        let Some(GameEvent::Kill { respawn_secs, .. }) = classify("You have slain a rat!", &mut state)
        else {
            panic!("expected kill");
        };
        assert_eq!(respawn_secs, NO_ZONE_RESPAWN_SECS);

        classify("You have entered Kedge Keep.", &mut state);
        let Some(GameEvent::Kill { respawn_secs, .. }) = classify("You have slain a shark!", &mut state)
        else {
            panic!("expected kill");
        };
        assert_eq!(respawn_secs, 1620);

        state.set_respawn_override(Some("12:00".to_string()));
        let Some(GameEvent::Kill { respawn_secs, .. }) = classify("You have slain a shark!", &mut state)
        else {
            panic!("expected kill");
        };
        assert_eq!(respawn_secs, 720);
    }

    #[test]
    fn kill_keys_are_unique() {
        let mut state = SessionState::default();
        let a = classify("You have slain a rat!", &mut state).and_then(|e| e.kill_key());
        let b = classify("You have slain a rat!", &mut state).and_then(|e| e.kill_key());
        assert!(a.as_deref().is_some_and(|k| k.starts_with("a rat_")));
        assert_ne!(a, b);
    }

    #[test]
    fn zone_change_fires_once() {
        let mut state = SessionState::default();
        let first = classify("You have entered The Arena.", &mut state);
        assert_eq!(
            first,
            Some(GameEvent::ZoneChanged {
                zone: "The Arena".to_string(),
                respawn_secs: DEFAULT_RESPAWN_SECS,
            })
        );
        assert_eq!(classify("You have entered The Arena.", &mut state), None);
        assert_eq!(classify("There are 12 players in The Arena.", &mut state), None);
    }

    #[test]
    fn who_lines_resolve_aliases() {
        let mut state = SessionState::default();
        classify("You have entered Nagafen's Lair.", &mut state);
        assert_eq!(classify("There is 1 player in Solusek B.", &mut state), None);

        let event = classify("There are 3 players in Eastern Commonlands.", &mut state);
        assert_eq!(
            event,
            Some(GameEvent::ZoneChanged {
                zone: "East Commonlands".to_string(),
                respawn_secs: 400,
            })
        );
        assert_eq!(state.current_zone().map(|z| z.name.as_str()), Some("East Commonlands"));
    }

    #[test]
    fn system_entered_messages_are_ignored() {
        let mut state = SessionState::default();
        let line = "You have entered an area where levitation effects do not function.";
        assert_eq!(classify(line, &mut state), None);
        assert!(state.current_zone().is_none());
    }

    #[test]
    fn trigger_matches_after_other_rules() {
        let mut set = TriggerSet::new();
        set.push_global(TriggerRule::new(
            "Your root has broken",
            TriggerPayload::Speech {
                text: "Root has broken!".to_string(),
            },
        ));
        set.push_global(TriggerRule::new(
            "entered",
            TriggerPayload::Speech {
                text: "never".to_string(),
            },
        ));
        let mut state = SessionState::new(set);

        assert_eq!(
            classify("Your root has broken.", &mut state),
            Some(GameEvent::TriggerMatched {
                pattern: "Your root has broken".to_string(),
                payload: TriggerPayload::Speech {
                    text: "Root has broken!".to_string()
                },
            })
        );
        // Zone rule claims the line first
        assert!(matches!(
            classify("You have entered The Arena.", &mut state),
            Some(GameEvent::ZoneChanged { .. })
        ));
        assert_eq!(classify("Nothing to see here", &mut state), None);
    }

    #[test]
    fn identity_scoped_triggers_follow_the_identity() {
        let mut set = TriggerSet::new();
        set.push_scoped(
            "Bort",
            TriggerRule::new(
                "You activate Stone Stance.",
                TriggerPayload::Overlay {
                    message: "Stone Stance".to_string(),
                    duration_secs: 480,
                },
            ),
        );
        let mut state = SessionState::new(set);
        assert_eq!(classify("You activate Stone Stance.", &mut state), None);

        state.set_identity("Bort");
        assert!(matches!(
            classify("You activate Stone Stance.", &mut state),
            Some(GameEvent::TriggerMatched { .. })
        ));
    }
}
