use std::collections::HashMap;

use eqtrak_types::TriggerPayload;

/// A literal substring pattern and what to do when a line contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRule {
    pub pattern: String,
    pub payload: TriggerPayload,
}

impl TriggerRule {
    pub fn new(pattern: impl Into<String>, payload: TriggerPayload) -> Self {
        Self {
            pattern: pattern.into(),
            payload,
        }
    }

    /// Case-sensitive substring test
    pub fn matches(&self, line: &str) -> bool {
        !self.pattern.is_empty() && line.contains(self.pattern.as_str())
    }
}

/// Runtime trigger tables: one global layer and one layer per identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerSet {
    global: Vec<TriggerRule>,
    by_identity: HashMap<String, Vec<TriggerRule>>,
}

impl TriggerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_global(&mut self, rule: TriggerRule) {
        self.global.push(rule);
    }

    pub fn push_scoped(&mut self, identity: &str, rule: TriggerRule) {
        self.by_identity
            .entry(identity.to_string())
            .or_default()
            .push(rule);
    }

    pub fn global(&self) -> &[TriggerRule] {
        &self.global
    }

    pub fn scoped(&self, identity: &str) -> &[TriggerRule] {
        self.by_identity
            .get(identity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First rule whose pattern occurs in `line`.
    ///
    /// Identity-scoped rules are tested before global ones; within a layer
    /// rules are tested in insertion order.
    pub fn find_match(&self, line: &str, identity: Option<&str>) -> Option<&TriggerRule> {
        let scoped = identity.map(|id| self.scoped(id)).unwrap_or_default();
        scoped
            .iter()
            .chain(self.global.iter())
            .find(|rule| rule.matches(line))
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.by_identity.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speech(text: &str) -> TriggerPayload {
        TriggerPayload::Speech {
            text: text.to_string(),
        }
    }

    fn overlay(message: &str, secs: u32) -> TriggerPayload {
        TriggerPayload::Overlay {
            message: message.to_string(),
            duration_secs: secs,
        }
    }

    #[test]
    fn scoped_rules_only_apply_to_their_identity() {
        let mut set = TriggerSet::new();
        set.push_scoped("Bort", TriggerRule::new("Stone Stance", overlay("Stance", 480)));

        assert!(set.find_match("You activate Stone Stance.", Some("Bort")).is_some());
        assert!(set.find_match("You activate Stone Stance.", Some("Grimm")).is_none());
        assert!(set.find_match("You activate Stone Stance.", None).is_none());
    }

    #[test]
    fn scoped_layer_wins_then_insertion_order() {
        let mut set = TriggerSet::new();
        set.push_global(TriggerRule::new("root", speech("global root")));
        set.push_global(TriggerRule::new("Your root", speech("second")));
        set.push_scoped("Bort", TriggerRule::new("broken", overlay("Root", 10)));

        let bort = set.find_match("Your root has broken", Some("Bort")).unwrap();
        assert_eq!(bort.pattern, "broken");
        let other = set.find_match("Your root has broken", Some("Grimm")).unwrap();
        assert_eq!(other.payload, speech("global root"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn matching_is_case_sensitive_and_ignores_empty_patterns() {
        let mut set = TriggerSet::new();
        set.push_global(TriggerRule::new("", speech("never")));
        set.push_global(TriggerRule::new("Root", speech("caps")));
        assert!(set.find_match("Your root has broken", None).is_none());
    }
}
