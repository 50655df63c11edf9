use memchr::memchr;

/// Normalize a raw log line for classification.
///
/// Trims the line, removes one leading `[<timestamp>] ` bracket and returns
/// `None` when nothing is left.
pub fn normalize(raw: &str) -> Option<&str> {
    let clean = strip_timestamp(raw.trim());
    if clean.is_empty() { None } else { Some(clean) }
}

/// Remove a leading `[...]` bracket and the single space after it.
///
/// The bracket content may be anything except `[` and `]`. A bracket that
/// ends the line is stripped as well. Anything else is returned unchanged.
pub fn strip_timestamp(line: &str) -> &str {
    let b = line.as_bytes();
    if b.first() != Some(&b'[') {
        return line;
    }
    let Some(close) = memchr(b']', &b[1..]).map(|i| i + 1) else {
        return line;
    };
    if memchr(b'[', &b[1..close]).is_some() {
        return line;
    }

    match b.get(close + 1) {
        Some(b' ') => &line[close + 2..],
        None => "",
        Some(_) => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_timestamp_and_one_space() {
        assert_eq!(
            normalize("[Sun Jan 01 00:00:00 2023] You have slain a rat!"),
            Some("You have slain a rat!")
        );
        // Only one space belongs to the prefix
        assert_eq!(normalize("[Sun Jan 01 00:00:00 2023]  indented"), Some(" indented"));
    }

    #[test]
    fn lines_without_prefix_pass_through_trimmed() {
        assert_eq!(normalize("  Hello there \r\n"), Some("Hello there"));
        assert_eq!(normalize("[no close bracket"), Some("[no close bracket"));
        assert_eq!(normalize("[ts]no space"), Some("[ts]no space"));
        assert_eq!(normalize("[a [b] c"), Some("[a [b] c"));
        assert_eq!(normalize("text [ts] later"), Some("text [ts] later"));
    }

    #[test]
    fn only_the_first_bracket_is_removed() {
        assert_eq!(normalize("[t1] [t2] msg"), Some("[t2] msg"));
    }

    #[test]
    fn empty_results_are_skipped() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   \r\n"), None);
        assert_eq!(normalize("[Sun Jan 01 00:00:00 2023] "), None);
        assert_eq!(normalize("[Sun Jan 01 00:00:00 2023]"), None);
    }

    #[test]
    fn non_ascii_content_is_safe() {
        assert_eq!(normalize("[Zeit] Grüße"), Some("Grüße"));
        assert_eq!(normalize("[Zeitö]x"), Some("[Zeitö]x"));
    }
}
