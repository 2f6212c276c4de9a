//! Output cleanup for model replies.
//!
//! Models imitate the author tags they are shown and sometimes prefix their
//! reply with their own name. Both are removed before a reply is stored.

use std::sync::LazyLock;

use regex::Regex;

static TAG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*-+\s*(?:SOURCE\s*:.*?|END(?:\s+.*?)?)\s*-+\s*$")
        .expect("tag line pattern is valid")
});

static LEADING_SOURCE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*-*\s*SOURCE\s*:\s*([^\n]*?)\s*-*\s*(?:\n|$)")
        .expect("source tag pattern is valid")
});

/// Remove every author-tag line, then trim. Idempotent and total.
pub fn clean(raw: &str) -> String {
    raw.split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !TAG_LINE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Remove one leading self-reference to `name`.
///
/// Recognized forms: `[Name]`, `Name:` and an upper-case `SOURCE: NAME`
/// line with or without surrounding hyphens. Anything else is left alone.
pub fn strip_self_reference(text: &str, name: &str) -> String {
    let trimmed = text.trim_start();
    let name = name.trim();
    if name.is_empty() {
        return text.trim().to_string();
    }

    let bracketed = format!("[{name}]");
    if let Some(rest) = strip_prefix_ignore_case(trimmed, &bracketed) {
        return rest.trim_start_matches(':').trim().to_string();
    }

    let colon = format!("{name}:");
    if let Some(rest) = strip_prefix_ignore_case(trimmed, &colon) {
        return rest.trim().to_string();
    }

    if let Some(caps) = LEADING_SOURCE_TAG.captures(trimmed) {
        if caps[1].trim() == name.to_uppercase() {
            return trimmed[caps[0].len()..].trim().to_string();
        }
    }

    text.trim().to_string()
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_tag_lines() {
        let raw = "--- SOURCE: SAGE ---\nHello there.\n--- END SAGE ---";
        assert_eq!(clean(raw), "Hello there.");
    }

    #[test]
    fn test_clean_is_case_insensitive_and_tolerates_spacing() {
        let raw = "  ---source:  bot--- \nline one\nline two\n-----  end bot  ----";
        assert_eq!(clean(raw), "line one\nline two");
    }

    #[test]
    fn test_clean_keeps_prose_mentioning_tags() {
        let raw = "The word SOURCE: appears here.\n--- not a tag";
        assert_eq!(clean(raw), raw);
    }

    #[test]
    fn test_clean_removes_bare_end_marker() {
        assert_eq!(clean("answer\n--- END ---"), "answer");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let samples = [
            "",
            "   ",
            "plain",
            "--- SOURCE: A ---\nx\n--- END A ---\n\n--- SOURCE: B ---\ny\n--- END B ---",
            "\n\n--- END ---\n text \n",
            "-- SOURCE: weird --\n---END---\nkeep",
            "--- SOURCE: A ---\r\nx\r\n--- END A ---\r\n",
            "a\r\r\nb\r\n",
            "--- SOURCE: A ---xSOURCE:\r\r\nENDEND ",
            "--- END ---\r\r\r\nkeep\r",
        ];
        for sample in samples {
            let once = clean(sample);
            assert_eq!(clean(&once), once, "not idempotent for {sample:?}");
            assert!(once.lines().all(|l| !TAG_LINE.is_match(l)));
        }
    }

    #[test]
    fn test_clean_strips_every_trailing_carriage_return() {
        assert_eq!(clean("a\r\r\nb"), "a\nb");
        assert_eq!(clean("--- SOURCE: A ---\r\nhi\r\n--- END A ---\r\n"), "hi");
        assert_eq!(
            clean("--- SOURCE: A ---xSOURCE:\r\r\nENDEND "),
            "--- SOURCE: A ---xSOURCE:\nENDEND"
        );
    }

    #[test]
    fn test_strip_bracketed_name() {
        assert_eq!(strip_self_reference("[Sage] Indeed.", "Sage"), "Indeed.");
        assert_eq!(strip_self_reference("[sage]: Indeed.", "Sage"), "Indeed.");
    }

    #[test]
    fn test_strip_colon_name() {
        assert_eq!(strip_self_reference("Sage: Indeed.", "Sage"), "Indeed.");
    }

    #[test]
    fn test_strip_source_tag_line() {
        assert_eq!(strip_self_reference("--- SOURCE: SAGE ---\nIndeed.", "Sage"), "Indeed.");
        assert_eq!(strip_self_reference("SOURCE: SAGE\nIndeed.", "Sage"), "Indeed.");
    }

    #[test]
    fn test_strip_leaves_other_names_alone() {
        assert_eq!(strip_self_reference("Bob: hi", "Sage"), "Bob: hi");
        assert_eq!(strip_self_reference("[Bob] hi", "Sage"), "[Bob] hi");
        assert_eq!(strip_self_reference("SOURCE: BOB\nhi", "Sage"), "SOURCE: BOB\nhi");
    }

    #[test]
    fn test_strip_only_removes_one_prefix() {
        assert_eq!(strip_self_reference("Sage: Sage: hi", "Sage"), "Sage: hi");
    }

    #[test]
    fn test_strip_handles_multibyte_text() {
        assert_eq!(strip_self_reference("\u{00e9}t\u{00e9}", "Sage"), "\u{00e9}t\u{00e9}");
    }
}
