//! Line encoding engine.
//!
//! The bidirectional mapping between one raw checkbox line and a
//! structured [`TaskFields`] record. The markup embeds several optional,
//! order-independent fields in a single line:
//!
//! ```text
//! - [ ] 💾 Fix bug {p1} -> 2024-03-01 #infra @[[Alice]] ✅ 2024-03-02
//! ```
//!
//! Decoding strips every recognized token from the text regardless of
//! position; encoding writes them back in one fixed order. The pair is
//! round-trip stable: decoding an encoded line reproduces the same fields,
//! modulo inter-token whitespace.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::category::{Category, CATEGORIES};
use crate::date;
use crate::priority::Priority;

pub const UNCHECKED_MARKER: &str = "- [ ]";
pub const CHECKED_MARKER: &str = "- [x]";
pub const DUE_MARKER: &str = "->";
pub const COMPLETION_MARKER: &str = "✅";

/// Structured fields of one task line.
///
/// Completion is carried solely by `completion_date`: a checked box with no
/// `✅` token decodes to the sentinel date (see
/// [`date::unknown_completion`]), and the encoder derives the checkbox
/// marker from the date's presence. There is no separate "checked" flag to
/// fall out of sync.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TaskFields {
    pub content: String,
    pub priority: Priority,
    pub category: Category,
    pub due_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub projects: Vec<String>,
    pub assignees: Vec<String>,
}

/// Task-line predicate: a line whose trimmed form starts with a checkbox
/// marker, checked or unchecked.
pub fn is_task_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with(UNCHECKED_MARKER) || trimmed.starts_with(CHECKED_MARKER)
}

/// Decode a raw task line into structured fields.
///
/// Tokens are recognized independently of order. Malformed date tokens are
/// not honored: the text stays in `content` and the field stays unset.
pub fn decode(raw: &str) -> TaskFields {
    let trimmed = raw.trim();
    let (checked, rest) = if let Some(rest) = trimmed.strip_prefix(CHECKED_MARKER) {
        (true, rest)
    } else if let Some(rest) = trimmed.strip_prefix(UNCHECKED_MARKER) {
        (false, rest)
    } else {
        (false, trimmed)
    };

    let mut text = rest.to_string();

    let priority = extract_priority(&mut text);
    let category = Category::scan(&text);
    strip_category_glyphs(&mut text);
    let due_date = extract_date(&mut text, due_re());
    let mut completion_date = extract_date(&mut text, completion_re());
    let projects = extract_all(&mut text, project_re());
    let assignees = extract_all(&mut text, assignee_re());

    // Checked box without a completion token: completed, date unknown.
    if checked && completion_date.is_none() {
        completion_date = Some(date::unknown_completion());
    }

    TaskFields {
        content: collapse_whitespace(&text),
        priority,
        category,
        due_date,
        completion_date,
        projects,
        assignees,
    }
}

/// Encode structured fields back into a raw task line.
///
/// Field order is fixed: checkbox, category glyph, content, priority token,
/// due token, project tags, assignee tags, completion token. The checkbox
/// is checked exactly when a completion date is present.
pub fn encode(fields: &TaskFields) -> String {
    let mut parts: Vec<String> = Vec::new();

    let marker = if fields.completion_date.is_some() {
        CHECKED_MARKER
    } else {
        UNCHECKED_MARKER
    };
    parts.push(marker.to_string());

    if fields.category != Category::None {
        parts.push(fields.category.glyph().to_string());
    }

    if !fields.content.is_empty() {
        parts.push(fields.content.clone());
    }

    if let Some(token) = fields.priority.token() {
        parts.push(token);
    }

    if let Some(due) = fields.due_date {
        parts.push(format!("{} {}", DUE_MARKER, date::format_date(due)));
    }

    for project in &fields.projects {
        parts.push(format!("#{project}"));
    }

    for assignee in &fields.assignees {
        parts.push(format!("@[[{assignee}]]"));
    }

    if let Some(done) = fields.completion_date {
        parts.push(format!("{} {}", COMPLETION_MARKER, date::format_date(done)));
    }

    parts.join(" ")
}

fn priority_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(p[1-4])\}").expect("valid regex"))
}

fn due_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"->\s*(\S+)").expect("valid regex"))
}

fn completion_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"✅\s*(\S+)").expect("valid regex"))
}

fn project_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#([^\s#]+)").expect("valid regex"))
}

fn assignee_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@\[\[([^\]]+)\]\]").expect("valid regex"))
}

/// Extract the first recognized priority token, removing it from the text.
/// Braced tokens outside the fixed enumeration are not priorities and are
/// left alone.
fn extract_priority(text: &mut String) -> Priority {
    let found = priority_re().captures(text).and_then(|caps| {
        let whole = caps.get(0)?;
        let priority = Priority::from_code(caps.get(1)?.as_str())?;
        Some((whole.range(), priority))
    });

    match found {
        Some((range, priority)) => {
            text.replace_range(range, " ");
            priority
        }
        None => Priority::None,
    }
}

/// Extract the first marker-plus-date token matched by `re` whose date part
/// parses in the canonical format. Non-parsing candidates are left in the
/// text untouched.
fn extract_date(text: &mut String, re: &Regex) -> Option<NaiveDate> {
    let found = re.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let parsed = date::parse_date(caps.get(1)?.as_str())?;
        Some((whole.range(), parsed))
    });

    let (range, parsed) = found?;
    text.replace_range(range, " ");
    Some(parsed)
}

/// Extract every match of `re` in line order, duplicates preserved,
/// removing the matches from the text.
fn extract_all(text: &mut String, re: &Regex) -> Vec<String> {
    let mut values = Vec::new();
    let mut ranges = Vec::new();
    for caps in re.captures_iter(text) {
        if let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) {
            values.push(value.as_str().to_string());
            ranges.push(whole.range());
        }
    }

    for range in ranges.into_iter().rev() {
        text.replace_range(range, " ");
    }

    values
}

fn strip_category_glyphs(text: &mut String) {
    for category in CATEGORIES {
        let glyph = category.glyph();
        if text.contains(glyph) {
            *text = text.replace(glyph, " ");
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date_of(text: &str) -> NaiveDate {
        date::parse_date(text).unwrap()
    }

    #[test]
    fn recognizes_task_lines() {
        assert!(is_task_line("- [ ] water the plants"));
        assert!(is_task_line("  - [x] done thing"));
        assert!(!is_task_line("- plain list item"));
        assert!(!is_task_line("# heading"));
    }

    #[test]
    fn decodes_full_scenario_line() {
        let fields = decode("- [ ] 💾 Fix bug {p1} -> 2024-03-01 #infra @[[Alice]]");
        assert_eq!(fields.content, "Fix bug");
        assert_eq!(fields.category, Category::Coding);
        assert_eq!(fields.priority, Priority::P1);
        assert_eq!(fields.due_date, Some(date_of("2024-03-01")));
        assert_eq!(fields.completion_date, None);
        assert_eq!(fields.projects, vec!["infra".to_string()]);
        assert_eq!(fields.assignees, vec!["Alice".to_string()]);
    }

    #[test]
    fn scenario_line_round_trips() {
        let fields = decode("- [ ] 💾 Fix bug {p1} -> 2024-03-01 #infra @[[Alice]]");
        let encoded = encode(&fields);
        assert_eq!(
            encoded,
            "- [ ] 💾 Fix bug {p1} -> 2024-03-01 #infra @[[Alice]]"
        );
        assert_eq!(decode(&encoded), fields);
    }

    #[test]
    fn tokens_are_order_independent() {
        let fields = decode("- [ ] #infra {p2} Fix bug @[[Alice]] 💾 -> 2024-03-01");
        assert_eq!(fields.content, "Fix bug");
        assert_eq!(fields.priority, Priority::P2);
        assert_eq!(fields.category, Category::Coding);
        assert_eq!(fields.due_date, Some(date_of("2024-03-01")));
        assert_eq!(fields.projects, vec!["infra".to_string()]);
    }

    #[test]
    fn bare_line_decodes_to_content_only() {
        let fields = decode("- [ ] water the plants");
        assert_eq!(fields.content, "water the plants");
        assert_eq!(fields.priority, Priority::None);
        assert_eq!(fields.category, Category::None);
        assert_eq!(fields.due_date, None);
        assert_eq!(fields.completion_date, None);
        assert!(fields.projects.is_empty());
        assert!(fields.assignees.is_empty());
    }

    #[test]
    fn unchecked_without_completion_token_is_not_completed() {
        let fields = decode("- [ ] pay rent -> 2024-04-01");
        assert_eq!(fields.completion_date, None);
    }

    #[test]
    fn completion_token_wins_over_unchecked_box() {
        let fields = decode("- [ ] pay rent ✅ 2024-04-02");
        assert_eq!(fields.completion_date, Some(date_of("2024-04-02")));
    }

    #[test]
    fn checked_without_date_gets_sentinel() {
        let fields = decode("- [x] pay rent");
        assert_eq!(fields.completion_date, Some(date::unknown_completion()));
        assert_eq!(fields.content, "pay rent");
    }

    #[test]
    fn malformed_due_date_is_left_in_content() {
        let fields = decode("- [ ] ship release -> tomorrow");
        assert_eq!(fields.due_date, None);
        assert_eq!(fields.content, "ship release -> tomorrow");
    }

    #[test]
    fn malformed_completion_date_is_left_in_content() {
        let fields = decode("- [x] ship release ✅ soon");
        // The checked box still marks it completed, date unknown.
        assert_eq!(fields.completion_date, Some(date::unknown_completion()));
        assert_eq!(fields.content, "ship release ✅ soon");
    }

    #[test]
    fn unknown_braced_token_stays_in_content() {
        let fields = decode("- [ ] read {later} maybe");
        assert_eq!(fields.priority, Priority::None);
        assert_eq!(fields.content, "read {later} maybe");
    }

    #[test]
    fn duplicate_projects_are_preserved_in_order() {
        let fields = decode("- [ ] triage #infra #oncall #infra");
        assert_eq!(fields.projects, vec!["infra", "oncall", "infra"]);
    }

    #[test]
    fn assignee_names_may_contain_spaces() {
        let fields = decode("- [ ] review doc @[[Alice Smith]] @[[Bob]]");
        assert_eq!(fields.assignees, vec!["Alice Smith", "Bob"]);
        assert_eq!(fields.content, "review doc");
    }

    #[test]
    fn token_removal_leaves_no_fragments() {
        let fields = decode("- [ ] 💬 call {p3} mom -> 2024-06-05 #family @[[Me]] ✅ 2024-06-06");
        assert_eq!(fields.content, "call mom");
    }

    #[test]
    fn encode_field_order_is_deterministic() {
        let fields = TaskFields {
            content: "call mom".to_string(),
            priority: Priority::P3,
            category: Category::Chat,
            due_date: Some(date_of("2024-06-05")),
            completion_date: Some(date_of("2024-06-06")),
            projects: vec!["family".to_string()],
            assignees: vec!["Me".to_string()],
        };
        assert_eq!(
            encode(&fields),
            "- [x] 💬 call mom {p3} -> 2024-06-05 #family @[[Me]] ✅ 2024-06-06"
        );
    }

    #[test]
    fn checkbox_reflects_completion_date_presence() {
        let mut fields = decode("- [ ] water the plants");
        assert!(encode(&fields).starts_with(UNCHECKED_MARKER));

        fields.completion_date = Some(date_of("2024-05-01"));
        assert!(encode(&fields).starts_with(CHECKED_MARKER));
    }

    #[test]
    fn sentinel_completion_round_trips() {
        let fields = decode("- [x] pay rent");
        let encoded = encode(&fields);
        assert_eq!(encoded, "- [x] pay rent ✅ 1970-01-01");
        assert_eq!(decode(&encoded), fields);
    }

    #[test]
    fn round_trip_is_stable_for_varied_combinations() {
        let lines = [
            "- [ ] plain task",
            "- [ ] 📚 read the rfc {p4}",
            "- [ ] deploy -> 2025-01-31 #ops",
            "- [x] 🔭 survey papers ✅ 2024-12-01 ",
            "- [ ] ✏️ draft post @[[Editor]] #blog #writing",
            "- [ ] {p2} reversed order task 💡",
        ];
        for line in lines {
            let first = decode(line);
            let encoded = encode(&first);
            assert_eq!(decode(&encoded), first, "round trip failed for {line:?}");
            // A second cycle must be byte-stable.
            assert_eq!(encode(&decode(&encoded)), encoded);
        }
    }
}
