use regex::Regex;
use std::sync::LazyLock;

use super::Metadata;
use crate::core::Todo;

static METADATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<!--\s*(?P<json>\{.*\})\s*-->$").unwrap());

const PENDING_MARKER: &str = "- [ ]";
const DONE_MARKERS: [&str; 2] = ["- [x]", "- [X]"];

pub struct MarkdownParser;

impl MarkdownParser {
    /// Parse a date file into to-dos, in file order.
    ///
    /// Lines that aren't checkboxes are skipped, as are checkboxes with no text.
    pub fn parse(input: &str) -> Vec<Todo> {
        input.lines().filter_map(Self::parse_line).collect()
    }

    /// Parse one line, or `None` if it isn't a to-do.
    pub fn parse_line(line: &str) -> Option<Todo> {
        let trimmed = line.trim();
        let (completed, rest) = if let Some(rest) = trimmed.strip_prefix(PENDING_MARKER) {
            (false, rest)
        } else {
            let rest = DONE_MARKERS
                .iter()
                .find_map(|marker| trimmed.strip_prefix(marker))?;
            (true, rest)
        };
        let rest = rest.strip_prefix(' ').unwrap_or(rest);

        let (text, metadata) = Self::split_metadata(rest);
        if text.is_empty() {
            return None;
        }

        let mut todo = Todo::new(text);
        todo.completed = completed;
        if let Some(metadata) = metadata {
            metadata.apply(&mut todo);
        }
        Some(todo)
    }

    /// Split a trailing metadata comment off `text`.
    ///
    /// Only the last `<!--` is considered, so comments kept in the text
    /// itself stay there. A comment whose JSON doesn't parse leaves the text
    /// untouched.
    pub(crate) fn split_metadata(text: &str) -> (String, Option<Metadata>) {
        let Some(start) = text.rfind("<!--") else {
            return (text.to_string(), None);
        };
        let Some(caps) = METADATA_RE.captures(&text[start..]) else {
            return (text.to_string(), None);
        };
        match serde_json::from_str::<Metadata>(&caps["json"]) {
            Ok(metadata) => (text[..start].trim().to_string(), Some(metadata)),
            Err(e) => {
                log::warn!("Ignoring unreadable metadata in {:?}: {}", text, e);
                (text.to_string(), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Recurrence;
    use chrono::NaiveDate;

    #[test]
    fn parse_plain_checkboxes() {
        let input = "\
# TODO - 2026-02-03

_Last updated: 2026-02-03 10:00:00_

## 미완료

- [ ] Buy milk
  - [x] Call bank
- [X] Upper case done
* [ ] not a checkbox
";
        let todos = MarkdownParser::parse(input);
        assert_eq!(todos.len(), 3);
        assert_eq!(todos[0].text, "Buy milk");
        assert!(!todos[0].completed);
        assert_eq!(todos[1].text, "Call bank");
        assert!(todos[1].completed);
        assert!(todos[2].completed);
        assert!(todos.iter().all(|t| t.original_date.is_none()));
    }

    #[test]
    fn parse_metadata_comment() {
        let line = r#"- [ ] Water plants <!-- {"pinned":true,"originalDate":"2026-02-01","recurrence":{"type":"daily","interval":2}} -->"#;
        let todo = MarkdownParser::parse_line(line).unwrap();
        assert_eq!(todo.text, "Water plants");
        assert!(todo.pinned);
        assert!(!todo.bookmarked);
        assert_eq!(todo.original_date, NaiveDate::from_ymd_opt(2026, 2, 1));
        assert_eq!(todo.recurrence, Some(Recurrence::daily(2)));
    }

    #[test]
    fn parse_reminder_without_seconds() {
        let line = r#"- [ ] Standup <!-- {"reminder":"2026-02-01T09:30"} -->"#;
        let todo = MarkdownParser::parse_line(line).unwrap();
        let expected = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap().and_hms_opt(9, 30, 0);
        assert_eq!(todo.reminder, expected);
    }

    #[test]
    fn broken_metadata_stays_in_text() {
        let line = "- [ ] Fix <!-- {pinned:true} -->";
        let todo = MarkdownParser::parse_line(line).unwrap();
        assert_eq!(todo.text, "Fix <!-- {pinned:true} -->");
        assert!(!todo.pinned);
    }

    #[test]
    fn mistyped_metadata_stays_in_text() {
        let line = r#"- [x] Fix <!-- {"pinned":"yes"} -->"#;
        let todo = MarkdownParser::parse_line(line).unwrap();
        assert_eq!(todo.text, r#"Fix <!-- {"pinned":"yes"} -->"#);
        assert!(todo.completed);
    }

    #[test]
    fn only_last_comment_is_metadata() {
        let line = r#"- [ ] Fix <!-- {pinned:true} --> <!-- {"originalDate":"2026-02-01"} -->"#;
        let todo = MarkdownParser::parse_line(line).unwrap();
        assert_eq!(todo.text, "Fix <!-- {pinned:true} -->");
        assert_eq!(todo.original_date, NaiveDate::from_ymd_opt(2026, 2, 1));
    }

    #[test]
    fn comment_in_middle_is_text() {
        let todo = MarkdownParser::parse_line("- [ ] a <!-- {} --> b").unwrap();
        assert_eq!(todo.text, "a <!-- {} --> b");
    }

    #[test]
    fn empty_checkbox_is_dropped() {
        assert!(MarkdownParser::parse_line("- [ ]").is_none());
        assert!(MarkdownParser::parse_line(r#"- [ ] <!-- {"pinned":true} -->"#).is_none());
        assert!(MarkdownParser::parse_line("plain text").is_none());
    }
}
