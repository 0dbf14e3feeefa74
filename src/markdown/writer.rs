use chrono::{NaiveDate, NaiveDateTime};

use super::Metadata;
use crate::core::Todo;

const PINNED_HEADING: &str = "## 📌 고정";
const PENDING_HEADING: &str = "## 미완료";
const DONE_HEADING: &str = "## 완료";

/// Writes a date's to-dos as a markdown file.
pub struct MarkdownWriter;

impl MarkdownWriter {
    /// Write a complete date file, stamped with the current local time.
    pub fn write_file(date: NaiveDate, todos: &[Todo]) -> String {
        Self::write_file_at(date, todos, chrono::Local::now().naive_local())
    }

    /// Write a complete date file with an explicit "last updated" time.
    ///
    /// Sections appear only when non-empty, always in the order pinned,
    /// pending, completed.
    pub fn write_file_at(date: NaiveDate, todos: &[Todo], updated: NaiveDateTime) -> String {
        let pinned: Vec<&Todo> = todos.iter().filter(|t| t.pinned && !t.completed).collect();
        let pending: Vec<&Todo> = todos.iter().filter(|t| !t.pinned && !t.completed).collect();
        let done: Vec<&Todo> = todos.iter().filter(|t| t.completed).collect();

        let mut out = String::new();
        out.push_str(&format!("# TODO - {}\n\n", date.format("%Y-%m-%d")));
        out.push_str(&format!(
            "_Last updated: {}_\n\n",
            updated.format("%Y-%m-%d %H:%M:%S")
        ));

        if !pinned.is_empty() {
            Self::write_section(&mut out, PINNED_HEADING, &pinned);
            out.push('\n');
        }
        if !pending.is_empty() {
            Self::write_section(&mut out, PENDING_HEADING, &pending);
            out.push('\n');
        }
        if !done.is_empty() {
            Self::write_section(&mut out, DONE_HEADING, &done);
        }

        out
    }

    fn write_section(out: &mut String, heading: &str, todos: &[&Todo]) {
        out.push_str(heading);
        out.push_str("\n\n");
        for todo in todos {
            out.push_str(&Self::write_todo(todo));
            out.push('\n');
        }
    }

    /// Write a single to-do as a checkbox line (no trailing newline).
    pub fn write_todo(todo: &Todo) -> String {
        let checkbox = if todo.completed { "- [x]" } else { "- [ ]" };
        // A line break inside the text would split the entry on the next read
        let text = todo.text.replace(['\r', '\n'], " ");
        format!("{} {}{}", checkbox, text, Self::metadata_comment(todo))
    }

    /// The trailing ` <!-- {...} -->` comment, or an empty string when the
    /// to-do has nothing beyond text and state.
    ///
    /// Text ending in a comment of its own always gets one, even `{}`, so
    /// the reader doesn't take the text's comment for metadata.
    pub fn metadata_comment(todo: &Todo) -> String {
        if !todo.has_metadata() && !todo.text.trim_end().ends_with("-->") {
            return String::new();
        }
        match serde_json::to_string(&Metadata::from_todo(todo)) {
            Ok(json) => format!(" <!-- {} -->", json),
            Err(e) => {
                log::warn!("Dropping metadata for {:?}: {}", todo.text, e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Recurrence;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn noon(d: u32) -> NaiveDateTime {
        date(d).and_hms_opt(12, 0, 5).unwrap()
    }

    #[test]
    fn write_plain_todo() {
        assert_eq!(MarkdownWriter::write_todo(&Todo::new("Buy milk")), "- [ ] Buy milk");
        let done = Todo { completed: true, ..Todo::new("Call bank") };
        assert_eq!(MarkdownWriter::write_todo(&done), "- [x] Call bank");
    }

    #[test]
    fn write_metadata_in_fixed_order() {
        let todo = Todo {
            pinned: true,
            bookmarked: true,
            recurrence: Some(Recurrence::weekly(1)),
            ..Todo::on("Review", date(3))
        };
        assert_eq!(
            MarkdownWriter::write_todo(&todo),
            r#"- [ ] Review <!-- {"pinned":true,"bookmarked":true,"originalDate":"2026-02-03","recurrence":{"type":"weekly","interval":1}} -->"#
        );
    }

    #[test]
    fn write_file_layout() {
        let todos = vec![
            Todo::new("a"),
            Todo { completed: true, ..Todo::new("done") },
            Todo { pinned: true, ..Todo::new("b") },
        ];
        let output = MarkdownWriter::write_file_at(date(3), &todos, noon(3));
        let expected = "\
# TODO - 2026-02-03

_Last updated: 2026-02-03 12:00:05_

## 📌 고정

- [ ] b <!-- {\"pinned\":true} -->

## 미완료

- [ ] a

## 완료

- [x] done
";
        assert_eq!(output, expected);
    }

    #[test]
    fn empty_file_has_only_header() {
        let output = MarkdownWriter::write_file_at(date(4), &[], noon(4));
        assert_eq!(output, "# TODO - 2026-02-04\n\n_Last updated: 2026-02-04 12:00:05_\n\n");
    }

    #[test]
    fn text_comment_survives_rewrites() {
        use crate::markdown::decode;

        let broken = Todo::on("Fix <!-- {pinned:true} -->", date(3));
        let looks_valid = Todo::new(r#"note <!-- {"pinned":true} -->"#);
        let mut todos = vec![broken, looks_valid];
        for _ in 0..2 {
            todos = decode(&MarkdownWriter::write_file_at(date(3), &todos, noon(3)));
        }

        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].text, "Fix <!-- {pinned:true} -->");
        assert_eq!(todos[0].original_date, Some(date(3)));
        assert_eq!(todos[1].text, r#"note <!-- {"pinned":true} -->"#);
        assert!(!todos[1].pinned);
        assert_eq!(
            MarkdownWriter::write_todo(&todos[1]),
            r#"- [ ] note <!-- {"pinned":true} --> <!-- {} -->"#
        );
    }

    #[test]
    fn newlines_are_flattened() {
        let todo = Todo::new("two\nlines");
        assert_eq!(MarkdownWriter::write_todo(&todo), "- [ ] two lines");
    }
}
