//! Fixed-width text layout of the log file.
//!
//! ```text
//! +---------------------+---------------+-- ... --+-------------+
//! | TIMESTAMP           | TASK          |   ...   | STATUS      |
//! +---------------------+---------------+-- ... --+-------------+
//! | 2024-05-01 10:00:00 | Default Bot   |   ...   | information |
//! ```
//!
//! Cells wider than their column are cut so every line has the same length
//! and the same pipe positions. Long messages continue on extra rows whose
//! other cells are blank.

use crate::loggers::core::{LogEntry, LogStatus};

pub const COLUMN_TITLES: [&str; 9] = [
    "TIMESTAMP", "TASK", "FUNCTION", "FILE", "CPU%", "MEM%", "MESSAGE", "PROCESS_TYPE", "STATUS",
];

pub const COLUMN_WIDTHS: [usize; 9] = [19, 13, 28, 23, 5, 5, 48, 13, 11];

pub const MESSAGE_COLUMN: usize = 6;
pub const MESSAGE_WIDTH: usize = COLUMN_WIDTHS[MESSAGE_COLUMN];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn separator_line() -> String {
    let mut line = String::from("+");
    for width in COLUMN_WIDTHS {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line
}

pub fn format_row(cells: [&str; 9]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
        line.push(' ');
        line.push_str(&fit(cell, width));
        line.push_str(" |");
    }
    line
}

/// Separator, titles, separator.
pub fn header_lines() -> [String; 3] {
    [separator_line(), format_row(COLUMN_TITLES), separator_line()]
}

/// All lines one entry occupies in the file: the main row, one continuation
/// row per extra message segment, and a trailing separator for critical
/// entries.
pub fn entry_lines(entry: &LogEntry) -> Vec<String> {
    let timestamp = entry.timestamp.format(TIMESTAMP_FORMAT).to_string();
    let cpu = format!("{:.1}", entry.cpu_usage);
    let mem = format!("{:.1}", entry.memory_usage);
    let segments = wrap_message(&entry.message, MESSAGE_WIDTH);

    let mut lines = Vec::with_capacity(segments.len() + 1);
    lines.push(format_row([
        &timestamp,
        &entry.task_name,
        &entry.function_name,
        &entry.source_file,
        &cpu,
        &mem,
        &segments[0],
        entry.process_type.as_str(),
        entry.status.as_str(),
    ]));

    for segment in &segments[1..] {
        let mut cells = [""; 9];
        cells[MESSAGE_COLUMN] = segment;
        lines.push(format_row(cells));
    }

    if entry.status == LogStatus::Critical {
        lines.push(separator_line());
    }
    lines
}

/// Greedy word wrap. Whitespace runs collapse to single spaces, words longer
/// than `width` are split. Always returns at least one (possibly empty)
/// segment.
pub fn wrap_message(message: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in message.split_whitespace() {
        let mut rest = word;
        while !rest.is_empty() {
            let rest_len = rest.chars().count();
            let needed = if current_len == 0 { rest_len } else { current_len + 1 + rest_len };

            if needed <= width {
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(rest);
                current_len += rest_len;
                break;
            }

            if rest_len <= width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }

            let room = if current_len == 0 { width } else { width.saturating_sub(current_len + 1) };
            if room == 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }

            let split = rest.char_indices().nth(room).map_or(rest.len(), |(i, _)| i);
            if current_len > 0 {
                current.push(' ');
            }
            current.push_str(&rest[..split]);
            lines.push(std::mem::take(&mut current));
            current_len = 0;
            rest = &rest[split..];
        }
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn fit(cell: &str, width: usize) -> String {
    let cut: String = cell.chars().take(width).collect();
    format!("{:<width$}", cut, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loggers::core::ProcessType;
    use chrono::Local;

    fn entry(message: &str, status: LogStatus) -> LogEntry {
        LogEntry {
            timestamp: Local::now(),
            task_name: "Default Bot".into(),
            function_name: "run".into(),
            source_file: "main.rs".into(),
            cpu_usage: 12.345,
            memory_usage: 100.0,
            message: message.into(),
            process_type: ProcessType::Robotic,
            status,
        }
    }

    fn pipe_positions(line: &str) -> Vec<usize> {
        line.chars()
            .enumerate()
            .filter(|(_, c)| *c == '|')
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn separator_matches_column_widths() {
        let sep = separator_line();
        assert!(sep.starts_with("+---------------------+---------------+"));
        assert_eq!(sep.matches('+').count(), 10);
        assert_eq!(sep.chars().count(), format_row(COLUMN_TITLES).chars().count());
    }

    #[test]
    fn header_has_titles_in_order() {
        let [top, titles, bottom] = header_lines();
        assert_eq!(top, bottom);
        assert!(titles.starts_with("| TIMESTAMP           | TASK          | FUNCTION"));
        assert!(titles.ends_with("| STATUS      |"));
    }

    #[test]
    fn short_message_is_one_row_aligned_with_header() {
        let lines = entry_lines(&entry("started", LogStatus::Information));
        assert_eq!(lines.len(), 1);
        let header = format_row(COLUMN_TITLES);
        assert_eq!(pipe_positions(&lines[0]), pipe_positions(&header));
        assert!(lines[0].contains("| 12.3  | 100.0 | started"));
    }

    #[test]
    fn long_message_adds_continuation_rows() {
        let message = "word ".repeat(40);
        let segments = wrap_message(&message, MESSAGE_WIDTH);
        assert!(segments.len() > 1);

        let lines = entry_lines(&entry(&message, LogStatus::Success));
        assert_eq!(lines.len(), segments.len());

        let header = format_row(COLUMN_TITLES);
        for line in &lines {
            assert_eq!(pipe_positions(line), pipe_positions(&header));
        }
        assert!(lines[1].starts_with(&format!("| {:19} |", "")));
    }

    #[test]
    fn critical_entry_ends_with_separator() {
        let lines = entry_lines(&entry("boom", LogStatus::Critical));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], separator_line());
    }

    #[test]
    fn wrap_respects_width_and_breaks_long_words() {
        let segments = wrap_message(&"x".repeat(100), 48);
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| s.chars().count() <= 48));
        assert_eq!(segments.concat(), "x".repeat(100));
    }

    #[test]
    fn wrap_collapses_whitespace_and_keeps_words() {
        let segments = wrap_message("alpha   beta\n\tgamma", 11);
        assert_eq!(segments, vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn wrap_of_empty_message_yields_one_blank_segment() {
        assert_eq!(wrap_message("", 48), vec![String::new()]);
        assert_eq!(wrap_message("   ", 48), vec![String::new()]);
    }

    #[test]
    fn overlong_cells_are_cut() {
        let mut e = entry("x", LogStatus::Warning);
        e.function_name = "f".repeat(60);
        let line = &entry_lines(&e)[0];
        assert_eq!(line.chars().count(), separator_line().chars().count());
    }
}
