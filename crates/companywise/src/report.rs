//! Plain-text tables for stdout.

use std::collections::HashSet;

use companywise_core::filters::{company_counts, solved_progress};
use companywise_core::formatting::{format_count, format_percent, percentage};
use companywise_core::models::{Company, Question, Timeframe};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const TITLE_WIDTH: usize = 48;
const COMPANY_WIDTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A column-aligned text table.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<(String, Align)>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[(&str, Align)]) -> Self {
        Self {
            headers: headers
                .iter()
                .map(|(h, a)| (h.to_string(), *a))
                .collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render with columns padded to their widest cell, measured in terminal
    /// columns.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|(h, _)| h.width()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.width());
                }
            }
        }

        let header: Vec<String> = self.headers.iter().map(|(h, _)| h.clone()).collect();
        let mut out = self.render_row(&header, &widths);
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&self.render_row(row, &widths));
        }
        out
    }

    fn render_row(&self, cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                let align = self.headers.get(i).map_or(Align::Left, |(_, a)| *a);
                pad(cell, *width, align)
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    }
}

fn pad(text: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    match align {
        Align::Left => format!("{text}{fill}"),
        Align::Right => format!("{fill}{text}"),
    }
}

/// Cut `text` to at most `max` terminal columns, ending in `…` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

// ── Reports ───────────────────────────────────────────────────────────────────

/// Company overview for `timeframe`. The progress column appears only when a
/// solved set is supplied.
pub fn companies_table(
    companies: &[&Company],
    timeframe: Timeframe,
    solved: Option<&HashSet<i64>>,
) -> Table {
    let mut headers = vec![
        ("Company", Align::Left),
        ("Total", Align::Right),
        ("Easy", Align::Right),
        ("Medium", Align::Right),
        ("Hard", Align::Right),
    ];
    if solved.is_some() {
        headers.push(("Progress", Align::Right));
    }
    let mut table = Table::new(&headers);

    for company in companies {
        let counts = company_counts(company, timeframe);
        let mut row = vec![
            truncate(&company.display_name, COMPANY_WIDTH),
            format_count(counts.total),
            format_count(counts.easy),
            format_count(counts.medium),
            format_count(counts.hard),
        ];
        if let Some(solved) = solved {
            let (done, total) = solved_progress(company, timeframe, solved);
            row.push(format!(
                "{done}/{total} ({})",
                format_percent(percentage(done, total))
            ));
        }
        table.push(row);
    }
    table
}

/// `N questions • M solved`, counting solved among `questions`.
pub fn questions_header(questions: &[&Question], solved: &HashSet<i64>) -> String {
    let done = questions.iter().filter(|q| solved.contains(&q.id)).count();
    format!(
        "{} questions • {} solved",
        format_count(questions.len()),
        format_count(done)
    )
}

pub fn questions_table(questions: &[&Question], solved: &HashSet<i64>) -> Table {
    let mut table = Table::new(&[
        ("", Align::Left),
        ("ID", Align::Right),
        ("Title", Align::Left),
        ("Difficulty", Align::Left),
        ("Acceptance", Align::Right),
        ("Frequency", Align::Right),
    ]);
    for q in questions {
        table.push(vec![
            if solved.contains(&q.id) { "✓" } else { "" }.to_string(),
            q.id.to_string(),
            truncate(&q.title, TITLE_WIDTH),
            q.difficulty.to_string(),
            format_percent(q.acceptance),
            format_percent(q.frequency),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use companywise_core::models::{Difficulty, TimeframeBucket};
    use std::collections::BTreeMap;

    fn question(id: i64, title: &str, difficulty: Difficulty) -> Question {
        Question {
            id,
            url: String::new(),
            title: title.to_string(),
            difficulty,
            acceptance: 51.25,
            frequency: 80.0,
        }
    }

    fn company() -> Company {
        let bucket = TimeframeBucket::from_questions(vec![
            question(1, "Two Sum", Difficulty::Easy),
            question(2, "Add Two Numbers", Difficulty::Medium),
        ]);
        Company::from_buckets("acme", BTreeMap::from([(Timeframe::All, bucket)])).unwrap()
    }

    #[test]
    fn test_truncate_respects_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        // Wide characters count as two columns.
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
        assert!(truncate("日本語テキスト", 5).width() <= 5);
    }

    #[test]
    fn test_table_pads_columns() {
        let mut table = Table::new(&[("Name", Align::Left), ("N", Align::Right)]);
        table.push(vec!["a".to_string(), "100".to_string()]);
        table.push(vec!["longer".to_string(), "7".to_string()]);

        let lines: Vec<String> = table.render().lines().map(str::to_string).collect();
        assert_eq!(lines[0], "Name      N");
        assert_eq!(lines[1], "------  ---");
        assert_eq!(lines[2], "a       100");
        assert_eq!(lines[3], "longer    7");
    }

    #[test]
    fn test_companies_table_with_progress() {
        let acme = company();
        let solved = HashSet::from([2]);
        let table = companies_table(&[&acme], Timeframe::All, Some(&solved));
        let out = table.render();
        assert!(out.contains("Progress"));
        assert!(out.contains("1/2 (50.0%)"));
        assert!(out.contains("Acme"));
    }

    #[test]
    fn test_companies_table_without_progress() {
        let acme = company();
        let out = companies_table(&[&acme], Timeframe::ThirtyDays, None).render();
        assert!(!out.contains("Progress"));
        // Falls back to the all bucket.
        assert!(out.lines().nth(2).unwrap().contains('2'));
    }

    #[test]
    fn test_questions_header_and_table() {
        let acme = company();
        let questions: Vec<&Question> = acme.timeframes[&Timeframe::All].questions.iter().collect();
        let solved = HashSet::from([1]);

        assert_eq!(questions_header(&questions, &solved), "2 questions • 1 solved");
        let out = questions_table(&questions, &solved).render();
        assert!(out.contains("✓"));
        assert!(out.contains("51.2%") || out.contains("51.3%"));
        assert!(out.contains("Medium"));
    }
}
