use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CompanywiseError;
use crate::formatting::{display_name, slugify};

/// Problem difficulty as reported in the dataset.
///
/// Only the three exact spellings map to a named variant; any other value is
/// kept verbatim in [`Difficulty::Other`] and is not counted toward a
/// difficulty bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Other(String),
}

impl Difficulty {
    /// Exact, case-sensitive match against `Easy` / `Medium` / `Hard`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Easy" => Difficulty::Easy,
            "Medium" => Difficulty::Medium,
            "Hard" => Difficulty::Hard,
            other => Difficulty::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Other(raw) => raw,
        }
    }

    /// Ordering rank used when sorting by difficulty. Unknown values sort last.
    pub fn rank(&self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Other(_) => 4,
        }
    }

    /// The three named difficulties, in rank order.
    pub fn named() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }
}

impl From<String> for Difficulty {
    fn from(raw: String) -> Self {
        Difficulty::parse(&raw)
    }
}

impl From<Difficulty> for String {
    fn from(d: Difficulty) -> Self {
        match d {
            Difficulty::Other(raw) => raw,
            named => named.as_str().to_string(),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive parse used for command-line filters; rejects unknown values.
impl FromStr for Difficulty {
    type Err = CompanywiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(CompanywiseError::Config(format!("unknown difficulty: {s}"))),
        }
    }
}

/// One of the five fixed recency windows, in catalog order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Timeframe {
    ThirtyDays,
    ThreeMonths,
    SixMonths,
    MoreThanSixMonths,
    All,
}

impl Timeframe {
    /// Every timeframe in catalog order.
    pub const CATALOG: [Timeframe; 5] = [
        Timeframe::ThirtyDays,
        Timeframe::ThreeMonths,
        Timeframe::SixMonths,
        Timeframe::MoreThanSixMonths,
        Timeframe::All,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Timeframe::ThirtyDays => "thirty-days",
            Timeframe::ThreeMonths => "three-months",
            Timeframe::SixMonths => "six-months",
            Timeframe::MoreThanSixMonths => "more-than-six-months",
            Timeframe::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::ThirtyDays => "30 Days",
            Timeframe::ThreeMonths => "3 Months",
            Timeframe::SixMonths => "6 Months",
            Timeframe::MoreThanSixMonths => "More Than 6 Months",
            Timeframe::All => "All Time",
        }
    }

    /// Source file name inside a company directory, e.g. `six-months.csv`.
    pub fn file_name(self) -> String {
        format!("{}.csv", self.key())
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::CATALOG.into_iter().find(|tf| tf.key() == key)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Timeframe {
    type Err = CompanywiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::from_key(s).ok_or_else(|| CompanywiseError::InvalidTimeframe(s.to_string()))
    }
}

/// A single interview question parsed from one CSV line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub difficulty: Difficulty,
    /// Acceptance rate, 0-100.
    pub acceptance: f64,
    /// Reported ask frequency, 0-100. Primary sort key.
    pub frequency: f64,
}

/// Question totals broken down by difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DifficultyCounts {
    pub total: usize,
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl DifficultyCounts {
    pub fn tally(questions: &[Question]) -> Self {
        let mut counts = DifficultyCounts {
            total: questions.len(),
            ..Default::default()
        };
        for q in questions {
            match q.difficulty {
                Difficulty::Easy => counts.easy += 1,
                Difficulty::Medium => counts.medium += 1,
                Difficulty::Hard => counts.hard += 1,
                Difficulty::Other(_) => {}
            }
        }
        counts
    }
}

/// Per-company, per-timeframe aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeBucket {
    pub total: usize,
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
    /// Sorted by `frequency`, highest first.
    pub questions: Vec<Question>,
}

impl TimeframeBucket {
    /// Count difficulties and sort by frequency descending. The sort is stable.
    pub fn from_questions(mut questions: Vec<Question>) -> Self {
        let counts = DifficultyCounts::tally(&questions);
        questions.sort_by(|a, b| b.frequency.total_cmp(&a.frequency));
        Self {
            total: counts.total,
            easy: counts.easy,
            medium: counts.medium,
            hard: counts.hard,
            questions,
        }
    }

    pub fn counts(&self) -> DifficultyCounts {
        DifficultyCounts {
            total: self.total,
            easy: self.easy,
            medium: self.medium,
            hard: self.hard,
        }
    }
}

/// All data collected for one company directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Raw directory name.
    pub name: String,
    pub slug: String,
    pub display_name: String,
    pub timeframes: BTreeMap<Timeframe, TimeframeBucket>,
    pub total: usize,
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl Company {
    /// Assemble a company from its parsed buckets.
    ///
    /// Returns `None` when `timeframes` is empty. Top-level counts mirror the
    /// headline bucket (see [`select_headline`]).
    pub fn from_buckets(
        name: impl Into<String>,
        timeframes: BTreeMap<Timeframe, TimeframeBucket>,
    ) -> Option<Self> {
        let headline = select_headline(&timeframes)?.counts();
        let name = name.into();
        Some(Self {
            slug: slugify(&name),
            display_name: display_name(&name),
            name,
            timeframes,
            total: headline.total,
            easy: headline.easy,
            medium: headline.medium,
            hard: headline.hard,
        })
    }

    pub fn bucket(&self, timeframe: Timeframe) -> Option<&TimeframeBucket> {
        self.timeframes.get(&timeframe)
    }

    pub fn headline_bucket(&self) -> Option<&TimeframeBucket> {
        select_headline(&self.timeframes)
    }

    pub fn counts(&self) -> DifficultyCounts {
        DifficultyCounts {
            total: self.total,
            easy: self.easy,
            medium: self.medium,
            hard: self.hard,
        }
    }
}

/// Pick the bucket whose counts become a company's headline totals.
///
/// `all` wins when present. Otherwise the bucket with the largest `total`;
/// on a tie the earlier timeframe in catalog order is kept.
pub fn select_headline(
    timeframes: &BTreeMap<Timeframe, TimeframeBucket>,
) -> Option<&TimeframeBucket> {
    if let Some(all) = timeframes.get(&Timeframe::All) {
        return Some(all);
    }
    let mut best: Option<&TimeframeBucket> = None;
    for bucket in timeframes.values() {
        if best.map_or(true, |b| bucket.total > b.total) {
            best = Some(bucket);
        }
    }
    best
}

/// `{key, label}` pair published in the document's timeframe catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeEntry {
    pub key: Timeframe,
    pub label: String,
}

impl TimeframeEntry {
    pub fn catalog() -> Vec<TimeframeEntry> {
        Timeframe::CATALOG
            .into_iter()
            .map(|tf| TimeframeEntry {
                key: tf,
                label: tf.label().to_string(),
            })
            .collect()
    }
}

/// The consolidated dataset document written by a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub generated_at: DateTime<Utc>,
    pub total_companies: usize,
    /// Distinct question ids across all companies, per timeframe.
    pub unique_question_counts: BTreeMap<Timeframe, usize>,
    pub timeframe_catalog: Vec<TimeframeEntry>,
    /// Sorted by `total`, highest first.
    pub companies: Vec<Company>,
}

impl Document {
    /// Console summary printed after a generation run.
    pub fn summary_lines(&self, file_name: &str) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Generated {} with {} companies",
                file_name, self.total_companies
            ),
            "Unique questions by timeframe:".to_string(),
        ];
        for entry in &self.timeframe_catalog {
            let count = self
                .unique_question_counts
                .get(&entry.key)
                .copied()
                .unwrap_or(0);
            lines.push(format!("  {}: {} unique questions", entry.label, count));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, difficulty: &str, frequency: f64) -> Question {
        Question {
            id,
            url: format!("https://leetcode.com/problems/q{id}"),
            title: format!("Question {id}"),
            difficulty: Difficulty::parse(difficulty),
            acceptance: 50.0,
            frequency,
        }
    }

    fn bucket_of(total: usize) -> TimeframeBucket {
        let questions = (0..total as i64).map(|i| question(i, "Easy", 1.0)).collect();
        TimeframeBucket::from_questions(questions)
    }

    // ── Difficulty ────────────────────────────────────────────────────────────

    #[test]
    fn test_difficulty_parse_is_exact() {
        assert_eq!(Difficulty::parse("Easy"), Difficulty::Easy);
        assert_eq!(
            Difficulty::parse("easy"),
            Difficulty::Other("easy".to_string())
        );
        assert_eq!(
            Difficulty::parse("Insane"),
            Difficulty::Other("Insane".to_string())
        );
    }

    #[test]
    fn test_difficulty_serializes_as_raw_string() {
        let json = serde_json::to_string(&Difficulty::Medium).unwrap();
        assert_eq!(json, "\"Medium\"");
        let json = serde_json::to_string(&Difficulty::Other("Unknown".into())).unwrap();
        assert_eq!(json, "\"Unknown\"");
        let back: Difficulty = serde_json::from_str("\"Hard\"").unwrap();
        assert_eq!(back, Difficulty::Hard);
    }

    #[test]
    fn test_difficulty_from_str_case_insensitive() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    // ── Timeframe ─────────────────────────────────────────────────────────────

    #[test]
    fn test_timeframe_catalog_keys_and_labels() {
        let keys: Vec<&str> = Timeframe::CATALOG.iter().map(|t| t.key()).collect();
        assert_eq!(
            keys,
            vec![
                "thirty-days",
                "three-months",
                "six-months",
                "more-than-six-months",
                "all"
            ]
        );
        assert_eq!(Timeframe::MoreThanSixMonths.label(), "More Than 6 Months");
        assert_eq!(Timeframe::All.label(), "All Time");
        assert_eq!(Timeframe::SixMonths.file_name(), "six-months.csv");
    }

    #[test]
    fn test_timeframe_serde_uses_key() {
        let json = serde_json::to_string(&Timeframe::MoreThanSixMonths).unwrap();
        assert_eq!(json, "\"more-than-six-months\"");
        let tf: Timeframe = serde_json::from_str("\"thirty-days\"").unwrap();
        assert_eq!(tf, Timeframe::ThirtyDays);
    }

    #[test]
    fn test_timeframe_from_str() {
        assert_eq!("all".parse::<Timeframe>().unwrap(), Timeframe::All);
        assert!(matches!(
            "yesterday".parse::<Timeframe>(),
            Err(CompanywiseError::InvalidTimeframe(_))
        ));
    }

    // ── TimeframeBucket ───────────────────────────────────────────────────────

    #[test]
    fn test_bucket_counts_and_frequency_order() {
        let bucket = TimeframeBucket::from_questions(vec![
            question(1, "Easy", 10.0),
            question(2, "Medium", 50.0),
            question(3, "Hard", 90.0),
        ]);
        assert_eq!(bucket.total, 3);
        assert_eq!(bucket.easy, 1);
        assert_eq!(bucket.medium, 1);
        assert_eq!(bucket.hard, 1);
        let freqs: Vec<f64> = bucket.questions.iter().map(|q| q.frequency).collect();
        assert_eq!(freqs, vec![90.0, 50.0, 10.0]);
    }

    #[test]
    fn test_bucket_unknown_difficulty_counts_toward_total_only() {
        let bucket = TimeframeBucket::from_questions(vec![
            question(1, "Easy", 1.0),
            question(2, "Unknown", 2.0),
        ]);
        assert_eq!(bucket.total, 2);
        assert_eq!(bucket.easy + bucket.medium + bucket.hard, 1);
    }

    #[test]
    fn test_bucket_sort_is_stable_for_ties() {
        let bucket = TimeframeBucket::from_questions(vec![
            question(1, "Easy", 5.0),
            question(2, "Easy", 5.0),
            question(3, "Easy", 9.0),
        ]);
        let ids: Vec<i64> = bucket.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    // ── Company ───────────────────────────────────────────────────────────────

    #[test]
    fn test_company_from_empty_buckets_is_none() {
        assert!(Company::from_buckets("acme", BTreeMap::new()).is_none());
    }

    #[test]
    fn test_company_headline_prefers_all() {
        let mut map = BTreeMap::new();
        map.insert(Timeframe::ThirtyDays, bucket_of(9));
        map.insert(Timeframe::All, bucket_of(4));
        let company = Company::from_buckets("acme", map).unwrap();
        assert_eq!(company.total, 4);
    }

    #[test]
    fn test_company_headline_falls_back_to_largest() {
        let mut map = BTreeMap::new();
        map.insert(Timeframe::ThirtyDays, bucket_of(2));
        map.insert(Timeframe::SixMonths, bucket_of(7));
        map.insert(Timeframe::ThreeMonths, bucket_of(5));
        let company = Company::from_buckets("acme", map).unwrap();
        assert_eq!(company.total, 7);
        assert_eq!(company.easy, 7);
    }

    #[test]
    fn test_headline_bucket_matches_top_level_counts() {
        let mut map = BTreeMap::new();
        map.insert(Timeframe::ThirtyDays, bucket_of(1));
        map.insert(Timeframe::SixMonths, bucket_of(2));
        let company = Company::from_buckets("acme", map).unwrap();

        let headline = company.headline_bucket().unwrap();
        assert_eq!(headline, company.bucket(Timeframe::SixMonths).unwrap());
        assert_eq!(headline.total, company.counts().total);
        assert_eq!(headline.easy, company.counts().easy);
    }

    #[test]
    fn test_headline_bucket_is_all_when_present() {
        let mut map = BTreeMap::new();
        map.insert(Timeframe::SixMonths, bucket_of(8));
        map.insert(Timeframe::All, bucket_of(3));
        let company = Company::from_buckets("acme", map).unwrap();

        let headline = company.headline_bucket().unwrap();
        assert_eq!(headline, company.bucket(Timeframe::All).unwrap());
        assert_eq!(headline.total, 3);
    }

    #[test]
    fn test_company_headline_tie_keeps_catalog_order() {
        let mut map = BTreeMap::new();
        let mut first = bucket_of(3);
        first.hard = 99;
        map.insert(Timeframe::ThreeMonths, first);
        map.insert(Timeframe::MoreThanSixMonths, bucket_of(3));
        let company = Company::from_buckets("acme", map).unwrap();
        assert_eq!(company.hard, 99);
    }

    #[test]
    fn test_company_names() {
        let mut map = BTreeMap::new();
        map.insert(Timeframe::All, bucket_of(1));
        let company = Company::from_buckets("goldman-sachs", map).unwrap();
        assert_eq!(company.slug, "goldman-sachs");
        assert_eq!(company.display_name, "Goldman Sachs");
    }

    #[test]
    fn test_company_serializes_camel_case_with_timeframe_keys() {
        let mut map = BTreeMap::new();
        map.insert(Timeframe::ThirtyDays, bucket_of(1));
        let company = Company::from_buckets("acme", map).unwrap();
        let value = serde_json::to_value(&company).unwrap();
        assert_eq!(value["displayName"], "Acme");
        assert_eq!(value["timeframes"]["thirty-days"]["total"], 1);
    }

    // ── Document ──────────────────────────────────────────────────────────────

    #[test]
    fn test_document_summary_lines() {
        let mut counts = BTreeMap::new();
        for tf in Timeframe::CATALOG {
            counts.insert(tf, 0);
        }
        counts.insert(Timeframe::All, 12);
        let doc = Document {
            generated_at: Utc::now(),
            total_companies: 2,
            unique_question_counts: counts,
            timeframe_catalog: TimeframeEntry::catalog(),
            companies: Vec::new(),
        };
        let lines = doc.summary_lines("data.json");
        assert_eq!(lines[0], "Generated data.json with 2 companies");
        assert_eq!(lines[1], "Unique questions by timeframe:");
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[6], "  All Time: 12 unique questions");
    }
}
