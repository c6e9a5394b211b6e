//! Client-side search, filtering and sorting over a loaded [`Document`].
//!
//! Everything here is a pure function of the document, the filter settings
//! and the caller's set of solved question ids.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CompanywiseError;
use crate::models::{Company, DifficultyCounts, Difficulty, Document, Question, Timeframe, TimeframeBucket};

// ── Filter settings ───────────────────────────────────────────────────────────

/// Which questions to keep relative to the solved set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Solved,
    Unsolved,
}

impl FromStr for StatusFilter {
    type Err = CompanywiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            "solved" => Ok(StatusFilter::Solved),
            "unsolved" => Ok(StatusFilter::Unsolved),
            other => Err(CompanywiseError::Config(format!("unknown status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Frequency,
    Difficulty,
    Acceptance,
    Title,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// A `<key>-<direction>` sort order such as `frequency-desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl FromStr for SortSpec {
    type Err = CompanywiseError;

    /// Unknown keys fall back to frequency; the direction must be `asc` or
    /// `desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, dir) = s
            .rsplit_once('-')
            .ok_or_else(|| CompanywiseError::InvalidSort(s.to_string()))?;
        let direction = match dir {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(CompanywiseError::InvalidSort(s.to_string())),
        };
        let key = match key {
            "difficulty" => SortKey::Difficulty,
            "acceptance" => SortKey::Acceptance,
            "title" => SortKey::Title,
            "id" => SortKey::Id,
            _ => SortKey::Frequency,
        };
        Ok(SortSpec { key, direction })
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self.key {
            SortKey::Frequency => "frequency",
            SortKey::Difficulty => "difficulty",
            SortKey::Acceptance => "acceptance",
            SortKey::Title => "title",
            SortKey::Id => "id",
        };
        let dir = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{key}-{dir}")
    }
}

/// The full set of question-list filters.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionFilters {
    pub search: String,
    pub difficulties: Vec<Difficulty>,
    pub status: StatusFilter,
    pub timeframe: Timeframe,
    pub sort: SortSpec,
}

impl Default for QuestionFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            difficulties: Difficulty::named().to_vec(),
            status: StatusFilter::All,
            timeframe: Timeframe::All,
            sort: SortSpec::default(),
        }
    }
}

// ── Lookups ───────────────────────────────────────────────────────────────────

/// First company whose slug or raw directory name equals `slug_or_name`.
pub fn find_company<'a>(document: &'a Document, slug_or_name: &str) -> Option<&'a Company> {
    document
        .companies
        .iter()
        .find(|c| c.slug == slug_or_name || c.name == slug_or_name)
}

/// The requested bucket, else the company's `all` bucket.
pub fn select_bucket(company: &Company, timeframe: Timeframe) -> Option<&TimeframeBucket> {
    company
        .bucket(timeframe)
        .or_else(|| company.bucket(Timeframe::All))
}

/// Companies whose display name or raw name contains `term`, ignoring case.
/// An empty term keeps every company.
pub fn search_companies<'a>(document: &'a Document, term: &str) -> Vec<&'a Company> {
    if term.is_empty() {
        return document.companies.iter().collect();
    }
    let term = term.to_lowercase();
    document
        .companies
        .iter()
        .filter(|c| {
            c.display_name.to_lowercase().contains(&term) || c.name.to_lowercase().contains(&term)
        })
        .collect()
}

/// Counts to show for `company` under `timeframe`: the selected bucket, or the
/// company's headline counts when neither it nor `all` exists.
pub fn company_counts(company: &Company, timeframe: Timeframe) -> DifficultyCounts {
    select_bucket(company, timeframe)
        .map(TimeframeBucket::counts)
        .unwrap_or_else(|| company.counts())
}

/// `(solved, total)` for the selected bucket; `(0, 0)` when there is none.
pub fn solved_progress(
    company: &Company,
    timeframe: Timeframe,
    solved: &HashSet<i64>,
) -> (usize, usize) {
    match select_bucket(company, timeframe) {
        Some(bucket) => {
            let done = bucket
                .questions
                .iter()
                .filter(|q| solved.contains(&q.id))
                .count();
            (done, bucket.total)
        }
        None => (0, 0),
    }
}

// ── Question filtering ────────────────────────────────────────────────────────

/// Apply difficulty, status and search filters, then sort.
///
/// Returns an empty list when the company has neither the requested bucket
/// nor an `all` bucket.
pub fn filter_questions<'a>(
    company: &'a Company,
    filters: &QuestionFilters,
    solved: &HashSet<i64>,
) -> Vec<&'a Question> {
    let Some(bucket) = select_bucket(company, filters.timeframe) else {
        return Vec::new();
    };

    let term = filters.search.to_lowercase();
    let mut questions: Vec<&Question> = bucket
        .questions
        .iter()
        .filter(|q| filters.difficulties.contains(&q.difficulty))
        .filter(|q| match filters.status {
            StatusFilter::All => true,
            StatusFilter::Solved => solved.contains(&q.id),
            StatusFilter::Unsolved => !solved.contains(&q.id),
        })
        .filter(|q| {
            term.is_empty()
                || q.title.to_lowercase().contains(&term)
                || q.id.to_string().contains(&term)
        })
        .collect();

    sort_questions(&mut questions, filters.sort);
    questions
}

/// Stable sort by `spec`.
pub fn sort_questions(questions: &mut [&Question], spec: SortSpec) {
    questions.sort_by(|a, b| {
        let ord = compare_by(a, b, spec.key);
        match spec.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

fn compare_by(a: &Question, b: &Question, key: SortKey) -> Ordering {
    match key {
        SortKey::Frequency => a.frequency.total_cmp(&b.frequency),
        SortKey::Acceptance => a.acceptance.total_cmp(&b.acceptance),
        SortKey::Difficulty => a.difficulty.rank().cmp(&b.difficulty.rank()),
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Id => a.id.cmp(&b.id),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
