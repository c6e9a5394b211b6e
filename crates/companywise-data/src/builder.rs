//! The dataset builder: one pass over the company directories, producing a
//! single immutable [`Document`].
//!
//! All accumulation (per-timeframe id sets, the company list) lives inside a
//! single [`build_document`] call and is dropped when it returns.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use companywise_core::models::{
    Company, Document, Question, Timeframe, TimeframeBucket, TimeframeEntry,
};
use companywise_core::Result;
use tracing::{debug, info};

use crate::reader::{discover_companies, load_timeframe};

// ── UniqueQuestionIds ─────────────────────────────────────────────────────────

/// Distinct question ids seen across all companies, per timeframe.
#[derive(Debug, Clone)]
pub struct UniqueQuestionIds {
    seen: BTreeMap<Timeframe, HashSet<i64>>,
}

impl UniqueQuestionIds {
    pub fn new() -> Self {
        Self {
            seen: Timeframe::CATALOG
                .into_iter()
                .map(|tf| (tf, HashSet::new()))
                .collect(),
        }
    }

    pub fn register(&mut self, timeframe: Timeframe, questions: &[Question]) {
        self.seen
            .entry(timeframe)
            .or_default()
            .extend(questions.iter().map(|q| q.id));
    }

    /// Count per timeframe; every catalog key is present.
    pub fn counts(&self) -> BTreeMap<Timeframe, usize> {
        self.seen.iter().map(|(tf, ids)| (*tf, ids.len())).collect()
    }
}

impl Default for UniqueQuestionIds {
    fn default() -> Self {
        Self::new()
    }
}

// ── Build ─────────────────────────────────────────────────────────────────────

/// Build the document for the dataset under `root`, stamped with the current
/// time.
pub fn build_document(root: &Path) -> Result<Document> {
    build_document_at(root, Utc::now())
}

/// Same as [`build_document`] with an explicit generation timestamp.
///
/// Steps:
/// 1. List company directories (the only fatal failure).
/// 2. Build each company from its timeframe files, registering ids.
/// 3. Drop companies without any parsed bucket.
/// 4. Sort companies by headline `total`, highest first; ties keep
///    discovery order.
pub fn build_document_at(root: &Path, generated_at: DateTime<Utc>) -> Result<Document> {
    let dirs = discover_companies(root)?;

    let mut unique = UniqueQuestionIds::new();
    let mut companies: Vec<Company> = Vec::with_capacity(dirs.len());

    for dir in &dirs {
        match build_company(&dir.name, &dir.path, &mut unique) {
            Some(company) => {
                debug!(
                    company = %company.name,
                    timeframes = company.timeframes.len(),
                    total = company.total,
                    "company processed"
                );
                companies.push(company);
            }
            None => debug!(company = %dir.name, "no questions found; skipping"),
        }
    }

    companies.sort_by(|a, b| b.total.cmp(&a.total));

    let unique_question_counts = unique.counts();
    info!(
        companies = companies.len(),
        directories = dirs.len(),
        "dataset built from {}",
        root.display()
    );

    Ok(Document {
        generated_at,
        total_companies: companies.len(),
        unique_question_counts,
        timeframe_catalog: TimeframeEntry::catalog(),
        companies,
    })
}

/// Build one company record from the timeframe files in `company_dir`.
///
/// Every question of every non-empty bucket is registered in `unique`.
/// Returns `None` when no timeframe file yields at least one question.
pub fn build_company(
    name: &str,
    company_dir: &Path,
    unique: &mut UniqueQuestionIds,
) -> Option<Company> {
    let mut timeframes = BTreeMap::new();

    for timeframe in Timeframe::CATALOG {
        let Some(questions) = load_timeframe(company_dir, timeframe) else {
            continue;
        };
        if questions.is_empty() {
            continue;
        }
        unique.register(timeframe, &questions);
        timeframes.insert(timeframe, TimeframeBucket::from_questions(questions));
    }

    Company::from_buckets(name, timeframes)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const HEADER: &str = "ID,URL,Title,Difficulty,Acceptance %,Frequency %";

    fn line(id: i64, difficulty: &str, frequency: f64) -> String {
        format!(
            "{id},https://leetcode.com/problems/p{id},Problem {id},{difficulty},50.0,{frequency}"
        )
    }

    fn write_csv(root: &Path, company: &str, timeframe: Timeframe, lines: &[String]) -> PathBuf {
        let dir = root.join(company);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(timeframe.file_name());
        let mut content = String::from(HEADER);
        for l in lines {
            content.push('\n');
            content.push_str(l);
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_single_all_file_bucket() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "acme",
            Timeframe::All,
            &[line(1, "Easy", 10.0), line(2, "Medium", 50.0), line(3, "Hard", 90.0)],
        );

        let doc = build_document(dir.path()).unwrap();
        assert_eq!(doc.total_companies, 1);
        let bucket = doc.companies[0].bucket(Timeframe::All).unwrap();
        assert_eq!(bucket.total, 3);
        assert_eq!((bucket.easy, bucket.medium, bucket.hard), (1, 1, 1));
        let freqs: Vec<f64> = bucket.questions.iter().map(|q| q.frequency).collect();
        assert_eq!(freqs, vec![90.0, 50.0, 10.0]);
    }

    #[test]
    fn test_unique_counts_deduplicate_across_companies() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "alpha", Timeframe::All, &[line(42, "Hard", 1.0)]);
        write_csv(
            dir.path(),
            "beta",
            Timeframe::All,
            &[line(42, "Hard", 2.0), line(7, "Easy", 3.0)],
        );

        let doc = build_document(dir.path()).unwrap();
        assert_eq!(doc.unique_question_counts[&Timeframe::All], 2);
        for company in &doc.companies {
            let bucket = company.bucket(Timeframe::All).unwrap();
            assert_eq!(
                bucket.questions.iter().filter(|q| q.id == 42).count(),
                1,
                "each company counts id 42 once"
            );
        }
        let alpha = doc.companies.iter().find(|c| c.name == "alpha").unwrap();
        assert_eq!(alpha.total, 1);
    }

    #[test]
    fn test_unique_counts_have_every_timeframe_key() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "acme", Timeframe::ThirtyDays, &[line(1, "Easy", 1.0)]);

        let doc = build_document(dir.path()).unwrap();
        assert_eq!(doc.unique_question_counts.len(), 5);
        assert_eq!(doc.unique_question_counts[&Timeframe::ThirtyDays], 1);
        assert_eq!(doc.unique_question_counts[&Timeframe::All], 0);
    }

    #[test]
    fn test_headline_from_only_bucket_when_all_missing() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "acme",
            Timeframe::ThirtyDays,
            &[line(1, "Easy", 1.0), line(2, "Hard", 2.0)],
        );

        let doc = build_document(dir.path()).unwrap();
        let company = &doc.companies[0];
        let bucket = company.bucket(Timeframe::ThirtyDays).unwrap();
        assert_eq!(company.counts(), bucket.counts());
        assert_eq!(company.total, 2);
        assert_eq!(company.hard, 1);
    }

    #[test]
    fn test_company_without_questions_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("empty-co")).unwrap();
        let header_only = dir.path().join("header-only");
        std::fs::create_dir_all(&header_only).unwrap();
        std::fs::write(header_only.join("all.csv"), HEADER).unwrap();
        write_csv(dir.path(), "real-co", Timeframe::All, &[line(1, "Easy", 1.0)]);

        let doc = build_document(dir.path()).unwrap();
        assert_eq!(doc.total_companies, 1);
        assert_eq!(doc.companies[0].name, "real-co");
        assert_eq!(doc.companies[0].display_name, "Real Co");
    }

    #[test]
    fn test_companies_sorted_by_total_desc_ties_keep_name_order() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "small", Timeframe::All, &[line(1, "Easy", 1.0)]);
        write_csv(
            dir.path(),
            "big",
            Timeframe::All,
            &[line(1, "Easy", 1.0), line(2, "Easy", 1.0), line(3, "Easy", 1.0)],
        );
        write_csv(dir.path(), "also-small", Timeframe::All, &[line(9, "Easy", 1.0)]);

        let doc = build_document(dir.path()).unwrap();
        let names: Vec<&str> = doc.companies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["big", "also-small", "small"]);
    }

    #[test]
    fn test_malformed_lines_dropped_company_kept() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "acme",
            Timeframe::All,
            &["1,u,short".to_string(), line(2, "Medium", 5.0)],
        );

        let doc = build_document(dir.path()).unwrap();
        assert_eq!(doc.companies[0].total, 1);
    }

    #[test]
    fn test_missing_root_fails() {
        let result = build_document(Path::new("/tmp/does-not-exist-companywise-root"));
        assert!(result.is_err());
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "acme", Timeframe::All, &[line(1, "Easy", 1.0)]);
        write_csv(dir.path(), "globex", Timeframe::SixMonths, &[line(2, "Hard", 3.0)]);

        let ts = Utc::now();
        let first = build_document_at(dir.path(), ts).unwrap();
        let second = build_document_at(dir.path(), ts).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_catalog_in_fixed_order() {
        let dir = TempDir::new().unwrap();
        let doc = build_document(dir.path()).unwrap();
        assert_eq!(doc.total_companies, 0);
        let keys: Vec<Timeframe> = doc.timeframe_catalog.iter().map(|e| e.key).collect();
        assert_eq!(keys, Timeframe::CATALOG.to_vec());
    }
}
