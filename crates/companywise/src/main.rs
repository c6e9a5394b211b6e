mod bootstrap;
mod report;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use companywise_core::filters::{filter_questions, find_company, search_companies, QuestionFilters};
use companywise_core::models::{Difficulty, Document};
use companywise_core::settings::{Command, Settings, SolvedAction};
use companywise_core::CompanywiseError;
use companywise_data::builder::build_document;
use companywise_data::writer::{load_document, write_document};
use companywise_sync::auth::{AuthProvider, LocalAuth, UserIdentity};
use companywise_sync::fallback::LocalFallback;
use companywise_sync::store::DirectoryStore;
use companywise_sync::subscription::Subscription;
use companywise_sync::tracker::ProgressTracker;

const FALLBACK_FILE: &str = "local_storage.json";

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories(&settings.state_dir())?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("companywise v{} starting", env!("CARGO_PKG_VERSION"));

    match &settings.command {
        Command::Build { pretty } => run_build(&settings, *pretty),

        Command::Companies {
            search,
            timeframe,
            user,
        } => {
            let document = open_document(&settings)?;
            let solved = match user {
                Some(uid) => Some(load_solved(&settings, uid)?),
                None => None,
            };
            let companies = search_companies(&document, search);
            let table = report::companies_table(&companies, *timeframe, solved.as_ref());
            println!("{} companies ({})", companies.len(), timeframe.label());
            if !table.is_empty() {
                println!("{}", table.render());
            }
            Ok(())
        }

        Command::Questions {
            company,
            timeframe,
            difficulties,
            status,
            search,
            sort,
            user,
        } => {
            let document = open_document(&settings)?;
            let company = find_company(&document, company)
                .ok_or_else(|| CompanywiseError::CompanyNotFound(company.clone()))?;
            let solved = match user {
                Some(uid) => load_solved(&settings, uid)?,
                None => HashSet::new(),
            };
            let filters = QuestionFilters {
                search: search.clone(),
                difficulties: if difficulties.is_empty() {
                    Difficulty::named().to_vec()
                } else {
                    difficulties.clone()
                },
                status: *status,
                timeframe: *timeframe,
                sort: *sort,
            };
            let questions = filter_questions(company, &filters, &solved);

            println!("{} ({})", company.display_name, timeframe.label());
            println!("{}", report::questions_header(&questions, &solved));
            if !questions.is_empty() {
                println!("{}", report::questions_table(&questions, &solved).render());
            }
            Ok(())
        }

        Command::Solved {
            user,
            email,
            action,
        } => {
            let session = Session::open(&settings, user, email.as_deref())?;
            match action {
                SolvedAction::Toggle { id } => {
                    if !session.tracker.toggle_solved(*id) {
                        return Err(CompanywiseError::NotSignedIn.into());
                    }
                    let state = if session.tracker.is_solved(*id) {
                        "solved"
                    } else {
                        "unsolved"
                    };
                    println!("Question {id} marked {state}");
                }
                SolvedAction::List => {
                    let ids = session.tracker.state().sorted_ids();
                    println!("{} solved", ids.len());
                    for id in ids {
                        println!("{id}");
                    }
                }
            }
            Ok(())
        }
    }
}

fn run_build(settings: &Settings, pretty: bool) -> Result<()> {
    let document = build_document(&settings.data_dir)?;
    write_document(&document, &settings.output, pretty)?;

    let file_name = settings
        .output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| settings.output.display().to_string());
    for line in document.summary_lines(&file_name) {
        println!("{line}");
    }
    Ok(())
}

fn open_document(settings: &Settings) -> Result<Document> {
    load_document(&settings.output).with_context(|| {
        format!(
            "loading {} (run `companywise build` first)",
            settings.output.display()
        )
    })
}

fn load_solved(settings: &Settings, user: &str) -> Result<HashSet<i64>> {
    let session = Session::open(settings, user, None)?;
    Ok(session.tracker.solved())
}

/// A signed-in tracker over the directory store and the local fallback.
struct Session {
    tracker: ProgressTracker,
    _binding: Subscription,
    _auth: LocalAuth,
}

impl Session {
    fn open(settings: &Settings, user: &str, email: Option<&str>) -> Result<Self> {
        let store = Arc::new(DirectoryStore::new(settings.remote_dir()));
        let fallback = LocalFallback::new(settings.state_dir().join(FALLBACK_FILE));
        let tracker = ProgressTracker::new(store, fallback);

        let auth = LocalAuth::new(Some(UserIdentity::new(user, None, email)));
        let binding = tracker.bind(&auth);
        let identity = auth.sign_in_interactive()?;
        tracing::debug!(uid = %identity.uid, name = %identity.name, "session opened");

        Ok(Self {
            tracker,
            _binding: binding,
            _auth: auth,
        })
    }
}
