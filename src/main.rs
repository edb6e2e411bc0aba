mod ai;
mod models;
mod profile;
mod query;
mod session;
mod store;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ai::AiProvider;
use models::{
    BusinessProfile, BusinessType, HubReminder, HubTask, IncomeUrgency, JobAlert, JobStatus,
    PitchAssessment, ProfileDraft, Recency, RoadmapAssessment, SavedJob, SavedResume, SoloOrTeam,
    Stage, StrategyAssessment,
};
use profile::{NotePatch, Profiles};
use query::StatusFilter;
use store::Store;

#[derive(Parser)]
#[command(name = "pivot")]
#[command(about = "Career transition tracker - ventures, jobs, and AI-generated plans")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage business profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Manage notes on a profile
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },

    /// Track investors for a profile
    Investor {
        #[command(subcommand)]
        command: InvestorCommands,
    },

    /// Generate artifacts with an AI model
    Generate {
        #[command(subcommand)]
        command: GenerateCommands,
    },

    /// Track job applications
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Manage saved job-search alerts
    Alert {
        #[command(subcommand)]
        command: AlertCommands,
    },

    /// Manage saved resumes
    Resume {
        #[command(subcommand)]
        command: ResumeCommands,
    },

    /// Tasks and reminders
    Hub {
        #[command(subcommand)]
        command: HubCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Create a business profile from assessment answers
    Create {
        /// Business name
        name: String,

        #[arg(short = 't', long, value_enum)]
        business_type: BusinessType,

        #[arg(short = 'o', long, value_enum, default_value = "solo")]
        solo_or_team: SoloOrTeam,

        #[arg(short, long, value_enum)]
        stage: Stage,

        /// Time available per week, free text (e.g. "10 hours")
        #[arg(long)]
        time: String,

        #[arg(short, long, value_enum)]
        urgency: IncomeUrgency,

        #[arg(long)]
        target_customer: Option<String>,

        #[arg(long)]
        problem: Option<String>,

        #[arg(long)]
        pricing: Option<String>,

        /// Existing asset; repeatable
        #[arg(short, long)]
        asset: Vec<String>,
    },

    /// List profiles
    List,

    /// Show a profile and its artifacts
    Show {
        /// Profile id; defaults to the selected profile
        id: Option<String>,
    },

    /// Select the profile other commands default to
    Select {
        id: String,
    },

    /// Delete a profile (clears the selection if it pointed here)
    Delete {
        id: String,
    },

    /// Record an existing asset on a profile
    Asset {
        asset: String,

        #[arg(short, long)]
        profile: Option<String>,
    },
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Add a note
    Add {
        title: String,
        content: String,

        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Edit a note; only the supplied fields change
    Edit {
        note_id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Delete a note
    Rm {
        note_id: String,

        #[arg(short, long)]
        profile: Option<String>,
    },
}

#[derive(Subcommand)]
enum InvestorCommands {
    /// Toggle an investor in the profile's favorites
    Fav {
        investor_id: String,

        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Save your read on an investor (replaces any previous entry)
    Note {
        investor_id: String,

        /// Pro; repeatable
        #[arg(long)]
        pro: Vec<String>,

        /// Con; repeatable
        #[arg(long)]
        con: Vec<String>,

        /// Compatibility 0-100 (clamped)
        #[arg(short = 'y', long, default_value = "50")]
        compatibility: i64,

        #[arg(short, long, default_value = "")]
        notes: String,

        #[arg(short, long)]
        profile: Option<String>,
    },
}

#[derive(Subcommand)]
enum GenerateCommands {
    /// Generate and save a launch roadmap
    Roadmap {
        #[arg(short, long)]
        profile: Option<String>,

        #[arg(short, long, default_value = "sonnet")]
        model: String,
    },

    /// Generate and save an investor pitch
    Pitch {
        #[arg(short, long)]
        profile: Option<String>,

        #[arg(short, long, default_value = "sonnet")]
        model: String,
    },

    /// Generate and save revenue strategies
    Strategies {
        #[arg(short, long)]
        profile: Option<String>,

        #[arg(short, long, default_value = "sonnet")]
        model: String,
    },

    /// Suggest business names (not saved)
    Names {
        /// What the venture does
        description: String,

        /// Naming vibe (e.g. "playful", "premium")
        #[arg(short, long)]
        vibe: Option<String>,

        #[arg(short, long, default_value = "sonnet")]
        model: String,
    },

    /// Generate and save a logo concept
    Logo {
        /// Visual style (e.g. "minimal", "retro")
        style: String,

        #[arg(short, long)]
        profile: Option<String>,

        #[arg(short, long, default_value = "sonnet")]
        model: String,
    },
}

#[derive(Subcommand)]
enum JobCommands {
    /// Save a job by its application URL
    Save {
        url: String,
        title: String,
        company: String,
    },

    /// List saved jobs
    List {
        /// Filter by status; omit for all
        #[arg(short, long, value_enum)]
        status: Option<JobStatus>,
    },

    /// Update a job's status
    Status {
        url: String,

        #[arg(value_enum)]
        status: JobStatus,
    },

    /// Remove a saved job
    Rm {
        url: String,
    },
}

#[derive(Subcommand)]
enum AlertCommands {
    /// Save a search-filter snapshot
    Add {
        keywords: String,

        #[arg(short, long, default_value = "Remote")]
        location: String,

        #[arg(short, long, default_value = "Full-time")]
        job_type: String,

        #[arg(short, long, value_enum, default_value = "week")]
        recency: Recency,
    },

    /// List alerts
    List,

    /// Remove an alert
    Rm {
        id: String,
    },
}

#[derive(Subcommand)]
enum ResumeCommands {
    /// Save a resume from a file
    Save {
        name: String,
        file: PathBuf,
    },

    /// List saved resumes
    List,

    /// Show a saved resume
    Show {
        name: String,
    },

    /// Rewrite a saved resume for a job description
    Rewrite {
        /// Saved resume name
        name: String,

        /// File holding the job description
        #[arg(short, long)]
        job_file: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, default_value = "sonnet")]
        model: String,
    },
}

#[derive(Subcommand)]
enum HubCommands {
    /// Add a task
    Task {
        title: String,
    },

    /// Mark a task done
    Done {
        id: String,
    },

    /// List open and done tasks
    Tasks,

    /// Add a reminder (due: YYYY-MM-DD or RFC 3339)
    Remind {
        title: String,
        due: String,
    },

    /// List reminders
    Reminders,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let store = Store::open()?;

    match cli.command {
        Commands::Profile { command } => run_profile(&store, command),
        Commands::Note { command } => run_note(&store, command),
        Commands::Investor { command } => run_investor(&store, command),
        Commands::Generate { command } => run_generate(&store, command),
        Commands::Job { command } => run_job(&store, command),
        Commands::Alert { command } => run_alert(&store, command),
        Commands::Resume { command } => run_resume(&store, command),
        Commands::Hub { command } => run_hub(&store, command),
    }
}

/// Explicit id wins; otherwise fall back to the session selection.
fn resolve_profile_id(store: &Store, explicit: Option<String>) -> Result<String> {
    if let Some(id) = explicit {
        return Ok(id);
    }
    store
        .load_session()
        .selected_profile
        .ok_or_else(|| anyhow!("No profile selected. Run 'pivot profile select <id>' first."))
}

fn make_provider(model: &str) -> Result<Box<dyn AiProvider>> {
    let spec = ai::resolve_model(model)?;
    Ok(ai::create_provider(&spec)?)
}

fn run_profile(store: &Store, command: ProfileCommands) -> Result<()> {
    let profiles = Profiles::new(store);
    match command {
        ProfileCommands::Create {
            name,
            business_type,
            solo_or_team,
            stage,
            time,
            urgency,
            target_customer,
            problem,
            pricing,
            asset,
        } => {
            let profile = profiles.create(ProfileDraft {
                business_name: name,
                business_type,
                solo_or_team,
                stage,
                time_available_per_week: time,
                income_urgency: urgency,
                target_customer,
                problem_being_solved: problem,
                pricing_model: pricing,
                existing_assets: asset,
            })?;
            println!("Created profile '{}' ({})", profile.business_name, profile.id);
        }

        ProfileCommands::List => {
            let all = profiles.list();
            if all.is_empty() {
                println!("No profiles yet (store: {}).", store.dir().display());
            } else {
                let session = store.load_session();
                println!("{:<38} {:<20} {:<14} {:<16}", "ID", "NAME", "TYPE", "STAGE");
                println!("{}", "-".repeat(90));
                for p in all {
                    let marker = if session.selected_profile.as_deref() == Some(p.id.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    println!(
                        "{}{:<37} {:<20} {:<14} {:<16}",
                        marker,
                        p.id,
                        truncate(&p.business_name, 18),
                        p.business_type,
                        p.stage
                    );
                }
            }
        }

        ProfileCommands::Show { id } => {
            let id = resolve_profile_id(store, id)?;
            let p = profiles.get(&id)?;
            print_profile(&p);
        }

        ProfileCommands::Select { id } => {
            // Validate before pointing the session at it.
            let p = profiles.get(&id)?;
            let mut session = store.load_session();
            session.select(p.id.clone());
            store.save_session(&session)?;
            println!("Selected '{}'.", p.business_name);
        }

        ProfileCommands::Delete { id } => {
            let mut session = store.load_session();
            profiles.delete(&id, &mut session)?;
            store.save_session(&session)?;
            println!("Deleted profile {}.", id);
        }

        ProfileCommands::Asset { asset, profile } => {
            let id = resolve_profile_id(store, profile)?;
            profiles.add_asset(&id, &asset)?;
            println!("Recorded asset '{}'.", asset);
        }
    }
    Ok(())
}

fn print_profile(p: &BusinessProfile) {
    println!("{} ({})", p.business_name, p.id);
    println!("Type: {} | Stage: {} | {:?}", p.business_type, p.stage, p.solo_or_team);
    println!("Time/week: {} | Urgency: {:?}", p.time_available_per_week, p.income_urgency);
    if let Some(tc) = &p.target_customer {
        println!("Target customer: {}", tc);
    }
    if let Some(problem) = &p.problem_being_solved {
        println!("Problem: {}", problem);
    }
    if let Some(pricing) = &p.pricing_model {
        println!("Pricing: {}", pricing);
    }
    if !p.existing_assets.is_empty() {
        println!("Assets: {}", p.existing_assets.join(", "));
    }
    println!(
        "Artifacts: {} roadmap(s), {} pitch(es), {} strategy set(s), {} logo(s)",
        p.saved_roadmaps.len(),
        p.saved_pitches.len(),
        p.saved_revenue_strategies.len(),
        p.saved_logos.len()
    );
    if !p.notes.is_empty() {
        println!("\nNotes:");
        for note in &p.notes {
            println!("  [{}] {} - {}", note.id, note.title, truncate(&note.content, 60));
        }
    }
    if !p.favorite_investors.is_empty() {
        println!("\nFavorite investors: {}", p.favorite_investors.join(", "));
    }
    for (investor, entry) in &p.investor_notes {
        let fav = if query::is_favorited(p, investor) {
            " (favorite)"
        } else {
            ""
        };
        println!(
            "\nInvestor {}{}: compatibility {}/100\n  pros: {}\n  cons: {}",
            investor,
            fav,
            entry.compatibility,
            entry.pros.join("; "),
            entry.cons.join("; ")
        );
        if !entry.notes.is_empty() {
            println!("  notes: {}", entry.notes);
        }
    }
}

fn run_note(store: &Store, command: NoteCommands) -> Result<()> {
    let profiles = Profiles::new(store);
    match command {
        NoteCommands::Add {
            title,
            content,
            profile,
        } => {
            let id = resolve_profile_id(store, profile)?;
            let note = profiles.save_note(&id, &title, &content)?;
            println!("Saved note '{}' ({})", note.title, note.id);
        }

        NoteCommands::Edit {
            note_id,
            title,
            content,
            profile,
        } => {
            let id = resolve_profile_id(store, profile)?;
            let note = profiles.update_note(&id, &note_id, NotePatch { title, content })?;
            println!("Updated note '{}'.", note.title);
        }

        NoteCommands::Rm { note_id, profile } => {
            let id = resolve_profile_id(store, profile)?;
            profiles.delete_note(&id, &note_id)?;
            println!("Deleted note {}.", note_id);
        }
    }
    Ok(())
}

fn run_investor(store: &Store, command: InvestorCommands) -> Result<()> {
    let profiles = Profiles::new(store);
    match command {
        InvestorCommands::Fav {
            investor_id,
            profile,
        } => {
            let id = resolve_profile_id(store, profile)?;
            let now_favorite = profiles.toggle_favorite_investor(&id, &investor_id)?;
            if now_favorite {
                println!("Added {} to favorites.", investor_id);
            } else {
                println!("Removed {} from favorites.", investor_id);
            }
        }

        InvestorCommands::Note {
            investor_id,
            pro,
            con,
            compatibility,
            notes,
            profile,
        } => {
            let id = resolve_profile_id(store, profile)?;
            profiles.save_investor_note(&id, &investor_id, pro, con, compatibility, &notes)?;
            println!("Saved notes on {}.", investor_id);
        }
    }
    Ok(())
}

fn run_generate(store: &Store, command: GenerateCommands) -> Result<()> {
    let profiles = Profiles::new(store);
    match command {
        GenerateCommands::Roadmap { profile, model } => {
            let id = resolve_profile_id(store, profile)?;
            let p = profiles.get(&id)?;
            let provider = make_provider(&model)?;
            let assessment = RoadmapAssessment {
                business_name: p.business_name.clone(),
                business_type: p.business_type,
                stage: p.stage,
                time_available_per_week: p.time_available_per_week.clone(),
                income_urgency: p.income_urgency,
                existing_assets: p.existing_assets.clone(),
            };
            println!("Generating roadmap with {}...", provider.model_name());
            let result = ai::generate_roadmap(provider.as_ref(), &assessment)?;
            let saved = profiles.attach_roadmap(&id, assessment, result)?;
            println!("\n{}", saved.result.summary);
            for m in &saved.result.milestones {
                println!("  [{}] {} - {}", m.timeframe, m.title, m.description);
            }
            println!("\nSaved roadmap {}.", saved.id);
        }

        GenerateCommands::Pitch { profile, model } => {
            let id = resolve_profile_id(store, profile)?;
            let p = profiles.get(&id)?;
            let provider = make_provider(&model)?;
            let assessment = PitchAssessment {
                business_name: p.business_name.clone(),
                target_customer: p.target_customer.clone(),
                problem_being_solved: p.problem_being_solved.clone(),
                pricing_model: p.pricing_model.clone(),
            };
            println!("Generating pitch with {}...", provider.model_name());
            let result = ai::generate_pitch(provider.as_ref(), &assessment)?;
            let saved = profiles.attach_pitch(&id, assessment, result)?;
            println!("\n{}", saved.result.elevator_pitch);
            println!("\nProblem:  {}", saved.result.problem);
            println!("Solution: {}", saved.result.solution);
            println!("Ask:      {}", saved.result.ask);
            println!("\nSaved pitch {}.", saved.id);
        }

        GenerateCommands::Strategies { profile, model } => {
            let id = resolve_profile_id(store, profile)?;
            let p = profiles.get(&id)?;
            let provider = make_provider(&model)?;
            let assessment = StrategyAssessment {
                business_name: p.business_name.clone(),
                business_type: p.business_type,
                stage: p.stage,
                pricing_model: p.pricing_model.clone(),
            };
            println!("Generating revenue strategies with {}...", provider.model_name());
            let result = ai::generate_revenue_strategies(provider.as_ref(), &assessment)?;
            let saved = profiles.attach_strategy(&id, assessment, result)?;
            for s in &saved.result.strategies {
                println!("\n{}: {}", s.name, s.description);
                println!("  First step: {}", s.first_step);
            }
            println!("\nSaved strategies {}.", saved.id);
        }

        GenerateCommands::Names {
            description,
            vibe,
            model,
        } => {
            let provider = make_provider(&model)?;
            println!("Generating names with {}...", provider.model_name());
            let ideas =
                ai::generate_business_names(provider.as_ref(), &description, vibe.as_deref())?;
            for idea in ideas {
                println!("{:<24} {}", idea.name, idea.rationale);
            }
        }

        GenerateCommands::Logo {
            style,
            profile,
            model,
        } => {
            let id = resolve_profile_id(store, profile)?;
            let p = profiles.get(&id)?;
            let provider = make_provider(&model)?;
            println!("Generating logo concept with {}...", provider.model_name());
            let concept = ai::generate_logo_concept(provider.as_ref(), &p, &style)?;
            let saved = profiles.attach_logo(&id, &concept.style, &concept.image_ref)?;
            println!("{}\n\nSaved logo concept {}.", saved.image_ref, saved.id);
        }
    }
    Ok(())
}

fn run_job(store: &Store, command: JobCommands) -> Result<()> {
    match command {
        JobCommands::Save {
            url,
            title,
            company,
        } => {
            let jobs = store.list::<SavedJob>();
            let already = query::is_saved(&jobs, &url);
            // A re-save refreshes title/company but must not demote the
            // status the user already advanced this job to.
            let existing = query::find_by_id(&jobs, &url);
            let mut job = SavedJob {
                id: url.clone(),
                title,
                company,
                status: existing.map(|j| j.status).unwrap_or(JobStatus::Interested),
                saved_at: existing.map(|j| j.saved_at).unwrap_or_else(Utc::now),
            };
            store.upsert(&mut job)?;
            if already {
                println!("Updated saved job {}", url);
            } else {
                println!("Saved job {}", url);
            }
        }

        JobCommands::List { status } => {
            let jobs = store.list::<SavedJob>();
            let filter = match status {
                Some(s) => StatusFilter::Only(s),
                None => StatusFilter::All,
            };
            let filtered = query::filter_by_status(&jobs, filter);
            if filtered.is_empty() {
                println!("No jobs found.");
            } else {
                println!("{:<14} {:<28} {:<18} {:<40}", "STATUS", "TITLE", "COMPANY", "URL");
                println!("{}", "-".repeat(100));
                for job in filtered {
                    println!(
                        "{:<14} {:<28} {:<18} {:<40}",
                        job.status.to_string(),
                        truncate(&job.title, 26),
                        truncate(&job.company, 16),
                        truncate(&job.id, 38)
                    );
                }
            }
        }

        JobCommands::Status { url, status } => {
            let jobs = store.list::<SavedJob>();
            let mut job = query::find_by_id(&jobs, &url)
                .cloned()
                .ok_or_else(|| anyhow!("No saved job with URL {}", url))?;
            job.status = status;
            store.upsert(&mut job)?;
            println!("{} -> {}", url, status);
        }

        JobCommands::Rm { url } => {
            store.remove::<SavedJob>(&url)?;
            println!("Removed {}", url);
        }
    }
    Ok(())
}

fn run_alert(store: &Store, command: AlertCommands) -> Result<()> {
    match command {
        AlertCommands::Add {
            keywords,
            location,
            job_type,
            recency,
        } => {
            let mut alert = JobAlert {
                id: String::new(),
                keywords,
                location,
                job_type,
                recency,
                created_at: Utc::now(),
            };
            store.upsert(&mut alert)?;
            println!("Saved alert {}", alert.id);
        }

        AlertCommands::List => {
            let alerts = store.list::<JobAlert>();
            if alerts.is_empty() {
                println!("No alerts.");
            } else {
                println!("{:<38} {:<24} {:<14} {:<12}", "ID", "KEYWORDS", "LOCATION", "TYPE");
                println!("{}", "-".repeat(90));
                for a in alerts {
                    println!(
                        "{:<38} {:<24} {:<14} {:<12}",
                        a.id,
                        truncate(&a.keywords, 22),
                        truncate(&a.location, 12),
                        truncate(&a.job_type, 10)
                    );
                }
            }
        }

        AlertCommands::Rm { id } => {
            store.remove::<JobAlert>(&id)?;
            println!("Removed alert {}", id);
        }
    }
    Ok(())
}

fn run_resume(store: &Store, command: ResumeCommands) -> Result<()> {
    match command {
        ResumeCommands::Save { name, file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read resume file: {}", file.display()))?;
            let mut resume = SavedResume {
                id: String::new(),
                name: name.clone(),
                saved_at: Utc::now(),
                content,
            };
            store.upsert(&mut resume)?;
            println!("Saved resume '{}' ({})", name, resume.id);
        }

        ResumeCommands::List => {
            let resumes = store.list::<SavedResume>();
            if resumes.is_empty() {
                println!("No resumes saved.");
            } else {
                println!("{:<38} {:<20} {:<20}", "ID", "NAME", "SAVED");
                println!("{}", "-".repeat(80));
                for r in resumes {
                    println!(
                        "{:<38} {:<20} {:<20}",
                        r.id,
                        truncate(&r.name, 18),
                        r.saved_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }

        ResumeCommands::Show { name } => {
            let resume = find_resume(store, &name)?;
            println!("Resume '{}' ({})", resume.name, resume.id);
            println!("Saved: {}", resume.saved_at.format("%Y-%m-%d %H:%M"));
            println!("\n--- Content ---\n{}", resume.content);
        }

        ResumeCommands::Rewrite {
            name,
            job_file,
            output,
            model,
        } => {
            let resume = find_resume(store, &name)?;
            let job_description = std::fs::read_to_string(&job_file)
                .with_context(|| format!("Failed to read job file: {}", job_file.display()))?;
            let provider = make_provider(&model)?;
            println!("Rewriting with {}...", provider.model_name());
            let rewritten = ai::rewrite_resume(provider.as_ref(), &resume.content, &job_description)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &rewritten)
                        .with_context(|| format!("Failed to write to {}", path.display()))?;
                    println!("Wrote rewritten resume to {}", path.display());
                }
                None => println!("\n{}", rewritten),
            }
        }
    }
    Ok(())
}

fn find_resume(store: &Store, name_or_id: &str) -> Result<SavedResume> {
    let resumes = store.list::<SavedResume>();
    resumes
        .iter()
        .find(|r| r.name == name_or_id || r.id == name_or_id)
        .cloned()
        .ok_or_else(|| anyhow!("Resume '{}' not found", name_or_id))
}

fn run_hub(store: &Store, command: HubCommands) -> Result<()> {
    match command {
        HubCommands::Task { title } => {
            let mut task = HubTask {
                id: String::new(),
                title,
                done: false,
                created_at: Utc::now(),
            };
            store.upsert(&mut task)?;
            println!("Added task {}", task.id);
        }

        HubCommands::Done { id } => {
            let tasks = store.list::<HubTask>();
            let mut task = query::find_by_id(&tasks, &id)
                .cloned()
                .ok_or_else(|| anyhow!("No task with id {}", id))?;
            task.done = true;
            store.upsert(&mut task)?;
            println!("Done: {}", task.title);
        }

        HubCommands::Tasks => {
            let tasks = store.list::<HubTask>();
            if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for task in tasks {
                    let mark = if task.done { "x" } else { " " };
                    println!("[{}] {:<38} {}", mark, task.id, task.title);
                }
            }
        }

        HubCommands::Remind { title, due } => {
            let due = parse_due(&due)?;
            let mut reminder = HubReminder {
                id: String::new(),
                title,
                due,
                created_at: Utc::now(),
            };
            store.upsert(&mut reminder)?;
            println!("Added reminder {}", reminder.id);
        }

        HubCommands::Reminders => {
            let reminders = store.list::<HubReminder>();
            if reminders.is_empty() {
                println!("No reminders.");
            } else {
                for r in reminders {
                    println!("{}  {}", r.due.format("%Y-%m-%d %H:%M"), r.title);
                }
            }
        }
    }
    Ok(())
}

fn parse_due(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Could not parse '{}' as YYYY-MM-DD or RFC 3339", raw))?;
    let naive = date
        .and_hms_opt(9, 0, 0)
        .ok_or_else(|| anyhow!("Invalid time of day"))?;
    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    // Cut on a char boundary; free-text fields are not ASCII-only.
    let budget = max.saturating_sub(3);
    let mut end = 0;
    for (i, c) in s.char_indices() {
        if i + c.len_utf8() > budget {
            break;
        }
        end = i + c.len_utf8();
    }
    format!("{}...", &s[..end])
}
