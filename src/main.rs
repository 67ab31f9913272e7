use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pathway::account::{self, AccountError, SignUpRequest};
use pathway::assessment::{AnswerOutcome, AssessmentSession, SessionError};
use pathway::config::AppPaths;
use pathway::prefs::{ProfilePreferences, ProgressPreferences};
use pathway::db::builtin_topics;
use pathway::{Database, LearningStore, Topic, TopicId, UserProfile, doctor};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// pathway - topic study and self-assessment from the terminal
#[derive(Parser)]
#[command(name = "pathway")]
#[command(about = "Study topics, take short quizzes and track your progress")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// List all topics
    Topics,
    /// Show the study material for a topic
    Study(StudyCommand),
    /// Create an account and sign in
    SignUp(SignUpCommand),
    /// Sign in to an existing account
    SignIn(SignInCommand),
    /// Sign out on this device
    SignOut,
    /// Show or edit the signed-in profile
    Profile(ProfileCommand),
    /// Take the assessment for a topic
    Quiz(TopicArg),
    /// Show completion and scores per topic
    Progress,
    /// Delete the signed-in account and its progress
    DeleteAccount(DeleteAccountCommand),
    /// Check database health and show statistics
    Doctor,
}

#[derive(Parser)]
struct TopicArg {
    /// Topic ID as shown by `pathway topics`
    #[arg(value_name = "TOPIC")]
    topic: i64,
}

#[derive(Parser)]
struct StudyCommand {
    /// Topic ID as shown by `pathway topics`
    #[arg(value_name = "TOPIC")]
    topic: i64,

    /// Mark the topic as studied, which unlocks its quiz
    #[arg(long, conflicts_with = "reset")]
    complete: bool,

    /// Clear the studied mark
    #[arg(long)]
    reset: bool,
}

#[derive(Parser)]
struct SignUpCommand {
    #[arg(short, long)]
    username: String,

    #[arg(short, long)]
    email: String,

    /// Free-text interests, e.g. "kotlin, design"
    #[arg(short, long, default_value = "")]
    interests: String,
}

#[derive(Parser)]
struct SignInCommand {
    #[arg(short, long)]
    email: String,
}

#[derive(Parser)]
struct ProfileCommand {
    /// New username
    #[arg(short, long)]
    username: Option<String>,

    /// New interests
    #[arg(short, long)]
    interests: Option<String>,
}

#[derive(Parser)]
struct DeleteAccountCommand {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

/// Errors caused by command-line input.
#[derive(Debug, Error)]
enum CliError {
    #[error("topic {0} does not exist")]
    UnknownTopic(TopicId),

    #[error("finish studying topic {0} first: run `pathway study {0} --complete`")]
    NotStudied(TopicId),

    #[error("input ended before the command finished")]
    InputClosed,
}

/// Everything a command needs, built once per invocation.
struct App {
    paths: AppPaths,
    store: LearningStore,
    profile: ProfilePreferences,
    progress: ProgressPreferences,
}

impl App {
    fn open(paths: AppPaths) -> Result<Self> {
        paths.ensure_exists()?;
        let db = Database::open(paths.database_path()).context("Failed to open database")?;
        let profile = ProfilePreferences::load(paths.profile_prefs_path())?;
        let progress = ProgressPreferences::load(paths.progress_prefs_path())?;

        Ok(Self {
            paths,
            store: LearningStore::new(db),
            profile,
            progress,
        })
    }

    fn require_user(&self) -> Result<UserProfile> {
        Ok(account::current_user(&self.store, &self.profile)?.ok_or(AccountError::NotSignedIn)?)
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pathway=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let result = AppPaths::resolve()
        .and_then(App::open)
        .and_then(|mut app| {
            let stdin = io::stdin();
            let stdout = io::stdout();
            execute(&cli.command, &mut app, &mut stdin.lock(), &mut stdout.lock())
        });

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are bad input and account outcomes like a wrong password.
/// Internal errors include database failures and I/O errors.
fn is_user_error(error: &anyhow::Error) -> bool {
    if let Some(e) = error.downcast_ref::<AccountError>() {
        return e.is_user_error();
    }
    error.downcast_ref::<CliError>().is_some()
}

fn execute(
    command: &Commands,
    app: &mut App,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Topics => execute_topics(app, out),
        Commands::Study(cmd) => execute_study(app, cmd, out),
        Commands::SignUp(cmd) => execute_sign_up(app, cmd, input, out),
        Commands::SignIn(cmd) => execute_sign_in(app, cmd, input, out),
        Commands::SignOut => {
            account::sign_out(&mut app.profile)?;
            writeln!(out, "Signed out")?;
            Ok(())
        }
        Commands::Profile(cmd) => execute_profile(app, cmd, out),
        Commands::Quiz(arg) => execute_quiz(app, TopicId::new(arg.topic), input, out),
        Commands::Progress => execute_progress(app, out),
        Commands::DeleteAccount(cmd) => execute_delete_account(app, cmd, input, out),
        Commands::Doctor => doctor::run_health_checks(&app.paths.database_path(), &app.store),
    }
}

/// Lists the stored topics, or the built-in list when the catalog is empty.
fn catalog(app: &App) -> Result<Vec<Topic>> {
    let topics = app.store.list_topics().context("Failed to load topics")?;
    if topics.is_empty() {
        tracing::warn!("Topic catalog is empty, using built-in topics");
        return Ok(builtin_topics());
    }
    Ok(topics)
}

fn find_topic(app: &App, topic_id: TopicId) -> Result<Topic> {
    if let Some(topic) = app.store.get_topic(topic_id).context("Failed to load topic")? {
        return Ok(topic);
    }
    catalog(app)?
        .into_iter()
        .find(|topic| topic.id() == topic_id)
        .ok_or_else(|| CliError::UnknownTopic(topic_id).into())
}

fn execute_topics(app: &App, out: &mut impl Write) -> Result<()> {
    for topic in &catalog(app)? {
        let mark = if app.progress.is_topic_completed(topic.id()) {
            "x"
        } else {
            " "
        };
        writeln!(out, "[{mark}] {:>3}  {}", topic.id().get(), topic.title())?;
        writeln!(out, "         {}", topic.description())?;
    }
    Ok(())
}

fn execute_study(app: &mut App, cmd: &StudyCommand, out: &mut impl Write) -> Result<()> {
    let topic_id = TopicId::new(cmd.topic);
    let topic = find_topic(app, topic_id)?;

    writeln!(out, "{}", topic.title())?;
    writeln!(out)?;
    writeln!(out, "{}", app.store.study_content(topic_id))?;
    writeln!(out)?;

    if cmd.reset {
        app.progress.mark_topic_uncompleted(topic_id)?;
        writeln!(out, "Studied mark cleared")?;
    } else if cmd.complete || app.progress.is_topic_completed(topic_id) {
        if cmd.complete {
            app.progress.mark_topic_completed(topic_id)?;
        }
        writeln!(out, "Studied. Take the quiz with `pathway quiz {topic_id}`")?;
    } else {
        writeln!(out, "Done reading? Run `pathway study {topic_id} --complete`")?;
    }
    Ok(())
}

fn execute_sign_up(
    app: &mut App,
    cmd: &SignUpCommand,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let password = prompt(input, out, "Password: ")?;
    let confirm_password = prompt(input, out, "Confirm password: ")?;

    let request = SignUpRequest {
        username: cmd.username.clone(),
        email: cmd.email.clone(),
        password,
        confirm_password,
        interests: cmd.interests.clone(),
    };
    let profile = account::sign_up(&app.store, &mut app.profile, &request)?;

    writeln!(out, "Welcome, {}! You are signed in.", profile.username)?;
    Ok(())
}

fn execute_sign_in(
    app: &mut App,
    cmd: &SignInCommand,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let password = prompt(input, out, "Password: ")?;
    let profile = account::sign_in(&app.store, &mut app.profile, &cmd.email, &password)?;

    writeln!(out, "Welcome back, {}!", profile.username)?;
    Ok(())
}

fn execute_profile(app: &mut App, cmd: &ProfileCommand, out: &mut impl Write) -> Result<()> {
    let profile = if cmd.username.is_some() || cmd.interests.is_some() {
        account::update_profile(
            &app.store,
            &mut app.profile,
            cmd.username.as_deref(),
            cmd.interests.as_deref(),
        )?
    } else {
        app.require_user()?
    };

    writeln!(out, "Username:  {}", profile.username)?;
    writeln!(out, "Email:     {}", profile.email)?;
    writeln!(out, "Interests: {}", profile.interests)?;
    if let Some(created_at) = profile.created_at {
        writeln!(out, "Joined:    {}", created_at.date())?;
    }
    Ok(())
}

fn execute_quiz(
    app: &mut App,
    topic_id: TopicId,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let user = app.require_user()?;
    let topic = find_topic(app, topic_id)?;
    if !app.progress.is_topic_completed(topic_id) {
        return Err(CliError::NotStudied(topic_id).into());
    }

    let mut session = AssessmentSession::start(&app.store, &mut app.progress, user.id, topic_id);
    writeln!(out, "{} assessment, {} questions", topic.title(), session.total())?;

    loop {
        let Some(question) = session.current_question() else {
            break;
        };
        writeln!(out)?;
        writeln!(
            out,
            "Question {} of {}: {}",
            session.current_index() + 1,
            session.total(),
            question.text()
        )?;
        for (i, option) in question.options().iter().enumerate() {
            writeln!(out, "  {}) {}", i + 1, option)?;
        }

        let answer = prompt(input, out, "Your answer: ")?;
        match session.submit_answer(parse_selection(&answer)) {
            Ok(AnswerOutcome::Next { correct, .. }) => {
                writeln!(out, "{}", feedback(correct))?;
            }
            Ok(AnswerOutcome::Finished { correct, report }) => {
                writeln!(out, "{}", feedback(correct))?;
                writeln!(out)?;
                let result = &report.result;
                writeln!(
                    out,
                    "Score: {}/{} ({}%)",
                    result.correct, result.total, result.percentage
                )?;
                writeln!(out, "{}", result.tier.message())?;
                if !report.is_saved() {
                    writeln!(out, "Your result could not be saved.")?;
                }
                break;
            }
            Err(e @ (SessionError::NoSelection | SessionError::SelectionOutOfRange { .. })) => {
                writeln!(out, "{e}")?;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn execute_progress(app: &App, out: &mut impl Write) -> Result<()> {
    let user = app.require_user()?;
    let topics = catalog(app)?;
    let rows = app
        .store
        .progress_for_user(user.id)
        .context("Failed to load progress")?;

    for topic in &topics {
        let line = match rows.iter().find(|row| row.topic_id == topic.id()) {
            Some(row) if row.completed => format!("{}%", row.score),
            _ => "not started".to_string(),
        };
        writeln!(out, "{:>3}  {:<28} {}", topic.id().get(), topic.title(), line)?;
    }

    let completed = rows.iter().filter(|row| row.completed).count();
    let overall = app.store.overall_progress(user.id, topics.len() as u32)?;
    writeln!(out)?;
    writeln!(
        out,
        "Completed {} of {} topics ({:.0}%)",
        completed,
        topics.len(),
        overall
    )?;
    Ok(())
}

fn execute_delete_account(
    app: &mut App,
    cmd: &DeleteAccountCommand,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let user = app.require_user()?;

    if !cmd.yes {
        let answer = prompt(
            input,
            out,
            &format!("Delete account {} and all progress? [y/N] ", user.email),
        )?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            writeln!(out, "Cancelled")?;
            return Ok(());
        }
    }

    account::delete_account(&app.store, &mut app.profile, &mut app.progress)?;
    writeln!(out, "Account deleted")?;
    Ok(())
}

/// Writes `label` and reads one line, without the trailing newline.
fn prompt(input: &mut impl BufRead, out: &mut impl Write, label: &str) -> Result<String> {
    write!(out, "{label}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(CliError::InputClosed.into());
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Maps a 1-based option number to a selection.
///
/// Blank or non-numeric input means nothing was selected.
fn parse_selection(input: &str) -> Option<usize> {
    input.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

fn feedback(correct: bool) -> &'static str {
    if correct { "Correct!" } else { "Incorrect." }
}
