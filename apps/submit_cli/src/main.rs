use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use shared::{
    domain::{FieldId, Genre, Step, SubmissionType},
    error::{ValidationErrors, WorkflowError},
    protocol::{FieldUpdate, SubmissionReceipt},
};
use submission_core::{files, load_settings, Settings, WorkflowController};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "submit_cli", about = "Submit a story from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk every wizard step and submit the draft.
    Submit {
        #[command(flatten)]
        draft: DraftArgs,
        /// Overrides the configured simulated submission delay.
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Print validation failures for the draft without submitting.
    Validate {
        #[command(flatten)]
        draft: DraftArgs,
    },
    /// List the accepted genres.
    Genres,
}

#[derive(Args, Debug, Default)]
struct DraftArgs {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    author: String,
    #[arg(long)]
    genre: Option<Genre>,
    #[arg(long = "type")]
    submission_type: Option<SubmissionType>,
    #[arg(long, conflicts_with = "synopsis_file")]
    synopsis: Option<String>,
    #[arg(long)]
    synopsis_file: Option<PathBuf>,
    /// Manuscript to attach; repeat for several files.
    #[arg(long = "file")]
    files: Vec<PathBuf>,
}

impl DraftArgs {
    fn synopsis(&self) -> Result<String> {
        match (&self.synopsis, &self.synopsis_file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => fs::read_to_string(path)
                .map(|text| text.trim_end().to_string())
                .with_context(|| format!("failed to read synopsis from {}", path.display())),
            (None, None) => Ok(String::new()),
        }
    }
}

#[derive(Debug)]
enum Outcome {
    Submitted(SubmissionReceipt),
    Blocked { step: Step, errors: ValidationErrors },
}

fn fill_details(controller: &mut WorkflowController, args: &DraftArgs) -> Result<()> {
    let updates = [
        FieldUpdate::Title(args.title.clone()),
        FieldUpdate::Author(args.author.clone()),
        FieldUpdate::Genre(args.genre),
        FieldUpdate::SubmissionType(args.submission_type),
        FieldUpdate::Synopsis(args.synopsis()?),
    ];
    for update in updates {
        let field = update.field();
        controller.update_field(update)?;
        controller.mark_touched(field)?;
    }
    Ok(())
}

fn attach_files(controller: &mut WorkflowController, paths: &[PathBuf]) -> Result<()> {
    let candidates = paths
        .iter()
        .map(|path| files::candidate_from_path(path))
        .collect::<Result<Vec<_>>>()?;
    if candidates.is_empty() {
        controller.mark_touched(FieldId::Attachments)?;
        return Ok(());
    }

    let report = controller.admit_files(candidates)?;
    if let Some(warning) = report.warning() {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn advance(controller: &mut WorkflowController) -> Result<Option<Outcome>> {
    let step = controller.step();
    match controller.advance_step() {
        Ok(_) => Ok(None),
        Err(WorkflowError::Validation(errors)) => Ok(Some(Outcome::Blocked { step, errors })),
        Err(err) => Err(err.into()),
    }
}

async fn run_submit(settings: Settings, args: &DraftArgs) -> Result<Outcome> {
    let mut controller = WorkflowController::with_simulated_backend(settings);

    fill_details(&mut controller, args)?;
    if let Some(blocked) = advance(&mut controller)? {
        return Ok(blocked);
    }
    attach_files(&mut controller, &args.files)?;
    if let Some(blocked) = advance(&mut controller)? {
        return Ok(blocked);
    }

    tracing::info!(files = controller.draft().attachments.len(), "submitting story");
    match controller.submit().await {
        Ok(receipt) => Ok(Outcome::Submitted(receipt)),
        Err(WorkflowError::Validation(errors)) => Ok(Outcome::Blocked {
            step: Step::Review,
            errors,
        }),
        Err(err) => Err(err.into()),
    }
}

fn run_validate(settings: Settings, args: &DraftArgs) -> Result<ValidationErrors> {
    let mut controller = WorkflowController::with_simulated_backend(settings);
    fill_details(&mut controller, args)?;
    attach_files(&mut controller, &args.files)?;
    Ok(controller.validate_all())
}

fn print_summary(step: Step, errors: &ValidationErrors) {
    eprintln!("Cannot continue past step {}: {}", step.number(), step.title());
    for (field, message) in errors.iter() {
        eprintln!("  {field}: {message}");
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Submit { draft, delay_ms } => {
            let mut settings = load_settings();
            if let Some(delay_ms) = delay_ms {
                settings.submit_delay_ms = delay_ms;
            }
            match run_submit(settings, &draft).await? {
                Outcome::Submitted(receipt) => {
                    println!("{}", serde_json::to_string_pretty(&receipt)?);
                    Ok(ExitCode::SUCCESS)
                }
                Outcome::Blocked { step, errors } => {
                    print_summary(step, &errors);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Validate { draft } => {
            let errors = run_validate(load_settings(), &draft)?;
            println!("{}", serde_json::to_string_pretty(&errors)?);
            if errors.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Genres => {
            for genre in Genre::ALL {
                println!("{}", genre.label());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn temp_manuscript(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = env::temp_dir().join(format!("submit-cli-test-{nanos}"));
        fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join(name);
        fs::write(&path, b"Once upon a time").expect("write manuscript");
        path
    }

    fn complete_args(file: PathBuf) -> DraftArgs {
        DraftArgs {
            title: "The Lighthouse".into(),
            author: "R. Keeper".into(),
            genre: Some(Genre::Mystery),
            submission_type: Some(SubmissionType::Story),
            synopsis: Some("A keeper finds a message in the lamp.".into()),
            synopsis_file: None,
            files: vec![file],
        }
    }

    fn instant_settings() -> Settings {
        Settings {
            submit_delay_ms: 0,
            ..Settings::default()
        }
    }

    #[test]
    fn parses_submit_flags() {
        let cli = Cli::try_parse_from([
            "submit_cli",
            "submit",
            "--title",
            "Dust",
            "--author",
            "A. Writer",
            "--genre",
            "science fiction",
            "--type",
            "chapter",
            "--synopsis",
            "Short.",
            "--file",
            "a.pdf",
            "--file",
            "b.md",
            "--delay-ms",
            "0",
        ])
        .expect("parse");

        let Command::Submit { draft, delay_ms } = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(draft.genre, Some(Genre::ScienceFiction));
        assert_eq!(draft.submission_type, Some(SubmissionType::Chapter));
        assert_eq!(draft.files.len(), 2);
        assert_eq!(delay_ms, Some(0));
    }

    #[test]
    fn synopsis_flags_conflict() {
        let result = Cli::try_parse_from([
            "submit_cli",
            "validate",
            "--synopsis",
            "inline",
            "--synopsis-file",
            "synopsis.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn validate_reports_every_missing_field() {
        let errors = run_validate(instant_settings(), &DraftArgs::default()).expect("validate");
        let fields: Vec<FieldId> = errors.fields().collect();
        assert_eq!(fields, FieldId::ALL.to_vec());
    }

    #[tokio::test]
    async fn submit_stops_on_details_step_when_incomplete() {
        let args = DraftArgs {
            title: "Only a title".into(),
            ..DraftArgs::default()
        };
        let outcome = run_submit(instant_settings(), &args).await.expect("run");
        match outcome {
            Outcome::Blocked { step, errors } => {
                assert_eq!(step, Step::Details);
                assert!(!errors.contains(FieldId::Title));
                assert!(errors.contains(FieldId::Author));
            }
            Outcome::Submitted(_) => panic!("incomplete draft must not submit"),
        }
    }

    #[tokio::test]
    async fn submit_stops_on_files_step_without_attachments() {
        let mut args = complete_args(PathBuf::new());
        args.files.clear();
        let outcome = run_submit(instant_settings(), &args).await.expect("run");
        assert!(matches!(
            outcome,
            Outcome::Blocked {
                step: Step::Files,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_returns_receipt_for_complete_draft() {
        let manuscript = temp_manuscript("lighthouse.md");
        let args = complete_args(manuscript.clone());
        let outcome = run_submit(Settings::default(), &args).await.expect("run");
        if let Some(dir) = manuscript.parent() {
            let _ = fs::remove_dir_all(dir);
        }
        let Outcome::Submitted(receipt) = outcome else {
            panic!("expected a receipt");
        };
        assert_eq!(receipt.title, "The Lighthouse");
        assert_eq!(receipt.attachment_count, 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let args = complete_args(env::temp_dir().join("submit-cli-does-not-exist.pdf"));
        assert!(run_validate(instant_settings(), &args).is_err());
    }
}
