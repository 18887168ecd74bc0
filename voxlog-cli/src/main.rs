//! Interactive front end that plays the role of the voice platform: it maps
//! typed commands to intents, runs the dialog loop against the engine, and
//! carries the opaque session state from one turn to the next.

mod settings;

use anyhow::Result;
use clap::Parser;
use settings::Settings;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use voxlog_core::config::InMemoryConfigService;
use voxlog_core::dialog::{Directive, Intent, TurnRequest, TurnResponse};
use voxlog_core::interpret::{LoggingErrorReporter, PlainErrorInterpreter};
use voxlog_core::tsv::FileTabularData;
use voxlog_core::{Journal, JournalProvider, JournalSkill};

/// voxlog — dialog-driven personal journal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Journal file to use instead of the configured one
    #[arg(long, short, env = "VOXLOG_JOURNAL")]
    journal: Option<PathBuf>,
    /// Locale the engine speaks in (e.g. en-US, de-DE)
    #[arg(long, short)]
    locale: Option<String>,
}

struct FileJournalProvider {
    path: PathBuf,
}

impl JournalProvider for FileJournalProvider {
    fn get(&self, _access_token: &str) -> Result<Journal> {
        Ok(Journal::new(Box::new(FileTabularData::open(&self.path)?)))
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("voxlog: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load()?;
    let journal_path = cli.journal.unwrap_or(settings.journal_path);
    let locale = cli.locale.unwrap_or(settings.locale);

    let skill = JournalSkill::new(
        Arc::new(FileJournalProvider { path: journal_path }),
        Box::new(PlainErrorInterpreter),
        Box::new(LoggingErrorReporter),
        Box::new(InMemoryConfigService::new()),
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut session = serde_json::Value::Null;

    let launch = run_turn(
        &skill,
        TurnRequest::launch(),
        &locale,
        &settings.user_id,
        session,
    );
    println!("{}", launch.speech);
    session = launch.session;

    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }
        if input == "commands" {
            print_commands();
            continue;
        }

        let Some((intent, required_slots)) = command_to_intent(input) else {
            println!("Unknown command. Type \"commands\" for the list.");
            continue;
        };

        let (response, next_session) = dialog_loop(
            &skill,
            intent,
            &required_slots,
            &locale,
            &settings.user_id,
            session,
            &mut lines,
        )?;
        session = next_session;
        if response.end_session {
            break;
        }
    }
    Ok(())
}

/// Maps one typed command to the intent the platform would have resolved it
/// to, plus the slots its dialog model would elicit before delegating back.
fn command_to_intent(input: &str) -> Option<(Intent, Vec<&'static str>)> {
    let (command, rest) = match input.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (input, ""),
    };
    match command {
        "new" => {
            let intent = if rest.is_empty() {
                Intent::new("NewEntryIntent")
            } else {
                Intent::new("NewEntryIntent").with_slot("date", rest)
            };
            Some((intent, vec!["date"]))
        }
        "read" => Some((
            Intent::new("ReadExistingEntryAbsoluteDateIntent").with_slot("date", rest),
            vec!["date"],
        )),
        "month" => Some((
            Intent::new("ReadAllEntriesInDate").with_slot("date", rest),
            vec!["date"],
        )),
        "ago" => {
            // e.g. "ago 3 days"; the unit resolution the platform would
            // provide is synthesized here.
            let (number, unit_word) = rest.split_once(' ')?;
            let resolution = match unit_word.trim_end_matches('s') {
                "day" | "tag" => "DAYS",
                "month" | "monat" => "MONTHS",
                "year" | "jahr" => "YEARS",
                _ => "ER_SUCCESS_NO_MATCH",
            };
            Some((
                Intent::new("ReadExistingEntryRelativeDateIntent")
                    .with_slot("number", number)
                    .with_resolved_slot("unit", unit_word, resolution),
                vec![],
            ))
        }
        "search" => Some((
            Intent::new("SearchIntent").with_slot("query", rest),
            vec![],
        )),
        "delete" => Some((
            Intent::new("DeleteEntryIntent").with_slot("date", rest),
            vec!["date"],
        )),
        "succinct" => Some((Intent::new("BeSuccinctIntent"), vec![])),
        "verbose" => Some((Intent::new("BeVerboseIntent"), vec![])),
        "help" => Some((Intent::new("AMAZON.HelpIntent"), vec![])),
        "stop" => Some((Intent::new("AMAZON.StopIntent"), vec![])),
        _ => None,
    }
}

/// Drives one intent through the engine until it stops issuing directives,
/// playing the platform's dialog-model part: eliciting slots, collecting
/// confirmations and re-dispatching.
fn dialog_loop(
    skill: &JournalSkill,
    mut intent: Intent,
    required_slots: &[&str],
    locale: &str,
    user_id: &str,
    mut session: serde_json::Value,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<(TurnResponse, serde_json::Value)> {
    let mut phase = "STARTED".to_string();

    loop {
        let request = TurnRequest::intent(intent.clone(), phase.as_str())
            .with_token("local")
            .with_user(user_id)
            .with_locale(locale)
            .with_session(session);
        let response = skill.handle_turn(&request);
        if !response.speech.is_empty() {
            println!("{}", response.speech);
        }
        session = response.session.clone();

        match &response.directive {
            None => return Ok((response, session)),
            Some(Directive::Delegate) => {
                if let Some(updated) = &response.updated_intent {
                    intent = updated.clone();
                }
                for name in required_slots {
                    if intent.slot_value(name).is_empty() {
                        let value = prompt(&format!("{name}? "), lines)?;
                        intent = intent.with_slot(*name, value);
                    }
                }
                // The engine owns the rest of the NewEntryIntent dialog; other
                // delegated intents are considered fully filled now.
                phase = if intent.name == "NewEntryIntent" {
                    "IN_PROGRESS".to_string()
                } else {
                    "COMPLETED".to_string()
                };
            }
            Some(Directive::ElicitSlot(name)) => {
                let value = prompt(&format!("{name}? "), lines)?;
                intent = intent.with_slot(name.clone(), value);
                phase = "IN_PROGRESS".to_string();
            }
            Some(Directive::ConfirmSlot(name)) => {
                let confirmation = yes_no(lines)?;
                intent = intent.with_slot_confirmation(name.clone(), confirmation);
                phase = "IN_PROGRESS".to_string();
            }
            Some(Directive::ConfirmIntent) => {
                let confirmation = yes_no(lines)?;
                intent = intent.with_confirmation(confirmation);
            }
        }
    }
}

fn run_turn(
    skill: &JournalSkill,
    request: TurnRequest,
    locale: &str,
    user_id: &str,
    session: serde_json::Value,
) -> TurnResponse {
    skill.handle_turn(
        &request
            .with_token("local")
            .with_user(user_id)
            .with_locale(locale)
            .with_session(session),
    )
}

fn prompt(
    label: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(line?.trim().to_string()),
        None => Ok(String::new()),
    }
}

fn yes_no(lines: &mut impl Iterator<Item = io::Result<String>>) -> Result<&'static str> {
    let answer = prompt("[y/n] ", lines)?;
    Ok(match answer.to_lowercase().as_str() {
        "y" | "yes" | "ja" | "j" => "CONFIRMED",
        _ => "DENIED",
    })
}

fn print_commands() {
    println!(
        "\
new [date]         draft a new entry (say \"done\" to finish, \"correct\", \"repeat\", \"abort\")
read <date>        read the entry of a day, e.g. read 1994-08-20
month <YYYY-MM>    read all entries of a month
ago <n> <unit>     read the entry from n days/months/years ago
search <words>     fuzzy-search all entries
delete <date>      delete the entries of a day
succinct, verbose  switch spoken style
help               what the journal can do
quit               leave"
    );
}
