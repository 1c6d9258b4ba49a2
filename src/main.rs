use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shadow_dialogue::language::{self, detect_script, primary_subtag};
use shadow_dialogue::{Catalog, Config, DialogueManager, IntentMatcher, WakeEvent, WakeWordDetector};

/// Shadow - conversational assistant on the terminal
#[derive(Parser)]
#[command(name = "shadow", version, about)]
struct Cli {
    /// Path to a TOML config file (default: ~/.config/shadow/config.toml)
    #[arg(short, long, env = "SHADOW_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Language of the input (e.g., "en", "bn-BD"); detected from the text if omitted
    #[arg(short, long, global = true)]
    lang: Option<String>,

    /// Seed the response generator for a reproducible session
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Talk to Shadow, one utterance per line (default)
    Chat {
        /// Append every interaction to this file as JSON lines
        #[arg(short, long)]
        transcript: Option<PathBuf>,
    },
    /// Print the intent and confidence for an utterance
    Classify {
        /// Utterance to classify
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,shadow_dialogue=info",
        1 => "info,shadow_dialogue=debug",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries the conversation
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.dialogue.seed = Some(seed);
    }

    let catalog = Catalog::load(&config.dialogue.default_language, config.catalog_dir.as_deref())?;
    let lang = cli.lang.as_deref().map(primary_subtag);

    match cli.command {
        Some(Command::Classify { text }) => {
            let utterance = text.join(" ");
            let language = language::resolve_for(&catalog, lang.as_deref(), detect_script(&utterance));
            let matcher = IntentMatcher::new(&catalog, config.dialogue.similarity_threshold);
            let result = matcher.match_utterance(&utterance, language);
            let intent = result.intent.map_or("unknown", |i| i.as_str());
            println!("{intent}\t{}\t{language}", result.confidence);
            Ok(())
        }
        Some(Command::Chat { transcript }) => chat(config, catalog, lang, transcript.as_deref()),
        None => chat(config, catalog, lang, None),
    }
}

/// Read-eval-print loop over stdin
fn chat(
    config: Config,
    catalog: Catalog,
    lang: Option<String>,
    transcript: Option<&Path>,
) -> anyhow::Result<()> {
    let mut wake = config.wake_word.required.then(|| config.wake_word.detector());
    let mut dm = DialogueManager::new(config.dialogue, catalog)?;
    let mut transcript = transcript.map(open_transcript).transpose()?;

    // Session language for lines that carry no text of their own
    let session_lang = language::resolve_for(dm.catalog(), lang.as_deref(), None).to_string();

    say(&dm.activated_message(&session_lang));
    say(&dm.initial_greeting(&session_lang));
    if let Some(primary) = wake.as_ref().and_then(WakeWordDetector::primary) {
        let primary = primary.to_string();
        say(&dm.wake_word_enabled_message(&primary, &session_lang));
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;

        if let Some(text) = dm.expire_question(Utc::now(), &session_lang) {
            say(&text);
        }

        let command = match wake.as_mut() {
            Some(detector) => match detector.process(&line) {
                WakeEvent::Ignored => continue,
                WakeEvent::Activated => {
                    say(&dm.wake_word_listening_message(&session_lang));
                    continue;
                }
                WakeEvent::Command(command) => command,
            },
            None => line,
        };

        let language =
            language::resolve_for(dm.catalog(), lang.as_deref(), detect_script(&command)).to_string();
        let turn = dm.process(Some(command.as_str()), &language);

        say(&turn.response);
        if let Some(follow_up) = &turn.follow_up {
            say(follow_up);
        }

        if turn.utterance.is_some()
            && let (Some(writer), Some(record)) = (transcript.as_mut(), dm.history().last())
        {
            record.write_json_line(&mut *writer)?;
            writer.flush()?;
        }

        if turn.should_exit {
            say(&dm.shutdown_message(&language));
            return Ok(());
        }
    }

    // Input closed without a goodbye
    say(&dm.goodbye_message(&session_lang));
    say(&dm.shutdown_message(&session_lang));
    Ok(())
}

fn open_transcript(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open transcript {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn say(text: &str) {
    println!("Shadow: {text}");
}
