mod simulate;
mod table;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use compose_core::{Key, Settings, VirtualKey};

#[derive(Parser, Debug)]
#[command(author, version, about = "Compose key developer tool", long_about = None)]
struct Args {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List named keys with their text form, friendly name and keycap label
    Keys,
    /// Validate a settings file and print the effective settings
    Settings {
        /// Settings file (defaults are used if it does not exist)
        path: PathBuf,
    },
    /// Type keys through the engine and show what it does
    Simulate {
        /// Sequence table file
        #[arg(short, long)]
        table: PathBuf,
        /// Settings file
        #[arg(short, long)]
        settings: Option<PathBuf>,
        /// `compose`, a key name such as `VK.LEFT`, or text to type
        #[arg(required = true)]
        tokens: Vec<String>,
    },
    /// Install the keyboard hook and compose for real until Enter is pressed
    #[cfg(windows)]
    Run {
        #[arg(short, long)]
        table: PathBuf,
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Ok(Settings::load(path)?),
        None => Ok(Settings::default()),
    }
}

fn list_keys() {
    println!("{:<16} {:<18} {}", "KEY", "NAME", "LABEL");
    for (_, vk) in VirtualKey::named() {
        let key = Key::Virtual(vk);
        println!("{:<16} {:<18} {}", key.to_string(), key.friendly_name(), key.label());
    }
}

fn show_settings(path: &Path) -> Result<()> {
    let settings = Settings::load(path)?;
    print!("{}", settings.to_toml_string()?);
    Ok(())
}

fn simulate(table: &Path, settings: Option<&Path>, tokens: &[String]) -> Result<()> {
    let settings = load_settings(settings)?;
    let report = table::load(table)?;
    let strokes = simulate::parse_tokens(tokens)?;
    let transcript = simulate::run(&settings, report.tree, &strokes)?;

    for (label, decision) in &transcript.decisions {
        println!("{:<12} {:?}", label, decision);
    }
    for event in &transcript.events {
        println!("event: {}", event);
    }
    for injection in &transcript.injections {
        log::debug!("injected {:?}", injection);
    }
    println!("output: {:?}", transcript.output);
    Ok(())
}

#[cfg(windows)]
fn run(table: &Path, settings: Option<&Path>) -> Result<()> {
    use std::sync::Arc;

    use compose_core::{FeedbackLog, SharedSequences};
    use compose_windows::ComposeService;

    let settings = load_settings(settings)?;
    let report = table::load(table)?;
    let sequences = Arc::new(SharedSequences::new(report.tree));
    let log = Arc::new(FeedbackLog::new());

    let mut service = ComposeService::start(&settings, sequences, vec![Box::new(Arc::clone(&log))])?;
    println!("Composing with {} sequences. Press Enter to stop.", service.sequences().snapshot().len());
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    service.stop()?;

    for entry in log.entries() {
        println!("{}", entry);
    }
    if log.dropped() > 0 {
        println!("({} log entries dropped)", log.dropped());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match &args.command {
        Command::Keys => list_keys(),
        Command::Settings { path } => show_settings(path)?,
        Command::Simulate {
            table,
            settings,
            tokens,
        } => simulate(table, settings.as_deref(), tokens)?,
        #[cfg(windows)]
        Command::Run { table, settings } => run(table, settings.as_deref())?,
    }
    Ok(())
}
