#![deny(
    warnings,
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
//! `Proslenkey` - Minimal application launcher over the executables on your PATH.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_cargo::style::CLAP_STYLING;
use proslenkey::config::{self, Config};
use proslenkey::error::{Error, Result};
use proslenkey::launch;
use proslenkey::matcher::validate_query;
use proslenkey::scanner::PathScanner;
use proslenkey::session::{Activation, BACKSPACE, Outcome, Session};
use proslenkey::types::{Candidate, MAX_SUGGESTIONS_LIMIT};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// CLI arguments for `Proslenkey`
#[derive(Parser, Debug)]
#[command(author, version, about, styles = CLAP_STYLING)]
struct Cli {
    /// Settings file to use instead of the one in the config directory
    #[arg(long, global = true)]
    config:  Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Command {
    /// List every executable found on the search path
    List,
    /// Show the suggestions for a query
    Query {
        /// Text as typed into the launcher
        #[arg(default_value = "")]
        text:  String,
        /// Maximum number of suggestions
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Launch a command line the way the launcher does
    Run {
        /// Command line, split with shell rules
        cmdline: String,
    },
    /// Drive a launcher session from standard input
    ///
    /// One event per line: `=TEXT` sets the entry, `+TEXT` types characters,
    /// `-` deletes one, `!` presses Enter, `@N` activates suggestion N, `^N`
    /// Ctrl-activates it, `.` presses Escape.
    Interactive,
}

/// One line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    /// Replace the entry text
    SetText(String),
    /// Type characters into the entry
    Type(String),
    /// Delete the last character
    Backspace,
    /// Enter in the entry
    Enter,
    /// Activate a suggestion
    Activate(usize, Activation),
    /// Escape
    Escape,
}

/// Parse one line of interactive input
fn parse_event(line: &str) -> Option<Event> {
    let mut chars = line.chars();
    let tag = chars.next()?;
    let rest = chars.as_str();
    match tag {
        '=' => Some(Event::SetText(rest.to_owned())),
        '+' => Some(Event::Type(rest.to_owned())),
        '-' if rest.is_empty() => Some(Event::Backspace),
        '!' if rest.is_empty() => Some(Event::Enter),
        '.' if rest.is_empty() => Some(Event::Escape),
        '@' => rest.trim().parse().ok().map(|n| Event::Activate(n, Activation::Plain)),
        '^' => rest.trim().parse().ok().map(|n| Event::Activate(n, Activation::Modified)),
        _ => None,
    }
}

/// Load settings from `path` or the default location
fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Scan the search path honouring the configured exclusions
fn collect_candidates(config: &Config) -> Result<Vec<Candidate>> {
    Ok(PathScanner::from_env().with_exclusions(&config.exclude)?.finish())
}

/// Print every candidate with the path it resolves to
fn list_candidates(config: &Config) -> Result<()> {
    let candidates = collect_candidates(config)?;
    for candidate in &candidates {
        println!("{}\t{}", candidate.name, candidate.path.display());
    }
    Ok(())
}

/// Print the ranked suggestions for `text`
fn query_candidates(config: &Config, text: &str, limit: Option<usize>) -> Result<()> {
    validate_query(text)?;
    let limit = limit.unwrap_or(config.max_suggestions);
    if limit == 0 || limit > MAX_SUGGESTIONS_LIMIT {
        return Err(Error::query(&format!("limit must be between 1 and {MAX_SUGGESTIONS_LIMIT}")));
    }

    let candidates = collect_candidates(config)?;
    let matches = config.matcher().rank_top(text, &candidates, limit);
    if matches.is_empty() {
        println!("No executables match: {text}");
        return Ok(());
    }
    for m in matches {
        println!("{}\t{}", m.name(), m.candidate.path.display());
    }
    Ok(())
}

/// Launch `cmdline` and report the child
fn run_command(cmdline: &str) -> Result<()> {
    let spawned = launch::spawn(cmdline)?;
    println!("Launched {} (pid {})", spawned.program, spawned.pid);
    Ok(())
}

/// Write the entry and the numbered suggestions
fn render(session: &Session, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "> {}", session.text())?;
    for (i, candidate) in session.suggestions().enumerate() {
        writeln!(out, "  [{i}] {}", candidate.name)?;
    }
    Ok(())
}

/// Feed `input` into `session` one event per line until it launches or quits
///
/// A launch that fails to start reopens the session and reading continues.
/// Returns `Launch` once a command started, `Quit` on Escape and `Ignored`
/// when the input ran out.
fn drive(session: &mut Session, input: impl BufRead, out: &mut impl Write) -> Result<Outcome> {
    render(session, out)?;

    for line in input.lines() {
        let line = line?;
        let Some(event) = parse_event(&line) else {
            eprintln!("Unrecognised input: {line}");
            continue;
        };

        let outcome = match event {
            Event::SetText(text) => session.set_text(&text),
            Event::Type(text) => text.chars().fold(Outcome::Ignored, |_, c| session.push_char(c)),
            Event::Backspace => session.push_char(BACKSPACE),
            Event::Enter => session.activate_entry(),
            Event::Activate(index, activation) => session.activate_suggestion(index, activation),
            Event::Escape => session.cancel(),
        };

        match outcome {
            Outcome::Ignored | Outcome::Updated | Outcome::Picked(_) => render(session, out)?,
            Outcome::Launch(cmdline) => match launch::spawn(&cmdline) {
                Ok(spawned) => {
                    writeln!(out, "Launched {} (pid {})", spawned.program, spawned.pid)?;
                    return Ok(Outcome::Launch(cmdline));
                },
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    session.reopen();
                    render(session, out)?;
                },
            },
            Outcome::Quit => return Ok(Outcome::Quit),
        }
    }

    Ok(Outcome::Ignored)
}

/// Run a session fed by standard input
fn interactive(config: &Config) -> Result<()> {
    let candidates = collect_candidates(config)?;
    if let Some(css) = config::stylesheet() {
        tracing::debug!(path = %css.display(), "stylesheet overlay found");
    }
    let mut session = Session::with_matcher(candidates, config.matcher(), config.max_suggestions);
    drive(&mut session, io::stdin().lock(), &mut io::stdout().lock())?;
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_ref()).and_then(|config| match cli.command {
        Command::List => list_candidates(&config),
        Command::Query { text, limit } => query_candidates(&config, &text, limit),
        Command::Run { cmdline } => run_command(&cmdline),
        Command::Interactive => interactive(&config),
    });

    if let Err(e) = result {
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
