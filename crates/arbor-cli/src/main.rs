mod logging;
mod runner;
mod source;

use arbor::{DEFAULT_SLOW_THRESHOLD_MS, ReporterConfig, Theme};
use clap::{Parser, ValueEnum};
use runner::{Input, RunConfig};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

/// Hierarchical console reporter for test engine event streams
///
/// Reads newline-delimited JSON test events (`{"type": "test:pass", "data": {...}}`)
/// and prints a tree of suites and tests, followed by a summary with the
/// full details of every failure.
#[derive(Parser, Debug)]
#[command(name = "arbor", version, about, after_help = EXAMPLES)]
struct Cli {
    /// Event file to read; stdin when omitted or `-`
    #[arg(value_name = "FILE", conflicts_with = "command")]
    file: Option<PathBuf>,

    /// When to color the output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Show the duration of tests slower than this many milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_SLOW_THRESHOLD_MS)]
    slow: f64,

    /// Test engine to run; its stdout is read as the event stream
    #[arg(last = true, value_name = "COMMAND")]
    command: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Color when stdout is a terminal and NO_COLOR is unset
    Auto,
    Always,
    Never,
}

const EXAMPLES: &str = "\
EXAMPLES:
    arbor events.ndjson                      # render a recorded run
    my-engine --events | arbor               # read events from stdin
    arbor -- my-engine --events              # spawn the engine and read its stdout
    arbor --color never --slow 200 run.ndjson";

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    let color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        // Auto-downgrade to no-color when stdout isn't a terminal
        ColorChoice::Auto => {
            std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
    };

    let input = if !cli.command.is_empty() {
        Input::Command(cli.command)
    } else {
        match cli.file {
            Some(path) if path.as_os_str() != "-" => Input::File(path),
            _ => Input::Stdin,
        }
    };

    let config = RunConfig {
        input,
        reporter: ReporterConfig {
            theme: Theme::new(color),
            slow_threshold_ms: cli.slow,
        },
    };

    let mut stdout = std::io::stdout().lock();

    match runner::run(&config, &mut stdout) {
        Ok(outcome) if outcome.success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn trailing_arguments_become_the_command() {
        let cli = Cli::parse_from(["arbor", "--slow", "10", "--", "node", "--test"]);
        assert_eq!(cli.command, ["node", "--test"]);
        assert_eq!(cli.slow, 10.0);
        assert!(cli.file.is_none());
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn file_and_command_conflict() {
        let result = Cli::try_parse_from(["arbor", "events.ndjson", "--", "node"]);
        assert!(result.is_err());
    }
}
