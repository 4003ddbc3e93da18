use crate::source::EventSource;
use anyhow::{Context, Result};
use arbor::{Reporter, ReporterConfig};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Where the event stream comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
    /// Program and arguments of a test engine that writes events to stdout.
    Command(Vec<String>),
}

pub struct RunConfig {
    pub input: Input,
    pub reporter: ReporterConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub failures: usize,
    /// False when a spawned engine exited unsuccessfully.
    pub engine_succeeded: bool,
}

impl Outcome {
    pub fn success(&self) -> bool {
        self.failures == 0 && self.engine_succeeded
    }
}

pub fn run(config: &RunConfig, w: &mut dyn Write) -> Result<Outcome> {
    match &config.input {
        Input::Stdin => report(io::stdin().lock(), config.reporter, w),
        Input::File(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            report(BufReader::new(file), config.reporter, w)
        }
        Input::Command(argv) => run_command(argv, config.reporter, w),
    }
}

fn run_command(argv: &[String], reporter: ReporterConfig, w: &mut dyn Write) -> Result<Outcome> {
    let (program, args) = argv.split_first().context("No command given")?;

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::inherit());

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn `{program}`"))?;
    let stdout = child
        .stdout
        .take()
        .context("Child stdout was not captured")?;

    // Reap the child even when the report itself fails.
    let outcome = report(BufReader::new(stdout), reporter, w);
    let status = child.wait()?;
    tracing::debug!(%status, "test engine exited");

    let outcome = outcome?;
    Ok(Outcome {
        engine_succeeded: status.success(),
        ..outcome
    })
}

/// Drive the reporter over `reader`, writing fragments as they are produced.
pub fn report<R: BufRead>(reader: R, config: ReporterConfig, w: &mut dyn Write) -> Result<Outcome> {
    let mut reporter = Reporter::new(EventSource::new(reader), config);

    for fragment in reporter.by_ref() {
        let fragment = fragment.context("Malformed test event stream")?;
        w.write_all(fragment.as_bytes())?;
        w.flush()?;
    }

    let failures = reporter.failure_count();
    reporter
        .into_source()
        .finish()
        .context("Failed to read test events")?;

    Ok(Outcome {
        failures,
        engine_succeeded: true,
    })
}
