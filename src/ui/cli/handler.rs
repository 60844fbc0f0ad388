// Wed Jan 15 2026 - Alex

use super::args::Args;
use crate::config::Options;
use crate::memory::{MemoryTarget, ProcessTarget};
use crate::session::commands::execute;
use crate::session::{CancellationToken, Session};
use crate::ui::{print_error, print_info};
use crate::utils::logging::LoggingUtils;
use anyhow::Context;
use colored::Colorize;
use std::io::{self, BufRead, Write};

pub struct CommandHandler {
    quiet: bool,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn execute(mut self, args: Args) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        self.quiet = args.quiet;
        self.setup_logging(&args);
        if args.no_color {
            colored::control::set_override(false);
        }

        let options = match &args.config {
            Some(path) => Options::load(path).with_context(|| format!("Failed to load {:?}", path))?,
            None => Options::new(),
        };
        options.validate()?;

        let mut session = Session::new(options)
            .with_connector(ProcessTarget::new)
            .with_cancellation(CancellationToken::interrupt());

        if let Some(pid) = args.pid {
            session
                .open_pid(pid)
                .with_context(|| format!("Failed to open process {}", pid))?;
            if !self.quiet {
                print_info(&format!("{} regions to scan in process {}", session.regions().len(), pid));
            }
        }

        for line in args.command_lines() {
            self.run_line(&mut session, line);
            if session.exit_requested() {
                return Ok(());
            }
        }
        if args.batch {
            return Ok(());
        }

        self.repl(&mut session)
    }

    fn setup_logging(&self, args: &Args) {
        let level = if args.quiet {
            log::LevelFilter::Error
        } else {
            LoggingUtils::level_from_str(&args.log_level)
        };
        LoggingUtils::init(level);
    }

    fn run_line<T: MemoryTarget>(&self, session: &mut Session<T>, line: &str) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = execute(session, line, &mut out) {
            print_error(&e.to_string());
        }
    }

    fn repl<T: MemoryTarget>(&self, session: &mut Session<T>) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut line = String::new();
        while !session.exit_requested() {
            print!("{}", format!("{}> ", session.match_count()).green().bold());
            io::stdout().flush()?;

            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                println!();
                break;
            }
            self.run_line(session, &line);
        }
        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
