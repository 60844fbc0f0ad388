// Wed Jan 15 2026 - Alex

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "memscan")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Interactive scanner for the memory of a running process", long_about = None)]
pub struct Args {
    /// Process to attach to; can also be set later with `pid <n>`
    #[arg(short, long)]
    pub pid: Option<i32>,

    /// JSON options file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Commands to run before the prompt, separated by `;`
    #[arg(short = 'e', long = "command")]
    pub commands: Vec<String>,

    /// Exit after the commands given with -e instead of prompting
    #[arg(long)]
    pub batch: bool,

    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    #[arg(short, long)]
    pub quiet: bool,

    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(pid) = self.pid {
            if pid <= 0 {
                return Err(format!("Invalid pid: {}", pid));
            }
        }
        if let Some(config) = &self.config {
            if !config.exists() {
                return Err(format!("Config file does not exist: {:?}", config));
            }
        }
        if self.batch && self.commands.is_empty() {
            return Err("--batch needs at least one -e command".to_string());
        }
        Ok(())
    }

    /// Every initial command, split on `;`.
    pub fn command_lines(&self) -> impl Iterator<Item = &str> {
        self.commands
            .iter()
            .flat_map(|c| c.split(';'))
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let args = Args::try_parse_from(["memscan", "-p", "42", "-e", "option scan_data_type int32; 100", "-e", "list", "--batch"]).unwrap();
        assert_eq!(args.pid, Some(42));
        assert!(args.batch);
        assert_eq!(args.command_lines().collect::<Vec<_>>(), vec!["option scan_data_type int32", "100", "list"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let args = Args::try_parse_from(["memscan", "--pid", "0"]).unwrap();
        assert!(args.validate().is_err());

        let args = Args::try_parse_from(["memscan", "--batch"]).unwrap();
        assert!(args.validate().is_err());

        let args = Args::try_parse_from(["memscan", "-c", "/nonexistent/memscan.json"]).unwrap();
        assert!(args.validate().is_err());

        let args = Args::try_parse_from(["memscan"]).unwrap();
        assert_eq!(args.log_level, "info");
        assert!(args.validate().is_ok());
    }
}
