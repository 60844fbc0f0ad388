// Tue Jan 13 2026 - Alex

use colored::Colorize;

fn main() {
    if let Err(e) = memscan::ui::cli::run() {
        eprintln!("{} {:#}", "error:".red(), e);
        std::process::exit(1);
    }
}
