// Wed Jan 15 2026 - Alex

pub mod cli;
pub mod display;

pub use cli::{Args, CommandHandler};

use colored::Colorize;

pub fn print_info(message: &str) {
    println!("{} {}", "info:".cyan(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "error:".red(), message);
}
