use argcompgen::CompgenError;
use colored::Colorize;
use std::process;

fn main() {
    if let Err(e) = argcompgen::cli::run() {
        match e.downcast_ref::<CompgenError>() {
            Some(CompgenError::Usage(usage)) => eprint!("{}", usage),
            _ => eprintln!("{} {:#}", "Error:".red(), e),
        }
        process::exit(1);
    }
}
