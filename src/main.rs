//! CLI entry point for questlog
//!
//! This provides a command-line interface for inspecting journal files.

use std::fs;
use std::path::PathBuf;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "inspect" => {
            if args.len() < 3 {
                eprintln!("Error: Missing journal file path");
                eprintln!();
                print_usage();
                process::exit(1);
            }
            let file_path = PathBuf::from(&args[2]);
            let index = parse_index(&args[3..]);
            run_inspect(file_path, index);
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Error: Unknown command '{}'", command);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    }
}

fn parse_index(args: &[String]) -> Option<usize> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--index" {
            return iter.next().and_then(|v| v.parse().ok());
        }
    }
    None
}

fn print_usage() {
    println!("questlog - Campaign Journal Engine");
    println!();
    println!("USAGE:");
    println!("    cargo run -- inspect <journal.json> [--index N]");
    println!();
    println!("COMMANDS:");
    println!("    inspect <file> [--index N]    Print the timeline and value snapshots");
    println!("    --help, -h                    Show this help message");
    println!();
    println!("OPTIONS:");
    println!("    --index N    Snapshot history index (defaults to the saved cursor)");
    println!();
    println!("EXAMPLES:");
    println!("    cargo run -- inspect campaign.journal.json");
    println!("    cargo run -- inspect campaign.journal.json --index 12");
}

fn run_inspect(file_path: PathBuf, index: Option<usize>) {
    let bytes = match fs::read(&file_path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Error: Failed to read file '{}'", file_path.display());
            eprintln!("Reason: {}", err);
            process::exit(1);
        }
    };

    if let Err(err) = questlog::cli::inspect::run_inspect(&bytes, index) {
        eprintln!("Error: Inspection failed");
        eprintln!("Reason: {}", err);
        process::exit(1);
    }
}
