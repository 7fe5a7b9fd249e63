// ABOUTME: CLI entry point: script mode and the interactive prompt

use clap::Parser;
use elang::builtins;
use elang::config;
use elang::error::ElangError;
use elang::eval::Evaluator;
use elang::value::Value;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// The Eusha language interpreter
#[derive(Parser, Debug)]
#[command(name = "elang")]
#[command(version = config::VERSION)]
#[command(about = "Run an Eusha program or start the interactive prompt")]
struct CliArgs {
    /// Source file to run (omit to start the prompt)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match args.script {
        Some(path) => run_script(&path),
        None => repl(),
    }
}

fn run_script(path: &Path) -> ExitCode {
    if !path.exists() {
        eprintln!("Error: no such file: {}", path.display());
        return ExitCode::FAILURE;
    }
    if path.extension().and_then(|e| e.to_str()) != Some(config::SOURCE_EXTENSION) {
        eprintln!(
            "Warning: {} does not end in .{}",
            path.display(),
            config::SOURCE_EXTENSION
        );
    }

    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: cannot read {}: {}", path.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let base_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    let env = builtins::global_env();
    let mut evaluator = Evaluator::new(base_dir);

    match evaluator.run_program(&source, &env) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            report(&source, &err);
            ExitCode::FAILURE
        }
    }
}

fn repl() -> ExitCode {
    println!("{} v{}", config::WELCOME_MESSAGE, config::VERSION);
    println!("{}", config::WELCOME_SUBTITLE);
    println!("{}", config::WELCOME_FOOTER);

    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl = match DefaultEditor::with_config(rl_config) {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Error: failed to start the prompt: {}", err);
            return ExitCode::FAILURE;
        }
    };

    // One evaluator and one global environment for the whole session
    let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env = builtins::global_env();
    let mut evaluator = Evaluator::new(base_dir);

    loop {
        match rl.readline(config::PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "exit" || trimmed == "quit" {
                    println!("Goodbye!");
                    break;
                }

                match evaluator.run_program(&line, &env) {
                    Ok(Value::Null) => {}
                    Ok(value) => println!("=> {}", value),
                    Err(err) => report(&line, &err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    ExitCode::SUCCESS
}

/// Pointed diagnostic: the offending line with a caret under the column
fn report(source: &str, err: &ElangError) {
    let (line, column) = err.position();
    eprintln!("{}: {}", err.kind_name(), err.message());

    if line > 0 {
        if let Some(text) = source.lines().nth(line as usize - 1) {
            let width = text.chars().count().max(1);
            let caret = (column.max(1) as usize - 1).min(width - 1);
            eprintln!("  --> line {}, column {}", line, column);
            eprintln!("   |");
            eprintln!("   | {}", text);
            eprintln!("   | {}^", " ".repeat(caret));
        }
    }
    if let Some(hint) = err.hint() {
        eprintln!("   = hint: {}", hint);
    }
}
