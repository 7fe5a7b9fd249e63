// ABOUTME: Version info, REPL banner text, and shared constants

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const WELCOME_MESSAGE: &str = "Eusha Language";
pub const WELCOME_SUBTITLE: &str = "A beginner-friendly dynamic scripting language";
pub const WELCOME_FOOTER: &str = "Type 'exit' or 'quit' to leave, help() for help.";

pub const PROMPT: &str = "eusha> ";

/// Conventional suffix for source files; others run with a warning
pub const SOURCE_EXTENSION: &str = "elang";
