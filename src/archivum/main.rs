//! # Archivum CLI
//!
//! The binary is intentionally thin: the CLI lives in `cli/`, while this file
//! only invokes `cli::run()` and handles process termination.
//!
//! From the CLI's vantage point the layering is:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/archivum/cli/)                              │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring, upload copying, dispatch (commands.rs)   │
//! │  - Terminal output (print.rs)                               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Behind a web front end, multipart middleware would write uploaded files.
//! Here `archivum upload` copies the given files into the archive folder
//! itself and then hands the file names to the core.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
