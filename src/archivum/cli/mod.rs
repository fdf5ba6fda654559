//! # CLI Behavior
//!
//! This is **one possible UI client** for archivum, not the application
//! itself. The CLI is the only place that knows about terminal I/O, exit
//! codes and output formatting.
//!
//! ## Data Root
//!
//! Everything lives under one directory, chosen in this order:
//!
//! 1. `--root <dir>`
//! 2. `ARCHIVUM_HOME`
//! 3. The platform data directory (e.g. `~/.local/share/archivum`)
//!
//! ## Naked Execution
//!
//! Running `archivum` with no arguments lists the archives. A failed undo
//! lands on that same listing.
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. The default filter is `warn`,
//! `-v` raises it to `debug`, and `RUST_LOG` overrides both.

mod commands;
mod print;
mod setup;

pub use commands::run;
