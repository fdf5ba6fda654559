//! # Archivum Architecture
//!
//! Archivum keeps the metadata of files uploaded into named archives,
//! publishes the visible part of it as a tab-separated manifest, and lets
//! every change be undone by restoring a full copy of the database taken just
//! before it.
//!
//! Like any UI-agnostic core, it is a library that happens to have a CLI
//! client. The same API could sit behind a web dashboard's request handlers.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, copies uploaded files, prints output   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade, outcomes → CmdResult                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Coordinator (coordinator.rs)                               │
//! │  - One lock: save point → transaction → stamp → manifest    │
//! │  - Undo: close handle, restore snapshot, reopen             │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                │                 │
//!                 ▼                ▼                 ▼
//!        snapshot.rs       commands/*.rs        manifest.rs
//!        (backup ring)     (mutation bodies)    (TSV export)
//!                                  │
//!                                  ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Single SQLite file, version stamp in the meta table      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code returns `Result` values and logs through
//! `tracing`. It never prints and never exits the process.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`coordinator`]: Mutation protocol and undo
//! - [`snapshot`]: Bounded ring of database copies
//! - [`version`]: Freshness stamp
//! - [`manifest`]: Manifest export
//! - [`commands`]: Business logic per operation
//! - [`store`]: SQLite storage
//! - [`model`]: `Archive`, `Source`, `SourceUpdate`
//! - [`ids`]: Source id generation
//! - [`sanitize`]: Free-text filtering
//! - [`config`]: Configuration and on-disk layout
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod ids;
pub mod manifest;
pub mod model;
pub mod sanitize;
pub mod snapshot;
pub mod store;
pub mod version;
