//! # CLI Layer
//!
//! The only place in the codebase that touches stdout, parses arguments and
//! copies uploaded files from the user's disk into an archive folder.
//!
//! ## Structure
//!
//! - `run()`: Main dispatch logic (called by `main.rs`)
//! - `init_context()`: Resolves the data root, loads config, opens the API
//! - `handle_*()`: Per-command handlers that call the API and print the result

use super::print::{
    print_archives, print_manifest_path, print_messages, print_snapshots, print_sources,
    print_version,
};
use super::setup::{Cli, Commands, UpdateArgs};
use archivum::api::ArchivumApi;
use archivum::commands::archive::normalize_name;
use archivum::commands::CmdMessage;
use archivum::config::ArchivumConfig;
use archivum::error::{ArchivumError, Result};
use archivum::model::{SourceUpdate, Visibility};
use clap::Parser;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const HOME_ENV: &str = "ARCHIVUM_HOME";

struct AppContext {
    api: ArchivumApi,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Archives) | None => handle_archives(&mut ctx),
        Some(Commands::Create { name }) => handle_create(&mut ctx, &name),
        Some(Commands::Upload {
            archive,
            files,
            record_only,
        }) => handle_upload(&mut ctx, &archive, &files, record_only),
        Some(Commands::List { archive }) => handle_list(&mut ctx, &archive),
        Some(Commands::Update(args)) => handle_update(&mut ctx, args),
        Some(Commands::Undo) => handle_undo(&mut ctx),
        Some(Commands::Version { json }) => handle_version(&mut ctx, json),
        Some(Commands::Snapshots) => handle_snapshots(&mut ctx),
        Some(Commands::Export) => handle_export(&mut ctx),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded; ignore that case.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let root = resolve_root(cli.root.as_deref())?;
    let config = ArchivumConfig::load(&root)?;
    tracing::debug!(root = %root.display(), "opening data root");
    let api = ArchivumApi::open(&config, &root)?;
    Ok(AppContext { api })
}

fn resolve_root(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = flag {
        return Ok(root.to_path_buf());
    }
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("org", "archivum", "archivum")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            ArchivumError::Config(format!(
                "Could not determine a data directory; pass --root or set {}",
                HOME_ENV
            ))
        })
}

fn handle_archives(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.list_archives()?;
    print_archives(&result.archives);
    print_messages(&result.messages);
    Ok(())
}

fn handle_create(ctx: &mut AppContext, name: &str) -> Result<()> {
    let result = ctx.api.create_archive(name)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_upload(
    ctx: &mut AppContext,
    archive: &str,
    files: &[PathBuf],
    record_only: bool,
) -> Result<()> {
    let archive = normalize_name(archive)?;
    let filenames = files
        .iter()
        .map(|path| file_name_of(path))
        .collect::<Result<Vec<_>>>()?;

    if !record_only {
        let target_dir = ctx.api.paths().archive_dir(&archive);
        fs::create_dir_all(&target_dir)?;
        for (path, name) in files.iter().zip(&filenames) {
            let target = target_dir.join(name);
            if target.exists() && path.canonicalize()? == target.canonicalize()? {
                continue;
            }
            fs::copy(path, &target)?;
            tracing::debug!(from = %path.display(), to = %target.display(), "copied upload");
        }
    }

    let result = ctx.api.upload(&archive, &filenames)?;
    print_messages(&result.messages);
    Ok(())
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ArchivumError::InvalidInput(format!("Not a file name: {}", path.display()))
        })
}

fn handle_list(ctx: &mut AppContext, archive: &str) -> Result<()> {
    let result = ctx.api.list_sources(archive)?;
    print_sources(&result.sources);
    print_messages(&result.messages);
    Ok(())
}

fn handle_update(ctx: &mut AppContext, args: UpdateArgs) -> Result<()> {
    let changes = update_from_args(&args);
    let result = ctx
        .api
        .update_source(&args.archive, &args.filename, &changes)?;
    print_messages(&result.messages);
    Ok(())
}

fn update_from_args(args: &UpdateArgs) -> SourceUpdate {
    let visibility = match (args.hide, args.show) {
        (true, _) => Visibility::Hidden,
        (_, true) => Visibility::Visible,
        _ => Visibility::Indeterminate,
    };
    SourceUpdate {
        description: args.description.clone(),
        tags: args.tags.clone(),
        license: args.license.clone(),
        visibility,
    }
}

fn handle_undo(ctx: &mut AppContext) -> Result<()> {
    match ctx.api.undo() {
        Ok(result) => {
            print_messages(&result.messages);
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "undo failed");
            print_messages(&[CmdMessage::warning(format!("Undo failed: {}", e))]);
            handle_archives(ctx)
        }
    }
}

fn handle_version(ctx: &mut AppContext, json: bool) -> Result<()> {
    let result = ctx.api.version()?;
    print_version(result.version.unwrap_or_default(), json)
}

fn handle_snapshots(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.snapshots()?;
    print_snapshots(&result.snapshots);
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.export()?;
    print_messages(&result.messages);
    if let Some(path) = &result.manifest_path {
        print_manifest_path(path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(hide: bool, show: bool) -> UpdateArgs {
        UpdateArgs {
            archive: "demo".into(),
            filename: "a.txt".into(),
            description: Some("Notes".into()),
            tags: None,
            license: None,
            hide,
            show,
        }
    }

    #[test]
    fn visibility_follows_flags() {
        assert_eq!(update_from_args(&args(true, false)).visibility, Visibility::Hidden);
        assert_eq!(update_from_args(&args(false, true)).visibility, Visibility::Visible);
        assert_eq!(
            update_from_args(&args(false, false)).visibility,
            Visibility::Indeterminate
        );
    }

    #[test]
    fn update_carries_only_given_fields() {
        let changes = update_from_args(&args(false, false));
        assert_eq!(changes.description.as_deref(), Some("Notes"));
        assert!(changes.tags.is_none());
        assert!(changes.license.is_none());
    }

    #[test]
    fn root_flag_wins() {
        let root = resolve_root(Some(Path::new("/srv/archivum"))).unwrap();
        assert_eq!(root, PathBuf::from("/srv/archivum"));
    }

    #[test]
    fn file_name_rejects_bare_root() {
        assert_eq!(file_name_of(Path::new("/tmp/a.txt")).unwrap(), "a.txt");
        assert!(file_name_of(Path::new("/")).is_err());
    }
}
