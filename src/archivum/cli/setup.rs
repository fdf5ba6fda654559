use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "archivum", bin_name = "archivum", version)]
#[command(about = "Manage file archives, their metadata and the published manifest", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data root (defaults to $ARCHIVUM_HOME, then the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List archives
    #[command(alias = "ls")]
    Archives,

    /// Create an archive
    #[command(alias = "new")]
    Create {
        /// Archive name (one folder name, no slashes)
        name: String,
    },

    /// Copy files into an archive and record them
    #[command(alias = "up")]
    Upload {
        /// Target archive, created on first upload
        archive: String,

        /// Files to upload
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Files are already in the archive folder; only record them
        #[arg(long)]
        record_only: bool,
    },

    /// List the files of one archive
    #[command(alias = "l")]
    List {
        archive: String,
    },

    /// Edit the metadata of one file
    #[command(alias = "u")]
    Update(UpdateArgs),

    /// Restore the state before the last change
    Undo,

    /// Print the version stamp
    Version {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List undo snapshots, oldest first
    Snapshots,

    /// Regenerate the manifest now
    Export,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub archive: String,

    pub filename: String,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub tags: Option<String>,

    #[arg(short, long)]
    pub license: Option<String>,

    /// Hide the file from the manifest
    #[arg(long, conflicts_with = "show")]
    pub hide: bool,

    /// Show the file in the manifest again
    #[arg(long)]
    pub show: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_update_flags() {
        let cli = Cli::try_parse_from([
            "archivum", "update", "demo", "a.txt", "--tags", "maps", "--hide",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Update(args)) => {
                assert_eq!(args.archive, "demo");
                assert_eq!(args.tags.as_deref(), Some("maps"));
                assert!(args.hide);
                assert!(!args.show);
                assert!(args.description.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn hide_and_show_conflict() {
        let result = Cli::try_parse_from(["archivum", "update", "demo", "a.txt", "--hide", "--show"]);
        assert!(result.is_err());
    }

    #[test]
    fn upload_requires_files() {
        assert!(Cli::try_parse_from(["archivum", "upload", "demo"]).is_err());
        let cli = Cli::try_parse_from(["archivum", "upload", "demo", "a.txt", "--record-only"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Upload { record_only: true, .. })
        ));
    }

    #[test]
    fn root_is_global() {
        let cli = Cli::try_parse_from(["archivum", "undo", "--root", "/tmp/x"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/x")));
    }
}
