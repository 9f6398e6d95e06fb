use clap::Subcommand;
use std::path::PathBuf;

pub mod info;
pub mod repack;

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a package and print its header and tables
    Info {
        /// Package file to inspect
        package: PathBuf,

        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Copy a package, replacing every export's payload with the files in
    /// an extraction directory
    #[command(long_about = "Copy a package, replacing every export's payload with the \
files in an extraction directory.\n\nThe extraction directory is expected to hold one \
file per export, laid out as the export's package path with a Name.Class file name, \
the way an external UPK extraction tool produces it. Entries cannot be added, removed \
or renamed; only payload bytes are swapped.")]
    Repack {
        /// Original package file (left untouched)
        source: PathBuf,

        /// Directory holding the extracted (and modified) payload files
        extracted: PathBuf,

        /// Destination path for the patched copy; must not already exist
        output: PathBuf,

        /// Suppress the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

impl Commands {
    pub fn execute(self) -> anyhow::Result<()> {
        match self {
            Commands::Info { package, json } => info::run(&package, json),
            Commands::Repack {
                source,
                extracted,
                output,
                quiet,
            } => repack::run(&source, &extracted, &output, quiet),
        }
    }
}
