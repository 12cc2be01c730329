use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "gpu-selector",
    version,
    about = "Manage which GPU your desktop applications prefer",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run the interactive picker (recommended).
    Tui,
    /// Scan the application directories and build or update the local database.
    Scan,
    /// List every detected application and its current GPU preference.
    List {
        /// Emit the raw entries as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Make one application prefer the dedicated GPU.
    Set {
        /// A 1-based id from `list` or a name substring.
        identifier: String,
    },
    /// Restore one application to the default GPU preference.
    Unset {
        /// A 1-based id from `list` or a name substring.
        identifier: String,
    },
    /// Install a systemd user service that rescans when application directories change.
    InstallService,
    /// Disable and remove the systemd user service.
    UninstallService,
}
