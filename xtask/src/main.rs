//! Build helper for the kernel module crates.
//!
//! Usage: cargo xtask <build|clean|list> [NAME]

mod subcommand;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::subcommand::{build, clean, Config};

#[derive(Parser, Debug)]
#[command(name = "xtask")]
#[command(about = "Build the out-of-tree kernel modules listed in modules.toml")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build one module, or all of them
    Build {
        name: Option<String>,
        /// Log level compiled into the module
        #[arg(long, default_value = "INFO")]
        log: String,
        /// Kernel build tree, defaults to the running kernel's
        #[arg(long, env = "KDIR")]
        kdir: Option<String>,
    },
    /// Remove build artifacts of one module, or all of them
    Clean {
        name: Option<String>,
        #[arg(long, env = "KDIR")]
        kdir: Option<String>,
    },
    /// Print the configured modules
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    match cli.command {
        Commands::Build { name, log, kdir } => match name {
            Some(name) => build::build_single(&config, &name, &log, kdir.as_deref()),
            None => build::build_all(&config, &log, kdir.as_deref()),
        },
        Commands::Clean { name, kdir } => match name {
            Some(name) => clean::clean_single(&config, &name, kdir.as_deref()),
            None => clean::clean_all(&config, kdir.as_deref()),
        },
        Commands::List => {
            for name in config.members() {
                println!("{} ({})", name, subcommand::module_dir(name).display());
            }
            Ok(())
        }
    }
}
