// file: src/cli/args.rs
// version: 1.0.0
// guid: a8f2d6c3-1b47-4e90-9c5a-3d0e7b6f1c28

//! Command line argument definitions

use crate::config::UploadOverrides;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pkg-uploader")]
#[command(about = "Publish pre-built conda packages to anaconda.org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, env = "PKG_UPLOADER_CONFIG", help = "YAML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload matching package archives; exits with the upload tool's status
    Upload(UploadArgs),

    /// Show the upload command that would run, without running it
    Plan {
        #[command(flatten)]
        args: UploadArgs,

        #[arg(short, long)]
        json: bool,
    },

    /// Check that tools, token and build output are ready for an upload
    Check(UploadArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct UploadArgs {
    #[arg(short, long, help = "Package name or archive file glob")]
    pub package: Option<String>,

    #[arg(short, long, help = "Destination user or organization")]
    pub user: Option<String>,

    #[arg(short, long, help = "Build output directory [default: $CONDA_BLD_PATH]")]
    pub build_dir: Option<PathBuf>,

    #[arg(long, help = "Environment variable holding the upload token [default: ANACONDA_TOKEN]")]
    pub token_env: Option<String>,

    #[arg(short, long = "env", help = "Environment to activate before uploading")]
    pub environment: Option<String>,

    #[arg(short, long, help = "Channel label")]
    pub label: Option<String>,

    #[arg(long, help = "Do not overwrite existing files")]
    pub no_force: bool,

    #[arg(long, help = "Upload tool [default: anaconda]")]
    pub tool: Option<String>,

    #[arg(long, help = "Environment manager [default: conda]")]
    pub manager: Option<String>,
}

impl From<UploadArgs> for UploadOverrides {
    fn from(args: UploadArgs) -> Self {
        Self {
            package: args.package,
            user: args.user,
            build_dir: args.build_dir,
            token_env: args.token_env,
            environment: args.environment,
            label: args.label,
            no_force: args.no_force,
            tool: args.tool,
            manager: args.manager,
        }
    }
}
