mod commands;
mod config;
mod console;
mod picker;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    delete, init, upload, view, write, Context, DeleteArgs, InitArgs, UploadArgs, ViewArgs,
    WriteArgs,
};
use config::Config;
use diary_editor::highlight;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Diary CLI - write, read and delete diary entries
#[derive(Parser, Debug)]
#[command(name = "diary")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a diary.config.json in the current directory
    Init(InitArgs),

    /// Show an entry
    View(ViewArgs),

    /// Delete an entry and its images
    Delete(DeleteArgs),

    /// Write a new entry
    Write(WriteArgs),

    /// Upload a single image
    Upload(UploadArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    if let Command::Init(args) = command {
        return init(args, &cwd);
    }

    let config = Config::load(&cwd)?;
    highlight::init(config.highlight());
    let result = run_networked(command, config, &cwd);
    highlight::teardown();
    result
}

fn run_networked(command: Command, config: Config, cwd: &Path) -> anyhow::Result<()> {
    // One thread, cooperative scheduling
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let ctx = Context::new(config, cwd)?;

    runtime.block_on(async {
        match command {
            Command::View(args) => view(args, &ctx).await,
            Command::Delete(args) => delete(args, &ctx).await,
            Command::Write(args) => write(args, &ctx).await,
            Command::Upload(args) => upload(args, &ctx).await,
            Command::Init(args) => init(args, cwd),
        }
    })
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli.command) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
