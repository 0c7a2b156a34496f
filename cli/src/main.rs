use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(version, about = "Stamp a template file with git metadata", long_about = None)]
struct Args {
    /// Template containing @GIT_BRANCH@-style placeholders.
    input: PathBuf,
    /// Where the expanded file is written.
    output: PathBuf,
    /// Repository to query instead of the current directory.
    #[arg(short, long)]
    repo: Option<PathBuf>,
    /// Log the individual git queries.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(level),
        )
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let meta = gitmeta::Metadata::resolve(args.repo.as_deref());
    tracing::debug!("resolved metadata: {:?}", meta);
    template::expand_file(&args.input, &args.output, &meta.tokens())
        .context("failed to expand the template")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(&args)
}
