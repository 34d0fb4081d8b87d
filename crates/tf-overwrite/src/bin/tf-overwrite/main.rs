mod cli;

use anyhow::Context;
use tf_overwrite::OverwriteConfig;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("TF_OVERWRITE_LOG"))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

fn run(cli: &cli::Cli) -> anyhow::Result<()> {
    let directory = match &cli.directory {
        Some(directory) => directory.canonicalize().with_context(|| {
            format!("Failed to resolve path for -C/--directory {}", directory.display())
        })?,
        None => std::env::current_dir()?,
    };

    let config = load_config(cli)?;

    for rewriter in [cli::Rewriter::Tf, cli::Rewriter::Metadata, cli::Rewriter::Display] {
        if !cli.runs(rewriter) {
            continue;
        }

        tracing::info!(%rewriter, directory=%directory.display(), "running rewriter");
        match rewriter {
            cli::Rewriter::Tf => tf_overwrite::overwrite_tf(&config, &directory)?,
            cli::Rewriter::Metadata => tf_overwrite::overwrite_metadata(&config, &directory)?,
            cli::Rewriter::Display => tf_overwrite::overwrite_display(&config, &directory)?,
        }
    }

    Ok(())
}

fn load_config(cli: &cli::Cli) -> anyhow::Result<OverwriteConfig> {
    let bytes = match &cli.config {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => {
            use std::io::Read;
            let mut bytes = vec![];
            std::io::stdin().read_to_end(&mut bytes)?;
            bytes
        }
    };

    Ok(OverwriteConfig::from_slice(&bytes)?)
}
