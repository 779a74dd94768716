mod cli;

use moodshift::{
    client::HttpBackend,
    config,
    job::SubmissionForm,
    session::{SessionController, SessionSettings},
    status::{ResultArtifact, StatusSnapshot, TaskState},
    terminal::TerminalView,
};
use moodshift_common::EffectKind;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ProcessArgs};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

async fn process(args: ProcessArgs, config_path: Option<&Path>) -> Result<ExitCode> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override server from CLI if specified
    if let Some(server) = &args.server {
        config.server.base_url = server.clone();
        config::validate_config(&config)?;
    }

    tracing::debug!("Using server {}", config.server.base_url);

    let backend = Arc::new(HttpBackend::new(&config.server)?);
    let mut session = SessionController::new(
        Arc::clone(&backend),
        TerminalView::new(),
        SessionSettings::from_config(&config),
    );

    let form = args.to_form();
    let finished = tokio::select! {
        snapshot = submit_and_follow(&mut session, &form) => Some(snapshot),
        _ = tokio::signal::ctrl_c() => None,
    };

    let Some(finished) = finished else {
        tracing::info!("Interrupted");
        session.cancel();
        eprintln!("Cancelled.");
        return Ok(ExitCode::FAILURE);
    };

    // Submission errors were already rendered by the session.
    let Some(snapshot) = finished else {
        return Ok(ExitCode::FAILURE);
    };

    if snapshot.state != TaskState::Success {
        return Ok(ExitCode::FAILURE);
    }

    if let (Some(dir), Some(result)) = (&args.output_dir, &snapshot.result) {
        // The job itself succeeded; a failed download is only reported.
        match download_result(&backend, result, dir).await {
            Ok(path) => println!("Saved {}", path.display()),
            Err(e) => {
                tracing::error!("Download failed: {e:#}");
                eprintln!("Could not download result: {e:#}");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Submit the job and wait for its terminal snapshot.
async fn submit_and_follow(
    session: &mut SessionController<HttpBackend, TerminalView>,
    form: &SubmissionForm,
) -> Option<StatusSnapshot> {
    session.submit(form).await.ok()?;
    session.run_until_terminal().await
}

async fn download_result(
    backend: &HttpBackend,
    result: &ResultArtifact,
    dir: &Path,
) -> Result<std::path::PathBuf> {
    let bytes = backend.fetch_result(&result.download_url).await?;

    // Only the final path component is trusted from the server.
    let filename = Path::new(&result.filename)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "result".into());
    let path = dir.join(filename);

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write result file: {:?}", path))?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "Result downloaded");
    Ok(path)
}

fn list_effects() {
    println!("Effects are applied in this order:\n");
    for kind in EffectKind::ALL {
        let params = kind
            .parameters()
            .iter()
            .map(|p| {
                if p.unit.is_empty() {
                    p.field.to_string()
                } else {
                    format!("{} ({})", p.field, p.unit)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {:<18} {}", kind.name(), params);
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Server: {}", config.server.base_url);
    println!("  Request timeout: {}s", config.server.request_timeout_secs);
    println!("  Poll interval: {}ms", config.polling.interval_ms);
    println!("  Default format: {}", config.upload.default_format);
    println!(
        "  Allowed extensions: {}",
        config.upload.allowed_extensions.join(", ")
    );
    match config.upload.max_file_size_mb {
        0 => println!("  Max file size: unlimited"),
        mb => println!("  Max file size: {mb} MB"),
    }

    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "moodshift=trace,moodshift_common=debug".to_string()
        } else {
            "moodshift=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Process(args) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(process(args, cli.config.as_deref()))
        }
        Commands::Effects => {
            list_effects();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Version => {
            println!("moodshift {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}
