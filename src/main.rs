mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use tf_av::ToolRegistry;
use tf_core::config::Config;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load_or_default(config_path);

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting trackforged {}", env!("CARGO_PKG_VERSION"));
    tf_server::start(config).await?;
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = Config::load_or_default(config_path);
    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("ffmpeg is missing. Uploads will fail until it is installed.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            let contents = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read {}", p.display()))?;
            let config = Config::from_json(&contents)?;
            println!("✓ Configuration parses");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    println!("  Max upload: {} bytes", config.server.max_upload_bytes);
    println!(
        "  Storage: {} (origin bucket {:?}, hls bucket {:?})",
        config.storage.root.display(),
        config.storage.origin_bucket,
        config.storage.hls_bucket
    );
    println!(
        "  Transcode: {}s segments, {} kbps, {} Hz, {} ch",
        config.transcode.segment_seconds,
        config.transcode.audio_bitrate_kbps,
        config.transcode.sample_rate,
        config.transcode.channels
    );

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ No warnings");
    } else {
        for warning in &warnings {
            println!("⚠ {warning}");
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "trackforged=trace,tf_server=debug,tf_pipeline=debug,tf_av=debug,tf_storage=debug,tf_db=debug,tower_http=debug".to_string()
        } else {
            "trackforged=info,tf_server=info,tf_pipeline=info,tf_av=info,tf_storage=info,tf_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}
