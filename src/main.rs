use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use scanloop::config::CameraBackend;
use scanloop::{ScanLoopApp, ScanLoopConfig};

#[derive(Parser, Debug)]
#[command(name = "scanloop")]
#[command(about = "Camera barcode scan station for a point-of-sale server")]
#[command(version)]
#[command(long_about = "Polls a camera for barcodes, drops repeated reads of the same code, \
and posts each new code to the point-of-sale server's scan endpoint. The server's reply \
(buyer, item and running total) is shown in the terminal.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "scanloop.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting the station")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Dry run mode - initialize but don't start components
    #[arg(long, help = "Perform dry run - build and probe components but don't start them")]
    dry_run: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Serve this image file instead of a live camera
    #[arg(long, value_name = "PATH", help = "Use the still-image camera backend with this file")]
    image: Option<String>,

    /// Start the camera immediately
    #[arg(long, help = "Start scanning without waiting for the start key")]
    autostart: bool,

    /// Disable keyboard controls
    #[arg(long, help = "Disable the s/x/q keyboard controls")]
    no_keyboard: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting scanloop v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let mut config = match ScanLoopConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(image) = &args.image {
        config.camera.backend = CameraBackend::Still;
        config.camera.still_image = Some(image.clone());
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        if args.validate_config {
            eprintln!("✗ Configuration validation failed: {}", e);
            std::process::exit(1);
        }
        return Err(e.into());
    }

    if args.validate_config {
        info!("Configuration validation successful");
        println!("✓ Configuration is valid");
        return Ok(());
    }

    let mut app = ScanLoopApp::new(config).await.map_err(|e| {
        error!("Failed to create scan station: {}", e);
        e
    })?;
    app.set_keyboard_enabled(!args.no_keyboard);
    app.set_autostart(args.autostart);

    app.initialize().await.map_err(|e| {
        error!("Failed to initialize scan station: {}", e);
        e
    })?;

    if args.dry_run {
        info!("Dry run mode - components initialized but not started");
        println!("✓ Dry run completed successfully - all components initialized");
        return Ok(());
    }

    app.start().await.map_err(|e| {
        error!("Failed to start scan station: {}", e);
        e
    })?;

    let exit_code = app.run().await.map_err(|e| {
        error!("Scan station error during execution: {}", e);
        e
    })?;

    info!("scanloop exited with code: {}", exit_code);
    std::process::exit(exit_code);
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scanloop={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .with_writer(std::io::stderr)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# Scanloop configuration file");
    println!("# Every key is optional; environment variables such as SCANLOOP_SERVER__BASE_URL override it");
    println!();
    println!("{}", toml::to_string_pretty(&ScanLoopConfig::default())?);
    Ok(())
}
