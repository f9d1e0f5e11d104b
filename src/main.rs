use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use lumi_remote::driver::traits::Swipe;
use lumi_remote::{connect, BackendKind, Config, Orientation, RemoteControl, SwipeDirection};

#[derive(Parser)]
#[command(name = "lumi-remote")]
#[command(author = "NL Team")]
#[command(version = "0.1.3")]
#[command(about = "Remote control for iOS and Android devices", long_about = None)]
struct Cli {
    /// Backend (ios, android-adb, android-appium)
    #[arg(short, long, default_value = "ios")]
    backend: BackendKind,

    /// Automation server host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Automation server port (8100 for WDA, 8200 for UiAutomator2)
    #[arg(long)]
    port: Option<u16>,

    /// Device serial (Android)
    #[arg(short, long)]
    device: Option<String>,

    /// Timeout for each request (ms)
    #[arg(long, default_value = "30000")]
    timeout_ms: u64,

    /// Path to the adb binary
    #[arg(long)]
    adb: Option<PathBuf>,

    /// Keep the broadcast IME active after typing Unicode text
    #[arg(long, default_value = "false")]
    no_restore_ime: bool,

    /// Verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the backend is reachable
    Status,

    /// Print the screen size
    ScreenSize,

    /// Tap at a point
    Tap { x: i32, y: i32 },

    /// Double tap at a point
    DoubleTap { x: i32, y: i32 },

    /// Long press at a point
    LongPress {
        x: i32,
        y: i32,

        /// Hold duration (ms)
        #[arg(long)]
        duration_ms: Option<u64>,
    },

    /// Swipe across the screen (up, down, left, right)
    Swipe { direction: SwipeDirection },

    /// Swipe between two points
    SwipePoints {
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
    },

    /// Type text into the focused element
    Type {
        text: String,

        /// Press ENTER afterwards
        #[arg(long, default_value = "false")]
        submit: bool,
    },

    /// Press a button (HOME, BACK, VOLUME_UP, ENTER, ...)
    Button { name: String },

    /// List elements on screen as JSON
    Elements,

    /// Print the orientation, or set it when a value is given
    Orientation { value: Option<Orientation> },

    /// Open a URL or deep link
    OpenUrl { url: String },

    /// List launchable apps
    Apps,

    /// Launch an app by package name or bundle id
    Launch { package: String },

    /// Stop a running app
    Terminate { package: String },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config {
        backend: cli.backend,
        host: cli.host,
        port: cli.port,
        device: cli.device,
        request_timeout: Duration::from_millis(cli.timeout_ms),
        restore_ime: !cli.no_restore_ime,
        adb_path: cli.adb,
        ..Default::default()
    };

    let backend = connect(&config)
        .with_context(|| format!("Failed to set up {} backend", config.backend))?;

    run(backend.as_ref(), cli.command).await
}

async fn run(backend: &dyn RemoteControl, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Status => {
            if backend.is_running().await {
                println!("{} {} backend is ready", "✓".green(), backend.platform_name());
            } else {
                println!(
                    "{} {} backend is not reachable",
                    "✗".red(),
                    backend.platform_name()
                );
                std::process::exit(1);
            }
        }

        Commands::ScreenSize => {
            let size = backend.get_screen_size().await?;
            println!(
                "  Screen: {}x{} (scale {})",
                size.width.to_string().cyan(),
                size.height.to_string().cyan(),
                size.scale
            );
        }

        Commands::Tap { x, y } => {
            backend.tap(x, y).await?;
            println!("  {} Tapped ({}, {})", "👆".green(), x, y);
        }

        Commands::DoubleTap { x, y } => {
            backend.double_tap(x, y).await?;
            println!("  {} Double tapped ({}, {})", "👆".green(), x, y);
        }

        Commands::LongPress { x, y, duration_ms } => {
            backend.long_press(x, y, duration_ms).await?;
            println!("  {} Long pressed ({}, {})", "👆".green(), x, y);
        }

        Commands::Swipe { direction } => {
            backend.perform_swipe(Swipe::Direction(direction)).await?;
            println!("  {} Swiped {}", "↔".green(), direction.to_string().cyan());
        }

        Commands::SwipePoints {
            start_x,
            start_y,
            end_x,
            end_y,
        } => {
            backend
                .perform_swipe(Swipe::Points {
                    start_x,
                    start_y,
                    end_x,
                    end_y,
                })
                .await?;
            println!(
                "  {} Swiped ({}, {}) → ({}, {})",
                "↔".green(),
                start_x,
                start_y,
                end_x,
                end_y
            );
        }

        Commands::Type { text, submit } => {
            backend.type_text(&text).await?;
            if submit {
                backend.press_button("ENTER").await?;
            }
            println!("  {} Typed {}", "⌨".green(), text.cyan());
        }

        Commands::Button { name } => {
            backend.press_button(&name).await?;
            println!("  {} Pressed {}", "🔘".green(), name.to_uppercase().cyan());
        }

        Commands::Elements => {
            let elements = backend.get_elements_on_screen().await?;
            let json = serde_json::to_string_pretty(&elements)
                .context("Failed to serialize elements")?;
            println!("{}", json);
        }

        Commands::Orientation { value: Some(orientation) } => {
            backend.set_orientation(orientation).await?;
            println!("  Orientation set to {}", orientation.to_string().cyan());
        }

        Commands::Orientation { value: None } => {
            let orientation = backend.get_orientation().await?;
            println!("  Orientation: {}", orientation.to_string().cyan());
        }

        Commands::OpenUrl { url } => {
            backend.open_url(&url).await?;
            println!("  {} Opened {}", "🔗".green(), url.cyan());
        }

        Commands::Apps => {
            let apps = backend.list_apps().await?;
            for app in &apps {
                println!("  {}", app.package_name.cyan());
            }
            println!("  {} app(s)", apps.len());
        }

        Commands::Launch { package } => {
            backend.launch_app(&package).await?;
            println!("  {} Launched {}", "🚀".green(), package.cyan());
        }

        Commands::Terminate { package } => {
            backend.terminate_app(&package).await?;
            println!("  {} Stopped {}", "■".red(), package.cyan());
        }
    }

    Ok(())
}
