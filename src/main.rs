use std::{error::Error, io::Write, path::Path, process};

use clap::{command, Parser, ValueHint};
use log::{debug, error, info, LevelFilter};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use url::Url;

use reelplay::{
    catalog::Loader,
    config::Config,
    events::{Event, Notification},
    player::{ExternalPlayer, PlaybackOptions},
    session::{Command, Session},
    stream::Endpoint,
};

/// Profile to display when not built in release mode.
#[cfg(debug_assertions)]
const BUILD_PROFILE: &str = "debug";
/// Profile to display when not built release mode.
#[cfg(not(debug_assertions))]
const BUILD_PROFILE: &str = "release";

/// Group name for mutually exclusive logging options.
const ARGS_GROUP_LOGGING: &str = "logging";

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "reelplay.toml";

/// Command line arguments as parsed by `clap`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    ///
    /// [default: reelplay.toml, if present]
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    config: Option<String>,

    /// Catalog service endpoint
    ///
    /// Overrides `catalog_url` from the configuration file.
    #[arg(long, value_hint = ValueHint::Url, env = "REELPLAY_CATALOG_URL")]
    catalog_url: Option<Url>,

    /// Stream service endpoint
    ///
    /// Overrides `stream_url` from the configuration file.
    #[arg(long, value_hint = ValueHint::Url, env = "REELPLAY_STREAM_URL")]
    stream_url: Option<Url>,

    /// Video player program
    ///
    /// Overrides `player.program` from the configuration file.
    #[arg(short, long, value_hint = ValueHint::CommandName)]
    player: Option<String>,

    /// Hide the player's native controls
    #[arg(long, default_value_t = false)]
    no_controls: bool,

    /// Suppresses all output except warnings and errors.
    #[arg(short, long, default_value_t = false, group = ARGS_GROUP_LOGGING)]
    quiet: bool,

    /// Enable verbose logging
    ///
    /// Specify twice for trace logging.
    #[arg(short, long, action = clap::ArgAction::Count, group = ARGS_GROUP_LOGGING)]
    verbose: u8,
}

/// Initializes the logger facade.
///
/// The logging level is determined as follows, in order of precedence from
/// highest to lowest:
/// 1. Command line arguments
/// 2. `RUST_LOG` environment variable
/// 3. Hard coded default
///
/// # Panics
///
/// Panics when a logger facade is already initialized.
fn init_logger(config: &Args) {
    let mut logger = env_logger::Builder::from_env(
        // Note: if you change the default logging level here, then you should
        // probably also change the verbosity levels below.
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    if config.quiet || config.verbose > 0 {
        let level = match config.verbose {
            // Quiet and verbose are mutually exclusive, and `verbose` is 0
            // by default. So this arm means: quiet mode.
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        // Filter log messages of external crates.
        logger.filter_module("reelplay", level);
    }

    logger.init();
}

/// Builds the configuration from the config file and command line.
///
/// An explicitly given config file must exist. The default one is only read
/// when it is there.
fn load_config(args: &Args) -> reelplay::error::Result<Config> {
    let mut config = match args.config.as_deref() {
        Some(path) => Config::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Config::from_file(DEFAULT_CONFIG_FILE)?
        }
        None => Config::default(),
    };

    if let Some(ref url) = args.catalog_url {
        config.catalog_url = url.clone();
    }
    if let Some(ref url) = args.stream_url {
        config.stream_url = url.clone();
    }
    if let Some(ref program) = args.player {
        config.player.program.clone_from(program);
    }
    if args.no_controls {
        config.player.controls = false;
    }

    Ok(config)
}

fn prompt() {
    print!("select> ");
    // Best effort: a closed stdout is noticed on the next read.
    let _ = std::io::stdout().flush();
}

/// Renders notifications and forwards user input to the session.
///
/// Returns when the user ends the session with `Ctrl-C` or end of input.
async fn interact(
    mut notifications: mpsc::UnboundedReceiver<Notification>,
    commands: mpsc::Sender<Command>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut view = None;

    loop {
        tokio::select! {
            // Prioritize shutdown signals.
            biased;

            _ = tokio::signal::ctrl_c() => {
                info!("shutting down gracefully");
                break;
            }

            Some(notification) = notifications.recv() => {
                match notification.event {
                    Event::CatalogLoaded { .. }
                    | Event::CatalogUnavailable
                    | Event::SelectionChanged(_) => {
                        println!();
                        print!("{}", notification.view);
                        prompt();
                    }
                    Event::PlaybackStarted(_) => {}
                }
                view = Some(notification.view);
            }

            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let Some(ref view) = view else {
                        info!("catalog is still loading");
                        continue;
                    };

                    match view.items.resolve(&line) {
                        Some(item) => {
                            if commands.send(Command::Select(item)).await.is_err() {
                                break;
                            }
                        }
                        None => prompt(),
                    }
                }
                Ok(None) => {
                    debug!("end of input");
                    break;
                }
                Err(e) => {
                    error!("reading input: {e}");
                    break;
                }
            },
        }
    }
}

/// Main application loop.
///
/// # Errors
///
/// This function returns an error when the configuration is invalid or the
/// HTTP client cannot be set up. Catalog and playback failures are logged and
/// do not end the session.
async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args)?;
    debug!("{config:#?}");

    let loader = Loader::new(&config)?;
    let player = ExternalPlayer::new(&config.player)?;
    let endpoint = Endpoint::from_config(&config)?;
    let options = PlaybackOptions {
        controls: config.player.controls,
    };

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();

    let mut session = Session::new(loader, player, endpoint)
        .with_options(options)
        .with_events(event_tx);

    info!("loading catalog from {}", config.catalog_url);

    let ui = async {
        interact(event_rx, command_tx).await;
        shutdown.cancel();
    };
    tokio::join!(session.run(command_rx, shutdown.clone()), ui);

    session.end();
    Ok(())
}

/// Main entry point of the application.
///
/// This function initializes the logger facade, parses the command line
/// arguments, and starts the main application loop.
#[tokio::main]
async fn main() {
    // `clap` handles our command line arguments and help text.
    let args = Args::parse();
    init_logger(&args);

    // Dump command line arguments before we do anything more.
    // This aids in debugging of whatever comes next.
    debug!("Command {:#?}", args);

    let cmd = command!();
    let name = cmd.get_name().to_string();
    let version = cmd.get_version().unwrap_or("UNKNOWN").to_string();

    info!("starting {name}/{version}; {BUILD_PROFILE}");

    // Exit explicitly: the stdin reader thread may still be blocked on a read
    // and would otherwise hold up runtime shutdown.
    match run(args).await {
        Ok(()) => process::exit(0),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}
