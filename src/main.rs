//! Application entry point: poetry-voice.
//!
//! # Startup sequence
//!
//! 1. Parse the command line and initialise logging.
//! 2. Load [`AppConfig`] (`--config`, or the platform default path).
//! 3. Open the [`Session`]: API key, remote clients, artifact directory.
//!    A missing or empty key file aborts here.
//! 4. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 5. Run the console loop, or the egui window with `--ui`.
//! 6. Shut the session down, removing downloaded audio.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;

use anyhow::{anyhow, Context};
use clap::Parser;
use eframe::egui;
use tokio::sync::mpsc;

use poetry_voice::{
    app::{install_cjk_fonts, PoetryApp},
    config::{AppConfig, PlaybackConfig},
    console::run_console,
    playback::open_player,
    session::Session,
    speech::AudioArtifact,
};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "poetry-voice", version, about = "Topic to Chinese poem to speech")]
struct Cli {
    /// Open the interactive window instead of the console loop
    #[arg(long)]
    ui: bool,

    /// Settings file to use instead of the platform default
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// File whose first line is the language-model API key
    #[arg(long, value_name = "PATH")]
    api_key_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Console mode
// ---------------------------------------------------------------------------

fn run_console_mode(session: &Session, rt: &tokio::runtime::Runtime) -> anyhow::Result<()> {
    // Device acquired once; held until the loop ends.
    let player = open_player(&session.config().playback);
    let orchestrator = session.orchestrator();

    let stdin = io::stdin();
    let served = run_console(stdin.lock(), io::stdout(), |topic| {
        rt.block_on(orchestrator.compose_and_play(topic, &*player))
    })
    .context("console I/O failed")?;

    log::debug!("console: {served} request(s) served");
    Ok(())
}

// ---------------------------------------------------------------------------
// Front-end mode
// ---------------------------------------------------------------------------

/// Spawn the thread that owns the audio output and plays what the UI sends.
fn spawn_playback_thread(
    config: PlaybackConfig,
) -> anyhow::Result<std_mpsc::Sender<AudioArtifact>> {
    let (tx, rx) = std_mpsc::channel::<AudioArtifact>();

    std::thread::Builder::new()
        .name("audio-playback".into())
        .spawn(move || {
            let player = open_player(&config);
            while let Ok(artifact) = rx.recv() {
                if let Err(e) = player.play(&artifact) {
                    log::warn!("playback: {e}");
                }
            }
        })
        .context("failed to spawn audio-playback thread")?;

    Ok(tx)
}

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (w, h) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_inner_size([w, h])
        .with_min_inner_size([320.0, 360.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

fn run_ui_mode(session: &Session, rt: &tokio::runtime::Runtime) -> anyhow::Result<()> {
    let config = session.config().clone();

    let (topic_tx, topic_rx) = mpsc::channel::<String>(4);
    let (event_tx, event_rx) = mpsc::channel(32);

    rt.spawn(session.orchestrator().with_events(event_tx).serve(topic_rx));

    let playback_tx = spawn_playback_thread(config.playback.clone())?;
    let app = PoetryApp::new(topic_tx, event_rx, playback_tx, config.ui.clone());

    eframe::run_native(
        "诗歌生成器",
        native_options(&config),
        Box::new(move |cc| {
            install_cjk_fonts(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow!("window error: {e}"))
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("cannot load config from {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        }),
    };

    if let Some(path) = &cli.api_key_file {
        config.credentials.api_key_file = path.clone();
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("poetry-voice starting up");

    // 2. Configuration
    let config = load_config(&cli)?;

    // 3. Session (startup-fatal on credential problems)
    let session = match Session::init(&config) {
        Ok(session) => session,
        Err(e) => {
            log::error!("startup failed: {e:#}");
            return Err(e);
        }
    };

    // 4. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 5. Mode dispatch
    let outcome = if cli.ui {
        run_ui_mode(&session, &rt)
    } else {
        run_console_mode(&session, &rt)
    };

    // 6. Teardown
    drop(rt);
    session.shutdown();
    outcome
}
