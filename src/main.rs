mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::{AppSettings, CliOverrides};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crossterm::event::{self as crossterm_event, Event, KeyEventKind};
use crossterm::{cursor, execute, terminal};
use extrainnings_api::client::ExtraInningsApi;
use log::{debug, error};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, PartialEq)]
enum CliCommand {
    Help,
    Version,
    Run(CliOverrides),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let overrides = match parse_args(std::env::args().skip(1)) {
        Ok(CliCommand::Run(overrides)) => overrides,
        Ok(CliCommand::Help) => {
            println!("{}", usage_text());
            return Ok(());
        }
        Ok(CliCommand::Version) => {
            println!("extrainnings {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    // A missing .env is normal; the real environment still applies.
    let _ = dotenvy::from_filename(".env");
    let settings = AppSettings::load(overrides);

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    let client = ExtraInningsApi::new(&settings.api_base_url, settings.request_timeout);
    debug!("using API at {}", client.base_url());
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Initial fetch of teams, seasons and the default games list
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();

    cleanup_terminal()?;
    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliCommand, String> {
    let mut overrides = CliOverrides::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "-V" | "--version" => return Ok(CliCommand::Version),
            "--api-url" => {
                let url = args.next().ok_or("--api-url needs a value")?;
                overrides.api_url = Some(url);
            }
            "--limit" => {
                let raw = args.next().ok_or("--limit needs a value")?;
                let limit = raw
                    .parse::<u32>()
                    .ok()
                    .filter(|l| *l > 0)
                    .ok_or_else(|| format!("Invalid --limit: {raw}"))?;
                overrides.limit = Some(limit);
            }
            _ => return Err(format!("Unknown argument: {arg}")),
        }
    }

    Ok(CliCommand::Run(overrides))
}

fn usage_text() -> &'static str {
    "extrainnings - baseball results ranked by excitement

Usage:
  extrainnings [--api-url URL] [--limit N]
  extrainnings --help
  extrainnings --version

Options:
  --api-url URL   Games API base URL (overrides EXTRAINNINGS_API_URL)
  --limit N       Games per request (default 500)

Environment (also read from ./.env):
  EXTRAINNINGS_API_URL   Games API base URL (default http://localhost:8000)
  EXTRAINNINGS_LOG       Log level: error, warn, info, debug or trace"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        let should_redraw = tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                handle_ui_event(ui_event, &app, &network_requests).await
            }

            Some(response) = network_responses.recv() => {
                handle_network_response(response, &app, &mut loading).await
            }

            else => break,
        };

        let mut app_guard = app.lock().await;
        if !app_guard.state.running {
            break;
        }
        if should_redraw {
            draw::draw(&mut terminal, &mut app_guard, loading);
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let requests = app.lock().await.startup_requests();
            for request in requests {
                if let Err(e) = network_requests.send(request).await {
                    error!("Failed to send network request: {e}");
                }
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    let mut guard = app.lock().await;
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            true
        }
        NetworkResponse::GamesLoaded { token, response } => guard.on_games_loaded(token, response),
        NetworkResponse::GamesFailed { token, message } => guard.on_games_failed(token, message),
        NetworkResponse::TeamsLoaded { teams } => {
            guard.on_teams_loaded(teams);
            true
        }
        NetworkResponse::TeamsFailed { message } => {
            guard.on_teams_failed(message);
            true
        }
        NetworkResponse::SeasonsLoaded { seasons } => {
            guard.on_seasons_loaded(seasons);
            true
        }
        NetworkResponse::SeasonsFailed { message } => {
            guard.on_seasons_failed(message);
            true
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        // Poll with a timeout so the task regularly reaches an await point and can be aborted.
        match crossterm_event::poll(INPUT_POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => {
                if ui_events.is_closed() {
                    break;
                }
                tokio::task::yield_now().await;
                continue;
            }
            Err(e) => {
                error!("Failed to poll terminal events: {e}");
                break;
            }
        }

        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    Some(UiEvent::KeyPressed(key_event))
                }
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

fn cleanup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::MoveTo(0, 0))?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    execute!(stdout, terminal::LeaveAlternateScreen)?;
    execute!(stdout, cursor::Show)?;
    terminal::disable_raw_mode()
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let _ = cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
