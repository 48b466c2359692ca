// Terminal UI - Interactive front end for the metrics page
mod app;
mod events;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, oneshot};

use crate::application::device_service::DeviceService;
use crate::application::monitoring_repository::{MonitoringError, MonitoringRepository};
use crate::application::normalizer::TimeFormatter;
use crate::application::query_orchestrator::{FetchOutcome, MetricQueryOrchestrator};
use crate::domain::device::Device;
use crate::domain::window::RangeSelector;
use crate::presentation::page_state::PageState;
use app::TuiApp;

type DeviceListing = oneshot::Receiver<Result<Vec<Device>, MonitoringError>>;

pub struct TuiOptions {
    pub device: Option<String>,
    pub range: RangeSelector,
    pub formatter: TimeFormatter,
}

/// Run the terminal UI until the user quits.
pub async fn run(repository: Arc<dyn MonitoringRepository>, options: TuiOptions) -> Result<()> {
    let (orchestrator, completions) = MetricQueryOrchestrator::channel(repository.clone());
    let mut app = TuiApp::new(PageState::new(orchestrator, options.range), options.formatter);
    if let Some(device) = options.device {
        app.preselect(device);
    }

    let (device_tx, device_rx) = oneshot::channel();
    let device_service = DeviceService::new(repository);
    tokio::spawn(async move {
        let _ = device_tx.send(device_service.list_devices().await);
    });

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app, completions, device_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
    mut completions: mpsc::Receiver<FetchOutcome>,
    mut device_rx: DeviceListing,
) -> Result<()> {
    let mut input = EventStream::new();
    let mut devices_pending = true;

    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        let toast_expiry = app.notification_remaining();

        tokio::select! {
            event = input.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key);
                }
                // Resize and the rest just redraw
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(outcome) = completions.recv() => app.apply_fetch(outcome),
            listing = &mut device_rx, if devices_pending => {
                devices_pending = false;
                let result = listing.unwrap_or_else(|_| {
                    Err(MonitoringError::Http("device listing task ended unexpectedly".to_string()))
                });
                app.devices_loaded(result);
            }
            _ = tokio::time::sleep(toast_expiry.unwrap_or(Duration::ZERO)), if toast_expiry.is_some() => {}
        }
    }

    Ok(())
}
