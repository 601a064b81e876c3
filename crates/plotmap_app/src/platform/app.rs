use std::time::{Duration, Instant};

use anyhow::bail;
use chrono::Local;
use log::LevelFilter;
use plotmap_core::{Msg, NotificationLevel};
use plotmap_engine::{BitmapStore, EngineHandle, HeadlessMap, MapSurface, TempDirBitmapStore};
use plotmap_logging::{plot_error, plot_info};

use super::effects::Session;
use super::input::read_input_files;
use super::render::{format_notification, render};
use crate::{AppConfig, Cli};

const PUMP_INTERVAL: Duration = Duration::from_millis(75);
/// Slack on top of the request timeout before the session gives up.
const IDLE_GRACE: Duration = Duration::from_secs(5);

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::resolve(&cli)?;
    plotmap_logging::initialize(config.log_destination, LevelFilter::Info);
    plot_info!("analysis service at {}", config.api_url);

    let files = read_input_files(&cli.files)?;
    let engine = EngineHandle::new(config.upload_settings(), config.fetch_settings())?;
    let store = TempDirBitmapStore::new()?;
    let mut session = Session::new(engine, HeadlessMap::new(), store, config.output_dir.clone());
    let budget = Duration::from_secs(config.request_timeout_secs) + IDLE_GRACE;

    session.dispatch(Msg::FilesDropped(files));
    flush(&mut session);
    session.dispatch(Msg::SubmitClicked);
    flush(&mut session);
    let errors = drive(&mut session, budget)?;

    if !session.state().view().analysis_done {
        bail!("analysis did not complete ({errors} error(s) reported)");
    }

    if cli.download {
        session.dispatch(Msg::DownloadClicked);
        if drive(&mut session, budget)? > 0 {
            bail!("download failed");
        }
    }

    session.teardown();
    flush(&mut session);
    Ok(())
}

/// Pumps engine events until idle, printing as it goes. Returns the number of
/// error notifications seen.
fn drive<M: MapSurface, B: BitmapStore>(
    session: &mut Session<M, B>,
    budget: Duration,
) -> anyhow::Result<usize> {
    let deadline = Instant::now() + budget;
    let mut errors = 0;
    while session.pending() > 0 {
        if Instant::now() >= deadline {
            plot_error!("{} engine command(s) still outstanding", session.pending());
            bail!("timed out waiting for the analysis service");
        }
        session.pump(PUMP_INTERVAL);
        errors += flush(session);
    }
    Ok(errors + flush(session))
}

fn flush<M: MapSurface, B: BitmapStore>(session: &mut Session<M, B>) -> usize {
    if let Some(view) = session.take_render() {
        for line in render(&view) {
            println!("{line}");
        }
    }
    let now = Local::now();
    let mut errors = 0;
    for notification in session.take_notifications() {
        if notification.level == NotificationLevel::Error {
            errors += 1;
        }
        eprintln!("{}", format_notification(&notification, &now));
    }
    errors
}
