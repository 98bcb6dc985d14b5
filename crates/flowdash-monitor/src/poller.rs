//! Background poll tasks, one per backend collection
//!
//! Each task runs on its own interval, draws a ticket before the request
//! and commits the response against it; failures keep the previous data
//! and log a warning, so one bad poll never blanks the dashboard.

use crate::config::PollConfig;
use crate::state::ViewState;
use flowdash_client::{AlarmQuery, ApiClient, ReadingsQuery};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

/// Refresh the device list
pub async fn refresh_devices(client: &ApiClient, state: &ViewState) {
    let ticket = state.devices.ticket();
    match client.list_devices().await {
        Ok(devices) => {
            if state.devices.commit(ticket, devices) {
                debug!("device list refreshed");
            } else {
                debug!("stale device response discarded");
            }
        }
        Err(e) => warn!(error = %e, "device poll failed, keeping previous data"),
    }
}

/// Refresh the trailing readings window
pub async fn refresh_readings(client: &ApiClient, state: &ViewState, poll: &PollConfig) {
    let ticket = state.readings.ticket();
    let query = ReadingsQuery {
        start_date: Some(
            chrono::Utc::now() - chrono::Duration::hours(i64::from(poll.readings_window_hours)),
        ),
        page_size: Some(poll.readings_page_size),
        ..ReadingsQuery::default()
    };

    match client.readings(&query).await {
        Ok(page) => {
            let fetched = page.data.len();
            if state.readings.commit(ticket, page.data) {
                debug!(rows = fetched, total = page.total, "readings window refreshed");
            } else {
                debug!("stale readings response discarded");
            }
        }
        Err(e) => warn!(error = %e, "readings poll failed, keeping previous data"),
    }
}

/// Refresh alarms, alarm counters and thresholds together
pub async fn refresh_alarms(client: &ApiClient, state: &ViewState) {
    let alarms_ticket = state.alarms.ticket();
    match client.list_alarms(&AlarmQuery::default()).await {
        Ok(alarms) => {
            state.alarms.commit(alarms_ticket, alarms);
        }
        Err(e) => warn!(error = %e, "alarm poll failed, keeping previous data"),
    }

    let stats_ticket = state.alarm_stats.ticket();
    match client.alarm_stats().await {
        Ok(stats) => {
            state.alarm_stats.commit(stats_ticket, stats);
        }
        Err(e) => warn!(error = %e, "alarm stats poll failed, keeping previous data"),
    }

    let thresholds_ticket = state.thresholds.ticket();
    match client.list_thresholds().await {
        Ok(thresholds) => {
            state.thresholds.commit(thresholds_ticket, thresholds);
        }
        Err(e) => warn!(error = %e, "threshold poll failed, keeping previous data"),
    }
}

/// Refresh backend section statistics and the headline counters
pub async fn refresh_sections(client: &ApiClient, state: &ViewState) {
    let sections_ticket = state.sections.ticket();
    match client.section_stats().await {
        Ok(stats) => {
            state.sections.commit(sections_ticket, stats);
        }
        Err(e) => warn!(error = %e, "section stats poll failed, keeping previous data"),
    }

    let dashboard_ticket = state.dashboard.ticket();
    match client.dashboard_stats().await {
        Ok(stats) => {
            state.dashboard.commit(dashboard_ticket, stats);
        }
        Err(e) => warn!(error = %e, "dashboard stats poll failed, keeping previous data"),
    }
}

/// Refresh the odorant drum inventory
pub async fn refresh_drums(client: &ApiClient, state: &ViewState) {
    let ticket = state.drums.ticket();
    match client.odorant_drums(None).await {
        Ok(drums) => {
            if state.drums.commit(ticket, drums) {
                debug!("drum inventory refreshed");
            }
        }
        Err(e) => warn!(error = %e, "drum poll failed, keeping previous data"),
    }
}

/// Which collection a spawned poll task refreshes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollTask {
    /// Device list
    Devices,
    /// Readings window
    Readings,
    /// Alarms, counters and thresholds
    Alarms,
    /// Section and dashboard statistics
    Sections,
    /// Odorant drums
    Drums,
}

impl PollTask {
    const fn name(self) -> &'static str {
        match self {
            Self::Devices => "devices",
            Self::Readings => "readings",
            Self::Alarms => "alarms",
            Self::Sections => "sections",
            Self::Drums => "drums",
        }
    }

    fn period(self, poll: &PollConfig) -> Duration {
        match self {
            Self::Devices => poll.devices_interval(),
            Self::Readings => poll.readings_interval(),
            Self::Alarms => poll.alarms_interval(),
            Self::Sections => poll.sections_interval(),
            Self::Drums => poll.drums_interval(),
        }
    }

    async fn run(self, client: &ApiClient, state: &ViewState, poll: &PollConfig) {
        match self {
            Self::Devices => refresh_devices(client, state).await,
            Self::Readings => refresh_readings(client, state, poll).await,
            Self::Alarms => refresh_alarms(client, state).await,
            Self::Sections => refresh_sections(client, state).await,
            Self::Drums => refresh_drums(client, state).await,
        }
    }
}

/// Spawn the interval loop for one poll task
pub(crate) fn spawn_poll_task(
    task: PollTask,
    client: ApiClient,
    state: Arc<ViewState>,
    poll: PollConfig,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(task.period(&poll));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(task = task.name(), "poll task started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    task.run(&client, &state, &poll).await;
                }
                _ = shutdown_rx.recv() => {
                    debug!(task = task.name(), "poll task shutting down");
                    break;
                }
            }
        }
    })
}
