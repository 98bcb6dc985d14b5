//! Main polling service implementation
//!
//! Owns the API client, the shared view state and the background poll
//! tasks, with status tracking and graceful shutdown.

use crate::{
    config::MonitorConfig,
    poller::{self, PollTask},
    snapshot::{build_snapshot, DashboardSnapshot},
    state::ViewState,
    MonitorError, Result,
};
use flowdash_client::ApiClient;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::{
    sync::{broadcast, Notify},
    task::JoinHandle,
    time::{interval, Instant},
};
use tracing::{debug, info, instrument, warn};

/// Task handles type alias
type TaskHandles = Arc<RwLock<Vec<JoinHandle<()>>>>;

/// Service status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    /// Service is stopped
    Stopped,

    /// Service is starting up
    Starting,

    /// Service is running normally
    Running,

    /// Service is shutting down
    Stopping,

    /// Service encountered an error but is still running
    Degraded {
        /// Reason for degraded status
        reason: String,
    },

    /// Service failed and stopped
    Failed {
        /// Reason for failure
        reason: String,
    },
}

impl Default for ServiceStatus {
    fn default() -> Self {
        Self::Stopped
    }
}

/// Main polling service
#[derive(Debug)]
pub struct MonitorService {
    /// Service configuration
    config: MonitorConfig,

    /// Backend API client
    client: ApiClient,

    /// Shared view of the backend's data
    state: Arc<ViewState>,

    /// Running task handles
    task_handles: TaskHandles,

    /// Shutdown signal
    shutdown_notify: Arc<Notify>,

    /// Shutdown sender (for broadcasting shutdown)
    shutdown_tx: broadcast::Sender<()>,

    /// Service status
    status: Arc<RwLock<ServiceStatus>>,

    /// Service start time
    start_time: Arc<RwLock<Option<Instant>>>,
}

impl MonitorService {
    /// Create a new polling service
    ///
    /// Builds the API client from the backend configuration and, when
    /// credentials are configured without a pre-issued token, logs in to
    /// obtain one.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError`] if the HTTP client cannot be constructed
    /// or the configured login fails.
    pub async fn new(config: MonitorConfig) -> Result<Self> {
        info!("Initializing polling service");

        let mut client = ApiClient::from_config(&config.backend)?;

        if !client.has_token() {
            if let (Some(username), Some(password)) =
                (&config.backend.username, &config.backend.password)
            {
                client.login(username, password).await?;
                info!(username = %username, "Authenticated against backend");
            } else {
                warn!("No token or credentials configured, polling unauthenticated");
            }
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let service = Self {
            config,
            client,
            state: Arc::new(ViewState::default()),
            task_handles: Arc::new(RwLock::new(Vec::new())),
            shutdown_notify: Arc::new(Notify::new()),
            shutdown_tx,
            status: Arc::new(RwLock::new(ServiceStatus::Stopped)),
            start_time: Arc::new(RwLock::new(None)),
        };

        info!("Polling service initialized successfully");
        Ok(service)
    }

    /// Start the polling service
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ServiceAlreadyRunning`] if already started.
    #[allow(clippy::significant_drop_tightening)]
    #[instrument(skip(self))]
    pub fn start(&self) -> Result<()> {
        let mut status = self.status.write();
        if *status != ServiceStatus::Stopped {
            return Err(MonitorError::ServiceAlreadyRunning);
        }
        *status = ServiceStatus::Starting;
        drop(status);

        info!("Starting polling service");

        *self.start_time.write() = Some(Instant::now());

        let mut handles = self.task_handles.write();

        for task in [
            PollTask::Devices,
            PollTask::Readings,
            PollTask::Alarms,
            PollTask::Sections,
            PollTask::Drums,
        ] {
            handles.push(poller::spawn_poll_task(
                task,
                self.client.clone(),
                self.state.clone(),
                self.config.poll.clone(),
                self.shutdown_tx.subscribe(),
            ));
        }

        if self.config.service.health_check_interval_seconds > 0 {
            handles.push(self.spawn_health_check_task());
        }
        drop(handles);

        *self.status.write() = ServiceStatus::Running;

        info!(
            backend = %self.config.backend.base_url,
            "Polling service started successfully"
        );

        Ok(())
    }

    /// Stop the polling service
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible for symmetry with [`Self::start`].
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<()> {
        {
            let mut status = self.status.write();
            if *status == ServiceStatus::Stopped {
                return Ok(());
            }
            *status = ServiceStatus::Stopping;
        }

        info!("Stopping polling service");

        let _ = self.shutdown_tx.send(());
        self.shutdown_notify.notify_waiters();

        let timeout_duration = self.config.service.shutdown_timeout();
        let shutdown_result = tokio::time::timeout(timeout_duration, async {
            let handles = {
                let mut h = self.task_handles.write();
                let handles: Vec<_> = h.drain(..).collect();
                drop(h);
                handles
            };
            for handle in handles {
                let _ = handle.await;
            }
        })
        .await;

        if shutdown_result.is_err() {
            warn!("Service shutdown timed out, some tasks may still be running");
        }

        *self.status.write() = ServiceStatus::Stopped;
        *self.start_time.write() = None;

        info!("Polling service stopped");
        Ok(())
    }

    /// Get service status
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        self.status.read().clone()
    }

    /// Service uptime in seconds, when running
    #[must_use]
    pub fn uptime_seconds(&self) -> Option<u64> {
        self.start_time.read().map(|start| start.elapsed().as_secs())
    }

    /// Shared view state (for tests and embedding)
    #[must_use]
    pub fn state(&self) -> Arc<ViewState> {
        self.state.clone()
    }

    /// The API client this service polls with
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Derive a classified dashboard snapshot from the current view state
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        build_snapshot(&self.state, chrono::Utc::now())
    }

    /// Run every poll once, sequentially.
    ///
    /// Used by the one-shot CLI commands; the background tasks do the same
    /// work on their own intervals.
    pub async fn refresh_once(&self) {
        poller::refresh_devices(&self.client, &self.state).await;
        poller::refresh_readings(&self.client, &self.state, &self.config.poll).await;
        poller::refresh_alarms(&self.client, &self.state).await;
        poller::refresh_sections(&self.client, &self.state).await;
        poller::refresh_drums(&self.client, &self.state).await;
    }

    /// Wait for shutdown signal
    pub async fn wait_for_shutdown(&self) {
        self.shutdown_notify.notified().await;
    }

    /// Spawn the freshness health check task
    fn spawn_health_check_task(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        let status = self.status.clone();
        let health_check_interval = self.config.service.health_check_interval();
        let stale_after = i64::try_from(self.config.service.stale_after_seconds).unwrap_or(i64::MAX);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut ticker = interval(health_check_interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let stale = state.stale_collections(chrono::Utc::now(), stale_after);

                        if stale.is_empty() {
                            if matches!(*status.read(), ServiceStatus::Degraded { .. }) {
                                info!("All collections fresh again, service recovered");
                                *status.write() = ServiceStatus::Running;
                            }
                        } else {
                            warn!(collections = ?stale, "Collections have gone stale");
                            *status.write() = ServiceStatus::Degraded {
                                reason: format!("stale collections: {}", stale.join(", ")),
                            };
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Health check task shutting down");
                        break;
                    }
                }
            }
        })
    }
}
