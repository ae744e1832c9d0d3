//! Main application state shared with the HTTP handlers

use std::{sync::Mutex, time::Instant};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, warn};

use super::{ControlIntent, TimerCommand, TimerStatus};
use crate::error::ControlError;

/// Thread-safe front of the timer: commands go to the driver task, status
/// comes back through a watch channel
#[derive(Debug)]
pub struct AppState {
    /// Channel to the task that owns the timer
    command_tx: mpsc::Sender<TimerCommand>,
    /// Latest snapshot published by the driver
    status_rx: watch::Receiver<TimerStatus>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        command_tx: mpsc::Sender<TimerCommand>,
        status_rx: watch::Receiver<TimerStatus>,
    ) -> Self {
        Self {
            command_tx,
            status_rx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Forward an intent to the driver and wait for the resulting status
    pub async fn control(&self, intent: ControlIntent) -> Result<TimerStatus, ControlError> {
        let action = intent.action();
        info!("Forwarding {} to timer driver", action);

        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(TimerCommand { intent, reply })
            .await
            .map_err(|_| ControlError::DriverGone)?;
        let status = response.await.map_err(|_| ControlError::DriverGone)??;

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(status)
    }

    /// Latest published timer status
    pub fn timer_status(&self) -> TimerStatus {
        self.status_rx.borrow().clone()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = match self.last_action.lock() {
            Ok(action) => action.clone(),
            Err(e) => {
                warn!("Failed to lock last action: {}", e);
                None
            }
        };
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
