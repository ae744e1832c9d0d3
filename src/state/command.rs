//! Control intents forwarded to the timer driver

use tokio::sync::oneshot;

use super::TimerStatus;
use crate::{error::TimerError, timer::SettingsPatch};

/// What the caller wants the timer to do
#[derive(Debug, Clone, PartialEq)]
pub enum ControlIntent {
    Start,
    Pause,
    Resume,
    Stop,
    /// Change the fields that are set, keep the rest
    Configure(SettingsPatch),
}

impl ControlIntent {
    /// Short name used for logging and last-action tracking
    pub fn action(&self) -> &'static str {
        match self {
            ControlIntent::Start => "start",
            ControlIntent::Pause => "pause",
            ControlIntent::Resume => "resume",
            ControlIntent::Stop => "stop",
            ControlIntent::Configure(_) => "configure",
        }
    }
}

/// An intent plus the channel the driver answers on
#[derive(Debug)]
pub struct TimerCommand {
    pub intent: ControlIntent,
    pub reply: oneshot::Sender<Result<TimerStatus, TimerError>>,
}
