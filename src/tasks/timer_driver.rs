//! Timer driver background task
//!
//! The timer is single-threaded, so it lives on one `LocalSet` task. Other
//! threads reach it through [`TimerCommand`]s and read [`TimerStatus`]
//! snapshots from a watch channel.

use std::rc::Rc;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    adapter::{Label, TextBinding, Widget},
    error::TimerError,
    scheduler::LocalScheduler,
    state::{ControlIntent, TimerCommand, TimerStatus},
    timer::{CountObserver, CountTimer, StateObserver, TimerSettings, TimerState, WeakCountTimer},
};

const COMMAND_BUFFER: usize = 32;
const IDLE_TEXT: &str = "ready";

/// Spawn the driver on the current `LocalSet`.
///
/// Returns the command sender, the status receiver and the task handle. The
/// task ends once every command sender has been dropped.
pub fn spawn_timer_driver(
    settings: TimerSettings,
) -> (
    mpsc::Sender<TimerCommand>,
    watch::Receiver<TimerStatus>,
    JoinHandle<anyhow::Result<()>>,
) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (status_tx, status_rx) = watch::channel(TimerStatus::new(&settings, IDLE_TEXT.to_string()));
    let handle = tokio::task::spawn_local(timer_driver_task(settings, command_rx, status_tx));
    (command_tx, status_rx, handle)
}

/// Own a timer and apply incoming commands to it until the channel closes
pub async fn timer_driver_task(
    settings: TimerSettings,
    mut commands: mpsc::Receiver<TimerCommand>,
    status_tx: watch::Sender<TimerStatus>,
) -> anyhow::Result<()> {
    info!("Starting timer driver task");

    let timer = CountTimer::from_settings(&settings, LocalScheduler::new())?;
    let display = Rc::new(Label::new(IDLE_TEXT));

    // The display binding goes first so later observers see the updated text
    TextBinding::new(Rc::clone(&display)).attach(&timer);

    let logger = Rc::new(TimerLogger {
        display: Rc::clone(&display),
    });
    timer.add_count_observer(logger.clone());
    timer.add_state_observer(logger);

    let publisher = Rc::new(StatusPublisher {
        timer: timer.downgrade(),
        display: Rc::clone(&display),
        status_tx,
    });
    timer.add_count_observer(publisher.clone());
    timer.add_state_observer(publisher.clone());

    while let Some(TimerCommand { intent, reply }) = commands.recv().await {
        debug!("Timer driver received {:?}", intent);
        let result = apply(&timer, intent).map(|()| {
            let status = TimerStatus::capture(&timer, display.text());
            publisher.publish(status.clone());
            status
        });

        if reply.send(result).is_err() {
            warn!("Timer command caller went away before the reply");
        }
    }

    info!("Command channel closed, stopping timer driver");
    timer.stop();
    Ok(())
}

fn apply(timer: &CountTimer, intent: ControlIntent) -> Result<(), TimerError> {
    match intent {
        ControlIntent::Start => timer.start(),
        ControlIntent::Pause => timer.pause(),
        ControlIntent::Resume => timer.resume(),
        ControlIntent::Stop => timer.stop(),
        ControlIntent::Configure(patch) => {
            let settings = patch.merge(timer.settings());
            debug!("Applying settings {:?}", settings);
            timer.apply_settings(&settings)?
        }
    }
    Ok(())
}

/// Logs every notification, the way the demo activity did
struct TimerLogger {
    display: Rc<Label>,
}

impl CountObserver for TimerLogger {
    fn on_start(&self) {
        info!("Countdown started");
    }

    fn on_count_down(&self, total_count: u32, current_count: u32) {
        debug!(
            "Count down: total={}, current={}, display={:?}",
            total_count,
            current_count,
            self.display.text()
        );
    }

    fn on_stop(&self) {
        info!("Countdown stopped");
    }
}

impl StateObserver for TimerLogger {
    fn on_state_changed(&self, state: TimerState) {
        info!("Timer state changed: {} ({})", state.label(), state.code());
    }
}

/// Mirrors the timer into the watch channel after every notification
struct StatusPublisher {
    timer: WeakCountTimer,
    display: Rc<Label>,
    status_tx: watch::Sender<TimerStatus>,
}

impl StatusPublisher {
    fn publish(&self, status: TimerStatus) {
        // send_replace never fails, even with no receivers left
        self.status_tx.send_replace(status);
    }

    fn refresh(&self) {
        if let Some(timer) = self.timer.upgrade() {
            self.publish(TimerStatus::capture(&timer, self.display.text()));
        }
    }
}

impl CountObserver for StatusPublisher {
    fn on_count_down(&self, _total_count: u32, _current_count: u32) {
        self.refresh();
    }

    fn on_stop(&self) {
        self.refresh();
    }
}

impl StateObserver for StatusPublisher {
    fn on_state_changed(&self, _state: TimerState) {
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::{sync::oneshot, task::LocalSet, time::sleep};

    use super::*;
    use crate::timer::{BoundaryPolicy, SettingsPatch};

    async fn send(
        commands: &mpsc::Sender<TimerCommand>,
        intent: ControlIntent,
    ) -> Result<TimerStatus, TimerError> {
        let (reply, response) = oneshot::channel();
        commands.send(TimerCommand { intent, reply }).await.unwrap();
        response.await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn drives_timer_and_publishes_status() {
        LocalSet::new()
            .run_until(async {
                let (commands, status, handle) = spawn_timer_driver(TimerSettings::new(3, 1000));
                assert_eq!(status.borrow().display, "ready");

                let started = send(&commands, ControlIntent::Start).await.unwrap();
                assert_eq!(started.state, TimerState::Running);
                assert_eq!(started.current_count, 3);

                sleep(Duration::from_millis(1500)).await;
                {
                    let snapshot = status.borrow();
                    assert_eq!(snapshot.current_count, 2);
                    assert_eq!(snapshot.display, "2");
                }

                sleep(Duration::from_millis(2000)).await;
                {
                    let snapshot = status.borrow();
                    assert_eq!(snapshot.state, TimerState::Stopped);
                    assert_eq!(snapshot.current_count, 3);
                    assert_eq!(snapshot.display, "ready");
                }

                drop(commands);
                handle.await.unwrap().unwrap();
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_configuration_while_running() {
        LocalSet::new()
            .run_until(async {
                let (commands, _status, _handle) = spawn_timer_driver(TimerSettings::new(10, 1000));

                send(&commands, ControlIntent::Start).await.unwrap();
                let patch = SettingsPatch::from(TimerSettings::new(5, 100));
                let err = send(&commands, ControlIntent::Configure(patch.clone()))
                    .await
                    .unwrap_err();
                assert!(matches!(err, TimerError::IllegalState { .. }));

                let paused = send(&commands, ControlIntent::Pause).await.unwrap();
                assert_eq!(paused.state, TimerState::Paused);

                send(&commands, ControlIntent::Stop).await.unwrap();
                let configured = send(&commands, ControlIntent::Configure(patch))
                    .await
                    .unwrap();
                assert_eq!(configured.total_count, 5);
                assert_eq!(configured.interval_ms, 100);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn partial_configuration_keeps_other_fields() {
        LocalSet::new()
            .run_until(async {
                let settings = TimerSettings::new(5, 250)
                    .reverse(true)
                    .boundary(BoundaryPolicy::Inclusive);
                let (commands, _status, _handle) = spawn_timer_driver(settings);

                let patch = SettingsPatch {
                    total_count: Some(9),
                    ..SettingsPatch::default()
                };
                let configured = send(&commands, ControlIntent::Configure(patch)).await.unwrap();
                assert_eq!(configured.total_count, 9);
                assert_eq!(configured.interval_ms, 250);
                assert!(configured.reverse);
                assert_eq!(configured.boundary, BoundaryPolicy::Inclusive);
                assert_eq!(configured.current_count, 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn closing_the_channel_stops_a_running_timer() {
        LocalSet::new()
            .run_until(async {
                let (commands, status, handle) = spawn_timer_driver(TimerSettings::new(5, 1000));
                send(&commands, ControlIntent::Start).await.unwrap();
                sleep(Duration::from_millis(1500)).await;
                assert_eq!(status.borrow().state, TimerState::Running);

                drop(commands);
                handle.await.unwrap().unwrap();

                let snapshot = status.borrow();
                assert_eq!(snapshot.state, TimerState::Stopped);
                assert_eq!(snapshot.current_count, 5);
                assert_eq!(snapshot.display, "ready");
            })
            .await;
    }
}
