//! The two periodic tasks: keyboard intake and command publication.

use std::{sync::Arc, time::Duration};

use command_transport::CommandPublisher;
use shared::{error::TeleopError, protocol::ControlCommand};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::{
    control::{ControlHandle, ShutdownFlag},
    keymap::{ActionTable, KeyInput},
    state::Action,
    status::{StatusLine, StatusSink, StatusUpdate},
};

pub const DEFAULT_INPUT_PERIOD: Duration = Duration::from_millis(50);
pub const DEFAULT_PUBLISH_PERIOD: Duration = Duration::from_millis(100);

/// Non-blocking source of key symbols. `Ok(None)` means nothing was pressed
/// since the last poll.
pub trait InputSource: Send {
    fn poll_symbol(&mut self) -> Result<Option<char>, TeleopError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTick {
    Idle,
    Applied(Action),
    Ignored(char),
    Quit,
}

pub struct InputListener<I> {
    source: I,
    table: ActionTable,
    control: ControlHandle,
    sink: Arc<dyn StatusSink>,
    shutdown: ShutdownFlag,
    period: Duration,
}

impl<I: InputSource> InputListener<I> {
    pub fn new(
        source: I,
        table: ActionTable,
        control: ControlHandle,
        sink: Arc<dyn StatusSink>,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            source,
            table,
            control,
            sink,
            shutdown,
            period: DEFAULT_INPUT_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub async fn run(mut self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_ms = self.period.as_millis() as u64, "input listener started");

        loop {
            ticker.tick().await;
            if self.shutdown.is_requested() {
                break;
            }
            if self.tick().await == ListenerTick::Quit {
                break;
            }
        }

        info!("input listener stopped");
    }

    /// One poll, at most one transition.
    pub async fn tick(&mut self) -> ListenerTick {
        let symbol = match self.source.poll_symbol() {
            Ok(Some(symbol)) => symbol,
            Ok(None) => return ListenerTick::Idle,
            Err(err) => {
                warn!(error = %err, "keyboard poll failed; skipping tick");
                return ListenerTick::Idle;
            }
        };

        match self.table.lookup(symbol) {
            KeyInput::Quit => {
                info!("quit requested from keyboard");
                self.shutdown.request();
                self.sink.show(&StatusUpdate::new(
                    StatusLine::Notice,
                    "Keyboard control stopped.",
                ));
                ListenerTick::Quit
            }
            KeyInput::Action(action) => {
                let update = self.control.apply(action).await;
                debug!(?action, "applied action");
                self.sink.show(&update);
                ListenerTick::Applied(action)
            }
            KeyInput::Unmapped => ListenerTick::Ignored(symbol),
        }
    }
}

pub struct PublishLoop {
    control: ControlHandle,
    publisher: Arc<dyn CommandPublisher>,
    sink: Arc<dyn StatusSink>,
    shutdown: ShutdownFlag,
    period: Duration,
}

impl PublishLoop {
    pub fn new(
        control: ControlHandle,
        publisher: Arc<dyn CommandPublisher>,
        sink: Arc<dyn StatusSink>,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            control,
            publisher,
            sink,
            shutdown,
            period: DEFAULT_PUBLISH_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            channel = self.publisher.channel(),
            period_ms = self.period.as_millis() as u64,
            "publish loop started"
        );

        loop {
            ticker.tick().await;
            if self.shutdown.is_requested() {
                break;
            }
            self.tick().await;
        }

        info!("publish loop stopped");
    }

    /// Composes and sends one command. A failed send is logged and dropped;
    /// the next tick publishes fresh state anyway.
    pub async fn tick(&self) -> ControlCommand {
        let command = self.control.compose().await;
        let channel = self.publisher.channel();

        let outcome = match self.publisher.publish(&command).await {
            Ok(()) => "sent",
            Err(err) => {
                warn!(
                    channel,
                    sequence_num = command.header.sequence_num,
                    error = %err,
                    "failed to publish control command"
                );
                "send failed"
            }
        };

        let turn_signal = command
            .signal
            .turn_signal
            .map_or("vehicle default", |signal| signal.label());
        self.sink.show(&StatusUpdate::new(
            StatusLine::Publish,
            format!(
                "#{} {outcome} to {channel}, turn signal: {turn_signal}",
                command.header.sequence_num
            ),
        ));
        command
    }
}

/// Runs both tasks until the shutdown flag is raised and both have exited. If
/// either task dies the flag is raised so the other one winds down too.
pub async fn run_session<I>(listener: InputListener<I>, publisher: PublishLoop)
where
    I: InputSource + 'static,
{
    let shutdown = listener.shutdown.clone();
    let mut input_task = tokio::spawn(listener.run());
    let mut publish_task = tokio::spawn(publisher.run());

    let (finished, result, remaining_name, remaining) = tokio::select! {
        result = &mut input_task => ("input", result, "publish", publish_task),
        result = &mut publish_task => ("publish", result, "input", input_task),
    };
    shutdown.request();

    if let Err(err) = result {
        error!(task = finished, error = %err, "task ended abnormally");
    }
    if let Err(err) = remaining.await {
        error!(task = remaining_name, error = %err, "task ended abnormally");
    }
}

#[cfg(test)]
#[path = "tests/tasks_tests.rs"]
mod tests;
