use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::Utc;
use shared::protocol::ControlCommand;
use tokio::sync::Mutex;

use crate::{
    composer::CommandComposer,
    state::{Action, ControlState, StepSizes},
    status::StatusUpdate,
};

/// The only path to the shared `ControlState`. Every read and write takes the
/// same lock for its whole duration and nothing awaits while holding it.
#[derive(Clone)]
pub struct ControlHandle {
    state: Arc<Mutex<ControlState>>,
    steps: StepSizes,
    composer: Arc<CommandComposer>,
}

impl ControlHandle {
    pub fn new(state: ControlState, steps: StepSizes, composer: CommandComposer) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            steps,
            composer: Arc::new(composer),
        }
    }

    /// Applies one transition atomically. The returned update must be rendered
    /// by the caller, after this call has released the lock.
    pub async fn apply(&self, action: Action) -> StatusUpdate {
        let mut guard = self.state.lock().await;
        guard.apply(action, &self.steps)
    }

    pub async fn compose(&self) -> ControlCommand {
        let mut guard = self.state.lock().await;
        self.composer.compose(&mut guard, Utc::now())
    }

    pub async fn snapshot(&self) -> ControlState {
        self.state.lock().await.clone()
    }

    #[cfg(test)]
    pub(crate) fn is_locked(&self) -> bool {
        self.state.try_lock().is_err()
    }
}

impl Default for ControlHandle {
    fn default() -> Self {
        Self::new(
            ControlState::default(),
            StepSizes::default(),
            CommandComposer::default(),
        )
    }
}

/// Cooperative stop signal. Both periodic tasks read it once at the top of
/// every tick.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
