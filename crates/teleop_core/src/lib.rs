//! Keyboard-driven vehicle control core: bounded command state, the key table
//! that mutates it, the composer that turns it into outgoing commands, and the
//! two periodic tasks that connect them.

pub mod composer;
pub mod control;
pub mod keymap;
pub mod state;
pub mod status;
pub mod tasks;

pub use composer::{arbitrate_turn_signal, CommandComposer};
pub use control::{ControlHandle, ShutdownFlag};
pub use keymap::{ActionTable, KeyInput, HELP_LINES, QUIT_KEY};
pub use state::{Action, ControlState, Limits, StepSizes};
pub use status::{StatusLine, StatusSink, StatusUpdate};
pub use tasks::{run_session, InputListener, InputSource, ListenerTick, PublishLoop};
