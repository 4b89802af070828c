use chrono::{DateTime, Utc};
use shared::{
    domain::TurnSignal,
    protocol::{ControlCommand, Header, PadMessage, VehicleSignal, MODULE_NAME},
};

use crate::state::ControlState;

/// Resolves the turn signal to publish.
///
/// An explicit LEFT/RIGHT/HAZARD selection always wins. With no selection a
/// threshold of zero returns `None` so the vehicle applies its own logic;
/// otherwise the steering angle decides, and a centred wheel yields an
/// explicit `TurnSignal::None`.
pub fn arbitrate_turn_signal(state: &ControlState) -> Option<TurnSignal> {
    match state.turn_signal_mode {
        TurnSignal::Left | TurnSignal::Right | TurnSignal::Hazard => Some(state.turn_signal_mode),
        TurnSignal::None if state.turn_signal_threshold <= 0.0 => None,
        TurnSignal::None => {
            let threshold = state.turn_signal_threshold;
            if state.steering > threshold {
                Some(TurnSignal::Left)
            } else if state.steering < -threshold {
                Some(TurnSignal::Right)
            } else {
                Some(TurnSignal::None)
            }
        }
    }
}

pub fn pad_for(state: &ControlState) -> PadMessage {
    if state.autonomy_engaged {
        PadMessage::engaged()
    } else {
        PadMessage::disengaged()
    }
}

#[derive(Debug, Clone)]
pub struct CommandComposer {
    module_name: String,
}

impl CommandComposer {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// Builds the next outgoing command. Always advances the sequence number,
    /// whether or not anything changed since the previous call.
    pub fn compose(&self, state: &mut ControlState, now: DateTime<Utc>) -> ControlCommand {
        state.sequence_num += 1;

        ControlCommand {
            header: Header {
                timestamp_sec: now.timestamp_micros() as f64 / 1_000_000.0,
                module_name: self.module_name.clone(),
                sequence_num: state.sequence_num,
            },
            pad_msg: pad_for(state),
            throttle: state.throttle,
            speed: state.speed,
            steering_target: state.steering,
            steering_rate: state.steering_rate,
            gear_location: state.gear,
            brake: state.brake,
            parking_brake: state.epb_engaged,
            signal: VehicleSignal {
                horn: state.horn,
                high_beam: state.high_beam,
                low_beam: state.low_beam,
                emergency_light: state.emergency_light,
                turn_signal: arbitrate_turn_signal(state),
            },
        }
    }
}

impl Default for CommandComposer {
    fn default() -> Self {
        Self::new(MODULE_NAME)
    }
}

#[cfg(test)]
#[path = "tests/composer_tests.rs"]
mod tests;
