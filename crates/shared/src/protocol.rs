use serde::{Deserialize, Serialize};

use crate::domain::{DrivingAction, DrivingMode, GearPosition, TurnSignal};

pub const CONTROL_CHANNEL: &str = "/apollo/control";
pub const MODULE_NAME: &str = "can_easy";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub timestamp_sec: f64,
    pub module_name: String,
    pub sequence_num: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadMessage {
    pub driving_mode: DrivingMode,
    pub action: DrivingAction,
}

impl PadMessage {
    pub fn engaged() -> Self {
        Self {
            driving_mode: DrivingMode::AutoDrive,
            action: DrivingAction::Start,
        }
    }

    pub fn disengaged() -> Self {
        Self {
            driving_mode: DrivingMode::Manual,
            action: DrivingAction::Stop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSignal {
    pub horn: bool,
    pub high_beam: bool,
    pub low_beam: bool,
    pub emergency_light: bool,
    /// `None` leaves the turn signal to the vehicle's own logic; it is not the
    /// same as `Some(TurnSignal::None)`, which forces the signal off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_signal: Option<TurnSignal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub header: Header,
    pub pad_msg: PadMessage,
    pub throttle: f64,
    pub speed: f64,
    pub steering_target: f64,
    pub steering_rate: f64,
    pub gear_location: GearPosition,
    pub brake: f64,
    pub parking_brake: bool,
    pub signal: VehicleSignal,
}

/// What actually goes out on a datagram transport: the destination channel
/// plus the command itself.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelEnvelope<'a> {
    pub channel: &'a str,
    pub command: &'a ControlCommand,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(turn_signal: Option<TurnSignal>) -> ControlCommand {
        ControlCommand {
            header: Header {
                timestamp_sec: 1_700_000_000.5,
                module_name: MODULE_NAME.to_string(),
                sequence_num: 7,
            },
            pad_msg: PadMessage::engaged(),
            throttle: 10.0,
            speed: 0.5,
            steering_target: -3.0,
            steering_rate: 0.0,
            gear_location: GearPosition::Drive,
            brake: 0.0,
            parking_brake: false,
            signal: VehicleSignal {
                horn: false,
                high_beam: true,
                low_beam: false,
                emergency_light: false,
                turn_signal,
            },
        }
    }

    #[test]
    fn unset_turn_signal_is_absent_on_the_wire() {
        let json = serde_json::to_value(command(None)).expect("serialize");
        assert!(json["signal"].get("turn_signal").is_none());
    }

    #[test]
    fn explicit_none_turn_signal_is_present_on_the_wire() {
        let json = serde_json::to_value(command(Some(TurnSignal::None))).expect("serialize");
        assert_eq!(json["signal"]["turn_signal"], "none");
    }

    #[test]
    fn gear_serializes_as_chassis_code() {
        let json = serde_json::to_value(command(None)).expect("serialize");
        assert_eq!(json["gear_location"], 1);
        assert_eq!(json["pad_msg"]["driving_mode"], "auto_drive");
        assert_eq!(json["pad_msg"]["action"], "start");
    }

    #[test]
    fn rejects_unknown_gear_code() {
        let mut json = serde_json::to_value(command(None)).expect("serialize");
        json["gear_location"] = serde_json::json!(9);
        assert!(serde_json::from_value::<ControlCommand>(json).is_err());
    }
}
