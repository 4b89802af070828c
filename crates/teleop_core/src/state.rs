//! Vehicle command state and the transitions the operator can apply to it.

use shared::domain::{GearPosition, TurnSignal};

use crate::status::{StatusLine, StatusUpdate};

/// Closed interval a bounded field is kept inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub min: f64,
    pub max: f64,
}

impl Limits {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `clamp(value + sign * delta, min, max)`, the single rule every bounded
    /// field moves by.
    pub fn step(self, value: f64, delta: f64, sign: f64) -> f64 {
        (value + sign * delta).clamp(self.min, self.max)
    }

    pub fn contains(self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

pub const SPEED_LIMITS: Limits = Limits::new(-5.0, 5.0);
pub const THROTTLE_LIMITS: Limits = Limits::new(0.0, 100.0);
pub const STEERING_LIMITS: Limits = Limits::new(-100.0, 100.0);
pub const STEERING_RATE_LIMITS: Limits = Limits::new(-6.28, 6.28);
pub const BRAKE_LIMITS: Limits = Limits::new(0.0, 100.0);
pub const TURN_SIGNAL_THRESHOLD_LIMITS: Limits = Limits::new(0.0, 100.0);

pub const SPEED_DELTA: f64 = 0.1;
pub const THROTTLE_DELTA: f64 = 2.0;
pub const STEERING_DELTA: f64 = 1.0;
pub const STEERING_RATE_DELTA: f64 = 0.1;
pub const BRAKE_DELTA: f64 = 1.0;
pub const TURN_SIGNAL_THRESHOLD_DELTA: f64 = 1.0;

/// Per-keystroke increments. Only speed, steering and brake are operator
/// tunable; the rest are fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSizes {
    pub speed: f64,
    pub steering: f64,
    pub brake: f64,
}

impl StepSizes {
    pub const THROTTLE: f64 = THROTTLE_DELTA;
    pub const STEERING_RATE: f64 = STEERING_RATE_DELTA;
    pub const TURN_SIGNAL_THRESHOLD: f64 = TURN_SIGNAL_THRESHOLD_DELTA;
}

impl Default for StepSizes {
    fn default() -> Self {
        Self {
            speed: SPEED_DELTA,
            steering: STEERING_DELTA,
            brake: BRAKE_DELTA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Accelerate,
    Decelerate,
    SteerLeft,
    SteerRight,
    SteeringRateUp,
    SteeringRateDown,
    BrakeUp,
    BrakeDown,
    TurnSignalThresholdUp,
    TurnSignalThresholdDown,
    CycleGear,
    ToggleParkingBrake,
    ToggleEngage,
    ToggleHorn,
    ToggleLowBeam,
    ToggleHighBeam,
    ToggleEmergencyLight,
    SetTurnSignal(TurnSignal),
    EmergencyStop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    pub speed: f64,
    pub throttle: f64,
    pub steering: f64,
    pub steering_rate: f64,
    pub brake: f64,
    pub turn_signal_threshold: f64,
    pub gear: GearPosition,
    pub epb_engaged: bool,
    pub autonomy_engaged: bool,
    /// Last explicit operator selection, not the arbitrated output.
    pub turn_signal_mode: TurnSignal,
    pub horn: bool,
    pub high_beam: bool,
    pub low_beam: bool,
    pub emergency_light: bool,
    pub sequence_num: u64,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            speed: 0.0,
            throttle: 0.0,
            steering: 0.0,
            steering_rate: 0.0,
            brake: 0.0,
            turn_signal_threshold: 0.0,
            gear: GearPosition::Park,
            epb_engaged: false,
            autonomy_engaged: true,
            turn_signal_mode: TurnSignal::None,
            horn: false,
            high_beam: false,
            low_beam: false,
            emergency_light: false,
            sequence_num: 0,
        }
    }
}

impl ControlState {
    pub fn gear_index(&self) -> usize {
        self.gear.index()
    }

    pub fn gear_code(&self) -> i32 {
        self.gear.code()
    }

    /// Applies one transition and describes the field it touched. Pure
    /// in-memory arithmetic: nothing here may block or perform I/O.
    pub fn apply(&mut self, action: Action, steps: &StepSizes) -> StatusUpdate {
        match action {
            Action::Accelerate => self.move_longitudinal(steps, 1.0),
            Action::Decelerate => self.move_longitudinal(steps, -1.0),
            Action::SteerLeft => {
                self.steering = STEERING_LIMITS.step(self.steering, steps.steering, 1.0);
                self.status(StatusLine::Steering)
            }
            Action::SteerRight => {
                self.steering = STEERING_LIMITS.step(self.steering, steps.steering, -1.0);
                self.status(StatusLine::Steering)
            }
            Action::SteeringRateUp => {
                self.steering_rate =
                    STEERING_RATE_LIMITS.step(self.steering_rate, StepSizes::STEERING_RATE, 1.0);
                self.status(StatusLine::SteeringRate)
            }
            Action::SteeringRateDown => {
                self.steering_rate =
                    STEERING_RATE_LIMITS.step(self.steering_rate, StepSizes::STEERING_RATE, -1.0);
                self.status(StatusLine::SteeringRate)
            }
            Action::BrakeUp => {
                self.brake = BRAKE_LIMITS.step(self.brake, steps.brake, 1.0);
                self.status(StatusLine::Brake)
            }
            Action::BrakeDown => {
                self.brake = BRAKE_LIMITS.step(self.brake, steps.brake, -1.0);
                self.status(StatusLine::Brake)
            }
            Action::TurnSignalThresholdUp => {
                self.turn_signal_threshold = TURN_SIGNAL_THRESHOLD_LIMITS.step(
                    self.turn_signal_threshold,
                    StepSizes::TURN_SIGNAL_THRESHOLD,
                    1.0,
                );
                self.status(StatusLine::TurnSignalThreshold)
            }
            Action::TurnSignalThresholdDown => {
                self.turn_signal_threshold = TURN_SIGNAL_THRESHOLD_LIMITS.step(
                    self.turn_signal_threshold,
                    StepSizes::TURN_SIGNAL_THRESHOLD,
                    -1.0,
                );
                self.status(StatusLine::TurnSignalThreshold)
            }
            Action::CycleGear => {
                self.gear = self.gear.next();
                self.status(StatusLine::Gear)
            }
            Action::ToggleParkingBrake => {
                self.epb_engaged = !self.epb_engaged;
                self.status(StatusLine::ParkingBrake)
            }
            Action::ToggleEngage => {
                self.autonomy_engaged = !self.autonomy_engaged;
                self.status(StatusLine::Engage)
            }
            Action::ToggleHorn => {
                self.horn = !self.horn;
                self.status(StatusLine::Horn)
            }
            Action::ToggleLowBeam => {
                self.low_beam = !self.low_beam;
                self.status(StatusLine::LowBeam)
            }
            Action::ToggleHighBeam => {
                self.high_beam = !self.high_beam;
                self.status(StatusLine::HighBeam)
            }
            Action::ToggleEmergencyLight => {
                self.emergency_light = !self.emergency_light;
                self.status(StatusLine::EmergencyLight)
            }
            Action::SetTurnSignal(signal) => {
                self.turn_signal_mode = signal;
                self.status(StatusLine::TurnSignal)
            }
            Action::EmergencyStop => {
                self.speed = 0.0;
                self.throttle = 0.0;
                self.brake = BRAKE_LIMITS.max;
                self.status(StatusLine::EmergencyStop)
            }
        }
    }

    fn move_longitudinal(&mut self, steps: &StepSizes, sign: f64) -> StatusUpdate {
        self.speed = SPEED_LIMITS.step(self.speed, steps.speed, sign);
        self.throttle = THROTTLE_LIMITS.step(self.throttle, StepSizes::THROTTLE, sign);
        self.status(StatusLine::Motion)
    }

    /// Human-readable rendering of one status line from the current values.
    pub fn status(&self, line: StatusLine) -> StatusUpdate {
        let text = match line {
            StatusLine::Motion => format!(
                "speed: {:.2} [{}, {}], throttle: {:.2} [{}, {}]",
                self.speed,
                SPEED_LIMITS.min,
                SPEED_LIMITS.max,
                self.throttle,
                THROTTLE_LIMITS.min,
                THROTTLE_LIMITS.max
            ),
            StatusLine::Steering => format!(
                "steer: {:.2} [{}, {}]",
                self.steering, STEERING_LIMITS.min, STEERING_LIMITS.max
            ),
            StatusLine::Gear => format!("gear:  {}", self.gear.label()),
            StatusLine::Brake => format!(
                "brake: {:.2} [{}, {}]",
                self.brake, BRAKE_LIMITS.min, BRAKE_LIMITS.max
            ),
            StatusLine::ParkingBrake => format!("epb:   {}", on_off(self.epb_engaged)),
            StatusLine::TurnSignalThreshold => {
                format!("turn signal threshold: {:.2}", self.turn_signal_threshold)
            }
            StatusLine::Horn => format!("Horn:              {}", on_off(self.horn)),
            StatusLine::LowBeam => format!("Low Beam:          {}", on_off(self.low_beam)),
            StatusLine::HighBeam => format!("High Beam:         {}", on_off(self.high_beam)),
            StatusLine::EmergencyLight => {
                format!("Emergency Light:   {}", on_off(self.emergency_light))
            }
            StatusLine::TurnSignal => format!("Turn Signal: {}", self.turn_signal_mode),
            StatusLine::SteeringRate => format!("steering rate: {:.2}", self.steering_rate),
            StatusLine::Engage => format!("Auto-drive: {}", self.autonomy_engaged),
            StatusLine::EmergencyStop => "Emergency Stop activated!".to_string(),
            StatusLine::Banner | StatusLine::Notice | StatusLine::Publish | StatusLine::Help(_) => {
                String::new()
            }
        };
        StatusUpdate { line, text }
    }

    /// Every field line, used to paint the display before the first keystroke.
    pub fn overview(&self) -> Vec<StatusUpdate> {
        StatusLine::FIELDS
            .into_iter()
            .map(|line| self.status(line))
            .collect()
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
