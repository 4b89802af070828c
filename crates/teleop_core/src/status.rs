//! Feedback surface for the operator. The core only produces text; where it
//! ends up is the sink's business.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusLine {
    Banner,
    Notice,
    Motion,
    Steering,
    Gear,
    Brake,
    ParkingBrake,
    TurnSignalThreshold,
    Horn,
    LowBeam,
    HighBeam,
    EmergencyLight,
    TurnSignal,
    SteeringRate,
    Engage,
    EmergencyStop,
    Help(u16),
    Publish,
}

impl StatusLine {
    /// Lines that mirror a `ControlState` field.
    pub const FIELDS: [StatusLine; 13] = [
        Self::Motion,
        Self::Steering,
        Self::Gear,
        Self::Brake,
        Self::ParkingBrake,
        Self::TurnSignalThreshold,
        Self::Horn,
        Self::LowBeam,
        Self::HighBeam,
        Self::EmergencyLight,
        Self::TurnSignal,
        Self::SteeringRate,
        Self::Engage,
    ];

    const HELP_ROW: u16 = 16;

    /// Screen row for a fixed-layout display.
    pub fn row(self) -> u16 {
        match self {
            Self::Banner => 0,
            Self::Notice => 1,
            Self::Motion => 2,
            Self::Steering => 3,
            Self::Gear => 4,
            Self::Brake => 5,
            Self::ParkingBrake => 6,
            Self::TurnSignalThreshold => 7,
            Self::Horn => 8,
            Self::LowBeam => 9,
            Self::HighBeam => 10,
            Self::EmergencyLight => 11,
            Self::TurnSignal => 12,
            Self::SteeringRate => 13,
            Self::Engage => 14,
            Self::EmergencyStop => 15,
            Self::Help(index) => Self::HELP_ROW + index,
            Self::Publish => Self::HELP_ROW + crate::keymap::HELP_LINES.len() as u16,
        }
    }

    /// Rows a fixed-layout display needs to show every line.
    pub fn rows_required() -> u16 {
        Self::Publish.row() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub line: StatusLine,
    pub text: String,
}

impl StatusUpdate {
    pub fn new(line: StatusLine, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

/// Receives status text. Implementations may block on terminal I/O, so
/// callers never invoke them while holding the control-state lock.
pub trait StatusSink: Send + Sync {
    fn show(&self, update: &StatusUpdate);
}
