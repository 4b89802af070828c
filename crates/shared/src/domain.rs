use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnSignal {
    #[default]
    None,
    Left,
    Right,
    Hazard,
}

impl TurnSignal {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Hazard => "HAZARD",
        }
    }
}

impl fmt::Display for TurnSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Gear positions in the order the operator cycles through them.
///
/// The cycle index (what the keyboard moves through) and the gear code (what
/// the chassis expects on the wire) are deliberately different numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum GearPosition {
    #[default]
    Park,
    Reverse,
    Neutral,
    Drive,
}

impl GearPosition {
    pub const CYCLE: [GearPosition; 4] = [Self::Park, Self::Reverse, Self::Neutral, Self::Drive];

    pub fn from_index(index: usize) -> Self {
        Self::CYCLE[index % Self::CYCLE.len()]
    }

    pub fn index(self) -> usize {
        match self {
            Self::Park => 0,
            Self::Reverse => 1,
            Self::Neutral => 2,
            Self::Drive => 3,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Park => 3,
            Self::Reverse => 2,
            Self::Neutral => 0,
            Self::Drive => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Park => "P",
            Self::Reverse => "R",
            Self::Neutral => "N",
            Self::Drive => "D",
        }
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

impl From<GearPosition> for i32 {
    fn from(value: GearPosition) -> Self {
        value.code()
    }
}

impl TryFrom<i32> for GearPosition {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::CYCLE
            .into_iter()
            .find(|gear| gear.code() == code)
            .ok_or_else(|| format!("unknown gear code {code}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrivingMode {
    Manual,
    AutoDrive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrivingAction {
    Stop,
    Start,
}
