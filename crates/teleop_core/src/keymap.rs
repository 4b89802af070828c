//! Keystroke to action table.

use std::collections::HashMap;

use shared::domain::TurnSignal;

use crate::state::Action;

pub const QUIT_KEY: char = 'q';

pub const HELP_LINES: [&str; 8] = [
    "Key instructions:",
    "  E: Toggle auto-drive mode          A/D: Increase/Decrease steering rate",
    "  w/s: Increase/Decrease speed       a/d: Turn left/right",
    "  m: Change gear                     b/B: Brake +/-",
    "  p: Toggle Electronic Parking Brake (EPB)  o/O: Turn signal threshold +/-",
    "  h/l/k/e: Toggle Horn/Low Beam/High Beam/Emergency Light",
    "  [/]/\\/=: Turn Signal Left/Right/Off/Hazard",
    "  Space: Emergency stop              q: Quit program",
];

/// What a single polled symbol means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Quit,
    Action(Action),
    Unmapped,
}

#[derive(Debug, Clone)]
pub struct ActionTable {
    bindings: HashMap<char, Action>,
    quit: char,
}

impl ActionTable {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
            quit: QUIT_KEY,
        }
    }

    /// Binds `key`, replacing any previous binding. The quit key cannot be
    /// rebound to an action.
    pub fn bind(mut self, key: char, action: Action) -> Self {
        if key != self.quit {
            self.bindings.insert(key, action);
        }
        self
    }

    pub fn lookup(&self, key: char) -> KeyInput {
        if key == self.quit {
            return KeyInput::Quit;
        }
        self.bindings
            .get(&key)
            .copied()
            .map_or(KeyInput::Unmapped, KeyInput::Action)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::empty()
            .bind('w', Action::Accelerate)
            .bind('s', Action::Decelerate)
            .bind('a', Action::SteerLeft)
            .bind('d', Action::SteerRight)
            .bind('A', Action::SteeringRateUp)
            .bind('D', Action::SteeringRateDown)
            .bind('m', Action::CycleGear)
            .bind('b', Action::BrakeUp)
            .bind('B', Action::BrakeDown)
            .bind('p', Action::ToggleParkingBrake)
            .bind('o', Action::TurnSignalThresholdUp)
            .bind('O', Action::TurnSignalThresholdDown)
            .bind('E', Action::ToggleEngage)
            .bind(' ', Action::EmergencyStop)
            .bind('h', Action::ToggleHorn)
            .bind('l', Action::ToggleLowBeam)
            .bind('k', Action::ToggleHighBeam)
            .bind('e', Action::ToggleEmergencyLight)
            .bind('[', Action::SetTurnSignal(TurnSignal::Left))
            .bind(']', Action::SetTurnSignal(TurnSignal::Right))
            .bind('\\', Action::SetTurnSignal(TurnSignal::None))
            .bind('=', Action::SetTurnSignal(TurnSignal::Hazard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_every_documented_key() {
        let table = ActionTable::default();
        assert_eq!(table.len(), 22);
        assert_eq!(table.lookup('w'), KeyInput::Action(Action::Accelerate));
        assert_eq!(table.lookup(' '), KeyInput::Action(Action::EmergencyStop));
        assert_eq!(
            table.lookup('='),
            KeyInput::Action(Action::SetTurnSignal(TurnSignal::Hazard))
        );
    }

    #[test]
    fn quit_key_wins_over_bindings() {
        let table = ActionTable::default().bind('q', Action::ToggleHorn);
        assert_eq!(table.lookup('q'), KeyInput::Quit);
    }

    #[test]
    fn unknown_symbols_are_unmapped() {
        let table = ActionTable::default();
        assert_eq!(table.lookup('z'), KeyInput::Unmapped);
        assert_eq!(table.lookup('W'), KeyInput::Unmapped);
    }
}
