use super::*;
use chrono::TimeZone;
use shared::domain::{DrivingAction, DrivingMode, GearPosition};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
}

fn state_with(mode: TurnSignal, threshold: f64, steering: f64) -> ControlState {
    ControlState {
        turn_signal_mode: mode,
        turn_signal_threshold: threshold,
        steering,
        ..ControlState::default()
    }
}

#[test]
fn manual_selection_overrides_inference() {
    let state = state_with(TurnSignal::Left, 5.0, -50.0);
    assert_eq!(arbitrate_turn_signal(&state), Some(TurnSignal::Left));

    let state = state_with(TurnSignal::Hazard, 5.0, 50.0);
    assert_eq!(arbitrate_turn_signal(&state), Some(TurnSignal::Hazard));
}

#[test]
fn zero_threshold_without_selection_omits_the_signal() {
    let state = state_with(TurnSignal::None, 0.0, 80.0);
    assert_eq!(arbitrate_turn_signal(&state), None);

    let command = CommandComposer::default().compose(&mut state.clone(), at(0));
    assert_eq!(command.signal.turn_signal, None);
}

#[test]
fn positive_threshold_infers_from_steering() {
    assert_eq!(
        arbitrate_turn_signal(&state_with(TurnSignal::None, 5.0, 6.0)),
        Some(TurnSignal::Left)
    );
    assert_eq!(
        arbitrate_turn_signal(&state_with(TurnSignal::None, 5.0, -6.0)),
        Some(TurnSignal::Right)
    );
}

#[test]
fn steering_inside_threshold_sets_none_explicitly() {
    assert_eq!(
        arbitrate_turn_signal(&state_with(TurnSignal::None, 5.0, 5.0)),
        Some(TurnSignal::None)
    );
    assert_eq!(
        arbitrate_turn_signal(&state_with(TurnSignal::None, 5.0, -5.0)),
        Some(TurnSignal::None)
    );
    assert_eq!(
        arbitrate_turn_signal(&state_with(TurnSignal::None, 5.0, 0.0)),
        Some(TurnSignal::None)
    );
}

#[test]
fn engage_flag_maps_to_pad_pair() {
    let mut state = ControlState::default();
    let engaged = pad_for(&state);
    assert_eq!(engaged.driving_mode, DrivingMode::AutoDrive);
    assert_eq!(engaged.action, DrivingAction::Start);

    state.autonomy_engaged = false;
    let disengaged = pad_for(&state);
    assert_eq!(disengaged.driving_mode, DrivingMode::Manual);
    assert_eq!(disengaged.action, DrivingAction::Stop);
}

#[test]
fn every_composition_advances_the_sequence_by_one() {
    let composer = CommandComposer::default();
    let mut state = ControlState::default();

    let sequence: Vec<u64> = (0..5)
        .map(|_| composer.compose(&mut state, at(10)).header.sequence_num)
        .collect();

    assert_eq!(sequence, vec![1, 2, 3, 4, 5]);
    assert_eq!(state.sequence_num, 5);
}

#[test]
fn composed_command_mirrors_state() {
    let composer = CommandComposer::new("teleop_test");
    let mut state = ControlState {
        speed: 1.5,
        throttle: 30.0,
        steering: -12.0,
        steering_rate: 0.3,
        brake: 4.0,
        gear: GearPosition::Drive,
        epb_engaged: true,
        horn: true,
        low_beam: true,
        ..ControlState::default()
    };

    let command = composer.compose(&mut state, at(1_700_000_000));

    assert_eq!(command.header.module_name, "teleop_test");
    assert_eq!(command.header.timestamp_sec, 1_700_000_000.0);
    assert_eq!(command.speed, 1.5);
    assert_eq!(command.throttle, 30.0);
    assert_eq!(command.steering_target, -12.0);
    assert_eq!(command.steering_rate, 0.3);
    assert_eq!(command.brake, 4.0);
    assert_eq!(command.gear_location.code(), 1);
    assert!(command.parking_brake);
    assert!(command.signal.horn);
    assert!(command.signal.low_beam);
    assert!(!command.signal.high_beam);
    assert!(!command.signal.emergency_light);
}

#[test]
fn composition_does_not_cache_the_turn_signal() {
    let composer = CommandComposer::default();
    let mut state = state_with(TurnSignal::None, 5.0, 20.0);
    assert_eq!(
        composer.compose(&mut state, at(0)).signal.turn_signal,
        Some(TurnSignal::Left)
    );

    state.steering = 0.0;
    assert_eq!(
        composer.compose(&mut state, at(0)).signal.turn_signal,
        Some(TurnSignal::None)
    );

    state.turn_signal_threshold = 0.0;
    assert_eq!(composer.compose(&mut state, at(0)).signal.turn_signal, None);
}
