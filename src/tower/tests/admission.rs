use crate::aircraft::AircraftError;
use crate::queues::AircraftQueue;
use crate::tasks::Task;
use crate::tower::tests::utils::*;
use crate::tower::tower::{ControlTower, TowerError};

fn tower_with_terminals() -> ControlTower {
    let mut tower = ControlTower::new();
    tower.add_terminal(airplane_terminal(1, 2));
    tower.add_terminal(helicopter_terminal(2, 1));
    tower
}

#[test]
fn test_away_admission_files_nothing() {
    let mut tower = tower_with_terminals();
    tower.add_aircraft(passenger_jet("QFA481", away_cycle())).unwrap();
    assert!(tower.fleet().contains("QFA481"));
    assert!(tower.landing_queue().is_empty());
    assert!(tower.takeoff_queue().is_empty());
    assert!(tower.loading().is_empty());
    assert_eq!(None, tower.gate_of("QFA481"));
}

#[test]
fn test_landing_admission_joins_landing_queue() {
    let mut tower = tower_with_terminals();
    tower.add_aircraft(passenger_jet("QFA481", landing_cycle())).unwrap();
    assert!(tower.landing_queue().contains("QFA481"));
    assert_eq!(1, tower.landing_queue().len());
    assert_eq!(None, tower.gate_of("QFA481"));
}

#[test]
fn test_takeoff_admission_joins_takeoff_queue() {
    let mut tower = tower_with_terminals();
    tower.add_aircraft(passenger_jet("QFA481", takeoff_cycle())).unwrap();
    assert!(tower.takeoff_queue().contains("QFA481"));
    assert!(tower.landing_queue().is_empty());
    assert_eq!(None, tower.gate_of("QFA481"));
}

#[test]
fn test_waiting_admission_parks_at_a_gate() {
    let mut tower = tower_with_terminals();
    tower.add_aircraft(passenger_jet("QFA481", waiting_cycle())).unwrap();
    assert_eq!(Some((1, 1)), tower.gate_of("QFA481"));
    assert!(tower.landing_queue().is_empty());
    assert!(tower.takeoff_queue().is_empty());
    assert!(tower.loading().is_empty());
}

#[test]
fn test_loading_admission_parks_and_opens_loading_slot() {
    let mut tower = tower_with_terminals();
    tower.add_aircraft(passenger_jet("QFA481", loading_cycle(60))).unwrap();
    assert_eq!(Some((1, 1)), tower.gate_of("QFA481"));
    // 90 passengers to board, two ticks at the gate
    assert_eq!(Some(&2), tower.loading().get("QFA481"));
}

#[test]
fn test_duplicate_callsign_is_rejected() {
    let mut tower = tower_with_terminals();
    tower.add_aircraft(passenger_jet("QFA481", away_cycle())).unwrap();
    assert_eq!(
        Err(TowerError::Aircraft(AircraftError::DuplicateCallsign(id("QFA481")))),
        tower.add_aircraft(passenger_jet("QFA481", landing_cycle()))
    );
    assert_eq!(1, tower.fleet().len());
}

#[test]
fn test_refused_admission_keeps_the_aircraft_in_service() {
    let mut tower = ControlTower::new();
    assert_eq!(
        Err(TowerError::NoSuitableGate(id("QFA481"))),
        tower.add_aircraft(passenger_jet("QFA481", waiting_cycle()))
    );
    assert!(tower.fleet().contains("QFA481"));
    assert!(tower.loading().is_empty());
    // the next tick moves it off WAIT and files it as usual
    tower.tick();
    assert!(matches!(
        tower.fleet().get("QFA481").map(|a| a.current_task()),
        Some(Task::Load { percent: 50 })
    ));
    assert_eq!(Some(&1), tower.loading().get("QFA481"));
}

#[test]
fn test_gate_allocation_respects_terminal_kind() {
    let mut tower = tower_with_terminals();
    tower.add_aircraft(chopper("LAV001", holding_cycle())).unwrap();
    assert_eq!(Some((2, 1)), tower.gate_of("LAV001"));
    // airplane gates stay off limits to helicopters
    assert_eq!(
        Err(TowerError::NoSuitableGate(id("LAV002"))),
        tower.add_aircraft(chopper("LAV002", holding_cycle()))
    );
}
