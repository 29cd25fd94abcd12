use crate::aircraft::{Aircraft, AircraftModel, AircraftType, Callsign, Cargo};
use crate::ground::{Gate, Terminal};
use crate::tasks::{Task, TaskList};
use proptest::prelude::*;
use std::sync::Arc;

pub fn id(s: &str) -> Callsign {
    Arc::from(s)
}

pub fn tasks_from(tasks: Vec<Task>) -> TaskList {
    TaskList::new(tasks).unwrap()
}

pub fn landing_cycle() -> TaskList {
    tasks_from(vec![
        Task::Land,
        Task::Wait,
        Task::Load { percent: 50 },
        Task::Takeoff,
        Task::Away,
    ])
}

pub fn away_cycle() -> TaskList {
    tasks_from(vec![
        Task::Away,
        Task::Land,
        Task::Wait,
        Task::Load { percent: 50 },
        Task::Takeoff,
    ])
}

pub fn takeoff_cycle() -> TaskList {
    tasks_from(vec![Task::Takeoff, Task::Away, Task::Land, Task::Load { percent: 30 }])
}

pub fn loading_cycle(percent: u32) -> TaskList {
    tasks_from(vec![Task::Load { percent }, Task::Takeoff, Task::Away, Task::Land])
}

pub fn waiting_cycle() -> TaskList {
    tasks_from(vec![
        Task::Wait,
        Task::Load { percent: 50 },
        Task::Takeoff,
        Task::Away,
        Task::Land,
    ])
}

pub fn holding_cycle() -> TaskList {
    tasks_from(vec![Task::Wait])
}

pub fn passenger_jet(callsign: &str, tasks: TaskList) -> Aircraft {
    Aircraft::new(id(callsign), AircraftModel::AirbusA320, tasks, 20000.0, Cargo::Passengers(0))
        .unwrap()
}

pub fn freighter(callsign: &str, tasks: TaskList) -> Aircraft {
    Aircraft::new(id(callsign), AircraftModel::Boeing7478F, tasks, 200000.0, Cargo::Freight(0))
        .unwrap()
}

pub fn chopper(callsign: &str, tasks: TaskList) -> Aircraft {
    Aircraft::new(id(callsign), AircraftModel::RobinsonR44, tasks, 150.0, Cargo::Passengers(0))
        .unwrap()
}

pub fn airplane_terminal(number: u32, gates: u32) -> Terminal {
    let mut terminal = Terminal::new(AircraftType::Airplane, number);
    for n in 1..=gates {
        terminal.add_gate(Gate::new(n)).unwrap();
    }
    terminal
}

pub fn helicopter_terminal(number: u32, gates: u32) -> Terminal {
    let mut terminal = Terminal::new(AircraftType::Helicopter, number);
    for n in 1..=gates {
        terminal.add_gate(Gate::new(n)).unwrap();
    }
    terminal
}

pub fn arb_callsign(prefix: &str) -> impl Strategy<Value = Callsign> {
    prop_oneof![
        Just(id(&format!("{prefix}1"))),
        Just(id(&format!("{prefix}2"))),
        Just(id(&format!("{prefix}3"))),
    ]
}

pub fn arb_cycle() -> impl Strategy<Value = TaskList> {
    prop_oneof![
        Just(landing_cycle()),
        Just(away_cycle()),
        Just(takeoff_cycle()),
        Just(loading_cycle(30)),
        Just(waiting_cycle()),
    ]
}

pub fn arb_aircraft(prefix: &str) -> impl Strategy<Value = Aircraft> {
    (arb_callsign(prefix), arb_cycle(), 0.0f64..=27200.0, 0u32..=150, any::<bool>()).prop_map(
        |(callsign, tasks, fuel, passengers, emergency)| {
            let mut aircraft = Aircraft::new(
                callsign,
                AircraftModel::AirbusA320,
                tasks,
                fuel,
                Cargo::Passengers(passengers),
            )
            .unwrap();
            if emergency {
                aircraft.declare_emergency();
            }
            aircraft
        },
    )
}
