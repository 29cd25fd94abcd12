use crate::aircraft::{Aircraft, AircraftError, AircraftModel, AircraftType, Callsign, Cargo, Fleet};
use crate::ground::{Gate, GroundError, Terminal};
use crate::queues::{AircraftQueue, LandingQueue, TakeoffQueue};
use crate::tasks::{Task, TaskList, TaskListError};
use crate::tower::tower::ControlTower;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scenario: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Tasks(#[from] TaskListError),
    #[error(transparent)]
    Aircraft(#[from] AircraftError),
    #[error(transparent)]
    Ground(#[from] GroundError),
    #[error("{collection} lists unknown callsign {callsign}")]
    UnknownCallsign { collection: &'static str, callsign: String },
    #[error("{callsign} sits in the {collection} but its current task is {task}")]
    Misfiled { callsign: String, collection: &'static str, task: String },
    #[error("{0} appears twice in the same queue")]
    DuplicateEntry(String),
    #[error("{0} has no loading ticks left")]
    SpentLoadingSlot(String),
    #[error("{0} is parked at more than one gate")]
    DoubleParked(String),
    #[error("{0} numbering starts at 1")]
    BadNumber(&'static str),
}

#[derive(Serialize, Deserialize)]
struct ScenarioDoc {
    ticks_elapsed: u64,
    aircraft: Vec<AircraftDoc>,
    landing_queue: Vec<Callsign>,
    takeoff_queue: Vec<Callsign>,
    loading_map: BTreeMap<Callsign, u32>,
    terminals: Vec<TerminalDoc>,
}

#[derive(Serialize, Deserialize)]
struct AircraftDoc {
    callsign: Callsign,
    model: AircraftModel,
    tasks: Vec<Task>,
    fuel: f64,
    cargo: Cargo,
    #[serde(default)]
    emergency: bool,
}

#[derive(Serialize, Deserialize)]
struct TerminalDoc {
    kind: AircraftType,
    number: u32,
    #[serde(default)]
    emergency: bool,
    gates: Vec<GateDoc>,
}

#[derive(Serialize, Deserialize)]
struct GateDoc {
    number: u32,
    occupant: Option<Callsign>,
}

pub fn load_from_file(path: &Path) -> Result<ControlTower, ScenarioError> {
    let text = fs::read_to_string(path)?;
    load_from_str(&text)
}

pub fn save_to_file(tower: &ControlTower, path: &Path) -> Result<(), ScenarioError> {
    let text = serde_json::to_string_pretty(&snapshot(tower))?;
    fs::write(path, text)?;
    Ok(())
}

fn load_from_str(text: &str) -> Result<ControlTower, ScenarioError> {
    build(serde_json::from_str(text)?)
}

fn build(doc: ScenarioDoc) -> Result<ControlTower, ScenarioError> {
    let mut fleet = Fleet::new();
    for entry in doc.aircraft {
        let tasks = TaskList::new(entry.tasks)?;
        let mut aircraft =
            Aircraft::new(entry.callsign, entry.model, tasks, entry.fuel, entry.cargo)?;
        if entry.emergency {
            aircraft.declare_emergency();
        }
        fleet.add(aircraft)?;
    }

    let mut landing = LandingQueue::new();
    for callsign in &doc.landing_queue {
        check_filed(&fleet, callsign, "landing queue", |task| matches!(task, Task::Land))?;
        if landing.contains(callsign) {
            return Err(ScenarioError::DuplicateEntry(callsign.to_string()));
        }
        landing.push(callsign.clone());
    }

    let mut takeoff = TakeoffQueue::new();
    for callsign in &doc.takeoff_queue {
        check_filed(&fleet, callsign, "takeoff queue", |task| matches!(task, Task::Takeoff))?;
        if takeoff.contains(callsign) {
            return Err(ScenarioError::DuplicateEntry(callsign.to_string()));
        }
        takeoff.push(callsign.clone());
    }

    let mut loading: BTreeMap<Callsign, u32> = BTreeMap::new();
    for (callsign, ticks_left) in &doc.loading_map {
        check_filed(&fleet, callsign, "loading map", |task| matches!(task, Task::Load { .. }))?;
        if *ticks_left == 0 {
            return Err(ScenarioError::SpentLoadingSlot(callsign.to_string()));
        }
        loading.insert(callsign.clone(), *ticks_left);
    }

    let mut tower = ControlTower::restore(doc.ticks_elapsed, fleet, landing, takeoff, loading);
    let mut parked: HashSet<Callsign> = HashSet::new();
    for terminal_doc in doc.terminals {
        if terminal_doc.number == 0 {
            return Err(ScenarioError::BadNumber("terminal"));
        }
        let mut terminal = Terminal::new(terminal_doc.kind, terminal_doc.number);
        if terminal_doc.emergency {
            terminal.declare_emergency();
        }
        for gate_doc in terminal_doc.gates {
            if gate_doc.number == 0 {
                return Err(ScenarioError::BadNumber("gate"));
            }
            let mut gate = Gate::new(gate_doc.number);
            if let Some(occupant) = gate_doc.occupant {
                if !tower.fleet().contains(&occupant) {
                    return Err(ScenarioError::UnknownCallsign {
                        collection: "gates",
                        callsign: occupant.to_string(),
                    });
                }
                if !parked.insert(occupant.clone()) {
                    return Err(ScenarioError::DoubleParked(occupant.to_string()));
                }
                gate.park(occupant)?;
            }
            terminal.add_gate(gate)?;
        }
        tower.add_terminal(terminal);
    }
    Ok(tower)
}

fn check_filed(
    fleet: &Fleet,
    callsign: &str,
    collection: &'static str,
    matches_task: impl Fn(Task) -> bool,
) -> Result<(), ScenarioError> {
    let aircraft = fleet.get(callsign).ok_or_else(|| ScenarioError::UnknownCallsign {
        collection,
        callsign: callsign.to_string(),
    })?;
    let task = aircraft.current_task();
    if !matches_task(task) {
        return Err(ScenarioError::Misfiled {
            callsign: callsign.to_string(),
            collection,
            task: task.to_string(),
        });
    }
    Ok(())
}

fn snapshot(tower: &ControlTower) -> ScenarioDoc {
    let aircraft = tower
        .fleet()
        .iter()
        .map(|a| AircraftDoc {
            callsign: a.callsign.clone(),
            model: a.model,
            tasks: a.tasks.from_current(),
            fuel: a.fuel(),
            cargo: a.cargo(),
            emergency: a.has_emergency(),
        })
        .collect();
    let terminals = tower
        .terminals()
        .iter()
        .map(|terminal| TerminalDoc {
            kind: terminal.kind,
            number: terminal.number,
            emergency: terminal.has_emergency(),
            gates: terminal
                .gates()
                .iter()
                .map(|gate| GateDoc { number: gate.number, occupant: gate.occupant().cloned() })
                .collect(),
        })
        .collect();
    ScenarioDoc {
        ticks_elapsed: tower.ticks_elapsed(),
        aircraft,
        // queues are written the way they would clear, landing most urgent first
        landing_queue: tower.landing_queue().in_order(tower.fleet()),
        takeoff_queue: tower.takeoff_queue().in_order(tower.fleet()),
        loading_map: tower.loading().clone(),
        terminals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> String {
        r#"{
            "ticks_elapsed": 7,
            "aircraft": [
                {
                    "callsign": "QFA481",
                    "model": "AIRBUS_A320",
                    "tasks": [
                        {"type": "LAND"},
                        {"type": "WAIT"},
                        {"type": "LOAD", "percent": 50},
                        {"type": "TAKEOFF"},
                        {"type": "AWAY"}
                    ],
                    "fuel": 20000.0,
                    "cargo": {"passengers": 30}
                },
                {
                    "callsign": "UTD302",
                    "model": "BOEING_787",
                    "tasks": [
                        {"type": "WAIT"},
                        {"type": "LOAD", "percent": 100},
                        {"type": "TAKEOFF"},
                        {"type": "AWAY"},
                        {"type": "LAND"}
                    ],
                    "fuel": 100000.0,
                    "cargo": {"passengers": 0}
                }
            ],
            "landing_queue": ["QFA481"],
            "takeoff_queue": [],
            "loading_map": {},
            "terminals": [
                {
                    "kind": "AIRPLANE",
                    "number": 1,
                    "gates": [
                        {"number": 1, "occupant": "UTD302"},
                        {"number": 2, "occupant": null}
                    ]
                }
            ]
        }"#
        .to_string()
    }

    #[test]
    fn test_load_restores_the_full_picture() {
        let tower = load_from_str(&sample()).unwrap();
        assert_eq!(7, tower.ticks_elapsed());
        assert_eq!(2, tower.fleet().len());
        assert!(tower.landing_queue().contains("QFA481"));
        assert_eq!(Some((1, 1)), tower.gate_of("UTD302"));
        assert_eq!(None, tower.gate_of("QFA481"));
        let qfa = tower.fleet().get("QFA481").unwrap();
        assert_eq!(Task::Land, qfa.current_task());
        assert_eq!(Cargo::Passengers(30), qfa.cargo());
        assert_eq!(1, tower.terminals().len());
    }

    #[test]
    fn test_unknown_callsign_in_queue_is_rejected() {
        let text =
            sample().replace("\"landing_queue\": [\"QFA481\"]", "\"landing_queue\": [\"NOSUCH\"]");
        assert!(matches!(
            load_from_str(&text),
            Err(ScenarioError::UnknownCallsign { collection: "landing queue", .. })
        ));
    }

    #[test]
    fn test_misfiled_aircraft_is_rejected() {
        let text = sample().replace("\"takeoff_queue\": []", "\"takeoff_queue\": [\"UTD302\"]");
        assert!(matches!(
            load_from_str(&text),
            Err(ScenarioError::Misfiled { collection: "takeoff queue", .. })
        ));
    }

    #[test]
    fn test_spent_loading_slot_is_rejected() {
        let text = r#"{
            "ticks_elapsed": 0,
            "aircraft": [
                {
                    "callsign": "VH-BFK",
                    "model": "BOEING_747_8F",
                    "tasks": [
                        {"type": "LOAD", "percent": 30},
                        {"type": "TAKEOFF"},
                        {"type": "AWAY"},
                        {"type": "LAND"}
                    ],
                    "fuel": 200000.0,
                    "cargo": {"freight": 0}
                }
            ],
            "landing_queue": [],
            "takeoff_queue": [],
            "loading_map": {"VH-BFK": 0},
            "terminals": []
        }"#;
        assert!(matches!(load_from_str(text), Err(ScenarioError::SpentLoadingSlot(_))));
    }

    #[test]
    fn test_double_parked_occupant_is_rejected() {
        let text = sample().replace(
            "{\"number\": 2, \"occupant\": null}",
            "{\"number\": 2, \"occupant\": \"UTD302\"}",
        );
        assert!(matches!(load_from_str(&text), Err(ScenarioError::DoubleParked(_))));
    }

    #[test]
    fn test_round_trip_preserves_state() {
        let mut tower = load_from_str(&sample()).unwrap();
        tower.tick();
        let text = serde_json::to_string(&snapshot(&tower)).unwrap();
        let revived = load_from_str(&text).unwrap();
        assert_eq!(tower.ticks_elapsed(), revived.ticks_elapsed());
        assert_eq!(tower.fleet().len(), revived.fleet().len());
        assert_eq!(
            tower.landing_queue().in_order(tower.fleet()),
            revived.landing_queue().in_order(revived.fleet())
        );
        assert_eq!(tower.loading(), revived.loading());
        assert_eq!(tower.gate_of("UTD302"), revived.gate_of("UTD302"));
        for aircraft in tower.fleet().iter() {
            let twin = revived.fleet().get(&aircraft.callsign).unwrap();
            assert_eq!(aircraft.current_task(), twin.current_task());
            assert_eq!(aircraft.fuel(), twin.fuel());
            assert_eq!(aircraft.cargo(), twin.cargo());
        }
    }
}
