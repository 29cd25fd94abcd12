use crate::aircraft::{Aircraft, AircraftError, Callsign, Fleet};
use crate::ground::{GroundError, Terminal};
use crate::queues::{AircraftQueue, LandingQueue, TakeoffQueue};
use crate::tasks::Task;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TowerError {
    #[error("no suitable gate available for {0}")]
    NoSuitableGate(Callsign),
    #[error(transparent)]
    Aircraft(#[from] AircraftError),
    #[error(transparent)]
    Ground(#[from] GroundError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GateRef {
    terminal: usize,
    gate: usize,
}

#[derive(Debug, Default)]
pub struct ControlTower {
    base_ticks: u64,
    ticks_called: u64,
    fleet: Fleet,
    landing: LandingQueue,
    takeoff: TakeoffQueue,
    loading: BTreeMap<Callsign, u32>,
    terminals: Vec<Terminal>,
}

impl ControlTower {
    pub fn new() -> ControlTower {
        ControlTower::default()
    }

    pub fn restore(
        base_ticks: u64,
        fleet: Fleet,
        landing: LandingQueue,
        takeoff: TakeoffQueue,
        loading: BTreeMap<Callsign, u32>,
    ) -> ControlTower {
        ControlTower { base_ticks, fleet, landing, takeoff, loading, ..ControlTower::new() }
    }

    pub fn add_terminal(&mut self, terminal: Terminal) {
        self.terminals.push(terminal);
    }

    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    pub fn terminal_mut(&mut self, number: u32) -> Option<&mut Terminal> {
        self.terminals.iter_mut().find(|t| t.number == number)
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn aircraft_mut(&mut self, callsign: &str) -> Option<&mut Aircraft> {
        self.fleet.get_mut(callsign)
    }

    pub fn landing_queue(&self) -> &LandingQueue {
        &self.landing
    }

    pub fn takeoff_queue(&self) -> &TakeoffQueue {
        &self.takeoff
    }

    pub fn loading(&self) -> &BTreeMap<Callsign, u32> {
        &self.loading
    }

    pub fn ticks_elapsed(&self) -> u64 {
        self.base_ticks + self.ticks_called
    }

    pub fn add_aircraft(&mut self, aircraft: Aircraft) -> Result<(), TowerError> {
        let callsign = aircraft.callsign.clone();
        let needs_gate = matches!(aircraft.current_task(), Task::Wait | Task::Load { .. });
        self.fleet.add(aircraft)?;
        if needs_gate {
            // the aircraft keeps its roster slot even when no gate turns up
            let gate = self
                .fleet
                .get(&callsign)
                .and_then(|a| self.find_gate_for(a))
                .ok_or_else(|| TowerError::NoSuitableGate(callsign.clone()))?;
            self.park_at(gate, callsign.clone())?;
        }
        self.place_in_queues(&callsign);
        self.assert_invariants();
        Ok(())
    }

    pub fn gate_of(&self, callsign: &str) -> Option<(u32, u32)> {
        self.terminals.iter().find_map(|terminal| {
            terminal
                .gates()
                .iter()
                .find(|gate| gate.occupant().is_some_and(|c| c.as_ref() == callsign))
                .map(|gate| (terminal.number, gate.number))
        })
    }

    pub fn tick(&mut self) {
        self.ticks_called += 1;
        // free-running phases move on their own
        for aircraft in self.fleet.iter_mut() {
            aircraft.tick();
            if matches!(aircraft.current_task(), Task::Wait | Task::Away) {
                aircraft.tasks.advance();
            }
        }
        self.update_loading();
        // even ticks favour arrivals, odd ticks departures
        if self.ticks_called % 2 == 0 {
            if !self.try_land() {
                self.try_takeoff();
            }
        } else {
            self.try_takeoff();
        }
        self.place_all_in_queues();
        self.assert_invariants();
    }

    // terminals in insertion order, skipping wrong kinds and emergencies
    fn find_gate_for(&self, aircraft: &Aircraft) -> Option<GateRef> {
        let kind = aircraft.model.kind();
        self.terminals.iter().enumerate().find_map(|(t, terminal)| {
            if terminal.kind != kind || terminal.has_emergency() {
                return None;
            }
            terminal.first_free_gate().map(|g| GateRef { terminal: t, gate: g })
        })
    }

    fn park_at(&mut self, gate: GateRef, callsign: Callsign) -> Result<(), GroundError> {
        self.terminals[gate.terminal].gates_mut()[gate.gate].park(callsign)
    }

    fn release_gate_of(&mut self, callsign: &str) {
        for terminal in &mut self.terminals {
            for gate in terminal.gates_mut() {
                if gate.occupant().is_some_and(|c| c.as_ref() == callsign) {
                    gate.release();
                    return;
                }
            }
        }
    }

    fn update_loading(&mut self) {
        let mut still_loading = BTreeMap::new();
        let mut finished: Vec<Callsign> = Vec::new();
        for (callsign, ticks_left) in &self.loading {
            if *ticks_left > 1 {
                still_loading.insert(callsign.clone(), ticks_left - 1);
            } else {
                finished.push(callsign.clone());
            }
        }
        self.loading = still_loading;
        for callsign in finished {
            self.release_gate_of(&callsign);
            if let Some(aircraft) = self.fleet.get_mut(&callsign) {
                aircraft.tasks.advance();
            }
        }
    }

    fn try_land(&mut self) -> bool {
        let Some(callsign) = self.landing.peek(&self.fleet) else {
            return false;
        };
        let Some(gate) = self.fleet.get(&callsign).and_then(|a| self.find_gate_for(a)) else {
            return false;
        };
        if self.park_at(gate, callsign.clone()).is_err() {
            return false;
        }
        self.landing.pop(&self.fleet);
        if let Some(aircraft) = self.fleet.get_mut(&callsign) {
            aircraft.unload();
            aircraft.tasks.advance();
        }
        true
    }

    fn try_takeoff(&mut self) -> bool {
        let Some(callsign) = self.takeoff.peek(&self.fleet) else {
            return false;
        };
        if let Some(aircraft) = self.fleet.get_mut(&callsign) {
            aircraft.tasks.advance();
        }
        self.takeoff.pop(&self.fleet);
        true
    }

    fn place_all_in_queues(&mut self) {
        let callsigns: Vec<Callsign> = self.fleet.iter().map(|a| a.callsign.clone()).collect();
        for callsign in callsigns {
            self.place_in_queues(&callsign);
        }
    }

    // idempotent filing keyed on the current task
    fn place_in_queues(&mut self, callsign: &Callsign) {
        let Some(aircraft) = self.fleet.get(callsign) else {
            return;
        };
        let task = aircraft.current_task();
        let loading_time = aircraft.loading_time();
        match task {
            Task::Land if !self.landing.contains(callsign) => {
                self.landing.push(callsign.clone());
            }
            Task::Takeoff if !self.takeoff.contains(callsign) => {
                self.takeoff.push(callsign.clone());
            }
            Task::Load { .. } if !self.loading.contains_key(callsign) => {
                self.loading.insert(callsign.clone(), loading_time);
            }
            _ => {}
        }
    }

    // sweeps the shared bookkeeping, compiled away outside debug builds
    fn assert_invariants(&self) {
        debug_assert!(
            self.fleet.iter().all(|aircraft| {
                let callsign: &str = &aircraft.callsign;
                let filings = usize::from(self.landing.contains(callsign))
                    + usize::from(self.takeoff.contains(callsign))
                    + usize::from(self.loading.contains_key(callsign));
                let filed_right = match aircraft.current_task() {
                    Task::Land => self.landing.contains(callsign),
                    Task::Takeoff => self.takeoff.contains(callsign),
                    // a refused admission leaves a LOAD aircraft unfiled until the next tick
                    Task::Load { .. } => true,
                    Task::Wait | Task::Away => filings == 0,
                };
                filings <= 1 && filed_right
            }),
            "Task <-> collection invariant violated"
        );

        debug_assert!(
            self.landing.in_order(&self.fleet).iter().all(|callsign| {
                matches!(self.fleet.get(callsign).map(|a| a.current_task()), Some(Task::Land))
            }),
            "LandingQueue holds an aircraft without a LAND task"
        );

        debug_assert!(
            self.takeoff.in_order(&self.fleet).iter().all(|callsign| {
                matches!(self.fleet.get(callsign).map(|a| a.current_task()), Some(Task::Takeoff))
            }),
            "TakeoffQueue holds an aircraft without a TAKEOFF task"
        );

        debug_assert!(
            self.loading.iter().all(|(callsign, ticks_left)| {
                *ticks_left >= 1
                    && matches!(
                        self.fleet.get(callsign).map(|a| a.current_task()),
                        Some(Task::Load { .. })
                    )
            }),
            "Loading map <-> LOAD task invariant violated"
        );

        debug_assert!(
            {
                let mut occupants: Vec<&Callsign> = self
                    .terminals
                    .iter()
                    .flat_map(|t| t.gates().iter().filter_map(|g| g.occupant()))
                    .collect();
                let parked = occupants.len();
                let known = occupants.iter().all(|c| self.fleet.contains(c.as_ref()));
                occupants.sort_unstable();
                occupants.dedup();
                known && parked == occupants.len()
            },
            "Gate occupants out of sync with the roster"
        );
    }
}

impl fmt::Display for ControlTower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // counts what is filed, not what the roster intends
        write!(
            f,
            "ControlTower: {} terminals, {} total aircraft ({} LAND, {} TAKEOFF, {} LOAD)",
            self.terminals.len(),
            self.fleet.len(),
            self.landing.len(),
            self.takeoff.len(),
            self.loading.len()
        )
    }
}
