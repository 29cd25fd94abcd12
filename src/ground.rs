use crate::aircraft::{AircraftType, Callsign};
use std::fmt;
use thiserror::Error;

pub const MAX_GATES: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroundError {
    #[error("gate {gate} is already occupied by {occupant}")]
    GateOccupied { gate: u32, occupant: Callsign },
    #[error("terminal {terminal} is at gate capacity")]
    TerminalFull { terminal: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gate {
    pub number: u32,
    occupant: Option<Callsign>,
}

impl Gate {
    pub fn new(number: u32) -> Gate {
        Gate { number, occupant: None }
    }

    pub fn occupant(&self) -> Option<&Callsign> {
        self.occupant.as_ref()
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn park(&mut self, callsign: Callsign) -> Result<(), GroundError> {
        match &self.occupant {
            Some(occupant) => Err(GroundError::GateOccupied {
                gate: self.number,
                occupant: occupant.clone(),
            }),
            None => {
                self.occupant = Some(callsign);
                Ok(())
            }
        }
    }

    pub fn release(&mut self) -> Option<Callsign> {
        self.occupant.take()
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.occupant {
            Some(callsign) => write!(f, "Gate {} [{}]", self.number, callsign),
            None => write!(f, "Gate {} [empty]", self.number),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terminal {
    pub kind: AircraftType,
    pub number: u32,
    emergency: bool,
    gates: Vec<Gate>,
}

impl Terminal {
    pub fn new(kind: AircraftType, number: u32) -> Terminal {
        Terminal { kind, number, emergency: false, gates: Vec::new() }
    }

    pub fn add_gate(&mut self, gate: Gate) -> Result<(), GroundError> {
        if self.gates.len() >= MAX_GATES {
            return Err(GroundError::TerminalFull { terminal: self.number });
        }
        self.gates.push(gate);
        Ok(())
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn gates_mut(&mut self) -> &mut [Gate] {
        &mut self.gates
    }

    // first unoccupied gate in the order gates were added
    pub fn first_free_gate(&self) -> Option<usize> {
        self.gates.iter().position(|gate| !gate.is_occupied())
    }

    pub fn occupancy_percent(&self) -> u32 {
        if self.gates.is_empty() {
            return 0;
        }
        let occupied = self.gates.iter().filter(|gate| gate.is_occupied()).count();
        (occupied as f64 / self.gates.len() as f64 * 100.0).round() as u32
    }

    pub fn has_emergency(&self) -> bool {
        self.emergency
    }

    pub fn declare_emergency(&mut self) {
        self.emergency = true;
    }

    pub fn clear_emergency(&mut self) {
        self.emergency = false;
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} terminal {}, {} gates", self.kind, self.number, self.gates.len())?;
        if self.emergency {
            write!(f, " (EMERGENCY)")?;
        }
        Ok(())
    }
}
