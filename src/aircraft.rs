use crate::tasks::{Task, TaskList};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub type Callsign = Arc<str>;

// kilograms per litre of aviation fuel
pub const LITRE_OF_FUEL_WEIGHT: f64 = 0.8;
// average passenger weight including baggage, in kilograms
pub const AVG_PASSENGER_WEIGHT: f64 = 90.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AircraftType {
    Airplane,
    Helicopter,
}

impl fmt::Display for AircraftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AircraftType::Airplane => write!(f, "AIRPLANE"),
            AircraftType::Helicopter => write!(f, "HELICOPTER"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AircraftModel {
    #[serde(rename = "AIRBUS_A320")]
    AirbusA320,
    #[serde(rename = "BOEING_787")]
    Boeing787,
    #[serde(rename = "FOKKER_100")]
    Fokker100,
    #[serde(rename = "BOEING_747_8F")]
    Boeing7478F,
    #[serde(rename = "ROBINSON_R44")]
    RobinsonR44,
    #[serde(rename = "SIKORSKY_SKYCRANE")]
    SikorskySkycrane,
}

struct Characteristics {
    kind: AircraftType,
    empty_weight: f64,
    fuel_capacity: f64,
    passengers: u32,
    freight: u32,
}

impl AircraftModel {
    fn characteristics(self) -> Characteristics {
        use AircraftType::{Airplane, Helicopter};
        let (kind, empty_weight, fuel_capacity, passengers, freight) = match self {
            AircraftModel::AirbusA320 => (Airplane, 42600.0, 27200.0, 150, 0),
            AircraftModel::Boeing787 => (Airplane, 119950.0, 126206.0, 242, 0),
            AircraftModel::Fokker100 => (Airplane, 24375.0, 13365.0, 97, 0),
            AircraftModel::Boeing7478F => (Airplane, 197131.0, 226117.0, 0, 137756),
            AircraftModel::RobinsonR44 => (Helicopter, 658.0, 190.0, 4, 0),
            AircraftModel::SikorskySkycrane => (Helicopter, 8724.0, 3328.0, 0, 9100),
        };
        Characteristics { kind, empty_weight, fuel_capacity, passengers, freight }
    }

    pub fn kind(self) -> AircraftType {
        self.characteristics().kind
    }

    pub fn empty_weight(self) -> f64 {
        self.characteristics().empty_weight
    }

    pub fn fuel_capacity(self) -> f64 {
        self.characteristics().fuel_capacity
    }

    pub fn passenger_capacity(self) -> u32 {
        self.characteristics().passengers
    }

    pub fn freight_capacity(self) -> u32 {
        self.characteristics().freight
    }

    pub fn is_passenger_model(self) -> bool {
        self.passenger_capacity() > 0
    }

    pub fn name(self) -> &'static str {
        match self {
            AircraftModel::AirbusA320 => "AIRBUS_A320",
            AircraftModel::Boeing787 => "BOEING_787",
            AircraftModel::Fokker100 => "FOKKER_100",
            AircraftModel::Boeing7478F => "BOEING_747_8F",
            AircraftModel::RobinsonR44 => "ROBINSON_R44",
            AircraftModel::SikorskySkycrane => "SIKORSKY_SKYCRANE",
        }
    }
}

impl fmt::Display for AircraftModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AircraftModel {
    type Err = AircraftError;

    fn from_str(s: &str) -> Result<AircraftModel, AircraftError> {
        match s {
            "AIRBUS_A320" => Ok(AircraftModel::AirbusA320),
            "BOEING_787" => Ok(AircraftModel::Boeing787),
            "FOKKER_100" => Ok(AircraftModel::Fokker100),
            "BOEING_747_8F" => Ok(AircraftModel::Boeing7478F),
            "ROBINSON_R44" => Ok(AircraftModel::RobinsonR44),
            "SIKORSKY_SKYCRANE" => Ok(AircraftModel::SikorskySkycrane),
            _ => Err(AircraftError::UnknownModel(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cargo {
    Passengers(u32),
    Freight(u32),
}

impl Cargo {
    pub fn amount(self) -> u32 {
        match self {
            Cargo::Passengers(n) | Cargo::Freight(n) => n,
        }
    }
}

impl fmt::Display for Cargo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cargo::Passengers(n) => write!(f, "{} pax", n),
            Cargo::Freight(kg) => write!(f, "{} kg", kg),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AircraftError {
    #[error("fuel amount {fuel} is outside 0..={capacity} for {model}")]
    FuelOutOfRange { model: AircraftModel, fuel: f64, capacity: f64 },
    #[error("{model} does not carry {cargo}")]
    MismatchedCargo { model: AircraftModel, cargo: Cargo },
    #[error("{model} cannot carry {amount} (capacity {capacity})")]
    OverCapacity { model: AircraftModel, amount: u32, capacity: u32 },
    #[error("callsign {0} is already in service")]
    DuplicateCallsign(Callsign),
    #[error("unknown aircraft model {0}")]
    UnknownModel(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Aircraft {
    pub callsign: Callsign,
    pub model: AircraftModel,
    pub tasks: TaskList,
    fuel: f64,
    emergency: bool,
    cargo: Cargo,
}

impl Aircraft {
    pub fn new(
        callsign: Callsign,
        model: AircraftModel,
        tasks: TaskList,
        fuel: f64,
        cargo: Cargo,
    ) -> Result<Aircraft, AircraftError> {
        let capacity = model.fuel_capacity();
        if !(0.0..=capacity).contains(&fuel) {
            return Err(AircraftError::FuelOutOfRange { model, fuel, capacity });
        }
        if matches!(cargo, Cargo::Passengers(_)) != model.is_passenger_model() {
            return Err(AircraftError::MismatchedCargo { model, cargo });
        }
        let limit = match cargo {
            Cargo::Passengers(_) => model.passenger_capacity(),
            Cargo::Freight(_) => model.freight_capacity(),
        };
        if cargo.amount() > limit {
            return Err(AircraftError::OverCapacity {
                model,
                amount: cargo.amount(),
                capacity: limit,
            });
        }
        Ok(Aircraft { callsign, model, tasks, fuel, emergency: false, cargo })
    }

    pub fn current_task(&self) -> Task {
        self.tasks.current_task()
    }

    pub fn fuel(&self) -> f64 {
        self.fuel
    }

    pub fn fuel_percent(&self) -> u32 {
        (self.fuel / self.model.fuel_capacity() * 100.0).round() as u32
    }

    pub fn cargo(&self) -> Cargo {
        self.cargo
    }

    pub fn is_passenger(&self) -> bool {
        matches!(self.cargo, Cargo::Passengers(_))
    }

    pub fn occupancy_percent(&self) -> u32 {
        let (on_board, capacity) = match self.cargo {
            Cargo::Passengers(n) => (n, self.model.passenger_capacity()),
            Cargo::Freight(kg) => (kg, self.model.freight_capacity()),
        };
        if capacity == 0 {
            return 0;
        }
        (f64::from(on_board) / f64::from(capacity) * 100.0).round() as u32
    }

    pub fn total_weight(&self) -> f64 {
        let cargo_weight = match self.cargo {
            Cargo::Passengers(n) => f64::from(n) * AVG_PASSENGER_WEIGHT,
            Cargo::Freight(kg) => f64::from(kg),
        };
        self.model.empty_weight() + self.fuel * LITRE_OF_FUEL_WEIGHT + cargo_weight
    }

    // amount the current LOAD task asks for, 0 outside of LOAD
    fn cargo_to_load(&self) -> u32 {
        let percent = match self.current_task() {
            Task::Load { percent } => percent,
            _ => 0,
        };
        let capacity = match self.cargo {
            Cargo::Passengers(_) => self.model.passenger_capacity(),
            Cargo::Freight(_) => self.model.freight_capacity(),
        };
        (f64::from(capacity) * f64::from(percent) / 100.0).round() as u32
    }

    pub fn loading_time(&self) -> u32 {
        let to_load = self.cargo_to_load();
        match self.cargo {
            Cargo::Passengers(_) => ((f64::from(to_load) / 60.0).round() as u32).max(1),
            Cargo::Freight(_) => match to_load {
                0..=999 => 1,
                1000..=50_000 => 2,
                _ => 3,
            },
        }
    }

    pub fn tick(&mut self) {
        match self.current_task() {
            Task::Away => {
                self.fuel = (self.fuel - self.model.fuel_capacity() / 10.0).max(0.0);
            }
            Task::Load { .. } => {
                let capacity = self.model.fuel_capacity();
                let time = f64::from(self.loading_time());
                self.fuel = (self.fuel + capacity / time).min(capacity);
                let gain = (f64::from(self.cargo_to_load()) / time).round() as u32;
                self.cargo = match self.cargo {
                    Cargo::Passengers(n) => {
                        Cargo::Passengers((n + gain).min(self.model.passenger_capacity()))
                    }
                    Cargo::Freight(kg) => {
                        Cargo::Freight((kg + gain).min(self.model.freight_capacity()))
                    }
                };
            }
            _ => {}
        }
    }

    pub fn unload(&mut self) {
        self.cargo = match self.cargo {
            Cargo::Passengers(_) => Cargo::Passengers(0),
            Cargo::Freight(_) => Cargo::Freight(0),
        };
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

impl fmt::Display for Aircraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.model.kind(),
            self.callsign,
            self.model,
            self.current_task().name()
        )?;
        if self.emergency {
            write!(f, " (EMERGENCY)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Fleet {
    aircraft: Vec<Aircraft>,
    index: HashMap<Callsign, usize>,
}

impl Fleet {
    pub fn new() -> Fleet {
        Fleet::default()
    }

    pub fn add(&mut self, aircraft: Aircraft) -> Result<(), AircraftError> {
        match self.index.entry(aircraft.callsign.clone()) {
            Entry::Occupied(entry) => Err(AircraftError::DuplicateCallsign(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(self.aircraft.len());
                self.aircraft.push(aircraft);
                Ok(())
            }
        }
    }

    pub fn get(&self, callsign: &str) -> Option<&Aircraft> {
        let i = self.index.get(callsign).copied()?;
        self.aircraft.get(i)
    }

    pub fn get_mut(&mut self, callsign: &str) -> Option<&mut Aircraft> {
        let i = self.index.get(callsign).copied()?;
        self.aircraft.get_mut(i)
    }

    pub fn contains(&self, callsign: &str) -> bool {
        self.index.contains_key(callsign)
    }

    // roster order, the order aircraft were added
    pub fn iter(&self) -> impl Iterator<Item = &Aircraft> {
        self.aircraft.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Aircraft> {
        self.aircraft.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }
}
