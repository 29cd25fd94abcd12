use crate::aircraft::{Aircraft, Callsign, Fleet};
use std::collections::VecDeque;

pub trait AircraftQueue {
    fn label(&self) -> &'static str;
    fn push(&mut self, callsign: Callsign);
    fn pop(&mut self, fleet: &Fleet) -> Option<Callsign>;
    fn peek(&self, fleet: &Fleet) -> Option<Callsign>;
    fn in_order(&self, fleet: &Fleet) -> Vec<Callsign>;
    fn contains(&self, callsign: &str) -> bool;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn render(&self, fleet: &Fleet) -> String {
        let order = self.in_order(fleet);
        let names: Vec<&str> = order.iter().map(|c| c.as_ref()).collect();
        format!("{} [{}]", self.label(), names.join(", "))
    }
}

#[derive(Debug, Default)]
pub struct TakeoffQueue {
    queue: VecDeque<Callsign>,
}

impl TakeoffQueue {
    pub fn new() -> TakeoffQueue {
        TakeoffQueue::default()
    }
}

impl AircraftQueue for TakeoffQueue {
    fn label(&self) -> &'static str {
        "TakeoffQueue"
    }

    fn push(&mut self, callsign: Callsign) {
        self.queue.push_back(callsign);
    }

    fn pop(&mut self, _fleet: &Fleet) -> Option<Callsign> {
        self.queue.pop_front()
    }

    fn peek(&self, _fleet: &Fleet) -> Option<Callsign> {
        self.queue.front().cloned()
    }

    fn in_order(&self, _fleet: &Fleet) -> Vec<Callsign> {
        self.queue.iter().cloned().collect()
    }

    fn contains(&self, callsign: &str) -> bool {
        self.queue.iter().any(|c| c.as_ref() == callsign)
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

// lower tier clears first
fn tier(aircraft: &Aircraft) -> u8 {
    if aircraft.has_emergency() {
        0
    } else if aircraft.fuel_percent() <= 20 {
        1
    } else if aircraft.is_passenger() && aircraft.occupancy_percent() != 0 {
        2
    } else {
        3
    }
}

#[derive(Debug, Default)]
pub struct LandingQueue {
    arrivals: Vec<Callsign>,
}

impl LandingQueue {
    pub fn new() -> LandingQueue {
        LandingQueue::default()
    }

    // stable partition over arrival order, recomputed from live aircraft state
    fn ordered_indices(&self, fleet: &Fleet) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.arrivals.len()).collect();
        indices.sort_by_key(|&i| fleet.get(&self.arrivals[i]).map_or(u8::MAX, tier));
        indices
    }
}

impl AircraftQueue for LandingQueue {
    fn label(&self) -> &'static str {
        "LandingQueue"
    }

    fn push(&mut self, callsign: Callsign) {
        self.arrivals.push(callsign);
    }

    fn pop(&mut self, fleet: &Fleet) -> Option<Callsign> {
        let first = self.ordered_indices(fleet).first().copied()?;
        Some(self.arrivals.remove(first))
    }

    fn peek(&self, fleet: &Fleet) -> Option<Callsign> {
        let first = self.ordered_indices(fleet).first().copied()?;
        Some(self.arrivals[first].clone())
    }

    fn in_order(&self, fleet: &Fleet) -> Vec<Callsign> {
        self.ordered_indices(fleet)
            .into_iter()
            .map(|i| self.arrivals[i].clone())
            .collect()
    }

    fn contains(&self, callsign: &str) -> bool {
        self.arrivals.iter().any(|c| c.as_ref() == callsign)
    }

    fn len(&self) -> usize {
        self.arrivals.len()
    }
}
