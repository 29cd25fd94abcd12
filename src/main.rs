use std::io::Write;
use crate::aircraft::{Aircraft, AircraftModel, Cargo};
use crate::tasks::{Task, TaskList};
use crate::tower::tower::ControlTower;
use crate::queues::AircraftQueue;
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tabled::settings::Style;
use tabled::Tabled;

mod aircraft;
mod ground;
mod queues;
mod scenario;
mod tasks;
mod tower;

#[derive(Parser)]
struct Args {
    /// Path to the JSON scenario file
    #[arg(short, long, value_name = "FILE", default_value = "data/default.json")]
    scenario: PathBuf,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

fn paginate(content: String) {
    let mut pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn())
        .expect("Failed to spawn pager");

    let mut stdin = pager.stdin.take().expect("Failed to open stdin for pager");

    if let Err(e) = stdin.write_all(content.as_bytes()) {
        // Broken pipe is common if the user quits the pager early
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            eprintln!("Error writing to pager: {}", e);
        }
    }

    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

#[derive(Tabled)]
struct AircraftRow {
    callsign: String,
    model: String,
    task: String,
    next: String,
    gate: String,
    fuel: String,
    cargo: String,
    weight: String,
    status: String,
}

fn loading_render(tower: &ControlTower) -> String {
    let slots: Vec<String> = tower
        .loading()
        .iter()
        .map(|(callsign, ticks_left)| format!("{}:{}", callsign, ticks_left))
        .collect();
    format!("LoadingAircraft [{}]", slots.join(", "))
}

fn row(tower: &ControlTower, aircraft: &Aircraft) -> AircraftRow {
    AircraftRow {
        callsign: aircraft.callsign.to_string(),
        model: aircraft.model.to_string(),
        task: aircraft.current_task().to_string(),
        next: aircraft.tasks.next_task().to_string(),
        gate: tower
            .gate_of(&aircraft.callsign)
            .map(|(terminal, gate)| format!("T{}G{}", terminal, gate))
            .unwrap_or_else(|| "-".to_string()),
        fuel: format!("{}%", aircraft.fuel_percent()),
        cargo: aircraft.cargo().to_string(),
        weight: format!("{:.0} kg", aircraft.total_weight()),
        status: if aircraft.has_emergency() {
            "EMERGENCY".red().bold().to_string()
        } else {
            "OK".to_string()
        },
    }
}

fn admit(
    tower: &mut ControlTower,
    callsign: &str,
    model: &str,
    fuel: &str,
    tasks: &str,
    cargo: Option<&str>,
) -> Result<String, Box<dyn std::error::Error>> {
    let model: AircraftModel = model.parse()?;
    let fuel_percent: f64 = fuel.parse()?;
    let tasks = tasks.split(',').map(str::parse).collect::<Result<Vec<Task>, _>>()?;
    let tasks = TaskList::new(tasks)?;
    let amount: u32 = cargo.map(str::parse).transpose()?.unwrap_or(0);
    let cargo = if model.is_passenger_model() {
        Cargo::Passengers(amount)
    } else {
        Cargo::Freight(amount)
    };
    let fuel = model.fuel_capacity() * fuel_percent.clamp(0.0, 100.0) / 100.0;
    let aircraft = Aircraft::new(Arc::from(callsign), model, tasks, fuel, cargo)?;
    let line = format!("{} admitted.", aircraft);
    tower.add_aircraft(aircraft)?;
    Ok(line)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    println!("Tower online. Loaded scenario from {}", args.scenario.display());

    let mut tower = scenario::load_from_file(&args.scenario)?;
    println!("{}", tower);

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: vec![
            "tick".to_string(),
            "ls".to_string(),
            "queues".to_string(),
            "gates".to_string(),
            "admit".to_string(),
            "mayday".to_string(),
            "resolve".to_string(),
            "closeterm".to_string(),
            "openterm".to_string(),
            "save".to_string(),
            "help".to_string(),
            "exit".to_string(),
        ],
    };

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() { continue; }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                match parts[0] {
                    "tick" => {
                        let count = parts.get(1).map(|s| *s).unwrap_or("1").parse::<u64>().unwrap_or(1);
                        for _ in 0..count {
                            tower.tick();
                        }
                        println!("Advanced {} tick(s), now at tick {}.", count, tower.ticks_elapsed());
                        println!("{}", tower);
                        println!("{}", tower.landing_queue().render(tower.fleet()));
                        println!("{}", tower.takeoff_queue().render(tower.fleet()));
                        println!("{}", loading_render(&tower));
                    },
                    "ls" => {
                        if tower.fleet().is_empty() {
                            println!("No aircraft in controlled airspace.");
                            continue;
                        }
                        let sub = parts.get(1).map(|s| *s).unwrap_or("all");
                        let rows: Vec<AircraftRow> = tower.fleet().iter()
                            .filter(|a| match sub {
                                "land" | "takeoff" | "wait" | "load" | "away" => {
                                    a.current_task().name().eq_ignore_ascii_case(sub)
                                }
                                _ => true, // 'ls' or 'ls all'
                            })
                            .map(|a| row(&tower, a))
                            .collect();
                        if rows.is_empty() {
                            println!("No matching aircraft found.")
                        } else {
                            let long = rows.len() > 20;
                            let mut table = tabled::Table::new(rows);
                            table.with(Style::rounded());
                            table.with(tabled::settings::Alignment::left());
                            if long {
                                paginate(table.to_string());
                            } else {
                                println!("{}", table);
                            }
                        }
                    },
                    "queues" => {
                        if tower.landing_queue().is_empty()
                            && tower.takeoff_queue().is_empty()
                            && tower.loading().is_empty()
                        {
                            println!("All queues clear.");
                        } else {
                            println!("{}", tower.landing_queue().render(tower.fleet()));
                            println!("{}", tower.takeoff_queue().render(tower.fleet()));
                            println!("{}", loading_render(&tower));
                        }
                    },
                    "gates" => {
                        if tower.terminals().is_empty() {
                            println!("No terminals on the field.");
                        }
                        for terminal in tower.terminals() {
                            let header = format!("{} ({}% occupied)", terminal, terminal.occupancy_percent());
                            if terminal.has_emergency() {
                                println!("{}", header.red());
                            } else {
                                println!("{}", header);
                            }
                            for gate in terminal.gates() {
                                println!("  {}", gate);
                            }
                        }
                    },
                    "admit" => {
                        if let (Some(callsign), Some(model), Some(fuel), Some(tasks)) =
                            (parts.get(1), parts.get(2), parts.get(3), parts.get(4))
                        {
                            match admit(&mut tower, callsign, model, fuel, tasks, parts.get(5).map(|s| *s)) {
                                Ok(line) => println!("{}", line),
                                Err(e) => println!("Admission refused: {}", e),
                            }
                        } else {
                            println!("Usage: admit <callsign> <model> <fuel%> <task,task,...> [cargo]");
                        }
                    },
                    "mayday" => {
                        if let Some(callsign) = parts.get(1) {
                            match tower.aircraft_mut(callsign) {
                                Some(aircraft) => {
                                    aircraft.declare_emergency();
                                    println!("{}", format!("{}", aircraft).red().bold());
                                }
                                None => println!("No aircraft with callsign {}.", callsign),
                            }
                        } else {
                            println!("Usage: mayday <callsign>");
                        }
                    },
                    "resolve" => {
                        if let Some(callsign) = parts.get(1) {
                            match tower.aircraft_mut(callsign) {
                                Some(aircraft) => {
                                    aircraft.clear_emergency();
                                    println!("{} is back to normal operations.", aircraft);
                                }
                                None => println!("No aircraft with callsign {}.", callsign),
                            }
                        } else {
                            println!("Usage: resolve <callsign>");
                        }
                    },
                    "closeterm" => {
                        if let Some(number) = parts.get(1) {
                            let number = number.parse::<u32>().unwrap_or(0);
                            match tower.terminal_mut(number) {
                                Some(terminal) => {
                                    terminal.declare_emergency();
                                    println!("Terminal {} closed, no new gate allocations.", number);
                                }
                                None => println!("No terminal numbered {}.", number),
                            }
                        } else {
                            println!("Usage: closeterm <terminal>");
                        }
                    },
                    "openterm" => {
                        if let Some(number) = parts.get(1) {
                            let number = number.parse::<u32>().unwrap_or(0);
                            match tower.terminal_mut(number) {
                                Some(terminal) => {
                                    terminal.clear_emergency();
                                    println!("Terminal {} back in service.", number);
                                }
                                None => println!("No terminal numbered {}.", number),
                            }
                        } else {
                            println!("Usage: openterm <terminal>");
                        }
                    },
                    "save" => {
                        let target = parts.get(1).map(|s| PathBuf::from(*s)).unwrap_or_else(|| args.scenario.clone());
                        match scenario::save_to_file(&tower, &target) {
                            Ok(()) => println!("Saved to {}.", target.display()),
                            Err(e) => println!("Save failed: {}", e),
                        }
                    },
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  tick [n]           - Run the control cycle n times (default 1)");
                        println!("  ls [phase]         - List all aircraft in a table or filter by phase: land, takeoff, wait, load, away");
                        println!("  queues             - Show the landing queue, takeoff queue and loading aircraft");
                        println!("  gates              - Show every terminal and its gates");
                        println!("  admit <callsign> <model> <fuel%> <task,task,...> [cargo]");
                        println!("                     - Admit an aircraft, e.g. admit QFA481 AIRBUS_A320 80 LAND,WAIT,LOAD@60,TAKEOFF,AWAY");
                        println!("  mayday <callsign>  - Declare an emergency on an aircraft");
                        println!("  resolve <callsign> - Stand an aircraft emergency down");
                        println!("  closeterm <n>      - Declare an emergency at terminal n");
                        println!("  openterm <n>       - Clear the emergency at terminal n");
                        println!("  save [file]        - Save the scenario (default: the file it was loaded from)");
                        println!("  help / ?           - Show this help menu");
                        println!("  exit / quit        - Exit the simulator\n");
                    },
                    "exit" | "quit" => break,
                    _ => println!("Unknown command: {}", parts[0]),
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            },
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
