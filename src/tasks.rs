use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Task {
    Away,
    Land,
    Wait,
    Load { percent: u32 },
    Takeoff,
}

impl Task {
    pub fn name(self) -> &'static str {
        match self {
            Task::Away => "AWAY",
            Task::Land => "LAND",
            Task::Wait => "WAIT",
            Task::Load { .. } => "LOAD",
            Task::Takeoff => "TAKEOFF",
        }
    }

    // legal successors when reading a task list cyclically
    pub fn may_precede(self, next: Task) -> bool {
        use Task::*;
        matches!(
            (self, next),
            (Away, Away | Land)
                | (Land, Wait | Load { .. })
                | (Wait, Wait | Load { .. })
                | (Load { .. }, Takeoff)
                | (Takeoff, Away)
        )
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Load { percent } => write!(f, "LOAD@{}", percent),
            _ => write!(f, "{}", self.name()),
        }
    }
}

impl FromStr for Task {
    type Err = TaskListError;

    fn from_str(s: &str) -> Result<Task, TaskListError> {
        if let Some(percent) = s.strip_prefix("LOAD@") {
            let percent =
                percent.parse().map_err(|_| TaskListError::UnknownTask(s.to_string()))?;
            return Ok(Task::Load { percent });
        }
        match s {
            "AWAY" => Ok(Task::Away),
            "LAND" => Ok(Task::Land),
            "WAIT" => Ok(Task::Wait),
            "TAKEOFF" => Ok(Task::Takeoff),
            _ => Err(TaskListError::UnknownTask(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskListError {
    #[error("a task list needs at least one task")]
    Empty,
    #[error("task cycle broken: {current} cannot be followed by {next}")]
    BrokenCycle { current: Task, next: Task },
    #[error("unknown task {0}")]
    UnknownTask(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
    current: usize,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Result<TaskList, TaskListError> {
        if tasks.is_empty() {
            return Err(TaskListError::Empty);
        }
        for (i, &task) in tasks.iter().enumerate() {
            let next = tasks[(i + 1) % tasks.len()];
            if !task.may_precede(next) {
                return Err(TaskListError::BrokenCycle { current: task, next });
            }
        }
        Ok(TaskList { tasks, current: 0 })
    }

    pub fn current_task(&self) -> Task {
        self.tasks[self.current]
    }

    pub fn next_task(&self) -> Task {
        self.tasks[(self.current + 1) % self.tasks.len()]
    }

    pub fn advance(&mut self) {
        self.current = (self.current + 1) % self.tasks.len();
    }

    // the cycle read from the current task, wrapping around the end
    pub fn from_current(&self) -> Vec<Task> {
        let mut tasks = Vec::with_capacity(self.tasks.len());
        tasks.extend_from_slice(&self.tasks[self.current..]);
        tasks.extend_from_slice(&self.tasks[..self.current]);
        tasks
    }
}
