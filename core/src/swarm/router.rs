//! Task router: priority queues in front of a set of bots

use crate::agent::{BotAgent, BotResponse};
use crate::error::{Result, SwarmError};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Task priority, highest served first
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal = 1,
    High = 2,
    Urgent = 3,
}

impl Priority {
    /// Every priority, highest first
    pub const DESCENDING: [Priority; 3] = [Priority::Urgent, Priority::High, Priority::Normal];

    fn slot(self) -> usize {
        self as usize - 1
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        };
        f.write_str(name)
    }
}

impl TryFrom<u8> for Priority {
    type Error = SwarmError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Normal),
            2 => Ok(Priority::High),
            3 => Ok(Priority::Urgent),
            other => Err(SwarmError::InvalidPriority { value: other }),
        }
    }
}

/// How the router picks a bot for each task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Cycle through bots in registration order
    #[default]
    RoundRobin,
    /// Bot with the fewest tasks currently assigned
    LeastLoaded,
    /// Uniformly random bot
    Random,
}

impl Strategy {
    /// Parse a configured strategy name, falling back to round robin
    pub fn from_config(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!("Unknown distribution strategy '{}', using round_robin", name);
            Strategy::RoundRobin
        })
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "round_robin" => Ok(Strategy::RoundRobin),
            "least_loaded" => Ok(Strategy::LeastLoaded),
            "random" => Ok(Strategy::Random),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::RoundRobin => "round_robin",
            Strategy::LeastLoaded => "least_loaded",
            Strategy::Random => "random",
        };
        f.write_str(name)
    }
}

/// A queued unit of work
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub prompt: String,
    pub priority: Priority,
    /// Overrides the bot's configured timeout
    pub timeout: Option<Duration>,
    pub created_at: DateTime<Utc>,
}

/// Result of executing a routed task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub bot_id: u32,
    pub success: bool,
    pub response: Option<String>,
    pub response_time: f64,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TaskResult {
    fn from_response(task_id: String, response: BotResponse) -> Self {
        Self {
            task_id,
            bot_id: response.bot_id,
            success: response.success,
            response: response.response,
            response_time: response.response_time,
            error: response.error,
            timestamp: response.timestamp,
        }
    }
}

/// Queue depth per priority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub total_queued: usize,
    pub normal_queued: usize,
    pub high_queued: usize,
    pub urgent_queued: usize,
    pub registered_bots: usize,
}

/// Router performance counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterMetrics {
    pub total_tasks: u64,
    pub successful_tasks: u64,
    pub failed_tasks: u64,
    /// Running mean of task response times
    pub avg_response_time: f64,
}

impl RouterMetrics {
    fn record(&mut self, result: &TaskResult) {
        self.total_tasks += 1;
        if result.success {
            self.successful_tasks += 1;
        } else {
            self.failed_tasks += 1;
        }
        let n = self.total_tasks as f64;
        self.avg_response_time += (result.response_time - self.avg_response_time) / n;
    }
}

/// Tasks handed to bots but not yet finished
///
/// Dropped before [`InFlight::complete`] (the batch future was cancelled), it
/// releases the bots and puts the tasks back at the front of their queues.
struct InFlight<'a> {
    load: &'a mut Vec<usize>,
    queues: &'a mut [VecDeque<Task>; 3],
    assignments: Vec<(usize, Task)>,
}

impl InFlight<'_> {
    fn complete(mut self) -> Vec<(usize, Task)> {
        let assignments = std::mem::take(&mut self.assignments);
        for (index, _) in &assignments {
            self.load[*index] -= 1;
        }
        assignments
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.assignments.is_empty() {
            warn!("Batch cancelled, requeueing {} tasks", self.assignments.len());
        }
        for (index, task) in self.assignments.drain(..).rev() {
            self.load[index] -= 1;
            self.queues[task.priority.slot()].push_front(task);
        }
    }
}

/// Routes queued tasks to registered bots
pub struct TaskRouter {
    strategy: Strategy,
    capacity: usize,
    bots: Vec<Arc<BotAgent>>,
    /// Tasks currently assigned to each bot, by registration index
    load: Vec<usize>,
    queues: [VecDeque<Task>; 3],
    round_robin_index: usize,
    metrics: RouterMetrics,
}

impl TaskRouter {
    pub fn new(strategy: Strategy, capacity: usize) -> Self {
        Self {
            strategy,
            capacity,
            bots: Vec::new(),
            load: Vec::new(),
            queues: Default::default(),
            round_robin_index: 0,
            metrics: RouterMetrics::default(),
        }
    }

    /// Build a router from the swarm's task distribution settings
    pub fn from_config(config: &crate::config::TaskDistribution) -> Self {
        Self::new(Strategy::from_config(&config.strategy), config.queue_size)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Register a bot with the router
    pub fn register_bot(&mut self, bot: Arc<BotAgent>) {
        debug!(bot_id = bot.bot_id(), "Bot registered with router");
        self.bots.push(bot);
        self.load.push(0);
    }

    /// Queue a task; returns its id
    pub fn submit_task<S: Into<String>>(
        &mut self,
        prompt: S,
        priority: Priority,
        timeout: Option<Duration>,
    ) -> Result<String> {
        if self.queued() >= self.capacity {
            return Err(SwarmError::QueueFull {
                capacity: self.capacity,
            }
            .into());
        }

        let task = Task {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            priority,
            timeout,
            created_at: Utc::now(),
        };
        let id = task.id.clone();
        debug!(task_id = %id, ?priority, "Task submitted");
        self.queues[priority.slot()].push_back(task);
        Ok(id)
    }

    fn queued(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    fn next_task(&mut self) -> Option<Task> {
        Priority::DESCENDING
            .iter()
            .find_map(|p| self.queues[p.slot()].pop_front())
    }

    fn select_bot(&mut self) -> usize {
        let count = self.bots.len();
        match self.strategy {
            Strategy::RoundRobin => {
                let index = self.round_robin_index % count;
                self.round_robin_index = self.round_robin_index.wrapping_add(1);
                index
            }
            Strategy::LeastLoaded => self
                .load
                .iter()
                .enumerate()
                .min_by_key(|(_, load)| **load)
                .map(|(index, _)| index)
                .unwrap_or(0),
            Strategy::Random => rand::thread_rng().gen_range(0..count),
        }
    }

    /// Execute the highest-priority queued task
    pub async fn execute_next_task(&mut self) -> Result<Option<TaskResult>> {
        if self.queued() == 0 {
            return Ok(None);
        }
        if self.bots.is_empty() {
            return Err(SwarmError::NoBots.into());
        }

        let mut results = self.process_batch(Some(1)).await?;
        Ok(results.pop())
    }

    /// Execute up to `max_tasks` queued tasks (all when `None`) concurrently
    ///
    /// Results are returned in dequeue order.
    pub async fn process_batch(&mut self, max_tasks: Option<usize>) -> Result<Vec<TaskResult>> {
        if self.queued() == 0 {
            return Ok(Vec::new());
        }
        if self.bots.is_empty() {
            return Err(SwarmError::NoBots.into());
        }

        let limit = max_tasks.unwrap_or(usize::MAX);
        let mut assignments = Vec::new();
        while assignments.len() < limit {
            let Some(task) = self.next_task() else {
                break;
            };
            let index = self.select_bot();
            self.load[index] += 1;
            assignments.push((index, task));
        }

        let runs: Vec<_> = assignments
            .iter()
            .map(|(index, task)| {
                let bot = self.bots[*index].clone();
                let prompt = task.prompt.clone();
                let timeout = task.timeout;
                async move { bot.execute_with_timeout(&prompt, timeout).await }
            })
            .collect();

        let in_flight = InFlight {
            load: &mut self.load,
            queues: &mut self.queues,
            assignments,
        };
        let responses = join_all(runs).await;
        let assignments = in_flight.complete();

        let mut results = Vec::with_capacity(responses.len());
        for ((_, task), response) in assignments.into_iter().zip(responses) {
            let result = TaskResult::from_response(task.id, response);
            self.metrics.record(&result);
            info!(
                task_id = %result.task_id,
                bot_id = result.bot_id,
                success = result.success,
                "Task completed in {:.2}s",
                result.response_time
            );
            results.push(result);
        }

        Ok(results)
    }

    /// Current queue depths
    pub fn queue_status(&self) -> QueueStatus {
        QueueStatus {
            total_queued: self.queued(),
            normal_queued: self.queues[Priority::Normal.slot()].len(),
            high_queued: self.queues[Priority::High.slot()].len(),
            urgent_queued: self.queues[Priority::Urgent.slot()].len(),
            registered_bots: self.bots.len(),
        }
    }

    /// Router performance counters
    pub fn metrics(&self) -> &RouterMetrics {
        &self.metrics
    }
}
