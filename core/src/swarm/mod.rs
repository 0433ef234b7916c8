//! Swarm orchestration: bot pools and task routing

pub mod manager;
pub mod router;

pub use manager::{ClientFactory, StressReport, SwarmManager, SwarmMetrics};
pub use router::{Priority, QueueStatus, RouterMetrics, Strategy, Task, TaskResult, TaskRouter};
