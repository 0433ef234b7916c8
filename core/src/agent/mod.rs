//! Bot agent: one prompt in, one uniform result out

pub mod config;
pub mod core;
pub mod execution;
pub mod metrics;
pub mod retry;

pub use self::core::{AttemptError, BotAgent, HEALTH_CHECK_PROMPT, HEALTH_CHECK_TIMEOUT};
pub use config::BotAgentBuilder;
pub use execution::BotResponse;
pub use metrics::{BotCounters, BotMetrics};
pub use retry::{RetryPolicy, RetryState};
