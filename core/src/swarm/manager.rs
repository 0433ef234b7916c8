//! Swarm manager: spawns bots and fans prompts out across them

use crate::agent::{BotAgent, BotAgentBuilder, BotMetrics, BotResponse};
use crate::config::{BotConfig, SwarmConfig};
use crate::error::{Result, SwarmError};
use crate::llm::LlmClient;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Builds the LLM client for a given bot id
pub type ClientFactory = Arc<dyn Fn(u32) -> Result<Arc<dyn LlmClient>> + Send + Sync>;

/// Aggregated metrics across every bot in the swarm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmMetrics {
    pub name: String,
    pub total_bots: usize,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Successful requests as a percentage of all requests
    pub aggregate_success_rate: f64,
    pub per_bot: Vec<BotMetrics>,
}

/// Outcome of a timed stress run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressReport {
    pub bot_count: usize,
    pub iterations: usize,
    pub total_results: usize,
    pub successful: usize,
    pub success_rate: f64,
    pub duration_seconds: f64,
}

/// Owns a pool of bots sharing one configuration
pub struct SwarmManager {
    config: SwarmConfig,
    bot_config: BotConfig,
    bots: Vec<Arc<BotAgent>>,
    next_bot_id: u32,
    client_factory: Option<ClientFactory>,
}

impl SwarmManager {
    /// Create a manager whose bots talk to the configured Ollama host
    pub fn new(config: SwarmConfig) -> Result<Self> {
        config.validate()?;
        let bot_config = config.bot_config();
        Ok(Self {
            config,
            bot_config,
            bots: Vec::new(),
            next_bot_id: 0,
            client_factory: None,
        })
    }

    /// Create a manager whose bots get their client from `factory`
    pub fn with_client_factory(config: SwarmConfig, factory: ClientFactory) -> Result<Self> {
        let mut manager = Self::new(config)?;
        manager.client_factory = Some(factory);
        Ok(manager)
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn bots(&self) -> &[Arc<BotAgent>] {
        &self.bots
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    /// Spawn a single bot
    pub fn spawn_bot(&mut self, bot_id: u32) -> Result<()> {
        let mut builder = BotAgentBuilder::new(bot_id)
            .with_model(self.config.model.name.clone())
            .with_config(self.bot_config.clone())
            .with_http_timeout(self.config.http_timeout());

        if let Some(factory) = &self.client_factory {
            builder = builder.with_client(factory(bot_id)?);
        }

        let bot = builder.build().map_err(|e| SwarmError::SpawnFailed {
            bot_id,
            message: e.to_string(),
        })?;

        self.bots.push(Arc::new(bot));
        info!(bot_id, "Bot spawned");
        Ok(())
    }

    /// Spawn `count` bots, pausing between spawns; returns how many started
    pub async fn spawn_swarm(&mut self, count: usize) -> usize {
        let stagger = self.config.spawn_stagger();
        info!(
            "Spawning {} bots (stagger {:?}) for swarm '{}'",
            count, stagger, self.config.swarm.name
        );

        let mut spawned = 0;
        for i in 0..count {
            let bot_id = self.next_bot_id;
            self.next_bot_id += 1;

            match self.spawn_bot(bot_id) {
                Ok(()) => spawned += 1,
                Err(e) => error!(bot_id, "Failed to spawn bot: {}", e),
            }

            if i + 1 < count && !stagger.is_zero() {
                tokio::time::sleep(stagger).await;
            }
        }

        info!("{}/{} bots spawned", spawned, count);
        spawned
    }

    /// Spawn `count` bots and require every one of them to pass a health check
    pub async fn spawn_and_wait_ready(&mut self, count: usize) -> Result<()> {
        let spawned = self.spawn_swarm(count).await;
        if spawned != count {
            return Err(SwarmError::PartialSpawn {
                spawned,
                requested: count,
            }
            .into());
        }

        let checks = self.health_check_all().await;
        let healthy = checks.iter().filter(|(_, ok)| *ok).count();
        for (bot_id, ok) in &checks {
            if !ok {
                warn!(bot_id = *bot_id, "Health check failed");
            }
        }

        if healthy == checks.len() {
            info!("All {} bots healthy", healthy);
            Ok(())
        } else {
            Err(SwarmError::UnhealthyBots {
                healthy,
                total: checks.len(),
            }
            .into())
        }
    }

    /// Health-check every bot concurrently
    pub async fn health_check_all(&self) -> Vec<(u32, bool)> {
        join_all(self.bots.iter().map(|bot| async move {
            (bot.bot_id(), bot.health_check().await)
        }))
        .await
    }

    /// Every bot executes the same prompt
    pub async fn broadcast(&self, prompt: &str) -> Vec<BotResponse> {
        join_all(self.bots.iter().map(|bot| bot.execute(prompt))).await
    }

    /// Distribute prompts round-robin across the bots
    ///
    /// At most `max_concurrent_bots` prompts are in flight; results come
    /// back in prompt order.
    pub async fn execute_batch<S: AsRef<str>>(&self, prompts: &[S]) -> Result<Vec<BotResponse>> {
        if self.bots.is_empty() {
            return Err(SwarmError::NoBots.into());
        }

        let limit = self.config.swarm.max_concurrent_bots.max(1);
        let bots = &self.bots;
        let results = stream::iter(prompts.iter().enumerate())
            .map(|(i, prompt)| {
                let bot = &bots[i % bots.len()];
                bot.execute(prompt.as_ref())
            })
            .buffered(limit)
            .collect::<Vec<_>>()
            .await;

        Ok(results)
    }

    /// Repeat batches of `prompts` until `duration` has elapsed
    pub async fn run_stress_test<S: AsRef<str>>(
        &self,
        prompts: &[S],
        duration: Duration,
    ) -> Result<StressReport> {
        if self.bots.is_empty() {
            return Err(SwarmError::NoBots.into());
        }
        if prompts.is_empty() {
            return Err(SwarmError::NoPrompts.into());
        }

        let start = Instant::now();
        let mut iterations = 0;
        let mut total_results = 0;
        let mut successful = 0;

        while start.elapsed() < duration {
            let results = self.execute_batch(prompts).await?;
            iterations += 1;
            total_results += results.len();
            successful += results.iter().filter(|r| r.success).count();
            info!(
                "Iteration {} | results: {} | elapsed: {:.1}s",
                iterations,
                results.len(),
                start.elapsed().as_secs_f64()
            );
        }

        let success_rate = if total_results > 0 {
            successful as f64 / total_results as f64 * 100.0
        } else {
            0.0
        };

        Ok(StressReport {
            bot_count: self.bots.len(),
            iterations,
            total_results,
            successful,
            success_rate,
            duration_seconds: start.elapsed().as_secs_f64(),
        })
    }

    /// Fail when the share of failed results exceeds the configured threshold
    pub fn check_failure_threshold(&self, results: &[BotResponse]) -> Result<()> {
        if results.is_empty() {
            return Ok(());
        }

        let failed = results.iter().filter(|r| !r.success).count();
        let rate = failed as f64 / results.len() as f64;
        let threshold = self.config.swarm.error_handling.failure_threshold;

        if rate > threshold {
            return Err(SwarmError::FailureThresholdExceeded {
                rate: rate * 100.0,
                threshold: threshold * 100.0,
            }
            .into());
        }

        Ok(())
    }

    /// Aggregate metrics from all bots
    pub fn metrics(&self) -> SwarmMetrics {
        let per_bot: Vec<BotMetrics> = self.bots.iter().map(|bot| bot.metrics()).collect();
        let total_requests: u64 = per_bot.iter().map(|m| m.total_requests).sum();
        let successful_requests: u64 = per_bot.iter().map(|m| m.successful_requests).sum();
        let failed_requests: u64 = per_bot.iter().map(|m| m.failed_requests).sum();

        let aggregate_success_rate = if total_requests > 0 {
            successful_requests as f64 / total_requests as f64 * 100.0
        } else {
            0.0
        };

        SwarmMetrics {
            name: self.config.swarm.name.clone(),
            total_bots: self.bots.len(),
            total_requests,
            successful_requests,
            failed_requests,
            aggregate_success_rate,
            per_bot,
        }
    }

    /// Drop every bot
    pub fn shutdown(&mut self) {
        info!("Shutting down {} bots", self.bots.len());
        self.bots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::{MockLlmClient, MockReply};

    fn fast_config() -> SwarmConfig {
        let mut config = SwarmConfig::default();
        config.swarm.spawn_stagger_seconds = 0.5;
        config.swarm.error_handling.max_retries = 0;
        config.swarm.error_handling.retry_delay_seconds = 0.1;
        config
    }

    fn factory_for(clients: Vec<Arc<MockLlmClient>>) -> ClientFactory {
        Arc::new(move |bot_id: u32| -> Result<Arc<dyn LlmClient>> {
            let client = clients[bot_id as usize % clients.len()].clone();
            Ok(client as Arc<dyn LlmClient>)
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_swarm_staggers_between_spawns() {
        let client = Arc::new(MockLlmClient::always("ok"));
        let mut manager =
            SwarmManager::with_client_factory(fast_config(), factory_for(vec![client])).unwrap();

        let start = Instant::now();
        let spawned = manager.spawn_swarm(4).await;

        assert_eq!(spawned, 4);
        assert_eq!(manager.len(), 4);
        // Three pauses, none after the last spawn
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1500), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(2000), "{elapsed:?}");

        let ids: Vec<u32> = manager.bots().iter().map(|b| b.bot_id()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);

        manager.spawn_swarm(1).await;
        assert_eq!(manager.bots()[4].bot_id(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_failure_is_counted_out() {
        let factory: ClientFactory = Arc::new(|bot_id: u32| -> Result<Arc<dyn LlmClient>> {
            if bot_id == 1 {
                Err("no client".into())
            } else {
                Ok(Arc::new(MockLlmClient::always("ok")) as Arc<dyn LlmClient>)
            }
        });
        let mut manager = SwarmManager::with_client_factory(fast_config(), factory).unwrap();

        assert_eq!(manager.spawn_swarm(3).await, 2);
        let ids: Vec<u32> = manager.bots().iter().map(|b| b.bot_id()).collect();
        assert_eq!(ids, vec![0, 2]);

        // Bot 3 spawns fine and every bot is healthy
        assert!(manager.spawn_and_wait_ready(1).await.is_ok());
        assert_eq!(manager.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_spawn_reports_counts() {
        let factory: ClientFactory = Arc::new(|bot_id: u32| -> Result<Arc<dyn LlmClient>> {
            if bot_id == 1 {
                Err("no client".into())
            } else {
                Ok(Arc::new(MockLlmClient::always("ok")) as Arc<dyn LlmClient>)
            }
        });
        let mut manager = SwarmManager::with_client_factory(fast_config(), factory).unwrap();

        let err = manager.spawn_and_wait_ready(3).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Swarm(SwarmError::PartialSpawn {
                spawned: 2,
                requested: 3
            })
        ));
        assert_eq!(err.to_string(), "Swarm error: Only 2/3 bots spawned");
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_and_wait_ready_requires_all_healthy() {
        let healthy = Arc::new(MockLlmClient::always("OK"));
        let broken = Arc::new(MockLlmClient::scripted(vec![MockReply::Error(
            "down".to_string(),
        )]));
        let mut manager = SwarmManager::with_client_factory(
            fast_config(),
            factory_for(vec![healthy.clone(), broken]),
        )
        .unwrap();

        let err = manager.spawn_and_wait_ready(4).await.unwrap_err();
        match err {
            Error::Swarm(SwarmError::UnhealthyBots { healthy, total }) => {
                assert_eq!(healthy, 2);
                assert_eq!(total, 4);
            }
            other => panic!("unexpected error: {other}"),
        }

        let mut all_good =
            SwarmManager::with_client_factory(fast_config(), factory_for(vec![healthy])).unwrap();
        assert!(all_good.spawn_and_wait_ready(3).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_batch_round_robin_in_prompt_order() {
        let clients: Vec<_> = (0..3)
            .map(|_| Arc::new(MockLlmClient::always("done")))
            .collect();
        let mut manager =
            SwarmManager::with_client_factory(fast_config(), factory_for(clients.clone()))
                .unwrap();
        manager.spawn_swarm(3).await;

        let prompts: Vec<String> = (0..7).map(|i| format!("prompt {i}")).collect();
        let results = manager.execute_batch(&prompts).await.unwrap();

        assert_eq!(results.len(), 7);
        let bot_ids: Vec<u32> = results.iter().map(|r| r.bot_id).collect();
        assert_eq!(bot_ids, vec![0, 1, 2, 0, 1, 2, 0]);
        let mut first = clients[0].prompts();
        first.sort();
        assert_eq!(first, vec!["prompt 0", "prompt 3", "prompt 6"]);
        let mut last = clients[2].prompts();
        last.sort();
        assert_eq!(last, vec!["prompt 2", "prompt 5"]);

        let metrics = manager.metrics();
        assert_eq!(metrics.total_bots, 3);
        assert_eq!(metrics.total_requests, 7);
        assert_eq!(metrics.aggregate_success_rate, 100.0);
        assert_eq!(metrics.per_bot[0].total_requests, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_batch_runs_concurrently_up_to_limit() {
        let client = Arc::new(MockLlmClient::scripted(vec![MockReply::Delayed(
            Duration::from_secs(1),
            "slow".to_string(),
        )]));
        let mut config = fast_config();
        config.swarm.max_concurrent_bots = 2;
        config.swarm.spawn_stagger_seconds = 0.0;
        let mut manager =
            SwarmManager::with_client_factory(config, factory_for(vec![client])).unwrap();
        manager.spawn_swarm(4).await;

        let start = Instant::now();
        let results = manager.execute_batch(&["a", "b", "c", "d"]).await.unwrap();

        assert!(results.iter().all(|r| r.success));
        // Four one-second calls, two at a time
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(3), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_reaches_every_bot() {
        let client = Arc::new(MockLlmClient::always("pong"));
        let mut manager =
            SwarmManager::with_client_factory(fast_config(), factory_for(vec![client.clone()]))
                .unwrap();
        manager.spawn_swarm(5).await;

        let results = manager.broadcast("ping").await;

        assert_eq!(results.len(), 5);
        assert_eq!(client.calls(), 5);
        assert!(results.iter().all(|r| r.response.as_deref() == Some("pong")));
    }

    #[tokio::test]
    async fn test_empty_swarm_rejects_batches() {
        let manager = SwarmManager::new(fast_config()).unwrap();
        let err = manager.execute_batch(&["x"]).await.unwrap_err();
        assert!(matches!(err, Error::Swarm(SwarmError::NoBots)));
        assert_eq!(manager.metrics().aggregate_success_rate, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stress_test_repeats_until_duration() {
        let client = Arc::new(MockLlmClient::scripted(vec![MockReply::Delayed(
            Duration::from_secs(1),
            "ok".to_string(),
        )]));
        let mut manager =
            SwarmManager::with_client_factory(fast_config(), factory_for(vec![client])).unwrap();
        manager.spawn_swarm(2).await;

        let report = manager
            .run_stress_test(&["a", "b"], Duration::from_secs(3))
            .await
            .unwrap();

        assert_eq!(report.bot_count, 2);
        assert_eq!(report.iterations, 3);
        assert_eq!(report.total_results, 6);
        assert_eq!(report.successful, 6);
        assert_eq!(report.success_rate, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stress_test_without_prompts_is_rejected() {
        let client = Arc::new(MockLlmClient::always("ok"));
        let mut manager =
            SwarmManager::with_client_factory(fast_config(), factory_for(vec![client.clone()]))
                .unwrap();
        manager.spawn_swarm(1).await;

        let prompts: [&str; 0] = [];
        let err = manager
            .run_stress_test(&prompts, Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Swarm(SwarmError::NoPrompts)));
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn test_failure_threshold() {
        let manager = SwarmManager::new(fast_config()).unwrap();
        let ok = BotResponse::success(0, "ok".to_string(), 0.1);
        let bad = BotResponse::failure(0, "bad".to_string(), 0.1);

        // 1 of 5 failed: exactly at the 20% threshold
        let mut results = vec![ok.clone(); 4];
        results.push(bad.clone());
        assert!(manager.check_failure_threshold(&results).is_ok());

        results.push(bad);
        let err = manager.check_failure_threshold(&results).unwrap_err();
        assert!(matches!(
            err,
            Error::Swarm(SwarmError::FailureThresholdExceeded { .. })
        ));

        assert!(manager.check_failure_threshold(&[]).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_bots() {
        let client = Arc::new(MockLlmClient::always("ok"));
        let mut manager =
            SwarmManager::with_client_factory(fast_config(), factory_for(vec![client])).unwrap();
        manager.spawn_swarm(2).await;
        manager.shutdown();
        assert!(manager.is_empty());
    }
}
