// ABOUTME: Bounded fixed-interval polling that drives a Job to a terminal state
// ABOUTME: Every tick consumes budget, including ticks whose query failed transiently

use crate::PredictionApi;
use crate::constants::polling;
use crate::types::Job;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: polling::MAX_ATTEMPTS,
            interval: polling::INTERVAL,
        }
    }
}

impl PollConfig {
    /// Upper bound on time spent sleeping between ticks.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Attempt accounting for one polling run. Only [`JobPoller`] advances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempts_made: u32,
    max_attempts: u32,
    interval: Duration,
}

impl RetryState {
    fn new(config: &PollConfig) -> Self {
        Self {
            attempts_made: 0,
            max_attempts: config.max_attempts,
            interval: config.interval,
        }
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts_made >= self.max_attempts
    }

    fn tick(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.attempts_made += 1;
        true
    }
}

#[derive(Debug, Clone)]
pub struct PollReport {
    pub job: Job,
    pub retry: RetryState,
}

impl PollReport {
    /// The budget ran out before the provider reported a terminal status.
    pub fn timed_out(&self) -> bool {
        !self.job.is_terminal()
    }

    /// The result reference, only when the job actually succeeded.
    pub fn result_reference(&self) -> Option<&str> {
        match self.job.status() {
            crate::JobStatus::Succeeded => self.job.result_reference(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobPoller {
    config: PollConfig,
}

impl JobPoller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub async fn poll<A>(&self, api: &A, mut job: Job) -> PollReport
    where
        A: PredictionApi + ?Sized,
    {
        let mut retry = RetryState::new(&self.config);

        while !job.is_terminal() && retry.tick() {
            sleep(self.config.interval).await;

            match api.get_prediction(&job.poll_endpoint).await {
                Ok(state) => {
                    log::debug!(
                        "Prediction {} polling status: {:?} (attempt {}/{})",
                        job.id,
                        state.status,
                        retry.attempts_made(),
                        retry.max_attempts()
                    );
                    log::debug!("Poll response output: {:?}", state.output);
                    if let Some(error) = &state.error {
                        log::debug!("Poll response error: {}", error);
                    }
                    job.apply_state(&state);
                }
                Err(error) if error.is_transient() => {
                    log::warn!(
                        "Poll of prediction {} failed (attempt {}/{}): {}",
                        job.id,
                        retry.attempts_made(),
                        retry.max_attempts(),
                        error
                    );
                }
                Err(error) => {
                    log::warn!("Prediction {} rejected while polling: {}", job.id, error);
                    job.mark_failed();
                }
            }
        }

        if job.is_terminal() {
            log::info!(
                "Prediction {} finished as {:?} after {} poll(s)",
                job.id,
                job.status(),
                retry.attempts_made()
            );
        } else {
            log::warn!(
                "Prediction {} still {:?} after {} poll(s); giving up",
                job.id,
                job.status(),
                retry.attempts_made()
            );
        }

        PollReport { job, retry }
    }
}
