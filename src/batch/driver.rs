// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Sequential batch driver.
//!
//! One tool in flight at a time with a fixed delay between submissions.
//! Rate-limited submissions are retried with a growing wait; every other
//! failure is recorded at once and the batch moves on.

use crate::batch::store::ResultStore;
use crate::config::Config;
use crate::engine::validator::ClassificationValidator;
use crate::engine_core::constants::batch as defaults;
use crate::engine_core::errors::ClassifierError;
use crate::engine_core::models::{ClassificationOutput, ToolClassificationRecord};
use crate::llm::pipeline::{ClassificationRequest, ToolClassifier};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Pause between two submissions, also the base of the rate-limit backoff
    pub delay: Duration,
    pub max_attempts: u32,
}

impl BatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            delay: Duration::from_millis(config.delay_ms),
            max_attempts: config.max_attempts.max(1),
        }
    }

    /// Wait after the `attempt`-th rate-limited try
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.delay
            .saturating_mul(attempt.saturating_mul(defaults::RATE_LIMIT_BACKOFF_FACTOR))
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(defaults::DEFAULT_DELAY_MS),
            max_attempts: defaults::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Input order, one record per request
    pub records: Vec<ToolClassificationRecord>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.records.len() - self.success_count()
    }
}

pub struct BatchDriver {
    classifier: Arc<dyn ToolClassifier>,
    options: BatchOptions,
    store: Option<ResultStore>,
}

impl BatchDriver {
    pub fn new(classifier: Arc<dyn ToolClassifier>, options: BatchOptions) -> Self {
        Self {
            classifier,
            options,
            store: None,
        }
    }

    /// Persist the record list after every item
    pub fn with_store(mut self, store: ResultStore) -> Self {
        self.store = Some(store);
        self
    }

    async fn classify_with_retry(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationOutput, ClassifierError> {
        let mut attempt = 1;
        loop {
            match self.classifier.classify(request).await {
                Ok(output) => return Ok(output),
                Err(e) if e.is_rate_limited() && attempt < self.options.max_attempts => {
                    let wait = self.options.backoff(attempt);
                    warn!(
                        url = %request.url,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Classify one tool and run the pre-submission validator over the result.
    pub async fn process(&self, request: &ClassificationRequest) -> ToolClassificationRecord {
        match self.classify_with_retry(request).await {
            Ok(mut output) => {
                let report = ClassificationValidator::validate(
                    &output,
                    &request.url,
                    request.description_or_empty(),
                );
                output.apply_corrections(&report.corrections);
                ToolClassificationRecord::success(request.url.clone(), output, Some(report.summary()))
            }
            Err(e) => {
                error!(url = %request.url, error = %e, "Classification failed");
                ToolClassificationRecord::failure(request.url.clone(), e.to_string())
            }
        }
    }

    fn persist(&self, records: &[ToolClassificationRecord]) {
        if let Some(store) = &self.store {
            // Storage failures are logged, never fatal
            if let Err(e) = store.save(records) {
                warn!(error = %e, "Failed to persist batch results");
            }
        }
    }

    pub async fn run(&self, requests: &[ClassificationRequest]) -> BatchReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let total = requests.len();
        let mut records = Vec::with_capacity(total);

        info!(%run_id, total, delay_ms = self.options.delay.as_millis() as u64, "Batch started");

        for (index, request) in requests.iter().enumerate() {
            if index > 0 && !self.options.delay.is_zero() {
                tokio::time::sleep(self.options.delay).await;
            }

            let record = self.process(request).await;
            info!(
                %run_id,
                progress = index + 1,
                total,
                url = %record.url,
                success = record.is_success(),
                "Batch item done"
            );
            records.push(record);
            self.persist(&records);
        }

        let report = BatchReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            records,
        };
        info!(
            %run_id,
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "Batch finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_with_attempt() {
        let options = BatchOptions {
            delay: Duration::from_millis(2000),
            max_attempts: 3,
        };
        assert_eq!(options.backoff(1), Duration::from_millis(4000));
        assert_eq!(options.backoff(2), Duration::from_millis(8000));
    }

    #[test]
    fn test_options_from_config_never_zero_attempts() {
        let config = Config {
            max_attempts: 0,
            delay_ms: 10,
            ..Config::default()
        };
        let options = BatchOptions::from_config(&config);
        assert_eq!(options.max_attempts, 1);
        assert_eq!(options.delay, Duration::from_millis(10));
    }
}
