// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bounded worker pool for CPU-bound classification work
//!
//! Decoding, preprocessing and model execution run on tokio's blocking
//! thread pool. A semaphore caps how many of those jobs run at once so a
//! burst of uploads cannot starve the runtime or oversubscribe the model
//! sessions.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use super::errors::InferenceError;

#[derive(Debug, Clone)]
pub struct InferencePool {
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl InferencePool {
    /// Create a pool allowing `max_concurrent` jobs at a time (at least one)
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run a blocking job once a permit is free
    ///
    /// The permit is held for the lifetime of the job, including when the
    /// awaiting request is dropped. A panicking job is reported as
    /// `InferenceError::Worker` instead of unwinding into the caller.
    pub async fn run<F, T, E>(&self, job: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<InferenceError> + Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| InferenceError::Worker("inference pool closed".to_string()))?;

        debug!(
            "Inference job started ({} permits left)",
            self.permits.available_permits()
        );

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        match handle.await {
            Ok(result) => result,
            Err(join_error) => {
                error!("Inference worker failed: {}", join_error);
                Err(InferenceError::Worker(join_error.to_string()).into())
            }
        }
    }
}

impl Default for InferencePool {
    fn default() -> Self {
        Self::new(4)
    }
}
