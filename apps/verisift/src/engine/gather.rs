//! # Evidence Gatherer
//!
//! Fans a text out to every configured provider at once and collects one
//! `EvidenceResult` per provider, in configuration order.

use crate::adapters::EvidenceProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use verisift_core::EvidenceResult;

pub struct EvidenceGatherer {
    providers: Vec<Arc<dyn EvidenceProvider>>,
    timeout: Duration,
}

impl EvidenceGatherer {
    pub fn new(providers: Vec<Arc<dyn EvidenceProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Search every provider concurrently.
    ///
    /// Returns once each provider has answered, failed or timed out. A
    /// failing provider yields an `ERROR` result in its own slot and never
    /// affects the others. Dropping the returned future aborts every
    /// in-flight search.
    pub async fn gather(&self, text: &str) -> Vec<EvidenceResult> {
        if self.providers.is_empty() {
            return Vec::new();
        }

        let query: Arc<str> = Arc::from(text);
        let mut tasks = JoinSet::new();

        for (slot, provider) in self.providers.iter().enumerate() {
            let provider = Arc::clone(provider);
            let query = Arc::clone(&query);
            let limit = self.timeout;

            tasks.spawn(async move {
                let result = match tokio::time::timeout(limit, provider.search(&query)).await {
                    Ok(result) => result,
                    Err(_) => {
                        let name = provider.name();
                        tracing::warn!(provider = name, "Evidence provider timed out");
                        EvidenceResult::error(
                            name,
                            format!("{} timed out after {}ms", name, limit.as_millis()),
                        )
                    }
                };
                (slot, result)
            });
        }

        let mut slots: Vec<Option<EvidenceResult>> = vec![None; self.providers.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, result)) => {
                    if let Some(entry) = slots.get_mut(slot) {
                        *entry = Some(result);
                    }
                }
                // The slot stays empty and is filled below.
                Err(e) => tracing::warn!(error = %e, "Evidence task did not complete"),
            }
        }

        slots
            .into_iter()
            .zip(&self.providers)
            .map(|(slot, provider)| {
                slot.unwrap_or_else(|| {
                    let name = provider.name();
                    EvidenceResult::error(
                        name,
                        format!("An unexpected error occurred with {name}: search task failed"),
                    )
                })
            })
            .collect()
    }
}
