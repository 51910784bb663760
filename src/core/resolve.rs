use crate::core::fanout::fan_out;
use crate::core::{CountryQuery, CountryResolver, ResolvedCountry};
use crate::domain::model::{FailurePolicy, LookupFailure};
use crate::utils::error::Result;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ResolveOutcome {
    /// One entry per input name, in input order.
    pub resolved: Vec<ResolvedCountry>,
    pub failures: Vec<LookupFailure>,
}

impl ResolveOutcome {
    pub fn resolved_count(&self) -> usize {
        self.resolved.iter().filter(|c| c.is_resolved()).count()
    }

    pub fn unresolved_names(&self) -> Vec<String> {
        self.resolved
            .iter()
            .filter(|c| !c.is_resolved())
            .map(|c| c.query_name.clone())
            .collect()
    }
}

/// Resolves every query. A miss yields an unresolved entry; a failed lookup
/// either aborts the batch or is recorded, depending on `policy`.
pub async fn resolve_countries(
    resolver: Arc<dyn CountryResolver>,
    queries: Vec<CountryQuery>,
    concurrent_requests: usize,
    policy: FailurePolicy,
) -> Result<ResolveOutcome> {
    let total = queries.len();
    tracing::info!("🔎 Resolving {} country names", total);

    let names: Vec<String> = queries.into_iter().map(|q| q.name).collect();
    let results = fan_out(names, concurrent_requests, policy, move |name: String| {
        let resolver = Arc::clone(&resolver);
        async move { resolver.resolve(&name).await }
    })
    .await?;

    let mut outcome = ResolveOutcome::default();
    for (name, result) in results {
        match result {
            Ok(Some(hit)) => {
                tracing::debug!("'{}' -> {} ({})", name, hit.id, hit.label);
                outcome.resolved.push(ResolvedCountry::found(name, hit));
            }
            Ok(None) => {
                tracing::warn!("⚠️  No match for '{}'", name);
                outcome.resolved.push(ResolvedCountry::not_found(name));
            }
            Err(e) => {
                tracing::warn!("⚠️  Lookup for '{}' failed: {}", name, e);
                outcome.failures.push(LookupFailure {
                    key: name.clone(),
                    stage: "resolve".to_string(),
                    message: e.to_string(),
                });
                outcome.resolved.push(ResolvedCountry::not_found(name));
            }
        }
    }

    tracing::info!(
        "✅ Resolved {}/{} names",
        outcome.resolved_count(),
        total
    );
    Ok(outcome)
}
