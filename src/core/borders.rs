use crate::core::fanout::fan_out;
use crate::core::{BorderEdge, BorderFetcher, ResolvedCountry};
use crate::domain::model::{BorderPolicy, FailurePolicy, LookupFailure, Neighbor};
use crate::utils::error::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct BorderOutcome {
    pub edges: Vec<BorderEdge>,
    /// Knowledge-base labels of border targets, by id.
    pub labels: HashMap<String, String>,
    pub failures: Vec<LookupFailure>,
    /// Entities fetched by the fill-in pass because they were not in the input.
    pub filled_in: usize,
}

/// Fetches the border relation of every resolved country.
///
/// When the fetcher returns raw targets, a second pass describes every
/// distinct target so that only sovereign states are kept and their labels
/// become known. Under [`BorderPolicy::Symmetric`] the input countries are
/// described as well, since a reverse edge makes them someone's neighbour.
/// The edge list is then shaped by `border_policy`.
pub async fn collect_borders(
    fetcher: Arc<dyn BorderFetcher>,
    resolved: &[ResolvedCountry],
    concurrent_requests: usize,
    failure_policy: FailurePolicy,
    border_policy: BorderPolicy,
) -> Result<BorderOutcome> {
    let mut seen = HashSet::new();
    let source_ids: Vec<String> = resolved
        .iter()
        .filter_map(|c| c.canonical_id.clone())
        .filter(|id| seen.insert(id.clone()))
        .collect();

    tracing::info!("🧭 Fetching borders of {} countries", source_ids.len());

    let fetch = Arc::clone(&fetcher);
    let results = fan_out(
        source_ids.clone(),
        concurrent_requests,
        failure_policy,
        move |id: String| {
            let fetcher = Arc::clone(&fetch);
            async move { fetcher.neighbors(&id).await }
        },
    )
    .await?;

    let mut outcome = BorderOutcome::default();
    let mut raw: Vec<(String, Neighbor)> = Vec::new();
    for (id, result) in results {
        match result {
            Ok(neighbors) => {
                if neighbors.is_empty() {
                    tracing::debug!("{} has no recorded borders", id);
                }
                raw.extend(neighbors.into_iter().map(|n| (id.clone(), n)));
            }
            Err(e) => {
                tracing::warn!("⚠️  Border lookup for {} failed: {}", id, e);
                outcome.failures.push(failure(&id, "borders", &e.to_string()));
            }
        }
    }

    let known: HashSet<&str> = source_ids.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut to_classify: Vec<String> = Vec::new();
    if fetcher.needs_fill_in() {
        to_classify.extend(
            raw.iter()
                .map(|(_, n)| n.id.clone())
                .filter(|id| seen.insert(id.clone())),
        );
        outcome.filled_in = to_classify
            .iter()
            .filter(|id| !known.contains(id.as_str()))
            .count();
    }
    if border_policy == BorderPolicy::Symmetric {
        // 反向邊只能指向主權國家
        to_classify.extend(
            source_ids
                .iter()
                .cloned()
                .filter(|id| seen.insert(id.clone())),
        );
    }

    let mut sovereign = HashSet::new();
    if !to_classify.is_empty() {
        tracing::info!(
            "🧩 Classifying {} entities ({} not in the input)",
            to_classify.len(),
            outcome.filled_in
        );

        let fetch = Arc::clone(&fetcher);
        let described = fan_out(to_classify, concurrent_requests, failure_policy, move |id: String| {
            let fetcher = Arc::clone(&fetch);
            async move { fetcher.describe(&id).await }
        })
        .await?;

        for (id, result) in described {
            match result {
                Ok(info) => {
                    if let Some(label) = info.label.clone() {
                        outcome.labels.insert(id.clone(), label);
                    }
                    if info.is_sovereign_state() {
                        sovereign.insert(id);
                    }
                }
                Err(e) => {
                    tracing::warn!("⚠️  Classification of {} failed: {}", id, e);
                    outcome.failures.push(failure(&id, "fill-in", &e.to_string()));
                }
            }
        }
    }

    let mut edges = Vec::with_capacity(raw.len());
    for (source, neighbor) in raw {
        if fetcher.needs_fill_in() && !sovereign.contains(&neighbor.id) {
            tracing::debug!("Dropping {} -> {} (not a sovereign state)", source, neighbor.id);
            continue;
        }
        if let Some(label) = neighbor.label {
            outcome.labels.insert(neighbor.id.clone(), label);
        }
        edges.push(BorderEdge::new(source, neighbor.id));
    }

    let sovereign_sources: HashSet<&str> = known
        .iter()
        .copied()
        .filter(|id| sovereign.contains(*id))
        .collect();
    outcome.edges = apply_border_policy(edges, border_policy, &sovereign_sources);

    tracing::info!("✅ Collected {} border edges", outcome.edges.len());
    Ok(outcome)
}

fn failure(key: &str, stage: &str, message: &str) -> LookupFailure {
    LookupFailure {
        key: key.to_string(),
        stage: stage.to_string(),
        message: message.to_string(),
    }
}

/// Shapes the edge list.
///
/// `sovereign_sources` are the ids resolved from the input that classified as
/// sovereign states; `Symmetric` only adds reverse edges between two of them.
pub fn apply_border_policy(
    edges: Vec<BorderEdge>,
    policy: BorderPolicy,
    sovereign_sources: &HashSet<&str>,
) -> Vec<BorderEdge> {
    match policy {
        BorderPolicy::Raw => edges,
        BorderPolicy::Dedup => dedup(edges),
        BorderPolicy::Symmetric => {
            let mut all = edges.clone();
            for edge in &edges {
                if sovereign_sources.contains(edge.target_id.as_str())
                    && sovereign_sources.contains(edge.source_id.as_str())
                {
                    all.push(BorderEdge::new(&edge.target_id, &edge.source_id));
                }
            }
            dedup(all)
        }
    }
}

fn dedup(edges: Vec<BorderEdge>) -> Vec<BorderEdge> {
    let mut seen = HashSet::new();
    edges
        .into_iter()
        .filter(|edge| seen.insert(edge.clone()))
        .collect()
}
