use crate::core::{BorderEdge, BorderingPair, ResolvedCountry};
use crate::domain::model::JoinMode;
use std::collections::{HashMap, HashSet};

/// Joins resolved countries with border edges on `canonical_id == source_id`.
///
/// The neighbour name is the input name of the neighbour when it was resolved
/// from the input, else its knowledge-base label, else unknown. `Inner` drops
/// rows with an unknown neighbour name. Unresolved inputs produce no rows, and
/// names resolving to an id already joined (aliases) add none either: the
/// first input name owns the id.
pub fn join_borders(
    resolved: &[ResolvedCountry],
    edges: &[BorderEdge],
    labels: &HashMap<String, String>,
    mode: JoinMode,
) -> Vec<BorderingPair> {
    let mut edges_by_source: HashMap<&str, Vec<&BorderEdge>> = HashMap::new();
    for edge in edges {
        edges_by_source
            .entry(edge.source_id.as_str())
            .or_default()
            .push(edge);
    }

    let mut input_names: HashMap<&str, &str> = HashMap::new();
    for country in resolved {
        if let Some(id) = &country.canonical_id {
            input_names
                .entry(id.as_str())
                .or_insert(country.query_name.as_str());
        }
    }

    let mut rows = Vec::new();
    let mut joined: HashSet<&str> = HashSet::new();
    for country in resolved {
        let Some(code) = &country.canonical_id else {
            continue;
        };
        if !joined.insert(code.as_str()) {
            tracing::debug!(
                "'{}' is an alias of '{}' ({})",
                country.query_name,
                input_names.get(code.as_str()).copied().unwrap_or_default(),
                code
            );
            continue;
        }
        let Some(country_edges) = edges_by_source.get(code.as_str()) else {
            continue;
        };

        for edge in country_edges {
            let bordering_name = input_names
                .get(edge.target_id.as_str())
                .map(|name| name.to_string())
                .or_else(|| labels.get(&edge.target_id).cloned());

            if mode == JoinMode::Inner && bordering_name.is_none() {
                continue;
            }

            rows.push(BorderingPair {
                name: country.query_name.clone(),
                code: code.clone(),
                bordering_name,
                bordering_code: edge.target_id.clone(),
            });
        }
    }

    rows
}
