use crate::adapters::http::{CacheKey, WikidataClient};
use crate::core::{BorderFetcher, CountryResolver};
use crate::domain::model::{
    is_entity_id, EntityInfo, EntityMatch, Neighbor, HISTORICAL_COUNTRY, INSTANCE_OF,
    SHARES_BORDER_WITH, SOVEREIGN_STATE,
};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

const PREFIXES: &str = "PREFIX wd: <http://www.wikidata.org/entity/>
PREFIX wdt: <http://www.wikidata.org/prop/direct/>
PREFIX wikibase: <http://wikiba.se/ontology#>
PREFIX bd: <http://www.bigdata.com/rdf#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
";

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<HashMap<String, SparqlValue>>,
}

#[derive(Debug, Deserialize)]
struct SparqlValue {
    value: String,
}

type Binding = HashMap<String, SparqlValue>;

/// Escapes a string for use inside a double-quoted SPARQL literal.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// `http://www.wikidata.org/entity/Q228` -> `Q228`
fn entity_id_from_uri(uri: &str) -> Option<&str> {
    uri.rsplit('/').next().filter(|id| is_entity_id(id))
}

fn sanitize_language(language: &str) -> String {
    language
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

fn resolve_query(name: &str, language: &str) -> String {
    format!(
        r#"{PREFIXES}
SELECT ?country ?countryLabel ?countryDescription WHERE {{
  ?country rdfs:label "{name}"@{language} ;
           wdt:{INSTANCE_OF} wd:{SOVEREIGN_STATE} .
  FILTER NOT EXISTS {{ ?country wdt:{INSTANCE_OF} wd:{HISTORICAL_COUNTRY} . }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "{language}". }}
}}
LIMIT 1
"#,
        name = escape_literal(name),
        language = language,
    )
}

fn borders_query(id: &str, language: &str) -> String {
    format!(
        r#"{PREFIXES}
SELECT DISTINCT ?border ?borderLabel WHERE {{
  wd:{id} wdt:{SHARES_BORDER_WITH} ?border .
  ?border wdt:{INSTANCE_OF} wd:{SOVEREIGN_STATE} .
  FILTER NOT EXISTS {{ ?border wdt:{INSTANCE_OF} wd:{HISTORICAL_COUNTRY} . }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "{language}". }}
}}
"#
    )
}

fn describe_query(id: &str, language: &str) -> String {
    format!(
        r#"{PREFIXES}
SELECT ?itemLabel ?class WHERE {{
  BIND(wd:{id} AS ?item)
  OPTIONAL {{ ?item wdt:{INSTANCE_OF} ?class . }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "{language}". }}
}}
"#
    )
}

/// The label service echoes the id when no label exists in the language.
fn label_of(binding: &Binding, variable: &str, id: &str) -> Option<String> {
    binding
        .get(variable)
        .map(|v| v.value.clone())
        .filter(|label| label != id)
}

/// Query endpoint shared by the SPARQL resolver and border fetcher.
#[derive(Clone)]
pub struct SparqlEndpoint {
    client: WikidataClient,
    endpoint: String,
    language: String,
}

impl SparqlEndpoint {
    pub fn new(client: WikidataClient, endpoint: &str, language: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            language: sanitize_language(language),
        }
    }

    async fn select(&self, query: &str, cache_key: CacheKey) -> Result<Vec<Binding>> {
        self.client
            .sparql(&self.endpoint, query, cache_key, |body| {
                serde_json::from_value::<SparqlResponse>(body)
                    .map(|response| response.results.bindings)
                    .map_err(|e| {
                        EtlError::malformed(
                            &self.endpoint,
                            format!("unexpected SPARQL payload: {}", e),
                        )
                    })
            })
            .await
    }

    fn entity_id(&self, binding: &Binding, variable: &str) -> Result<String> {
        let uri = binding.get(variable).map(|v| v.value.as_str()).ok_or_else(|| {
            EtlError::malformed(&self.endpoint, format!("binding without ?{}", variable))
        })?;
        entity_id_from_uri(uri)
            .map(str::to_string)
            .ok_or_else(|| EtlError::malformed(&self.endpoint, format!("'{}' is not an item", uri)))
    }

    fn checked_id<'a>(&self, id: &'a str) -> Result<&'a str> {
        if is_entity_id(id) {
            Ok(id)
        } else {
            Err(EtlError::ValidationError {
                message: format!("'{}' is not an item id", id),
            })
        }
    }
}

/// Exact-label lookup restricted to sovereign, non-historical states.
pub struct SparqlResolver {
    endpoint: SparqlEndpoint,
}

impl SparqlResolver {
    pub fn new(endpoint: SparqlEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl CountryResolver for SparqlResolver {
    async fn resolve(&self, name: &str) -> Result<Option<EntityMatch>> {
        let ep = &self.endpoint;
        let bindings = ep
            .select(
                &resolve_query(name, &ep.language),
                CacheKey::new("sparql-resolve", format!("{}:{}", ep.language, name)),
            )
            .await?;

        let Some(binding) = bindings.into_iter().next() else {
            return Ok(None);
        };

        let id = ep.entity_id(&binding, "country")?;
        let label = label_of(&binding, "countryLabel", &id).unwrap_or_else(|| name.to_string());
        let description = binding.get("countryDescription").map(|v| v.value.clone());

        Ok(Some(EntityMatch {
            id,
            label,
            description,
        }))
    }
}

/// P47 neighbours already filtered and labelled by the query.
pub struct SparqlBorderFetcher {
    endpoint: SparqlEndpoint,
}

impl SparqlBorderFetcher {
    pub fn new(endpoint: SparqlEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl BorderFetcher for SparqlBorderFetcher {
    async fn neighbors(&self, id: &str) -> Result<Vec<Neighbor>> {
        let ep = &self.endpoint;
        let id = ep.checked_id(id)?;
        let bindings = ep
            .select(
                &borders_query(id, &ep.language),
                CacheKey::new("sparql-borders", format!("{}:{}", ep.language, id)),
            )
            .await?;

        bindings
            .iter()
            .map(|binding| {
                let border = ep.entity_id(binding, "border")?;
                let label = label_of(binding, "borderLabel", &border);
                Ok(Neighbor { id: border, label })
            })
            .collect()
    }

    async fn describe(&self, id: &str) -> Result<EntityInfo> {
        let ep = &self.endpoint;
        let id = ep.checked_id(id)?;
        let bindings = ep
            .select(
                &describe_query(id, &ep.language),
                CacheKey::new("sparql-describe", format!("{}:{}", ep.language, id)),
            )
            .await?;

        let label = bindings
            .first()
            .and_then(|binding| label_of(binding, "itemLabel", id));
        let instance_of = bindings
            .iter()
            .filter_map(|binding| binding.get("class"))
            .filter_map(|class| entity_id_from_uri(&class.value))
            .map(str::to_string)
            .collect();

        Ok(EntityInfo {
            id: id.to_string(),
            label,
            instance_of,
        })
    }

    fn needs_fill_in(&self) -> bool {
        false
    }
}
