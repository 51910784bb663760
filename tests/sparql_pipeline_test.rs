mod common;

use clap::Parser;
use common::*;
use country_borders::core::Pipeline;
use country_borders::{BorderPipeline, CliConfig, EtlEngine, LocalStorage, RunSummary};
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::json;
use tempfile::TempDir;

fn sparql_config(server: &MockServer, input: &str, output: &str, extra: &[&str]) -> CliConfig {
    let mut args = vec!["--resolver", "sparql"];
    args.extend_from_slice(extra);
    borders_config(server, input, output, &args)
}

fn borders_config(server: &MockServer, input: &str, output: &str, extra: &[&str]) -> CliConfig {
    let sparql = server.url("/sparql");
    let mut args = vec![
        "country-borders",
        "--input",
        input,
        "--output-path",
        output,
        "--borders",
        "sparql",
        "--sparql-endpoint",
        sparql.as_str(),
    ];
    args.extend_from_slice(extra);
    CliConfig::parse_from(args)
}

fn mock_resolve<'a>(server: &'a MockServer, name: &str, id: Option<&str>) -> Mock<'a> {
    let rows = match id {
        Some(id) => vec![json!({
            "country": uri(id),
            "countryLabel": literal(name),
            "countryDescription": literal("sovereign state")
        })],
        None => vec![],
    };
    server.mock(|when, then| {
        when.method(POST)
            .path("/sparql")
            .header("Content-Type", "application/sparql-query")
            .body_contains(format!("rdfs:label \"{}\"@en", name));
        then.status(200)
            .header("Content-Type", "application/sparql-results+json")
            .json_body(sparql_bindings(rows));
    })
}

fn mock_borders<'a>(server: &'a MockServer, id: &str, borders: &[(&str, &str)]) -> Mock<'a> {
    let rows = borders
        .iter()
        .map(|(border, label)| json!({"border": uri(border), "borderLabel": literal(label)}))
        .collect();
    server.mock(|when, then| {
        when.method(POST)
            .path("/sparql")
            .body_contains(format!("wd:{} wdt:P47", id));
        then.status(200)
            .header("Content-Type", "application/sparql-results+json")
            .json_body(sparql_bindings(rows));
    })
}

fn mock_describe<'a>(server: &'a MockServer, id: &str, label: &str, classes: &[&str]) -> Mock<'a> {
    let rows = classes
        .iter()
        .map(|class| json!({"itemLabel": literal(label), "class": uri(class)}))
        .collect();
    server.mock(|when, then| {
        when.method(POST)
            .path("/sparql")
            .body_contains(format!("BIND(wd:{} AS ?item)", id));
        then.status(200)
            .header("Content-Type", "application/sparql-results+json")
            .json_body(sparql_bindings(rows));
    })
}

#[tokio::test]
async fn test_andorra_via_sparql() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let input = write_input(temp_dir.path(), "countries.csv", "name\nAndorra\n");

    let server = MockServer::start();
    let resolve = mock_resolve(&server, "Andorra", Some("Q228"));
    let borders = mock_borders(&server, "Q228", &[("Q142", "France"), ("Q29", "Spain")]);

    let config = sparql_config(&server, &input, &output_path, &[]);
    let pipeline = BorderPipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();
    EtlEngine::new(pipeline).run().await.unwrap();

    resolve.assert_hits(1);
    borders.assert_hits(1);
    assert_eq!(
        read_output(temp_dir.path(), "bordering_countries.csv"),
        "name,code,bordering_name,bordering_code\n\
         Andorra,Q228,France,Q142\n\
         Andorra,Q228,Spain,Q29\n"
    );

    let summary: RunSummary =
        serde_json::from_str(&read_output(temp_dir.path(), "summary.json")).unwrap();
    assert_eq!(summary.resolver, "sparql");
    assert_eq!(summary.border_source, "sparql");
    assert_eq!(summary.rows, 2);
}

#[tokio::test]
async fn test_sparql_miss_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let input = write_input(temp_dir.path(), "countries.csv", "name\nPrussia\n");

    let server = MockServer::start();
    mock_resolve(&server, "Prussia", None);

    let config = sparql_config(&server, &input, &output_path, &[]);
    let pipeline = BorderPipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();
    let result = pipeline
        .transform(pipeline.extract().await.unwrap())
        .await
        .unwrap();

    assert!(result.rows.is_empty());
    assert_eq!(result.summary.unresolved, vec!["Prussia"]);
}

#[tokio::test]
async fn test_mixed_strategies_search_then_sparql_borders() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let input = write_input(temp_dir.path(), "countries.tsv", "id\tname\n1\tAndorra\n");

    let server = MockServer::start();
    let search = mock_search(&server, "Andorra", Some(("Q228", "Andorra")));
    mock_borders(&server, "Q228", &[("Q142", "France"), ("Q29", "Spain")]);

    let search_endpoint = server.url("/w/api.php");
    let config = borders_config(
        &server,
        &input,
        &output_path,
        &["--search-endpoint", search_endpoint.as_str()],
    );
    let pipeline = BorderPipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();
    let result = pipeline
        .transform(pipeline.extract().await.unwrap())
        .await
        .unwrap();

    search.assert();
    let codes: Vec<&str> = result.rows.iter().map(|r| r.bordering_code.as_str()).collect();
    assert_eq!(codes, vec!["Q142", "Q29"]);
    assert_eq!(result.summary.resolver, "search");
}

#[tokio::test]
async fn test_dedup_and_symmetric_policies() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let input = write_input(temp_dir.path(), "countries.csv", "name\nAndorra\nSpain\n");

    let server = MockServer::start();
    mock_resolve(&server, "Andorra", Some("Q228"));
    mock_resolve(&server, "Spain", Some("Q29"));
    mock_borders(&server, "Q228", &[("Q29", "Spain"), ("Q29", "Spain")]);
    mock_borders(&server, "Q29", &[("Q142", "France")]);
    let describe_andorra = mock_describe(&server, "Q228", "Andorra", &[SOVEREIGN_STATE]);
    mock_describe(&server, "Q29", "Spain", &[SOVEREIGN_STATE, COUNTRY]);

    let run = |policy: &'static str| {
        let config = sparql_config(&server, &input, &output_path, &["--border-policy", policy]);
        let storage = LocalStorage::new(output_path.clone());
        async move {
            let pipeline = BorderPipeline::new(storage, config).unwrap();
            let result = pipeline
                .transform(pipeline.extract().await.unwrap())
                .await
                .unwrap();
            result
                .rows
                .iter()
                .map(|r| format!("{}->{}", r.code, r.bordering_code))
                .collect::<Vec<_>>()
        }
    };

    assert_eq!(run("raw").await, vec!["Q228->Q29", "Q228->Q29", "Q29->Q142"]);
    assert_eq!(run("dedup").await, vec!["Q228->Q29", "Q29->Q142"]);
    assert_eq!(
        run("symmetric").await,
        vec!["Q228->Q29", "Q29->Q142", "Q29->Q228"]
    );
    describe_andorra.assert_hits(1);
}

#[tokio::test]
async fn test_symmetric_policy_never_adds_non_sovereign_neighbours() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let input = write_input(temp_dir.path(), "countries.csv", "name\nSpain\nGibraltar\n");

    let server = MockServer::start();
    mock_search(&server, "Spain", Some(("Q29", "Spain")));
    mock_search(&server, "Gibraltar", Some(("Q1410", "Gibraltar")));
    mock_borders(&server, "Q29", &[("Q142", "France")]);
    mock_borders(&server, "Q1410", &[("Q29", "Spain")]);
    mock_describe(&server, "Q29", "Spain", &[SOVEREIGN_STATE]);
    mock_describe(&server, "Q1410", "Gibraltar", &["Q46395"]);

    let search_endpoint = server.url("/w/api.php");
    let config = borders_config(
        &server,
        &input,
        &output_path,
        &[
            "--search-endpoint",
            search_endpoint.as_str(),
            "--border-policy",
            "symmetric",
        ],
    );
    let pipeline = BorderPipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();
    let result = pipeline
        .transform(pipeline.extract().await.unwrap())
        .await
        .unwrap();

    let pairs: Vec<(&str, &str)> = result
        .rows
        .iter()
        .map(|r| (r.code.as_str(), r.bordering_code.as_str()))
        .collect();
    assert_eq!(pairs, vec![("Q29", "Q142"), ("Q1410", "Q29")]);
}
