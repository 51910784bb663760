mod common;

use clap::Parser;
use common::*;
use country_borders::core::Pipeline;
use country_borders::{BorderPipeline, CliConfig, EtlEngine, LocalStorage, RunSummary};
use httpmock::prelude::*;
use tempfile::TempDir;

fn cli_config(server: &MockServer, input: &str, output: &str, extra: &[&str]) -> CliConfig {
    let search = server.url("/w/api.php");
    let entity = server.url("/entities/items");
    let mut args = vec![
        "country-borders",
        "--input",
        input,
        "--output-path",
        output,
        "--search-endpoint",
        search.as_str(),
        "--entity-endpoint",
        entity.as_str(),
    ];
    args.extend_from_slice(extra);
    CliConfig::parse_from(args)
}

fn mock_andorra_neighbourhood(server: &MockServer) {
    mock_search(server, "Andorra", Some(("Q228", "Andorra")));
    mock_entity(
        server,
        entity_doc("Q228", "Andorra", &[SOVEREIGN_STATE], &["Q142", "Q29"]),
    );
    mock_entity(
        server,
        entity_doc("Q142", "France", &[SOVEREIGN_STATE, COUNTRY], &["Q228", "Q29", "Q31"]),
    );
    mock_entity(
        server,
        entity_doc("Q29", "Spain", &[SOVEREIGN_STATE, COUNTRY], &["Q228", "Q142", "Q45"]),
    );
}

#[tokio::test]
async fn test_andorra_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("out").to_str().unwrap().to_string();
    let input = write_input(temp_dir.path(), "landlocked.csv", "name\nAndorra\n");

    let server = MockServer::start();
    mock_andorra_neighbourhood(&server);

    let config = cli_config(&server, &input, &output_path, &[]);
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = BorderPipeline::new(storage, config).unwrap();
    let engine = EtlEngine::new(pipeline);

    let result = engine.run().await.unwrap();
    assert!(result.ends_with("bordering_countries.csv"));

    let csv = read_output(temp_dir.path(), "out/bordering_countries.csv");
    assert_eq!(
        csv,
        "name,code,bordering_name,bordering_code\n\
         Andorra,Q228,France,Q142\n\
         Andorra,Q228,Spain,Q29\n"
    );

    let summary: RunSummary =
        serde_json::from_str(&read_output(temp_dir.path(), "out/summary.json")).unwrap();
    assert_eq!(summary.total_names, 1);
    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.edges, 2);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.resolver, "search");
    assert_eq!(summary.border_source, "entity");
}

#[tokio::test]
async fn test_unknown_name_is_excluded_from_output() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let input = write_input(
        temp_dir.path(),
        "countries.csv",
        "landlocked country\nAtlantis\nAndorra\n",
    );

    let server = MockServer::start();
    let atlantis = mock_search(&server, "Atlantis", None);
    mock_andorra_neighbourhood(&server);

    let config = cli_config(
        &server,
        input.as_str(),
        output_path.as_str(),
        &["--column", "landlocked country"],
    );
    let pipeline = BorderPipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();

    let queries = pipeline.extract().await.unwrap();
    let result = pipeline.transform(queries).await.unwrap();

    atlantis.assert();
    assert_eq!(result.rows.len(), 2);
    assert!(result.rows.iter().all(|r| r.name == "Andorra"));
    assert_eq!(result.summary.unresolved, vec!["Atlantis"]);
    assert_eq!(result.summary.resolved, 1);
    assert!(result.summary.failures.is_empty());
}

#[tokio::test]
async fn test_fill_in_drops_non_sovereign_neighbours() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let input = write_input(temp_dir.path(), "countries.csv", "name\nSpain\n");

    let server = MockServer::start();
    mock_search(&server, "Spain", Some(("Q29", "Spain")));
    mock_entity(
        &server,
        entity_doc("Q29", "Spain", &[SOVEREIGN_STATE], &["Q142", "Q1410", "Q27306"]),
    );
    mock_entity(&server, entity_doc("Q142", "France", &[SOVEREIGN_STATE], &["Q29"]));
    let gibraltar = mock_entity(&server, entity_doc("Q1410", "Gibraltar", &["Q46395"], &["Q29"]));
    mock_entity(
        &server,
        entity_doc("Q27306", "Crown of Castile", &[COUNTRY, "Q3024240"], &[]),
    );

    let config = cli_config(&server, &input, &output_path, &[]);
    let pipeline = BorderPipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();
    let result = pipeline
        .transform(pipeline.extract().await.unwrap())
        .await
        .unwrap();

    gibraltar.assert_hits(1);
    let codes: Vec<&str> = result.rows.iter().map(|r| r.bordering_code.as_str()).collect();
    assert_eq!(codes, vec!["Q142"]);
}

#[tokio::test]
async fn test_symmetry_is_not_enforced_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let input = write_input(temp_dir.path(), "countries.csv", "name\nAndorra\nSpain\n");

    let server = MockServer::start();
    mock_search(&server, "Andorra", Some(("Q228", "Andorra")));
    mock_search(&server, "Spain", Some(("Q29", "Spain")));
    mock_entity(&server, entity_doc("Q228", "Andorra", &[SOVEREIGN_STATE], &["Q29"]));
    // Spain's document does not list Andorra back
    mock_entity(&server, entity_doc("Q29", "Spain", &[SOVEREIGN_STATE], &["Q142"]));
    mock_entity(&server, entity_doc("Q142", "France", &[SOVEREIGN_STATE], &[]));

    let raw = cli_config(&server, &input, &output_path, &[]);
    let pipeline = BorderPipeline::new(LocalStorage::new(output_path.clone()), raw).unwrap();
    let result = pipeline
        .transform(pipeline.extract().await.unwrap())
        .await
        .unwrap();
    let pairs: Vec<(&str, &str)> = result
        .rows
        .iter()
        .map(|r| (r.code.as_str(), r.bordering_code.as_str()))
        .collect();
    assert_eq!(pairs, vec![("Q228", "Q29"), ("Q29", "Q142")]);

    let symmetric = cli_config(
        &server,
        input.as_str(),
        output_path.as_str(),
        &["--border-policy", "symmetric"],
    );
    let pipeline = BorderPipeline::new(LocalStorage::new(output_path.clone()), symmetric).unwrap();
    let result = pipeline
        .transform(pipeline.extract().await.unwrap())
        .await
        .unwrap();
    let pairs: Vec<(&str, &str)> = result
        .rows
        .iter()
        .map(|r| (r.code.as_str(), r.bordering_code.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("Q228", "Q29"), ("Q29", "Q142"), ("Q29", "Q228")]
    );
    assert_eq!(result.rows[2].bordering_name.as_deref(), Some("Andorra"));
}

#[tokio::test]
async fn test_empty_input_writes_header_only_files() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let input = write_input(temp_dir.path(), "countries.csv", "name\n");

    let server = MockServer::start();
    let config = cli_config(&server, &input, &output_path, &["--format", "csv,tsv"]);
    let pipeline = BorderPipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();

    EtlEngine::new(pipeline).run().await.unwrap();

    assert_eq!(
        read_output(temp_dir.path(), "bordering_countries.csv"),
        "name,code,bordering_name,bordering_code\n"
    );
    assert_eq!(
        read_output(temp_dir.path(), "bordering_countries.tsv"),
        "name\tcode\tbordering_name\tbordering_code\n"
    );
}

#[tokio::test]
async fn test_concurrent_requests_keep_input_order() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let input = write_input(
        temp_dir.path(),
        "countries.csv",
        "name\nAndorra\nFrance\nSpain\n",
    );

    let server = MockServer::start();
    mock_andorra_neighbourhood(&server);
    mock_search(&server, "France", Some(("Q142", "France")));
    mock_search(&server, "Spain", Some(("Q29", "Spain")));
    mock_entity(&server, entity_doc("Q31", "Belgium", &[SOVEREIGN_STATE], &["Q142"]));
    mock_entity(&server, entity_doc("Q45", "Portugal", &[SOVEREIGN_STATE], &["Q29"]));

    let config = cli_config(
        &server,
        input.as_str(),
        output_path.as_str(),
        &["--concurrent-requests", "4"],
    );
    let pipeline = BorderPipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();
    let result = pipeline
        .transform(pipeline.extract().await.unwrap())
        .await
        .unwrap();

    let names: Vec<&str> = result.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Andorra", "Andorra", "France", "France", "France", "Spain", "Spain", "Spain"]
    );
    let france: Vec<(&str, Option<&str>)> = result
        .rows
        .iter()
        .filter(|r| r.name == "France")
        .map(|r| (r.bordering_code.as_str(), r.bordering_name.as_deref()))
        .collect();
    assert_eq!(
        france,
        vec![
            ("Q228", Some("Andorra")),
            ("Q29", Some("Spain")),
            ("Q31", Some("Belgium"))
        ]
    );
}
