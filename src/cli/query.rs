use relgraph::error::{RelgraphError, Result};
use relgraph::orm::MemoryStore;
use relgraph::schema::{build_schema, SchemaOptions};
use std::sync::Arc;

/// Run the query command: execute one GraphQL query against JSON data
pub async fn run(config_path: String, data_path: String, query: String) -> Result<()> {
    tracing::info!("Loading configuration from {}", config_path);
    let config = relgraph::config::load_config(&config_path)?;

    let contents = std::fs::read_to_string(&data_path)
        .map_err(|e| RelgraphError::Loader(format!("Failed to read data file '{}': {}", data_path, e)))?;
    let store = MemoryStore::from_json(serde_json::from_str(&contents)?)?;

    let schema = build_schema(config.build_mapper()?, SchemaOptions::default(), Arc::new(store))?;

    tracing::debug!("Executing query: {}", query);
    let response = schema.execute(query.as_str()).await;
    for error in &response.errors {
        tracing::warn!("Query error: {}", error.message);
    }

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
