use relgraph::error::Result;
use relgraph::orm::MemoryStore;
use relgraph::schema::{build_schema, SchemaOptions};
use std::sync::Arc;

/// Run the sdl command: print the generated schema
pub async fn run(config_path: String, query_fields: bool) -> Result<()> {
    tracing::info!("Loading configuration from {}", config_path);
    let config = relgraph::config::load_config(&config_path)?;

    tracing::info!("Mapping {} models...", config.model.len());
    let mapper = config.build_mapper()?;

    let options = SchemaOptions {
        query_fields,
        ..SchemaOptions::default()
    };
    let schema = build_schema(mapper, options, Arc::new(MemoryStore::new()))?;

    println!("{}", schema.sdl());
    Ok(())
}
