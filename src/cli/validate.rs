use relgraph::error::{RelgraphError, Result};

/// Run the validate command: construct an input instance from a JSON payload
pub async fn run(config_path: String, input: String, payload: String) -> Result<()> {
    tracing::info!("Loading configuration from {}", config_path);
    let config = relgraph::config::load_config(&config_path)?;

    let mapper = config.build_validating_mapper()?;
    let values = async_graphql::Value::from_json(serde_json::from_str(&payload)?)?;

    let mut instance = mapper.construct(&input, values).or_else(report)?;

    if !instance.is_validated() {
        tracing::info!("Validation postponed, checking {}", input);
        instance.check().or_else(report)?;
    }

    println!("{}", serde_json::to_string_pretty(&instance.to_value().into_json()?)?);
    Ok(())
}

/// Print validation failures once, in their rendered form, and exit non-zero
fn report<T>(err: RelgraphError) -> Result<T> {
    match err {
        RelgraphError::Validation(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
        other => Err(other),
    }
}
