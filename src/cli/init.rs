use relgraph::error::{RelgraphError, Result};

/// Run the init command: write the example configuration and, optionally, its data
pub async fn run(output: Option<String>, data: Option<String>) -> Result<()> {
    tracing::info!("Generating example configuration...");
    let config = crate::cli::example::create_example_config();

    tracing::info!("Created {} example models:", config.model.len());
    for model in &config.model {
        match &model.parent {
            Some(parent) => tracing::info!("   {} ({}, inherits {})", model.name, model.table, parent),
            None => tracing::info!("   {} ({})", model.name, model.table),
        }
    }

    // Output to stdout or file
    let wrote_to_file = if let Some(output_path) = &output {
        relgraph::config::save_config(&config, output_path)?;
        tracing::info!("Generated example configuration: {}", output_path);
        true
    } else {
        let toml_string = toml::to_string_pretty(&config)?;
        println!("{}", toml_string);
        false
    };

    if let Some(data_path) = &data {
        let json = serde_json::to_string_pretty(&crate::cli::example::create_example_data())?;
        std::fs::write(data_path, json)
            .map_err(|e| RelgraphError::Config(format!("Failed to write data file '{}': {}", data_path, e)))?;
        tracing::info!("Generated example data: {}", data_path);
    }

    tracing::info!("Next steps:");
    if wrote_to_file {
        tracing::info!("   1. Print the schema with 'relgraph sdl --config <file>'");
        tracing::info!("   2. Query it with 'relgraph query --config <file> --data <data file> <query>'");
    } else {
        tracing::info!("   1. Save the configuration to a file: relgraph init --output relgraph.toml --data data.json");
        tracing::info!("   2. Print the schema with 'relgraph sdl'");
    }

    Ok(())
}
