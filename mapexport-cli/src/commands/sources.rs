//! Sources command - list the available tile sources.

use std::path::Path;

use super::common::load_config;
use crate::error::CliError;

/// Run the sources command.
pub fn run(config_path: Option<&Path>) -> Result<(), CliError> {
    let registry = load_config(config_path)?.registry();

    for (key, source) in registry.iter() {
        println!("{}", key);
        println!("  Name:        {}", source.display_name);
        println!("  URL:         {}", source.url_template);
        if !source.attribution.is_empty() {
            println!("  Attribution: {}", source.attribution);
        }
    }
    Ok(())
}
