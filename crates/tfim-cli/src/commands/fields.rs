//! Fields command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use super::common::{format_field, load_config};

/// Execute the fields command.
pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, None, false, false)?;
    let sweep = config.field_sweep()?;

    let source = if config.fields.is_some() {
        "from configuration"
    } else {
        "default"
    };
    println!(
        "{} {} field values ({source}):\n",
        style("→").cyan().bold(),
        sweep.len()
    );
    for (index, &h) in sweep.values().iter().enumerate() {
        println!("  {:>2}  {}", style(index).dim(), format_field(h));
    }

    Ok(())
}
