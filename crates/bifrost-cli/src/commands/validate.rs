//! Suite validation command

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use bifrost_eval::SuiteLoader;

use crate::console::CliConsole;

/// Load a suite and print what it contains
pub fn validate(path: &Path) -> Result<()> {
    let suite = SuiteLoader::new().load_file(path)?;

    let tags: BTreeSet<&str> = suite
        .tags
        .iter()
        .chain(suite.scenarios.iter().flat_map(|s| s.tags.iter()))
        .map(String::as_str)
        .collect();

    println!("Valid suite: {}", suite.name);
    if !suite.description.is_empty() {
        println!("Description: {}", suite.description);
    }
    println!("Scenarios: {}", suite.len());
    if tags.is_empty() {
        println!("Tags: (none)");
    } else {
        println!("Tags: {}", tags.into_iter().collect::<Vec<_>>().join(", "));
    }

    CliConsole::new(false).success(&format!("{} is valid", path.display()));
    Ok(())
}
