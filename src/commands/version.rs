use crate::core::parser::FamilyRegistry;
use anyhow::Result;
use colored::Colorize;

pub fn execute() -> Result<()> {
    println!("{} {}", "sargraph version".bold(), env!("CARGO_PKG_VERSION"));
    let families = FamilyRegistry::with_defaults();
    println!("Report families: {}", families.family_names().join(", ").cyan());
    Ok(())
}
