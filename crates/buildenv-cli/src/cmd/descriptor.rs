use anyhow::{Context, Result};
use buildenv_core::CompilerTarget;
use buildenv_core::descriptor::resolve;

/// Print the resolved build descriptor as JSON
pub fn descriptor(target: &CompilerTarget) -> Result<()> {
    let descriptor = resolve(target);
    let json =
        serde_json::to_string_pretty(&descriptor).context("Failed to serialize descriptor")?;
    println!("{json}");
    Ok(())
}
