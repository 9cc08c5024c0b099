use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("thermal-hub version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
