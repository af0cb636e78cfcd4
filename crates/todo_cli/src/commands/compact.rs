//! Compact command implementation.

use std::path::Path;
use todo_store::TodoStore;

/// Runs the compact command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No commit log found at {:?}", path).into());
    }

    println!("Compacting commit log at {:?}", path);

    let store = TodoStore::open(path)?;
    let before = store.stats()?;
    let reclaimed = store.compact()?;
    let after = store.stats()?;

    println!("  Live items:  {}", after.items);
    println!("  Size before: {} bytes", before.log_bytes);
    println!("  Size after:  {} bytes", after.log_bytes);
    println!("  Reclaimed:   {} bytes", reclaimed);

    Ok(())
}
