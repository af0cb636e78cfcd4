//! List command implementation.

use crate::OutputFormat;
use std::path::Path;
use std::sync::Arc;
use todo_core::{SortDirection, TodoService};
use todo_server::TodoJson;
use todo_store::TodoStore;

/// Runs the list command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    direction: SortDirection,
) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No commit log found at {:?}", path).into());
    }

    let store = Arc::new(TodoStore::open_snapshot(path)?);
    let items = TodoService::new(store).list(direction);

    match format {
        OutputFormat::Json => {
            let todos: Vec<TodoJson> = items.iter().map(TodoJson::from).collect();
            println!("{}", serde_json::to_string_pretty(&todos)?);
        }
        OutputFormat::Text => {
            if items.is_empty() {
                println!("(no items)");
            }
            for item in &items {
                let mark = if item.is_done() { "x" } else { " " };
                println!("{:>4} [{}] {}  {}", item.order, mark, item.value, item.id);
            }
        }
    }

    Ok(())
}
