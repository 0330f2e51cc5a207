//! Status command handler

use anyhow::Result;

use plume_core::{ListFilter, Store};

use crate::output::{Output, OutputFormat};

/// Show status information
pub async fn show(store: &Store, output: &Output) -> Result<()> {
    let config = store.config();
    let total = store.count().await;
    let active = store
        .list(&ListFilter {
            active: Some(true),
            tag: None,
        })
        .await
        .len();
    let archived = total - active;
    let data_file = config.documents_path();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_file": data_file,
                    "author": config.author_name(),
                    "counts": {
                        "total": total,
                        "active": active,
                        "archived": archived
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", total);
        }
        OutputFormat::Human => {
            println!("Plume Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Collection: {}", data_file.display());
            println!("  Author:     {}", config.author_name());
            println!();
            println!("Documents:");
            println!("  Active:   {}", active);
            println!("  Archived: {}", archived);
            println!("  Total:    {}", total);
        }
    }

    Ok(())
}
