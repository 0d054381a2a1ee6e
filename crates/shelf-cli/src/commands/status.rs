//! Status command handler

use std::path::Path;

use anyhow::Result;

use shelf_core::{Catalog, Config};

use crate::output::{Output, OutputFormat};

/// Show where the library lives and what it holds
pub fn show(catalog: &Catalog, config: &Config, config_path: &Path, output: &Output) -> Result<()> {
    let file = catalog.file();
    let size = file.size_on_disk();
    let stats = catalog.statistics();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "library_file": file.path(),
                    "config_file": config_path,
                    "storage": {
                        "exists": file.exists(),
                        "size": size,
                    },
                    "counts": {
                        "books": stats.total,
                        "read": stats.read_count,
                        "unread": stats.unread_count
                    },
                    "min_year": config.min_year
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", file.path().display());
        }
        OutputFormat::Human => {
            println!("Shelf Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Library: {}", file.path().display());
            println!("  Size:    {}", human_size(size));
            println!("  Config:  {}", config_path.display());
            println!();
            println!("Contents:");
            println!("  Books:  {}", stats.total);
            println!("  Read:   {}", stats.read_count);
            println!("  Unread: {}", stats.unread_count);
        }
    }

    Ok(())
}

/// Format a byte count for display
fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
