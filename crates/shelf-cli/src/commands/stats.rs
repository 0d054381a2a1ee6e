//! Stats command handler

use anyhow::Result;

use shelf_core::Catalog;

use crate::output::Output;

/// Show aggregate statistics for the library
pub fn show(catalog: &Catalog, output: &Output) -> Result<()> {
    output.print_stats(&catalog.statistics());
    Ok(())
}
