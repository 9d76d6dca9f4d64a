use anyhow::Result;

use incident_search_core::corpus;
use incident_search_core::graph;
use incident_search_core::models::Source;

/// Print the searchable sources in pipeline order.
pub fn list_sources() -> Result<()> {
    println!("{:<12} {:<12} {:<6} DESCRIPTION", "SOURCE", "LABEL", "DOCS");
    for source in Source::ALL {
        println!(
            "{:<12} {:<12} {:<6} {}",
            source.id(),
            graph::source_node_name(source),
            corpus::entries(source).len(),
            graph::source_tooltip(source)
        );
    }
    println!();
    println!("{} documents across {} sources", corpus::total_entries(), Source::ALL.len());
    Ok(())
}
