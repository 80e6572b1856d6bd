//! Cluster a handful of notes and print the groups.
//!
//! Run with `RUST_LOG=notecluster=debug` to see the pipeline stages.

use notecluster::{cluster, ClusterConfig, Note, NoteList, NoteRepository};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut repo = NoteList::new();
    for (title, text) in [
        ("standup", "Standup meeting: sprint planning and release dates"),
        ("release", "Release checklist for the sprint, tag and publish"),
        ("bread", "Sourdough starter fed at 9am, bake the bread tonight"),
        ("pizza", "Pizza dough: flour, water, salt, yeast; bake hot"),
        ("hike", "Trail to the ridge summit, pack boots and a map"),
        ("camping", "Camping trip: tent, boots, trail snacks"),
        ("draft", "   "),
    ] {
        repo.add_note(Note::new(title, text))?;
    }

    let report = cluster(&repo.snapshot(), &ClusterConfig::new(3))?;
    repo.apply_clusters(&report);

    println!(
        "=== {} notes, {} clustered, vocabulary {} (converged: {}, iterations: {}) ===",
        repo.len(),
        report.retained(),
        report.vocabulary_size(),
        report.converged(),
        report.iterations()
    );
    for (label, ids) in report.clusters() {
        let keywords = report.keywords(label).join(", ");
        println!("\ncluster {} [{}]", label, keywords);
        for id in ids {
            if let Some(note) = repo.get_note_by_id(id) {
                println!("  {:>3} {:<10} {}", id.0, note.title, note.text);
            }
        }
    }

    let unclustered: Vec<_> = repo
        .notes()
        .iter()
        .filter(|n| n.cluster.is_none())
        .map(|n| n.title.as_str())
        .collect();
    println!("\nunclustered: {:?}", unclustered);
    Ok(())
}
