use crate::analysis::AnalysisSummary;
use std::fmt::Write;

/// Render a textual summary of an embedding analysis.
#[must_use]
pub fn render_summary(summary: &AnalysisSummary) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        "Embedding records: {} received, {} stored (conflict policy: {})",
        summary.received, summary.stored, summary.policy
    )
    .expect("writing to string cannot fail");

    writeln!(
        &mut output,
        "Deduplication: {} duplicate(s) collapsed, {} conflicting record(s) skipped",
        summary.duplicates, summary.skipped
    )
    .expect("writing to string cannot fail");

    let relations = &summary.relations;
    writeln!(
        &mut output,
        "Pairwise relations: equal = {}, conflict = {}, similar = {}, unrelated = {}",
        relations.equal, relations.conflict, relations.similar, relations.unrelated
    )
    .expect("writing to string cannot fail");

    if summary.clusters.is_empty() {
        output.push_str("Similarity clusters: none\n");
        return output;
    }

    writeln!(
        &mut output,
        "Similarity clusters: {}",
        summary.clusters.len()
    )
    .expect("writing to string cannot fail");
    for (index, cluster) in summary.clusters.iter().enumerate() {
        let cores: Vec<String> = cluster.cores.iter().map(ToString::to_string).collect();
        writeln!(
            &mut output,
            "  #{}: {} record(s), {} beam(s), {} solid(s), cores [{}]",
            index + 1,
            cluster.records,
            cluster.beams,
            cluster.solids,
            cores.join(", ")
        )
        .expect("writing to string cannot fail");
    }

    output
}
