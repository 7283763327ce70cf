use femora_embed::{ConflictPolicy, EmbeddedInfo, EmbeddingRegistry, RegistryConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = EmbeddingRegistry::with_config(RegistryConfig {
        conflict_policy: ConflictPolicy::Skip,
    });

    registry.extend([
        EmbeddedInfo::new([1, 2], 0, vec![(vec![1, 2], vec![10, 11])]),
        EmbeddedInfo::new([3, 4], 1, vec![(vec![3, 4], vec![11, 12])]),
        // Core 1 claims the first pile's primary sequence as well
        EmbeddedInfo::new([1, 2], 1, vec![(vec![1, 2], vec![13])]),
        EmbeddedInfo::new([7], 1, vec![(vec![7], vec![70])]),
    ])?;
    println!(
        "stored {} record(s), skipped {}",
        registry.len(),
        registry.skipped()
    );

    // Fold core 1 into core 0 and look at the resulting clusters
    let moved = registry.reassign_core(1, 0)?;
    println!("moved {moved} record(s) onto core 0");
    for (index, cluster) in registry.clusters().iter().enumerate() {
        let members: Vec<String> = cluster.iter().map(ToString::to_string).collect();
        println!("cluster {}: {}", index + 1, members.join(", "));
    }

    Ok(())
}
