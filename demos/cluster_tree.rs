use arbor::cluster::{
    AgglomerativeClustering, ClustererPartitioner, Linkage, LinkageRegistry, SimilarityClusterer,
    TopDownClustering,
};
use arbor::hierarchy::HealthCheck;
use arbor::similarity::Total;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=arbor=trace shows every merge and expansion.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("arbor=debug".parse()?),
        )
        .init();

    // Three loose groups on a line.
    let points: Vec<(&str, f64)> = vec![
        ("ant", 0.0),
        ("bee", 0.4),
        ("cat", 1.1),
        ("dog", 5.0),
        ("elk", 5.3),
        ("fox", 6.2),
        ("gnu", 12.0),
        ("hen", 12.5),
    ];
    let position = |name: &&str| {
        points
            .iter()
            .find(|(n, _)| n == name)
            .map_or(f64::NAN, |(_, x)| *x)
    };
    let sim = Total(|a: &&str, b: &&str| -(position(a) - position(b)).abs());
    let names: Vec<&str> = points.iter().map(|(n, _)| *n).collect();

    // Pick the linkage by name, the way a config file would.
    let registry = LinkageRegistry::builtin().with(std::sync::Arc::new(Linkage::Average));
    let engine = AgglomerativeClustering::from_registry(&registry, "CompleteLink")?;

    let model = engine.hierarchical(&names, &sim)?;
    println!("Tree:\n{}", model.root());
    println!("{}", model.health_check());

    for level in 0..4 {
        let flat = model.flatten(level);
        let groups: Vec<String> = flat
            .iter()
            .map(|c| {
                let members: Vec<&str> = c.iter().copied().collect();
                format!("{}={:?}", c.id(), members)
            })
            .collect();
        println!(
            "level {level} (distance {:?}): {}",
            flat.property("level_distance"),
            groups.join(" ")
        );
    }

    let ancestors = model.ancestor_index();
    if let Some(node) = ancestors.most_specific_common_ancestor(&"ant", &"cat") {
        println!("ant and cat meet at node {} (weight {})", node.id(), node.weight());
    }

    // The same engine can drive a top-down split.
    let mut split = ClustererPartitioner::new(SimilarityClusterer::new(engine, &sim, 2));
    let top_down = TopDownClustering::new(2).fit(names, &mut split)?;
    println!("Top-down:\n{}", top_down.root());

    Ok(())
}
