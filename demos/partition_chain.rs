use flexi_logger::{opt_format, Logger};
use graphpartition::{
    graph::chain, AnnealingConfig, InitialAssignment, Partitioning, SimulatedAnnealing,
};
use log::{info, LevelFilter};
use rand::{rngs::StdRng, SeedableRng};

fn main() {
    let _logger = Logger::with(LevelFilter::Debug)
        .format(opt_format)
        .start()
        .unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    let num_nodes = 24;
    let num_partitions = 4;
    let (nodes, edge_costs) = chain(num_nodes, 10, 3);

    let mut partitioning = Partitioning::with_partition_count(
        nodes,
        edge_costs,
        num_partitions,
        InitialAssignment::RoundRobin,
    )
    .unwrap();
    let initial = partitioning.cost().unwrap();
    info!(num_nodes, num_partitions, initial:serde; "Initial partitioning");

    let optimizer = SimulatedAnnealing::new(AnnealingConfig::new(200, 0.1).with_max_rounds(1000));
    let report = optimizer.optimize(&mut partitioning, &mut rng).unwrap();
    partitioning.normalize();

    let cost = partitioning.cost().unwrap();
    info!(report:serde, cost:serde; "Optimized partitioning");
    println!("{:?}", partitioning.assignment());
}
