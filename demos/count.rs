use ip_cardinality::{count_unique, AdaptiveCounter, Config, ExactSet, MergeCoordinator};

fn main() {
    let mut counter = AdaptiveCounter::new(4);
    for key in 0..3 {
        counter.insert(key);
    }
    println!("counter = {:?}", counter);

    let batch: ExactSet = (2..6).collect();
    counter.merge(&batch);
    println!("merged counter = {:?}", counter);

    let coordinator = MergeCoordinator::new(1 << 24);
    coordinator.merge(&(0..10).collect());
    coordinator.merge(&(5..15).collect());
    println!("coordinator count = {}", coordinator.count());

    let input = "10.0.0.1\n10.0.0.1\n10.0.0.2\nnot.an.ip\n192.168.1.1\n";
    match count_unique(input.as_bytes(), &Config::default()) {
        Ok(summary) => println!("Number of unique IP addresses: {}", summary.unique),
        Err(e) => eprintln!("Error: {}", e),
    }
}
