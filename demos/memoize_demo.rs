// Demonstrates memoizing pure functions of different arities, composing
// them first, and reading the cache statistics afterwards.
//
// Run with `RUST_LOG=memofn=trace` to see every hit and miss.

use std::thread;
use std::time::{Duration, Instant};

use memofn::prelude::*;
use memofn::utils::logging::{init_logging, LogFormat};

fn slow_distance(x1: i64, y1: i64, x2: i64) -> f64 {
    thread::sleep(Duration::from_millis(25));
    (((x2 - x1).pow(2) + y1.pow(2)) as f64).sqrt()
}

fn main() -> MemoResult<()> {
    init_logging(LogFormat::Text)?;

    println!("=== Memoized three-argument function ===\n");
    let config = MemoConfig::default()
        .with_label("distance")
        .with_initial_capacity(8);
    let distance = slow_distance.memoized_with(config);

    for round in 1..=3 {
        let started = Instant::now();
        let d = distance.apply(0, 3, 4);
        println!("round {}: distance = {:.1} in {:?}", round, d, started.elapsed());
    }
    println!("stats: {:?}\n", distance.stats());

    println!("=== Composed predicate ===\n");
    let is_small = |n: u32| n < 100;
    let is_square = |n: u32| {
        let root = (n as f64).sqrt() as u32;
        root * root == n
    };
    let small_square = is_small.and(is_square).memoized();
    let squares: Vec<u32> = (0..200).filter(|&n| small_square.apply(n)).collect();
    println!("small squares: {:?}", squares);
    println!("cached tuples: {}\n", small_square.len());

    println!("=== Fallible function ===\n");
    let parse = |s: &'static str| s.parse::<i32>();
    let parse = parse.try_memoized();
    for input in ["42", "x", "42"] {
        match parse.apply(input) {
            Ok(n) => println!("{:>4} -> {}", input, n),
            Err(e) => println!("{:>4} -> error: {}", input, e),
        }
    }
    println!("stats: {}", serde_json::to_string(&parse.stats()).unwrap_or_default());

    Ok(())
}
