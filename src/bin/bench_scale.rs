#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::time::Instant;
use torus_life::{TorusLife, TorusLifeConfig};

fn bench_torus(size: usize, threads: usize, iterations: u64) -> (f64, f64) {
    let mut engine = TorusLife::with_config(
        TorusLifeConfig::default()
            .size(size, size)
            .thread_count(threads)
            .seed(0x5EED_1234_ABCD_EF01),
    )
    .expect("benchmark config is valid");

    let start = Instant::now();
    engine.step_n(iterations);
    let step_ms = start.elapsed().as_secs_f64() * 1000.0;

    let start = Instant::now();
    for _ in 0..iterations {
        std::hint::black_box(engine.render_frame());
    }
    let render_ms = start.elapsed().as_secs_f64() * 1000.0;

    (step_ms, render_ms)
}

fn main() {
    let scales: &[(usize, u64)] = &[(512, 200), (1024, 100), (2048, 50), (4096, 20)];
    let max_threads = num_cpus::get().max(1);
    let mut thread_counts = vec![1usize];
    while thread_counts.last().copied().unwrap_or(1) * 2 <= max_threads {
        let next = thread_counts.last().copied().unwrap_or(1) * 2;
        thread_counts.push(next);
    }

    println!(
        "{:<12} {:>8} {:>8} {:>14} {:>14}",
        "Grid", "Threads", "Iters", "Step(ms/it)", "Render(ms/it)"
    );
    println!("{}", "-".repeat(60));

    for &(size, iters) in scales {
        for &threads in &thread_counts {
            let (step_ms, render_ms) = bench_torus(size, threads, iters);
            println!(
                "{:<12} {:>8} {:>8} {:>14.4} {:>14.4}",
                format!("{}x{}", size, size),
                threads,
                iters,
                step_ms / iters as f64,
                render_ms / iters as f64
            );
        }
    }
}
