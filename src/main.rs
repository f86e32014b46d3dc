#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::time::{Duration, Instant};
use torus_life::{ColorPolicy, InputFrame, Present, TorusLife, TorusLifeConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_TICKS: u64 = 600;
const CHECK_INTERVAL: u64 = 100;

struct MainArgs {
    config: TorusLifeConfig,
    ticks: u64,
}

fn parse_args() -> MainArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut config = TorusLifeConfig::default();
    let mut ticks = DEFAULT_TICKS;
    let next_arg = |i: usize, flag: &str| -> &str {
        args.get(i)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("{flag} requires a value"))
    };
    let parse_usize = |v: &str, flag: &str| -> usize {
        v.parse()
            .unwrap_or_else(|_| panic!("{flag} requires a non-negative integer"))
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                i += 1;
                config.width = parse_usize(next_arg(i, "--width"), "--width");
            }
            "--height" => {
                i += 1;
                config.height = parse_usize(next_arg(i, "--height"), "--height");
            }
            "--threads" => {
                i += 1;
                config = config.thread_count(parse_usize(next_arg(i, "--threads"), "--threads"));
            }
            "--ticks" => {
                i += 1;
                ticks = parse_usize(next_arg(i, "--ticks"), "--ticks") as u64;
            }
            "--seed" => {
                i += 1;
                let v = next_arg(i, "--seed");
                let seed = if let Some(hex) = v.strip_prefix("0x") {
                    u64::from_str_radix(hex, 16).expect("--seed hex parse failed")
                } else {
                    v.parse().expect("--seed expects u64")
                };
                config = config.seed(seed);
            }
            "--sprinkle" => {
                i += 1;
                config =
                    config.sprinkle_per_tick(parse_usize(next_arg(i, "--sprinkle"), "--sprinkle"));
            }
            "--gradient" => {
                config = config.color_policy(ColorPolicy::Gradient);
            }
            "--paused" => {
                config = config.start_running(false);
            }
            other => panic!(
                "unknown argument: {other}\nusage: torus-life [--width N] [--height N] [--threads N] [--ticks N] [--seed N] [--sprinkle N] [--gradient] [--paused]"
            ),
        }
        i += 1;
    }
    MainArgs { config, ticks }
}

/// Stands in for the window: folds every frame into a checksum.
#[derive(Default)]
struct ChecksumSink {
    frames: u64,
    checksum: u64,
}

impl Present for ChecksumSink {
    fn present(&mut self, pixels: &[u8], width: usize, height: usize) {
        debug_assert_eq!(pixels.len(), width * height * 4);
        let lit = pixels.chunks_exact(4).filter(|px| px[0] != 0).count() as u64;
        self.checksum = self.checksum.rotate_left(7) ^ lit;
        self.frames += 1;
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args();
    let (width, height) = (args.config.width, args.config.height);
    let mut engine = match TorusLife::with_config(args.config) {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!(%err, "refusing to start");
            std::process::exit(2);
        }
    };
    tracing::info!(
        width,
        height,
        workers = engine.worker_count(),
        population = engine.population(),
        "seeded torus"
    );

    let mut sink = ChecksumSink::default();
    let input = InputFrame::default();
    let mut total = Duration::ZERO;
    let mut phase = Duration::ZERO;

    for tick in 1..=args.ticks {
        let start = Instant::now();
        engine.tick(&input, &mut sink);
        let elapsed = start.elapsed();
        total += elapsed;
        phase += elapsed;

        if tick % CHECK_INTERVAL == 0 || tick == args.ticks {
            let phase_ticks = if tick % CHECK_INTERVAL == 0 {
                CHECK_INTERVAL
            } else {
                tick % CHECK_INTERVAL
            };
            let phase_ms = phase.as_secs_f64() * 1000.0;
            let avg_ms = phase_ms / phase_ticks as f64;
            println!(
                "Tick {tick}: generation = {}, population = {} | {phase_ms:.3} ms, {avg_ms:.4} ms/tick",
                engine.generation(),
                engine.population()
            );
            phase = Duration::ZERO;
        }
    }

    let total_ms = total.as_secs_f64() * 1000.0;
    let avg_ms = if args.ticks > 0 {
        total_ms / args.ticks as f64
    } else {
        0.0
    };
    println!("\n--- Summary ({} ticks, {width}x{height}) ---", args.ticks);
    println!("Total: {total_ms:.3} ms, {avg_ms:.4} ms/tick");
    println!(
        "Frames presented: {}, checksum = {:#018x}",
        sink.frames, sink.checksum
    );
}
