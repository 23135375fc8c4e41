use clap::Parser;
use glam::{Quat, Vec3};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use snapshot_buffer::{BufferSettings, Pose, SnapshotBuffer};
use std::time::Instant;

/// Replays a synthetic stream of server snapshots through a buffer and times
/// appends, queries and pruning.
#[derive(Parser, Debug)]
#[command(name = "benchmark")]
struct Args {
    /// Number of snapshots received from the server
    #[arg(short, long, default_value_t = 10_000)]
    samples: usize,

    /// Server update rate in Hz
    #[arg(short, long, default_value_t = 20.0)]
    rate: f64,

    /// Render frames per received snapshot
    #[arg(short, long, default_value_t = 3)]
    frames: usize,

    /// Render delay behind the newest snapshot, in seconds
    #[arg(short, long, default_value_t = 0.1)]
    delay: f64,

    /// Optional RON file with buffer settings
    #[arg(long)]
    settings: Option<String>,

    /// Print buffer diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Error
    };
    if let Err(e) = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)
    {
        eprintln!("Could not initialize the logger: {e}");
    }

    let settings = match &args.settings {
        Some(path) => {
            let loaded = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|text| BufferSettings::from_ron(&text).map_err(|e| e.to_string()));
            match loaded {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("Could not load settings from {path}: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => BufferSettings::default(),
    };

    println!("Snapshot Buffer Benchmark");
    println!("-------------------------");
    println!(
        "{} snapshots at {} Hz, {} frames per snapshot, {:.3}s render delay",
        args.samples, args.rate, args.frames, args.delay
    );
    println!("{settings:?}");

    let period = 1.0 / args.rate;
    let mut buffer = SnapshotBuffer::<Pose>::from_settings(&settings);

    let mut append_time = std::time::Duration::ZERO;
    let mut query_time = std::time::Duration::ZERO;
    let mut prune_time = std::time::Duration::ZERO;
    let mut max_len = 0usize;
    let mut checksum = 0.0f32;

    for i in 0..args.samples {
        // Deterministic arrival jitter of up to a quarter period.
        let jitter = ((i * 7919) % 100) as f64 / 100.0 * period * 0.25;
        let server_time = i as f64 * period + jitter;
        let angle = i as f32 * 0.05;
        let pose = Pose::new(
            Vec3::new(angle.cos() * 10.0, 0.0, angle.sin() * 10.0),
            Quat::from_rotation_y(angle),
        );

        let start = Instant::now();
        buffer.append(pose, server_time);
        append_time += start.elapsed();

        let start = Instant::now();
        for frame in 0..args.frames {
            let render_time = server_time - args.delay + frame as f64 * period / args.frames as f64;
            checksum += buffer.interpolate(render_time).position.x;
        }
        query_time += start.elapsed();

        max_len = max_len.max(buffer.len());

        let start = Instant::now();
        buffer.prune_history(server_time - args.delay, &settings);
        prune_time += start.elapsed();
    }

    let queries = (args.samples * args.frames).max(1) as u32;
    let samples = args.samples.max(1) as u32;
    println!("\nAppend: {append_time:?} total, {:?} avg", append_time / samples);
    println!("Interpolate: {query_time:?} total, {:?} avg", query_time / queries);
    println!("Prune: {prune_time:?} total, {:?} avg", prune_time / samples);
    println!("Peak buffer length: {max_len}");
    println!("Checksum: {checksum:.3}");
    println!("\nFinal buffer:\n{buffer}");
}
