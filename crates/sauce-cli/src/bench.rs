//! sauce-bench: block-processing throughput measurement without cpal or
//! the control plane, so native profilers (samply, Instruments, perf) can
//! attach to a plain process. Grounded on the teacher's `modular-bench`
//! (`crates/modular_cli/src/bench.rs`): same `run`/`list`/`smoke`
//! subcommand shape and warmup-then-measure structure, adapted from the
//! teacher's free-form patch graph to loading one generator descriptor
//! into slot 0 and holding a note for the measured span.

mod descriptors;
mod errors;

use std::hint::black_box;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use errors::CliError;
use sauce_core::dsp::oscillators::DspKindInstance;
use sauce_core::message::ControlMessage;
use sauce_core::voice::GeneratorVoice;
use sauce_engine::worker::{DescriptorMeta, PendingSwap};
use sauce_engine::Engine;

const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;
const DEFAULT_BLOCK_SIZE: usize = 256;
const DEFAULT_FRAMES: u64 = 48_000 * 10;

#[derive(Parser)]
#[command(name = "sauce-bench", version, about = "Profile and benchmark the sauce audio engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a benchmark holding a single descriptor's note
    Run {
        /// Directory of generator descriptor JSON files
        descriptor_dir: PathBuf,
        /// Descriptor id to load into slot 0
        descriptor_id: String,
        /// Number of audio frames to process
        #[arg(short, long, default_value_t = DEFAULT_FRAMES)]
        frames: u64,
        /// Sample rate in Hz
        #[arg(short, long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: f32,
        /// Block size in frames
        #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: usize,
        /// Warmup frames before measurement
        #[arg(short, long, default_value_t = 48_000)]
        warmup: u64,
    },

    /// List descriptors available in a directory
    List {
        descriptor_dir: PathBuf,
    },

    /// Run a quick smoke test across every descriptor in a directory
    Smoke {
        descriptor_dir: PathBuf,
        #[arg(short, long, default_value_t = 4_800)]
        frames: u64,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { descriptor_dir, descriptor_id, frames, sample_rate, block_size, warmup } => {
            run_benchmark(&descriptor_dir, &descriptor_id, frames, sample_rate, block_size, warmup)
        }
        Commands::List { descriptor_dir } => list_descriptors(&descriptor_dir),
        Commands::Smoke { descriptor_dir, frames } => smoke_test(&descriptor_dir, frames),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn swap_sink() -> crossbeam_channel::Sender<sauce_engine::worker::SwapRequest> {
    let (tx, _rx) = crossbeam_channel::unbounded();
    tx
}

/// Builds an engine with `descriptor_id` loaded into slot 0 and a note held
/// (spec §4.6 `SlotDescriptor` then `MidiNoteOn`). Descriptor swaps are
/// applied synchronously here, since there is no swap worker thread in the
/// bench harness: the first `process_block` after `complete_swap` is what
/// the timed loop measures.
fn build_engine(descriptor_dir: &std::path::Path, descriptor_id: &str, sample_rate: f32, block_size: usize) -> Result<Engine, CliError> {
    let registry = descriptors::load_descriptor_dir(descriptor_dir)?;
    let descriptor = registry.get(descriptor_id).ok_or_else(|| CliError::UnknownDescriptor(descriptor_id.to_string()))?;
    let dsp = DspKindInstance::from_name(&descriptor.dsp_kind).ok_or_else(|| CliError::UnknownDspKind(descriptor.dsp_kind.clone()))?;

    let swap = PendingSwap {
        slot: 0,
        descriptor_id: descriptor.id.clone(),
        voice: GeneratorVoice::new(dsp),
        meta: DescriptorMeta {
            pitch_target: descriptor.pitch_target,
            midi_retrig: descriptor.midi_retrig,
            output_trim_db: descriptor.output_trim_db,
            custom_params: descriptor.custom_params.clone(),
        },
    };

    let mut engine = Engine::new(sample_rate, block_size);
    let swap_tx = swap_sink();
    engine.complete_swap(swap);
    engine.apply_message(ControlMessage::MidiNoteOn { slot: 0, note: 60, velocity: 100 }, &swap_tx);

    Ok(engine)
}

fn run_benchmark(
    descriptor_dir: &std::path::Path,
    descriptor_id: &str,
    frames: u64,
    sample_rate: f32,
    block_size: usize,
    warmup: u64,
) -> Result<(), CliError> {
    let mut engine = build_engine(descriptor_dir, descriptor_id, sample_rate, block_size)?;
    let mut scratch = vec![(0.0f32, 0.0f32); block_size];

    println!("Loaded descriptor: {descriptor_id}");
    println!(
        "\nRunning benchmark: {frames} frames ({:.2}s at {sample_rate}Hz), block size {block_size}",
        frames as f64 / sample_rate as f64
    );

    let warmup_blocks = warmup.div_ceil(block_size as u64);
    print!("Warming up...");
    for _ in 0..warmup_blocks {
        engine.process_block(&mut scratch, |_| {});
        black_box(&scratch);
    }
    println!(" done");

    let benchmark_blocks = frames.div_ceil(block_size as u64);
    print!("Benchmarking...");
    let start = Instant::now();
    for _ in 0..benchmark_blocks {
        engine.process_block(&mut scratch, |_| {});
        black_box(&scratch);
    }
    let elapsed = start.elapsed();
    println!(" done\n");

    let total_frames = benchmark_blocks * block_size as u64;
    let ns_per_frame = elapsed.as_nanos() as f64 / total_frames as f64;
    let frames_per_sec = 1_000_000_000.0 / ns_per_frame;
    let realtime_budget_ns = 1_000_000_000.0 / sample_rate as f64;
    let budget_usage = (ns_per_frame / realtime_budget_ns) * 100.0;

    println!("Results:");
    println!("  Total time:       {elapsed:?}");
    println!("  Frames:           {total_frames}");
    println!("  ns/frame:         {ns_per_frame:.2}");
    println!("  frames/sec:       {frames_per_sec:.0}");
    println!("  Real-time budget: {realtime_budget_ns:.2} ns/frame @ {sample_rate}Hz");
    println!("  Budget usage:     {budget_usage:.2}%");

    if budget_usage > 100.0 {
        println!("\n  WARNING: exceeds real-time budget");
    } else {
        println!("\n  within real-time budget ({:.1}x headroom)", 100.0 / budget_usage);
    }

    Ok(())
}

fn list_descriptors(descriptor_dir: &std::path::Path) -> Result<(), CliError> {
    let registry = descriptors::load_descriptor_dir(descriptor_dir)?;
    println!("Descriptors in {}:", descriptor_dir.display());
    for id in registry.ids() {
        println!("  {id}");
    }
    Ok(())
}

fn smoke_test(descriptor_dir: &std::path::Path, frames: u64) -> Result<(), CliError> {
    let registry = descriptors::load_descriptor_dir(descriptor_dir)?;
    println!("Running smoke test with {frames} frames per descriptor\n");

    let ids: Vec<String> = registry.ids().map(String::from).collect();
    for id in ids {
        print!("Testing {id}... ");
        match build_engine(descriptor_dir, &id, DEFAULT_SAMPLE_RATE, DEFAULT_BLOCK_SIZE) {
            Ok(mut engine) => {
                let mut scratch = vec![(0.0f32, 0.0f32); DEFAULT_BLOCK_SIZE];
                let blocks = frames.div_ceil(DEFAULT_BLOCK_SIZE as u64);
                let start = Instant::now();
                for _ in 0..blocks {
                    engine.process_block(&mut scratch, |_| {});
                    black_box(&scratch);
                }
                let elapsed = start.elapsed();
                let ns_per_frame = elapsed.as_nanos() as f64 / (blocks * DEFAULT_BLOCK_SIZE as u64) as f64;
                println!("OK ({ns_per_frame:.2} ns/frame)");
            }
            Err(err) => println!("FAILED: {err}"),
        }
    }

    Ok(())
}
