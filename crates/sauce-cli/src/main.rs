//! Boots the engine end to end (spec §6.3 boot order): parse config, load
//! descriptors, open the output device, start the control-plane transport,
//! bridge OSC events onto the command queue, and run until Ctrl-C.
//! Grounded on the teacher's `modular_server::main` (`Command::new`,
//! `spawn`, `ctrlc::set_handler` driving an `AtomicBool` run loop) with the
//! cpal device lifetime taking the place of the teacher's `_modular_handle`.

mod config;
mod descriptors;
mod errors;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use config::Config;
use errors::CliError;
use sauce_control::{parse_socket_addr, transport, Heartbeat, Inbound, SharedStatus};
use sauce_engine::audio::{list_output_devices, AudioHandle};

fn main() {
    if let Err(err) = run() {
        tracing::error!(%err, "sauce-engine-cli exited with an error");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let config = Config::parse();

    let log_file = config.log_file.clone();
    if let Some(parent) = log_file.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    init_tracing(&log_file);

    if config.list_devices {
        for device in list_output_devices() {
            let marker = if device.is_default { "*" } else { " " };
            println!("{marker} {} ({} ch)", device.name, device.output_channels);
        }
        return Ok(());
    }

    let registry = Arc::new(descriptors::load_descriptor_dir(&config.descriptor_dir)?);
    tracing::info!(count = registry.len(), "loaded generator descriptors");

    let mut audio = AudioHandle::start(registry, config.device.as_deref(), config.block_size)?;
    tracing::info!(sample_rate = audio.sample_rate() as f64, "audio stream started");

    let bind_addr = parse_socket_addr(&config.control_bind)?;
    let peer_addr = parse_socket_addr(&config.control_peer)?;

    let (telemetry_tx, telemetry_rx) = crossbeam_channel::unbounded();
    let (ack_tx, ack_rx) = crossbeam_channel::unbounded();
    let (control_tx, control_rx) = crossbeam_channel::unbounded();
    let status = SharedStatus::new();
    let heartbeat = Heartbeat::new(status.clone());

    // the receiver thread only ferries parsed events across a channel; the
    // `CommandProducer` itself is pushed to exclusively from this thread,
    // which is the one that owns `audio` (spec §5: single control-thread
    // producer per ring).
    let _receiver = transport::spawn_receiver(bind_addr, move |event| match event {
        Inbound::Control(message) => {
            let _ = control_tx.send(message);
        }
        Inbound::PeerAck => {
            let _ = ack_tx.send(());
        }
    })?;

    let _sender = transport::spawn_sender(peer_addr, telemetry_rx, ack_rx, heartbeat)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)).expect("failed to set Ctrl-C handler");

    while running.load(Ordering::SeqCst) {
        while let Ok(message) = control_rx.try_recv() {
            audio.command_producer().push(message);
        }
        while let Some(message) = audio.telemetry_consumer().try_recv() {
            let _ = telemetry_tx.send(message);
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    audio.stop();
    Ok(())
}

fn init_tracing(log_file: &std::path::Path) {
    use tracing_subscriber::EnvFilter;

    let file = std::fs::OpenOptions::new().create(true).append(true).open(log_file).ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match file {
        Some(file) => {
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::sync::Mutex::new(file)).init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}
