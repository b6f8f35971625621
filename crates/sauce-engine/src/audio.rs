//! Device I/O and thread ownership (spec §5). Grounded on the teacher's
//! `make_stream<T>` (`crates/modular/src/audio.rs`): same generic
//! sample-format dispatch, same `build_output_stream`/`err_fn` shape. The
//! key departure is that the teacher locks a shared `AudioState` inside the
//! callback; here `Engine` is owned outright by the callback closure, so
//! there is no mutex anywhere on the audio path (spec §5, §9).

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use sauce_core::message::{ControlMessage, TelemetryMessage};
use sauce_core::registry::DescriptorRegistry;

use crate::command::{command_queue, telemetry_queue, CommandConsumer, CommandProducer, TelemetryConsumer};
use crate::engine::Engine;
use crate::errors::EngineIoError;
use crate::worker::{pending_swap_ring, spawn_swap_worker, SwapRequest};

pub struct AudioDeviceInfo {
    pub name: String,
    pub is_default: bool,
    pub output_channels: u16,
}

/// Lists output devices the way a CLI `--list-devices` flag would (spec
/// §6.3 device enumeration).
pub fn list_output_devices() -> Vec<AudioDeviceInfo> {
    let host = cpal::default_host();
    let default_name = host.default_output_device().and_then(|d| d.name().ok());

    host.output_devices()
        .map(|devices| {
            devices
                .filter_map(|device| {
                    let name = device.name().ok()?;
                    let channels = device.default_output_config().ok()?.channels();
                    Some(AudioDeviceInfo {
                        is_default: default_name.as_deref() == Some(name.as_str()),
                        name,
                        output_channels: channels,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn resolve_device(name: Option<&str>) -> Result<cpal::Device, EngineIoError> {
    let host = cpal::default_host();
    match name {
        Some(name) => host
            .output_devices()?
            .find(|d| d.name().as_deref() == Ok(name))
            .ok_or_else(|| EngineIoError::DeviceNotFound(name.to_string())),
        None => host.default_output_device().ok_or(EngineIoError::NoOutputDevice),
    }
}

/// Owns the cpal stream, the descriptor-swap worker thread, and the queues
/// connecting them to `sauce-control`. Dropping this stops audio.
pub struct AudioHandle {
    stream: cpal::Stream,
    command_producer: CommandProducer,
    telemetry_consumer: TelemetryConsumer,
    swap_requests: crossbeam_channel::Sender<SwapRequest>,
    worker: std::thread::JoinHandle<()>,
    sample_rate: f32,
}

impl AudioHandle {
    pub fn command_producer(&mut self) -> &mut CommandProducer {
        &mut self.command_producer
    }

    pub fn telemetry_consumer(&mut self) -> &mut TelemetryConsumer {
        &mut self.telemetry_consumer
    }

    pub fn swap_requests(&self) -> crossbeam_channel::Sender<SwapRequest> {
        self.swap_requests.clone()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Stops the stream and the worker thread. The worker drains its
    /// request channel and exits once `swap_requests` has no more senders.
    pub fn stop(self) {
        drop(self.stream);
        drop(self.swap_requests);
        let _ = self.worker.join();
    }

    /// Opens the output device (or the system default if `device_name` is
    /// `None`) and starts the audio callback (spec §5, §6.3).
    pub fn start(
        registry: Arc<DescriptorRegistry>,
        device_name: Option<&str>,
        block_size: usize,
    ) -> Result<Self, EngineIoError> {
        let device = resolve_device(device_name)?;
        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let stream_config: cpal::StreamConfig = supported_config.config();
        let sample_rate = stream_config.sample_rate.0 as f32;
        let channels = stream_config.channels as usize;

        let engine = Engine::new(sample_rate, block_size);
        let (command_producer, command_consumer) = command_queue();
        let (telemetry_producer, telemetry_consumer) = telemetry_queue();
        let (swap_tx, swap_rx) = crossbeam_channel::unbounded();
        let (swap_completion_tx, swap_completion_rx) = pending_swap_ring();
        let worker = spawn_swap_worker(registry, swap_rx, swap_completion_tx);

        let stream = build_stream(
            sample_format,
            &device,
            &stream_config,
            channels,
            block_size,
            engine,
            command_consumer,
            swap_completion_rx,
            telemetry_producer,
            swap_tx.clone(),
        )?;
        stream.play()?;

        Ok(Self { stream, command_producer, telemetry_consumer, swap_requests: swap_tx, worker, sample_rate })
    }
}

#[allow(clippy::too_many_arguments)]
fn build_stream(
    sample_format: cpal::SampleFormat,
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    block_size: usize,
    engine: Engine,
    command_consumer: CommandConsumer,
    swap_completion_rx: rtrb::Consumer<crate::worker::PendingSwap>,
    telemetry_producer: crate::command::TelemetryProducer,
    swap_tx: crossbeam_channel::Sender<SwapRequest>,
) -> Result<cpal::Stream, EngineIoError> {
    match sample_format {
        cpal::SampleFormat::F32 => {
            build_typed_stream::<f32>(device, config, channels, block_size, engine, command_consumer, swap_completion_rx, telemetry_producer, swap_tx)
        }
        cpal::SampleFormat::I16 => {
            build_typed_stream::<i16>(device, config, channels, block_size, engine, command_consumer, swap_completion_rx, telemetry_producer, swap_tx)
        }
        cpal::SampleFormat::U16 => {
            build_typed_stream::<u16>(device, config, channels, block_size, engine, command_consumer, swap_completion_rx, telemetry_producer, swap_tx)
        }
        other => Err(EngineIoError::UnsupportedSampleFormat(other)),
    }
}

#[allow(clippy::too_many_arguments)]
fn build_typed_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    block_size: usize,
    mut engine: Engine,
    mut command_consumer: CommandConsumer,
    mut swap_completion_rx: rtrb::Consumer<crate::worker::PendingSwap>,
    mut telemetry_producer: crate::command::TelemetryProducer,
    swap_tx: crossbeam_channel::Sender<SwapRequest>,
) -> Result<cpal::Stream, EngineIoError>
where
    T: SizedSample + FromSample<f32>,
{
    let err_fn = |err| tracing::error!(%err, "audio stream error");

    // scratch block, reused every callback; no allocation inside the
    // callback itself once the stream is running (spec §5).
    let mut scratch = vec![(0.0f32, 0.0f32); block_size];
    let mut scratch_cursor = block_size; // force a render on the first callback

    let stream = device.build_output_stream(
        config,
        move |output: &mut [T], _info: &cpal::OutputCallbackInfo| {
            let budget_start = std::time::Instant::now();

            while let Ok(swap) = swap_completion_rx.pop() {
                engine.complete_swap(swap);
            }
            command_consumer.drain(|message| {
                if let Some(reply) = engine.apply_message(message, &swap_tx) {
                    telemetry_producer.push(reply);
                }
            });

            for frame in output.chunks_mut(channels) {
                if scratch_cursor >= scratch.len() {
                    engine.process_block(&mut scratch, |telemetry| telemetry_producer.push(telemetry));
                    scratch_cursor = 0;
                }
                let (l, r) = scratch[scratch_cursor];
                scratch_cursor += 1;

                write_frame(frame, l, r);
            }

            let took_us = budget_start.elapsed().as_micros() as u64;
            let budget_us = (output.len() / channels.max(1)) as u64 * 1_000_000 / engine.sample_rate() as u64;
            if took_us > budget_us {
                telemetry_producer.push(TelemetryMessage::Disconnected);
                tracing::warn!(took_us, budget_us, "audio block overrun");
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

fn write_frame<T: SizedSample + FromSample<f32>>(frame: &mut [T], left: f32, right: f32) {
    match frame.len() {
        0 => {}
        1 => frame[0] = T::from_sample(0.5 * (left + right)),
        _ => {
            frame[0] = T::from_sample(left);
            frame[1] = T::from_sample(right);
            for sample in frame.iter_mut().skip(2) {
                *sample = T::from_sample(0.0);
            }
        }
    }
}

/// Applies an inbound control message immediately, bypassing the queue —
/// used by in-process callers (tests, the CLI's REPL) that don't go
/// through `sauce-control`'s network transport.
pub fn send_message(handle: &mut AudioHandle, message: ControlMessage) {
    handle.command_producer().push(message);
}
