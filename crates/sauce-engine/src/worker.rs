//! Descriptor-swap worker (spec §4.6, §5, §8 property 7): `dsp_kind`
//! instantiation allocates (wavetable LUTs, the Karplus delay line), so it
//! never runs on the audio thread. This worker owns the registry, builds
//! the new `GeneratorVoice` off-thread, and hands it back over a small
//! lock-free ring the audio thread polls once per block. Grounded on the
//! teacher's pattern of keeping the `cpal` callback itself allocation-free
//! while heavier setup happens on a companion thread (`crates/modular/src/audio.rs`).

use std::sync::Arc;

use sauce_core::descriptor::{CustomParamDescriptor, PitchTarget};
use sauce_core::dsp::oscillators::DspKindInstance;
use sauce_core::registry::DescriptorRegistry;
use sauce_core::voice::GeneratorVoice;

pub const PENDING_SWAP_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub slot: usize,
    pub descriptor_id: String,
}

/// Descriptor metadata the audio thread needs on hand every block, cached
/// out of the registry at swap time so the audio thread never touches the
/// registry itself.
#[derive(Debug, Clone)]
pub struct DescriptorMeta {
    pub pitch_target: PitchTarget,
    pub midi_retrig: bool,
    pub output_trim_db: f32,
    pub custom_params: Vec<CustomParamDescriptor>,
}

pub struct PendingSwap {
    pub slot: usize,
    pub descriptor_id: String,
    pub voice: GeneratorVoice,
    pub meta: DescriptorMeta,
}

/// Spawns the background thread and returns the request sender the audio
/// thread (or control thread, via `Engine::apply_message`) posts swaps to.
/// `completions` is the producer half the audio thread's `Engine::poll_swaps`
/// drains.
pub fn spawn_swap_worker(
    registry: Arc<DescriptorRegistry>,
    requests: crossbeam_channel::Receiver<SwapRequest>,
    mut completions: rtrb::Producer<PendingSwap>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for request in requests.iter() {
            let Some(descriptor) = registry.get(&request.descriptor_id) else {
                tracing::warn!(descriptor_id = %request.descriptor_id, "unknown descriptor requested for swap");
                continue;
            };
            let Some(dsp) = DspKindInstance::from_name(&descriptor.dsp_kind) else {
                tracing::warn!(dsp_kind = %descriptor.dsp_kind, "descriptor references unresolvable dsp_kind");
                continue;
            };

            let swap = PendingSwap {
                slot: request.slot,
                descriptor_id: request.descriptor_id.clone(),
                voice: GeneratorVoice::new(dsp),
                meta: DescriptorMeta {
                    pitch_target: descriptor.pitch_target,
                    midi_retrig: descriptor.midi_retrig,
                    output_trim_db: descriptor.output_trim_db,
                    custom_params: descriptor.custom_params.clone(),
                },
            };

            if completions.push(swap).is_err() {
                tracing::warn!(slot = request.slot, "pending-swap ring full, dropping completed swap");
            }
        }
    })
}

pub fn pending_swap_ring() -> (rtrb::Producer<PendingSwap>, rtrb::Consumer<PendingSwap>) {
    rtrb::RingBuffer::new(PENDING_SWAP_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sauce_core::descriptor::GeneratorDescriptor;

    #[test]
    fn test_worker_resolves_known_descriptor() {
        let mut registry = DescriptorRegistry::default();
        registry
            .register(GeneratorDescriptor {
                id: "saw_basic".into(),
                display_name: "Saw Basic".into(),
                dsp_kind: "saw".into(),
                pitch_target: PitchTarget::Freq,
                midi_retrig: false,
                output_trim_db: 0.0,
                custom_params: vec![],
            })
            .unwrap();
        let registry = Arc::new(registry);

        let (req_tx, req_rx) = crossbeam_channel::unbounded();
        let (completions_tx, mut completions_rx) = pending_swap_ring();
        let handle = spawn_swap_worker(registry, req_rx, completions_tx);

        req_tx.send(SwapRequest { slot: 3, descriptor_id: "saw_basic".into() }).unwrap();
        drop(req_tx);
        handle.join().unwrap();

        let swap = completions_rx.pop().expect("expected a completed swap");
        assert_eq!(swap.slot, 3);
        assert_eq!(swap.descriptor_id, "saw_basic");
    }

    #[test]
    fn test_worker_skips_unknown_descriptor() {
        let registry = Arc::new(DescriptorRegistry::default());
        let (req_tx, req_rx) = crossbeam_channel::unbounded();
        let (completions_tx, mut completions_rx) = pending_swap_ring();
        let handle = spawn_swap_worker(registry, req_rx, completions_tx);

        req_tx.send(SwapRequest { slot: 0, descriptor_id: "missing".into() }).unwrap();
        drop(req_tx);
        handle.join().unwrap();

        assert!(completions_rx.pop().is_err());
    }
}
