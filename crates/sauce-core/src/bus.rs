//! Audio bus topology (spec §3.2): a fixed set of scratch stereo buffers
//! allocated once at boot and indexed by compile-time constants — "no
//! shared ownership, no smart pointers" per spec §9.

pub const NUM_GEN_BUSES: usize = 8;
pub const NUM_SEND_BUSES: usize = 4;
pub const NUM_RETURN_BUSES: usize = 4;

pub type StereoSample = (f32, f32);

/// One block's worth of stereo scratch space for a single bus. Owned by
/// `sauce-engine`'s `Engine` struct, sized to the configured block length.
#[derive(Debug, Clone)]
pub struct StereoBuffer {
    samples: Vec<StereoSample>,
}

impl StereoBuffer {
    pub fn new(block_size: usize) -> Self {
        Self { samples: vec![(0.0, 0.0); block_size] }
    }

    pub fn clear(&mut self) {
        for s in self.samples.iter_mut() {
            *s = (0.0, 0.0);
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, i: usize) -> StereoSample {
        self.samples[i]
    }

    pub fn set(&mut self, i: usize, value: StereoSample) {
        self.samples[i] = value;
    }

    pub fn add(&mut self, i: usize, value: StereoSample) {
        let (l, r) = self.samples[i];
        self.samples[i] = (l + value.0, r + value.1);
    }

    pub fn resize(&mut self, block_size: usize) {
        self.samples.resize(block_size, (0.0, 0.0));
    }
}

/// The full fixed bus allocation (spec §3.2): `gen_bus[0..8]`,
/// `send_bus`/`return_bus[0..4]`, `dry_sum_bus`, `pre_master_bus`,
/// `master_bus`, `master_out`.
pub struct BusSet {
    pub gen_bus: [StereoBuffer; NUM_GEN_BUSES],
    pub send_bus: [StereoBuffer; NUM_SEND_BUSES],
    pub return_bus: [StereoBuffer; NUM_RETURN_BUSES],
    pub dry_sum_bus: StereoBuffer,
    pub pre_master_bus: StereoBuffer,
    pub master_bus: StereoBuffer,
    pub master_out: StereoBuffer,
}

impl BusSet {
    pub fn new(block_size: usize) -> Self {
        Self {
            gen_bus: std::array::from_fn(|_| StereoBuffer::new(block_size)),
            send_bus: std::array::from_fn(|_| StereoBuffer::new(block_size)),
            return_bus: std::array::from_fn(|_| StereoBuffer::new(block_size)),
            dry_sum_bus: StereoBuffer::new(block_size),
            pre_master_bus: StereoBuffer::new(block_size),
            master_bus: StereoBuffer::new(block_size),
            master_out: StereoBuffer::new(block_size),
        }
    }

    pub fn clear_all(&mut self) {
        for bus in self.gen_bus.iter_mut() {
            bus.clear();
        }
        for bus in self.send_bus.iter_mut() {
            bus.clear();
        }
        for bus in self.return_bus.iter_mut() {
            bus.clear();
        }
        self.dry_sum_bus.clear();
        self.pre_master_bus.clear();
        self.master_bus.clear();
        self.master_out.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_buffer_add_accumulates() {
        let mut buffer = StereoBuffer::new(4);
        buffer.add(0, (0.5, 0.5));
        buffer.add(0, (0.25, -0.25));
        assert_eq!(buffer.get(0), (0.75, 0.25));
    }

    #[test]
    fn test_bus_set_allocation_sizes() {
        let buses = BusSet::new(128);
        assert_eq!(buses.gen_bus.len(), NUM_GEN_BUSES);
        assert_eq!(buses.send_bus[0].len(), 128);
    }

    #[test]
    fn test_clear_all_zeroes_every_bus() {
        let mut buses = BusSet::new(8);
        buses.master_bus.set(0, (1.0, 1.0));
        buses.clear_all();
        assert_eq!(buses.master_bus.get(0), (0.0, 0.0));
    }
}
