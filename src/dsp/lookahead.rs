use super::ring_buffer::RingBuffer;
use crate::error::DspResult;
use tracing::warn;

/// Longest accepted look-ahead, in milliseconds
pub const MAX_LOOKAHEAD_MS: f32 = 25.0;

/// Dry-signal delay used by the dynamics processors
///
/// The gain computed from the undelayed envelope is applied to the signal read
/// back from here, so a transient is attenuated before it reaches the output.
#[derive(Debug, Clone)]
pub struct LookAheadBuffer {
    ring: RingBuffer,
    lookahead_ms: f32,
    delay: usize,
    sample_rate: f32,
}

impl LookAheadBuffer {
    pub fn new(lookahead_ms: f32, sample_rate: f32) -> DspResult<Self> {
        let ring = RingBuffer::for_duration(MAX_LOOKAHEAD_MS * 0.001, sample_rate)?;
        let mut buffer = Self {
            ring,
            lookahead_ms: 0.0,
            delay: 0,
            sample_rate,
        };
        buffer.set_lookahead(lookahead_ms);
        Ok(buffer)
    }

    /// Change the look-ahead; values outside 0..=25 ms are ignored
    ///
    /// Returns whether the new value was applied.
    pub fn set_lookahead(&mut self, lookahead_ms: f32) -> bool {
        if !(0.0..=MAX_LOOKAHEAD_MS).contains(&lookahead_ms) {
            warn!(
                "Look-ahead {} ms outside 0..={} ms, keeping {} ms",
                lookahead_ms, MAX_LOOKAHEAD_MS, self.lookahead_ms
            );
            return false;
        }
        self.lookahead_ms = lookahead_ms;
        self.delay = ((lookahead_ms * 0.001 * self.sample_rate).round() as usize)
            .min(self.ring.max_delay_samples());
        true
    }

    pub fn lookahead_ms(&self) -> f32 {
        self.lookahead_ms
    }

    /// Delay in samples
    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Push one dry sample, return the sample from `delay` samples ago
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        self.ring.write(sample);
        self.ring.read(self.delay + 1)
    }

    pub fn clear(&mut self) {
        self.ring.clear();
    }
}
