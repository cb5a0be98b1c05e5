use crate::error::{DspError, DspResult};
use tracing::debug;

/// Circular sample memory with a write cursor
///
/// Holds `capacity + 1` slots; slot `capacity` mirrors slot 0 so linear
/// interpolation between `data[i]` and `data[i + 1]` never has to wrap.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    data: Vec<f32>,
    capacity: usize,
    write_pos: usize,
}

impl RingBuffer {
    /// Buffer able to hold `max_time` seconds: capacity = ceil(max_time * sr) + 1
    pub fn for_duration(max_time: f32, sample_rate: f32) -> DspResult<Self> {
        let samples = (max_time.max(0.0) * sample_rate).ceil();
        if !samples.is_finite() || samples >= isize::MAX as f32 {
            return Err(DspError::Allocation {
                requested: usize::MAX,
            });
        }
        let capacity = (samples as usize)
            .checked_add(1)
            .ok_or(DspError::Allocation {
                requested: usize::MAX,
            })?;
        Self::with_capacity(capacity)
    }

    pub fn with_capacity(capacity: usize) -> DspResult<Self> {
        let capacity = capacity.max(1);
        let slots = capacity.checked_add(1).ok_or(DspError::Allocation {
            requested: usize::MAX,
        })?;
        let mut data = Vec::new();
        data.try_reserve_exact(slots)
            .map_err(|_| DspError::Allocation { requested: slots })?;
        data.resize(slots, 0.0);
        debug!("Allocated ring buffer: {} samples", slots);

        Ok(Self {
            data,
            capacity,
            write_pos: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Longest delay readable before the write at the same position
    pub fn max_delay_samples(&self) -> usize {
        self.capacity - 1
    }

    pub fn write_position(&self) -> usize {
        self.write_pos
    }

    /// Sample written `delay` writes ago, before this sample's write (delay >= 1)
    #[inline]
    pub fn read(&self, delay: usize) -> f32 {
        let delay = delay % self.capacity;
        self.data[(self.write_pos + self.capacity - delay) % self.capacity]
    }

    /// Linearly interpolated read at a fractional delay in samples
    #[inline]
    pub fn read_linear(&self, delay: f32) -> f32 {
        let size = self.capacity as f32;
        let mut xind = self.write_pos as f32 - delay;
        if xind < 0.0 {
            xind += size;
        }
        if xind >= size {
            xind -= size;
        }
        let ind = (xind as usize).min(self.capacity - 1);
        let frac = xind - ind as f32;
        self.data[ind] + (self.data[ind + 1] - self.data[ind]) * frac
    }

    /// Store a sample at the cursor and advance
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.data[self.write_pos] = sample;
        if self.write_pos == 0 {
            self.data[self.capacity] = sample;
        }
        self.write_pos += 1;
        if self.write_pos >= self.capacity {
            self.write_pos = 0;
        }
    }

    /// Zero the memory without reallocating
    pub fn clear(&mut self) {
        self.data.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_from_duration() {
        let ring = RingBuffer::for_duration(0.5, 44100.0).unwrap();
        assert_eq!(ring.capacity(), 22051);
        assert_eq!(ring.max_delay_samples(), 22050);
    }

    #[test]
    fn test_oversized_duration_is_allocation_error() {
        for max_time in [1e20, f32::INFINITY] {
            let result = RingBuffer::for_duration(max_time, 44100.0);
            assert!(matches!(result, Err(DspError::Allocation { .. })));
        }
        let result = RingBuffer::for_duration(1.0, f32::INFINITY);
        assert!(matches!(result, Err(DspError::Allocation { .. })));
    }

    #[test]
    fn test_capacity_overflow_is_allocation_error() {
        assert!(matches!(
            RingBuffer::with_capacity(usize::MAX),
            Err(DspError::Allocation { .. })
        ));
        // Fits in usize but not in memory
        assert!(matches!(
            RingBuffer::with_capacity(usize::MAX / 2),
            Err(DspError::Allocation { .. })
        ));
    }

    #[test]
    fn test_nan_duration_allocates_minimum() {
        let ring = RingBuffer::for_duration(f32::NAN, 44100.0).unwrap();
        assert_eq!(ring.capacity(), 1);
    }

    #[test]
    fn test_integer_read() {
        let mut ring = RingBuffer::with_capacity(8).unwrap();
        for i in 1..=5 {
            ring.write(i as f32);
        }
        assert_eq!(ring.read(1), 5.0);
        assert_eq!(ring.read(3), 3.0);
    }

    #[test]
    fn test_linear_read_between_samples() {
        let mut ring = RingBuffer::with_capacity(8).unwrap();
        ring.write(0.0);
        ring.write(1.0);
        ring.write(0.0);
        // Delay 2.25: a quarter of the way from the sample at delay 2 toward delay 3
        assert!((ring.read_linear(1.5) - 0.5).abs() < 1e-6);
        assert!((ring.read_linear(2.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_mirror_keeps_interpolation_continuous_across_wrap() {
        let mut ring = RingBuffer::with_capacity(4).unwrap();
        // Fill so slot 0 holds 4.0 and the last slot holds 3.0
        for s in [4.0, 1.0, 2.0, 3.0] {
            ring.write(s);
        }
        ring.write(10.0); // overwrites slot 0, mirror follows
        // Cursor is at 1; delay 1.5 reads between slot 3 (3.0) and slot 0 via the mirror
        let v = ring.read_linear(1.5);
        assert!((v - 6.5).abs() < 1e-6, "got {}", v);
    }

    #[test]
    fn test_clear() {
        let mut ring = RingBuffer::with_capacity(4).unwrap();
        ring.write(1.0);
        ring.clear();
        assert_eq!(ring.write_position(), 0);
        assert_eq!(ring.read_linear(1.0), 0.0);
    }
}
