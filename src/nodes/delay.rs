/// Delay node - interpolated delay line with feedback
///
/// Reads the ring buffer at a fractional position behind the write cursor,
/// linearly interpolating between the two bracketing samples, then writes the
/// input plus the scaled output back (feedback).

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::dsp::RingBuffer;
use crate::error::DspResult;
use crate::param::{InputCursor, ParamTable};

const DELAY: usize = 0;
const FEEDBACK: usize = 1;

/// Delay node with bindable delay time and feedback
///
/// - `delay`: seconds, clamped to [1/sample_rate, max_delay]
/// - `feedback`: clamped to [0, 1]
///
/// # Example
/// ```ignore
/// // 250 ms echo with 40% feedback, up to 1 s of memory
/// let delay = DelayNode::new(0, 0.25, 0.4, 1.0, 44100.0)?;
/// ```
pub struct DelayNode {
    input: NodeId,     // Signal to delay
    params: ParamTable,
    ring: RingBuffer,  // Circular buffer with mirrored wrap slot
    max_delay: f32,    // Maximum delay time in seconds
    sample_rate: f32,  // Sample rate for calculations
}

impl DelayNode {
    /// # Parameters
    /// - `input`: NodeId providing signal to delay
    /// - `delay`: initial delay time in seconds (rebind with `set_param`)
    /// - `feedback`: amount of output written back into the line
    /// - `max_delay`: maximum delay time in seconds (determines buffer size)
    /// - `sample_rate`: sample rate in Hz (usually 44100.0)
    ///
    /// # Errors
    /// `DspError::Allocation` if the ring buffer cannot be allocated.
    pub fn new(
        input: NodeId,
        delay: f32,
        feedback: f32,
        max_delay: f32,
        sample_rate: f32,
    ) -> DspResult<Self> {
        let max_delay = max_delay.max(1.0 / sample_rate);

        Ok(Self {
            input,
            params: ParamTable::new(&[("delay", delay), ("feedback", feedback)]),
            ring: RingBuffer::for_duration(max_delay, sample_rate)?,
            max_delay,
            sample_rate,
        })
    }

    pub fn max_delay(&self) -> f32 {
        self.max_delay
    }

    /// Get the current write position in the buffer
    pub fn write_position(&self) -> usize {
        self.ring.write_position()
    }

    /// Get the buffer size
    pub fn buffer_size(&self) -> usize {
        self.ring.capacity()
    }
}

impl AudioNode for DelayNode {
    fn process_block(
        &mut self,
        inputs: &[&[f32]],
        output: &mut [f32],
        _sample_rate: f32,
        _context: &ProcessContext,
    ) {
        let mut inputs = InputCursor::new(inputs);
        let signal = inputs.signal();
        let params = self.params.resolve(&mut inputs);

        let min_delay = 1.0 / self.sample_rate;

        for (i, sample) in output.iter_mut().enumerate() {
            let delay = params.at(DELAY, i).clamp(min_delay, self.max_delay);
            let feedback = params.at(FEEDBACK, i).clamp(0.0, 1.0);

            let delayed = self.ring.read_linear(delay * self.sample_rate);
            *sample = delayed;

            self.ring.write(signal.at(i) + delayed * feedback);
        }

        params.scale_output(output);
    }

    fn signal_inputs(&self) -> Vec<NodeId> {
        vec![self.input]
    }

    fn params(&self) -> &ParamTable {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamTable {
        &mut self.params
    }

    fn reset(&mut self) {
        self.ring.clear();
    }

    fn name(&self) -> &str {
        "DelayNode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DspError;
    use crate::param::Param;

    const SAMPLE_RATE: f32 = 44100.0;

    /// Run `input` through the node in blocks of `block_size`
    fn run(node: &mut DelayNode, input: &[f32], block_size: usize) -> Vec<f32> {
        let context = ProcessContext::new(SAMPLE_RATE, block_size);
        let mut out = Vec::with_capacity(input.len());
        for chunk in input.chunks(block_size) {
            let mut block = vec![0.0; chunk.len()];
            node.process_block(&[chunk], &mut block, SAMPLE_RATE, &context);
            out.extend_from_slice(&block);
        }
        out
    }

    fn impulse(len: usize) -> Vec<f32> {
        let mut v = vec![0.0; len];
        v[0] = 1.0;
        v
    }

    #[test]
    fn test_half_second_impulse() {
        let mut delay = DelayNode::new(0, 0.5, 0.0, 1.0, SAMPLE_RATE).unwrap();
        let out = run(&mut delay, &impulse(30000), 512);

        assert!(out[..22050].iter().all(|&s| s == 0.0));
        assert_eq!(out[22050], 1.0);
        assert!(out[22051..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_fractional_delay_interpolates_neighbors() {
        // 10.25 samples: impulse split 0.75 / 0.25 across samples 10 and 11
        let mut delay = DelayNode::new(0, 10.25 / SAMPLE_RATE, 0.0, 0.01, SAMPLE_RATE).unwrap();
        let out = run(&mut delay, &impulse(64), 64);

        assert!((out[10] - 0.75).abs() < 1e-4, "got {}", out[10]);
        assert!((out[11] - 0.25).abs() < 1e-4, "got {}", out[11]);
        assert!(out[..10].iter().all(|&s| s == 0.0));
        assert!(out[12..].iter().all(|&s| s.abs() < 1e-6));
    }

    #[test]
    fn test_huge_max_delay_fails_to_allocate() {
        let result = DelayNode::new(0, 1.0, 0.0, 1e20, SAMPLE_RATE);
        assert!(matches!(result, Err(DspError::Allocation { .. })));
    }

    #[test]
    fn test_delay_floored_to_one_sample() {
        let mut delay = DelayNode::new(0, 0.0, 0.0, 0.01, SAMPLE_RATE).unwrap();
        let out = run(&mut delay, &[1.0, 2.0, 3.0, 0.0], 4);
        assert!((out[1] - 1.0).abs() < 1e-4);
        assert!((out[2] - 2.0).abs() < 1e-4);
        assert!((out[3] - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_feedback_echoes_decay_monotonically() {
        let mut delay = DelayNode::new(0, 100.0 / SAMPLE_RATE, 0.5, 0.1, SAMPLE_RATE).unwrap();
        let out = run(&mut delay, &impulse(1000), 128);

        let echoes: Vec<f32> = (1..=9).map(|k| out[k * 100]).collect();
        for pair in echoes.windows(2) {
            assert!(pair[1] < pair[0], "echoes grew: {:?}", echoes);
        }
        assert!((echoes[1] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_unity_feedback_sustains_and_overflow_is_clamped() {
        for feedback in [1.0, 3.0] {
            let mut delay =
                DelayNode::new(0, 50.0 / SAMPLE_RATE, feedback, 0.01, SAMPLE_RATE).unwrap();
            let out = run(&mut delay, &impulse(2000), 256);

            for k in 1..40 {
                assert!((out[k * 50] - 1.0).abs() < 1e-3, "echo {} = {}", k, out[k * 50]);
            }
        }
    }

    #[test]
    fn test_streamed_delay_time() {
        let mut delay = DelayNode::new(0, 0.0, 0.0, 0.01, SAMPLE_RATE).unwrap();
        delay.set_param("delay", Param::Streamed(9)).unwrap();
        assert_eq!(delay.input_nodes(), vec![0, 9]);

        let signal: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let delay_time = vec![4.0 / SAMPLE_RATE; 16];
        let context = ProcessContext::new(SAMPLE_RATE, 16);
        let mut out = vec![0.0; 16];
        delay.process_block(&[&signal[..], &delay_time[..]], &mut out, SAMPLE_RATE, &context);

        assert!((out[10] - 6.0).abs() < 1e-3, "got {}", out[10]);
    }

    #[test]
    fn test_reset_clears_buffer() {
        let mut delay = DelayNode::new(0, 0.001, 0.9, 0.01, SAMPLE_RATE).unwrap();
        run(&mut delay, &vec![1.0; 512], 512);
        delay.reset();
        assert_eq!(delay.write_position(), 0);
        let out = run(&mut delay, &vec![0.0; 512], 512);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
