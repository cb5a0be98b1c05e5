/// Sample delay - integer delay line without interpolation or feedback

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::dsp::RingBuffer;
use crate::error::DspResult;
use crate::param::{InputCursor, ParamTable};

const DELAY: usize = 0;

/// Integer-sample delay
///
/// `delay` is in seconds and rounded to whole samples, clamped to the buffer.
/// A delay that rounds to 0 copies the input straight through.
pub struct SDelayNode {
    input: NodeId,
    params: ParamTable,
    ring: RingBuffer,
    sample_rate: f32,
}

impl SDelayNode {
    /// # Errors
    /// `DspError::Allocation` if the ring buffer cannot be allocated.
    pub fn new(input: NodeId, delay: f32, max_delay: f32, sample_rate: f32) -> DspResult<Self> {
        Ok(Self {
            input,
            params: ParamTable::new(&[("delay", delay)]),
            ring: RingBuffer::for_duration(max_delay, sample_rate)?,
            sample_rate,
        })
    }

    /// Longest delay in samples
    pub fn max_delay_samples(&self) -> usize {
        self.ring.max_delay_samples()
    }
}

impl AudioNode for SDelayNode {
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

        let max = self.ring.max_delay_samples();

        for (i, sample) in output.iter_mut().enumerate() {
            let x = signal.at(i);
            let samples = ((params.at(DELAY, i) * self.sample_rate).round().max(0.0) as usize).min(max);

            self.ring.write(x);
            *sample = if samples == 0 { x } else { self.ring.read(samples + 1) };
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
        "SDelayNode"
    }
}
