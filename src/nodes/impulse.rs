/// Impulse node - single-sample spikes
///
/// Emits 1.0 on the first sample after construction or reset, then one spike
/// per period when `freq` is above zero. With the default `freq` of 0 it is a
/// one-shot excitation for plucked waveguides.

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::param::{InputCursor, ParamTable};

const FREQ: usize = 0;

/// Impulse generator node
///
/// # Example
/// ```ignore
/// let pluck = ImpulseNode::new();          // one spike, then silence
/// let clock = ImpulseNode::with_freq(2.0); // two spikes per second
/// ```
pub struct ImpulseNode {
    params: ParamTable,
    phase: f32, // Internal state; a spike fires when it reaches 1.0
}

impl ImpulseNode {
    pub fn new() -> Self {
        Self::with_freq(0.0)
    }

    pub fn with_freq(freq: f32) -> Self {
        Self {
            params: ParamTable::new(&[("freq", freq)]),
            phase: 1.0,
        }
    }
}

impl Default for ImpulseNode {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioNode for ImpulseNode {
    fn process_block(
        &mut self,
        inputs: &[&[f32]],
        output: &mut [f32],
        sample_rate: f32,
        _context: &ProcessContext,
    ) {
        let mut inputs = InputCursor::new(inputs);
        let params = self.params.resolve(&mut inputs);

        for (i, sample) in output.iter_mut().enumerate() {
            if self.phase >= 1.0 {
                *sample = 1.0; // Impulse!
                self.phase -= self.phase.floor();
            } else {
                *sample = 0.0;
            }

            let freq = params.at(FREQ, i).clamp(0.0, sample_rate * 0.5);
            self.phase += freq / sample_rate;
        }

        params.scale_output(output);
    }

    fn signal_inputs(&self) -> Vec<NodeId> {
        vec![]
    }

    fn params(&self) -> &ParamTable {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamTable {
        &mut self.params
    }

    fn reset(&mut self) {
        self.phase = 1.0;
    }

    fn name(&self) -> &str {
        "ImpulseNode"
    }
}
