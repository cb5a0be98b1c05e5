/// Tone node - one-pole lowpass
///
/// ```text
/// b  = 2 - cos(2π * freq / sample_rate)
/// c2 = b - sqrt(b² - 1)
/// y  = (1 - c2) * x + c2 * y[n-1]
/// ```

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::param::{InputCursor, ParamTable};
use std::f64::consts::PI;

const FREQ: usize = 0;

/// One-pole lowpass with a bindable cutoff, clamped to [0.1, sample_rate/2]
pub struct ToneNode {
    input: NodeId,
    params: ParamTable,
    y1: f32,
    coeff: f32,
    /// Cutoff the coefficient was computed from
    last_freq: f32,
    sample_rate: f32,
}

impl ToneNode {
    pub fn new(input: NodeId, freq: f32, sample_rate: f32) -> Self {
        Self {
            input,
            params: ParamTable::new(&[("freq", freq)]),
            y1: 0.0,
            coeff: 0.0,
            last_freq: -1.0,
            sample_rate,
        }
    }

    /// Pole position for a cutoff in Hz
    ///
    /// Evaluated in f64: near DC `b² - 1` cancels to zero in single precision.
    pub fn pole(freq: f32, sample_rate: f32) -> f32 {
        let b = 2.0 - (2.0 * PI * freq as f64 / sample_rate as f64).cos();
        (b - (b * b - 1.0).sqrt()) as f32
    }
}

impl AudioNode for ToneNode {
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

        for (i, sample) in output.iter_mut().enumerate() {
            let freq = params.at(FREQ, i).clamp(0.1, self.sample_rate * 0.5);
            if freq != self.last_freq {
                self.coeff = Self::pole(freq, self.sample_rate);
                self.last_freq = freq;
            }

            self.y1 = (1.0 - self.coeff) * signal.at(i) + self.coeff * self.y1;
            *sample = self.y1;
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
        self.y1 = 0.0;
    }

    fn name(&self) -> &str {
        "ToneNode"
    }
}
