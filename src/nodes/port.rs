/// Port node - portamento / asymmetric slew limiter
///
/// Glides toward the input with separate rise and fall times. The direction
/// only flips when the input strictly crosses its previous value, so a held
/// value keeps the coefficient of the last movement.
///
/// ```text
/// rising  = x > x[n-1] ? true : x < x[n-1] ? false : rising
/// y       = x + coeff * (y[n-1] - x)      coeff = rising ? rise : fall
/// ```

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::dsp::SmoothingCoeff;
use crate::param::{InputCursor, ParamTable};

const RISETIME: usize = 0;
const FALLTIME: usize = 1;

/// Portamento node
///
/// # Example
/// ```ignore
/// // 50 ms glide up, 200 ms glide down, starting from 220 Hz
/// let glide = PortNode::new(pitch, 0.05, 0.2, 220.0, 44100.0);
/// ```
pub struct PortNode {
    input: NodeId,
    params: ParamTable,
    rise: SmoothingCoeff,
    fall: SmoothingCoeff,
    y1: f32,
    x1: f32,
    rising: bool,
    /// Value the output starts from, and returns to on reset
    init: f32,
    sample_rate: f32,
}

impl PortNode {
    pub fn new(input: NodeId, risetime: f32, falltime: f32, init: f32, sample_rate: f32) -> Self {
        Self {
            input,
            params: ParamTable::new(&[("risetime", risetime), ("falltime", falltime)]),
            rise: SmoothingCoeff::new(risetime, sample_rate),
            fall: SmoothingCoeff::new(falltime, sample_rate),
            y1: init,
            x1: init,
            rising: true,
            init,
            sample_rate,
        }
    }

    pub fn is_rising(&self) -> bool {
        self.rising
    }
}

impl AudioNode for PortNode {
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
            let x = signal.at(i);
            let rise = self.rise.update(params.at(RISETIME, i), self.sample_rate);
            let fall = self.fall.update(params.at(FALLTIME, i), self.sample_rate);

            if x > self.x1 {
                self.rising = true;
            } else if x < self.x1 {
                self.rising = false;
            }
            self.x1 = x;

            let coeff = if self.rising { rise } else { fall };
            self.y1 = x + coeff * (self.y1 - x);
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
        self.y1 = self.init;
        self.x1 = self.init;
        self.rising = true;
    }

    fn name(&self) -> &str {
        "PortNode"
    }
}
