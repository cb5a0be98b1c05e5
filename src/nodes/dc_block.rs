/// DC blocker node - fixed first-order highpass
///
/// `y[n] = x[n] - x[n-1] + 0.995 * y[n-1]`, the same filter that sits inside
/// the waveguide feedback loop.

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::dsp::DcBlocker;
use crate::param::{InputCursor, ParamTable};

pub struct DcBlockNode {
    input: NodeId,
    params: ParamTable,
    blocker: DcBlocker,
}

impl DcBlockNode {
    pub fn new(input: NodeId) -> Self {
        Self {
            input,
            params: ParamTable::new(&[]),
            blocker: DcBlocker::new(),
        }
    }
}

impl AudioNode for DcBlockNode {
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
            *sample = self.blocker.process(signal.at(i));
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
        self.blocker.reset();
    }

    fn name(&self) -> &str {
        "DcBlockNode"
    }
}
