/// Unit delay - outputs the previous input sample
use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::param::{InputCursor, ParamTable};

/// One-sample delay with a single stored value
pub struct Delay1Node {
    input: NodeId,
    last: f32,
    params: ParamTable,
}

impl Delay1Node {
    pub fn new(input: NodeId) -> Self {
        Self {
            input,
            last: 0.0,
            params: ParamTable::new(&[]),
        }
    }
}

impl AudioNode for Delay1Node {
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
            *sample = self.last;
            self.last = signal.at(i);
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
        self.last = 0.0;
    }

    fn name(&self) -> &str {
        "Delay1Node"
    }
}
