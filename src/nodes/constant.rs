/// Constant value node - outputs a fixed or streamed value
///
/// The simplest AudioNode. With `value` constant it fills the block with that
/// value; with `value` streamed it passes the other node's block through, so it
/// doubles as a plain signal holder with its own `mul`/`add` stage.
use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::param::{InputCursor, ParamTable};

const VALUE: usize = 0;

/// Constant value node
///
/// # Example
/// ```ignore
/// // Output 440.0 (frequency for A4 note)
/// let node = ConstantNode::new(440.0);
/// ```
pub struct ConstantNode {
    params: ParamTable,
}

impl ConstantNode {
    /// Create a new constant value node
    pub fn new(value: f32) -> Self {
        Self {
            params: ParamTable::new(&[("value", value)]),
        }
    }
}

impl AudioNode for ConstantNode {
    fn process_block(
        &mut self,
        inputs: &[&[f32]],
        output: &mut [f32],
        _sample_rate: f32,
        _context: &ProcessContext,
    ) {
        let mut inputs = InputCursor::new(inputs);
        let params = self.params.resolve(&mut inputs);

        for (i, sample) in output.iter_mut().enumerate() {
            *sample = params.at(VALUE, i);
        }

        params.scale_output(output);
    }

    fn signal_inputs(&self) -> Vec<NodeId> {
        vec![] // No dependencies (source node)
    }

    fn params(&self) -> &ParamTable {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamTable {
        &mut self.params
    }

    fn name(&self) -> &str {
        "ConstantNode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Param;

    #[test]
    fn test_constant_node_output() {
        let mut node = ConstantNode::new(440.0);
        let mut output = vec![0.0; 512];

        let context = ProcessContext::new(44100.0, 512);

        node.process_block(&[], &mut output, 44100.0, &context);

        // Every sample should be 440.0
        for sample in &output {
            assert_eq!(*sample, 440.0);
        }
    }

    #[test]
    fn test_constant_node_streamed_value_passes_through() {
        let mut node = ConstantNode::new(0.0);
        node.set_param("value", Param::Streamed(4)).unwrap();
        assert_eq!(node.input_nodes(), vec![4]);

        let source = [0.1f32, 0.2, 0.3, 0.4];
        let inputs: Vec<&[f32]> = vec![&source[..]];
        let mut output = vec![0.0; 4];
        node.process_block(&inputs, &mut output, 44100.0, &ProcessContext::new(44100.0, 4));
        assert_eq!(output, source.to_vec());
    }
}
