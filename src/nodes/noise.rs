/// White noise generator
///
/// Generates uniform random values in [-1, 1) using a seedable random number
/// generator. White noise has equal energy across all frequencies, which makes
/// it a good excitation for the waveguide models.
use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::param::{InputCursor, ParamTable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// White noise node, scaled by its `mul` parameter
///
/// # Example
/// ```ignore
/// let noise = NoiseNode::new();
/// noise.set_param("mul", Param::Constant(0.5))?;  // [-0.5, 0.5)
/// ```
pub struct NoiseNode {
    params: ParamTable,
    rng: StdRng,
    seed: Option<u64>,
}

impl NoiseNode {
    pub fn new() -> Self {
        Self {
            params: ParamTable::new(&[]),
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Create a new noise node with a specific seed
    ///
    /// `reset()` restarts the same sequence.
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            params: ParamTable::new(&[]),
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }
}

impl Default for NoiseNode {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioNode for NoiseNode {
    fn process_block(
        &mut self,
        inputs: &[&[f32]],
        output: &mut [f32],
        _sample_rate: f32,
        _context: &ProcessContext,
    ) {
        let mut inputs = InputCursor::new(inputs);
        let params = self.params.resolve(&mut inputs);

        for sample in output.iter_mut() {
            *sample = self.rng.gen_range(-1.0..1.0);
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
        if let Some(seed) = self.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
    }

    fn name(&self) -> &str {
        "NoiseNode"
    }
}
