/// Block-based audio processing - core node contract
///
/// This module defines the AudioNode trait. Every node pulls its upstream
/// blocks, resolves its parameters, runs its per-sample algorithm and applies
/// the shared `mul`/`add` output stage.

use crate::error::DspResult;
use crate::param::{Param, ParamTable};

pub type NodeId = usize;

/// Context passed to all nodes during block processing
///
/// Fixed for the lifetime of a graph except for `tick`.
#[derive(Debug, Clone)]
pub struct ProcessContext {
    /// Sample rate (usually 44100.0 Hz)
    pub sample_rate: f32,

    /// Number of samples to process in this block (usually 512)
    pub block_size: usize,

    /// Number of blocks processed before this one
    pub tick: u64,
}

impl ProcessContext {
    /// Create a new process context
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        Self {
            sample_rate,
            block_size,
            tick: 0,
        }
    }

    /// Time in seconds at the start of the current block
    pub fn block_start_seconds(&self) -> f64 {
        (self.tick * self.block_size as u64) as f64 / self.sample_rate as f64
    }
}

/// Core trait for block-based audio processing
///
/// The `inputs` slice handed to `process_block` always follows the order of
/// `input_nodes()`: signal inputs first, then every streamed parameter in
/// declaration order (with `mul` and `add` last). Nodes read it through an
/// [`InputCursor`](crate::param::InputCursor) so the two sides cannot drift.
pub trait AudioNode: Send {
    /// Process an entire block of audio
    ///
    /// # Arguments
    /// * `inputs` - Upstream blocks, ordered as `input_nodes()`
    /// * `output` - Output buffer to write to (length = block_size)
    /// * `sample_rate` - Current sample rate (44100.0 Hz)
    /// * `context` - Processing context
    ///
    /// Must not allocate.
    fn process_block(
        &mut self,
        inputs: &[&[f32]],
        output: &mut [f32],
        sample_rate: f32,
        context: &ProcessContext,
    );

    /// Audio-rate signal inputs, without parameter streams
    fn signal_inputs(&self) -> Vec<NodeId>;

    /// Parameter bindings of this node (always includes `mul` and `add`)
    fn params(&self) -> &ParamTable;

    fn params_mut(&mut self) -> &mut ParamTable;

    /// Zero all internal memories without reallocating
    fn reset(&mut self) {}

    /// Get a human-readable name for this node (for debugging)
    fn name(&self) -> &str {
        "AudioNode"
    }

    /// Return list of input node IDs this node depends on
    ///
    /// Signal inputs followed by the nodes behind streamed parameters, in the
    /// order they appear in the `inputs` array passed to process_block.
    fn input_nodes(&self) -> Vec<NodeId> {
        let mut ids = self.signal_inputs();
        ids.extend(self.params().streamed_inputs());
        ids
    }

    /// Current binding of a named parameter
    fn param(&self, name: &str) -> Option<Param> {
        self.params().get(name)
    }

    /// Swap the binding of a named parameter (between ticks only)
    fn set_param(&mut self, name: &str, binding: Param) -> DspResult<()> {
        self.params_mut().set(name, binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_context_block_start() {
        let mut ctx = ProcessContext::new(44100.0, 441);
        assert_eq!(ctx.block_start_seconds(), 0.0);

        ctx.tick = 100;
        assert!((ctx.block_start_seconds() - 1.0).abs() < 1e-9);
    }
}
