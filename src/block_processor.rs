/// Block-based audio graph processor
///
/// This module implements the core execution loop: every active node runs
/// exactly once per tick, in topological order, reading the blocks its
/// producers wrote earlier in the same tick.

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::dependency_graph::DependencyGraph;
use crate::error::{DspError, DspResult};
use crate::param::Param;
use tracing::debug;

/// Block-based audio graph processor
///
/// # Example
/// ```ignore
/// let nodes: Vec<Box<dyn AudioNode>> = vec![
///     Box::new(ImpulseNode::new()),
///     Box::new(WaveguideNode::new(0, 220.0, 2.0, 20.0, 44100.0)?),
/// ];
///
/// let mut processor = BlockProcessor::new(nodes, 1, 512)?;
///
/// let mut output = vec![0.0; 512];
/// let context = ProcessContext::new(44100.0, 512);
/// processor.process_block(&mut output, &context)?;
/// ```
pub struct BlockProcessor {
    nodes: Vec<Box<dyn AudioNode>>,
    /// One output block per node, overwritten every tick
    node_outputs: Vec<Vec<f32>>,
    /// Play/stop flags; stopped nodes are skipped
    active: Vec<bool>,
    exec_order: Vec<NodeId>,
    output_node: NodeId,
    buffer_size: usize,
}

impl BlockProcessor {
    /// Create a new block processor
    ///
    /// # Errors
    /// - If output_node is invalid
    /// - If a node references a missing input or the graph has a cycle
    pub fn new(
        nodes: Vec<Box<dyn AudioNode>>,
        output_node: NodeId,
        buffer_size: usize,
    ) -> DspResult<Self> {
        if output_node >= nodes.len() {
            return Err(DspError::InvalidNode(output_node));
        }

        let exec_order = DependencyGraph::build(&nodes)?.execution_order()?;
        debug!("Execution order: {:?}", exec_order);

        let node_outputs = vec![vec![0.0; buffer_size]; nodes.len()];
        let active = vec![true; nodes.len()];

        Ok(Self {
            nodes,
            node_outputs,
            active,
            exec_order,
            output_node,
            buffer_size,
        })
    }

    /// Process entire block - graph traversed ONCE
    ///
    /// # Arguments
    /// * `output` - Output buffer to write to (length = buffer size)
    /// * `context` - Processing context
    pub fn process_block(&mut self, output: &mut [f32], context: &ProcessContext) -> DspResult<()> {
        if output.len() != self.buffer_size {
            return Err(DspError::InvalidConfig(format!(
                "output buffer holds {} samples, block size is {}",
                output.len(),
                self.buffer_size
            )));
        }

        for &node_id in &self.exec_order {
            if !self.active[node_id] {
                continue;
            }

            // Detach this node's block so upstream blocks can be borrowed alongside it
            let mut node_buffer = std::mem::take(&mut self.node_outputs[node_id]);

            let input_ids = self.nodes[node_id].input_nodes();
            let input_buffers: Vec<&[f32]> = input_ids
                .iter()
                .map(|&id| self.node_outputs[id].as_slice())
                .collect();

            self.nodes[node_id].process_block(
                &input_buffers,
                &mut node_buffer,
                context.sample_rate,
                context,
            );

            self.node_outputs[node_id] = node_buffer;
        }

        output.copy_from_slice(&self.node_outputs[self.output_node]);
        Ok(())
    }

    /// Rebind a node parameter, re-deriving the execution order
    ///
    /// A binding that would create a cycle or point at a missing node is
    /// rejected and the previous binding restored.
    pub fn set_param(&mut self, node_id: NodeId, name: &str, binding: Param) -> DspResult<()> {
        self.check_node(node_id)?;
        if let Some(source) = binding.node() {
            self.check_node(source)?;
        }

        let node = &mut self.nodes[node_id];
        let previous = node
            .param(name)
            .ok_or_else(|| DspError::UnknownParam(name.to_string()))?;
        node.set_param(name, binding)?;

        if previous.node() == binding.node() {
            return Ok(());
        }

        match DependencyGraph::build(&self.nodes).and_then(|g| g.execution_order()) {
            Ok(order) => {
                debug!("Execution order after rebinding {}.{}: {:?}", node_id, name, order);
                self.exec_order = order;
                Ok(())
            }
            Err(e) => {
                self.nodes[node_id].set_param(name, previous)?;
                Err(e)
            }
        }
    }

    pub fn param(&self, node_id: NodeId, name: &str) -> DspResult<Param> {
        self.check_node(node_id)?;
        self.nodes[node_id]
            .param(name)
            .ok_or_else(|| DspError::UnknownParam(name.to_string()))
    }

    /// Play/stop a node; a stopped node outputs silence
    pub fn set_active(&mut self, node_id: NodeId, active: bool) -> DspResult<()> {
        self.check_node(node_id)?;
        if self.active[node_id] && !active {
            self.node_outputs[node_id].fill(0.0);
        }
        self.active[node_id] = active;
        Ok(())
    }

    pub fn is_active(&self, node_id: NodeId) -> bool {
        self.active.get(node_id).copied().unwrap_or(false)
    }

    /// Zero one node's memories and output block
    pub fn reset_node(&mut self, node_id: NodeId) -> DspResult<()> {
        self.check_node(node_id)?;
        self.nodes[node_id].reset();
        self.node_outputs[node_id].fill(0.0);
        Ok(())
    }

    pub fn reset_all(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
        for buffer in &mut self.node_outputs {
            buffer.fill(0.0);
        }
    }

    /// Most recent output block of a node
    pub fn node_output(&self, node_id: NodeId) -> Option<&[f32]> {
        self.node_outputs.get(node_id).map(Vec::as_slice)
    }

    /// Get number of nodes in graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get output node ID
    pub fn output_node(&self) -> NodeId {
        self.output_node
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Get execution order (for debugging)
    pub fn execution_order(&self) -> &[NodeId] {
        &self.exec_order
    }

    fn check_node(&self, node_id: NodeId) -> DspResult<()> {
        if node_id < self.nodes.len() {
            Ok(())
        } else {
            Err(DspError::InvalidNode(node_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{ConstantNode, Delay1Node};

    fn context() -> ProcessContext {
        ProcessContext::new(44100.0, 512)
    }

    #[test]
    fn test_block_processor_simple_constant() {
        let nodes: Vec<Box<dyn AudioNode>> = vec![Box::new(ConstantNode::new(440.0))];

        let mut processor = BlockProcessor::new(nodes, 0, 512).unwrap();

        let mut output = vec![0.0; 512];
        processor.process_block(&mut output, &context()).unwrap();

        for sample in &output {
            assert_eq!(*sample, 440.0);
        }
    }

    #[test]
    fn test_streamed_param_reads_current_block() {
        // Node 1 passes node 0 through, scaled by node 2 (mul streamed)
        let nodes: Vec<Box<dyn AudioNode>> = vec![
            Box::new(ConstantNode::new(3.0)),
            Box::new(Delay1Node::new(0)),
            Box::new(ConstantNode::new(2.0)),
        ];
        let mut processor = BlockProcessor::new(nodes, 1, 512).unwrap();
        processor.set_param(1, "mul", Param::Streamed(2)).unwrap();

        let order = processor.execution_order();
        let pos = |id| order.iter().position(|&n| n == id).unwrap();
        assert!(pos(2) < pos(1));

        let mut output = vec![0.0; 512];
        processor.process_block(&mut output, &context()).unwrap();
        assert_eq!(output[0], 0.0);
        assert_eq!(output[1], 6.0);
        assert_eq!(output[511], 6.0);
    }

    #[test]
    fn test_rebinding_into_cycle_is_rejected() {
        let nodes: Vec<Box<dyn AudioNode>> = vec![
            Box::new(ConstantNode::new(1.0)),
            Box::new(Delay1Node::new(0)),
        ];
        let mut processor = BlockProcessor::new(nodes, 1, 512).unwrap();

        let result = processor.set_param(0, "value", Param::Streamed(1));
        assert!(matches!(result, Err(DspError::Cycle(_))));
        assert_eq!(processor.param(0, "value").unwrap(), Param::Constant(1.0));
    }

    #[test]
    fn test_stopped_node_outputs_silence() {
        let nodes: Vec<Box<dyn AudioNode>> = vec![Box::new(ConstantNode::new(1.0))];
        let mut processor = BlockProcessor::new(nodes, 0, 512).unwrap();
        let mut output = vec![0.0; 512];

        processor.process_block(&mut output, &context()).unwrap();
        assert_eq!(output[0], 1.0);
        assert!(processor.is_active(0));

        processor.set_active(0, false).unwrap();
        assert!(!processor.is_active(0));
        processor.process_block(&mut output, &context()).unwrap();
        assert!(output.iter().all(|&s| s == 0.0));

        processor.set_active(0, true).unwrap();
        assert!(processor.is_active(0));
        processor.process_block(&mut output, &context()).unwrap();
        assert_eq!(output[0], 1.0);

        assert!(!processor.is_active(7));
    }

    #[test]
    fn test_wrong_output_length_is_an_error() {
        let nodes: Vec<Box<dyn AudioNode>> = vec![Box::new(ConstantNode::new(1.0))];
        let mut processor = BlockProcessor::new(nodes, 0, 512).unwrap();

        for len in [100, 1024] {
            let mut output = vec![0.0; len];
            let result = processor.process_block(&mut output, &context());
            assert!(matches!(result, Err(DspError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_block_processor_invalid_output_node() {
        let nodes: Vec<Box<dyn AudioNode>> = vec![Box::new(ConstantNode::new(1.0))];

        // Output node 5 doesn't exist (only have node 0)
        let result = BlockProcessor::new(nodes, 5, 512);
        assert!(matches!(result, Err(DspError::InvalidNode(5))));
    }

    #[test]
    fn test_unknown_param() {
        let nodes: Vec<Box<dyn AudioNode>> = vec![Box::new(ConstantNode::new(1.0))];
        let mut processor = BlockProcessor::new(nodes, 0, 512).unwrap();
        assert!(matches!(
            processor.set_param(0, "cutoff", Param::Constant(1.0)),
            Err(DspError::UnknownParam(_))
        ));
    }
}
