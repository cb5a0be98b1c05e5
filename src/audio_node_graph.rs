//! AudioNodeGraph - block-based audio graph facade
//!
//! Collects nodes, then hands them to a [`BlockProcessor`] that runs them once
//! per tick. Parameter rebinding, play/stop and reset go through the graph
//! between ticks.

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::block_processor::BlockProcessor;
use crate::config::EngineConfig;
use crate::error::{DspError, DspResult};
use crate::param::Param;

/// Block-based audio graph
///
/// # Example
/// ```ignore
/// let mut graph = AudioNodeGraph::new(EngineConfig::default());
/// let sr = graph.sample_rate();
///
/// let pluck = graph.add_audio_node(Box::new(ImpulseNode::new()));
/// let string = graph.add_audio_node(Box::new(WaveguideNode::new(pluck, 220.0, 2.0, 20.0, sr)?));
/// graph.set_output(string);
///
/// graph.build_processor()?;
/// let audio = graph.render(44100)?;
/// ```
pub struct AudioNodeGraph {
    /// Nodes added before the processor is built
    audio_nodes: Vec<Box<dyn AudioNode>>,

    config: EngineConfig,

    /// Blocks processed so far
    tick: u64,

    /// Main output node
    output_node: Option<NodeId>,

    /// Block processor (created after all nodes added)
    block_processor: Option<BlockProcessor>,
}

impl AudioNodeGraph {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            audio_nodes: Vec::new(),
            config,
            tick: 0,
            output_node: None,
            block_processor: None,
        }
    }

    /// Add an audio node to the graph
    ///
    /// Returns the NodeId that can be used to reference this node
    pub fn add_audio_node(&mut self, node: Box<dyn AudioNode>) -> NodeId {
        let node_id = self.audio_nodes.len();
        self.audio_nodes.push(node);
        node_id
    }

    /// Set the main output node
    pub fn set_output(&mut self, node_id: NodeId) {
        self.output_node = Some(node_id);
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    /// Build the block processor from accumulated nodes
    ///
    /// # Errors
    /// - If no output node is set
    /// - If the dependency graph has cycles or dangling references
    pub fn build_processor(&mut self) -> DspResult<()> {
        let output_node = self.output_node.ok_or(DspError::NoOutput)?;

        let nodes = std::mem::take(&mut self.audio_nodes);
        self.block_processor = Some(BlockProcessor::new(
            nodes,
            output_node,
            self.config.block_size,
        )?);

        Ok(())
    }

    /// Bind a node parameter to a constant or another node's output
    pub fn set_param(&mut self, node_id: NodeId, name: &str, binding: Param) -> DspResult<()> {
        match self.block_processor.as_mut() {
            Some(processor) => processor.set_param(node_id, name, binding),
            None => {
                if let Some(source) = binding.node() {
                    if source >= self.audio_nodes.len() {
                        return Err(DspError::InvalidNode(source));
                    }
                }
                self.audio_nodes
                    .get_mut(node_id)
                    .ok_or(DspError::InvalidNode(node_id))?
                    .set_param(name, binding)
            }
        }
    }

    pub fn param(&self, node_id: NodeId, name: &str) -> DspResult<Param> {
        match self.block_processor.as_ref() {
            Some(processor) => processor.param(node_id, name),
            None => self
                .audio_nodes
                .get(node_id)
                .ok_or(DspError::InvalidNode(node_id))?
                .param(name)
                .ok_or_else(|| DspError::UnknownParam(name.to_string())),
        }
    }

    /// Start a stopped node
    pub fn play(&mut self, node_id: NodeId) -> DspResult<()> {
        self.processor_mut()?.set_active(node_id, true)
    }

    /// Stop a node: it is no longer processed and outputs silence
    pub fn stop(&mut self, node_id: NodeId) -> DspResult<()> {
        self.processor_mut()?.set_active(node_id, false)
    }

    /// Zero one node's memories
    pub fn reset(&mut self, node_id: NodeId) -> DspResult<()> {
        self.processor_mut()?.reset_node(node_id)
    }

    /// Zero every node's memories and rewind the tick counter
    pub fn reset_all(&mut self) -> DspResult<()> {
        self.processor_mut()?.reset_all();
        self.tick = 0;
        Ok(())
    }

    /// Process one block into `buffer` (length = block size)
    ///
    /// # Errors
    /// - If `buffer` is not exactly one block long
    /// - If build_processor() hasn't been called
    pub fn process_buffer(&mut self, buffer: &mut [f32]) -> DspResult<()> {
        if buffer.len() != self.config.block_size {
            return Err(DspError::InvalidConfig(format!(
                "buffer holds {} samples, block size is {}",
                buffer.len(),
                self.config.block_size
            )));
        }

        let mut context = ProcessContext::new(self.config.sample_rate, buffer.len());
        context.tick = self.tick;

        let block_processor = self.block_processor.as_mut().ok_or(DspError::NotBuilt)?;
        block_processor.process_block(buffer, &context)?;

        self.tick += 1;
        Ok(())
    }

    /// Render audio to a buffer
    ///
    /// Processes whole blocks; a trailing partial block is rendered into a
    /// scratch block and truncated.
    pub fn render(&mut self, num_samples: usize) -> DspResult<Vec<f32>> {
        let block_size = self.config.block_size;
        let mut buffer = vec![0.0; num_samples];
        let mut scratch = vec![0.0; block_size];
        let mut offset = 0;

        while offset < num_samples {
            let chunk_size = (num_samples - offset).min(block_size);

            if chunk_size == block_size {
                self.process_buffer(&mut buffer[offset..offset + chunk_size])?;
            } else {
                self.process_buffer(&mut scratch)?;
                buffer[offset..offset + chunk_size].copy_from_slice(&scratch[..chunk_size]);
            }

            offset += chunk_size;
        }

        Ok(buffer)
    }

    /// Most recent output block of any node
    pub fn node_output(&self, node_id: NodeId) -> Option<&[f32]> {
        self.block_processor.as_ref()?.node_output(node_id)
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        match &self.block_processor {
            Some(processor) => processor.node_count(),
            None => self.audio_nodes.len(),
        }
    }

    /// Check if the processor has been built
    pub fn is_ready(&self) -> bool {
        self.block_processor.is_some()
    }

    fn processor_mut(&mut self) -> DspResult<&mut BlockProcessor> {
        self.block_processor.as_mut().ok_or(DspError::NotBuilt)
    }
}

impl Default for AudioNodeGraph {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
