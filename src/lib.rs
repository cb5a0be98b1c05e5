//! # Sonance - Block-Based DSP Engine
//!
//! Sonance is a library of real-time audio nodes that run once per block in a
//! producer-before-consumer graph. Every node parameter can be a constant or
//! another node's output, and every node carries the same `mul`/`add` output
//! stage.
//!
//! ## Core Features
//!
//! - **Rate-Polymorphic Parameters**: any parameter is `Constant` or `Streamed`
//! - **Delay Lines**: interpolated feedback delay, crossfade-retuned delay, integer and unit delays
//! - **Dynamics**: soft-knee compressor, two-threshold expander, noise gate, all with look-ahead
//! - **Filters**: RBJ biquad, one-pole tone, portamento, DC blocker
//! - **Physical Models**: Lagrange-tuned string waveguide and an all-pass detuned variant
//! - **Graph Execution**: topological ordering, cycle rejection, play/stop and reset
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sonance::{AudioNodeGraph, EngineConfig, Param};
//! use sonance::nodes::{ImpulseNode, NoiseNode, WaveguideNode};
//!
//! let mut graph = AudioNodeGraph::new(EngineConfig::default());
//! let sr = graph.sample_rate();
//!
//! let pluck = graph.add_audio_node(Box::new(ImpulseNode::new()));
//! let string = graph.add_audio_node(Box::new(WaveguideNode::new(pluck, 220.0, 2.0, 20.0, sr)?));
//!
//! // Pitch jitter: drive the string frequency from another node
//! let jitter = graph.add_audio_node(Box::new(NoiseNode::new()));
//! graph.set_param(jitter, "mul", Param::Constant(2.0))?;
//! graph.set_param(jitter, "add", Param::Constant(220.0))?;
//! graph.set_param(string, "freq", Param::Streamed(jitter))?;
//!
//! graph.set_output(string);
//! graph.build_processor()?;
//! let audio = graph.render(44100)?;
//! ```
//!
//! ## Modules
//!
//! - [`param`]: parameter bindings and the output scale stage
//! - [`audio_node`]: the node trait and processing context
//! - [`dsp`]: ring buffer, envelope follower, look-ahead, DC blocker, Lagrange taps
//! - [`nodes`]: concrete nodes
//! - [`dependency_graph`], [`block_processor`], [`audio_node_graph`]: graph execution
//! - [`config`]: engine configuration
//! - [`error`]: crate error type

pub mod audio_node;
pub mod audio_node_graph;
pub mod block_processor;
pub mod config;
pub mod dependency_graph;
pub mod dsp;
pub mod error;
pub mod nodes;
pub mod param;

pub use audio_node::{AudioNode, NodeId, ProcessContext};
pub use audio_node_graph::AudioNodeGraph;
pub use block_processor::BlockProcessor;
pub use config::EngineConfig;
pub use error::{DspError, DspResult};
pub use param::{Param, ParamTable, ScaleOrder};
