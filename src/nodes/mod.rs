/// Audio node implementations for block-based processing
///
/// This module contains concrete implementations of the AudioNode trait.
/// Every node declares its parameters in a [`ParamTable`](crate::param::ParamTable),
/// so any of them (including `mul` and `add`) can be bound to a constant or to
/// another node's output.
///
/// # Node Categories
///
/// ## Source Nodes
/// - [`constant::ConstantNode`] - Output a constant (or streamed) value
/// - [`noise::NoiseNode`] - Uniform white noise
/// - [`impulse::ImpulseNode`] - Single-sample spikes, one-shot or periodic
///
/// ## Delay Nodes
/// - [`delay::DelayNode`] - Interpolated delay line with feedback
/// - [`smooth_delay::SmoothDelayNode`] - Delay retuned by crossfading two taps
/// - [`sdelay::SDelayNode`] - Integer-sample delay, no interpolation
/// - [`delay1::Delay1Node`] - One-sample delay
///
/// ## Dynamics Nodes
/// - [`compressor::CompressorNode`] - Soft-knee compressor with look-ahead
/// - [`gate::GateNode`] - Noise gate with smoothed open/close
/// - [`expander::ExpanderNode`] - Two-threshold expander
///
/// ## Filter Nodes
/// - [`biquad::BiquadNode`] - RBJ biquad (lowpass, highpass, bandpass, bandstop, allpass)
/// - [`tone::ToneNode`] - One-pole lowpass
/// - [`port::PortNode`] - Portamento with separate rise and fall times
/// - [`dc_block::DcBlockNode`] - DC blocker
///
/// ## Physical Models
/// - [`waveguide::WaveguideNode`] - Damped string waveguide
/// - [`allpass_waveguide::AllpassWaveguideNode`] - Waveguide with detuned all-pass diffusion

pub mod allpass_waveguide;
pub mod biquad;
pub mod compressor;
pub mod constant;
pub mod dc_block;
pub mod delay;
pub mod delay1;
pub mod expander;
pub mod gate;
pub mod impulse;
pub mod noise;
pub mod port;
pub mod sdelay;
pub mod smooth_delay;
pub mod tone;
pub mod waveguide;

pub use allpass_waveguide::AllpassWaveguideNode;
pub use biquad::{BiquadCoeffs, BiquadNode, FilterType};
pub use compressor::CompressorNode;
pub use constant::ConstantNode;
pub use dc_block::DcBlockNode;
pub use delay::DelayNode;
pub use delay1::Delay1Node;
pub use expander::ExpanderNode;
pub use gate::GateNode;
pub use impulse::ImpulseNode;
pub use noise::NoiseNode;
pub use port::PortNode;
pub use sdelay::SDelayNode;
pub use smooth_delay::SmoothDelayNode;
pub use tone::ToneNode;
pub use waveguide::WaveguideNode;
