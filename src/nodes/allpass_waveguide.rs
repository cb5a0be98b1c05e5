/// All-pass waveguide node - waveguide with detuned all-pass diffusion
///
/// The waveguide loop of [`WaveguideNode`](super::WaveguideNode) with three
/// parallel Schroeder all-pass sections inserted before the damping filter.
/// Their delays are a fraction of the loop length set by `detune`, each with a
/// slightly different ratio, so the single resonance splits into close
/// partials that beat like a chorus.
///
/// ```text
/// m_j   = loop_delay * (detune * 0.95 + 0.05) * ratio_j      ratio = 1.0, 0.9981, 0.9957
/// v_j   = x + 0.3 * v_j[n - m_j]
/// ap_j  = v_j[n - m_j] - 0.3 * v_j
/// loop  = (ap_0 + ap_1 + ap_2) / 3  -> damping -> DC blocker -> * feed
/// ```

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::dsp::{DcBlocker, RingBuffer};
use crate::error::DspResult;
use crate::param::{InputCursor, ParamTable};

use super::waveguide::{loop_ring, LoopTap, DAMPING, MAX_FREQ_RATIO};

const FREQ: usize = 0;
const FEED: usize = 1;
const DETUNE: usize = 2;

/// Relative lengths of the three all-pass sections
pub const ALLPASS_RATIOS: [f32; 3] = [1.0, 0.9981, 0.9957];

/// Diffusion coefficient of each all-pass section
pub const ALLPASS_COEFF: f32 = 0.3;

/// Highest accepted loop feedback
pub const MAX_FEED: f32 = 0.995;

/// Schroeder all-pass with a fractional, linearly interpolated delay
#[derive(Debug, Clone)]
struct AllpassSection {
    ring: RingBuffer,
}

impl AllpassSection {
    #[inline]
    fn process(&mut self, x: f32, delay: f32) -> f32 {
        let delayed = self.ring.read_linear(delay);
        let v = x + ALLPASS_COEFF * delayed;
        self.ring.write(v);
        delayed - ALLPASS_COEFF * v
    }
}

/// Waveguide with three detuned all-pass sections in the loop
///
/// - `freq`: Hz, clamped to [min_freq, 0.45 * sample_rate]
/// - `feed`: loop feedback, clamped to [0, 0.995]
/// - `detune`: all-pass length control, clamped to [0, 1]
pub struct AllpassWaveguideNode {
    input: NodeId,
    params: ParamTable,
    ring: RingBuffer,
    tap: LoopTap,
    sections: [AllpassSection; 3],
    damping: f32,
    dc: DcBlocker,
    min_freq: f32,
    max_freq: f32,
    sample_rate: f32,
}

impl AllpassWaveguideNode {
    /// # Errors
    /// `DspError::Allocation` if a loop or all-pass buffer cannot be allocated.
    pub fn new(
        input: NodeId,
        freq: f32,
        feed: f32,
        detune: f32,
        min_freq: f32,
        sample_rate: f32,
    ) -> DspResult<Self> {
        let max_freq = sample_rate * MAX_FREQ_RATIO;
        let min_freq = min_freq.max(1.0).min(max_freq);

        let section = || -> DspResult<AllpassSection> {
            Ok(AllpassSection {
                ring: loop_ring(min_freq, sample_rate)?,
            })
        };

        Ok(Self {
            input,
            params: ParamTable::new(&[("freq", freq), ("feed", feed), ("detune", detune)]),
            ring: loop_ring(min_freq, sample_rate)?,
            tap: LoopTap::new(),
            sections: [section()?, section()?, section()?],
            damping: 0.0,
            dc: DcBlocker::new(),
            min_freq,
            max_freq,
            sample_rate,
        })
    }

    /// Current loop delay in samples
    pub fn loop_delay(&self) -> f32 {
        self.tap.delay()
    }
}

impl AudioNode for AllpassWaveguideNode {
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
            let freq = params.at(FREQ, i).max(self.min_freq).min(self.max_freq);
            let feed = params.at(FEED, i).clamp(0.0, MAX_FEED);
            let detune = params.at(DETUNE, i).clamp(0.0, 1.0);

            self.tap.tune(freq, self.sample_rate);
            let spread = self.tap.delay() * (detune * 0.95 + 0.05);

            let val = self.tap.read(&self.ring);
            let mut diffused = 0.0;
            for (section, ratio) in self.sections.iter_mut().zip(ALLPASS_RATIOS) {
                diffused += section.process(val, (spread * ratio).max(1.0));
            }
            diffused /= ALLPASS_RATIOS.len() as f32;

            self.damping = diffused + DAMPING * (self.damping - diffused);
            let y = self.dc.process(self.damping);

            self.ring.write(signal.at(i) + y * feed);
            *sample = y;
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
        self.ring.clear();
        for section in &mut self.sections {
            section.ring.clear();
        }
        self.damping = 0.0;
        self.dc.reset();
    }

    fn name(&self) -> &str {
        "AllpassWaveguideNode"
    }
}
