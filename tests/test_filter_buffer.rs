/// Tests for buffer-based recursive filter evaluation
///
/// 1. Biquad step response and state seeding
/// 2. Magnitude response measured with an FFT of the impulse response
/// 3. Streamed cutoff on the one-pole tone filter
/// 4. Portamento and DC blocking in a chain

use rustfft::{num_complex::Complex, FftPlanner};
use sonance::nodes::{
    BiquadNode, ConstantNode, DcBlockNode, Delay1Node, FilterType, ImpulseNode, PortNode,
    ToneNode,
};
use sonance::{AudioNodeGraph, EngineConfig, NodeId, Param};

const SAMPLE_RATE: f32 = 44100.0;
const BLOCK_SIZE: usize = 512;
const FFT_SIZE: usize = 8192;

fn create_graph() -> AudioNodeGraph {
    AudioNodeGraph::new(EngineConfig::new(SAMPLE_RATE, BLOCK_SIZE).unwrap())
}

fn render(graph: &mut AudioNodeGraph, output: NodeId, num_samples: usize) -> Vec<f32> {
    graph.set_output(output);
    graph.build_processor().unwrap();
    graph.render(num_samples).unwrap()
}

/// Magnitude spectrum of a biquad's impulse response
fn biquad_spectrum(filter_type: FilterType, freq: f32, q: f32) -> Vec<f32> {
    let mut graph = create_graph();
    let impulse = graph.add_audio_node(Box::new(ImpulseNode::new()));
    // First sample is zero so the filter seeds from silence
    let late = graph.add_audio_node(Box::new(Delay1Node::new(impulse)));
    let filter = graph.add_audio_node(Box::new(BiquadNode::new(
        late,
        freq,
        q,
        filter_type,
        SAMPLE_RATE,
    )));

    let response = render(&mut graph, filter, FFT_SIZE);
    let mut spectrum: Vec<Complex<f32>> =
        response.iter().map(|&s| Complex::new(s, 0.0)).collect();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);
    fft.process(&mut spectrum);

    spectrum[..FFT_SIZE / 2].iter().map(|c| c.norm()).collect()
}

fn bin(freq: f32) -> usize {
    (freq * FFT_SIZE as f32 / SAMPLE_RATE).round() as usize
}

#[test]
fn test_biquad_lowpass_step_response() {
    let mut graph = create_graph();
    let input = graph.add_audio_node(Box::new(ConstantNode::new(0.0)));
    let filter = graph.add_audio_node(Box::new(BiquadNode::new(
        input,
        1000.0,
        1.0,
        FilterType::Lowpass,
        SAMPLE_RATE,
    )));
    graph.set_output(filter);
    graph.build_processor().unwrap();

    graph.render(BLOCK_SIZE).unwrap();
    graph.set_param(input, "value", Param::Constant(1.0)).unwrap();
    let out = graph.render(8192).unwrap();

    // Q = 1 rings once, about 16% over
    let peak = out.iter().fold(0.0f32, |m, &s| m.max(s));
    assert!(peak > 1.1 && peak < 1.2, "overshoot peak {}", peak);
    assert!((out[8191] - 1.0).abs() < 1e-4);
}

#[test]
fn test_biquad_seeded_constant_holds() {
    for (freq, q) in [(200.0, 0.5), (1000.0, 1.0), (12000.0, 10.0)] {
        let mut graph = create_graph();
        let input = graph.add_audio_node(Box::new(ConstantNode::new(0.6)));
        let filter = graph.add_audio_node(Box::new(BiquadNode::new(
            input,
            freq,
            q,
            FilterType::Lowpass,
            SAMPLE_RATE,
        )));

        let out = render(&mut graph, filter, 4096);
        assert!(
            out.iter().all(|&s| (s - 0.6).abs() < 1e-4),
            "drifted at freq {} q {}",
            freq,
            q
        );
    }
}

#[test]
fn test_biquad_lowpass_magnitude() {
    let mag = biquad_spectrum(FilterType::Lowpass, 1000.0, 0.707);
    assert!((mag[bin(100.0)] - 1.0).abs() < 0.02);
    assert!((mag[bin(1000.0)] - 0.707).abs() < 0.03);
    assert!(mag[bin(10000.0)] < 0.02);
}

#[test]
fn test_biquad_highpass_magnitude() {
    let mag = biquad_spectrum(FilterType::Highpass, 1000.0, 0.707);
    assert!(mag[bin(100.0)] < 0.02);
    assert!((mag[bin(10000.0)] - 1.0).abs() < 0.02);
}

#[test]
fn test_biquad_bandstop_notch() {
    let mag = biquad_spectrum(FilterType::Bandstop, 2000.0, 2.0);
    assert!(mag[bin(2000.0)] < 0.05);
    assert!((mag[bin(200.0)] - 1.0).abs() < 0.02);
}

#[test]
fn test_biquad_allpass_flat() {
    let mag = biquad_spectrum(FilterType::Allpass, 3000.0, 1.0);
    for freq in [100.0, 1000.0, 3000.0, 10000.0] {
        assert!((mag[bin(freq)] - 1.0).abs() < 0.01, "{} Hz: {}", freq, mag[bin(freq)]);
    }
}

#[test]
fn test_tone_streamed_cutoff() {
    let mut graph = create_graph();
    let impulse = graph.add_audio_node(Box::new(ImpulseNode::new()));
    let cutoff = graph.add_audio_node(Box::new(ConstantNode::new(100.0)));
    let tone = graph.add_audio_node(Box::new(ToneNode::new(impulse, 5000.0, SAMPLE_RATE)));
    graph.set_param(tone, "freq", Param::Streamed(cutoff)).unwrap();

    let out = render(&mut graph, tone, 64);
    let expected = 1.0 - ToneNode::pole(100.0, SAMPLE_RATE);
    assert!((out[0] - expected).abs() < 1e-6);
}

#[test]
fn test_port_glides_between_values() {
    let mut graph = create_graph();
    let target = graph.add_audio_node(Box::new(ConstantNode::new(0.0)));
    let port = graph.add_audio_node(Box::new(PortNode::new(target, 0.01, 0.1, 0.0, SAMPLE_RATE)));
    graph.set_output(port);
    graph.build_processor().unwrap();

    graph.set_param(target, "value", Param::Constant(1.0)).unwrap();
    let rising = graph.render(441).unwrap();
    assert!((rising[440] - 0.632).abs() < 2e-3, "after one rise time {}", rising[440]);

    // Fall time is ten times longer
    let settled = graph.render(8192).unwrap();
    assert!(settled[8191] > 0.999);
    graph.set_param(target, "value", Param::Constant(0.0)).unwrap();
    let falling = graph.render(441).unwrap();
    assert!(falling[440] > 0.9 && falling[440] < 0.92, "after 10 ms of fall {}", falling[440]);
}

#[test]
fn test_dc_block_after_offset() {
    let mut graph = create_graph();
    let offset = graph.add_audio_node(Box::new(ConstantNode::new(0.5)));
    let block = graph.add_audio_node(Box::new(DcBlockNode::new(offset)));

    let out = render(&mut graph, block, 44100);
    assert!(out[0] > 0.49);
    assert!(out[44099].abs() < 1e-3);
}
