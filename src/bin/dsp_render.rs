//! dsp_render - render a built-in patch to a 16-bit mono WAV file
//!
//! ```text
//! dsp_render pluck out.wav --duration 3
//! dsp_render echo out.wav --config engine.toml
//! ```

use clap::{Parser, ValueEnum};
use hound::{SampleFormat, WavSpec, WavWriter};
use sonance::nodes::{
    AllpassWaveguideNode, CompressorNode, DelayNode, GateNode, ImpulseNode,
    NoiseNode, ToneNode, WaveguideNode,
};
use sonance::{AudioNodeGraph, DspResult, EngineConfig, NodeId, Param};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "dsp_render")]
#[command(about = "Render a sonance patch to WAV", long_about = None)]
struct Cli {
    /// Patch to render
    #[arg(value_enum)]
    patch: Patch,

    /// Output WAV file path
    output: PathBuf,

    /// Duration in seconds
    #[arg(short, long, default_value = "2.0")]
    duration: f32,

    /// Engine config (TOML with sample_rate and block_size)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Master gain 0.0-1.0
    #[arg(short, long, default_value = "0.8")]
    gain: f32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Patch {
    /// Impulse into a 220 Hz string
    Pluck,
    /// Softened click into the detuned all-pass string
    Chorus,
    /// Clicks through a feedback delay and a compressor
    Echo,
    /// Noise bursts whose tails are cut by a gate
    Gated,
}

fn build_patch(graph: &mut AudioNodeGraph, patch: Patch) -> DspResult<NodeId> {
    let sr = graph.sample_rate();

    let output = match patch {
        Patch::Pluck => {
            let strike = graph.add_audio_node(Box::new(ImpulseNode::new()));
            graph.add_audio_node(Box::new(WaveguideNode::new(strike, 220.0, 2.0, 20.0, sr)?))
        }
        Patch::Chorus => {
            let strike = graph.add_audio_node(Box::new(ImpulseNode::new()));
            let body = graph.add_audio_node(Box::new(ToneNode::new(strike, 2000.0, sr)));
            graph.add_audio_node(Box::new(AllpassWaveguideNode::new(
                body, 110.0, 0.99, 0.6, 20.0, sr,
            )?))
        }
        Patch::Echo => {
            let clicks = graph.add_audio_node(Box::new(ImpulseNode::with_freq(1.0)));
            let echo = graph.add_audio_node(Box::new(DelayNode::new(clicks, 0.25, 0.6, 1.0, sr)?));
            graph.add_audio_node(Box::new(CompressorNode::new(
                echo, -20.0, 4.0, 0.005, 0.1, 0.5, sr,
            )?))
        }
        Patch::Gated => {
            // Clicks smeared into decaying envelopes that shape the noise level
            let key = graph.add_audio_node(Box::new(ImpulseNode::with_freq(4.0)));
            let env = graph.add_audio_node(Box::new(ToneNode::new(key, 3.0, sr)));
            graph.set_param(env, "mul", Param::Constant(2000.0))?;

            let noise = graph.add_audio_node(Box::new(NoiseNode::new()));
            graph.set_param(noise, "mul", Param::Streamed(env))?;

            // Cut each tail once it falls under -30 dB
            graph.add_audio_node(Box::new(GateNode::new(noise, -30.0, 0.002, 0.05, sr)?))
        }
    };

    Ok(output)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    info!(
        sample_rate = config.sample_rate,
        block_size = config.block_size,
        patch = ?cli.patch,
        "rendering"
    );

    let mut graph = AudioNodeGraph::new(config);
    let output_node = build_patch(&mut graph, cli.patch)?;
    graph.set_output(output_node);
    graph.build_processor()?;

    let total_samples = (cli.duration.max(0.0) * graph.sample_rate()) as usize;
    let audio = graph.render(total_samples)?;

    let rms = (audio.iter().map(|&x| x * x).sum::<f32>() / audio.len().max(1) as f32).sqrt();
    let peak = audio.iter().map(|x| x.abs()).fold(0.0, f32::max);

    let spec = WavSpec {
        channels: 1,
        sample_rate: graph.sample_rate() as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(&cli.output, spec)
        .map_err(|e| format!("Failed to create WAV file: {e}"))?;

    for &sample in &audio {
        let sample_i16 = ((sample * cli.gain).clamp(-1.0, 1.0) * 32767.0) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| format!("Failed to write sample: {e}"))?;
    }

    writer
        .finalize()
        .map_err(|e| format!("Failed to finalize WAV: {e}"))?;

    println!("Render Statistics:");
    println!("------------------");
    println!("Samples:        {total_samples}");
    println!("RMS level:      {:.3} ({:.1} dB)", rms, 20.0 * rms.max(1e-10).log10());
    println!("Peak level:     {peak:.3}");
    println!("Output:         {}", cli.output.display());

    Ok(())
}
