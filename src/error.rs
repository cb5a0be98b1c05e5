//! Error types shared by nodes, the executor and configuration loading

use crate::audio_node::NodeId;
use std::fmt;

/// Errors raised by the engine
///
/// Control values never produce errors (they are clamped); these cover
/// structural problems: memory, graph wiring, parameter names and config.
#[derive(Debug)]
pub enum DspError {
    /// Ring buffer could not be allocated
    Allocation { requested: usize },
    /// Node has no parameter with this name
    UnknownParam(String),
    /// Reference to a node id that is not in the graph
    InvalidNode(NodeId),
    /// Wiring would make a node depend on itself
    Cycle(NodeId),
    /// No output node set before building the processor
    NoOutput,
    /// Processing requested before `build_processor()`
    NotBuilt,
    /// Configuration value out of range
    InvalidConfig(String),
    /// Configuration could not be parsed
    Config(String),
    /// IO error
    Io(std::io::Error),
}

impl fmt::Display for DspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DspError::Allocation { requested } => {
                write!(f, "Failed to allocate ring buffer of {} samples", requested)
            }
            DspError::UnknownParam(name) => write!(f, "Unknown parameter: {}", name),
            DspError::InvalidNode(id) => write!(f, "Invalid node id: {}", id),
            DspError::Cycle(id) => write!(f, "Dependency cycle through node {}", id),
            DspError::NoOutput => write!(f, "No output node set (use set_output)"),
            DspError::NotBuilt => {
                write!(f, "build_processor() must be called before processing")
            }
            DspError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            DspError::Config(msg) => write!(f, "Configuration parse error: {}", msg),
            DspError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for DspError {}

impl From<std::io::Error> for DspError {
    fn from(e: std::io::Error) -> Self {
        DspError::Io(e)
    }
}

impl From<toml::de::Error> for DspError {
    fn from(e: toml::de::Error) -> Self {
        DspError::Config(e.to_string())
    }
}

/// Result type for engine operations
pub type DspResult<T> = Result<T, DspError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", DspError::UnknownParam("cutoff".to_string())),
            "Unknown parameter: cutoff"
        );
        assert_eq!(
            format!("{}", DspError::Allocation { requested: 44101 }),
            "Failed to allocate ring buffer of 44101 samples"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DspError = io.into();
        assert!(matches!(err, DspError::Io(_)));
    }
}
