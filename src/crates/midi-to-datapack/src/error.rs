use std::path::PathBuf;

/// Reasons a generation run can fail
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("MIDI file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    MalformedConfiguration(String),

    #[error("Failed to parse MIDI file: {0}")]
    MidiParse(#[from] midly::Error),

    #[error("Unsupported MIDI timing: {0}")]
    UnsupportedTiming(String),

    #[error("Failed to read config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub fn malformed(message: impl Into<String>) -> Self {
        GenerateError::MalformedConfiguration(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
