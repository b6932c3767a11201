use thiserror::Error;

use crate::opcode::Opcode;

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(Opcode),
    #[error("Pointer location invalid there can not be an opcode at {pointer}, if data len is {len}")]
    MemoryInvalid { pointer: usize, len: usize },
}

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Unable to read the program '{path}'.")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to access the key bindings file.")]
    Io(#[from] std::io::Error),
    #[error("Malformed key bindings '{0}'.")]
    Format(#[from] serde_json::Error),
    #[error("Invalid key '{0}', expected a hex digit between 0 and F.")]
    InvalidKey(String),
    #[error("The hex key {0:#X} has no binding.")]
    MissingKey(usize),
}
