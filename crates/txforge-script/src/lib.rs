/// txforge script - script codec, classification, and construction.
///
/// Provides the Bitcoin Script type, opcode definitions, script chunk
/// parsing, script-type classification across legacy and witness
/// families, and push-data construction helpers.

pub mod chunk;
pub mod opcodes;
pub mod script;
pub mod script_type;

mod error;
pub use chunk::ScriptChunk;
pub use error::ScriptError;
pub use script::Script;
pub use script_type::ScriptType;
