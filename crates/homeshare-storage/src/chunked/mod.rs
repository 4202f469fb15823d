//! Chunked transfer staging and reassembly.

pub mod assembler;
pub mod naming;
pub mod store;

pub use assembler::{AssemblyJob, AssemblyOutcome, ChunkAssembler};
pub use naming::candidate_file_name;
pub use store::{ChunkPosition, ChunkStore};
