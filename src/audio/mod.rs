// Audio module - sample buffers handed over by the capture collaborator

pub mod buffer;

pub use buffer::{SampleBuffer, DEFAULT_CHUNK_MS, DEFAULT_SAMPLE_RATE};
