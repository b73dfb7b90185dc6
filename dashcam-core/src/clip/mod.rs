pub mod segmenter;
pub mod assembler;


pub use assembler::{ClipAssembler, FootageProcessingResult};
pub use segmenter::{ClipAnalysis, ClipSegmenter, DetectedClip};
