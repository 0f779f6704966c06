//! Captured frames as handed over by the capture collaborator.

/// A pixel buffer plus its dimensions.
///
/// The engine never inspects pixels; the buffer format is a contract between
/// the capture collaborator and the recognition backend (the reference
/// backends use tightly packed RGBA8 rows).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }
}
