use bytes::Bytes;

use crate::normalize::Normalized;

/// Wire-ready frames plus the pacing between them. Never mutated once built,
/// so it can be shared across any number of sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct Precomputed {
    pub payloads: Vec<Bytes>,
    pub delay: u64,
    pub square_size: usize,
}

impl Precomputed {
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Total payload bytes, used as the memory estimate for cache admission.
    pub fn byte_size(&self) -> usize {
        self.payloads.iter().map(Bytes::len).sum()
    }
}

pub fn precompute(animation: &Normalized) -> Precomputed {
    let payloads = animation
        .frames
        .iter()
        .map(Vec::as_slice)
        .map(encode_frame)
        .collect();

    let first_frame_size = animation
        .frames
        .first()
        .map_or(0, |frame| frame.iter().map(|l| l.chars().count()).sum());

    Precomputed {
        payloads,
        delay: adaptive_delay(first_frame_size, animation.frame_rate),
        square_size: animation.square_size,
    }
}

fn encode_frame(lines: &[String]) -> Bytes {
    let mut text = lines.join("\n");
    text.push_str("\n\n");

    Bytes::from(text)
}

/// Slows down big frames so that they have time to get flushed to the client.
///
/// `size` is the character count of a single frame, `base` the frame rate in
/// milliseconds. Fractional results are rounded down, huge ones saturate.
pub fn adaptive_delay(size: usize, base: u64) -> u64 {
    if size > 50_000 {
        base.saturating_mul(3).max(100)
    } else if size > 20_000 {
        base.saturating_mul(2).max(50)
    } else if size > 5_000 {
        (base / 2).saturating_add(base).max(30)
    } else {
        base.max(16)
    }
}
