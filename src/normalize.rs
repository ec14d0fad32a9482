use tracing::info;

use crate::definition::Definition;

pub const MIN_FRAME_RATE: u64 = 16;
pub const MAX_SQUARE_SIZE: usize = 200;

/// Frames cropped/padded to a common `square_size` x `square_size` box.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub frames: Vec<Vec<String>>,
    pub frame_rate: u64,
    pub square_size: usize,
}

/// Crops every frame to the square derived from the first frame.
///
/// A frame with fewer lines than `square_size` keeps its line count; only
/// line content is padded. An animation without frames passes through with
/// no frames and a square size of 0.
pub fn normalize(definition: Definition) -> Normalized {
    let frame_rate = clamp_frame_rate(definition.frame_rate);

    let Some(first) = definition.frames.first() else {
        return Normalized {
            frames: Vec::new(),
            frame_rate,
            square_size: 0,
        };
    };

    let max_width = first.iter().map(line_width).max().unwrap_or(0);
    let max_height = first.len();
    let mut square_size = max_width.min(max_height);

    if square_size > MAX_SQUARE_SIZE {
        info!("square size {square_size} exceeds {MAX_SQUARE_SIZE}, cropping");
        square_size = MAX_SQUARE_SIZE;
    }

    let frames = definition
        .frames
        .iter()
        .map(|frame| normalize_frame(frame, square_size))
        .collect();

    Normalized {
        frames,
        frame_rate,
        square_size,
    }
}

fn clamp_frame_rate(frame_rate: i64) -> u64 {
    if frame_rate < MIN_FRAME_RATE as i64 {
        info!("frame rate {frame_rate}ms below {MIN_FRAME_RATE}ms, clamping");

        MIN_FRAME_RATE
    } else {
        frame_rate as u64
    }
}

fn line_width(line: &Option<String>) -> usize {
    line.as_deref().map_or(0, |l| l.chars().count())
}

fn normalize_frame(frame: &[Option<String>], size: usize) -> Vec<String> {
    frame
        .iter()
        .take(size)
        .map(|line| fit_line(line.as_deref().unwrap_or(""), size))
        .collect()
}

fn fit_line(line: &str, size: usize) -> String {
    let mut fitted: String = line.chars().take(size).collect();
    let width = fitted.chars().count();
    fitted.extend(std::iter::repeat(' ').take(size - width));

    fitted
}
