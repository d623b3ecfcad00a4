use rand::Rng;

use crate::config::GameConfig;
use crate::entity::{Pipe, PipeKind, PipePair};

/// Builds one pipe pair just off the right edge of the board.
///
/// The top pipe's y is drawn from `(base - h*3/4, base - h/4]` where `h` is
/// the pipe height; the bottom pipe sits one pipe height plus the opening
/// space below it.
pub fn pipe_pair<R: Rng>(config: &GameConfig, rng: &mut R) -> PipePair {
    let h = config.pipe_height;
    let jitter = rng.gen_range(0.0f64..1.0) * (h / 2) as f64;
    // `as` truncates toward zero, same as the integer cast the board was tuned with.
    let top_y = ((config.pipe_base_y - h / 4) as f64 - jitter) as i32;
    let bottom_y = top_y + h + config.opening_space();

    PipePair {
        top: Pipe::new(config, PipeKind::Top, top_y),
        bottom: Pipe::new(config, PipeKind::Bottom, bottom_y),
    }
}
