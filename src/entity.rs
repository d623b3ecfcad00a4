//! Bird and pipe data, sized from the board configuration.

use crate::collision::Rect;
use crate::config::GameConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bird {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Positive = falling.
    pub velocity_y: i32,
}

impl Bird {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            x: config.bird_start_x(),
            y: config.bird_start_y(),
            width: config.bird_width,
            height: config.bird_height,
            velocity_y: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeKind {
    /// Hangs from above; its opening is at the bottom edge.
    Top,
    /// Rises from below; its opening is at the top edge.
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipe {
    pub kind: PipeKind,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub passed: bool,
}

impl Pipe {
    pub fn new(config: &GameConfig, kind: PipeKind, y: i32) -> Self {
        Self {
            kind,
            x: config.board_width,
            y,
            width: config.pipe_width,
            height: config.pipe_height,
            passed: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// x of the trailing (right) edge.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }
}

/// Top and bottom pipe from one spawn, sharing one gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipePair {
    pub top: Pipe,
    pub bottom: Pipe,
}

impl PipePair {
    pub fn passed(&self) -> bool {
        self.top.passed
    }

    pub fn mark_passed(&mut self) {
        self.top.passed = true;
        self.bottom.passed = true;
    }

    pub fn shift(&mut self, dx: i32) {
        self.top.x += dx;
        self.bottom.x += dx;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pipe> {
        [&self.top, &self.bottom].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bird_starts_at_configured_position() {
        let config = GameConfig::default();
        let bird = Bird::new(&config);
        assert_eq!((bird.x, bird.y), (45, 180));
        assert_eq!(bird.velocity_y, 0);
        assert_eq!(bird.bounds(), Rect::new(45, 180, 34, 24));
    }

    #[test]
    fn test_pipe_starts_off_right_edge() {
        let config = GameConfig::default();
        let pipe = Pipe::new(&config, PipeKind::Top, -200);
        assert_eq!(pipe.x, config.board_width);
        assert_eq!(pipe.right(), config.board_width + config.pipe_width);
        assert!(!pipe.passed);
    }

    #[test]
    fn test_pair_moves_and_passes_together() {
        let config = GameConfig::default();
        let mut pair = PipePair {
            top: Pipe::new(&config, PipeKind::Top, -200),
            bottom: Pipe::new(&config, PipeKind::Bottom, 472),
        };
        pair.shift(-4);
        assert_eq!(pair.top.x, 356);
        assert_eq!(pair.bottom.x, 356);

        pair.mark_passed();
        assert!(pair.passed());
        assert!(pair.iter().all(|p| p.passed));
    }
}
