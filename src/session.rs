//! One game of Flappy Bird: the bird, the pipes, the score and the
//! Running/GameOver state machine.
//!
//! The session does no timing of its own. Something outside calls
//! [`Session::advance`] once per simulation tick and [`Session::place_pipes`]
//! once per spawn tick; both do nothing after the game is over.

use log::{debug, info};
use rand::Rng;

use crate::collision::collides;
use crate::config::GameConfig;
use crate::entity::{Bird, Pipe, PipePair};
use crate::score::HighScoreStore;
use crate::spawner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    GameOver,
}

/// Result of one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing ended; also returned when called while already over.
    Continue,
    /// This tick ended the game.
    GameOver { score: u32, new_high_score: bool },
}

/// What a jump input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    Flap,
    Restart,
}

pub struct Session<S: HighScoreStore> {
    config: GameConfig,
    store: S,
    bird: Bird,
    pipes: Vec<PipePair>,
    score: u32,
    high_score: u32,
    new_high_score: bool,
    state: State,
}

impl<S: HighScoreStore> Session<S> {
    pub fn new(config: GameConfig, store: S) -> Self {
        let high_score = store.load();
        info!("session started, best score {high_score}");
        Self {
            bird: Bird::new(&config),
            config,
            store,
            pipes: Vec::new(),
            score: 0,
            high_score,
            new_high_score: false,
            state: State::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Spawner tick: appends one top/bottom pair off the right edge.
    pub fn place_pipes<R: Rng>(&mut self, rng: &mut R) {
        if !self.is_running() {
            return;
        }
        self.pipes.push(spawner::pipe_pair(&self.config, rng));
    }

    /// Simulation tick. Bird, then pipes, then scoring, then collisions.
    pub fn advance(&mut self) -> Step {
        if !self.is_running() {
            return Step::Continue;
        }

        let bird = &mut self.bird;
        bird.velocity_y = bird.velocity_y.saturating_add(self.config.gravity);
        bird.y = bird.y.saturating_add(bird.velocity_y).max(0);

        for pair in &mut self.pipes {
            pair.shift(self.config.pipe_velocity);
        }

        for pair in &mut self.pipes {
            if !pair.passed() && self.bird.x > pair.top.right() {
                pair.mark_passed();
                self.score += 1;
            }
        }

        let hit = self
            .pipes
            .iter()
            .flat_map(PipePair::iter)
            .any(|pipe| collides(&self.bird, pipe));
        let fell = self.bird.y > self.config.board_height;

        // Pairs whose right edge has left the board can no longer score or collide.
        self.pipes.retain(|pair| pair.top.right() > 0);

        if hit || fell {
            self.finish()
        } else {
            Step::Continue
        }
    }

    /// The single input action: flap while running, restart once over.
    pub fn jump(&mut self) -> Jump {
        match self.state {
            State::Running => {
                self.bird.velocity_y = self.config.jump_velocity;
                Jump::Flap
            }
            State::GameOver => {
                self.reset();
                Jump::Restart
            }
        }
    }

    fn finish(&mut self) -> Step {
        self.state = State::GameOver;
        self.new_high_score = self.score > self.high_score;
        info!("game over with score {}", self.score);
        if self.new_high_score {
            info!("new high score {} (was {})", self.score, self.high_score);
            self.high_score = self.score;
            self.store.save(self.score);
        }
        Step::GameOver {
            score: self.score,
            new_high_score: self.new_high_score,
        }
    }

    fn reset(&mut self) {
        debug!("restarting after score {}", self.score);
        self.bird = Bird::new(&self.config);
        self.pipes.clear();
        self.score = 0;
        self.new_high_score = false;
        self.state = State::Running;
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            board_width: self.config.board_width,
            board_height: self.config.board_height,
            bird: &self.bird,
            pairs: &self.pipes,
            score: self.score,
            high_score: self.high_score,
            new_high_score: self.new_high_score,
            game_over: self.state == State::GameOver,
        }
    }
}

/// Read-only view of everything a renderer may draw.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub board_width: i32,
    pub board_height: i32,
    pub bird: &'a Bird,
    pairs: &'a [PipePair],
    pub score: u32,
    pub high_score: u32,
    /// The finished run beat the previous best.
    pub new_high_score: bool,
    pub game_over: bool,
}

impl<'a> Snapshot<'a> {
    /// Pipes in spawn order, each pair's top before its bottom.
    pub fn pipes(self) -> impl Iterator<Item = &'a Pipe> {
        self.pairs.iter().flat_map(PipePair::iter)
    }
}
