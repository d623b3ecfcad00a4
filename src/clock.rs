//! Fixed-period tick sources driven from the frame loop.

use std::collections::VecDeque;
use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::config::GameConfig;
use crate::score::HighScoreStore;
use crate::session::{Jump, Session, Step};

/// Most ticks one ticker may fire per frame; the rest of a long stall is dropped.
const MAX_TICKS_PER_FRAME: u32 = 8;

/// Turns elapsed wall time into a count of fixed-period ticks.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    pending: Duration,
    armed: bool,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            pending: Duration::ZERO,
            armed: true,
        }
    }

    /// Starts counting again from zero.
    pub fn arm(&mut self) {
        self.armed = true;
        self.pending = Duration::ZERO;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
        self.pending = Duration::ZERO;
    }

    /// Adds `elapsed` and returns how many whole periods are now due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.armed || self.period.is_zero() {
            return 0;
        }
        self.pending += elapsed;
        let mut due = 0;
        while self.pending >= self.period {
            self.pending -= self.period;
            due += 1;
            if due == MAX_TICKS_PER_FRAME {
                self.pending = Duration::ZERO;
                break;
            }
        }
        due
    }
}

/// Player input, queued until the start of the next frame's ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Jump,
}

/// What happened during one [`Scheduler::run`], for sound and display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameEvents {
    pub flapped: bool,
    pub restarted: bool,
    pub crashed: bool,
    pub new_high_score: bool,
    pub ticks: u32,
    pub spawns: u32,
}

/// Owns the simulation and spawn tickers plus the input queue.
pub struct Scheduler {
    sim: Ticker,
    spawn: Ticker,
    inputs: VecDeque<Action>,
}

impl Scheduler {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            sim: Ticker::new(config.tick_period()),
            spawn: Ticker::new(config.spawn_period()),
            inputs: VecDeque::new(),
        }
    }

    pub fn push(&mut self, action: Action) {
        self.inputs.push_back(action);
    }

    /// Applies queued input, then runs whatever simulation and spawn ticks
    /// `elapsed` makes due. Input never lands in the middle of a tick.
    pub fn run<S, R>(
        &mut self,
        session: &mut Session<S>,
        elapsed: Duration,
        rng: &mut R,
    ) -> FrameEvents
    where
        S: HighScoreStore,
        R: Rng,
    {
        let mut events = FrameEvents::default();

        while let Some(action) = self.inputs.pop_front() {
            match action {
                Action::Jump => match session.jump() {
                    Jump::Flap => events.flapped = true,
                    Jump::Restart => {
                        debug!("restart: tickers re-armed");
                        self.sim.arm();
                        self.spawn.arm();
                        events.restarted = true;
                    }
                },
            }
        }

        let due = self.sim.advance(elapsed);
        for _ in 0..due {
            events.ticks += 1;
            if let Step::GameOver { new_high_score, .. } = session.advance() {
                events.crashed = true;
                events.new_high_score = new_high_score;
                self.sim.disarm();
                self.spawn.disarm();
                break;
            }
        }

        let due = self.spawn.advance(elapsed);
        for _ in 0..due {
            session.place_pipes(rng);
            events.spawns += 1;
        }

        events
    }
}
