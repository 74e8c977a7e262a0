//! Session lifetime management with generation-tagged ticks.

use munchers_core::{
    ActiveRule, Command, Event, GridSize, GridSizeError, LevelConfig, SessionSummary,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{apply_in_place, query, GameState};

const CLASSIC_STREAM: &str = "classic";
const LEVEL_STREAM: &str = "level";

/// Derives the random seed of one session lifetime.
///
/// The seed depends on the base seed, a stream label, the level number and
/// the generation, so restarting a level draws a new but reproducible board.
#[must_use]
pub fn derive_seed(base_seed: u64, stream: &str, level: u32, generation: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(stream.as_bytes());
    hasher.update(level.to_le_bytes());
    hasher.update(generation.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Parameters used to rebuild a session on restart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionKind {
    /// Untimed classic board.
    Classic {
        /// Grid dimensions.
        size: GridSize,
        /// Rule and target number requested for the board.
        rule: ActiveRule,
        /// Number of wandering troggles.
        troggles: usize,
    },
    /// Catalog level.
    Level(LevelConfig),
}

/// Handle tying a scheduled tick to the session lifetime that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickToken {
    generation: u64,
}

impl TickToken {
    /// Generation the token belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Owns the live [`GameState`] together with its random stream.
#[derive(Debug)]
pub struct Session {
    kind: SessionKind,
    base_seed: u64,
    generation: u64,
    state: GameState,
    rng: ChaCha8Rng,
    events: Vec<Event>,
}

impl Session {
    /// Starts a classic session.
    #[must_use]
    pub fn classic(base_seed: u64, size: GridSize, rule: ActiveRule, troggles: usize) -> Self {
        let kind = SessionKind::Classic {
            size,
            rule,
            troggles,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(derive_seed(base_seed, CLASSIC_STREAM, 0, 0));
        let state = GameState::classic(size, rule, troggles, &mut rng);
        Self::assemble(kind, base_seed, state, rng)
    }

    /// Starts a level session.
    pub fn level(base_seed: u64, config: LevelConfig) -> Result<Self, GridSizeError> {
        let seed = derive_seed(base_seed, LEVEL_STREAM, config.id.get(), 0);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let state = GameState::level(&config, &mut rng)?;
        Ok(Self::assemble(
            SessionKind::Level(config),
            base_seed,
            state,
            rng,
        ))
    }

    fn assemble(kind: SessionKind, base_seed: u64, state: GameState, rng: ChaCha8Rng) -> Self {
        Self {
            kind,
            base_seed,
            generation: 0,
            state,
            rng,
            events: Vec::new(),
        }
    }

    /// Parameters the session was started with.
    #[must_use]
    pub const fn kind(&self) -> &SessionKind {
        &self.kind
    }

    /// Current lifetime counter; bumped by every restart.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Read-only view of the live state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Token for the next scheduled tick of the current lifetime.
    #[must_use]
    pub const fn tick_token(&self) -> TickToken {
        TickToken {
            generation: self.generation,
        }
    }

    /// Applies a player command immediately.
    pub fn submit(&mut self, command: Command) -> &[Event] {
        self.events.clear();
        apply_in_place(&mut self.state, command, &mut self.rng, &mut self.events);
        &self.events
    }

    /// Advances the clock if the token belongs to the current lifetime.
    ///
    /// Returns `None` and leaves the state untouched for stale tokens.
    pub fn tick(&mut self, token: TickToken) -> Option<&[Event]> {
        if token.generation != self.generation {
            debug!(
                stale = token.generation,
                current = self.generation,
                "ignored stale tick"
            );
            return None;
        }
        Some(self.submit(Command::Tick))
    }

    /// Discards the live state and starts a new lifetime with a fresh board.
    ///
    /// Tokens issued before the restart are ignored afterwards. When the board
    /// cannot be rebuilt the session keeps its current lifetime untouched.
    pub fn restart(&mut self) -> Result<(), GridSizeError> {
        let generation = self.generation + 1;
        let (stream, level) = match &self.kind {
            SessionKind::Classic { .. } => (CLASSIC_STREAM, 0),
            SessionKind::Level(config) => (LEVEL_STREAM, config.id.get()),
        };
        let mut rng =
            ChaCha8Rng::seed_from_u64(derive_seed(self.base_seed, stream, level, generation));
        let state = match &self.kind {
            SessionKind::Classic {
                size,
                rule,
                troggles,
            } => GameState::classic(*size, *rule, *troggles, &mut rng),
            SessionKind::Level(config) => GameState::level(config, &mut rng)?,
        };

        self.generation = generation;
        self.rng = rng;
        self.state = state;
        self.events.clear();
        debug!(generation, "session restarted");
        Ok(())
    }

    /// Summary of the finished level session, if it has ended.
    #[must_use]
    pub fn summary(&self) -> Option<SessionSummary> {
        query::summary(&self.state)
    }
}
