//! Registry of the game types a server can host.

use std::collections::HashMap;

use crate::{GameConfig, RoomError};

/// Maps a game-type name to its [`GameConfig`].
#[derive(Debug, Clone, Default)]
pub struct GameRegistry {
    games: HashMap<String, GameConfig>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ruleset under `config.name`.
    ///
    /// # Errors
    /// Returns `RoomError::DuplicateGame` if the name is already taken.
    pub fn register(&mut self, config: GameConfig) -> Result<(), RoomError> {
        if self.games.contains_key(&config.name) {
            return Err(RoomError::DuplicateGame(config.name));
        }
        tracing::debug!(game = %config.name, "game type registered");
        self.games.insert(config.name.clone(), config);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&GameConfig> {
        self.games.get(name)
    }

    /// Registered game-type names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.games.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
