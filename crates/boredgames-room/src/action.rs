//! Named, typed actions and the per-ruleset lookup table.
//!
//! A ruleset declares its vocabulary once, in a static [`ActionTable`]:
//!
//! ```rust,ignore
//! static ACTIONS: LazyLock<ActionTable<MyGame>> = LazyLock::new(|| {
//!     ActionTable::new()
//!         .with(Action::new("draw", MyGame::draw))
//!         .with(Action::with_args("move", MyGame::move_piece))
//!         .with(Action::anonymous("stats", MyGame::stats))
//! });
//! ```
//!
//! Each factory erases the handler's argument type behind a closure that
//! deserializes raw JSON, so the room layer can dispatch by name without
//! knowing any concrete ruleset or argument type.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{GameError, Player, Ruleset};

type Handler<R> = Box<
    dyn Fn(&mut R, Option<&Player>, Option<Value>) -> Result<Option<Value>, GameError>
        + Send
        + Sync,
>;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One entry in a ruleset's action table.
pub struct Action<R> {
    name: &'static str,
    takes_args: bool,
    requires_player: bool,
    handler: Handler<R>,
}

impl<R: Ruleset> Action<R> {
    /// An action invoked by a player, without arguments.
    pub fn new<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(&mut R, &Player) -> Result<Option<R::Response>, GameError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            takes_args: false,
            requires_player: true,
            handler: Box::new(move |game: &mut R, player: Option<&Player>, _: Option<Value>| {
                let player = require_player(name, player)?;
                encode(f(game, player)?)
            }),
        }
    }

    /// An action invoked by a player with arguments of type `A`.
    pub fn with_args<A, F>(name: &'static str, f: F) -> Self
    where
        A: DeserializeOwned,
        F: Fn(&mut R, &Player, A) -> Result<Option<R::Response>, GameError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            takes_args: true,
            requires_player: true,
            handler: Box::new(move |game: &mut R, player: Option<&Player>, args: Option<Value>| {
                let args = decode::<A>(name, args)?;
                let player = require_player(name, player)?;
                encode(f(game, player, args)?)
            }),
        }
    }

    /// An action anyone may invoke, without arguments.
    pub fn anonymous<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(&mut R) -> Result<Option<R::Response>, GameError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            takes_args: false,
            requires_player: false,
            handler: Box::new(move |game: &mut R, _: Option<&Player>, _: Option<Value>| {
                encode(f(game)?)
            }),
        }
    }

    /// An action anyone may invoke, with arguments of type `A`.
    pub fn anonymous_with_args<A, F>(name: &'static str, f: F) -> Self
    where
        A: DeserializeOwned,
        F: Fn(&mut R, A) -> Result<Option<R::Response>, GameError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            takes_args: true,
            requires_player: false,
            handler: Box::new(move |game: &mut R, _: Option<&Player>, args: Option<Value>| {
                let args = decode::<A>(name, args)?;
                encode(f(game, args)?)
            }),
        }
    }
}

impl<R> Action<R> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn takes_args(&self) -> bool {
        self.takes_args
    }

    pub fn requires_player(&self) -> bool {
        self.requires_player
    }

    /// Runs the action against `game`.
    ///
    /// # Errors
    /// `BadArguments` if arguments are supplied to an action that declares
    /// none, or are missing or malformed for one that does.
    /// `PlayerRequired` if the action needs a caller and none is given.
    /// Any error the handler itself returns is passed through unchanged.
    pub fn invoke(
        &self,
        game: &mut R,
        player: Option<&Player>,
        args: Option<Value>,
    ) -> Result<Option<Value>, GameError> {
        if !self.takes_args && args.is_some() {
            return Err(GameError::BadArguments(format!(
                "action {:?} takes no arguments",
                self.name
            )));
        }
        (self.handler)(game, player, args)
    }
}

impl<R> fmt::Debug for Action<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("takes_args", &self.takes_args)
            .field("requires_player", &self.requires_player)
            .finish_non_exhaustive()
    }
}

fn require_player<'a>(
    name: &str,
    player: Option<&'a Player>,
) -> Result<&'a Player, GameError> {
    player.ok_or_else(|| GameError::PlayerRequired(name.to_string()))
}

fn decode<A: DeserializeOwned>(
    name: &str,
    args: Option<Value>,
) -> Result<A, GameError> {
    let value = args.ok_or_else(|| {
        GameError::BadArguments(format!("action {name:?} requires arguments"))
    })?;
    serde_json::from_value(value).map_err(|e| GameError::BadArguments(e.to_string()))
}

fn encode<T: Serialize>(response: Option<T>) -> Result<Option<Value>, GameError> {
    response
        .map(|r| serde_json::to_value(r).map_err(|e| GameError::Internal(e.to_string())))
        .transpose()
}

// ---------------------------------------------------------------------------
// ActionTable
// ---------------------------------------------------------------------------

/// Every action a ruleset exposes, keyed by name.
pub struct ActionTable<R> {
    actions: HashMap<&'static str, Action<R>>,
}

impl<R> ActionTable<R> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Adds an action. A later action with the same name replaces the
    /// earlier one.
    pub fn with(mut self, action: Action<R>) -> Self {
        self.actions.insert(action.name, action);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Action<R>> {
        self.actions.get(name)
    }

    /// Action names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.actions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<R> Default for ActionTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for ActionTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
