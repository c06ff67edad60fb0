//! The ruleset contract and its type-erased form.
//!
//! Rulesets implement [`Ruleset`]. Rooms only ever see `Box<dyn Game>`;
//! the blanket impl below is what connects the two.

use boredgames_protocol::GameSnapshot;
use serde::Serialize;
use serde_json::Value;

use crate::{ActionTable, GameError, Player};

/// The trait game developers implement.
///
/// A ruleset owns its own state and exposes it through named actions (see
/// [`ActionTable`]) and a per-viewer snapshot. The room serializes every
/// call under its own lock, so implementations are plain `&mut self` code.
pub trait Ruleset: Send + Sized + 'static {
    /// Everything an action can return, as one serializable type.
    type Response: Serialize;

    /// The ruleset's action vocabulary. Built once per type.
    fn actions() -> &'static ActionTable<Self>;

    /// Once this returns `true` the room moves to `Ended` and no further
    /// actions are dispatched.
    fn has_ended(&self) -> bool;

    /// The state as `viewer` may see it.
    fn snapshot(&self, viewer: &Player) -> GameSnapshot;

    /// Called when a seated player's stream drops after the game started.
    fn on_player_disconnect(&mut self, _player: &Player) {}

    /// Called when a seated player reconnects after the game started.
    fn on_player_reconnect(&mut self, _player: &Player) {}
}

/// An object-safe view of a ruleset, as held by a room.
pub trait Game: Send {
    /// Dispatches a named action.
    ///
    /// # Errors
    /// `GameEnded` once the game is over, `UnknownAction` if the name isn't
    /// in the ruleset's table, otherwise whatever the action returns.
    fn execute(
        &mut self,
        action: &str,
        player: Option<&Player>,
        args: Option<Value>,
    ) -> Result<Option<Value>, GameError>;

    fn is_over(&self) -> bool;

    fn view_for(&self, viewer: &Player) -> GameSnapshot;

    fn player_disconnected(&mut self, player: &Player);

    fn player_reconnected(&mut self, player: &Player);

    fn action_names(&self) -> Vec<&'static str>;
}

impl<R: Ruleset> Game for R {
    fn execute(
        &mut self,
        action: &str,
        player: Option<&Player>,
        args: Option<Value>,
    ) -> Result<Option<Value>, GameError> {
        if Ruleset::has_ended(self) {
            return Err(GameError::GameEnded);
        }
        let entry = R::actions()
            .get(action)
            .ok_or_else(|| GameError::UnknownAction(action.to_string()))?;

        tracing::debug!(action, player = ?player.map(|p| p.id), "dispatching action");
        entry.invoke(self, player, args)
    }

    fn is_over(&self) -> bool {
        Ruleset::has_ended(self)
    }

    fn view_for(&self, viewer: &Player) -> GameSnapshot {
        Ruleset::snapshot(self, viewer)
    }

    fn player_disconnected(&mut self, player: &Player) {
        self.on_player_disconnect(player);
    }

    fn player_reconnected(&mut self, player: &Player) {
        self.on_player_reconnect(player);
    }

    fn action_names(&self) -> Vec<&'static str> {
        R::actions().names()
    }
}
