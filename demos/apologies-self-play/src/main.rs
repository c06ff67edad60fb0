use std::sync::Arc;

use boredgames::apologies::MoveEffect;
use boredgames::prelude::*;
use boredgames::telemetry::init_tracing;
use rand::seq::SliceRandom;
use serde_json::Value;

const ACTION_CAP: usize = 20_000;
const BOTS: [&str; 4] = ["ada", "bea", "cy", "dot"];

// ---------------------------------------------------------------------------
// Bot logic
// ---------------------------------------------------------------------------

/// Every move worth trying: single moves shuffled, then split pairs.
fn candidates(movesets: &[Moveset]) -> Vec<MovePawnArgs> {
    let mut rng = rand::rng();
    let mut singles = Vec::new();
    let mut halves = Vec::new();

    for set in movesets {
        for opt in &set.opts {
            for &effect in &opt.effects {
                let mv = Move { from: opt.from.clone(), to: opt.to.clone(), effect };
                match MoveEffect::from_code(effect).and_then(MoveEffect::split_distance) {
                    Some(distance) => halves.push((distance, mv)),
                    None => singles.push(MovePawnArgs { pawn_move: mv, split_move: None }),
                }
            }
        }
    }
    singles.shuffle(&mut rng);

    let mut pairs: Vec<MovePawnArgs> = halves
        .iter()
        .flat_map(|(d1, first)| {
            halves
                .iter()
                .filter(move |(d2, second)| d1 + d2 == 7 && first.from != second.from)
                .map(move |(_, second)| MovePawnArgs {
                    pawn_move: first.clone(),
                    split_move: Some(second.clone()),
                })
        })
        .collect();
    pairs.shuffle(&mut rng);

    singles.extend(pairs);
    singles
}

async fn act(server: &GameServer, room_id: RoomId, player_id: PlayerId, request: &ActionRequest) -> Option<Value> {
    let body = match serde_json::to_vec(request) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode request");
            return None;
        }
    };
    let reply: ActionResponse = match serde_json::from_slice(&server.handle_action(room_id, player_id, &body).await) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "failed to decode reply");
            return None;
        }
    };
    match reply {
        ActionResponse::Ok { result } => Some(result.unwrap_or(Value::Null)),
        ActionResponse::Error(e) => {
            tracing::debug!(action = %request.action, code = e.code, message = %e.message, "refused");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), BoredGamesError> {
    init_tracing("info");

    let server = Arc::new(GameServer::builder().build()?);
    let _cleanup = server.start_cleanup();
    let mgr = server.manager();

    let new = mgr.create_room(GAME_NAME, BOTS[0]).await?;
    let room_id = new.room_id;
    mgr.register_connected(room_id, new.host_id).await?;
    let mut seats = vec![new.host_id];
    for name in &BOTS[1..] {
        let id = mgr.join_room(room_id, name).await?;
        mgr.register_connected(room_id, id).await?;
        seats.push(id);
    }

    let mut events = new.events;
    let pusher = {
        let server = Arc::clone(&server);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match server.encode_event(&event) {
                    Ok(payloads) => {
                        let bytes: usize = payloads.iter().map(|(_, p)| p.len()).sum();
                        tracing::trace!(view_num = ?event.view_num(), recipients = payloads.len(), bytes, "event pushed");
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to encode event"),
                }
            }
        })
    };

    mgr.start_game(room_id, new.host_id).await?;

    let mut actions = 0;
    let outcome = loop {
        if actions >= ACTION_CAP {
            break "action cap reached";
        }
        let snapshot = match mgr.snapshot(room_id, seats[0]).await?.game {
            Some(GameSnapshot::Apologies(s)) => s,
            None => break "room has no game",
        };
        let Some(seat) = snapshot.phase.seat() else {
            break "game over";
        };
        let player_id = seats[seat];
        actions += 1;

        if snapshot.phase.is_draw() {
            let request = ActionRequest { action: "draw".into(), args: None };
            if act(&server, room_id, player_id, &request).await.is_none() {
                break "draw refused";
            }
            continue;
        }

        let movesets = snapshot.current_movesets.unwrap_or_default();
        let mut played = false;
        for args in candidates(&movesets) {
            let request = ActionRequest {
                action: "move".into(),
                args: serde_json::to_value(&args).ok(),
            };
            if act(&server, room_id, player_id, &request).await.is_some() {
                played = true;
                break;
            }
        }
        if !played {
            tracing::error!(seat, phase = ?snapshot.phase, "none of the offered moves could be played");
            return Err(GameError::Internal("offered moves were all rejected".into()).into());
        }
    };

    let room = mgr.snapshot(room_id, seats[0]).await?;
    if let Some(GameSnapshot::Apologies(game)) = room.game {
        tracing::info!(
            outcome,
            actions,
            room_state = %room.room_state,
            moves_made = ?game.stats.moves_made,
            pawns_killed = ?game.stats.pawns_killed,
            seconds = game.stats.game_time_elapsed,
            "self-play finished"
        );
    }

    pusher.abort();
    Ok(())
}
