//! Media session housekeeping.
//!
//! [`release_finished_players`] runs after
//! [`run_processes`](crate::systems::processes::run_processes) and drops the
//! sessions whose playback process has ended, so [`MediaPlayers`] only holds
//! sessions something still supervises.

use bevy_ecs::prelude::*;
use log::debug;

use crate::resources::media::MediaPlayers;

/// Drop released sessions that have stopped playing.
pub fn release_finished_players(players: Option<ResMut<MediaPlayers>>) {
    let Some(mut players) = players else {
        return;
    };
    let dropped = players.collect_released();
    if dropped > 0 {
        debug!("[media] dropped {} session(s), {} left", dropped, players.len());
    }
}
