//! Playback supervision process.
//!
//! A [`PlaybackProcess`] stays alive exactly as long as its session in
//! [`MediaPlayers`] reports playing. Each tick it first checks
//! [`Player::is_playing`]; a stopped session makes the process succeed
//! without being advanced again. Otherwise the session's `update` is called
//! once.
//!
//! `aborted` tells the session to stop, which is how a cancelled cutscene or
//! video gets silenced. Both hooks then hand the session back to
//! [`MediaPlayers`] with `release`; the process never drops it itself.

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::processes::{Process, ProcessControl, ProcessError};
use crate::resources::media::{MediaPlayers, PlayerId};

#[cfg(doc)]
use crate::resources::media::Player;

/// Process that advances a playback session until it stops.
#[derive(Debug, Clone)]
pub struct PlaybackProcess {
    player: PlayerId,
    entity: Option<Entity>,
}

impl PlaybackProcess {
    pub fn new(player: PlayerId) -> Self {
        PlaybackProcess {
            player,
            entity: None,
        }
    }

    /// Tie the process to an entity so it is cancelled with it.
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entity = Some(entity);
        self
    }
}

impl Process for PlaybackProcess {
    fn name(&self) -> &str {
        "playback"
    }

    fn entity(&self) -> Option<Entity> {
        self.entity
    }

    fn update(&mut self, _time: f32, world: &mut World, control: &mut ProcessControl) {
        if !control.is_alive() {
            return;
        }
        let Some(mut players) = world.get_resource_mut::<MediaPlayers>() else {
            warn!("playback {}: no media subsystem, aborting", self.player.get());
            control.abort();
            return;
        };
        let Some(player) = players.get_mut(self.player) else {
            warn!("playback {}: session is gone, aborting", self.player.get());
            control.abort();
            return;
        };

        if !player.is_playing() {
            control.succeed();
            return;
        }
        player.update();
    }

    fn succeeded(&mut self, world: &mut World) -> Result<(), ProcessError> {
        debug!("playback {} finished", self.player.get());
        if let Some(mut players) = world.get_resource_mut::<MediaPlayers>() {
            players.release(self.player);
        }
        Ok(())
    }

    fn aborted(&mut self, world: &mut World) -> Result<(), ProcessError> {
        debug!("playback {} aborted, stopping session", self.player.get());
        if let Some(mut players) = world.get_resource_mut::<MediaPlayers>() {
            if let Some(player) = players.get_mut(self.player) {
                player.stop();
            }
            players.release(self.player);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::media::ClipPlayer;

    #[test]
    fn test_runs_until_clip_ends() {
        let mut world = World::new();
        let mut players = MediaPlayers::new();
        let id = players.insert(ClipPlayer::new("door", 2));
        world.insert_resource(players);
        let mut process = PlaybackProcess::new(id);
        let mut control = ProcessControl::new();

        process.update(0.0, &mut world, &mut control);
        assert!(control.is_alive());
        process.update(0.0, &mut world, &mut control);
        assert!(control.is_alive());
        process.update(0.0, &mut world, &mut control);
        assert!(!control.is_alive());
        assert_eq!(
            control.status(),
            crate::processes::ProcessStatus::Succeeded
        );
    }

    #[test]
    fn test_missing_session_aborts() {
        let mut world = World::new();
        let mut players = MediaPlayers::new();
        let id = players.insert(ClipPlayer::new("gone", 2));
        players.remove(id);
        world.insert_resource(players);
        let mut process = PlaybackProcess::new(id);
        let mut control = ProcessControl::new();

        process.update(0.0, &mut world, &mut control);

        assert_eq!(control.status(), crate::processes::ProcessStatus::Aborted);
        assert_eq!(process.aborted(&mut world), Ok(()));
    }

    #[test]
    fn test_hooks_release_without_dropping() {
        let mut world = World::new();
        let mut players = MediaPlayers::new();
        let finished = players.insert(ClipPlayer::new("done", 0));
        let cancelled = players.insert(ClipPlayer::new("cut", 10));
        world.insert_resource(players);

        assert_eq!(PlaybackProcess::new(finished).succeeded(&mut world), Ok(()));
        assert_eq!(PlaybackProcess::new(cancelled).aborted(&mut world), Ok(()));

        let mut players = world.resource_mut::<MediaPlayers>();
        assert_eq!(players.len(), 2);
        assert!(players.get(cancelled).is_some_and(|p| !p.is_playing()));
        assert_eq!(players.collect_released(), 2);
    }
}
