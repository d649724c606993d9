//! Playback sessions owned by the media subsystem.
//!
//! Decoding and output are external; the engine only sees a session through
//! the [`Player`] trait. All sessions live in the [`MediaPlayers`] resource
//! and are addressed by [`PlayerId`]. A
//! [`PlaybackProcess`](crate::processes::playback::PlaybackProcess) keeps
//! only the id, so it never copies or destroys the session it supervises.
//! When supervision ends the process calls [`MediaPlayers::release`], and
//! [`release_finished_players`](crate::systems::media::release_finished_players)
//! later drops released sessions once they have stopped.
//!
//! [`ClipPlayer`] is a decoder-less session that plays a fixed number of
//! frames, one per `update`. It is what scenario files spawn and what the
//! tests drive.

use bevy_ecs::prelude::*;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

/// An active media playback session.
///
/// `stop` must be safe to call any number of times.
pub trait Player: Send + Sync {
    fn is_playing(&self) -> bool;
    /// Advance decode/output state by one step.
    fn update(&mut self);
    fn stop(&mut self);
}

/// Handle to a session stored in [`MediaPlayers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(u32);

impl PlayerId {
    pub fn get(self) -> u32 {
        self.0
    }
}

/// Storage for every playback session, keyed by [`PlayerId`].
#[derive(Resource, Default)]
pub struct MediaPlayers {
    next_id: u32,
    players: FxHashMap<PlayerId, Box<dyn Player>>,
    released: FxHashSet<PlayerId>,
}

impl MediaPlayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a session and return its handle.
    pub fn insert(&mut self, player: impl Player + 'static) -> PlayerId {
        let id = PlayerId(self.next_id);
        self.next_id += 1;
        self.players.insert(id, Box::new(player));
        id
    }

    pub fn get(&self, id: PlayerId) -> Option<&dyn Player> {
        self.players.get(&id).map(|p| p.as_ref())
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut (dyn Player + 'static)> {
        self.players.get_mut(&id).map(|p| p.as_mut())
    }

    /// Drop a session. Any process still holding the id will abort on its
    /// next tick.
    pub fn remove(&mut self, id: PlayerId) -> bool {
        self.released.remove(&id);
        self.players.remove(&id).is_some()
    }

    /// Mark a session as no longer supervised. It stays stored until
    /// [`collect_released`](Self::collect_released) finds it stopped.
    ///
    /// Returns `false` for unknown ids.
    pub fn release(&mut self, id: PlayerId) -> bool {
        if !self.players.contains_key(&id) {
            return false;
        }
        self.released.insert(id);
        true
    }

    /// Drop every released session that is no longer playing.
    ///
    /// Returns the number of sessions dropped.
    pub fn collect_released(&mut self) -> usize {
        let players = &mut self.players;
        let before = players.len();
        self.released
            .retain(|id| match players.get(id).map(|p| p.is_playing()) {
                Some(true) => true,
                Some(false) => {
                    debug!("[media] session {} released", id.get());
                    players.remove(id);
                    false
                }
                None => false,
            });
        before - players.len()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Session that plays `frames` frames and then stops on its own.
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    pub name: String,
    frames: u32,
    position: u32,
    playing: bool,
    stop_calls: u32,
}

impl ClipPlayer {
    /// Create a clip that starts playing immediately.
    pub fn new(name: impl Into<String>, frames: u32) -> Self {
        ClipPlayer {
            name: name.into(),
            frames,
            position: 0,
            playing: frames > 0,
            stop_calls: 0,
        }
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    /// Number of `stop` calls received, including redundant ones.
    pub fn stop_calls(&self) -> u32 {
        self.stop_calls
    }
}

impl Player for ClipPlayer {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn update(&mut self) {
        if !self.playing {
            return;
        }
        self.position += 1;
        if self.position >= self.frames {
            debug!("[media] clip '{}' finished", self.name);
            self.playing = false;
        }
    }

    fn stop(&mut self) {
        self.stop_calls += 1;
        if self.playing {
            debug!("[media] clip '{}' stopped at frame {}", self.name, self.position);
        }
        self.playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_plays_requested_frames() {
        let mut clip = ClipPlayer::new("intro", 2);
        assert!(clip.is_playing());
        clip.update();
        assert!(clip.is_playing());
        clip.update();
        assert!(!clip.is_playing());
        clip.update();
        assert_eq!(clip.position(), 2);
    }

    #[test]
    fn test_empty_clip_never_plays() {
        let clip = ClipPlayer::new("empty", 0);
        assert!(!clip.is_playing());
    }

    #[test]
    fn test_stop_is_repeatable() {
        let mut clip = ClipPlayer::new("loop", 10);
        clip.stop();
        clip.stop();
        assert!(!clip.is_playing());
        assert_eq!(clip.stop_calls(), 2);
    }

    #[test]
    fn test_media_players_hand_out_distinct_ids() {
        let mut players = MediaPlayers::new();
        let a = players.insert(ClipPlayer::new("a", 1));
        let b = players.insert(ClipPlayer::new("b", 1));
        assert_ne!(a, b);
        assert_eq!(players.len(), 2);
        assert!(players.remove(a));
        assert!(players.get(a).is_none());
        assert!(players.get(b).is_some());
    }

    #[test]
    fn test_release_waits_for_session_to_stop() {
        let mut players = MediaPlayers::new();
        let id = players.insert(ClipPlayer::new("music", 2));
        assert!(players.release(id));

        assert_eq!(players.collect_released(), 0);
        assert_eq!(players.len(), 1);

        if let Some(player) = players.get_mut(id) {
            player.stop();
        }
        assert_eq!(players.collect_released(), 1);
        assert!(players.is_empty());
    }

    #[test]
    fn test_unreleased_sessions_are_kept() {
        let mut players = MediaPlayers::new();
        players.insert(ClipPlayer::new("done", 0));
        let gone = players.insert(ClipPlayer::new("gone", 0));
        players.remove(gone);

        assert!(!players.release(gone));
        assert_eq!(players.collect_released(), 0);
        assert_eq!(players.len(), 1);
    }
}
