//! Recitation sequencing
//!
//! Sequential ayah playback modeled as an explicit state machine over a
//! finite, restartable sequence of audio resource handles:
//! `Idle -> Playing(0) -> Playing(1) -> ... -> Idle`. The driver owns the
//! actual audio element; this module only decides which handle plays next.
//!
//! Both a finished track and a failed track advance the sequence, matching
//! playback chaining on end-of-track and on error. Cancellation is "stop
//! iterating": the state returns to `Idle` and the current handle is
//! released.

use serde::{Deserialize, Serialize};

/// Handle to one playable ayah recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackHandle {
    pub surah: u16,
    pub ayah: u16,
    /// Resource locator understood by the audio driver
    pub url: String,
}

impl TrackHandle {
    pub fn new(surah: u16, ayah: u16, url: impl Into<String>) -> Self {
        Self {
            surah,
            ayah,
            url: url.into(),
        }
    }
}

/// Playback position within the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "index")]
pub enum PlaybackState {
    Idle,
    Playing(usize),
}

/// Restartable sequence of recitation tracks
#[derive(Debug, Clone)]
pub struct RecitationQueue {
    tracks: Vec<TrackHandle>,
    state: PlaybackState,
}

impl RecitationQueue {
    pub fn new(tracks: Vec<TrackHandle>) -> Self {
        Self {
            tracks,
            state: PlaybackState::Idle,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == PlaybackState::Idle
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The handle the driver should currently be playing
    pub fn current(&self) -> Option<&TrackHandle> {
        match self.state {
            PlaybackState::Playing(index) => self.tracks.get(index),
            PlaybackState::Idle => None,
        }
    }

    /// Start (or restart) playback from the first track
    pub fn play(&mut self) -> Option<&TrackHandle> {
        self.play_from(0)
    }

    /// Start playback at a specific track index
    pub fn play_from(&mut self, index: usize) -> Option<&TrackHandle> {
        if index < self.tracks.len() {
            self.state = PlaybackState::Playing(index);
            self.current()
        } else {
            self.state = PlaybackState::Idle;
            None
        }
    }

    /// The current track ended; advance, or go idle at the end of the
    /// sequence. Returns the next handle to play, if any.
    pub fn on_finished(&mut self) -> Option<&TrackHandle> {
        self.advance()
    }

    /// The current track failed to play; skip it and continue, mirroring
    /// the on-finished transition so one bad resource never stalls the
    /// sequence.
    pub fn on_failed(&mut self) -> Option<&TrackHandle> {
        if let PlaybackState::Playing(index) = self.state {
            log::debug!("skipping failed track at index {}", index);
        }
        self.advance()
    }

    /// Cancel playback and release the current handle
    pub fn stop(&mut self) {
        self.state = PlaybackState::Idle;
    }

    fn advance(&mut self) -> Option<&TrackHandle> {
        match self.state {
            PlaybackState::Playing(index) if index + 1 < self.tracks.len() => {
                self.state = PlaybackState::Playing(index + 1);
                self.current()
            }
            _ => {
                self.state = PlaybackState::Idle;
                None
            }
        }
    }
}
