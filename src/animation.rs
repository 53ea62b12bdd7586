//! Clip playback with cross-fading.
//!
//! [`AnimationDriver`] is the seam the character controller talks to; the
//! [`AnimationMixer`] here is the in-process implementation that keeps one
//! action per registered clip and blends them through linear weight fades.

use serde::{Deserialize, Serialize};

/// Handle for a clip registered with an animation driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(usize);

impl ClipId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Operations the locomotion controller needs from an animation backend.
pub trait AnimationDriver {
    /// Advances every playing clip and every running fade by `delta` seconds.
    fn advance(&mut self, delta: f32);
    /// Starts playback without touching time or weight.
    fn play(&mut self, clip: ClipId);
    /// Rewinds to the first frame, cancels fades and restores full weight.
    fn reset(&mut self, clip: ClipId);
    /// Ramps the weight from zero to one over `duration` seconds.
    fn fade_in(&mut self, clip: ClipId, duration: f32);
    /// Ramps the weight down to zero over `duration` seconds, then stops.
    fn fade_out(&mut self, clip: ClipId, duration: f32);
}

/// Named clip as handed over by the asset loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

/// Playback state of one clip inside the mixer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationAction {
    clip: AnimationClip,
    time: f32,
    weight: f32,
    playing: bool,
    fade: Option<Fade>,
}

impl AnimationAction {
    fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time: 0.0,
            weight: 1.0,
            playing: false,
            fade: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.clip.name
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    fn schedule_fade(&mut self, from: f32, to: f32, duration: f32) {
        if duration <= 0.0 {
            self.fade = None;
            self.weight = to;
            if to <= 0.0 {
                self.playing = false;
            }
            return;
        }
        self.weight = from;
        self.fade = Some(Fade {
            from,
            to,
            elapsed: 0.0,
            duration,
        });
    }

    fn advance(&mut self, delta: f32) {
        if !self.playing {
            return;
        }
        self.time += delta;
        if self.clip.duration > 0.0 {
            self.time = self.time.rem_euclid(self.clip.duration);
        }
        if let Some(fade) = self.fade.as_mut() {
            fade.elapsed += delta;
            let t = (fade.elapsed / fade.duration).min(1.0);
            self.weight = fade.from + (fade.to - fade.from) * t;
            if t >= 1.0 {
                self.fade = None;
                if self.weight <= 0.0 {
                    self.playing = false;
                }
            }
        }
    }
}

/// Owns one action per clip and advances them in lock step.
#[derive(Debug, Clone, Default)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
    time: f32,
}

impl AnimationMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a clip and returns the handle used to drive it.
    pub fn add_clip(&mut self, clip: AnimationClip) -> ClipId {
        self.actions.push(AnimationAction::new(clip));
        ClipId(self.actions.len() - 1)
    }

    pub fn action(&self, clip: ClipId) -> Option<&AnimationAction> {
        self.actions.get(clip.0)
    }

    /// Total time the mixer has been advanced by.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn playing(&self) -> impl Iterator<Item = &AnimationAction> + '_ {
        self.actions.iter().filter(|action| action.playing)
    }

    fn action_mut(&mut self, clip: ClipId) -> Option<&mut AnimationAction> {
        let action = self.actions.get_mut(clip.0);
        if action.is_none() {
            log::warn!("animation clip {} is not registered", clip.0);
        }
        action
    }
}

impl AnimationDriver for AnimationMixer {
    fn advance(&mut self, delta: f32) {
        self.time += delta;
        for action in &mut self.actions {
            action.advance(delta);
        }
    }

    fn play(&mut self, clip: ClipId) {
        if let Some(action) = self.action_mut(clip) {
            action.playing = true;
        }
    }

    fn reset(&mut self, clip: ClipId) {
        if let Some(action) = self.action_mut(clip) {
            action.time = 0.0;
            action.weight = 1.0;
            action.fade = None;
        }
    }

    fn fade_in(&mut self, clip: ClipId, duration: f32) {
        if let Some(action) = self.action_mut(clip) {
            action.schedule_fade(0.0, 1.0, duration);
        }
    }

    fn fade_out(&mut self, clip: ClipId, duration: f32) {
        if let Some(action) = self.action_mut(clip) {
            let from = action.weight;
            action.schedule_fade(from, 0.0, duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixer_with(names: &[(&str, f32)]) -> (AnimationMixer, Vec<ClipId>) {
        let mut mixer = AnimationMixer::new();
        let ids = names
            .iter()
            .map(|(name, duration)| mixer.add_clip(AnimationClip::new(*name, *duration)))
            .collect();
        (mixer, ids)
    }

    #[test]
    fn playing_clip_loops_over_its_duration() {
        let (mut mixer, ids) = mixer_with(&[("Idle", 1.0)]);
        mixer.play(ids[0]);
        mixer.advance(0.75);
        mixer.advance(0.5);
        let action = mixer.action(ids[0]).unwrap();
        assert!((action.time() - 0.25).abs() < 1e-5);
        assert!((mixer.time() - 1.25).abs() < 1e-5);
    }

    #[test]
    fn stopped_clip_does_not_advance() {
        let (mut mixer, ids) = mixer_with(&[("Walk", 1.0)]);
        mixer.advance(0.5);
        assert_eq!(mixer.action(ids[0]).unwrap().time(), 0.0);
    }

    #[test]
    fn cross_fade_swaps_weights_and_stops_the_old_clip() {
        let (mut mixer, ids) = mixer_with(&[("Idle", 2.0), ("Run", 0.8)]);
        let (idle, run) = (ids[0], ids[1]);
        mixer.play(idle);

        mixer.fade_out(idle, 0.2);
        mixer.reset(run);
        mixer.fade_in(run, 0.2);
        mixer.play(run);

        mixer.advance(0.1);
        let half_idle = mixer.action(idle).unwrap().weight();
        let half_run = mixer.action(run).unwrap().weight();
        assert!((half_idle - 0.5).abs() < 1e-5);
        assert!((half_run - 0.5).abs() < 1e-5);

        mixer.advance(0.1);
        assert!(!mixer.action(idle).unwrap().is_playing());
        let run_action = mixer.action(run).unwrap();
        assert!(run_action.is_playing());
        assert!(!run_action.is_fading());
        assert_eq!(run_action.weight(), 1.0);
        assert_eq!(mixer.playing().count(), 1);
    }

    #[test]
    fn reset_rewinds_time_and_cancels_fade() {
        let (mut mixer, ids) = mixer_with(&[("Walk", 1.0)]);
        mixer.play(ids[0]);
        mixer.fade_out(ids[0], 1.0);
        mixer.advance(0.4);
        mixer.reset(ids[0]);
        let action = mixer.action(ids[0]).unwrap();
        assert_eq!(action.time(), 0.0);
        assert_eq!(action.weight(), 1.0);
        assert!(!action.is_fading());
    }

    #[test]
    fn zero_duration_fade_applies_immediately() {
        let (mut mixer, ids) = mixer_with(&[("Idle", 1.0)]);
        mixer.play(ids[0]);
        mixer.fade_out(ids[0], 0.0);
        let action = mixer.action(ids[0]).unwrap();
        assert_eq!(action.weight(), 0.0);
        assert!(!action.is_playing());
    }
}
