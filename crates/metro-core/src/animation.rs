//! Keyframe clips and a per-model mixer.
//!
//! A clip is a set of node channels (translation, rotation or scale). The
//! mixer owns one action per bound clip, advances the playing ones by the
//! frame delta (looping), and writes the sampled values into a node pose.

use crate::transform::Transform;
use glam::{Quat, Vec3};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
}

#[derive(Clone, Debug)]
pub enum ChannelValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

#[derive(Clone, Debug)]
pub struct Channel {
    pub node: usize,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub values: ChannelValues,
}

#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    /// Build a clip; duration is the last keyframe time over all channels.
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|c| c.times.last().copied())
            .fold(0.0_f32, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }

    /// Write this clip's values at `time` into `pose`. Channels targeting
    /// nodes outside the pose are ignored.
    pub fn apply(&self, time: f32, pose: &mut [Transform]) {
        for channel in &self.channels {
            let Some(node) = pose.get_mut(channel.node) else {
                continue;
            };
            let Some((i0, i1, f)) = keyframe_span(&channel.times, time) else {
                continue;
            };
            let f = match channel.interpolation {
                Interpolation::Linear => f,
                Interpolation::Step => 0.0,
            };
            match &channel.values {
                ChannelValues::Translation(v) => {
                    if let (Some(a), Some(b)) = (v.get(i0), v.get(i1)) {
                        node.translation = a.lerp(*b, f);
                    }
                }
                ChannelValues::Scale(v) => {
                    if let (Some(a), Some(b)) = (v.get(i0), v.get(i1)) {
                        node.scale = a.lerp(*b, f);
                    }
                }
                ChannelValues::Rotation(v) => {
                    if let (Some(a), Some(b)) = (v.get(i0), v.get(i1)) {
                        node.rotation = a.slerp(*b, f).normalize();
                    }
                }
            }
        }
    }
}

// Returns the bracketing keyframe indices and the blend factor between them.
fn keyframe_span(times: &[f32], t: f32) -> Option<(usize, usize, f32)> {
    let last = times.len().checked_sub(1)?;
    if t <= times[0] {
        return Some((0, 0, 0.0));
    }
    if t >= times[last] {
        return Some((last, last, 0.0));
    }
    let i1 = times.partition_point(|&k| k <= t);
    let i0 = i1 - 1;
    let span = times[i1] - times[i0];
    let f = if span > 0.0 { (t - times[i0]) / span } else { 0.0 };
    Some((i0, i1, f))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionId(usize);

impl ActionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct AnimationAction {
    pub clip: Arc<AnimationClip>,
    pub time: f32,
    pub playing: bool,
}

#[derive(Clone, Debug, Default)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
}

impl AnimationMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a clip. Binding the same clip twice returns the existing action.
    pub fn clip_action(&mut self, clip: Arc<AnimationClip>) -> ActionId {
        if let Some(i) = self.actions.iter().position(|a| Arc::ptr_eq(&a.clip, &clip)) {
            return ActionId(i);
        }
        self.actions.push(AnimationAction {
            clip,
            time: 0.0,
            playing: false,
        });
        ActionId(self.actions.len() - 1)
    }

    /// Start an action. An action that is already playing keeps its time.
    pub fn play(&mut self, id: ActionId) {
        if let Some(a) = self.actions.get_mut(id.0) {
            a.playing = true;
        }
    }

    /// Stop an action and rewind it to the start.
    pub fn stop(&mut self, id: ActionId) {
        if let Some(a) = self.actions.get_mut(id.0) {
            a.playing = false;
            a.time = 0.0;
        }
    }

    #[inline]
    pub fn is_playing(&self, id: ActionId) -> bool {
        self.actions.get(id.0).map(|a| a.playing).unwrap_or(false)
    }

    pub fn action(&self, id: ActionId) -> Option<&AnimationAction> {
        self.actions.get(id.0)
    }

    pub fn playing_count(&self) -> usize {
        self.actions.iter().filter(|a| a.playing).count()
    }

    /// Advance playing actions by `dt` seconds and apply them to `pose`.
    pub fn update(&mut self, dt: f32, pose: &mut [Transform]) {
        for action in self.actions.iter_mut().filter(|a| a.playing) {
            let duration = action.clip.duration;
            action.time += dt.max(0.0);
            if duration > 0.0 {
                action.time = action.time.rem_euclid(duration);
            } else {
                action.time = 0.0;
            }
            action.clip.apply(action.time, pose);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide_clip() -> Arc<AnimationClip> {
        Arc::new(AnimationClip::new(
            "slide",
            vec![Channel {
                node: 0,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 1.0, 2.0],
                values: ChannelValues::Translation(vec![
                    Vec3::ZERO,
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(1.0, 2.0, 0.0),
                ]),
            }],
        ))
    }

    #[test]
    fn duration_is_last_keyframe() {
        assert_eq!(slide_clip().duration, 2.0);
    }

    #[test]
    fn linear_sampling_interpolates() {
        let mut mixer = AnimationMixer::new();
        let id = mixer.clip_action(slide_clip());
        mixer.play(id);
        let mut pose = vec![Transform::IDENTITY];
        mixer.update(0.5, &mut pose);
        assert!((pose[0].translation.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn step_sampling_holds_previous_key() {
        let mut clip = (*slide_clip()).clone();
        clip.channels[0].interpolation = Interpolation::Step;
        let mut pose = vec![Transform::IDENTITY];
        clip.apply(1.9, &mut pose);
        assert_eq!(pose[0].translation, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn playing_action_loops() {
        let mut mixer = AnimationMixer::new();
        let id = mixer.clip_action(slide_clip());
        mixer.play(id);
        let mut pose = vec![Transform::IDENTITY];
        mixer.update(2.5, &mut pose);
        let t = mixer.action(id).unwrap().time;
        assert!((t - 0.5).abs() < 1e-6, "time={t}");
    }

    #[test]
    fn stop_rewinds_and_stopped_actions_do_not_advance() {
        let mut mixer = AnimationMixer::new();
        let id = mixer.clip_action(slide_clip());
        mixer.play(id);
        let mut pose = vec![Transform::IDENTITY];
        mixer.update(0.3, &mut pose);
        mixer.stop(id);
        assert_eq!(mixer.action(id).unwrap().time, 0.0);
        mixer.update(0.3, &mut pose);
        assert_eq!(mixer.action(id).unwrap().time, 0.0);
        assert!(!mixer.is_playing(id));
    }

    #[test]
    fn play_keeps_time_when_already_playing() {
        let mut mixer = AnimationMixer::new();
        let id = mixer.clip_action(slide_clip());
        mixer.play(id);
        let mut pose = vec![Transform::IDENTITY];
        mixer.update(0.25, &mut pose);
        mixer.play(id);
        assert!((mixer.action(id).unwrap().time - 0.25).abs() < 1e-6);
    }

    #[test]
    fn binding_same_clip_reuses_action() {
        let clip = slide_clip();
        let mut mixer = AnimationMixer::new();
        let a = mixer.clip_action(clip.clone());
        let b = mixer.clip_action(clip);
        assert_eq!(a, b);
    }
}
