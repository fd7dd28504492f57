//! Player avatar: key-driven movement and idle/walk/run clip selection.

use crate::animation::{ActionId, AnimationMixer};
use crate::constants::{
    CHARACTER_SCALE, PLAYER_IDLE_CLIP, PLAYER_RUN_CLIP, PLAYER_WALK_CLIP, SWAY_FREQ_X,
    SWAY_FREQ_Y, SWAY_TIME_SCALE,
};
use crate::keys::{KeyState, KEY_BACK, KEY_FORWARD, KEY_LEFT, KEY_RIGHT};
use crate::model::{ModelData, ModelInstance};
use crate::scene::SceneParams;
use glam::Vec3;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gait {
    Idle,
    Walk,
    Run,
}

/// Raw movement direction from held keys.
///
/// Forward beats back and left beats right when both of a pair are held:
/// the first key checked wins.
pub fn movement_direction(keys: &KeyState, component: f32) -> Vec3 {
    let mut dir = Vec3::ZERO;
    if keys.is_down(KEY_FORWARD) {
        dir.z = -component;
    } else if keys.is_down(KEY_BACK) {
        dir.z = component;
    }
    if keys.is_down(KEY_LEFT) {
        dir.x = -component;
    } else if keys.is_down(KEY_RIGHT) {
        dir.x = component;
    }
    dir
}

#[inline]
pub fn select_gait(direction: Vec3, shift: bool) -> Gait {
    if direction.length() == 0.0 {
        Gait::Idle
    } else if shift {
        Gait::Run
    } else {
        Gait::Walk
    }
}

/// Carriage sway offset `(x, y)` at wall-clock `now_ms`.
pub fn sway_offset(now_ms: f64, amplitude: f32) -> (f32, f32) {
    let t = now_ms * SWAY_TIME_SCALE;
    let x = (t * SWAY_FREQ_X).sin() as f32 * amplitude;
    let y = (t * SWAY_FREQ_Y).sin() as f32 * amplitude;
    (x, y)
}

pub struct Player {
    pub model: ModelInstance,
    pub mixer: AnimationMixer,
    pub idle: Option<ActionId>,
    pub walk: Option<ActionId>,
    pub run: Option<ActionId>,
}

impl Player {
    /// Bind clips 0/1/2 as idle/walk/run and start idle. Missing clips are
    /// reported and left unbound.
    pub fn new(data: Arc<ModelData>) -> Self {
        let mut model = ModelInstance::new(data.clone());
        model.root.scale = Vec3::splat(CHARACTER_SCALE);
        let mut mixer = AnimationMixer::new();
        let mut bind = |index: usize, label: &str| match data.clips.get(index) {
            Some(clip) => {
                log::info!("[player] {} action: clip {} '{}'", label, index, clip.name);
                Some(mixer.clip_action(clip.clone()))
            }
            None => {
                log::error!(
                    "[player] missing {} clip at index {} ({} available)",
                    label,
                    index,
                    data.clips.len()
                );
                None
            }
        };
        let idle = bind(PLAYER_IDLE_CLIP, "idle");
        let walk = bind(PLAYER_WALK_CLIP, "walk");
        let run = bind(PLAYER_RUN_CLIP, "run");
        let mut player = Self {
            model,
            mixer,
            idle,
            walk,
            run,
        };
        player.play_only(Gait::Idle);
        player
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.model.root.translation
    }

    fn action(&self, gait: Gait) -> Option<ActionId> {
        match gait {
            Gait::Idle => self.idle,
            Gait::Walk => self.walk,
            Gait::Run => self.run,
        }
    }

    /// Play the clip for `gait` and stop the other two.
    pub fn play_only(&mut self, gait: Gait) {
        for g in [Gait::Idle, Gait::Walk, Gait::Run] {
            let Some(id) = self.action(g) else {
                continue;
            };
            if g == gait {
                self.mixer.play(id);
            } else {
                self.mixer.stop(id);
            }
        }
    }

    pub fn is_playing(&self, gait: Gait) -> bool {
        self.action(gait)
            .map(|id| self.mixer.is_playing(id))
            .unwrap_or(false)
    }

    /// Gait whose clip is currently playing, if any.
    pub fn playing_gait(&self) -> Option<Gait> {
        [Gait::Idle, Gait::Walk, Gait::Run]
            .into_iter()
            .find(|g| self.is_playing(*g))
    }

    /// Apply one frame of keyboard control. Returns the selected gait.
    pub fn steer(&mut self, keys: &KeyState, params: &SceneParams) -> Gait {
        let mut dir = movement_direction(keys, params.move_component);
        let gait = select_gait(dir, keys.shift());
        match gait {
            Gait::Idle => log::trace!("Idle"),
            Gait::Walk => log::trace!("Walking"),
            Gait::Run => log::trace!("Running"),
        }
        self.play_only(gait);
        if gait == Gait::Idle {
            return gait;
        }
        let root = &mut self.model.root;
        if gait == Gait::Run {
            dir *= params.run_direction_scale;
            // extra step along the facing from before this frame's turn
            root.translate_z(params.run_extra_step);
        }
        let target = root.translation + dir;
        root.look_at(target, Vec3::Y);
        root.translate_z(params.walk_step);
        gait
    }

    /// Overwrite x/y with the sway offset for `now_ms`.
    pub fn sway(&mut self, now_ms: f64, amplitude: f32) {
        let (x, y) = sway_offset(now_ms, amplitude);
        self.model.root.translation.y = y;
        self.model.root.translation.x = x;
    }
}
