//! Scene state and the per-frame update.
//!
//! Everything the frame loop mutates lives in [`SceneContext`]. Loaders hand
//! finished (or failed) assets to the `install_*` methods at any time; the
//! update skips whatever is not ready yet.

use crate::asset::Asset;
use crate::camera::OrthoCamera;
use crate::constants::*;
use crate::error::LoadError;
use crate::glitch::{GlitchEffect, GlitchScheduler, GlitchUniforms};
use crate::keys::KeyState;
use crate::model::{ModelData, ModelInstance};
use crate::npc::Npc;
use crate::player::{Gait, Player};
use crate::post::{PassKind, PostChain};
use glam::Vec3;
use smallvec::SmallVec;
use std::sync::Arc;

/// Tuning for the update loop. `Default` uses the shared constants.
#[derive(Clone, Debug)]
pub struct SceneParams {
    pub move_component: f32,
    pub walk_step: f32,
    pub run_extra_step: f32,
    pub run_direction_scale: f32,
    pub camera_offset: Vec3,
    pub platform_speed: f32,
    pub platform_wrap_below: f32,
    pub platform_reset_z: f32,
    pub sway_amplitude: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            move_component: MOVE_COMPONENT,
            walk_step: WALK_STEP,
            run_extra_step: RUN_EXTRA_STEP,
            run_direction_scale: RUN_DIRECTION_SCALE,
            camera_offset: CAMERA_OFFSET,
            platform_speed: PLATFORM_SPEED,
            platform_wrap_below: PLATFORM_WRAP_BELOW,
            platform_reset_z: PLATFORM_RESET_Z,
            sway_amplitude: SWAY_AMPLITUDE,
        }
    }
}

/// Move one platform toward -Z and wrap it back once it passes the threshold.
#[inline]
pub fn scroll_platform(z: &mut f32, speed: f32, dt: f32, wrap_below: f32, reset_z: f32) {
    *z -= speed * dt;
    if *z < wrap_below {
        *z = reset_z;
    }
}

pub struct Environment {
    pub model: ModelInstance,
    /// Node indices of the two platforms, when both were found.
    pub platforms: Option<[usize; 2]>,
}

impl Environment {
    pub fn new(data: Arc<ModelData>) -> Self {
        let mut model = ModelInstance::new(data.clone());
        model.root.scale = ENVIRONMENT_SCALE;
        let p1 = data.find_node(PLATFORM_NAMES[0]);
        let p2 = data.find_node(PLATFORM_NAMES[1]);
        let platforms = match (p1, p2) {
            (Some(a), Some(b)) => Some([a, b]),
            _ => {
                log::warn!("[scene] platform nodes not found (first={p1:?}, second={p2:?})");
                None
            }
        };
        Self { model, platforms }
    }

    pub fn platform_z(&self) -> Option<[f32; 2]> {
        self.platforms
            .map(|[a, b]| [self.model.pose[a].translation.z, self.model.pose[b].translation.z])
    }
}

/// Stable identity of a model slot, used by the renderer to cache GPU data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelKey {
    Environment,
    Player,
    Npc(usize),
}

/// What one update decided; consumed by the renderer.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub camera_position: Vec3,
    pub passes: SmallVec<[PassKind; 2]>,
    pub glitch: Option<GlitchUniforms>,
    pub gait: Option<Gait>,
}

pub struct SceneContext {
    pub params: SceneParams,
    pub camera: OrthoCamera,
    pub environment: Asset<Environment>,
    pub player: Asset<Player>,
    pub npcs: Vec<Npc>,
    pub glitch: GlitchScheduler,
    effect: GlitchEffect,
    post: PostChain,
}

impl SceneContext {
    pub fn new(aspect: f32, params: SceneParams, seed: u64) -> Self {
        Self {
            params,
            camera: OrthoCamera::new(aspect),
            environment: Asset::NotLoaded,
            player: Asset::NotLoaded,
            npcs: Vec::new(),
            glitch: GlitchScheduler::new(),
            effect: GlitchEffect::new(seed),
            post: PostChain::new(),
        }
    }

    pub fn install_environment(&mut self, result: Result<ModelData, LoadError>) {
        self.environment = match result {
            Ok(data) => {
                log::info!("[scene] environment loaded ({} nodes)", data.nodes.len());
                Asset::Ready(Environment::new(Arc::new(data)))
            }
            Err(e) => {
                log::error!("Error loading scene: {}", e);
                Asset::Failed(e.to_string())
            }
        };
    }

    pub fn install_player(&mut self, result: Result<ModelData, LoadError>) {
        self.player = match result {
            Ok(data) => {
                log::info!("[scene] player loaded ({} clips)", data.clips.len());
                Asset::Ready(Player::new(Arc::new(data)))
            }
            Err(e) => {
                log::error!("Error loading model: {}", e);
                Asset::Failed(e.to_string())
            }
        };
    }

    /// Add a passenger. Failed loads are reported and not added.
    pub fn install_npc(&mut self, spec: &NpcSpec, result: Result<ModelData, LoadError>) {
        match result {
            Ok(data) => {
                log::info!("[scene] NPC loaded from {}", spec.path);
                self.npcs.push(Npc::new(spec, Arc::new(data)));
            }
            Err(e) => {
                log::error!("An error happened while loading the NPC: {}: {}", spec.path, e);
            }
        }
    }

    pub fn post_chain(&self) -> &PostChain {
        &self.post
    }

    /// RGBA8 displacement texture for the glitch pass, drawn from the effect's RNG.
    pub fn displacement_map(&mut self) -> Vec<u8> {
        self.effect.displacement_map(GLITCH_DISPLACEMENT_SIZE)
    }

    /// Loaded model instances with their stable keys.
    pub fn models(&self) -> impl Iterator<Item = (ModelKey, &ModelInstance)> {
        let env = self
            .environment
            .ready()
            .map(|e| (ModelKey::Environment, &e.model));
        let player = self.player.ready().map(|p| (ModelKey::Player, &p.model));
        let npcs = self
            .npcs
            .iter()
            .enumerate()
            .map(|(i, n)| (ModelKey::Npc(i), &n.model));
        env.into_iter().chain(player).chain(npcs)
    }

    /// Advance one frame.
    ///
    /// `dt` is seconds since the previous frame, `now_ms` wall-clock
    /// milliseconds (drives sway and glitch timing).
    pub fn update(&mut self, dt: f32, now_ms: f64, keys: &KeyState) -> FrameReport {
        let params = &self.params;

        if let Some(player) = self.player.ready_mut() {
            player.mixer.update(dt, &mut player.model.pose);
        }
        for npc in self.npcs.iter_mut() {
            npc.update(dt);
        }

        let mut gait = None;
        if let Some(player) = self.player.ready_mut() {
            gait = Some(player.steer(keys, params));
            self.camera.position = player.position() + params.camera_offset;
        }

        if let Some(env) = self.environment.ready_mut() {
            if let Some(platforms) = env.platforms {
                for i in platforms {
                    scroll_platform(
                        &mut env.model.pose[i].translation.z,
                        params.platform_speed,
                        dt,
                        params.platform_wrap_below,
                        params.platform_reset_z,
                    );
                }
            }
        }

        // sway overwrites x/y after movement and camera follow
        if let Some(player) = self.player.ready_mut() {
            player.sway(now_ms, params.sway_amplitude);
        }

        let glitch_on = self.glitch.update(now_ms);
        self.post.set_glitch(glitch_on);
        let glitch = glitch_on.then(|| self.effect.next_frame(self.glitch.go_wild()));

        FrameReport {
            camera_position: self.camera.position,
            passes: self.post.passes().iter().copied().collect(),
            glitch,
            gait,
        }
    }
}
