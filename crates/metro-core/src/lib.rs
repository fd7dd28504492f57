pub mod animation;
pub mod asset;
pub mod camera;
pub mod constants;
pub mod error;
pub mod glitch;
pub mod keys;
pub mod model;
pub mod music;
pub mod npc;
pub mod player;
pub mod post;
pub mod scene;
pub mod transform;

// Shaders bundled as string constants
pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");

pub use animation::{ActionId, AnimationClip, AnimationMixer};
pub use asset::Asset;
pub use camera::OrthoCamera;
pub use constants::*;
pub use error::LoadError;
pub use glitch::{GlitchEffect, GlitchScheduler, GlitchUniforms};
pub use keys::KeyState;
pub use model::{ModelData, ModelInstance};
pub use music::{MusicGate, SoundFormat, MUSIC_FORMATS};
pub use npc::Npc;
pub use player::{Gait, Player};
pub use post::{PassKind, PostChain};
pub use scene::{FrameReport, ModelKey, SceneContext, SceneParams};
pub use transform::Transform;
