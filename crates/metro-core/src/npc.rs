use crate::animation::{ActionId, AnimationMixer};
use crate::asset::Asset;
use crate::constants::NpcSpec;
use crate::error::LoadError;
use crate::model::{ModelData, ModelInstance};
use glam::Vec3;
use std::sync::Arc;

/// A passenger playing a single looping clip.
pub struct Npc {
    pub source: String,
    pub model: ModelInstance,
    pub mixer: AnimationMixer,
    pub action: Asset<ActionId>,
}

impl Npc {
    /// Place the model and start the clip named by `spec.clip_index`.
    ///
    /// An out-of-range index leaves the action failed; the passenger is still
    /// placed and rendered in its bind pose.
    pub fn new(spec: &NpcSpec, data: Arc<ModelData>) -> Self {
        let mut model = ModelInstance::new(data.clone());
        model.root.translation = Vec3::from_array(spec.position);
        model.root.scale = Vec3::from_array(spec.scale);
        let mut mixer = AnimationMixer::new();
        let names: Vec<&str> = data.clips.iter().map(|c| c.name.as_str()).collect();
        log::info!("[npc] animations available in {}: {:?}", spec.path, names);

        let action = match data.clips.get(spec.clip_index) {
            Some(clip) => {
                let id = mixer.clip_action(clip.clone());
                mixer.play(id);
                log::info!(
                    "[npc] playing animation index {} ('{}') for {} at {:?}",
                    spec.clip_index,
                    clip.name,
                    spec.path,
                    model.root.translation
                );
                Asset::Ready(id)
            }
            None => {
                let err = LoadError::ClipOutOfRange {
                    source_path: spec.path.to_string(),
                    index: spec.clip_index,
                    available: data.clips.len(),
                };
                log::error!("[npc] {}", err);
                Asset::Failed(err.to_string())
            }
        };

        Self {
            source: spec.path.to_string(),
            model,
            mixer,
            action,
        }
    }

    #[inline]
    pub fn update(&mut self, dt: f32) {
        self.mixer.update(dt, &mut self.model.pose);
    }
}
