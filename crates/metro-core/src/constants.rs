use glam::Vec3;

// Shared scene tuning constants used by the update loop and the web frontend.

// Player movement
pub const MOVE_COMPONENT: f32 = 0.1; // per-axis direction magnitude for a held key
pub const WALK_STEP: f32 = 0.01; // local +Z translation per moving frame
pub const RUN_EXTRA_STEP: f32 = 0.02; // additional translation per running frame
pub const RUN_DIRECTION_SCALE: f32 = 2.0;

// Carriage sway applied to the player (wall-clock driven)
pub const SWAY_TIME_SCALE: f64 = 0.001; // ms -> s
pub const SWAY_FREQ_Y: f64 = 4.0;
pub const SWAY_FREQ_X: f64 = 3.0;
pub const SWAY_AMPLITUDE: f32 = 0.02;

// Platforms scrolling past the carriage
pub const PLATFORM_NAMES: [&str; 2] = [
    "SM_MERGED_Floor_Platform_01",
    "SM_MERGED_Floor_Platform_01001",
];
pub const PLATFORM_SPEED: f32 = 30.0; // units per second along -Z
pub const PLATFORM_WRAP_BELOW: f32 = -10.0;
pub const PLATFORM_RESET_Z: f32 = 10.0;

// Glitch windows (milliseconds)
pub const GLITCH_INTERVAL_MS: f64 = 60_000.0;
pub const GLITCH_DURATION_MS: f64 = 3_000.0;
pub const GLITCH_COLUMN_SIZE: f32 = 0.05;
pub const GLITCH_TRIGGER_MIN: u32 = 120;
pub const GLITCH_TRIGGER_MAX: u32 = 240;
pub const GLITCH_DISPLACEMENT_SIZE: u32 = 64;

// Orthographic follow camera
pub const CAMERA_OFFSET: Vec3 = Vec3::new(10.0, 10.0, 10.0);
pub const FRUSTUM_SIZE: f32 = 10.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

// Lighting (0xCCCC66 for both lights)
pub const LIGHT_COLOR: [f32; 3] = [0.8, 0.8, 0.4];
pub const AMBIENT_INTENSITY: f32 = 0.5;
pub const DIRECTIONAL_INTENSITY: f32 = 8.0;
pub const DIRECTIONAL_POSITION: Vec3 = Vec3::new(1.0, 1.0, 1.0);

// Model placement
pub const ENVIRONMENT_SCALE: Vec3 = Vec3::new(3.0, 1.5, 3.0); // wider carriage
pub const CHARACTER_SCALE: f32 = 1.35;

// Player clip slots inside player.glb
pub const PLAYER_IDLE_CLIP: usize = 0;
pub const PLAYER_WALK_CLIP: usize = 1;
pub const PLAYER_RUN_CLIP: usize = 2;

/// Static description of one passenger placed in the carriage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NpcSpec {
    pub path: &'static str,
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub clip_index: usize,
}

const NPC_SCALE: [f32; 3] = [CHARACTER_SCALE, CHARACTER_SCALE, CHARACTER_SCALE];

pub const NPCS: [NpcSpec; 9] = [
    NpcSpec { path: "npc1.glb", position: [-2.3, 0.5, 6.0], scale: NPC_SCALE, clip_index: 2 },
    NpcSpec { path: "npc2.glb", position: [-2.3, 0.5, 4.7], scale: NPC_SCALE, clip_index: 0 },
    NpcSpec { path: "npc3.glb", position: [-8.8, 0.5, 1.0], scale: NPC_SCALE, clip_index: 1 },
    NpcSpec { path: "npc4.glb", position: [0.0, 0.0, -2.0], scale: NPC_SCALE, clip_index: 4 },
    NpcSpec { path: "npc5.glb", position: [0.0, 0.0, -1.0], scale: NPC_SCALE, clip_index: 4 },
    NpcSpec { path: "npc6.glb", position: [-1.0, 0.0, 8.0], scale: NPC_SCALE, clip_index: 7 },
    NpcSpec { path: "npc7.glb", position: [-0.3, 0.0, 3.0], scale: NPC_SCALE, clip_index: 8 },
    NpcSpec { path: "npc8.glb", position: [-2.5, 0.0, 0.0], scale: NPC_SCALE, clip_index: 5 },
    NpcSpec { path: "npc9.glb", position: [-2.1, 0.5, -3.0], scale: NPC_SCALE, clip_index: 6 },
];

#[inline]
pub fn light_color_vec3() -> Vec3 {
    Vec3::new(LIGHT_COLOR[0], LIGHT_COLOR[1], LIGHT_COLOR[2])
}
