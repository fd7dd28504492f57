/// Front-end constants: DOM ids, asset locations and renderer capacity.
///
/// Scene tuning (movement, glitch timing, camera, lights) lives in the core
/// crate; this module only holds what the browser glue needs.
// Canvas created (or reused) at startup
pub const CANVAS_ID: &str = "app-canvas";

// Assets, relative to the page
pub const ENVIRONMENT_PATH: &str = "scene.glb";
pub const PLAYER_PATH: &str = "player.glb";
pub const MUSIC_BASE: &str = "endleSSStation"; // extension picked at runtime

// Scene pass clear color (linear RGBA)
pub const CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

// Per-draw uniforms live in one dynamic-offset buffer
pub const MAX_DRAWS: usize = 1024;
pub const DRAW_UNIFORM_STRIDE: u64 = 256; // minUniformBufferOffsetAlignment
pub const DRAW_UNIFORM_SIZE: u64 = 160; // model + normal + color + flags

// Joint palette capacity per skin
pub const MAX_JOINTS: usize = 256;
