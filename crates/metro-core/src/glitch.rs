//! Glitch post-processing: when it runs, and what it draws.
//!
//! [`GlitchScheduler`] opens a fixed-length window once the interval since the
//! previous activation has elapsed. [`GlitchEffect`] produces the randomized
//! per-frame shader parameters of a digital glitch while the pass is enabled.

use crate::constants::{
    GLITCH_COLUMN_SIZE, GLITCH_DURATION_MS, GLITCH_INTERVAL_MS, GLITCH_TRIGGER_MAX,
    GLITCH_TRIGGER_MIN,
};
use rand::prelude::*;
use std::f32::consts::PI;

#[derive(Clone, Debug)]
pub struct GlitchScheduler {
    last_activation_ms: f64,
    interval_ms: f64,
    duration_ms: f64,
    active: bool,
    go_wild: bool,
}

impl Default for GlitchScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl GlitchScheduler {
    /// Starts idle with a zero interval, so the first update arms a window.
    pub fn new() -> Self {
        Self {
            last_activation_ms: 0.0,
            interval_ms: 0.0,
            duration_ms: 0.0,
            active: false,
            go_wild: false,
        }
    }

    /// Advance to wall-clock `now_ms`; returns whether the glitch pass is on.
    ///
    /// The pass is on iff `now_ms` lies in `[activation, activation + duration)`.
    pub fn update(&mut self, now_ms: f64) -> bool {
        if self.active && now_ms - self.last_activation_ms >= self.duration_ms {
            self.active = false;
            self.go_wild = false;
        }
        if !self.active && now_ms - self.last_activation_ms > self.interval_ms {
            self.interval_ms = GLITCH_INTERVAL_MS;
            self.duration_ms = GLITCH_DURATION_MS;
            self.last_activation_ms = now_ms;
            self.active = true;
            self.go_wild = true;
            log::debug!("[glitch] window armed at {now_ms:.0}ms");
        }
        self.active
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn go_wild(&self) -> bool {
        self.go_wild
    }

    #[inline]
    pub fn last_activation_ms(&self) -> f64 {
        self.last_activation_ms
    }

    #[inline]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    #[inline]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }
}

/// Shader parameters for one glitch frame (layout shared with WGSL).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlitchUniforms {
    pub amount: f32,
    pub angle: f32,
    pub seed: f32,
    pub seed_x: f32,
    pub seed_y: f32,
    pub distortion_x: f32,
    pub distortion_y: f32,
    pub col_s: f32,
    pub byp: u32,
    pub _pad: [u32; 3],
}

pub struct GlitchEffect {
    rng: StdRng,
    frame: u32,
    trigger: u32,
}

impl GlitchEffect {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let trigger = rng.gen_range(GLITCH_TRIGGER_MIN..=GLITCH_TRIGGER_MAX);
        Self {
            rng,
            frame: 0,
            trigger,
        }
    }

    /// Parameters for the next frame the pass is drawn.
    pub fn next_frame(&mut self, go_wild: bool) -> GlitchUniforms {
        let mut u = GlitchUniforms {
            seed: self.rng.gen::<f32>(),
            col_s: GLITCH_COLUMN_SIZE,
            ..Default::default()
        };
        if self.frame % self.trigger == 0 || go_wild {
            u.amount = self.rng.gen::<f32>() / 30.0;
            u.angle = self.rng.gen_range(-PI..PI);
            u.seed_x = self.rng.gen_range(-1.0..1.0);
            u.seed_y = self.rng.gen_range(-1.0..1.0);
            u.distortion_x = self.rng.gen_range(0.0..1.0);
            u.distortion_y = self.rng.gen_range(0.0..1.0);
            self.frame = 0;
            self.trigger = self.rng.gen_range(GLITCH_TRIGGER_MIN..=GLITCH_TRIGGER_MAX);
        } else if self.frame % self.trigger < self.trigger / 5 {
            u.amount = self.rng.gen::<f32>() / 90.0;
            u.angle = self.rng.gen_range(-PI..PI);
            u.distortion_x = self.rng.gen_range(0.0..1.0);
            u.distortion_y = self.rng.gen_range(0.0..1.0);
            u.seed_x = self.rng.gen_range(-0.3..0.3);
            u.seed_y = self.rng.gen_range(-0.3..0.3);
        } else {
            u.byp = 1;
        }
        self.frame += 1;
        u
    }

    /// Random single-channel displacement map as RGBA8 (red only).
    pub fn displacement_map(&mut self, size: u32) -> Vec<u8> {
        let n = (size * size) as usize;
        let mut data = Vec::with_capacity(n * 4);
        for _ in 0..n {
            data.extend_from_slice(&[self.rng.gen::<u8>(), 0, 0, 255]);
        }
        data
    }
}
