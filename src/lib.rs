#![cfg(target_arch = "wasm32")]
use instant::Instant;
use metro_core::{KeyState, SceneContext, SceneParams};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod draws;
mod events;
mod frame;
mod loader;
mod render;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("metro-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas = dom::get_or_create_canvas(&document, constants::CANVAS_ID)?;
    let (width, height) = dom::size_canvas_to_window(&canvas);
    let aspect = width as f32 / height.max(1) as f32;

    let scene = Rc::new(RefCell::new(SceneContext::new(
        aspect,
        SceneParams::default(),
        rand::random::<u64>(),
    )));
    let keys = Rc::new(RefCell::new(KeyState::new()));

    loader::spawn_scene_loads(scene.clone());
    events::keyboard::wire_key_state(keys.clone());

    match audio::BackgroundMusic::new() {
        Ok(music) => {
            music.spawn_load();
            events::pointer::wire_music_unlock(&document, music);
        }
        Err(e) => log::error!("[audio] AudioContext error: {:?}", e),
    }

    // Rendering stays off if WebGPU is unavailable; the update loop still runs
    let displacement = scene.borrow_mut().displacement_map();
    let gpu = frame::init_gpu(&canvas, &displacement).await;

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        scene,
        keys,
        gpu,
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
