//! Asset fetch and install.
//!
//! Every file is fetched by its own `spawn_local` future; results land in the
//! shared scene whenever they arrive, in any order.

use crate::constants::{ENVIRONMENT_PATH, PLAYER_PATH};
use metro_core::{LoadError, ModelData, NpcSpec, SceneContext, NPCS};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

/// GET `path` and return the body bytes. Non-2xx responses are errors.
pub async fn fetch_bytes(path: &str) -> anyhow::Result<Vec<u8>> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let resp: web::Response = JsFuture::from(window.fetch_with_str(path))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;
    if !resp.ok() {
        anyhow::bail!("HTTP {} {}", resp.status(), resp.status_text());
    }
    let buf = JsFuture::from(resp.array_buffer().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

pub async fn load_model(path: &str) -> Result<ModelData, LoadError> {
    let bytes = fetch_bytes(path).await.map_err(|e| LoadError::Fetch {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    ModelData::from_bytes(&bytes)
}

/// Kick off the environment, player and passenger loads.
pub fn spawn_scene_loads(scene: Rc<RefCell<SceneContext>>) {
    {
        let scene = scene.clone();
        spawn_local(async move {
            let result = load_model(ENVIRONMENT_PATH).await;
            scene.borrow_mut().install_environment(result);
        });
    }
    {
        let scene = scene.clone();
        spawn_local(async move {
            let result = load_model(PLAYER_PATH).await;
            scene.borrow_mut().install_player(result);
        });
    }
    for spec in NPCS {
        spawn_npc(scene.clone(), spec);
    }
}

fn spawn_npc(scene: Rc<RefCell<SceneContext>>, spec: NpcSpec) {
    spawn_local(async move {
        let result = load_model(spec.path).await;
        scene.borrow_mut().install_npc(&spec, result);
    });
}
