use crate::audio::BackgroundMusic;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Any pointer press on the page unlocks the background track.
pub fn wire_music_unlock(document: &web::Document, music: Rc<BackgroundMusic>) {
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
        music.on_press();
    }) as Box<dyn FnMut(_)>);
    _ = document.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}
