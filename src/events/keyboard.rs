use metro_core::KeyState;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Mirror keydown/keyup `code`s into the shared key map (last event wins).
pub fn wire_key_state(keys: Rc<RefCell<KeyState>>) {
    let Some(window) = web::window() else {
        return;
    };
    for (event, down) in [("keydown", true), ("keyup", false)] {
        let keys = keys.clone();
        let closure =
            wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
                keys.borrow_mut().set(&ev.code(), down);
            }) as Box<dyn FnMut(_)>);
        _ = window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

