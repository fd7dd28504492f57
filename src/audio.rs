//! Looping background track, unlocked by the first pointer press.

use crate::constants::MUSIC_BASE;
use crate::loader;
use metro_core::music::{negotiate_format, track_path};
use metro_core::{MusicGate, MUSIC_FORMATS};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

pub struct BackgroundMusic {
    ctx: web::AudioContext,
    buffer: RefCell<Option<web::AudioBuffer>>,
    gate: RefCell<MusicGate>,
}

impl BackgroundMusic {
    pub fn new() -> anyhow::Result<Rc<Self>> {
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(Rc::new(Self {
            ctx,
            buffer: RefCell::new(None),
            gate: RefCell::new(MusicGate::new()),
        }))
    }

    /// Pick a container the browser can play, then fetch and decode it.
    pub fn spawn_load(self: &Rc<Self>) {
        let probe = match web::HtmlAudioElement::new() {
            Ok(a) => a,
            Err(e) => {
                log::error!("[audio] HtmlAudioElement error: {:?}", e);
                return;
            }
        };
        let Some(format) = negotiate_format(&MUSIC_FORMATS, |mime| probe.can_play_type(mime))
        else {
            log::warn!("[audio] no supported format for {}", MUSIC_BASE);
            return;
        };
        let path = track_path(MUSIC_BASE, format);
        let this = self.clone();
        spawn_local(async move {
            match this.decode(&path).await {
                Ok(buffer) => {
                    log::info!(
                        "[audio] decoded {} ({:.1}s)",
                        path,
                        buffer.duration()
                    );
                    *this.buffer.borrow_mut() = Some(buffer);
                    this.gate.borrow_mut().mark_ready();
                    this.try_start();
                }
                Err(e) => log::error!("[audio] failed to load {}: {:?}", path, e),
            }
        });
    }

    async fn decode(&self, path: &str) -> anyhow::Result<web::AudioBuffer> {
        let bytes = loader::fetch_bytes(path).await?;
        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let promise = self
            .ctx
            .decode_audio_data(&array.buffer())
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        JsFuture::from(promise)
            .await
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .dyn_into::<web::AudioBuffer>()
            .map_err(|e| anyhow::anyhow!("{:?}", e))
    }

    /// Pointer press handler. Only the first press has any effect.
    pub fn on_press(&self) {
        if !self.gate.borrow_mut().press() {
            return;
        }
        _ = self.ctx.resume();
        self.try_start();
    }

    fn try_start(&self) {
        if !self.gate.borrow_mut().take_start() {
            return;
        }
        let buffer = self.buffer.borrow();
        let Some(buffer) = buffer.as_ref() else {
            return;
        };
        match self.start_loop(buffer) {
            Ok(()) => log::info!("[audio] background music started"),
            Err(e) => log::error!("[audio] playback error: {:?}", e),
        }
    }

    fn start_loop(&self, buffer: &web::AudioBuffer) -> anyhow::Result<()> {
        let source = self
            .ctx
            .create_buffer_source()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        source.set_buffer(Some(buffer));
        source.set_loop(true);
        source
            .connect_with_audio_node(&self.ctx.destination())
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        source.start().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(())
    }
}
