#![cfg(target_arch = "wasm32")]
use crate::constants::DEFAULT_REGION_SELECTOR;
use crate::engine::Engine;
use crate::events::App;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

mod config;
mod constants;
mod dom;
mod engine;
mod events;
mod frame;
mod geometry;
mod particles;
mod ripple;
mod spotlight;
mod surface;
mod tilt;
mod timeline;

// Resolves once the document has finished parsing, so the result grid and
// its region element can be queried.
async fn dom_ready(document: &web::Document) -> anyhow::Result<()> {
    if document.ready_state() != "loading" {
        return Ok(());
    }
    let doc = document.clone();
    let promise = js_sys::Promise::new(&mut |resolve: js_sys::Function, _reject: js_sys::Function| {
        let on_ready = Closure::once_into_js(move || {
            _ = resolve.call0(&JsValue::NULL);
        });
        _ = doc.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref());
    });
    JsFuture::from(promise)
        .await
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("lookup-fx starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    dom_ready(&document).await?;

    // One engine per page, even if the module is started twice
    static STARTED: AtomicBool = AtomicBool::new(false);
    if STARTED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let region = document
        .query_selector(DEFAULT_REGION_SELECTOR)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let params = dom::read_params(region.as_ref());
    let surface = dom::DomSurface::new(document.clone(), &params)?;
    let seed = js_sys::Math::random().to_bits();
    let engine = Engine::new(params, seed);

    let app = Rc::new(RefCell::new(App { engine, surface }));
    events::wire_pointer_tracking(&app, &document);
    events::wire_pagehide(&app);

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext::new(app)));
    frame::start_loop(frame_ctx);
    Ok(())
}
