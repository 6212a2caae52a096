use crate::constants::MAX_FRAME_DT_MS;
use crate::events::{App, SharedApp};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

const STATS_INTERVAL_MS: f64 = 5000.0;

pub struct FrameContext {
    pub app: SharedApp,
    pub last_instant: Instant,
    pub since_stats_ms: f64,
}

impl FrameContext {
    pub fn new(app: SharedApp) -> Self {
        Self {
            app,
            last_instant: Instant::now(),
            since_stats_ms: 0.0,
        }
    }

    /// Advance the effects by the real frame delta. Returns `false` once the
    /// engine has been disposed and the loop should stop.
    pub fn frame(&mut self) -> bool {
        let now = Instant::now();
        let dt_ms = (now - self.last_instant).as_secs_f64() * 1000.0;
        self.last_instant = now;

        let Ok(mut guard) = self.app.try_borrow_mut() else {
            return true;
        };
        let App { engine, surface } = &mut *guard;
        if engine.is_disposed() {
            return false;
        }
        // clamp so a backgrounded tab does not jump every animation to its end
        engine.tick(surface, dt_ms.min(MAX_FRAME_DT_MS));

        self.since_stats_ms += dt_ms;
        if self.since_stats_ms >= STATS_INTERVAL_MS {
            self.since_stats_ms = 0.0;
            log::debug!("[fx] {:?}", engine.stats());
        }
        true
    }
}

type TickSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn request_frame(tick: &TickSlot) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: TickSlot = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if !frame_ctx.borrow_mut().frame() {
            log::info!("[fx] frame loop stopped");
            return;
        }
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}
