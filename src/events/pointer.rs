use super::card::{bind_cards, client_point};
use super::{App, SharedApp};
use crate::surface::Surface;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn wire_pointer_tracking(app: &SharedApp, document: &web::Document) {
    wire_mousemove(app, document);
    wire_region_leave(app, document);
}

fn wire_mousemove(app: &SharedApp, document: &web::Document) {
    let app_move = app.clone();

    let closure = Closure::wrap(Box::new(move |ev: web::MouseEvent| {
        let pointer = client_point(&ev);
        let Ok(mut guard) = app_move.try_borrow_mut() else {
            return;
        };
        let App { engine, surface } = &mut *guard;
        if engine.is_disposed() {
            return;
        }

        let (cards, fresh) = surface.scan_cards();
        let fresh_ids: Vec<_> = fresh.iter().map(|(id, _)| *id).collect();
        if !fresh.is_empty() {
            log::debug!("[cards] bound {} new cards ({} total)", fresh.len(), cards.len());
            bind_cards(&app_move, surface, fresh);
        }
        engine.sync_cards(surface, &cards);

        // mouseenter never fires for a card that was already under the
        // pointer when its listeners were attached
        for id in fresh_ids {
            if surface.card_rect(id).is_ok_and(|r| r.contains(pointer)) {
                engine.card_entered(id);
            }
        }

        if surface.region_contains(pointer) {
            engine.pointer_moved(surface, &cards, pointer);
        } else if engine.inside_region() {
            engine.pointer_left_region(surface, &cards);
        }
    }) as Box<dyn FnMut(_)>);

    _ = document.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
    closure.forget();
}

// Leaving the window skips any move event near the region edge, so the
// exit path is wired on its own.
fn wire_region_leave(app: &SharedApp, document: &web::Document) {
    let Some(root) = document.document_element() else {
        return;
    };
    let app_leave = app.clone();

    let closure = Closure::wrap(Box::new(move |_ev: web::MouseEvent| {
        let Ok(mut guard) = app_leave.try_borrow_mut() else {
            return;
        };
        let App { engine, surface } = &mut *guard;
        if !engine.inside_region() {
            return;
        }
        let cards = surface.card_ids();
        engine.pointer_left_region(surface, &cards);
    }) as Box<dyn FnMut(_)>);

    _ = root.add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn wire_pagehide(app: &SharedApp) {
    let Some(window) = web::window() else {
        return;
    };
    let app_hide = app.clone();

    let closure = Closure::wrap(Box::new(move |ev: web::PageTransitionEvent| {
        let Ok(mut guard) = app_hide.try_borrow_mut() else {
            return;
        };
        let App { engine, surface } = &mut *guard;
        // persisted: the page goes into the back/forward cache and may be
        // shown again, so only quiet it down
        if ev.persisted() {
            let cards = surface.card_ids();
            engine.suspend(surface, &cards);
            return;
        }
        engine.dispose(surface);
        surface.dispose();
    }) as Box<dyn FnMut(_)>);

    _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
    closure.forget();
}
