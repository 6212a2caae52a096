use super::{App, SharedApp};
use crate::dom::{CardBinding, CardListener, DomSurface};
use crate::engine::Engine;
use crate::timeline::CardId;
use glam::Vec2;
use wasm_bindgen::closure::Closure;
use web_sys as web;

#[inline]
pub fn client_point(ev: &web::MouseEvent) -> Vec2 {
    Vec2::new(ev.client_x() as f32, ev.client_y() as f32)
}

fn listener(
    app: &SharedApp,
    mut handler: impl FnMut(&mut Engine, &mut DomSurface, web::MouseEvent) + 'static,
) -> CardListener {
    let app = app.clone();
    Closure::wrap(Box::new(move |ev: web::MouseEvent| {
        let Ok(mut guard) = app.try_borrow_mut() else {
            log::warn!("[hover] event dropped, effects busy");
            return;
        };
        let App { engine, surface } = &mut *guard;
        handler(engine, surface, ev);
    }) as Box<dyn FnMut(_)>)
}

/// Attach hover/move/click listeners to newly discovered cards.
pub fn bind_cards(
    app: &SharedApp,
    surface: &mut DomSurface,
    fresh: Vec<(CardId, web::HtmlElement)>,
) {
    for (id, element) in fresh {
        let mut binding = CardBinding::new(element);
        binding.listen(
            "mouseenter",
            listener(app, move |engine, _, _| engine.card_entered(id)),
        );
        binding.listen(
            "mouseleave",
            listener(app, move |engine, _, _| engine.card_left(id)),
        );
        binding.listen(
            "mousemove",
            listener(app, move |engine, surface, ev| {
                engine.card_pointer_moved(&*surface, id, client_point(&ev))
            }),
        );
        binding.listen(
            "click",
            listener(app, move |engine, surface, ev| {
                if let Some(el) = engine.card_clicked(surface, id, client_point(&ev)) {
                    log::debug!("[click] ripple {:?} on card {:?}", el, id);
                }
            }),
        );
        surface.bind(id, binding);
    }
}
