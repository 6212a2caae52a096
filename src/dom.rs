use crate::config::FxParams;
use crate::constants::*;
use crate::geometry::{GlowVars, ProbeError, Rect};
use crate::surface::{Decoration, Surface};
use crate::timeline::{CardId, ElementId, Style, Target};
use fnv::{FnvHashMap, FnvHashSet};
use glam::Vec2;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn viewport_width() -> Option<f64> {
    web::window().and_then(|w| w.inner_width().ok()).and_then(|v| v.as_f64())
}

/// Read `data-fx-*` overrides from the region element.
pub fn read_params(region: Option<&web::Element>) -> FxParams {
    let mut params = FxParams::default();
    if let Some(el) = region {
        let pairs: Vec<(&str, String)> = FxParams::KEYS
            .iter()
            .filter_map(|key| {
                el.get_attribute(&format!("data-fx-{}", key))
                    .map(|v| (*key, v))
            })
            .collect();
        let (parsed, errors) =
            params.with_overrides(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        for e in errors {
            log::warn!("[config] {}", e);
        }
        params = parsed;
    }
    // Decided once at start-up; resizing across the breakpoint later keeps
    // whichever mode the page loaded in.
    if viewport_width().is_some_and(|w| w <= MOBILE_BREAKPOINT_PX) {
        params.disable_animations = true;
        log::info!("[config] narrow viewport, motion effects off");
    }
    params
}

fn set_props(el: &web::HtmlElement, props: &[(&str, String)]) {
    let style = el.style();
    for (name, value) in props {
        _ = style.set_property(name, value);
    }
}

pub type CardListener = Closure<dyn FnMut(web::MouseEvent)>;

/// A card element plus the listeners the effects attached to it.
/// Dropping the binding detaches the listeners.
pub struct CardBinding {
    element: web::HtmlElement,
    listeners: Vec<(&'static str, CardListener)>,
}

impl CardBinding {
    pub fn new(element: web::HtmlElement) -> Self {
        Self {
            element,
            listeners: Vec::new(),
        }
    }

    pub fn listen(&mut self, event: &'static str, listener: CardListener) {
        _ = self
            .element
            .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
        self.listeners.push((event, listener));
    }
}

impl Drop for CardBinding {
    fn drop(&mut self) {
        for (event, listener) in &self.listeners {
            _ = self
                .element
                .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
        }
    }
}

/// Browser-backed [`Surface`].
pub struct DomSurface {
    document: web::Document,
    region: Option<web::Element>,
    card_selector: String,
    region_selector: String,
    cards: FnvHashMap<CardId, CardBinding>,
    elements: FnvHashMap<ElementId, web::HtmlElement>,
    spotlight: Option<web::HtmlElement>,
    next_card: u32,
}

impl DomSurface {
    pub fn new(document: web::Document, params: &FxParams) -> anyhow::Result<Self> {
        let region = document
            .query_selector(&params.region_selector)
            .map_err(|e| anyhow::anyhow!("bad region selector: {:?}", e))?;
        if region.is_none() {
            log::warn!(
                "[fx] region {} not found, tracking the whole page",
                params.region_selector
            );
        }
        let spotlight = if params.spotlight_active() {
            Some(create_spotlight(&document, &params.glow_color)?)
        } else {
            None
        };
        Ok(Self {
            document,
            region,
            card_selector: params.card_selector.clone(),
            region_selector: params.region_selector.clone(),
            cards: FnvHashMap::default(),
            elements: FnvHashMap::default(),
            spotlight,
            next_card: 1,
        })
    }

    /// Whether a client-space point is inside the tracked region.
    pub fn region_contains(&mut self, p: Vec2) -> bool {
        if !self.region.as_ref().is_some_and(|r| r.is_connected()) {
            self.region = self
                .document
                .query_selector(&self.region_selector)
                .ok()
                .flatten();
        }
        match &self.region {
            Some(region) => dom_rect(&region.get_bounding_client_rect()).contains(p),
            None => true,
        }
    }

    /// Re-query the card set. Returns every current card and the ones seen
    /// for the first time, which still need listeners.
    pub fn scan_cards(&mut self) -> (Vec<CardId>, Vec<(CardId, web::HtmlElement)>) {
        let mut present = Vec::new();
        let mut fresh = Vec::new();
        let Ok(list) = self.document.query_selector_all(&self.card_selector) else {
            return (present, fresh);
        };
        for i in 0..list.length() {
            let Some(el) = list
                .item(i)
                .and_then(|n| n.dyn_into::<web::HtmlElement>().ok())
            else {
                continue;
            };
            let known = el
                .get_attribute(CARD_ID_ATTR)
                .and_then(|v| v.parse::<u32>().ok())
                .map(CardId)
                .filter(|id| self.cards.contains_key(id));
            match known {
                Some(id) => present.push(id),
                None => {
                    let id = CardId(self.next_card);
                    self.next_card += 1;
                    _ = el.set_attribute(CARD_ID_ATTR, &id.0.to_string());
                    present.push(id);
                    fresh.push((id, el));
                }
            }
        }
        // bindings of cards that left the page
        let live: FnvHashSet<CardId> = present.iter().copied().collect();
        self.cards.retain(|id, _| live.contains(id));
        (present, fresh)
    }

    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.keys().copied().collect()
    }

    pub fn bind(&mut self, id: CardId, binding: CardBinding) {
        self.cards.insert(id, binding);
    }

    pub fn dispose(&mut self) {
        for (_, el) in self.elements.drain() {
            el.remove();
        }
        self.cards.clear();
        if let Some(spot) = self.spotlight.take() {
            spot.remove();
        }
    }
}

fn dom_rect(r: &web::DomRect) -> Rect {
    Rect::new(
        r.left() as f32,
        r.top() as f32,
        r.width() as f32,
        r.height() as f32,
    )
}

fn create_div(document: &web::Document, class: &str) -> anyhow::Result<web::HtmlElement> {
    let el = document
        .create_element("div")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .dyn_into::<web::HtmlElement>()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    el.set_class_name(class);
    Ok(el)
}

fn create_spotlight(document: &web::Document, color: &str) -> anyhow::Result<web::HtmlElement> {
    let el = create_div(document, "fx-spotlight")?;
    let size = SPOTLIGHT_SIZE_PX;
    _ = el.set_attribute(
        "style",
        &format!(
            "position:fixed;left:0;top:0;width:{size}px;height:{size}px;border-radius:50%;\
             pointer-events:none;z-index:200;opacity:0;transform:translate(-50%,-50%);\
             mix-blend-mode:screen;background:radial-gradient(circle,\
             rgba({c},0.15) 0%,rgba({c},0.08) 15%,rgba({c},0.04) 25%,\
             rgba({c},0.02) 40%,rgba({c},0.01) 65%,transparent 70%);",
            size = size,
            c = color
        ),
    );
    let body = document
        .body()
        .ok_or_else(|| anyhow::anyhow!("no document body"))?;
    body.append_child(&el)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(el)
}

impl Surface for DomSurface {
    fn card_rect(&self, card: CardId) -> Result<Rect, ProbeError> {
        match self.cards.get(&card) {
            Some(b) if b.element.is_connected() => {
                Ok(dom_rect(&b.element.get_bounding_client_rect()))
            }
            _ => Err(ProbeError::Detached),
        }
    }

    fn write_glow(&mut self, card: CardId, glow: &GlowVars) {
        if let Some(b) = self.cards.get(&card) {
            set_props(
                &b.element,
                &[
                    ("--glow-x", format!("{:.2}%", glow.x_pct)),
                    ("--glow-y", format!("{:.2}%", glow.y_pct)),
                    ("--glow-intensity", format!("{:.3}", glow.intensity)),
                    ("--glow-radius", format!("{}px", glow.radius_px)),
                ],
            );
        }
    }

    fn mount(&mut self, element: ElementId, decoration: &Decoration<'_>) -> bool {
        let Some(card) = self
            .cards
            .get(&decoration.card())
            .filter(|b| b.element.is_connected())
        else {
            return false;
        };
        let (class, css) = match *decoration {
            Decoration::Particle {
                at, size, color, ..
            } => (
                "fx-particle",
                format!(
                    "position:absolute;left:{:.1}px;top:{:.1}px;width:{s}px;height:{s}px;\
                     border-radius:50%;background:rgba({c},1);box-shadow:0 0 6px rgba({c},0.6);\
                     pointer-events:none;z-index:100;opacity:0;",
                    at.x,
                    at.y,
                    s = size,
                    c = color
                ),
            ),
            Decoration::Ripple {
                center,
                diameter,
                color,
                ..
            } => (
                "fx-ripple",
                format!(
                    "position:absolute;left:{:.1}px;top:{:.1}px;width:{d:.1}px;height:{d:.1}px;\
                     border-radius:50%;pointer-events:none;z-index:1000;transform:scale(0);\
                     background:radial-gradient(circle,rgba({c},0.4) 0%,rgba({c},0.2) 30%,transparent 70%);",
                    center.x - diameter * 0.5,
                    center.y - diameter * 0.5,
                    d = diameter,
                    c = color
                ),
            ),
        };
        let el = match create_div(&self.document, class) {
            Ok(el) => el,
            Err(e) => {
                log::warn!("[fx] could not create {}: {}", class, e);
                return false;
            }
        };
        _ = el.set_attribute("style", &css);
        if card.element.append_child(&el).is_err() {
            return false;
        }
        self.elements.insert(element, el);
        true
    }

    fn apply_style(&mut self, target: Target, style: &Style) {
        match target {
            Target::Card(card) => {
                if let Some(b) = self.cards.get(&card) {
                    set_props(
                        &b.element,
                        &[(
                            "transform",
                            format!(
                                "perspective({}px) translate({:.2}px, {:.2}px) rotateX({:.2}deg) rotateY({:.2}deg)",
                                TILT_PERSPECTIVE_PX, style.x, style.y, style.rotate_x, style.rotate_y
                            ),
                        )],
                    );
                }
            }
            Target::Element(id) => {
                if let Some(el) = self.elements.get(&id) {
                    set_props(
                        el,
                        &[
                            (
                                "transform",
                                format!(
                                    "translate({:.2}px, {:.2}px) rotate({:.1}deg) scale({:.3})",
                                    style.x, style.y, style.rotation, style.scale
                                ),
                            ),
                            ("opacity", format!("{:.3}", style.opacity)),
                        ],
                    );
                }
            }
            Target::Spotlight => {
                if let Some(el) = &self.spotlight {
                    set_props(
                        el,
                        &[
                            ("left", format!("{:.1}px", style.x)),
                            ("top", format!("{:.1}px", style.y)),
                            ("opacity", format!("{:.3}", style.opacity)),
                        ],
                    );
                }
            }
        }
    }

    fn unmount(&mut self, element: ElementId) {
        if let Some(el) = self.elements.remove(&element) {
            el.remove();
        }
    }
}
