use crate::dom::DomSurface;
use crate::engine::Engine;
use std::cell::RefCell;
use std::rc::Rc;

mod card;
mod pointer;

pub use pointer::{wire_pagehide, wire_pointer_tracking};

/// Engine plus the page surface it writes to; shared by every listener.
pub struct App {
    pub engine: Engine,
    pub surface: DomSurface,
}

pub type SharedApp = Rc<RefCell<App>>;
