//! In-memory view dispatcher state.
//!
//! Tracks the registered views, the current view, the tick period and the
//! running flag. The firmware's async loop owns the actual waiting and
//! asks the `ViewPort` whether to keep going.

use crate::config::{MAX_VIEWS, TICK_PERIOD_MS};
use crate::error::Error;
use crate::ui::{ViewDispatcher, ViewId};
use heapless::Vec;

pub struct ViewPort {
    views: Vec<ViewId, MAX_VIEWS>,
    current: Option<ViewId>,
    tick_period_ms: u32,
    attached: bool,
    stopped: bool,
}

impl ViewPort {
    pub const fn new() -> Self {
        Self {
            views: Vec::new(),
            current: None,
            tick_period_ms: TICK_PERIOD_MS,
            attached: false,
            stopped: false,
        }
    }

    pub fn tick_period_ms(&self) -> u32 {
        self.tick_period_ms
    }
}

impl Default for ViewPort {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewDispatcher for ViewPort {
    fn add_view(&mut self, view: ViewId) -> Result<(), Error> {
        if self.views.contains(&view) {
            return Ok(());
        }
        self.views.push(view).map_err(|_| Error::ViewTableFull)
    }

    fn remove_view(&mut self, view: ViewId) {
        self.views.retain(|v| *v != view);
        if self.current == Some(view) {
            self.current = None;
        }
    }

    fn switch_to_view(&mut self, view: ViewId) {
        // Switching to an unregistered view is ignored, like the host GUI.
        if self.views.contains(&view) {
            self.current = Some(view);
        }
    }

    fn current_view(&self) -> Option<ViewId> {
        self.current
    }

    fn set_tick_period(&mut self, period_ms: u32) {
        self.tick_period_ms = period_ms;
    }

    fn attach_to_gui(&mut self) {
        self.attached = true;
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn is_running(&self) -> bool {
        self.attached && !self.stopped
    }
}
