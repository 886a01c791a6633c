//! User interface subsystem - views, menu widget and the dispatcher contract.
//!
//! The application never owns the event loop. A host-side view dispatcher
//! delivers input, custom and tick events one at a time to
//! `App::dispatch`, and the scenes drive the dispatcher back through the
//! [`ViewDispatcher`] trait.
//!
//! ## Components
//!
//! - **Submenu**: list widget with one callback per item
//! - **ViewPort**: in-memory [`ViewDispatcher`] used by the firmware
//! - **Display** (embedded): SSD1306 128×64 OLED via I²C
//! - **Buttons** (embedded): 4 tactile switches with debouncing

#[cfg(feature = "embedded")]
pub mod buttons;
pub mod dispatcher;
#[cfg(feature = "embedded")]
pub mod display;
pub mod input_logic;
pub mod submenu;

pub use dispatcher::ViewPort;
pub use submenu::{MenuCallback, MenuView, Submenu, SubmenuInput};

/// Views the application registers with the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ViewId {
    MainMenu,
}

/// Physical key events (after debouncing).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputKey {
    Up,
    Down,
    Ok,
    Back,
}

/// One unit of work delivered by the host event loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatcherEvent {
    /// Key press routed to the current view first.
    Input(InputKey),
    /// Application-defined event value.
    Custom(u32),
    /// Periodic tick (every `TICK_PERIOD_MS`).
    Tick,
}

/// Navigation side of the host view dispatcher.
pub trait ViewDispatcher {
    fn add_view(&mut self, view: ViewId) -> Result<(), crate::Error>;
    fn remove_view(&mut self, view: ViewId);
    fn switch_to_view(&mut self, view: ViewId);
    fn current_view(&self) -> Option<ViewId>;
    /// Register the period of the tick event.
    fn set_tick_period(&mut self, period_ms: u32);
    /// Connect to the screen; the dispatcher is running from here on.
    fn attach_to_gui(&mut self);
    /// Request the event loop to return.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Blocking source of dispatcher events for hosted event loops.
///
/// `None` means the host has no more events; the loop ends as if stopped.
pub trait EventSource {
    fn next_event(&mut self) -> Option<DispatcherEvent>;
}
