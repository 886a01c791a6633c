//! Unified error type for btcon.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

use core::fmt;

/// Top-level error type used across the application.
///
/// Everything here is a precondition violation: the firmware entry point
/// aborts on any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Scene controller
    /// The handler table does not have exactly one entry per scene.
    InvalidSceneTable { expected: usize, got: usize },

    /// `start` was called on a controller that already left `Idle`.
    AlreadyStarted,

    /// A transition was requested while no scene is active.
    NotRunning,

    /// The scene stack is at `MAX_SCENE_DEPTH`.
    SceneStackFull,

    // Menu widget
    /// The submenu already holds `MAX_MENU_ITEMS` items.
    MenuFull,

    // View dispatcher
    /// The dispatcher cannot register another view.
    ViewTableFull,

    // Bluetooth
    /// Switching to the HID profile failed.
    ProfileStartFailed,

    /// Restoring the default profile failed.
    ProfileRestoreFailed,
}

/// Subset of Bluetooth service errors we propagate (keeps the enum `Copy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// Raw error code from the radio stack.
    Raw(u32),
    /// The stack refused the profile configuration.
    ProfileRejected,
    /// The radio is still advertising or connected.
    NotReady,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSceneTable { expected, got } => {
                write!(f, "scene table has {} entries, expected {}", got, expected)
            }
            Error::AlreadyStarted => write!(f, "scene manager already started"),
            Error::NotRunning => write!(f, "no active scene"),
            Error::SceneStackFull => write!(f, "scene stack full"),
            Error::MenuFull => write!(f, "submenu full"),
            Error::ViewTableFull => write!(f, "view table full"),
            Error::ProfileStartFailed => write!(f, "failed to start HID profile"),
            Error::ProfileRestoreFailed => write!(f, "failed to restore default profile"),
        }
    }
}

impl fmt::Display for BleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BleError::Raw(code) => write!(f, "raw error {:#x}", code),
            BleError::ProfileRejected => write!(f, "profile rejected"),
            BleError::NotReady => write!(f, "stack not ready"),
        }
    }
}
