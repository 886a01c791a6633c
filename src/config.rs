//! Application-wide constants and compile-time configuration.
//!
//! Timing parameters, capacities, GAP parameters and the per-flavour
//! application identity live here so they can be tuned in one place.
//! Nothing in this crate reads runtime configuration.

use crate::ble::HidProfileParams;

// Application flavours

/// Compile-time identity of one application flavour.
///
/// `btcon` and `flippys` only differ in the advertised name prefix and the
/// log tag; everything else is shared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppVariant {
    /// Tag attached to every log line.
    pub app_name: &'static str,
    /// Name used in lifecycle log lines.
    pub display_name: &'static str,
    /// Replaces "Flipper" in the host's local device name while the HID
    /// profile is advertised.
    pub device_name_prefix: &'static str,
    /// XOR mask applied to the first two bytes of the profile MAC address.
    pub mac_xor: u16,
}

impl AppVariant {
    /// Profile parameters handed to the Bluetooth service.
    pub const fn hid_params(&self) -> HidProfileParams {
        HidProfileParams {
            device_name_prefix: self.device_name_prefix,
            mac_xor: self.mac_xor,
        }
    }
}

pub const BTCON: AppVariant = AppVariant {
    app_name: "btcon",
    display_name: "BtconApp",
    device_name_prefix: "Btcon",
    mac_xor: 0x13,
};

pub const FLIPPYS: AppVariant = AppVariant {
    app_name: "flippys",
    display_name: "FlippysApp",
    device_name_prefix: "Flippys",
    mac_xor: 0x13,
};

/// Flavour selected by the `flippys` cargo feature (default: btcon).
#[cfg(not(feature = "flippys"))]
pub const ACTIVE_VARIANT: &AppVariant = &BTCON;
#[cfg(feature = "flippys")]
pub const ACTIVE_VARIANT: &AppVariant = &FLIPPYS;

// Event loop

/// Period of the tick event delivered by the view dispatcher (ms).
pub const TICK_PERIOD_MS: u32 = 100;

/// Time given to the radio core to settle after a disconnect before the
/// profile is switched (ms).
pub const BT_SETTLE_DELAY_MS: u32 = 250;

// Scenes & menu

/// Upper bound on the number of distinct scenes an application can register.
pub const MAX_SCENES: usize = 8;

/// Maximum navigation depth of the scene stack.
pub const MAX_SCENE_DEPTH: usize = 8;

/// Maximum number of items a submenu can hold.
pub const MAX_MENU_ITEMS: usize = 8;

/// Menu item labels are truncated to this many bytes.
pub const MENU_LABEL_LEN: usize = 32;

/// Maximum number of views registered with the dispatcher.
pub const MAX_VIEWS: usize = 4;

// BLE HID profile (GAP)

/// Advertised name buffer of the host GAP layer, including AD type and
/// terminator. The usable name is two bytes shorter.
pub const GAP_ADV_NAME_BUF_LEN: usize = 18;

/// Longest advertised name we emit (bytes).
pub const GAP_ADV_NAME_MAX: usize = GAP_ADV_NAME_BUF_LEN - 2;

/// Name prefix used when a HID profile is started without parameters.
pub const GAP_DEFAULT_NAME_PREFIX: &str = "Control";

/// Word in the host's local device name that the prefix replaces.
pub const GAP_HOST_NAME_WORD: &str = "Flipper";

/// Connection interval range requested by the HID profile
/// (in 1.25 ms units): 30 ms .. 45 ms.
pub const GAP_CONN_INTERVAL_MIN: u16 = 0x18;
pub const GAP_CONN_INTERVAL_MAX: u16 = 0x24;

/// Slave latency requested by the HID profile.
pub const GAP_SLAVE_LATENCY: u16 = 0;

/// Supervision timeout requested by the HID profile (0 = stack default).
pub const GAP_SUP_TIMEOUT: u16 = 0;

/// Local name of the device under its default profile.
pub const HOST_LOCAL_NAME: &str = "Flipper Handheld";

/// Advertising interval (in 0.625 ms units). 80 = 50 ms.
pub const GAP_ADV_INTERVAL: u32 = 80;

/// Bonds kept in RAM; the oldest is evicted when a new host pairs.
pub const MAX_BONDS: usize = 4;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button UP      → P0.11
//   Button DOWN    → P0.12
//   Button OK      → P0.24
//   Button BACK    → P0.25
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27
//   Status LED     → P0.06

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;
