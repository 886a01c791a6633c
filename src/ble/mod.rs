//! Bluetooth Low Energy subsystem.
//!
//! The application needs a handful of things from the radio: drop the
//! current link, forget old bonds, switch to the HID emulation profile,
//! advertise, and put the default profile back. Those are the
//! [`BtService`] contract, plus an optional link-status callback.
//!
//! 1. **GAP** - derives the advertised name, MAC and connection
//!    parameters of the HID profile from the host identity.
//! 2. **Advertising data** - builds and inspects the legacy 31-byte payload.
//! 3. **SoftDevice binding** (embedded) - S140 peripheral implementation
//!    of [`BtService`] plus the GATT HID service table.

pub mod adv_data;
pub mod gap;
#[cfg(feature = "embedded")]
pub mod hid_service;
#[cfg(feature = "embedded")]
pub mod softdevice;

use crate::error::BleError;

/// Parameters of the HID emulation profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidProfileParams {
    /// Replaces "Flipper" in the host's advertised name.
    pub device_name_prefix: &'static str,
    /// XOR mask applied to the profile MAC (low byte → byte 0, high → byte 1).
    pub mac_xor: u16,
}

/// Link state as reported by the Bluetooth service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BtStatus {
    Idle,
    Advertising,
    Connected,
}

/// Called by the Bluetooth service whenever the link status changes.
pub type StatusCallback = fn(BtStatus);

/// Bluetooth service of the host.
#[allow(async_fn_in_trait)]
pub trait BtService {
    /// Drop the current connection, if any.
    fn disconnect(&mut self);

    /// Replace the active profile with the HID profile.
    ///
    /// Advertising must be stopped first.
    fn start_profile(&mut self, params: &HidProfileParams) -> Result<(), BleError>;

    /// Put back the profile that was active before `start_profile`.
    ///
    /// Advertising must be stopped first.
    fn restore_default_profile(&mut self) -> Result<(), BleError>;

    fn start_advertising(&mut self);

    /// Stop advertising and resolve once the radio has actually stopped.
    async fn stop_advertising(&mut self);

    /// Drop every stored bond, so hosts have to pair again.
    fn forget_bonded_devices(&mut self);

    /// Install (or with `None`, remove) the status-change callback.
    fn set_status_changed_callback(&mut self, callback: Option<StatusCallback>);

    fn status(&self) -> BtStatus;
}
