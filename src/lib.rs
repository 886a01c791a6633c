//! btcon - BLE HID companion app for a handheld with a menu UI.
//!
//! The library holds the whole application: scene controller, main menu
//! scene, menu widget, BLE profile bracketing and the capability traits the
//! host implements. Everything outside `embedded`-gated modules is plain
//! `no_std` logic and is tested on the host.
//!
//! Usage: `cargo test` (host), `cargo build --release --features embedded
//! --target thumbv7em-none-eabihf` (firmware).
//!
//! The `flippys` feature builds the Flippys flavour instead of Btcon.

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod ble;
pub mod config;
pub mod error;
pub mod log;
pub mod notification;
pub mod scene;
pub mod scenes;
pub mod ui;

pub use app::{run, App, Platform, Records};
pub use error::{BleError, Error};
