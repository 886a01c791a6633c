//! GATT server exposed while the HID profile is active.
//!
//! HID-over-GATT (0x1812) with a boot keyboard report map taken from
//! `usbd-hid`, plus the Battery Service hosts expect next to it.

use defmt::warn;
use heapless::Vec;
use usbd_hid::descriptor::{KeyboardReport, SerializedDescriptor};

/// HID Information: bcdHID 1.11, country 0, flags RemoteWake|NormallyConnectable.
const HID_INFO: [u8; 4] = [0x11, 0x01, 0x00, 0x03];

/// Protocol Mode: Report Protocol.
const PROTOCOL_MODE_REPORT: u8 = 0x01;

pub const REPORT_MAP_LEN: usize = 128;

#[nrf_softdevice::gatt_service(uuid = "180f")]
pub struct BatteryService {
    #[characteristic(uuid = "2a19", read, notify)]
    pub battery_level: u8,
}

#[nrf_softdevice::gatt_service(uuid = "1812")]
pub struct HidService {
    #[characteristic(uuid = "2a4a", read)]
    pub hid_info: [u8; 4],

    #[characteristic(uuid = "2a4b", read)]
    pub report_map: Vec<u8, REPORT_MAP_LEN>,

    #[characteristic(uuid = "2a4c", write_without_response)]
    pub control_point: u8,

    #[characteristic(uuid = "2a4e", read, write_without_response)]
    pub protocol_mode: u8,

    /// Keyboard input report: modifiers, reserved, 6 keycodes.
    #[characteristic(uuid = "2a4d", read, notify)]
    pub input_report: [u8; 8],
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub bas: BatteryService,
    pub hid: HidService,
}

impl Server {
    /// Fill the static characteristic values.
    pub fn init_values(&self) {
        let mut report_map: Vec<u8, REPORT_MAP_LEN> = Vec::new();
        if report_map.extend_from_slice(KeyboardReport::desc()).is_err() {
            warn!("Keyboard report map does not fit the characteristic");
        }

        let results = [
            self.hid.hid_info_set(&HID_INFO).is_ok(),
            self.hid.report_map_set(&report_map).is_ok(),
            self.hid.protocol_mode_set(&PROTOCOL_MODE_REPORT).is_ok(),
            self.hid.input_report_set(&[0; 8]).is_ok(),
            self.bas.battery_level_set(&100).is_ok(),
        ];
        if results.contains(&false) {
            warn!("Some GATT values could not be initialised");
        }
    }
}
