//! GAP configuration of the HID emulation profile.
//!
//! The profile advertises under its own identity so hosts pair with it
//! separately from the device's default profile:
//!
//! - MAC: base MAC with byte 2 incremented, then bytes 0/1 XORed with the
//!   low/high byte of `mac_xor`.
//! - Name: the host's local name with "Flipper" replaced by the prefix,
//!   cut to `GAP_ADV_NAME_MAX` bytes.

use crate::ble::HidProfileParams;
use crate::config::{
    GAP_ADV_NAME_MAX, GAP_CONN_INTERVAL_MAX, GAP_CONN_INTERVAL_MIN, GAP_DEFAULT_NAME_PREFIX,
    GAP_HOST_NAME_WORD, GAP_SLAVE_LATENCY, GAP_SUP_TIMEOUT,
};
use heapless::String;

/// HID Service UUID (0x1812).
pub const HID_SERVICE_UUID: u16 = 0x1812;

/// GAP appearance: Keyboard.
pub const APPEARANCE_KEYBOARD: u16 = 0x03C1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PairingMethod {
    /// No MITM protection (Just Works).
    None,
    /// Passkey shown on the peer, typed on the device.
    PinCodeInput,
    /// Six digits confirmed on both sides.
    NumericComparison,
}

/// IO capabilities announced during pairing. The pair of both sides'
/// capabilities decides which association model the stacks negotiate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoCapability {
    NoInputNoOutput,
    KeyboardOnly,
    DisplayYesNo,
}

impl PairingMethod {
    /// Capability that makes a peer negotiate this method.
    pub const fn io_capability(self) -> IoCapability {
        match self {
            PairingMethod::None => IoCapability::NoInputNoOutput,
            PairingMethod::PinCodeInput => IoCapability::KeyboardOnly,
            // Display-only would fall back to passkey entry.
            PairingMethod::NumericComparison => IoCapability::DisplayYesNo,
        }
    }

    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => PairingMethod::None,
            1 => PairingMethod::PinCodeInput,
            _ => PairingMethod::NumericComparison,
        }
    }
}

/// Requested connection parameters (1.25 ms / 10 ms units).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionParams {
    pub conn_int_min: u16,
    pub conn_int_max: u16,
    pub slave_latency: u16,
    pub supervisor_timeout: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GapConfig {
    pub adv_name: String<GAP_ADV_NAME_MAX>,
    pub service_uuid: u16,
    pub appearance: u16,
    pub bonding: bool,
    pub pairing: PairingMethod,
    pub mac_address: [u8; 6],
    pub conn_params: ConnectionParams,
}

impl GapConfig {
    /// Configuration of the HID profile for a host with `base_mac` and
    /// local name `local_name`. Without params the default prefix is used
    /// and the MAC is only incremented.
    pub fn hid(params: Option<&HidProfileParams>, base_mac: [u8; 6], local_name: &str) -> Self {
        let prefix = params
            .map(|p| p.device_name_prefix)
            .unwrap_or(GAP_DEFAULT_NAME_PREFIX);

        Self {
            adv_name: profile_adv_name(local_name, prefix),
            service_uuid: HID_SERVICE_UUID,
            appearance: APPEARANCE_KEYBOARD,
            bonding: true,
            pairing: PairingMethod::NumericComparison,
            mac_address: profile_mac(base_mac, params.map(|p| p.mac_xor)),
            conn_params: ConnectionParams {
                conn_int_min: GAP_CONN_INTERVAL_MIN,
                conn_int_max: GAP_CONN_INTERVAL_MAX,
                slave_latency: GAP_SLAVE_LATENCY,
                supervisor_timeout: GAP_SUP_TIMEOUT,
            },
        }
    }
}

/// Derive the profile MAC from the device MAC.
pub fn profile_mac(base: [u8; 6], mac_xor: Option<u16>) -> [u8; 6] {
    let mut mac = base;
    mac[2] = mac[2].wrapping_add(1);
    if let Some(xor) = mac_xor {
        let [low, high] = xor.to_le_bytes();
        mac[0] ^= low;
        mac[1] ^= high;
    }
    mac
}

/// Replace the first "Flipper" in `local_name` with `prefix`.
pub fn profile_adv_name(local_name: &str, prefix: &str) -> String<GAP_ADV_NAME_MAX> {
    let mut name = String::new();
    let parts: [&str; 3] = match local_name.find(GAP_HOST_NAME_WORD) {
        Some(at) => [
            &local_name[..at],
            prefix,
            &local_name[at + GAP_HOST_NAME_WORD.len()..],
        ],
        None => [local_name, "", ""],
    };

    'fill: for part in parts {
        for c in part.chars() {
            if name.push(c).is_err() {
                break 'fill;
            }
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_MAC: [u8; 6] = [0x10, 0x20, 0x30, 0x40, 0x50, 0x60];

    #[test]
    fn name_prefix_replaces_host_word() {
        let name = profile_adv_name("Flipper Zorro", "Btcon");
        assert_eq!(name.as_str(), "Btcon Zorro");
    }

    #[test]
    fn name_without_host_word_is_kept() {
        let name = profile_adv_name("Zorro", "Btcon");
        assert_eq!(name.as_str(), "Zorro");
    }

    #[test]
    fn only_first_occurrence_is_replaced() {
        let name = profile_adv_name("Flipper Flipper", "Btcon");
        assert_eq!(name.as_str(), "Btcon Flipper");
    }

    #[test]
    fn long_names_are_cut_to_capacity() {
        let name = profile_adv_name("Flipper Aerisilvane", "Flippys");
        assert_eq!(name.len(), GAP_ADV_NAME_MAX);
        assert_eq!(name.as_str(), "Flippys Aerisilv");
    }

    #[test]
    fn multibyte_chars_are_not_split() {
        let name = profile_adv_name("Flipper 1234567é", "Btcon");
        assert_eq!(name.as_str(), "Btcon 1234567é");
        // 15 ASCII bytes, then a 2-byte char that no longer fits.
        let name = profile_adv_name("Flipper 123456789é", "Btcon");
        assert_eq!(name.as_str(), "Btcon 123456789");
    }

    #[test]
    fn mac_is_incremented_and_xored() {
        let mac = profile_mac(BASE_MAC, Some(0x13));
        assert_eq!(mac, [0x03, 0x20, 0x31, 0x40, 0x50, 0x60]);

        let mac = profile_mac(BASE_MAC, Some(0x1213));
        assert_eq!(mac, [0x03, 0x32, 0x31, 0x40, 0x50, 0x60]);
    }

    #[test]
    fn mac_increment_wraps() {
        let mac = profile_mac([0, 0, 0xFF, 0, 0, 0], None);
        assert_eq!(mac, [0, 0, 0x00, 0, 0, 0]);
    }

    #[test]
    fn hid_config_uses_params() {
        let params = HidProfileParams {
            device_name_prefix: "Btcon",
            mac_xor: 0x13,
        };
        let config = GapConfig::hid(Some(&params), BASE_MAC, "Flipper Zorro");
        assert_eq!(config.adv_name.as_str(), "Btcon Zorro");
        assert_eq!(config.mac_address[0], 0x03);
        assert_eq!(config.service_uuid, HID_SERVICE_UUID);
        assert_eq!(config.appearance, APPEARANCE_KEYBOARD);
        assert!(config.bonding);
        assert_eq!(config.pairing, PairingMethod::NumericComparison);
        assert_eq!(config.conn_params.conn_int_min, 0x18);
        assert_eq!(config.conn_params.conn_int_max, 0x24);
    }

    #[test]
    fn numeric_comparison_needs_yes_no_display() {
        assert_eq!(
            PairingMethod::NumericComparison.io_capability(),
            IoCapability::DisplayYesNo
        );
        assert_eq!(PairingMethod::PinCodeInput.io_capability(), IoCapability::KeyboardOnly);
        assert_eq!(PairingMethod::None.io_capability(), IoCapability::NoInputNoOutput);
    }

    #[test]
    fn pairing_method_survives_raw_storage() {
        for method in [
            PairingMethod::None,
            PairingMethod::PinCodeInput,
            PairingMethod::NumericComparison,
        ] {
            assert_eq!(PairingMethod::from_raw(method as u8), method);
        }
    }

    #[test]
    fn hid_config_without_params_uses_default_prefix() {
        let config = GapConfig::hid(None, BASE_MAC, "Flipper Zorro");
        assert_eq!(config.adv_name.as_str(), "Control Zorro");
        assert_eq!(config.mac_address, [0x10, 0x20, 0x31, 0x40, 0x50, 0x60]);
    }
}
