//! Legacy advertising payload: AD structures of `[len, type, data..]`.

use crate::ble::gap::GapConfig;
use heapless::Vec;

/// Legacy advertising payload limit.
pub const ADV_PAYLOAD_MAX: usize = 31;

pub const AD_FLAGS: u8 = 0x01;
pub const AD_INCOMPLETE_UUID16: u8 = 0x02;
pub const AD_COMPLETE_UUID16: u8 = 0x03;
pub const AD_SHORT_NAME: u8 = 0x08;
pub const AD_COMPLETE_NAME: u8 = 0x09;
pub const AD_APPEARANCE: u8 = 0x19;

/// LE General Discoverable, BR/EDR not supported.
const FLAGS_LE_GENERAL_DISC: u8 = 0x06;

/// Build the connectable advertisement for `config`.
///
/// The name goes last and is shortened if the payload would overflow.
pub fn build_advertisement(config: &GapConfig) -> Vec<u8, ADV_PAYLOAD_MAX> {
    let mut adv = Vec::new();
    let uuid = config.service_uuid.to_le_bytes();
    let appearance = config.appearance.to_le_bytes();

    // Fixed part is 11 bytes and always fits.
    let _ = push_ad(&mut adv, AD_FLAGS, &[FLAGS_LE_GENERAL_DISC]);
    let _ = push_ad(&mut adv, AD_COMPLETE_UUID16, &uuid);
    let _ = push_ad(&mut adv, AD_APPEARANCE, &appearance);

    let name = config.adv_name.as_bytes();
    let room = ADV_PAYLOAD_MAX - adv.len() - 2;
    if name.len() <= room {
        let _ = push_ad(&mut adv, AD_COMPLETE_NAME, name);
    } else {
        let _ = push_ad(&mut adv, AD_SHORT_NAME, &name[..room]);
    }
    adv
}

fn push_ad(adv: &mut Vec<u8, ADV_PAYLOAD_MAX>, ad_type: u8, data: &[u8]) -> Result<(), ()> {
    if adv.len() + 2 + data.len() > ADV_PAYLOAD_MAX {
        return Err(());
    }
    adv.push(data.len() as u8 + 1).map_err(drop)?;
    adv.push(ad_type).map_err(drop)?;
    adv.extend_from_slice(data)
}

/// Iterator over the `(type, data)` pairs of a payload.
///
/// Stops at the first zero-length or truncated structure.
pub struct AdStructures<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> AdStructures<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl<'a> Iterator for AdStructures<'a> {
    type Item = (u8, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.pos;
        let len = *self.data.get(i)? as usize;
        if len == 0 || i + len >= self.data.len() {
            self.pos = self.data.len();
            return None;
        }
        self.pos = i + len + 1;
        Some((self.data[i + 1], &self.data[i + 2..i + 1 + len]))
    }
}

/// Whether the payload lists the 16-bit service `uuid`.
pub fn advertises_service(data: &[u8], uuid: u16) -> bool {
    let needle = uuid.to_le_bytes();
    AdStructures::new(data)
        .filter(|(ty, _)| *ty == AD_INCOMPLETE_UUID16 || *ty == AD_COMPLETE_UUID16)
        .any(|(_, uuids)| uuids.chunks_exact(2).any(|chunk| chunk == needle))
}

/// Complete or shortened local name, if present and valid UTF-8.
pub fn local_name(data: &[u8]) -> Option<&str> {
    AdStructures::new(data)
        .find(|(ty, _)| *ty == AD_COMPLETE_NAME || *ty == AD_SHORT_NAME)
        .and_then(|(_, name)| core::str::from_utf8(name).ok())
}
