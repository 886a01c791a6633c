//! S140 SoftDevice implementation of [`BtService`] (peripheral role).
//!
//! `SoftdeviceBt` is called from the application task. It reconfigures the
//! stack and posts commands; `advertising_task` owns the async side:
//! advertising, the live connection and the GATT server. Stopping is a
//! handshake: the caller waits until the task has left advertising, since
//! the stack rejects address changes while it is on air.

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicU8, Ordering};

use crate::ble::adv_data::{build_advertisement, local_name, ADV_PAYLOAD_MAX};
use crate::ble::gap::{GapConfig, IoCapability, PairingMethod};
use crate::ble::hid_service::Server;
use crate::ble::{BtService, BtStatus, HidProfileParams, StatusCallback};
use crate::config::{GAP_ADV_INTERVAL, MAX_BONDS};
use crate::error::BleError;
use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;
use heapless::Vec;
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{
    gatt_server, get_address, peripheral, Address, AddressType, Connection, EncryptionInfo,
    IdentityKey, MasterId, SecurityMode,
};
use nrf_softdevice::{raw, Softdevice};

#[derive(Clone, Copy, PartialEq, Eq)]
enum AdvCommand {
    Start,
    Stop,
}

static ADV_CONTROL: Signal<CriticalSectionRawMutex, AdvCommand> = Signal::new();

/// Raised by `advertising_task` once it is back to idle.
static ADV_STOPPED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

static ADV_PAYLOAD: Mutex<CriticalSectionRawMutex, RefCell<Vec<u8, ADV_PAYLOAD_MAX>>> =
    Mutex::new(RefCell::new(Vec::new()));

static CONNECTION: Mutex<CriticalSectionRawMutex, RefCell<Option<Connection>>> =
    Mutex::new(RefCell::new(None));

static STATUS: AtomicU8 = AtomicU8::new(BtStatus::Idle as u8);

static STATUS_CALLBACK: Mutex<CriticalSectionRawMutex, Cell<Option<StatusCallback>>> =
    Mutex::new(Cell::new(None));

static PAIRING: AtomicU8 = AtomicU8::new(PairingMethod::NumericComparison as u8);

fn current_status() -> BtStatus {
    match STATUS.load(Ordering::Relaxed) {
        s if s == BtStatus::Advertising as u8 => BtStatus::Advertising,
        s if s == BtStatus::Connected as u8 => BtStatus::Connected,
        _ => BtStatus::Idle,
    }
}

fn set_status(status: BtStatus) {
    if STATUS.swap(status as u8, Ordering::Relaxed) == status as u8 {
        return;
    }
    if let Some(callback) = STATUS_CALLBACK.lock(|cb| cb.get()) {
        callback(status);
    }
}

/// `sd_ble_gap_addr_set` with the error handed back instead of a panic.
fn apply_address(address: &Address) -> Result<(), BleError> {
    let ret = unsafe { raw::sd_ble_gap_addr_set(address.as_raw()) };
    if ret == raw::NRF_SUCCESS {
        Ok(())
    } else {
        warn!("sd_ble_gap_addr_set failed: {=u32:#x}", ret);
        Err(BleError::Raw(ret))
    }
}

pub struct SoftdeviceBt {
    default_address: Address,
    local_name: &'static str,
}

impl SoftdeviceBt {
    /// Capture the current (default profile) address of the stack.
    pub fn new(sd: &'static Softdevice, local_name: &'static str) -> Self {
        Self {
            default_address: get_address(sd),
            local_name,
        }
    }
}

impl BtService for SoftdeviceBt {
    fn disconnect(&mut self) {
        CONNECTION.lock(|conn| {
            if let Some(conn) = conn.borrow_mut().take() {
                if conn.disconnect().is_err() {
                    warn!("Disconnect request rejected");
                }
            }
        });
    }

    fn start_profile(&mut self, params: &HidProfileParams) -> Result<(), BleError> {
        if current_status() != BtStatus::Idle {
            return Err(BleError::NotReady);
        }
        let config = GapConfig::hid(Some(params), self.default_address.bytes(), self.local_name);

        // Random static addresses need the two top bits set.
        let mut mac = config.mac_address;
        mac[5] |= 0xC0;
        apply_address(&Address::new(AddressType::RandomStatic, mac))?;

        let payload = build_advertisement(&config);
        if payload.is_empty() {
            return Err(BleError::ProfileRejected);
        }
        info!(
            "HID profile: name={} pairing={}",
            local_name(&payload).unwrap_or("?"),
            config.pairing
        );
        ADV_PAYLOAD.lock(|p| *p.borrow_mut() = payload);
        PAIRING.store(config.pairing as u8, Ordering::Relaxed);
        Ok(())
    }

    fn restore_default_profile(&mut self) -> Result<(), BleError> {
        if current_status() != BtStatus::Idle {
            return Err(BleError::NotReady);
        }
        apply_address(&self.default_address)?;
        ADV_PAYLOAD.lock(|p| p.borrow_mut().clear());
        info!("Default profile restored");
        Ok(())
    }

    fn start_advertising(&mut self) {
        let ready = ADV_PAYLOAD.lock(|p| !p.borrow().is_empty());
        if ready {
            ADV_CONTROL.signal(AdvCommand::Start);
        } else {
            warn!("No profile configured, not advertising");
        }
    }

    async fn stop_advertising(&mut self) {
        if current_status() == BtStatus::Idle {
            // Drop a start the task has not picked up yet.
            ADV_CONTROL.reset();
            return;
        }
        ADV_STOPPED.reset();
        ADV_CONTROL.signal(AdvCommand::Stop);
        ADV_STOPPED.wait().await;
    }

    fn forget_bonded_devices(&mut self) {
        let dropped = BONDS.lock(|bonds| {
            let mut bonds = bonds.borrow_mut();
            let n = bonds.len();
            bonds.clear();
            n
        });
        info!("Forgot {} bonded device(s)", dropped);
    }

    fn set_status_changed_callback(&mut self, callback: Option<StatusCallback>) {
        STATUS_CALLBACK.lock(|cb| cb.set(callback));
    }

    fn status(&self) -> BtStatus {
        current_status()
    }
}

async fn wait_for(command: AdvCommand) {
    while ADV_CONTROL.wait().await != command {}
}

/// Advertise the configured profile and serve GATT while connected.
#[embassy_executor::task]
pub async fn advertising_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    loop {
        wait_for(AdvCommand::Start).await;
        advertise_until_stopped(sd, server).await;
        set_status(BtStatus::Idle);
        ADV_STOPPED.signal(());
    }
}

/// Returns on a stop command, or when the profile payload is gone.
async fn advertise_until_stopped(sd: &'static Softdevice, server: &'static Server) {
    loop {
        let payload = ADV_PAYLOAD.lock(|p| p.borrow().clone());
        if payload.is_empty() {
            warn!("Profile payload cleared, advertising ends");
            return;
        }
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &payload,
            scan_data: &[],
        };
        let config = peripheral::Config {
            interval: GAP_ADV_INTERVAL,
            ..Default::default()
        };

        set_status(BtStatus::Advertising);
        let conn = match select(
            peripheral::advertise_pairable(sd, adv, &config, &BONDER),
            wait_for(AdvCommand::Stop),
        )
        .await
        {
            Either::First(Ok(conn)) => conn,
            Either::First(Err(_)) => {
                warn!("Advertising failed, retrying");
                Timer::after_millis(500).await;
                continue;
            }
            Either::Second(()) => return,
        };

        info!("Host connected");
        set_status(BtStatus::Connected);
        CONNECTION.lock(|c| *c.borrow_mut() = Some(conn.clone()));

        let stopped = matches!(
            select(
                gatt_server::run(&conn, server, |_| {}),
                wait_for(AdvCommand::Stop),
            )
            .await,
            Either::Second(())
        );
        if stopped {
            let _ = conn.disconnect();
        }

        CONNECTION.lock(|c| *c.borrow_mut() = None);
        info!("Host disconnected");
        if stopped {
            return;
        }
    }
}

#[derive(Clone, Copy)]
struct Bond {
    master_id: MasterId,
    key: EncryptionInfo,
    peer_id: IdentityKey,
}

/// Bonds of the HID profile, oldest first. Lost on reset.
static BONDS: Mutex<CriticalSectionRawMutex, RefCell<Vec<Bond, MAX_BONDS>>> =
    Mutex::new(RefCell::new(Vec::new()));

fn remember(bond: Bond) {
    BONDS.lock(|bonds| {
        let mut bonds = bonds.borrow_mut();
        bonds.retain(|b| b.master_id != bond.master_id);
        if bonds.is_full() {
            bonds.remove(0);
        }
        let _ = bonds.push(bond);
    });
}

fn find_bond(matches: impl Fn(&Bond) -> bool) -> Option<Bond> {
    BONDS.lock(|bonds| bonds.borrow().iter().copied().find(|b| matches(b)))
}

/// Security handler backed by the `BONDS` table.
struct Bonder;

static BONDER: Bonder = Bonder;

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        match PairingMethod::from_raw(PAIRING.load(Ordering::Relaxed)).io_capability() {
            IoCapability::NoInputNoOutput => IoCapabilities::None,
            IoCapability::KeyboardOnly => IoCapabilities::KeyboardOnly,
            IoCapability::DisplayYesNo => IoCapabilities::DisplayYesNo,
        }
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn display_passkey(&self, passkey: &[u8; 6]) {
        info!("Pairing passkey: {=[u8]:a}", &passkey[..]);
    }

    fn on_bonded(
        &self,
        _conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        info!("Host bonded");
        remember(Bond {
            master_id,
            key,
            peer_id,
        });
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        find_bond(|b| b.master_id == master_id).map(|b| b.key)
    }

    fn get_peripheral_key(&self, conn: &Connection) -> Option<(MasterId, EncryptionInfo)> {
        let peer = conn.peer_address();
        find_bond(|b| b.peer_id.is_match(peer)).map(|b| (b.master_id, b.key))
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("Link security: {}", mode);
    }
}
