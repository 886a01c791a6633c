//! btcon firmware - nRF52840 + S140.
//!
//! Brings up the SoftDevice, the OLED, the buttons and the status LED, then
//! runs the application: switch to the HID profile, show the main menu and
//! feed key presses and ticks to `App::dispatch` until the menu closes.

#![no_std]
#![no_main]

use defmt_rtt as _; // global logger
use panic_probe as _;

use core::mem;

use btcon::app::{App, Platform, Records};
use btcon::ble::hid_service::Server;
use btcon::ble::softdevice::{advertising_task, SoftdeviceBt};
use btcon::ble::{BtService, BtStatus};
use btcon::config::{ACTIVE_VARIANT, HOST_LOCAL_NAME};
use btcon::log::DefmtLog;
use btcon::notification::LedNotifier;
use btcon::ui::buttons::{button_task, KeySender, KEY_QUEUE_LEN};
use btcon::ui::{display, DispatcherEvent, InputKey, ViewDispatcher, ViewId, ViewPort};
use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::interrupt::{self, InterruptExt};
use embassy_nrf::{bind_interrupts, peripherals, twim};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Delay, Duration, Ticker};
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

static KEYS: Channel<CriticalSectionRawMutex, InputKey, KEY_QUEUE_LEN> = Channel::new();
static SERVER: StaticCell<Server> = StaticCell::new();

struct Firmware;

impl Platform for Firmware {
    type Bt = SoftdeviceBt;
    type Dispatcher = ViewPort;
    type Notifier = LedNotifier;
    type Log = DefmtLog;
    type Delay = Delay;
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    info!("SD is running");
    sd.run().await
}

#[embassy_executor::task(pool_size = 4)]
async fn button(pin: Input<'static>, key: InputKey, tx: KeySender) -> ! {
    button_task(pin, key, tx).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("btcon firmware starting ({})", ACTIVE_VARIANT.app_name);

    let mut conf = embassy_nrf::config::Config::default();
    // Keep clear of the SoftDevice's reserved priorities.
    conf.gpiote_interrupt_priority = interrupt::Priority::P2;
    conf.time_interrupt_priority = interrupt::Priority::P2;
    let p = embassy_nrf::init(conf);

    interrupt::SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0.set_priority(interrupt::Priority::P3);

    let sd = initialize_sd();
    let server = SERVER.init(unwrap!(Server::new(sd)));
    let sd: &'static Softdevice = sd;
    server.init_values();
    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(advertising_task(sd, server)));

    // Display
    let i2c = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let mut oled = display::init(i2c);

    // Buttons
    let tx = KEYS.sender();
    unwrap!(spawner.spawn(button(Input::new(p.P0_11, Pull::Up), InputKey::Up, tx)));
    unwrap!(spawner.spawn(button(Input::new(p.P0_12, Pull::Up), InputKey::Down, tx)));
    unwrap!(spawner.spawn(button(Input::new(p.P0_24, Pull::Up), InputKey::Ok, tx)));
    unwrap!(spawner.spawn(button(Input::new(p.P0_25, Pull::Up), InputKey::Back, tx)));

    let led = Output::new(p.P0_06, Level::High, OutputDrive::Standard);

    let mut records: Records<Firmware> = Records {
        bt: SoftdeviceBt::new(sd, HOST_LOCAL_NAME),
        dispatcher: ViewPort::new(),
        notifier: LedNotifier::new(led),
        log: DefmtLog,
        delay: Delay,
    };
    records.bt.set_status_changed_callback(Some(log_bt_status));

    let mut app = unwrap!(App::alloc(records, ACTIVE_VARIANT));
    if let Err(e) = app.switch_to_hid_profile().await {
        display::draw_error(&mut oled, "BLE profile");
        defmt::panic!("{}", e);
    }
    unwrap!(app.start());

    let mut ticker = Ticker::every(Duration::from_millis(
        app.dispatcher().tick_period_ms().into(),
    ));
    render(&mut oled, &app);

    while app.is_running() {
        let event = match select(KEYS.receive(), ticker.next()).await {
            Either::First(key) => DispatcherEvent::Input(key),
            Either::Second(()) => DispatcherEvent::Tick,
        };
        app.dispatch(event);
        if let DispatcherEvent::Input(_) = event {
            render(&mut oled, &app);
        }
    }

    if let Err(e) = app.restore_default_profile().await {
        display::draw_error(&mut oled, "BLE restore");
        defmt::panic!("{}", e);
    }
    let records = app.free();
    info!("Radio status after close: {}", records.bt.status());
    display::clear(&mut oled);

    // Nothing to return to on bare metal.
    core::future::pending::<()>().await;
}

fn log_bt_status(status: BtStatus) {
    info!("Bluetooth status: {}", status);
}

fn render<I2C>(oled: &mut display::Display<I2C>, app: &App<Firmware>)
where
    I2C: embedded_hal::i2c::I2c,
{
    match app.dispatcher().current_view() {
        Some(ViewId::MainMenu) => {
            display::draw_menu(oled, app.variant().app_name, &app.main_menu().get_view())
        }
        None => display::clear(oled),
    }
}

fn initialize_sd() -> &'static mut Softdevice {
    let config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 23 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: HOST_LOCAL_NAME.as_ptr() as _,
            current_len: HOST_LOCAL_NAME.len() as u16,
            max_len: HOST_LOCAL_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };

    Softdevice::enable(&config)
}
