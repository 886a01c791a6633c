//! Application root.
//!
//! `App` owns every capability handle, the main menu widget and the scene
//! controller. Scene handlers and menu callbacks receive `&mut App`, so all
//! application state is reachable from one place and nothing is global.
//!
//! ## Lifecycle
//!
//! ```text
//! alloc → switch_to_hid_profile → start → dispatch* → restore_default_profile → free
//! ```
//!
//! The profile bracket is async: the settle delay and the advertising stop
//! have to let the radio tasks run. [`run`] drives the sequence from a
//! blocking [`EventSource`]; the firmware drives it from its async loop.

use core::fmt;

use crate::ble::BtService;
use crate::config::{AppVariant, BT_SETTLE_DELAY_MS, TICK_PERIOD_MS};
use crate::error::Error;
use crate::log::{Level, LogSink};
use crate::notification::{NotificationSequence, Notifier};
use crate::scene::{self, SceneApp, SceneManager};
use crate::scenes::{self, AppScene};
use crate::ui::{DispatcherEvent, EventSource, InputKey, Submenu, SubmenuInput, ViewDispatcher, ViewId};
use embedded_hal_async::delay::DelayNs;

/// Capability types supplied by the host.
pub trait Platform {
    type Bt: BtService;
    type Dispatcher: ViewDispatcher;
    type Notifier: Notifier;
    type Log: LogSink;
    type Delay: DelayNs;
}

/// Capability handles, opened before `alloc` and handed back by `free`.
pub struct Records<P: Platform> {
    pub bt: P::Bt,
    pub dispatcher: P::Dispatcher,
    pub notifier: P::Notifier,
    pub log: P::Log,
    pub delay: P::Delay,
}

pub struct App<P: Platform> {
    variant: &'static AppVariant,
    bt: P::Bt,
    dispatcher: P::Dispatcher,
    notifier: P::Notifier,
    log: P::Log,
    delay: P::Delay,
    main_menu: Submenu<App<P>>,
    scene_manager: SceneManager<App<P>>,
}

impl<P: Platform> SceneApp for App<P> {
    type Scene = AppScene;

    fn scene_manager(&self) -> &SceneManager<Self> {
        &self.scene_manager
    }

    fn scene_manager_mut(&mut self) -> &mut SceneManager<Self> {
        &mut self.scene_manager
    }
}

impl<P: Platform> App<P> {
    /// Take the capability handles and wire up the dispatcher.
    pub fn alloc(records: Records<P>, variant: &'static AppVariant) -> Result<Self, Error> {
        let Records {
            bt,
            dispatcher,
            notifier,
            log,
            delay,
        } = records;

        let mut app = Self {
            variant,
            bt,
            dispatcher,
            notifier,
            log,
            delay,
            main_menu: Submenu::new(),
            scene_manager: SceneManager::new(&scenes::handlers::<P>())?,
        };
        app.log(Level::Info, format_args!("Allocating {}", variant.display_name));

        app.dispatcher.set_tick_period(TICK_PERIOD_MS);
        app.dispatcher.add_view(ViewId::MainMenu)?;
        app.dispatcher.attach_to_gui();

        app.log(
            Level::Info,
            format_args!("{} successfully initialized", variant.display_name),
        );
        Ok(app)
    }

    /// Unregister the menu view and give the handles back.
    pub fn free(mut self) -> Records<P> {
        let name = self.variant.display_name;
        self.log(Level::Info, format_args!("Freeing {}", name));

        self.bt.set_status_changed_callback(None);
        self.dispatcher.remove_view(ViewId::MainMenu);
        self.main_menu.reset();

        let mut records: Records<P> = Records {
            bt: self.bt,
            dispatcher: self.dispatcher,
            notifier: self.notifier,
            log: self.log,
            delay: self.delay,
        };
        records.log.log(
            Level::Info,
            self.variant.app_name,
            format_args!("{} successfully freed", name),
        );
        records
    }

    /// Enter the main menu.
    pub fn start(&mut self) -> Result<(), Error> {
        scene::start(self, AppScene::MainMenu)
    }

    pub fn custom_event_callback(&mut self, event: u32) -> bool {
        scene::handle_custom_event(self, event)
    }

    pub fn back_event_callback(&mut self) -> bool {
        scene::handle_back_event(self)
    }

    pub fn tick_event_callback(&mut self) {
        scene::handle_tick_event(self);
    }

    /// Route one dispatcher event.
    pub fn dispatch(&mut self, event: DispatcherEvent) {
        match event {
            DispatcherEvent::Input(key) => self.input_callback(key),
            DispatcherEvent::Custom(event) => {
                self.custom_event_callback(event);
            }
            DispatcherEvent::Tick => self.tick_event_callback(),
        }
    }

    fn input_callback(&mut self, key: InputKey) {
        let outcome = match self.dispatcher.current_view() {
            Some(ViewId::MainMenu) => self.main_menu.process_input(key),
            None if key == InputKey::Back => SubmenuInput::NotConsumed,
            None => SubmenuInput::Consumed,
        };

        match outcome {
            SubmenuInput::Activated { id, callback } => callback(self, id),
            SubmenuInput::Consumed => {}
            SubmenuInput::NotConsumed => {
                // Back nobody wanted closes the dispatcher.
                if !self.back_event_callback() {
                    self.dispatcher.stop();
                }
            }
        }
    }

    /// Drop the current link and bring up the HID profile.
    pub async fn switch_to_hid_profile(&mut self) -> Result<(), Error> {
        self.bt.disconnect();
        self.delay.delay_ms(BT_SETTLE_DELAY_MS).await;
        self.bt.stop_advertising().await;
        self.bt.forget_bonded_devices();

        self.log(Level::Debug, format_args!("Starting switching bluetooth profile"));
        if let Err(e) = self.bt.start_profile(&self.variant.hid_params()) {
            self.log(Level::Error, format_args!("HID profile start failed: {:?}", e));
            return Err(Error::ProfileStartFailed);
        }
        self.bt.start_advertising();
        self.notifier.notify(NotificationSequence::BlinkStartBlue);
        self.log(Level::Debug, format_args!("Bluetooth profile is now HID"));
        Ok(())
    }

    pub async fn restore_default_profile(&mut self) -> Result<(), Error> {
        self.log(Level::Debug, format_args!("Restoring bluetooth profile"));
        self.bt.disconnect();
        self.delay.delay_ms(BT_SETTLE_DELAY_MS).await;
        self.bt.stop_advertising().await;

        if let Err(e) = self.bt.restore_default_profile() {
            self.log(Level::Error, format_args!("Profile restore failed: {:?}", e));
            return Err(Error::ProfileRestoreFailed);
        }
        self.notifier.notify(NotificationSequence::BlinkStop);
        self.log(Level::Debug, format_args!("Bluetooth profile is now default"));
        Ok(())
    }

    /// Whether the dispatcher still wants events.
    pub fn is_running(&self) -> bool {
        self.dispatcher.is_running()
    }

    pub fn variant(&self) -> &'static AppVariant {
        self.variant
    }

    pub fn dispatcher(&self) -> &P::Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut P::Dispatcher {
        &mut self.dispatcher
    }

    pub fn main_menu(&self) -> &Submenu<App<P>> {
        &self.main_menu
    }

    pub fn main_menu_mut(&mut self) -> &mut Submenu<App<P>> {
        &mut self.main_menu
    }

    /// Log under the application tag.
    pub fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        self.log.log(level, self.variant.app_name, args);
    }
}

/// Full application run against a blocking event source.
///
/// Returns the records once the dispatcher stops or the source runs dry.
pub async fn run<P: Platform, E: EventSource>(
    records: Records<P>,
    variant: &'static AppVariant,
    events: &mut E,
) -> Result<Records<P>, Error> {
    let mut app = App::alloc(records, variant)?;
    app.switch_to_hid_profile().await?;
    app.start()?;

    while app.is_running() {
        match events.next_event() {
            Some(event) => app.dispatch(event),
            None => break,
        }
    }

    app.restore_default_profile().await?;
    Ok(app.free())
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording capabilities shared by the unit tests.

    use super::*;
    use crate::ble::{BtStatus, HidProfileParams, StatusCallback};
    use crate::error::BleError;
    use crate::ui::ViewPort;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::string::{String, ToString};
    use std::vec::Vec;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Op {
        Disconnect,
        StartProfile(HidProfileParams),
        RestoreDefault,
        StartAdvertising,
        StopAdvertising,
        ForgetBonds,
        StatusCallback(bool),
        DelayMs(u32),
        Notify(NotificationSequence),
    }

    pub type OpLog = Rc<RefCell<Vec<Op>>>;
    pub type Lines = Rc<RefCell<Vec<(Level, String)>>>;

    pub struct MockBt {
        pub ops: OpLog,
        pub fail_start: bool,
        pub fail_restore: bool,
    }

    impl BtService for MockBt {
        fn disconnect(&mut self) {
            self.ops.borrow_mut().push(Op::Disconnect);
        }

        fn start_profile(&mut self, params: &HidProfileParams) -> Result<(), BleError> {
            self.ops.borrow_mut().push(Op::StartProfile(*params));
            if self.fail_start {
                Err(BleError::ProfileRejected)
            } else {
                Ok(())
            }
        }

        fn restore_default_profile(&mut self) -> Result<(), BleError> {
            self.ops.borrow_mut().push(Op::RestoreDefault);
            if self.fail_restore {
                Err(BleError::NotReady)
            } else {
                Ok(())
            }
        }

        fn start_advertising(&mut self) {
            self.ops.borrow_mut().push(Op::StartAdvertising);
        }

        async fn stop_advertising(&mut self) {
            self.ops.borrow_mut().push(Op::StopAdvertising);
        }

        fn forget_bonded_devices(&mut self) {
            self.ops.borrow_mut().push(Op::ForgetBonds);
        }

        fn set_status_changed_callback(&mut self, callback: Option<StatusCallback>) {
            self.ops.borrow_mut().push(Op::StatusCallback(callback.is_some()));
        }

        fn status(&self) -> BtStatus {
            BtStatus::Idle
        }
    }

    pub struct MockDelay {
        pub ops: OpLog,
    }

    impl DelayNs for MockDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.ops.borrow_mut().push(Op::DelayMs(ns / 1_000_000));
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.ops.borrow_mut().push(Op::DelayMs(ms));
        }
    }

    pub struct MockNotifier {
        pub ops: OpLog,
    }

    impl Notifier for MockNotifier {
        fn notify(&mut self, sequence: NotificationSequence) {
            self.ops.borrow_mut().push(Op::Notify(sequence));
        }
    }

    pub struct RecordingLog {
        pub lines: Lines,
    }

    impl LogSink for RecordingLog {
        fn log(&mut self, level: Level, _tag: &str, args: fmt::Arguments<'_>) {
            self.lines.borrow_mut().push((level, args.to_string()));
        }
    }

    pub struct MockPlatform;

    impl Platform for MockPlatform {
        type Bt = MockBt;
        type Dispatcher = ViewPort;
        type Notifier = MockNotifier;
        type Log = RecordingLog;
        type Delay = MockDelay;
    }

    pub fn records() -> (Records<MockPlatform>, OpLog, Lines) {
        let ops = OpLog::default();
        let lines = Lines::default();
        let records = Records {
            bt: MockBt {
                ops: ops.clone(),
                fail_start: false,
                fail_restore: false,
            },
            dispatcher: ViewPort::new(),
            notifier: MockNotifier { ops: ops.clone() },
            log: RecordingLog {
                lines: lines.clone(),
            },
            delay: MockDelay { ops: ops.clone() },
        };
        (records, ops, lines)
    }

    pub fn has_line(lines: &Lines, level: Level, text: &str) -> bool {
        lines
            .borrow()
            .iter()
            .any(|(l, line)| *l == level && line == text)
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use crate::config::BTCON;
    use crate::scene::ManagerState;
    use embassy_futures::block_on;
    use std::vec::Vec;

    struct Script(Vec<DispatcherEvent>);

    impl EventSource for Script {
        fn next_event(&mut self) -> Option<DispatcherEvent> {
            if self.0.is_empty() {
                None
            } else {
                Some(self.0.remove(0))
            }
        }
    }

    #[test]
    fn alloc_wires_dispatcher() {
        let (records, _, lines) = records();
        let app = App::alloc(records, &BTCON).unwrap();

        assert!(app.is_running());
        assert_eq!(app.dispatcher().tick_period_ms(), TICK_PERIOD_MS);
        assert_eq!(app.scene_manager().state(), ManagerState::Idle);
        assert!(has_line(&lines, Level::Info, "Allocating BtconApp"));
        assert!(has_line(&lines, Level::Info, "BtconApp successfully initialized"));
    }

    #[test]
    fn free_releases_menu_view() {
        let (records, _, lines) = records();
        let mut app = App::alloc(records, &BTCON).unwrap();
        app.start().unwrap();

        let records = app.free();
        assert_eq!(records.dispatcher.current_view(), None);
        assert!(has_line(&lines, Level::Info, "BtconApp successfully freed"));
    }

    #[test]
    fn profile_switch_is_bracketed() {
        let (records, ops, _) = records();
        let mut app = App::alloc(records, &BTCON).unwrap();

        block_on(app.switch_to_hid_profile()).unwrap();
        block_on(app.restore_default_profile()).unwrap();

        assert_eq!(
            *ops.borrow(),
            [
                Op::Disconnect,
                Op::DelayMs(BT_SETTLE_DELAY_MS),
                Op::StopAdvertising,
                Op::ForgetBonds,
                Op::StartProfile(BTCON.hid_params()),
                Op::StartAdvertising,
                Op::Notify(NotificationSequence::BlinkStartBlue),
                Op::Disconnect,
                Op::DelayMs(BT_SETTLE_DELAY_MS),
                Op::StopAdvertising,
                Op::RestoreDefault,
                Op::Notify(NotificationSequence::BlinkStop),
            ]
        );
    }

    #[test]
    fn profile_start_failure_is_fatal() {
        let (mut records, ops, _) = records();
        records.bt.fail_start = true;
        let mut app = App::alloc(records, &BTCON).unwrap();

        assert_eq!(
            block_on(app.switch_to_hid_profile()),
            Err(Error::ProfileStartFailed)
        );
        assert!(!ops.borrow().contains(&Op::StartAdvertising));
    }

    #[test]
    fn profile_restore_failure_is_fatal() {
        let (mut records, _, _) = records();
        records.bt.fail_restore = true;
        let mut app = App::alloc(records, &BTCON).unwrap();
        assert_eq!(
            block_on(app.restore_default_profile()),
            Err(Error::ProfileRestoreFailed)
        );
    }

    #[test]
    fn back_input_ends_the_run() {
        let (records, ops, _) = records();
        let mut events = Script(std::vec![
            DispatcherEvent::Tick,
            DispatcherEvent::Input(InputKey::Back),
            DispatcherEvent::Tick,
        ]);

        let records = block_on(run(records, &BTCON, &mut events)).unwrap();
        assert!(!records.dispatcher.is_running());
        // The trailing tick is never pulled.
        assert_eq!(events.0, [DispatcherEvent::Tick]);
        assert_eq!(ops.borrow().last(), Some(&Op::Notify(NotificationSequence::BlinkStop)));
    }

    #[test]
    fn exhausted_source_still_restores() {
        let (records, ops, _) = records();
        let mut events = Script(Vec::new());

        block_on(run(records, &BTCON, &mut events)).unwrap();
        assert!(ops.borrow().contains(&Op::RestoreDefault));
    }

    #[test]
    fn radio_is_quiet_before_every_profile_change() {
        let (records, ops, _) = records();
        let mut events = Script(std::vec![DispatcherEvent::Input(InputKey::Back)]);

        block_on(run(records, &BTCON, &mut events)).unwrap();

        let ops = ops.borrow();
        for change in [Op::StartProfile(BTCON.hid_params()), Op::RestoreDefault] {
            let at = ops.iter().position(|op| *op == change).unwrap();
            assert_eq!(ops[at - 1], Op::StopAdvertising, "before {:?}", change);
        }
    }

    #[test]
    fn free_drops_the_status_callback() {
        let (mut records, ops, _) = records();
        fn ignore(_: crate::ble::BtStatus) {}
        records.bt.set_status_changed_callback(Some(ignore));
        let app = App::alloc(records, &BTCON).unwrap();

        app.free();
        assert_eq!(ops.borrow().last(), Some(&Op::StatusCallback(false)));
    }

    #[test]
    fn input_without_view_only_handles_back() {
        let (records, _, _) = records();
        let mut app = App::alloc(records, &BTCON).unwrap();
        app.start().unwrap();
        app.dispatcher_mut().remove_view(ViewId::MainMenu);

        app.dispatch(DispatcherEvent::Input(InputKey::Ok));
        assert_eq!(app.scene_manager().state(), ManagerState::Active);

        app.dispatch(DispatcherEvent::Input(InputKey::Back));
        assert_eq!(app.scene_manager().state(), ManagerState::Terminated);
    }
}
