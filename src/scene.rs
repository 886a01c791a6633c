//! Scene lifecycle controller.
//!
//! A scene is a UI mode with `on_enter` / `on_event` / `on_exit` handlers.
//! The controller owns the handler table and a bounded navigation stack
//! (top = active scene) and routes custom, back and tick events to the
//! active scene.
//!
//! ## States
//!
//! ```text
//! Idle ──start──▶ Active ──stop / back on the last scene──▶ Terminated
//! ```
//!
//! Events delivered while `Idle` or `Terminated` are dropped: no handler
//! runs and every `handle_*` returns `false`.
//!
//! The controller lives inside the application it drives, so the
//! operations are free functions taking the whole application. Handlers
//! get `&mut A` and may call back into this module (e.g. `stop` from an
//! `on_event`).

use crate::config::{MAX_SCENES, MAX_SCENE_DEPTH};
use crate::error::Error;
use heapless::Vec;

/// Closed, dense set of scenes. `index` must map onto `0..COUNT`.
pub trait SceneId: Copy + Eq + core::fmt::Debug {
    const COUNT: usize;

    fn index(self) -> usize;
}

/// Event delivered to a scene's `on_event`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SceneEvent {
    /// Application-defined event value.
    Custom(u32),
    /// Back / navigation request.
    Back,
    /// Periodic tick from the dispatcher.
    Tick,
}

/// Handler triple registered for one scene.
pub struct SceneHandlerSet<A> {
    pub on_enter: fn(&mut A),
    pub on_event: fn(&mut A, SceneEvent) -> bool,
    pub on_exit: fn(&mut A),
}

impl<A> Clone for SceneHandlerSet<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for SceneHandlerSet<A> {}

/// An application driven by a [`SceneManager`].
pub trait SceneApp: Sized {
    type Scene: SceneId;

    fn scene_manager(&self) -> &SceneManager<Self>;
    fn scene_manager_mut(&mut self) -> &mut SceneManager<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ManagerState {
    Idle,
    Active,
    Terminated,
}

pub struct SceneManager<A: SceneApp> {
    handlers: Vec<SceneHandlerSet<A>, MAX_SCENES>,
    stack: Vec<A::Scene, MAX_SCENE_DEPTH>,
    scene_state: [u32; MAX_SCENES],
    state: ManagerState,
}

impl<A: SceneApp> SceneManager<A> {
    /// Build a controller from a table indexed by `SceneId::index`.
    pub fn new(handlers: &[SceneHandlerSet<A>]) -> Result<Self, Error> {
        let expected = <A::Scene as SceneId>::COUNT;
        let invalid = Error::InvalidSceneTable {
            expected,
            got: handlers.len(),
        };
        if handlers.len() != expected {
            return Err(invalid);
        }
        let handlers = Vec::from_slice(handlers).map_err(|_| invalid)?;

        Ok(Self {
            handlers,
            stack: Vec::new(),
            scene_state: [0; MAX_SCENES],
            state: ManagerState::Idle,
        })
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    /// Active scene, `None` unless the controller is `Active`.
    pub fn current_scene(&self) -> Option<A::Scene> {
        match self.state {
            ManagerState::Active => self.stack.last().copied(),
            _ => None,
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether `scene` sits somewhere below the active scene.
    pub fn has_previous_scene(&self, scene: A::Scene) -> bool {
        match self.stack.split_last() {
            Some((_, below)) => below.contains(&scene),
            None => false,
        }
    }

    pub fn get_scene_state(&self, scene: A::Scene) -> u32 {
        self.scene_state[scene.index()]
    }

    pub fn set_scene_state(&mut self, scene: A::Scene, state: u32) {
        self.scene_state[scene.index()] = state;
    }

    fn handlers_for(&self, scene: A::Scene) -> SceneHandlerSet<A> {
        self.handlers[scene.index()]
    }
}

/// Push `initial` onto the empty stack and enter it.
pub fn start<A: SceneApp>(app: &mut A, initial: A::Scene) -> Result<(), Error> {
    let manager = app.scene_manager_mut();
    if manager.state != ManagerState::Idle {
        return Err(Error::AlreadyStarted);
    }
    manager
        .stack
        .push(initial)
        .map_err(|_| Error::SceneStackFull)?;
    manager.state = ManagerState::Active;

    let on_enter = manager.handlers_for(initial).on_enter;
    on_enter(app);
    Ok(())
}

fn deliver<A: SceneApp>(app: &mut A, event: SceneEvent) -> bool {
    let manager = app.scene_manager();
    let Some(scene) = manager.current_scene() else {
        return false;
    };
    let on_event = manager.handlers_for(scene).on_event;
    on_event(app, event)
}

/// Forward a custom event. Declined events have no default action.
pub fn handle_custom_event<A: SceneApp>(app: &mut A, event: u32) -> bool {
    deliver(app, SceneEvent::Custom(event))
}

/// Forward a back event; if the scene declines it, go to the previous scene.
pub fn handle_back_event<A: SceneApp>(app: &mut A) -> bool {
    if app.scene_manager().current_scene().is_none() {
        return false;
    }
    if deliver(app, SceneEvent::Back) {
        return true;
    }
    previous_scene(app)
}

pub fn handle_tick_event<A: SceneApp>(app: &mut A) {
    deliver(app, SceneEvent::Tick);
}

/// Exit the active scene, then push and enter `scene`.
pub fn next_scene<A: SceneApp>(app: &mut A, scene: A::Scene) -> Result<(), Error> {
    let manager = app.scene_manager();
    let current = manager.current_scene().ok_or(Error::NotRunning)?;
    if manager.stack.is_full() {
        return Err(Error::SceneStackFull);
    }
    let on_exit = manager.handlers_for(current).on_exit;
    on_exit(app);

    // on_exit may have stopped us.
    let manager = app.scene_manager_mut();
    if manager.state != ManagerState::Active {
        return Err(Error::NotRunning);
    }
    manager
        .stack
        .push(scene)
        .map_err(|_| Error::SceneStackFull)?;
    let on_enter = manager.handlers_for(scene).on_enter;
    on_enter(app);
    Ok(())
}

/// Pop back one scene.
///
/// On the last scene this stops the controller and returns `false`.
pub fn previous_scene<A: SceneApp>(app: &mut A) -> bool {
    let manager = app.scene_manager();
    let Some(current) = manager.current_scene() else {
        return false;
    };
    if manager.stack.len() < 2 {
        stop(app);
        return false;
    }
    let on_exit = manager.handlers_for(current).on_exit;
    on_exit(app);

    let manager = app.scene_manager_mut();
    if manager.state != ManagerState::Active {
        return false;
    }
    manager.stack.pop();
    let Some(top) = manager.stack.last().copied() else {
        return false;
    };
    let on_enter = manager.handlers_for(top).on_enter;
    on_enter(app);
    true
}

/// Unwind to the nearest occurrence of `scene` below the active one.
pub fn search_and_switch_to_previous_scene<A: SceneApp>(app: &mut A, scene: A::Scene) -> bool {
    let manager = app.scene_manager();
    let Some(current) = manager.current_scene() else {
        return false;
    };
    let Some((_, below)) = manager.stack.split_last() else {
        return false;
    };
    let Some(position) = below.iter().rposition(|s| *s == scene) else {
        return false;
    };
    let on_exit = manager.handlers_for(current).on_exit;
    on_exit(app);

    let manager = app.scene_manager_mut();
    if manager.state != ManagerState::Active {
        return false;
    }
    manager.stack.truncate(position + 1);
    let on_enter = manager.handlers_for(scene).on_enter;
    on_enter(app);
    true
}

/// Terminate: exit the active scene once and drop the stack.
pub fn stop<A: SceneApp>(app: &mut A) {
    let manager = app.scene_manager_mut();
    let previous = manager.state;
    manager.state = ManagerState::Terminated;
    if previous != ManagerState::Active {
        return;
    }
    let top = manager.stack.last().copied();
    manager.stack.clear();
    if let Some(scene) = top {
        let on_exit = manager.handlers_for(scene).on_exit;
        on_exit(app);
    }
}
