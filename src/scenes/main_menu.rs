//! Main menu scene: a single "Start memes" entry.
//!
//! Activating any entry currently ends the application through the back
//! path; the entry is a placeholder for the meme sender.

use crate::app::{App, Platform};
use crate::log::Level;
use crate::scene::{self, SceneApp, SceneEvent};
use crate::scenes::AppScene;
use crate::ui::{ViewDispatcher, ViewId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum MainMenuItem {
    SelectAnime = 0,
}

impl MainMenuItem {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::SelectAnime),
            _ => None,
        }
    }
}

pub fn on_enter<P: Platform>(app: &mut App<P>) {
    app.log(Level::Info, format_args!("STARTING main menu scene"));

    let added = app.main_menu_mut().add_item(
        "Start memes",
        MainMenuItem::SelectAnime as u32,
        menu_callback::<P>,
    );
    if let Err(e) = added {
        app.log(Level::Error, format_args!("Main menu: {}", e));
    }

    let last = app.scene_manager().get_scene_state(AppScene::MainMenu);
    app.main_menu_mut().set_selected_item(last);
    app.dispatcher_mut().switch_to_view(ViewId::MainMenu);
}

pub fn on_event<P: Platform>(app: &mut App<P>, event: SceneEvent) -> bool {
    match event {
        SceneEvent::Back => {
            app.dispatcher_mut().stop();
            scene::stop(app);
            true
        }
        SceneEvent::Custom(_) | SceneEvent::Tick => false,
    }
}

pub fn on_exit<P: Platform>(app: &mut App<P>) {
    app.main_menu_mut().reset();
    app.log(Level::Info, format_args!("Closing main menu scene"));
}

pub fn menu_callback<P: Platform>(app: &mut App<P>, id: u32) {
    match MainMenuItem::from_id(id) {
        Some(MainMenuItem::SelectAnime) => {
            app.log(Level::Info, format_args!("Starting memes"));
        }
        None => {
            app.log(Level::Error, format_args!("Unknown menu item selected: {}", id));
        }
    }
    app.scene_manager_mut().set_scene_state(AppScene::MainMenu, id);
    scene::handle_back_event(app);
}
