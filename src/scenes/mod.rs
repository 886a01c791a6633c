//! Scene table of the application.

pub mod main_menu;

use crate::app::{App, Platform};
use crate::scene::{SceneHandlerSet, SceneId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppScene {
    MainMenu,
}

impl SceneId for AppScene {
    const COUNT: usize = 1;

    fn index(self) -> usize {
        self as usize
    }
}

/// Handlers indexed by `AppScene::index`.
pub fn handlers<P: Platform>() -> [SceneHandlerSet<App<P>>; AppScene::COUNT] {
    [SceneHandlerSet {
        on_enter: main_menu::on_enter::<P>,
        on_event: main_menu::on_event::<P>,
        on_exit: main_menu::on_exit::<P>,
    }]
}
