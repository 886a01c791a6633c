//! Submenu widget - a vertical list of labelled items.
//!
//! Each item carries an id and a callback. The widget never calls the
//! callback itself: activating an item hands `(id, callback)` back to the
//! caller, which owns the application state the callback needs.

use crate::config::{MAX_MENU_ITEMS, MENU_LABEL_LEN};
use crate::error::Error;
use crate::ui::input_logic::{select_next, select_prev};
use crate::ui::InputKey;
use heapless::{String, Vec};

/// Invoked with the application and the activated item id.
pub type MenuCallback<A> = fn(&mut A, u32);

struct MenuItem<A> {
    label: String<MENU_LABEL_LEN>,
    id: u32,
    callback: MenuCallback<A>,
}

/// Outcome of feeding a key to the submenu.
pub enum SubmenuInput<A> {
    /// Cursor moved (or nothing to move); nothing else to do.
    Consumed,
    /// The selected item was activated.
    Activated { id: u32, callback: MenuCallback<A> },
    /// The key is not for the submenu (Back).
    NotConsumed,
}

pub struct Submenu<A> {
    items: Vec<MenuItem<A>, MAX_MENU_ITEMS>,
    selected: usize,
}

impl<A> Submenu<A> {
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
        }
    }

    /// Append an item. Labels longer than `MENU_LABEL_LEN` are truncated.
    pub fn add_item(&mut self, label: &str, id: u32, callback: MenuCallback<A>) -> Result<(), Error> {
        self.items
            .push(MenuItem {
                label: truncated(label),
                id,
                callback,
            })
            .map_err(|_| Error::MenuFull)
    }

    /// Remove all items, cursor back to the top.
    pub fn reset(&mut self) {
        self.items.clear();
        self.selected = 0;
    }

    /// Move the cursor to the item with `id`; unknown ids leave it alone.
    pub fn set_selected_item(&mut self, id: u32) {
        if let Some(index) = self.items.iter().position(|item| item.id == id) {
            self.selected = index;
        }
    }

    /// Id of the item under the cursor.
    pub fn selected_item(&self) -> Option<u32> {
        self.items.get(self.selected).map(|item| item.id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render model of the widget.
    pub fn get_view(&self) -> MenuView<'_, A> {
        MenuView { submenu: self }
    }

    pub fn process_input(&mut self, key: InputKey) -> SubmenuInput<A> {
        match key {
            InputKey::Up => {
                self.selected = select_prev(self.selected, self.items.len());
                SubmenuInput::Consumed
            }
            InputKey::Down => {
                self.selected = select_next(self.selected, self.items.len());
                SubmenuInput::Consumed
            }
            InputKey::Ok => match self.items.get(self.selected) {
                Some(item) => SubmenuInput::Activated {
                    id: item.id,
                    callback: item.callback,
                },
                None => SubmenuInput::Consumed,
            },
            InputKey::Back => SubmenuInput::NotConsumed,
        }
    }
}

impl<A> Default for Submenu<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed snapshot the display renders from.
pub struct MenuView<'a, A> {
    submenu: &'a Submenu<A>,
}

impl<'a, A> MenuView<'a, A> {
    pub fn labels(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.submenu.items.iter().map(|item| item.label.as_str())
    }

    pub fn selected(&self) -> usize {
        self.submenu.selected
    }

    pub fn len(&self) -> usize {
        self.submenu.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submenu.items.is_empty()
    }
}

fn truncated(text: &str) -> String<MENU_LABEL_LEN> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        activated: std::vec::Vec<u32>,
    }

    fn record(app: &mut Counter, id: u32) {
        app.activated.push(id);
    }

    fn menu_with(labels: &[&str]) -> Submenu<Counter> {
        let mut menu = Submenu::new();
        for (id, label) in labels.iter().enumerate() {
            menu.add_item(label, id as u32, record).unwrap();
        }
        menu
    }

    #[test]
    fn add_and_reset() {
        let mut menu = menu_with(&["One", "Two"]);
        assert_eq!(menu.len(), 2);

        menu.reset();
        assert!(menu.is_empty());
        assert_eq!(menu.selected_item(), None);
    }

    #[test]
    fn capacity_is_bounded() {
        let mut menu: Submenu<Counter> = Submenu::new();
        for id in 0..MAX_MENU_ITEMS as u32 {
            menu.add_item("item", id, record).unwrap();
        }
        assert_eq!(menu.add_item("extra", 99, record), Err(Error::MenuFull));
        assert_eq!(menu.len(), MAX_MENU_ITEMS);
    }

    #[test]
    fn long_labels_are_truncated() {
        let long = "abcdefghijklmnopqrstuvwxyz0123456789";
        let menu = menu_with(&[long]);
        let label = menu.get_view().labels().next().unwrap();
        assert_eq!(label.len(), MENU_LABEL_LEN);
        assert!(long.starts_with(label));
    }

    #[test]
    fn ok_activates_selected_item() {
        let mut menu = menu_with(&["One", "Two", "Three"]);
        assert!(matches!(menu.process_input(InputKey::Down), SubmenuInput::Consumed));

        let mut app = Counter::default();
        match menu.process_input(InputKey::Ok) {
            SubmenuInput::Activated { id, callback } => callback(&mut app, id),
            _ => panic!("expected activation"),
        }
        assert_eq!(app.activated, [1]);
    }

    #[test]
    fn up_wraps_to_last_item() {
        let mut menu = menu_with(&["One", "Two", "Three"]);
        menu.process_input(InputKey::Up);
        assert_eq!(menu.get_view().selected(), 2);
        assert_eq!(menu.selected_item(), Some(2));
    }

    #[test]
    fn back_is_not_consumed() {
        let mut menu = menu_with(&["One"]);
        assert!(matches!(
            menu.process_input(InputKey::Back),
            SubmenuInput::NotConsumed
        ));
    }

    #[test]
    fn ok_on_empty_menu_does_nothing() {
        let mut menu: Submenu<Counter> = Submenu::new();
        assert!(matches!(menu.process_input(InputKey::Ok), SubmenuInput::Consumed));
    }

    #[test]
    fn set_selected_item_ignores_unknown_ids() {
        let mut menu = menu_with(&["One", "Two"]);
        menu.set_selected_item(1);
        assert_eq!(menu.selected_item(), Some(1));
        menu.set_selected_item(42);
        assert_eq!(menu.selected_item(), Some(1));
    }
}
