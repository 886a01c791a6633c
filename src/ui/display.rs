//! SSD1306 OLED display wrapper.

use crate::ui::input_logic::scroll_offset;
use crate::ui::MenuView;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

/// Menu rows below the header on a 64 px panel.
const MENU_ROWS: usize = 4;

/// Type alias for the concrete display driver.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Initialise the SSD1306 display and clear the screen.
pub fn init<I2C>(i2c: I2C) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    let _ = display.init();
    display.clear_buffer();
    let _ = display.flush();
    display
}

fn text_style() -> embedded_graphics::mono_font::MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

/// Render a submenu: `title` and a scrolling item list.
pub fn draw_menu<I2C, A>(display: &mut Display<I2C>, title: &str, menu: &MenuView<'_, A>)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let _ = Text::new(title, Point::new(0, 10), text_style()).draw(display);

    let first = scroll_offset(menu.selected(), menu.len(), MENU_ROWS);
    for (row, label) in menu.labels().skip(first).take(MENU_ROWS).enumerate() {
        let marker = if first + row == menu.selected() { ">" } else { " " };
        let mut line: heapless::String<36> = heapless::String::new();
        let _ = line.push_str(marker);
        let _ = line.push_str(" ");
        let _ = line.push_str(label);
        let y = 24 + (row as i32 * 10);
        let _ = Text::new(line.as_str(), Point::new(0, y), text_style()).draw(display);
    }

    let _ = display.flush();
}

/// Blank the panel once the application has closed.
pub fn clear<I2C>(display: &mut Display<I2C>)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();
    let _ = display.flush();
}

/// Render a fatal error message.
pub fn draw_error<I2C>(display: &mut Display<I2C>, message: &str)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let _ = Text::new("ERROR", Point::new(0, 10), text_style()).draw(display);
    let _ = Text::new(message, Point::new(0, 30), text_style()).draw(display);

    let _ = display.flush();
}
