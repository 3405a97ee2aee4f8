// SPDX-License-Identifier: MIT
//
// tc-term demo — a key viewer that exercises the whole surface.
//
// A bordered window sits in the middle of the screen and shows the last
// key the parser produced. Resize the terminal to watch the surface tear
// down and come back; press q (or Ctrl-C) to quit.
//
// Usage:
//   cargo run -p tc-term --example demo

use std::time::Duration;

use tc_term::cell::{Attr, Pen};
use tc_term::color::{AnsiColor, CellColor};
use tc_term::surface::{Poll, Screen, Surface};
use tc_term::window::{BorderGlyphs, Window};

const WIDTH: u16 = 40;
const HEIGHT: u16 = 5;

fn place(window: &mut Window, surface: &Screen) {
    let size = surface.size();
    window.move_to(
        size.rows.saturating_sub(HEIGHT) / 2,
        size.cols.saturating_sub(WIDTH) / 2,
    );
}

fn draw(window: &Window, surface: &mut Screen, line: &str) {
    let frame = surface.frame_mut();
    let border = Pen::new(CellColor::from(AnsiColor::Cyan), CellColor::Default);
    let text = Pen::new(CellColor::from(AnsiColor::Green), CellColor::Default).with_attrs(Attr::BOLD);

    window.erase(frame, Pen::PLAIN);
    window.draw_border(frame, border, BorderGlyphs::LINE);
    window.print(frame, 1, 2, "tc-term demo (q quits)", Pen::PLAIN);
    window.print(frame, 3, 2, line, text);
}

fn main() -> std::io::Result<()> {
    let mut surface = Screen::open()?;
    let mut window = Window::new(0, 0, HEIGHT, WIDTH);
    let mut line = String::from("press a key");

    place(&mut window, &surface);

    while !surface.stop_requested() {
        draw(&window, &mut surface, &line);
        surface.present()?;

        match surface.poll(Duration::from_secs(1))? {
            Poll::Key(key) if key.is_ctrl('c') => break,
            Poll::Key(key) if key.code == tc_term::input::KeyCode::Char('q') => break,
            Poll::Key(key) => line = format!("{key:?}"),
            Poll::Resize => {
                let size = surface.reinit()?;
                place(&mut window, &surface);
                line = format!("resized to {}x{}", size.cols, size.rows);
            }
            Poll::Timeout => {}
        }
    }

    Ok(())
}
