//! Frame composer.
//!
//! Each tick the composer looks at the state and produces a [`RenderPlan`]:
//! whether the windows have to be moved, and what to draw inside them.
//! Painting the plan onto the frame buffer is a separate step so the plan
//! itself can be inspected.
//!
//! The frame buffer persists between ticks, so a move is a full
//! reposition: the windows' old areas are erased with the `Blank` pen
//! (borders included), the windows are placed at the new layout, blanked,
//! and their borders redrawn if boxed. Without a move only the digits,
//! separators and date text are painted, and the differential renderer
//! turns an unchanged tick into zero output.
//!
//! Frame layout, window-relative:
//!
//! ```text
//!   col   1      8       16  20     27      35  39     46
//!   row 1 [HH]   [HH]        [MM]   [MM]        [SS]   [SS]
//!   row 2                ##                 ##
//!   row 4                ##                 ##
//! ```

use tc_term::buffer::{FrameBuffer, string_width};
use tc_term::cell::{Attr, Pen};
use tc_term::window::{BorderGlyphs, Window};
use tracing::debug;

use crate::render::{GlyphPens, draw_digit};
use crate::state::{ClockState, DATE_HEIGHT, FRAME_HEIGHT, Mode, Role};

/// Row every digit starts on.
pub const DIGIT_ROW: u16 = 1;

/// Columns of the hour, minute and second digits.
pub const HOUR_COLS: [u16; 2] = [1, 8];
pub const MINUTE_COLS: [u16; 2] = [20, 27];
pub const SECOND_COLS: [u16; 2] = [39, 46];

/// Rows of the two separator dots.
pub const SEPARATOR_ROWS: [u16; 2] = [2, 4];

/// Column of the hour/minute separator.
pub const MINUTE_SEPARATOR_COL: u16 = 16;

/// Column of the minute/second separator.
pub const SECOND_SEPARATOR_COL: u16 = 35;

const SEPARATOR: &str = "  ";

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Where the windows are and how they are decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub frame: Window,
    /// The date window, when the date is shown.
    pub date: Option<Window>,
    pub boxed: bool,
}

impl Layout {
    /// The layout `state` calls for right now.
    #[must_use]
    pub fn of(state: &ClockState) -> Self {
        let frame = Window::new(
            state.position.row,
            state.position.col,
            FRAME_HEIGHT,
            state.width(),
        );
        Self {
            frame,
            date: state.has(Mode::DATE).then(|| date_window(&frame, &state.date)),
            boxed: state.has(Mode::BOX),
        }
    }

    /// Blank the borders if boxed, then the windows' whole areas.
    fn erase(&self, screen: &mut FrameBuffer, blank: Pen) {
        let windows = std::iter::once(self.frame).chain(self.date);
        for window in windows {
            if self.boxed {
                window.draw_border(screen, blank, BorderGlyphs::BLANK);
            }
            window.erase(screen, blank);
        }
    }

    /// Blank the windows at their new place and draw borders if boxed.
    fn open(&self, screen: &mut FrameBuffer, blank: Pen) {
        self.erase(screen, blank);
        if !self.boxed {
            return;
        }
        self.frame.draw_border(screen, blank, BorderGlyphs::LINE);
        if let Some(date) = self.date {
            date.draw_border(screen, blank, BorderGlyphs::LINE);
        }
    }
}

/// The date window for `text` under `frame`: overlapping the frame's
/// bottom row, roughly centered, one cell of padding each side.
#[must_use]
pub fn date_window(frame: &Window, text: &str) -> Window {
    let len = i32::try_from(string_width(text)).unwrap_or(i32::MAX / 4);
    let col = i32::from(frame.col()) + i32::from(frame.width()) / 2 - (len / 2 - 1);
    let col = u16::try_from(col.max(0)).unwrap_or(u16::MAX);
    let width = u16::try_from(len + 2).unwrap_or(u16::MAX);
    Window::new(
        frame.row().saturating_add(frame.height() - 1),
        col,
        DATE_HEIGHT,
        width,
    )
}

// ---------------------------------------------------------------------------
// RenderPlan
// ---------------------------------------------------------------------------

/// One thing to draw inside the current layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    /// A digit glyph at frame column `col`.
    Digit { col: u16, value: u8 },
    /// A separator pair at frame column `col`, painted in `role`'s pen.
    Separator { col: u16, role: Role },
    /// The date line inside the date window.
    Date(String),
}

/// Moving the windows from one layout to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reposition {
    /// What to erase first; `None` when nothing was placed yet.
    pub from: Option<Layout>,
    pub to: Layout,
}

/// Everything one tick paints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    pub reposition: Option<Reposition>,
    pub layout: Layout,
    pub ops: Vec<DrawOp>,
}

impl RenderPlan {
    /// Apply the plan to `screen` using `state`'s colors and attributes.
    pub fn paint(&self, screen: &mut FrameBuffer, state: &ClockState) {
        let blank = state.pen(Role::Blank);
        if let Some(reposition) = &self.reposition {
            if let Some(from) = &reposition.from {
                from.erase(screen, blank);
            }
            reposition.to.open(screen, blank);
        }

        let attrs = state.glyph_attrs();
        let pens = GlyphPens {
            lit: state.pen(Role::Block),
            unlit: blank,
        }
        .with_attrs(attrs);
        let frame = &self.layout.frame;

        for op in &self.ops {
            match op {
                DrawOp::Digit { col, value } => {
                    draw_digit(screen, frame, *value, DIGIT_ROW, *col, pens);
                }
                DrawOp::Separator { col, role } => {
                    let pen = state.pen(*role).with_attrs(attrs);
                    for row in SEPARATOR_ROWS {
                        frame.print(screen, row, *col, SEPARATOR, pen);
                    }
                }
                DrawOp::Date(text) => {
                    if let Some(window) = &self.layout.date {
                        let bold = if state.has(Mode::BOLD) { Attr::BOLD } else { Attr::empty() };
                        window.print(screen, 1, 1, text, state.pen(Role::Text).with_attrs(bold));
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

/// Remembers what is on screen between ticks.
#[derive(Debug, Default)]
pub struct Composer {
    placed: Option<Layout>,
    placed_date: Option<String>,
    repositions: usize,
}

impl Composer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget what is on screen. The next tick places the windows without
    /// erasing anything, as after the surface was rebuilt.
    pub fn invalidate(&mut self) {
        self.placed = None;
        self.placed_date = None;
    }

    /// How many repositions have been planned so far.
    #[must_use]
    pub const fn repositions(&self) -> usize {
        self.repositions
    }

    /// Plan this tick.
    ///
    /// The windows are repositioned when the layout differs from the one on
    /// screen, when the state asked for it, or when the date line changed
    /// while shown and not rebounding. At most once per tick. The date is
    /// compared with the one painted by the previous tick, so ticking twice
    /// without a refresh plans nothing new.
    pub fn tick(&mut self, state: &mut ClockState) -> RenderPlan {
        let layout = Layout::of(state);
        let requested = state.take_reposition();
        let date_moved = state.has(Mode::DATE)
            && !state.has(Mode::REBOUND)
            && self.placed_date.as_deref().is_some_and(|date| date != state.date);

        let reposition = (self.placed != Some(layout) || requested || date_moved).then(|| Reposition {
            from: self.placed,
            to: layout,
        });
        if reposition.is_some() {
            self.repositions += 1;
            debug!(
                row = layout.frame.row(),
                col = layout.frame.col(),
                width = layout.frame.width(),
                boxed = layout.boxed,
                "reposition"
            );
        }
        self.placed = Some(layout);
        if self.placed_date.as_deref() != Some(state.date.as_str()) {
            self.placed_date = Some(state.date.clone());
        }

        RenderPlan {
            reposition,
            layout,
            ops: draw_ops(state),
        }
    }
}

/// Hours, separator, minutes, then seconds and their separator if shown,
/// then the date line if shown.
fn draw_ops(state: &ClockState) -> Vec<DrawOp> {
    let separator = if state.has(Mode::BLINK) && state.unix_seconds.rem_euclid(2) == 0 {
        Role::Text
    } else {
        Role::Block
    };
    let digits = &state.digits;
    let pair = |cols: [u16; 2], values: [u8; 2]| {
        cols.into_iter()
            .zip(values)
            .map(|(col, value)| DrawOp::Digit { col, value })
    };

    let mut ops: Vec<DrawOp> = pair(HOUR_COLS, digits.hour).collect();
    ops.push(DrawOp::Separator {
        col: MINUTE_SEPARATOR_COL,
        role: separator,
    });
    ops.extend(pair(MINUTE_COLS, digits.minute));
    if state.has(Mode::SECONDS) {
        ops.push(DrawOp::Separator {
            col: SECOND_SEPARATOR_COL,
            role: separator,
        });
        ops.extend(pair(SECOND_COLS, digits.second));
    }
    if state.has(Mode::DATE) {
        ops.push(DrawOp::Date(state.date.clone()));
    }
    ops
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Move, move_by};
    use crate::options::ClockOptions;
    use crate::state::Position;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use tc_term::color::CellColor;
    use tc_term::terminal::Size;

    fn at(d: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, m, s).unwrap()
    }

    fn state(options: ClockOptions) -> ClockState {
        let mut s = ClockState::new(&ClockOptions {
            use_utc: true,
            ..options
        });
        s.position = Position::new(2, 3);
        s.refresh_time(at(1, 12, 34, 56));
        s
    }

    #[test]
    fn date_window_sits_on_the_frame_bottom() {
        let frame = Window::new(2, 3, 7, 35);
        let win = date_window(&frame, "2024-01-01");
        assert_eq!(win, Window::new(8, 3 + 17 - 4, 3, 12));
    }

    #[test]
    fn date_window_never_goes_left_of_zero() {
        let frame = Window::new(0, 0, 7, 35);
        let win = date_window(&frame, &"x".repeat(80));
        assert_eq!(win.col(), 0);
        assert_eq!(win.width(), 82);
    }

    #[test]
    fn ops_in_drawing_order() {
        let mut s = state(ClockOptions::default());
        let plan = Composer::new().tick(&mut s);
        assert_eq!(
            plan.ops,
            vec![
                DrawOp::Digit { col: 1, value: 1 },
                DrawOp::Digit { col: 8, value: 2 },
                DrawOp::Separator { col: 16, role: Role::Block },
                DrawOp::Digit { col: 20, value: 3 },
                DrawOp::Digit { col: 27, value: 4 },
                DrawOp::Date("2024-01-01".to_string()),
            ]
        );
    }

    #[test]
    fn seconds_add_a_separator_and_two_digits() {
        let mut s = state(ClockOptions {
            show_seconds: true,
            hide_date: true,
            ..ClockOptions::default()
        });
        let ops = Composer::new().tick(&mut s).ops;
        assert_eq!(
            &ops[5..],
            &[
                DrawOp::Separator { col: 35, role: Role::Block },
                DrawOp::Digit { col: 39, value: 5 },
                DrawOp::Digit { col: 46, value: 6 },
            ]
        );
    }

    #[test]
    fn blinking_separator_alternates_each_second() {
        let mut s = state(ClockOptions {
            blink_colon: true,
            ..ClockOptions::default()
        });
        let mut composer = Composer::new();
        let roles: Vec<_> = (0..2)
            .map(|i| {
                s.refresh_time(at(1, 0, 0, i));
                composer.tick(&mut s).ops[2].clone()
            })
            .collect();
        assert_eq!(
            roles,
            vec![
                DrawOp::Separator { col: 16, role: Role::Text },
                DrawOp::Separator { col: 16, role: Role::Block },
            ]
        );
    }

    #[test]
    fn first_tick_places_without_erasing() {
        let mut s = state(ClockOptions::default());
        let plan = Composer::new().tick(&mut s);
        let reposition = plan.reposition.unwrap();
        assert_eq!(reposition.from, None);
        assert_eq!(reposition.to, plan.layout);
    }

    #[test]
    fn unchanged_ticks_do_not_reposition() {
        let mut s = state(ClockOptions::default());
        let mut composer = Composer::new();
        composer.tick(&mut s);
        for sec in 0..5 {
            s.refresh_time(at(1, 10, 0, sec));
            assert_eq!(composer.tick(&mut s).reposition, None);
        }
        assert_eq!(composer.repositions(), 1);
    }

    #[test]
    fn date_change_repositions_exactly_once() {
        let mut s = state(ClockOptions::default());
        let mut composer = Composer::new();
        s.refresh_time(at(1, 23, 59, 59));
        composer.tick(&mut s);
        s.refresh_time(at(1, 23, 59, 59));
        assert!(composer.tick(&mut s).reposition.is_none());

        s.refresh_time(at(2, 0, 0, 0));
        assert_eq!(s.previous_date, "2024-01-01");
        assert!(composer.tick(&mut s).reposition.is_some());

        s.refresh_time(at(2, 0, 0, 1));
        assert!(composer.tick(&mut s).reposition.is_none());
        assert_eq!(composer.repositions(), 2);
    }

    #[test]
    fn moving_erases_the_old_place() {
        let mut s = state(ClockOptions::default());
        let mut composer = Composer::new();
        let mut screen = FrameBuffer::new(80, 24);
        composer.tick(&mut s).paint(&mut screen, &s);
        let lit = screen.cells().iter().filter(|c| c.bg == CellColor::Ansi256(2)).count();
        // The hour tens digit is a 1: its stroke covers screen columns 8 and 9.
        assert_eq!(screen.get(8, 3).unwrap().bg, CellColor::Ansi256(2));

        move_by(&mut s, Move::Right, Size::new(80, 24));
        let plan = composer.tick(&mut s);
        assert_eq!(plan.reposition.unwrap().from.unwrap().frame.col(), 3);
        plan.paint(&mut screen, &s);

        let after = screen.cells().iter().filter(|c| c.bg == CellColor::Ansi256(2)).count();
        assert_eq!(lit, after);
        // Shifted one column right, the stroke now covers 9 and 10.
        assert!(screen.get(8, 3).unwrap().bg.is_default());
        assert_eq!(screen.get(10, 3).unwrap().bg, CellColor::Ansi256(2));
    }

    #[test]
    fn box_toggle_draws_and_erases_borders() {
        let mut s = state(ClockOptions {
            hide_date: true,
            ..ClockOptions::default()
        });
        let mut composer = Composer::new();
        let mut screen = FrameBuffer::new(60, 12);

        s.toggle(Mode::BOX);
        composer.tick(&mut s).paint(&mut screen, &s);
        assert_eq!(screen.get(3, 2).unwrap().character(), Some('┌'));
        assert_eq!(screen.get(37, 8).unwrap().character(), Some('┘'));

        s.toggle(Mode::BOX);
        let plan = composer.tick(&mut s);
        assert!(plan.reposition.is_some());
        plan.paint(&mut screen, &s);
        assert_eq!(screen.get(3, 2).unwrap().character(), Some(' '));
    }

    #[test]
    fn moving_a_boxed_clock_leaves_no_border_behind() {
        let mut s = state(ClockOptions {
            show_box: true,
            hide_date: true,
            ..ClockOptions::default()
        });
        let mut composer = Composer::new();
        let mut screen = FrameBuffer::new(60, 12);
        composer.tick(&mut s).paint(&mut screen, &s);
        assert_eq!(screen.get(3, 2).unwrap().character(), Some('┌'));

        move_by(&mut s, Move::Right, Size::new(60, 12));
        composer.tick(&mut s).paint(&mut screen, &s);
        assert_eq!(screen.get(3, 2).unwrap().character(), Some(' '));
        assert_eq!(screen.get(3, 8).unwrap().character(), Some(' '));
        assert_eq!(screen.get(4, 2).unwrap().character(), Some('┌'));
        assert_eq!(screen.get(38, 8).unwrap().character(), Some('┘'));
    }

    #[test]
    fn date_text_in_accent_and_bold() {
        let mut s = state(ClockOptions {
            bold: true,
            ..ClockOptions::default()
        });
        let mut screen = FrameBuffer::new(80, 24);
        Composer::new().tick(&mut s).paint(&mut screen, &s);

        let win = date_window(&Window::new(2, 3, 7, 35), "2024-01-01");
        let first = screen.get(win.col() + 1, win.row() + 1).unwrap();
        assert_eq!(first.character(), Some('2'));
        assert_eq!(first.fg, CellColor::Ansi256(2));
        assert_eq!(first.attrs, Attr::BOLD);
        assert!(screen.row_text(win.row() + 1).contains("2024-01-01"));
    }

    #[test]
    fn glyph_cells_blink_in_bold_mode() {
        let mut s = state(ClockOptions {
            bold: true,
            hide_date: true,
            ..ClockOptions::default()
        });
        let mut screen = FrameBuffer::new(80, 24);
        Composer::new().tick(&mut s).paint(&mut screen, &s);
        // Hour tens digit 1: top-right segment at frame (1, 1 + 4).
        let cell = screen.get(3 + 5, 2 + 1).unwrap();
        assert_eq!(cell.bg, CellColor::Ansi256(2));
        assert_eq!(cell.attrs, Attr::SLOW_BLINK);
    }

    #[test]
    fn invalidate_forces_placement_without_erase() {
        let mut s = state(ClockOptions::default());
        let mut composer = Composer::new();
        composer.tick(&mut s);
        composer.invalidate();
        let reposition = composer.tick(&mut s).reposition.unwrap();
        assert_eq!(reposition.from, None);
    }

    #[test]
    fn requested_reposition_happens_once() {
        let mut s = state(ClockOptions::default());
        let mut composer = Composer::new();
        composer.tick(&mut s);
        s.request_reposition();
        assert!(composer.tick(&mut s).reposition.is_some());
        assert!(composer.tick(&mut s).reposition.is_none());
    }

    #[test]
    fn ticking_without_refresh_plans_no_new_reposition() {
        let mut s = state(ClockOptions::default());
        let mut composer = Composer::new();
        s.refresh_time(at(2, 0, 0, 0));
        composer.tick(&mut s);
        composer.tick(&mut s);
        composer.tick(&mut s);
        assert_eq!(composer.repositions(), 1);
    }

    #[test]
    fn date_change_while_rebounding_follows_the_layout_only() {
        let mut s = state(ClockOptions {
            rebound: true,
            ..ClockOptions::default()
        });
        let mut composer = Composer::new();
        composer.tick(&mut s);
        s.refresh_time(at(2, 0, 0, 0));
        assert!(composer.tick(&mut s).reposition.is_none());
    }
}
