// SPDX-License-Identifier: MIT
//
// tc-term — the drawing surface underneath tty-clock.
//
// A small terminal backend: raw termios, an alternate screen, a persistent
// cell grid that behaves like a stack of curses windows, and a differential
// renderer that only touches the cells a tick actually changed. Keys arrive
// through a background stdin reader and a byte-level parser.
//
// Nothing in here knows about clocks. The clock core talks to the terminal
// exclusively through the `Surface` trait, which has a real implementation
// (`Screen`) and an in-memory one (`Headless`) for tests.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod diff;
pub mod input;
pub mod output;
pub mod reader;
pub mod surface;
pub mod terminal;
pub mod window;
