use crate::canvas::Canvas;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyModifiers},
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    execute,
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Upper half block: foreground paints the top pixel, background the bottom
const HALF_BLOCK: char = '▀';

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    /// What is currently on screen, for diffing in `present`
    shown: Vec<Vec<Cell>>,
}

/// A single cell in the terminal buffer
#[derive(Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
        }
    }
}

/// Terminal input the roots view reacts to
pub enum Input {
    Key(KeyCode, KeyModifiers),
    Resize(u16, u16),
}

impl Terminal {
    /// Enter the alternate screen in raw mode
    pub fn new() -> io::Result<Self> {
        let (width, height) = size()?;

        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide)?;

        Ok(Self {
            width,
            height,
            buffer: blank(width, height),
            shown: blank(width, height),
        })
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Pixel size of the canvas that fills every row but the status bar
    pub fn canvas_size(&self) -> (usize, usize) {
        (self.width as usize, self.height.saturating_sub(1) as usize * 2)
    }

    /// Adopt a new terminal size; the next `present` repaints everything
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = blank(width, height);
        self.shown = blank(width, height);
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            for cell in row {
                *cell = Cell::default();
            }
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&mut self) -> io::Result<()> {
        execute!(stdout(), ResetColor, Clear(ClearType::All))?;
        self.shown = blank(self.width, self.height);
        Ok(())
    }

    /// Set a character at position with optional colors
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bg: Option<Color>) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bg };
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bg: Option<Color>) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bg);
        }
    }

    /// Copy the canvas into the buffer, two pixel rows per terminal row
    pub fn blit(&mut self, canvas: &Canvas) {
        let (cw, ch) = canvas.size();
        let rows = (ch / 2).min(self.height as usize);
        let cols = cw.min(self.width as usize);

        for cy in 0..rows {
            for cx in 0..cols {
                let top = canvas.pixel(cx, cy * 2).map(to_color);
                let bottom = canvas.pixel(cx, cy * 2 + 1).map(to_color);
                self.buffer[cy][cx] = Cell { ch: HALF_BLOCK, fg: top, bg: bottom };
            }
        }
    }

    /// Write the cells that changed since the last call
    pub fn present(&mut self) -> io::Result<()> {
        let mut out = stdout();

        for y in 0..self.height as usize {
            for x in 0..self.width as usize {
                let cell = &self.buffer[y][x];
                if *cell == self.shown[y][x] {
                    continue;
                }
                queue!(out, MoveTo(x as u16, y as u16))?;
                match cell.fg {
                    Some(color) => queue!(out, SetForegroundColor(color))?,
                    None => queue!(out, SetForegroundColor(Color::Reset))?,
                }
                match cell.bg {
                    Some(color) => queue!(out, SetBackgroundColor(color))?,
                    None => queue!(out, SetBackgroundColor(Color::Reset))?,
                }
                queue!(out, Print(cell.ch))?;
                self.shown[y][x] = cell.clone();
            }
        }

        queue!(out, ResetColor)?;
        out.flush()?;
        Ok(())
    }

    /// Wait up to `timeout` for a key press or resize
    pub fn next_input(&self, timeout: Duration) -> io::Result<Option<Input>> {
        if poll(timeout)? {
            return Ok(match read()? {
                Event::Key(key_event) => Some(Input::Key(key_event.code, key_event.modifiers)),
                Event::Resize(w, h) => Some(Input::Resize(w, h)),
                _ => None,
            });
        }
        Ok(None)
    }

    /// Wait for a keypress with timeout
    pub fn wait_key(&self, timeout_ms: u64) -> io::Result<Option<KeyCode>> {
        if poll(Duration::from_millis(timeout_ms))? {
            if let Event::Key(key_event) = read()? {
                return Ok(Some(key_event.code));
            }
        }
        Ok(None)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(stdout(), ResetColor, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn blank(width: u16, height: u16) -> Vec<Vec<Cell>> {
    vec![vec![Cell::default(); width as usize]; height as usize]
}

fn to_color(rgb: crate::colors::Rgb) -> Color {
    let [r, g, b] = rgb.to_bytes();
    Color::Rgb { r, g, b }
}
