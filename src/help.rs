use crate::terminal::Terminal;
use crossterm::event::KeyCode;
use crossterm::style::Color;
use std::io;

/// Draw a centered help box with the provided text into the back buffer
pub fn render_help_overlay(term: &mut Terminal, help_text: &str) {
    if help_text.is_empty() {
        return;
    }

    let (width, height) = term.size();
    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4; // 2 chars padding each side
    let box_height = lines.len() + 2; // 1 row padding top/bottom

    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;

    let border = Some(Color::White);
    let text = Some(Color::Grey);
    let fill = Some(Color::Black);

    // Top border: ┌─────┐
    term.set(start_x as i32, start_y as i32, '┌', border, fill);
    for x in 1..box_width - 1 {
        term.set((start_x + x) as i32, start_y as i32, '─', border, fill);
    }
    term.set((start_x + box_width - 1) as i32, start_y as i32, '┐', border, fill);

    for (i, line) in lines.iter().enumerate() {
        let y = (start_y + 1 + i) as i32;
        term.set(start_x as i32, y, '│', border, fill);

        let padding = max_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));
        term.set_str((start_x + 1) as i32, y, &padded, text, fill);

        term.set((start_x + box_width - 1) as i32, y, '│', border, fill);
    }

    // Bottom border: └─────┘
    let bottom_y = (start_y + box_height - 1) as i32;
    term.set(start_x as i32, bottom_y, '└', border, fill);
    for x in 1..box_width - 1 {
        term.set((start_x + x) as i32, bottom_y, '─', border, fill);
    }
    term.set((start_x + box_width - 1) as i32, bottom_y, '┘', border, fill);
}

/// Show the help box until `?` closes it.
/// Returns true if the user requested quit (q/Esc) while it was open.
/// The caller repaints the canvas afterwards.
pub fn show_help_modal(term: &mut Terminal, help_text: &str) -> io::Result<bool> {
    if help_text.is_empty() {
        return Ok(false);
    }

    render_help_overlay(term, help_text);
    term.present()?;

    loop {
        if let Some(code) = term.wait_key(50)? {
            match code {
                KeyCode::Char('?') => return Ok(false),
                KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                _ => {}
            }
        }
    }
}
