use crate::colors::hsb_to_rgb;
use crate::config::{GrowConfig, RenderConfig};
use crate::domain::Domain;
use crate::help::show_help_modal;
use crate::terminal::{Input, Terminal};
use crate::tree::GrowOutcome;
use crate::view::{RootsView, ViewParams};
use chrono::Local;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::style::Color;
use log::{info, warn};
use rand::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const HELP: &str = "\
CONSCIOUSNESS ROOTS
─────────────────────
1-5    Grow a domain
m      Meditate (thicker trunk
       on the next regrow)
r      Regrow
s      Save PNG snapshot
Space  Pause
q/Esc  Quit
?      Close help";

/// Idle poll interval while no frame is scheduled
const IDLE_POLL: Duration = Duration::from_millis(50);

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0) // Fallback seed for misconfigured system clocks
}

/// Run the live roots view until the user quits
pub fn run_interactive(config: GrowConfig) -> io::Result<()> {
    let seed = config.seed.unwrap_or_else(clock_seed);
    let scores = config.source.load();
    info!("interactive view, seed {}", seed);

    let mut term = Terminal::new()?;
    term.clear_screen()?;

    let (width, height) = term.canvas_size();
    let params = ViewParams {
        scores,
        thickness: config.thickness,
        base_hue: config.base_hue,
        frame_interval: Duration::from_secs_f32(config.frame_time.max(0.001)),
    };
    let mut view = RootsView::mount(width, height, params, StdRng::seed_from_u64(seed), Instant::now());
    let mut message = String::from("press ? for help");

    loop {
        if view.tick(Instant::now()) {
            draw(&mut term, &view, &message)?;
        }

        let wait = view.time_until_frame(Instant::now()).unwrap_or(IDLE_POLL);
        let input = match term.next_input(wait)? {
            Some(input) => input,
            None => continue,
        };

        match input {
            Input::Resize(w, h) => {
                term.resize(w, h);
                term.clear_screen()?;
                let (cw, ch) = term.canvas_size();
                view.resize(cw, ch, Instant::now());
            }
            Input::Key(KeyCode::Char('c'), mods) if mods.contains(KeyModifiers::CONTROL) => break,
            Input::Key(KeyCode::Char('q'), _) | Input::Key(KeyCode::Esc, _) => break,
            Input::Key(KeyCode::Char('?'), _) => {
                if show_help_modal(&mut term, HELP)? {
                    break;
                }
                term.clear();
            }
            Input::Key(KeyCode::Char(' '), _) => {
                message = if view.toggle_pause() { "paused" } else { "growing" }.to_string();
            }
            Input::Key(KeyCode::Char('m'), _) => {
                let value = view.meditate();
                message = format!("meditated: next trunk x{:.1} (r to regrow)", value);
            }
            Input::Key(KeyCode::Char('r'), _) => {
                term.clear_screen()?;
                view.regrow(Instant::now());
                message = format!("regrown with trunk x{:.1}", view.thickness().value());
            }
            Input::Key(KeyCode::Char('s'), _) => {
                message = match save_snapshot(&view, &config.snapshot_dir) {
                    Ok(path) => format!("saved {}", path.display()),
                    Err(e) => {
                        warn!("snapshot failed: {}", e);
                        format!("snapshot failed: {}", e)
                    }
                };
            }
            Input::Key(KeyCode::Char(c), _) => {
                if let Some(domain) = Domain::from_hotkey(c) {
                    let outcome = view.grow(domain);
                    message = describe(domain, outcome, view.tree().depth(domain));
                }
            }
            Input::Key(..) => {}
        }

        // Reflect key effects even while paused
        draw(&mut term, &view, &message)?;
    }

    view.unmount();
    Ok(())
}

fn draw(term: &mut Terminal, view: &RootsView, message: &str) -> io::Result<()> {
    term.blit(view.canvas());
    draw_status(term, view, message);
    term.present()
}

fn draw_status(term: &mut Terminal, view: &RootsView, message: &str) {
    let (width, height) = term.size();
    let y = height as i32 - 1;
    let bg = Some(Color::Black);

    for x in 0..width as i32 {
        term.set(x, y, ' ', None, bg);
    }

    let mut x = 1;
    for domain in Domain::ALL {
        let rgb = hsb_to_rgb(domain.hue(), 65.0, 100.0);
        let [r, g, b] = rgb.to_bytes();
        let label = format!("{} {}:{} ", domain.hotkey(), domain.name(), view.tree().depth(domain));
        term.set_str(x, y, &label, Some(Color::Rgb { r, g, b }), bg);
        x += label.chars().count() as i32 + 1;
    }

    let tail = format!("x{:.1} │ {}", view.thickness().value(), message);
    term.set_str(x, y, &tail, Some(Color::Grey), bg);
}

fn describe(domain: Domain, outcome: GrowOutcome, depth: u32) -> String {
    match outcome {
        GrowOutcome::TrunkGrowing => "the trunk is still growing".to_string(),
        GrowOutcome::Seeded { .. } => format!("{} takes root", domain.name()),
        GrowOutcome::Extended { major: true, .. } => {
            format!("{} grows a major branch (depth {})", domain.name(), depth)
        }
        GrowOutcome::Extended { .. } => format!("{} grows (depth {})", domain.name(), depth),
        GrowOutcome::NoSource => format!("{} deepens (depth {})", domain.name(), depth),
    }
}

fn save_snapshot(view: &RootsView, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let name = format!("mindroots-{}.png", Local::now().format("%Y%m%d-%H%M%S"));
    let path = dir.join(name);
    view.canvas()
        .save_png(&path)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    info!("snapshot written to {}", path.display());
    Ok(path)
}

/// Grow a tree without a terminal and write it to a PNG
pub fn run_render(config: &RenderConfig) -> io::Result<()> {
    let seed = config.seed.unwrap_or_else(clock_seed);
    let scores = config.source.load();

    let mut thickness = config.thickness;
    for _ in 0..config.meditations {
        thickness.meditate();
    }

    let params = ViewParams {
        scores,
        thickness,
        base_hue: config.base_hue,
        frame_interval: Duration::ZERO,
    };
    let mut view = RootsView::mount(
        config.width as usize,
        config.height as usize,
        params,
        StdRng::seed_from_u64(seed),
        Instant::now(),
    );

    let mut pending = config.grow.iter();
    for _ in 0..config.frames {
        view.step();
        if view.tree().is_seeded() {
            if let Some(domain) = pending.next() {
                view.grow(*domain);
            }
        }
    }
    view.unmount();

    let skipped = pending.count();
    if skipped > 0 {
        warn!("{} growth actions left unapplied; render more frames", skipped);
    }

    if let Some(dir) = config.out.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    view.canvas()
        .save_png(&config.out)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let tree = view.tree();
    for domain in Domain::ALL {
        let branches = tree.branches().iter().filter(|b| b.domain == Some(domain)).count();
        println!("{:<20} depth {:>3}  branches {:>4}", domain.name(), tree.depth(domain), branches);
    }
    println!(
        "wrote {} ({} branches, {} frames, seed {}, trunk x{:.1})",
        config.out.display(),
        tree.branches().len(),
        view.frame_count(),
        seed,
        thickness.value()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_read_naturally() {
        let d = Domain::UniversalLaws;
        assert_eq!(describe(d, GrowOutcome::TrunkGrowing, 0), "the trunk is still growing");
        assert_eq!(describe(d, GrowOutcome::Seeded { branch: 4 }, 1), "Universal Laws takes root");
        assert!(describe(d, GrowOutcome::Extended { source: 1, branch: 9, major: true }, 10)
            .contains("major"));
        assert!(describe(d, GrowOutcome::NoSource, 3).contains("depth 3"));
    }

    #[test]
    fn help_lists_every_hotkey() {
        assert!(HELP.contains("1-5"));
        assert!(HELP.contains("Meditate"));
    }
}
