use crate::achievements::CATALOG;
use crate::config::Settings;
use crate::model::{GrowthStage, PetState};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    cells: Vec<Cell>,
}

impl CellBuffer {
    fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }

    fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}

pub(crate) struct Terminal {
    out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        Ok(true)
    }

    /// Flushes only cells that changed since the last frame.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;
        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }
                queue!(self.out, cursor::MoveTo(x, y))?;
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }
                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(
            xx,
            y,
            Cell {
                ch,
                fg,
                bg: Color::Black,
            },
        );
    }
}

fn meter_bar(value: u8, width: usize) -> String {
    let fill = (value as usize * width + 50) / 100;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

/// Same thresholds the meter colors have always used: green above 70,
/// amber above 40, red below.
fn meter_color(value: u8, enable_color: bool) -> Color {
    if !enable_color {
        return Color::White;
    }
    if value > 70 {
        Color::Green
    } else if value > 40 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn sprite(stage: GrowthStage, sleeping: bool) -> &'static [&'static str] {
    match (stage, sleeping) {
        (GrowthStage::Baby, false) => &["  .--.  ", " ( oo ) ", "  `--'  "],
        (GrowthStage::Baby, true) => &["  .--.  z", " ( -- )  ", "  `--'   "],
        (GrowthStage::Child, false) => &[" /\\_/\\ ", "( o.o )", " > ^ < "],
        (GrowthStage::Child, true) => &[" /\\_/\\  Z", "( -.- )  ", " > ^ <   "],
        (GrowthStage::Teen, false) => &[" /\\_/\\ ", "( o.o )", "(  -  )", " \\___/ "],
        (GrowthStage::Teen, true) => &[" /\\_/\\  z", "( -.- ) Z", "(  -  )  ", " \\___/   "],
        (GrowthStage::Adult, false) => &[
            "  /\\_/\\  ",
            " ( o.o ) ",
            " (  -  ) ",
            " (     ) ",
            "  \\___/  ",
        ],
        (GrowthStage::Adult, true) => &[
            "  /\\_/\\  z",
            " ( -.- ) Z",
            " (  -  )  ",
            " (     )  ",
            "  \\___/   ",
        ],
    }
}

pub(crate) struct Hud<'a> {
    pub(crate) state: &'a PetState,
    pub(crate) age_days: u64,
    pub(crate) stage: GrowthStage,
    pub(crate) notice: Option<&'a str>,
    pub(crate) save_error: Option<&'a str>,
    pub(crate) help_open: bool,
}

pub(crate) fn draw_frame(buf: &mut CellBuffer, hud: &Hud, settings: &Settings) {
    buf.clear();

    let fg = Color::White;
    let mode = if hud.state.sleeping { "Asleep" } else { "Awake" };
    let days = if hud.age_days == 1 { "day" } else { "days" };
    let title = format!(
        "Termpet  |  Age: {} {} ({})  |  {}",
        hud.age_days,
        days,
        hud.stage.label(),
        mode
    );
    draw_text(buf, 1, 0, &title, fg);

    for (i, (name, value)) in hud.state.stats.fields().iter().enumerate() {
        let line = format!("{name:<12}{} {value:>3}", meter_bar(*value, 20));
        draw_text(
            buf,
            1,
            2 + i as u16,
            &line,
            meter_color(*value, settings.enable_color),
        );
    }

    // pet to the right of the meters
    let pet_x = 42;
    for (i, line) in sprite(hud.stage, hud.state.sleeping).iter().enumerate() {
        draw_text(buf, pet_x, 2 + i as u16, line, fg);
    }

    draw_text(buf, 1, 8, "Achievements", fg);
    for (i, ach) in CATALOG.iter().enumerate() {
        let unlocked = hud.state.unlocked.iter().any(|u| u == ach.id);
        let mark = if unlocked { "✅" } else { "🔒" };
        let color = if unlocked || !settings.enable_color {
            fg
        } else {
            Color::DarkGrey
        };
        draw_text(
            buf,
            1,
            9 + i as u16,
            &format!("{mark} {}", ach.description),
            color,
        );
    }

    if let Some(text) = hud.notice {
        let color = if settings.enable_color {
            Color::Yellow
        } else {
            Color::White
        };
        draw_text(buf, 1, 18, text, color);
    }

    if let Some(err) = hud.save_error {
        draw_text(
            buf,
            1,
            buf.h.saturating_sub(2),
            &format!("save failed: {err}"),
            Color::DarkRed,
        );
    }

    let footer = if hud.state.sleeping {
        "Keys: s wake | h help | q quit   (feed/play/clean disabled while asleep)"
    } else {
        "Keys: f feed | p play | c clean | s sleep | h help | q quit"
    };
    draw_text(buf, 1, buf.h.saturating_sub(1), footer, Color::DarkGrey);

    if hud.help_open {
        draw_help(buf);
    }
}

fn draw_help(buf: &mut CellBuffer) {
    let body = [
        "How to play",
        "",
        "Keep the meters up; everything drains one point per tick",
        "while the pet is awake.",
        "",
        "F Feed:  +20 hunger, +5 energy.",
        "P Play:  +15 happiness, -10 energy, -5 hunger.",
        "C Clean: cleanliness to 100, -5 happiness.",
        "S Sleep: only energy recovers; other actions pause.",
        "",
        "Your pet ages one virtual day per minute and grows",
        "through baby, child, teen and adult stages.",
        "",
        "Esc or H to close.",
    ];

    let bw: u16 = 62;
    let bh: u16 = body.len() as u16 + 2;
    let x0 = buf.w.saturating_sub(bw) / 2;
    let y0 = buf.h.saturating_sub(bh) / 2;

    for y in y0..y0.saturating_add(bh).min(buf.h) {
        for x in x0..x0.saturating_add(bw).min(buf.w) {
            buf.set(x, y, Cell::default());
        }
    }
    for x in x0..x0.saturating_add(bw).min(buf.w) {
        for y in [y0, y0 + bh - 1] {
            buf.set(
                x,
                y,
                Cell {
                    ch: '─',
                    ..Cell::default()
                },
            );
        }
    }
    for y in y0..y0.saturating_add(bh).min(buf.h) {
        for x in [x0, x0 + bw - 1] {
            buf.set(
                x,
                y,
                Cell {
                    ch: '│',
                    ..Cell::default()
                },
            );
        }
    }
    for (x, y, ch) in [
        (x0, y0, '┌'),
        (x0 + bw - 1, y0, '┐'),
        (x0, y0 + bh - 1, '└'),
        (x0 + bw - 1, y0 + bh - 1, '┘'),
    ] {
        buf.set(
            x,
            y,
            Cell {
                ch,
                ..Cell::default()
            },
        );
    }
    for (i, line) in body.iter().enumerate() {
        draw_text(buf, x0 + 2, y0 + 1 + i as u16, line, Color::White);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_bar_fill_is_proportional() {
        assert_eq!(meter_bar(0, 10), "[          ]");
        assert_eq!(meter_bar(100, 10), "[██████████]");
        assert_eq!(meter_bar(50, 10), "[█████     ]");
    }

    #[test]
    fn meter_colors_follow_thresholds() {
        assert_eq!(meter_color(71, true), Color::Green);
        assert_eq!(meter_color(70, true), Color::Yellow);
        assert_eq!(meter_color(41, true), Color::Yellow);
        assert_eq!(meter_color(40, true), Color::Red);
        assert_eq!(meter_color(0, false), Color::White);
    }
}
