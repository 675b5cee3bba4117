use crate::sim::PetAction;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub(crate) enum Command {
    Pet(PetAction),
    HelpToggle,
    Quit,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<KeyCode>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(k.code);
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_key(key: KeyCode, help_open: bool) -> Option<Command> {
    if help_open {
        return match key {
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') => Some(Command::HelpToggle),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
            _ => None,
        };
    }
    match key {
        KeyCode::Char('f') | KeyCode::Char('F') => Some(Command::Pet(PetAction::Feed)),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::Pet(PetAction::Play)),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::Pet(PetAction::Clean)),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Command::Pet(PetAction::SleepToggle)),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(Command::HelpToggle),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}
