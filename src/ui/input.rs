/// Keyboard input collector.
///
/// Every screen in the arcade is driven by discrete presses, so the tracker
/// keeps edge events only:
///   - Press and Repeat both count as a press (holding an arrow repeats)
///   - Release events are dropped
///   - Printable characters are kept in order for text entry
///
/// Call `drain_events()` once per frame before the simulation tick.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct InputState {
    /// Keys pressed (or auto-repeated) during the most recent drain.
    presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.push(key);
            }
        }
    }

    fn push(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        self.raw_events.push(key);
        self.presses.push(key.code);
    }

    #[cfg(test)]
    pub fn press(&mut self, code: KeyCode) {
        self.push(KeyEvent::new(code, KeyModifiers::NONE));
    }

    /// Was this key pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.presses.contains(&code)
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Printable characters typed this frame, in order. Control chords are skipped.
    pub fn typed_chars(&self) -> impl Iterator<Item = char> + '_ {
        self.raw_events.iter().filter_map(|k| match k.code {
            KeyCode::Char(c)
                if !k.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Some(c)
            }
            _ => None,
        })
    }

    /// First digit key pressed this frame.
    pub fn digit(&self) -> Option<u8> {
        self.presses.iter().find_map(|c| match c {
            KeyCode::Char(ch) => ch.to_digit(10).map(|d| d as u8),
            _ => None,
        })
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn repeats_count_and_releases_do_not() {
        let mut input = InputState::new();
        input.push(key(KeyCode::Left, KeyEventKind::Repeat));
        input.push(key(KeyCode::Right, KeyEventKind::Release));
        assert!(input.was_pressed(KeyCode::Left));
        assert!(!input.was_pressed(KeyCode::Right));
    }

    #[test]
    fn typed_chars_skip_control_chords() {
        let mut input = InputState::new();
        input.push(key(KeyCode::Char('a'), KeyEventKind::Press));
        input.push(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        input.push(key(KeyCode::Char('B'), KeyEventKind::Press));
        assert_eq!(input.typed_chars().collect::<String>(), "aB");
        assert!(input.ctrl_c_pressed());
    }

    #[test]
    fn digit_reads_first_number_key() {
        let mut input = InputState::new();
        input.push(key(KeyCode::Char('x'), KeyEventKind::Press));
        input.push(key(KeyCode::Char('7'), KeyEventKind::Press));
        input.push(key(KeyCode::Char('2'), KeyEventKind::Press));
        assert_eq!(input.digit(), Some(7));
    }
}
