//! Raw-mode terminal: keyboard polling on one side, fixed-row status display
//! on the other.

use std::{
    io::{self, Stdout, Write},
    sync::{Mutex, PoisonError},
    time::Duration,
};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use shared::error::TeleopError;
use teleop_core::{
    ControlState, InputSource, ShutdownFlag, StatusLine, StatusSink, StatusUpdate, HELP_LINES,
    QUIT_KEY,
};
use tracing::debug;

pub fn ensure_rows(required: u16) -> Result<(), TeleopError> {
    let (_, rows) = terminal::size().map_err(TeleopError::InputUnavailable)?;
    check_rows(rows, required)
}

fn check_rows(rows: u16, required: u16) -> Result<(), TeleopError> {
    if rows < required {
        return Err(TeleopError::TerminalTooSmall { rows, required });
    }
    Ok(())
}

/// Holds the terminal in raw mode on the alternate screen until dropped.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen, Hide, Clear(ClearType::All)) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Keyboard reader. Ctrl-C never reaches the key table: in raw mode it
/// arrives as a key press, so it raises the shutdown flag directly.
pub struct KeyboardInput {
    interrupt: ShutdownFlag,
}

impl KeyboardInput {
    pub fn new(interrupt: ShutdownFlag) -> Self {
        Self { interrupt }
    }

    fn symbol_for(&self, key: KeyEvent) -> Option<char> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.interrupt.request();
                None
            }
            KeyCode::Char(symbol) => Some(symbol),
            _ => None,
        }
    }
}

impl InputSource for KeyboardInput {
    fn poll_symbol(&mut self) -> Result<Option<char>, TeleopError> {
        if !event::poll(Duration::ZERO).map_err(TeleopError::InputUnavailable)? {
            return Ok(None);
        }
        match event::read().map_err(TeleopError::InputUnavailable)? {
            Event::Key(key) => Ok(self.symbol_for(key)),
            _ => Ok(None),
        }
    }
}

/// Writes each status line at its fixed row.
pub struct TerminalSink<W = Stdout> {
    out: Mutex<W>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// A panic mid-draw poisons the lock; the writer itself is still usable,
    /// so drawing carries on.
    fn write_line(&self, update: &StatusUpdate) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        queue!(
            out,
            MoveTo(0, update.line.row()),
            Clear(ClearType::CurrentLine),
            Print(&update.text)
        )?;
        out.flush()
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> StatusSink for TerminalSink<W> {
    fn show(&self, update: &StatusUpdate) {
        if let Err(err) = self.write_line(update) {
            debug!(line = ?update.line, error = %err, "failed to draw status line");
        }
    }
}

/// Banner, help block and every field line, drawn once before the tasks start.
pub fn paint_layout(sink: &dyn StatusSink, state: &ControlState) {
    sink.show(&StatusUpdate::new(
        StatusLine::Banner,
        format!("Keyboard control started, press '{QUIT_KEY}' to exit."),
    ));
    for (index, text) in HELP_LINES.iter().enumerate() {
        sink.show(&StatusUpdate::new(StatusLine::Help(index as u16), *text));
    }
    for update in state.overview() {
        sink.show(&update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};

    #[derive(Default)]
    struct Lines(StdMutex<Vec<StatusUpdate>>);

    impl StatusSink for Lines {
        fn show(&self, update: &StatusUpdate) {
            self.0.lock().expect("lines").push(update.clone());
        }
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn ctrl_c_raises_shutdown_instead_of_a_symbol() {
        let shutdown = ShutdownFlag::new();
        let input = KeyboardInput::new(shutdown.clone());
        assert_eq!(
            input.symbol_for(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            None
        );
        assert!(shutdown.is_requested());
    }

    #[test]
    fn characters_pass_through_with_case() {
        let shutdown = ShutdownFlag::new();
        let input = KeyboardInput::new(shutdown.clone());
        assert_eq!(
            input.symbol_for(press(KeyCode::Char('B'), KeyModifiers::SHIFT)),
            Some('B')
        );
        assert_eq!(
            input.symbol_for(press(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(' ')
        );
        assert_eq!(input.symbol_for(press(KeyCode::Esc, KeyModifiers::NONE)), None);
        assert_eq!(input.symbol_for(press(KeyCode::Up, KeyModifiers::NONE)), None);
        assert!(!shutdown.is_requested());
    }

    #[test]
    fn short_terminal_is_rejected_before_raw_mode() {
        let required = StatusLine::rows_required();
        assert!(matches!(
            check_rows(24, required),
            Err(TeleopError::TerminalTooSmall {
                rows: 24,
                required: 25
            })
        ));
        check_rows(25, required).expect("exactly enough rows");
    }

    #[test]
    fn poisoned_display_keeps_drawing() {
        let sink = Arc::new(TerminalSink::with_writer(Vec::new()));
        let poisoner = sink.clone();
        let _ = std::thread::spawn(move || {
            let _held = poisoner.out.lock().expect("writer");
            panic!("painter died mid-frame");
        })
        .join();
        assert!(sink.out.is_poisoned());

        sink.show(&StatusUpdate::new(StatusLine::Notice, "still drawing"));

        let out = sink.out.lock().unwrap_or_else(PoisonError::into_inner);
        assert!(String::from_utf8_lossy(&out).contains("still drawing"));
    }

    #[test]
    fn layout_paints_banner_help_and_fields_inside_required_rows() {
        let lines = Lines::default();
        paint_layout(&lines, &ControlState::default());

        let painted = lines.0.lock().expect("lines");
        assert_eq!(painted.len(), 1 + HELP_LINES.len() + StatusLine::FIELDS.len());
        assert!(painted
            .iter()
            .all(|update| update.line.row() < StatusLine::rows_required()));
        assert!(painted
            .iter()
            .any(|update| update.text == "gear:  P"));
    }
}
