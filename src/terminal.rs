//! The terminal front end, pixels are drawn as half blocks so two rows of the
//! display share a single line of the terminal.

use std::{
    io::{self, Stdout, Write},
    time::{Duration, Instant},
};

use chip::{
    definitions::{display, keyboard},
    devices::{DisplayCommands, KeyBindings, KeyEvent, KeyboardCommands},
    timer::TimerCallback,
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

/// Most terminals never report key releases, a key counts as released once it
/// was not repeated for this long.
const HOLD: Duration = Duration::from_millis(200);

/// Owns the terminal while the emulation is running, the terminal is restored
/// once dropped.
pub struct TerminalDisplay {
    stdout: Stdout,
}

impl TerminalDisplay {
    pub fn new() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Self { stdout })
    }

    fn draw(&mut self, pixels: &[u8]) -> io::Result<()> {
        for (line, rows) in pixels.chunks(display::WIDTH * 2).enumerate() {
            let (top, bottom) = rows.split_at(display::WIDTH.min(rows.len()));
            let text: String = (0..display::WIDTH)
                .map(|x| {
                    let upper = top.get(x).copied().unwrap_or_default() != 0;
                    let lower = bottom.get(x).copied().unwrap_or_default() != 0;
                    match (upper, lower) {
                        (true, true) => '█',
                        (true, false) => '▀',
                        (false, true) => '▄',
                        (false, false) => ' ',
                    }
                })
                .collect();
            queue!(self.stdout, MoveTo(0, line as u16), Print(text))?;
        }
        self.stdout.flush()
    }
}

impl DisplayCommands for TerminalDisplay {
    fn clear_display(&mut self) {
        if let Err(err) = execute!(self.stdout, Clear(ClearType::All)) {
            log::error!("unable to clear the terminal: {}", err);
        }
    }

    fn display(&mut self, pixels: &[u8]) {
        if let Err(err) = self.draw(pixels) {
            log::error!("unable to draw to the terminal: {}", err);
        }
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads the host keyboard and translates it with the key bindings.
pub struct TerminalKeyboard {
    bindings: KeyBindings,
    held: [Option<Instant>; keyboard::SIZE],
}

impl TerminalKeyboard {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: [None; keyboard::SIZE],
        }
    }

    fn read_events(&mut self, events: &mut Vec<KeyEvent>) -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            let key = match event::read()? {
                Event::Key(key) => key,
                _ => continue,
            };

            let quit = key.code == KeyCode::Esc
                || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
            if quit {
                events.push(KeyEvent::Quit);
                continue;
            }

            let index = match key.code {
                KeyCode::Char(host) => self.bindings.key_for(host),
                _ => None,
            };
            let index = match index {
                Some(index) => index,
                None => continue,
            };

            match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    if self.held[index].is_none() {
                        events.push(KeyEvent::Pressed(index));
                    }
                    self.held[index] = Some(Instant::now());
                }
                KeyEventKind::Release => {
                    self.held[index] = None;
                    events.push(KeyEvent::Released(index));
                }
            }
        }
        Ok(())
    }
}

impl KeyboardCommands for TerminalKeyboard {
    fn poll_events(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        if let Err(err) = self.read_events(&mut events) {
            log::error!("unable to read the terminal: {}", err);
            events.push(KeyEvent::Quit);
        }

        for (index, held) in self.held.iter_mut().enumerate() {
            if matches!(held, Some(since) if since.elapsed() >= HOLD) {
                *held = None;
                events.push(KeyEvent::Released(index));
            }
        }
        events
    }
}

/// Rings the terminal bell whenever the sound timer runs out.
#[derive(Debug, Default)]
pub struct Beep;

impl TimerCallback for Beep {
    fn handle(&mut self) {
        let mut stdout = io::stdout();
        if let Err(err) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            log::warn!("unable to ring the bell: {}", err);
        }
    }
}
