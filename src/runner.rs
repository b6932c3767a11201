use std::time::Duration;

use crate::{
    chip8::ChipSet,
    definitions::cpu,
    devices::{DisplayCommands, KeyEvent, KeyboardCommands},
    timer::{Clock, NoCallback, TimerCallback},
    OpcodeError,
};

/// Drives a [`ChipSet`] at a fixed rate, feeding it the key events of the
/// host and handing the display to the host whenever it changed.
pub struct Runner<D, K, S = NoCallback>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    S: TimerCallback,
{
    chip: ChipSet<S>,
    display: D,
    keyboard: K,
    interval: Duration,
}

impl<D, K, S> Runner<D, K, S>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    S: TimerCallback,
{
    /// Will create a runner stepping at [`cpu::HERTZ`].
    pub fn new(chip: ChipSet<S>, display: D, keyboard: K) -> Self {
        Self::with_interval(
            chip,
            display,
            keyboard,
            Duration::from_millis(cpu::INTERVAL),
        )
    }

    pub fn with_interval(chip: ChipSet<S>, display: D, keyboard: K, interval: Duration) -> Self {
        Self {
            chip,
            display,
            keyboard,
            interval,
        }
    }

    pub fn chip(&self) -> &ChipSet<S> {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut ChipSet<S> {
        &mut self.chip
    }

    /// Will run a single cycle, returns `false` once the emulation should stop.
    pub fn cycle(&mut self) -> bool {
        for event in self.keyboard.poll_events() {
            match event {
                KeyEvent::Pressed(key) => self.chip.set_key(key, true),
                KeyEvent::Released(key) => self.chip.set_key(key, false),
                KeyEvent::Quit => {
                    log::info!("quit requested");
                    return false;
                }
            }
        }

        if self.chip.should_terminate() {
            return false;
        }

        self.chip.step();

        if self.chip.is_dirty() {
            self.display.display(self.chip.get_display());
            self.chip.clear_dirty();
        }

        !self.chip.should_terminate()
    }

    /// Will run until the chip halts or the host asks to quit, returns the
    /// reason the chip halted if it did.
    pub fn run(&mut self) -> Option<OpcodeError> {
        log::info!(
            "running '{}' every {:?}",
            self.chip.get_name(),
            self.interval
        );
        self.display.clear_display();

        let mut clock = Clock::new(self.interval);
        while self.cycle() {
            clock.wait();
        }

        self.chip.halt_reason()
    }
}
