use std::time::{Duration, Instant};

/// Gets called by a [`Timer`] the moment it runs out.
#[cfg_attr(test, mockall::automock)]
pub trait TimerCallback {
    /// Will be called on the cycle that brings the timer to zero.
    fn handle(&mut self);
}

/// A callback that does nothing, used for the delay timer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoCallback;

impl TimerCallback for NoCallback {
    fn handle(&mut self) {}
}

/// Represents a timer inside of the chip infrastructure, it will count
/// down to zero from what ever number it was given, one step per
/// executed cycle.
///
/// The timer saturates at zero and is never reloaded automatically.
#[derive(Debug)]
pub struct Timer<S>
where
    S: TimerCallback,
{
    /// will store the value of the timer
    value: u8,
    /// runs once the timer moves from one to zero
    callback: S,
}

impl<S> Timer<S>
where
    S: TimerCallback,
{
    /// Will create a new timer with the given value.
    pub fn new(value: u8) -> Self
    where
        S: Default,
    {
        Self::with_callback(value, S::default())
    }

    /// Will create a new timer with the given value and callback.
    pub fn with_callback(value: u8, callback: S) -> Self {
        Self { value, callback }
    }

    /// Will set the value from which the timer shall count down from.
    pub fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> u8 {
        self.value
    }

    /// Will count down by one, if the timer is still running.
    /// Returns `true` if this tick ran the timer out.
    pub fn tick(&mut self) -> bool {
        match self.value {
            0 => false,
            1 => {
                self.value = 0;
                self.callback.handle();
                true
            }
            _ => {
                self.value -= 1;
                false
            }
        }
    }

    /// Grants access to the callback, e.g. to swap out the audio device.
    pub fn callback_mut(&mut self) -> &mut S {
        &mut self.callback
    }
}

/// Keeps a loop at a fixed rate, by sleeping the remainder of the
/// interval that was not used up by the work itself.
#[derive(Debug)]
pub struct Clock {
    interval: Duration,
    last: Instant,
}

impl Clock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// How long the caller still has to wait until the next tick is due.
    pub fn remaining(&self) -> Duration {
        self.interval.saturating_sub(self.last.elapsed())
    }

    /// Will block until the interval has passed and start the next one.
    pub fn wait(&mut self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
        self.last = Instant::now();
    }
}
