//! `+++` escape-sequence detector.
//!
//! The detector watches every inbound byte and a fixed-rate tick and
//! reports when the classic modem escape has been seen:
//!
//! ```text
//!   Idle  --guard window of silence-->  Seen1
//!   Seen1 --'+'-->  Seen2  --'+'-->  Seen3  --'+'-->  Armed
//!   Armed --guard window of silence-->  command mode, back to Idle
//!
//!   any non-'+' byte         --> Idle, window restarted
//!   '+' while Idle or Armed  --> Idle, window restarted
//! ```
//!
//! The tick is the only source of elapsed time.

/// The escape character.
pub const ESCAPE_CHAR: u8 = b'+';

/// Ticks in the guard window: one second of a 100 Hz tick.
pub const DEFAULT_GUARD_TICKS: u16 = 100;

/// Position in the escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeState {
    /// Waiting for a full guard window without input.
    #[default]
    Idle,
    /// Silence seen; waiting for the first `+`.
    Seen1,
    /// Waiting for the second `+`.
    Seen2,
    /// Waiting for the third `+`.
    Seen3,
    /// Three `+` seen; waiting for the trailing guard window.
    Armed,
}

/// Detects the idle / `+++` / idle escape sequence.
#[derive(Debug, Clone)]
pub struct EscapeDetector {
    state: EscapeState,
    countdown: u16,
    guard_ticks: u16,
}

impl EscapeDetector {
    /// Create a detector whose guard window lasts `guard_ticks` ticks.
    pub fn new(guard_ticks: u16) -> Self {
        EscapeDetector {
            state: EscapeState::Idle,
            countdown: guard_ticks,
            guard_ticks,
        }
    }

    /// Offer one inbound byte.
    pub fn on_byte(&mut self, byte: u8) {
        if byte != ESCAPE_CHAR {
            self.enter_idle();
            return;
        }

        match self.state {
            EscapeState::Seen1 => self.state = EscapeState::Seen2,
            EscapeState::Seen2 => self.state = EscapeState::Seen3,
            EscapeState::Seen3 => {
                self.state = EscapeState::Armed;
                self.countdown = self.guard_ticks;
            }
            // A '+' outside an idle-then-plus run restarts detection.
            EscapeState::Idle | EscapeState::Armed => self.enter_idle(),
        }
        log::trace!("escape: '+' -> {:?}", self.state);
    }

    /// Advance time by one tick.
    ///
    /// Returns `true` exactly once per completed escape sequence, on the
    /// tick that ends the trailing guard window.
    pub fn on_tick(&mut self) -> bool {
        if self.countdown == 0 {
            return false;
        }
        self.countdown -= 1;
        if self.countdown != 0 {
            return false;
        }

        match self.state {
            EscapeState::Idle => {
                self.state = EscapeState::Seen1;
                log::trace!("escape: guard window elapsed, watching for '+'");
                false
            }
            EscapeState::Armed => {
                self.enter_idle();
                true
            }
            _ => false,
        }
    }

    /// Restart the guard window without changing state.
    pub fn restart_window(&mut self) {
        self.countdown = self.guard_ticks;
    }

    /// Current position in the sequence.
    pub fn state(&self) -> EscapeState {
        self.state
    }

    /// Ticks left in the running window; zero when no window is running.
    pub fn countdown(&self) -> u16 {
        self.countdown
    }

    /// Length of the guard window in ticks.
    pub fn guard_ticks(&self) -> u16 {
        self.guard_ticks
    }

    fn enter_idle(&mut self) {
        self.state = EscapeState::Idle;
        self.countdown = self.guard_ticks;
    }
}

impl Default for EscapeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_GUARD_TICKS)
    }
}
