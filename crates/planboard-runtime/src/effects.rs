#![forbid(unsafe_code)]

//! Best-effort side channels: haptics, audio, notifications, board sink.
//!
//! None of these may veto or roll back a board mutation. [`SideEffects`]
//! bundles the four collaborators and swallows their failures after logging
//! a warning on the target of the subsystem that triggered them.
//!
//! Every trait is also implemented for `Rc<RefCell<T>>` so a host can keep a
//! handle to a collaborator (for example a [`NoticeLog`]) it handed over.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use planboard_core::Day;
use thiserror::Error;

use crate::board::BoardState;

/// Failure reported by a side-effect collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SideEffectError {
    #[error("haptics unavailable: {0}")]
    Haptics(String),

    #[error("audio playback failed: {0}")]
    Audio(String),

    #[error("board sink rejected update: {0}")]
    Sink(String),
}

/// Sound played on board changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Drop,
    Undo,
}

/// Vibration motor.
pub trait Haptics {
    fn pulse(&mut self, duration: Duration) -> Result<(), SideEffectError>;
}

/// Short sound effects.
pub trait AudioCue {
    fn play(&mut self, cue: Cue) -> Result<(), SideEffectError>;
}

/// Persistence collaborator for board data. Only notified, never awaited.
pub trait BoardSink {
    fn board_changed(&mut self, board: &BoardState) -> Result<(), SideEffectError>;
}

/// Transient user-facing messages (toasts).
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// Visual weight of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
}

/// A user-facing message. Each variant renders distinct text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A drag committed a move.
    Moved { title: String, from: Day, to: Day },
    /// The last move was reverted.
    Undone { title: String, back_to: Day },
    /// A drag ended without a valid target.
    DropCancelled,
    /// A drag ended over a column that does not accept drops.
    DropRejected { day: Day },
}

impl Notice {
    #[must_use]
    pub fn level(&self) -> NoticeLevel {
        match self {
            Self::Moved { .. } | Self::Undone { .. } => NoticeLevel::Success,
            Self::DropCancelled => NoticeLevel::Info,
            Self::DropRejected { .. } => NoticeLevel::Warning,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moved { title, from, to } => write!(f, "Moved \"{title}\" from {from} to {to}"),
            Self::Undone { title, back_to } => {
                write!(f, "Undid move: \"{title}\" is back on {back_to}")
            }
            Self::DropCancelled => f.write_str("Drop cancelled"),
            Self::DropRejected { day } => write!(f, "{day} does not accept workouts"),
        }
    }
}

/// Bounded in-memory [`Notifier`], oldest notices dropped first.
#[derive(Debug, Clone)]
pub struct NoticeLog {
    entries: VecDeque<Notice>,
    capacity: usize,
}

impl Default for NoticeLog {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}

impl NoticeLog {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Notice> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> + '_ {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return everything, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.entries.drain(..).collect()
    }
}

impl Notifier for NoticeLog {
    fn notify(&mut self, notice: Notice) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(notice);
    }
}

// ---------------------------------------------------------------------------
// Shared handles and no-op collaborators
// ---------------------------------------------------------------------------

impl<T: Haptics + ?Sized> Haptics for Rc<RefCell<T>> {
    fn pulse(&mut self, duration: Duration) -> Result<(), SideEffectError> {
        self.borrow_mut().pulse(duration)
    }
}

impl<T: AudioCue + ?Sized> AudioCue for Rc<RefCell<T>> {
    fn play(&mut self, cue: Cue) -> Result<(), SideEffectError> {
        self.borrow_mut().play(cue)
    }
}

impl<T: BoardSink + ?Sized> BoardSink for Rc<RefCell<T>> {
    fn board_changed(&mut self, board: &BoardState) -> Result<(), SideEffectError> {
        self.borrow_mut().board_changed(board)
    }
}

impl<T: Notifier + ?Sized> Notifier for Rc<RefCell<T>> {
    fn notify(&mut self, notice: Notice) {
        self.borrow_mut().notify(notice);
    }
}

/// Collaborator that accepts everything and does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl Haptics for Noop {
    fn pulse(&mut self, _duration: Duration) -> Result<(), SideEffectError> {
        Ok(())
    }
}

impl AudioCue for Noop {
    fn play(&mut self, _cue: Cue) -> Result<(), SideEffectError> {
        Ok(())
    }
}

impl BoardSink for Noop {
    fn board_changed(&mut self, _board: &BoardState) -> Result<(), SideEffectError> {
        Ok(())
    }
}

impl Notifier for Noop {
    fn notify(&mut self, _notice: Notice) {}
}

// ---------------------------------------------------------------------------
// SideEffects
// ---------------------------------------------------------------------------

/// The four side channels, with failure swallowing.
pub struct SideEffects {
    haptics: Box<dyn Haptics>,
    audio: Box<dyn AudioCue>,
    notifier: Box<dyn Notifier>,
    sink: Box<dyn BoardSink>,
}

impl fmt::Debug for SideEffects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SideEffects").finish_non_exhaustive()
    }
}

impl Default for SideEffects {
    fn default() -> Self {
        Self {
            haptics: Box::new(Noop),
            audio: Box::new(Noop),
            notifier: Box::new(Noop),
            sink: Box::new(Noop),
        }
    }
}

impl SideEffects {
    #[must_use]
    pub fn with_haptics(mut self, haptics: impl Haptics + 'static) -> Self {
        self.haptics = Box::new(haptics);
        self
    }

    #[must_use]
    pub fn with_audio(mut self, audio: impl AudioCue + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl BoardSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Vibrate; returns whether the pulse was delivered.
    pub fn pulse(&mut self, duration: Duration) -> bool {
        match self.haptics.pulse(duration) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(target: "planboard.coordinator", error = %err, "haptic pulse failed");
                false
            }
        }
    }

    /// Play a cue; returns whether it played.
    pub fn play(&mut self, cue: Cue) -> bool {
        match self.audio.play(cue) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(target: "planboard.move", error = %err, ?cue, "audio cue failed");
                false
            }
        }
    }

    pub fn notify(&mut self, notice: Notice) {
        tracing::debug!(target: "planboard.move", notice = %notice, "notify");
        self.notifier.notify(notice);
    }

    /// Tell the board sink about a new board; returns whether it accepted.
    pub fn board_changed(&mut self, board: &BoardState) -> bool {
        match self.sink.board_changed(board) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(target: "planboard.move", error = %err, "board sink update failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl AudioCue for Broken {
        fn play(&mut self, _cue: Cue) -> Result<(), SideEffectError> {
            Err(SideEffectError::Audio("no output device".into()))
        }
    }

    impl Haptics for Broken {
        fn pulse(&mut self, _duration: Duration) -> Result<(), SideEffectError> {
            Err(SideEffectError::Haptics("unsupported".into()))
        }
    }

    #[test]
    fn notice_texts_are_distinct() {
        let notices = [
            Notice::Moved {
                title: "Run".into(),
                from: Day::Monday,
                to: Day::Tuesday,
            },
            Notice::Undone {
                title: "Run".into(),
                back_to: Day::Monday,
            },
            Notice::DropCancelled,
            Notice::DropRejected { day: Day::Sunday },
        ];
        let texts: Vec<String> = notices.iter().map(ToString::to_string).collect();
        for (i, a) in texts.iter().enumerate() {
            for b in &texts[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(texts[0], "Moved \"Run\" from Monday to Tuesday");
    }

    #[test]
    fn notice_log_is_bounded() {
        let mut log = NoticeLog::with_capacity(2);
        log.notify(Notice::DropCancelled);
        log.notify(Notice::DropRejected { day: Day::Friday });
        log.notify(Notice::DropCancelled);
        assert_eq!(log.len(), 2);
        assert_eq!(log.latest(), Some(&Notice::DropCancelled));
        assert_eq!(log.drain().len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn failures_are_swallowed() {
        let mut effects = SideEffects::default()
            .with_audio(Broken)
            .with_haptics(Broken);
        assert!(!effects.play(Cue::Drop));
        assert!(!effects.pulse(Duration::from_millis(10)));
        assert!(effects.board_changed(&BoardState::new()));
    }

    #[test]
    fn shared_log_sees_notices() {
        let log = Rc::new(RefCell::new(NoticeLog::default()));
        let mut effects = SideEffects::default().with_notifier(Rc::clone(&log));
        effects.notify(Notice::DropCancelled);
        assert_eq!(log.borrow().len(), 1);
    }
}
