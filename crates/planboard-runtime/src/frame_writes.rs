#![forbid(unsafe_code)]

//! Per-frame coalescing of column size writes.
//!
//! Resize drags and size observers can report a new width or height many
//! times between two animation frames. [`FrameWrites`] keeps only the latest
//! value per `(day, field)` and hands the batch over once per frame.
//!
//! # Design
//!
//! "Latest wins" per slot, like the input coalescer:
//! - Two writes to the same day and field in one frame: the second replaces
//!   the first.
//! - Writes to different fields or days never interact.
//! - The caller flushes explicitly from its frame callback.
//!
//! # Usage
//!
//! ```
//! use planboard_core::Day;
//! use planboard_runtime::frame_writes::{FrameWrites, LayoutField};
//!
//! let mut writes = FrameWrites::new();
//! assert!(writes.schedule(Day::Monday, LayoutField::Width, 240.0)); // request a frame
//! assert!(!writes.schedule(Day::Monday, LayoutField::Width, 260.0)); // already requested
//!
//! let batch = writes.drain();
//! assert_eq!(batch.len(), 1);
//! assert_eq!(batch[0].value, 260.0);
//! ```

use planboard_core::{Day, DayMap};

/// Which column dimension a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutField {
    Width,
    Height,
}

/// One coalesced write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameWrite {
    pub day: Day,
    pub field: LayoutField,
    pub value: f32,
}

/// Pending size writes for the next frame.
///
/// Not thread-safe; lives on the UI thread next to the layout store.
#[derive(Debug, Clone, Default)]
pub struct FrameWrites {
    width: DayMap<Option<f32>>,
    height: DayMap<Option<f32>>,
}

impl FrameWrites {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a write. Returns `true` if the batch was empty before, meaning
    /// the caller should request an animation frame.
    pub fn schedule(&mut self, day: Day, field: LayoutField, value: f32) -> bool {
        let was_empty = self.is_empty();
        self.slot_mut(field)[day] = Some(value);
        was_empty
    }

    /// Pending value for a slot.
    #[must_use]
    pub fn pending(&self, day: Day, field: LayoutField) -> Option<f32> {
        match field {
            LayoutField::Width => self.width[day],
            LayoutField::Height => self.height[day],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct pending slots.
    #[must_use]
    pub fn len(&self) -> usize {
        let count = |map: &DayMap<Option<f32>>| map.iter().filter(|(_, v)| v.is_some()).count();
        count(&self.width) + count(&self.height)
    }

    /// Take the batch: days in board order, width before height.
    pub fn drain(&mut self) -> Vec<FrameWrite> {
        let mut batch = Vec::with_capacity(self.len());
        for day in Day::ALL {
            for field in [LayoutField::Width, LayoutField::Height] {
                if let Some(value) = self.slot_mut(field)[day].take() {
                    batch.push(FrameWrite { day, field, value });
                }
            }
        }
        batch
    }

    /// Drop everything pending.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn slot_mut(&mut self, field: LayoutField) -> &mut DayMap<Option<f32>> {
        match field {
            LayoutField::Width => &mut self.width,
            LayoutField::Height => &mut self.height,
        }
    }
}
