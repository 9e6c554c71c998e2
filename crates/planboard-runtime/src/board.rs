#![forbid(unsafe_code)]

//! Board model: seven ordered day lists of workout items.
//!
//! [`BoardState`] is a value. Every mutation the engine performs builds a new
//! board from the previous one, so a caller holding the old value can compare
//! or restore it freely.
//!
//! # Invariants
//!
//! 1. An item ID appears in at most one day list, at most once.
//! 2. List order is significant and is the display order.
//!
//! [`BoardState::validate`] checks invariant 1 for boards that arrive from
//! outside (deserialized or assembled by hand).

use std::collections::HashMap;
use std::fmt;

use planboard_core::{Day, DayMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque unique workout identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkoutId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Coarse effort rating shown on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// One card on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutItem {
    pub id: WorkoutId,
    pub title: String,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub calories: u32,
    /// Last modification, milliseconds since the Unix epoch.
    #[serde(default)]
    pub modified_at_ms: u64,
}

impl WorkoutItem {
    /// A minimal item with just an ID and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: WorkoutId::new(id),
            title: title.into(),
            duration_minutes: 0,
            category: String::new(),
            difficulty: Difficulty::default(),
            calories: 0,
            modified_at_ms: 0,
        }
    }

    #[must_use]
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn with_calories(mut self, calories: u32) -> Self {
        self.calories = calories;
        self
    }

    /// Copy of this item with a new modification stamp.
    #[must_use]
    pub fn touched(&self, now_ms: u64) -> Self {
        Self {
            modified_at_ms: now_ms,
            ..self.clone()
        }
    }
}

/// A board that breaks the single-owner rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("workout {id} appears in both {first} and {second}")]
    DuplicateItem {
        id: WorkoutId,
        first: Day,
        second: Day,
    },
}

/// The weekly board: one ordered list per day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardState {
    days: DayMap<Vec<WorkoutItem>>,
}

impl BoardState {
    /// An empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing day lists.
    #[must_use]
    pub fn from_days(days: DayMap<Vec<WorkoutItem>>) -> Self {
        Self { days }
    }

    /// Builder used by fixtures: append `item` to `day`.
    #[must_use]
    pub fn with_item(mut self, day: Day, item: WorkoutItem) -> Self {
        self.days[day].push(item);
        self
    }

    /// Items of `day` in display order.
    #[must_use]
    pub fn day(&self, day: Day) -> &[WorkoutItem] {
        &self.days[day]
    }

    #[must_use]
    pub fn days(&self) -> &DayMap<Vec<WorkoutItem>> {
        &self.days
    }

    /// IDs of `day` in display order.
    pub fn ids(&self, day: Day) -> impl Iterator<Item = &WorkoutId> + '_ {
        self.days[day].iter().map(|item| &item.id)
    }

    /// Position of `id` within `day`.
    #[must_use]
    pub fn position(&self, day: Day, id: &WorkoutId) -> Option<usize> {
        self.days[day].iter().position(|item| &item.id == id)
    }

    #[must_use]
    pub fn contains(&self, day: Day, id: &WorkoutId) -> bool {
        self.position(day, id).is_some()
    }

    /// Which day owns `id`, if any.
    #[must_use]
    pub fn find(&self, id: &WorkoutId) -> Option<(Day, &WorkoutItem)> {
        self.days
            .iter()
            .find_map(|(day, items)| items.iter().find(|i| &i.id == id).map(|i| (day, i)))
    }

    /// Total number of items across all days.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.iter().map(|(_, items)| items.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that every ID is owned by exactly one list position.
    pub fn validate(&self) -> Result<(), BoardError> {
        let mut seen: HashMap<&WorkoutId, Day> = HashMap::with_capacity(self.len());
        for (day, items) in self.days.iter() {
            for item in items {
                if let Some(first) = seen.insert(&item.id, day) {
                    return Err(BoardError::DuplicateItem {
                        id: item.id.clone(),
                        first,
                        second: day,
                    });
                }
            }
        }
        Ok(())
    }

    /// New board with `id` taken out of `day`, plus the removed item.
    pub(crate) fn removing(&self, day: Day, id: &WorkoutId) -> Option<(Self, WorkoutItem)> {
        let index = self.position(day, id)?;
        let mut next = self.clone();
        let item = next.days[day].remove(index);
        Some((next, item))
    }

    /// Append `item` to the tail of `day` in place.
    pub(crate) fn append(&mut self, day: Day, item: WorkoutItem) {
        self.days[day].push(item);
    }
}
