#![forbid(unsafe_code)]

//! The seven board columns.
//!
//! [`Day`] is the only way to address a column and [`DayMap`] stores exactly
//! one value per day, so a lookup can never miss and a new day can never be
//! invented from a typo'd string.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A day of the planning week, in board order.
///
/// Serialized in lowercase so day values agree with [`DayMap`] keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days in default column order.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Zero-based position in the default order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }

    /// Inverse of [`index`](Self::index).
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::ALL.len() {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Three-letter label used in compact column headers.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
            Self::Sunday => "Sun",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A string that names no day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown day: {0:?}")]
pub struct ParseDayError(pub String);

impl FromStr for Day {
    type Err = ParseDayError;

    /// Accepts full or three-letter names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Day::ALL
            .into_iter()
            .find(|day| {
                day.name().eq_ignore_ascii_case(needle)
                    || day.short_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ParseDayError(s.to_owned()))
    }
}

/// One value per day.
///
/// Serializes as an object keyed by lowercase day name. Missing keys fall back
/// to `T::default()` on load, so a blob written before a field existed still
/// reads back cleanly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct DayMap<T> {
    monday: T,
    tuesday: T,
    wednesday: T,
    thursday: T,
    friday: T,
    saturday: T,
    sunday: T,
}

impl<T> DayMap<T> {
    /// Build a map by evaluating `f` for every day in order.
    pub fn from_fn(mut f: impl FnMut(Day) -> T) -> Self {
        Self {
            monday: f(Day::Monday),
            tuesday: f(Day::Tuesday),
            wednesday: f(Day::Wednesday),
            thursday: f(Day::Thursday),
            friday: f(Day::Friday),
            saturday: f(Day::Saturday),
            sunday: f(Day::Sunday),
        }
    }

    /// Iterate `(day, &value)` in default order.
    pub fn iter(&self) -> impl Iterator<Item = (Day, &T)> + '_ {
        Day::ALL.into_iter().map(move |day| (day, &self[day]))
    }

    /// Transform every value, keeping the day association.
    pub fn map<U>(&self, mut f: impl FnMut(Day, &T) -> U) -> DayMap<U> {
        DayMap::from_fn(|day| f(day, &self[day]))
    }
}

impl<T: Clone> DayMap<T> {
    /// The same value for every day.
    pub fn splat(value: T) -> Self {
        Self::from_fn(|_| value.clone())
    }
}

impl<T> Index<Day> for DayMap<T> {
    type Output = T;

    fn index(&self, day: Day) -> &T {
        match day {
            Day::Monday => &self.monday,
            Day::Tuesday => &self.tuesday,
            Day::Wednesday => &self.wednesday,
            Day::Thursday => &self.thursday,
            Day::Friday => &self.friday,
            Day::Saturday => &self.saturday,
            Day::Sunday => &self.sunday,
        }
    }
}

impl<T> IndexMut<Day> for DayMap<T> {
    fn index_mut(&mut self, day: Day) -> &mut T {
        match day {
            Day::Monday => &mut self.monday,
            Day::Tuesday => &mut self.tuesday,
            Day::Wednesday => &mut self.wednesday,
            Day::Thursday => &mut self.thursday,
            Day::Friday => &mut self.friday,
            Day::Saturday => &mut self.saturday,
            Day::Sunday => &mut self.sunday,
        }
    }
}
