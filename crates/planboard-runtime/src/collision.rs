#![forbid(unsafe_code)]

//! Closest-center drop target resolution.
//!
//! The zone whose rectangle center is nearest (Euclidean) to the pointer wins,
//! even when the pointer lies outside every rectangle. This keeps a target
//! highlighted while the pointer crosses the gaps between columns.
//!
//! Ties go to the zone listed first. Zones with an empty rectangle (collapsed
//! to nothing, not yet laid out) never win.

use planboard_core::{Day, Point, Rect};

/// A column's drop area as last measured by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropZone {
    pub day: Day,
    pub rect: Rect,
    /// Whether the column currently accepts drops.
    pub accepts: bool,
}

impl DropZone {
    #[must_use]
    pub const fn new(day: Day, rect: Rect) -> Self {
        Self {
            day,
            rect,
            accepts: true,
        }
    }

    #[must_use]
    pub const fn rejecting(mut self) -> Self {
        self.accepts = false;
        self
    }
}

/// Outcome of resolving a pointer position against the drop zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// A different day that accepts drops.
    Valid(Day),
    /// The pointer is closest to the day the drag started from.
    Source,
    /// The closest day does not accept drops.
    Rejected(Day),
    /// No zones are known.
    Nowhere,
}

impl DropTarget {
    /// The day a drop would land on, if the drop is valid.
    #[must_use]
    pub const fn day(self) -> Option<Day> {
        match self {
            Self::Valid(day) => Some(day),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// The zone whose center is closest to `point`.
#[must_use]
pub fn closest_zone(point: Point, zones: &[DropZone]) -> Option<&DropZone> {
    zones
        .iter()
        .filter(|zone| !zone.rect.is_empty())
        .fold(None, |best: Option<(&DropZone, f32)>, zone| {
            let d = zone.rect.center().distance_squared(point);
            match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((zone, d)),
            }
        })
        .map(|(zone, _)| zone)
}

/// Resolve `point` into a drop target for a drag that started on `source`.
#[must_use]
pub fn resolve_target(point: Point, zones: &[DropZone], source: Day) -> DropTarget {
    match closest_zone(point, zones) {
        None => DropTarget::Nowhere,
        Some(zone) if zone.day == source => DropTarget::Source,
        Some(zone) if !zone.accepts => DropTarget::Rejected(zone.day),
        Some(zone) => DropTarget::Valid(zone.day),
    }
}
