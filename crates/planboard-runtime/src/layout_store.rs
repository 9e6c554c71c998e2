#![forbid(unsafe_code)]

//! Persisted per-column layout preferences.
//!
//! [`LayoutStore`] owns the live [`ColumnPreferences`] and writes them to a
//! [`PreferenceStorage`] under [`PREFERENCES_KEY`] whenever they change.
//!
//! # Loading
//!
//! The blob is read once, in [`LayoutStore::load`]. Anything unexpected falls
//! back to defaults and is logged; loading never fails:
//!
//! | Stored blob                | Result                              |
//! |----------------------------|-------------------------------------|
//! | absent                     | defaults                            |
//! | unreadable / not JSON      | defaults                            |
//! | `version` != current       | defaults                            |
//! | valid, some fields missing | stored fields + defaults for others |
//! | `order` not a permutation  | stored fields, default order        |
//!
//! # Writes
//!
//! Collapse, order and zoom changes persist immediately. Width and height
//! writes are frame-scheduled through [`FrameWrites`] and persisted once per
//! [`flush_frame`](LayoutStore::flush_frame). Every change builds a new
//! preferences value from the previous one. Storage failures are logged and
//! counted; the in-memory value still changes.

use std::fmt;

use planboard_core::{Day, DayMap};
use serde::{Deserialize, Serialize};

use crate::frame_writes::{FrameWrites, LayoutField};
use crate::storage::PreferenceStorage;

/// Storage key of the preference blob.
pub const PREFERENCES_KEY: &str = "weekly-board.column-preferences";

/// Size limits and defaults for columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of a column that was never resized (default: 280).
    pub default_column_width: f32,
    /// Narrowest width a resize may produce (default: 160).
    pub min_column_width: f32,
    /// Widest width a resize may produce (default: 640).
    pub max_column_width: f32,
    /// Zoom range (default: 0.5..=2.0).
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_column_width: 280.0,
            min_column_width: 160.0,
            max_column_width: 640.0,
            min_zoom: 0.5,
            max_zoom: 2.0,
        }
    }
}

impl LayoutConfig {
    /// Problems with the limits, empty if usable.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let finite_positive = |v: f32| v.is_finite() && v > 0.0;
        if !finite_positive(self.min_column_width) || !finite_positive(self.max_column_width) {
            problems.push("column width limits must be finite and positive".to_owned());
        } else if self.min_column_width > self.max_column_width {
            problems.push(format!(
                "min_column_width {} exceeds max_column_width {}",
                self.min_column_width, self.max_column_width
            ));
        } else if !(self.min_column_width..=self.max_column_width)
            .contains(&self.default_column_width)
        {
            problems.push(format!(
                "default_column_width {} is outside {}..={}",
                self.default_column_width, self.min_column_width, self.max_column_width
            ));
        }
        if !finite_positive(self.min_zoom) || !finite_positive(self.max_zoom) {
            problems.push("zoom limits must be finite and positive".to_owned());
        } else if self.min_zoom > self.max_zoom || !(self.min_zoom..=self.max_zoom).contains(&1.0) {
            problems.push(format!(
                "zoom range {}..={} must be ordered and include 1.0",
                self.min_zoom, self.max_zoom
            ));
        }
        problems
    }

    #[must_use]
    pub fn clamp_width(&self, width: f32) -> f32 {
        width.clamp(self.min_column_width, self.max_column_width)
    }

    #[must_use]
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

// ---------------------------------------------------------------------------
// ColumnPreferences
// ---------------------------------------------------------------------------

/// Persisted column layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnPreferences {
    /// Schema tag; see [`ColumnPreferences::VERSION`].
    pub version: u32,
    pub collapsed: DayMap<bool>,
    pub width: DayMap<f32>,
    /// Last observed rendered height, 0 until measured.
    pub height: DayMap<f32>,
    /// Column display order; always a permutation of the seven days.
    pub order: Vec<Day>,
    pub zoom: f32,
}

impl Default for ColumnPreferences {
    fn default() -> Self {
        Self::defaults(&LayoutConfig::default())
    }
}

impl ColumnPreferences {
    /// Current schema version. Stored blobs with another version are
    /// discarded.
    pub const VERSION: u32 = 1;

    /// Fresh preferences for the given limits.
    #[must_use]
    pub fn defaults(config: &LayoutConfig) -> Self {
        Self {
            version: Self::VERSION,
            collapsed: DayMap::splat(false),
            width: DayMap::splat(config.default_column_width),
            height: DayMap::splat(0.0),
            order: Day::ALL.to_vec(),
            zoom: 1.0,
        }
    }

    /// Whether `order` names each day exactly once.
    #[must_use]
    pub fn order_is_permutation(order: &[Day]) -> bool {
        order.len() == Day::ALL.len() && Day::ALL.iter().all(|day| order.contains(day))
    }

    /// Bring loaded values back inside the limits. Returns what was fixed.
    fn repaired(mut self, config: &LayoutConfig) -> (Self, Vec<&'static str>) {
        let mut fixed = Vec::new();
        if !Self::order_is_permutation(&self.order) {
            self.order = Day::ALL.to_vec();
            fixed.push("order");
        }
        let width = self.width.map(|_, &w| {
            if w.is_finite() && w > 0.0 {
                config.clamp_width(w)
            } else {
                config.default_column_width
            }
        });
        if width != self.width {
            self.width = width;
            fixed.push("width");
        }
        let height = self
            .height
            .map(|_, &h| if h.is_finite() && h >= 0.0 { h } else { 0.0 });
        if height != self.height {
            self.height = height;
            fixed.push("height");
        }
        let zoom = if self.zoom.is_finite() {
            config.clamp_zoom(self.zoom)
        } else {
            1.0
        };
        if zoom != self.zoom {
            self.zoom = zoom;
            fixed.push("zoom");
        }
        (self, fixed)
    }

    #[must_use]
    pub fn with_collapsed(&self, day: Day, collapsed: bool) -> Self {
        let mut next = self.clone();
        next.collapsed[day] = collapsed;
        next
    }

    #[must_use]
    pub fn with_width(&self, day: Day, width: f32) -> Self {
        let mut next = self.clone();
        next.width[day] = width;
        next
    }

    #[must_use]
    pub fn with_height(&self, day: Day, height: f32) -> Self {
        let mut next = self.clone();
        next.height[day] = height;
        next
    }

    #[must_use]
    pub fn with_order(&self, order: Vec<Day>) -> Self {
        Self {
            order,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_zoom(&self, zoom: f32) -> Self {
        Self {
            zoom,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// LayoutStore
// ---------------------------------------------------------------------------

/// How the current preferences were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing stored yet.
    Fresh,
    /// Stored blob restored (possibly with repaired fields).
    Restored,
    /// Stored blob had another schema version.
    VersionMismatch { stored: u32 },
    /// Stored blob could not be parsed.
    Corrupt,
    /// The storage backend failed on read.
    StorageFailed,
}

/// Live preferences plus their persistence.
pub struct LayoutStore {
    prefs: ColumnPreferences,
    config: LayoutConfig,
    storage: Box<dyn PreferenceStorage>,
    frame: FrameWrites,
    status: LoadStatus,
    write_failures: usize,
}

impl fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStore")
            .field("prefs", &self.prefs)
            .field("storage", &self.storage.name())
            .field("pending_writes", &self.frame.len())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl LayoutStore {
    /// Read the stored blob once and build the store. Never fails.
    pub fn load(storage: impl PreferenceStorage + 'static, config: LayoutConfig) -> Self {
        let (prefs, status) = Self::read(&storage, &config);
        tracing::debug!(
            target: "planboard.layout",
            storage = storage.name(),
            ?status,
            "column preferences loaded"
        );
        Self {
            prefs,
            config,
            storage: Box::new(storage),
            frame: FrameWrites::new(),
            status,
            write_failures: 0,
        }
    }

    fn read(storage: &dyn PreferenceStorage, config: &LayoutConfig) -> (ColumnPreferences, LoadStatus) {
        let defaults = || ColumnPreferences::defaults(config);
        let raw = match storage.get(PREFERENCES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return (defaults(), LoadStatus::Fresh),
            Err(err) => {
                tracing::warn!(target: "planboard.layout", error = %err, "preference read failed, using defaults");
                return (defaults(), LoadStatus::StorageFailed);
            }
        };

        // Check the version before trusting the shape of anything else.
        #[derive(Deserialize)]
        struct VersionHeader {
            version: Option<u32>,
        }
        let stored = match serde_json::from_str::<VersionHeader>(&raw) {
            Ok(header) => header.version.unwrap_or(0),
            Err(err) => {
                tracing::warn!(target: "planboard.layout", error = %err, "preference blob is corrupt, using defaults");
                return (defaults(), LoadStatus::Corrupt);
            }
        };
        if stored != ColumnPreferences::VERSION {
            tracing::warn!(
                target: "planboard.layout",
                stored,
                expected = ColumnPreferences::VERSION,
                "preference version mismatch, using defaults"
            );
            return (defaults(), LoadStatus::VersionMismatch { stored });
        }

        let loaded: ColumnPreferences = match serde_json::from_str(&raw) {
            Ok(prefs) => prefs,
            Err(err) => {
                tracing::warn!(target: "planboard.layout", error = %err, "preference blob is corrupt, using defaults");
                return (defaults(), LoadStatus::Corrupt);
            }
        };
        let (prefs, fixed) = loaded.repaired(config);
        if !fixed.is_empty() {
            tracing::warn!(target: "planboard.layout", ?fixed, "repaired stored preferences");
        }
        (prefs, LoadStatus::Restored)
    }

    #[must_use]
    pub fn preferences(&self) -> &ColumnPreferences {
        &self.prefs
    }

    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[must_use]
    pub fn load_status(&self) -> LoadStatus {
        self.status
    }

    /// Storage writes that failed since load.
    #[must_use]
    pub fn write_failures(&self) -> usize {
        self.write_failures
    }

    #[must_use]
    pub fn is_collapsed(&self, day: Day) -> bool {
        self.prefs.collapsed[day]
    }

    /// Effective width of `day`, including a not-yet-flushed resize.
    #[must_use]
    pub fn width(&self, day: Day) -> f32 {
        self.frame
            .pending(day, LayoutField::Width)
            .unwrap_or(self.prefs.width[day])
    }

    /// Flip collapsed/expanded for `day` and persist. Returns the new state.
    pub fn toggle_collapsed(&mut self, day: Day) -> bool {
        let collapsed = !self.prefs.collapsed[day];
        self.set_collapsed(day, collapsed);
        collapsed
    }

    pub fn set_collapsed(&mut self, day: Day, collapsed: bool) {
        if self.prefs.collapsed[day] == collapsed {
            return;
        }
        self.prefs = self.prefs.with_collapsed(day, collapsed);
        tracing::debug!(target: "planboard.layout", %day, collapsed, "column collapse changed");
        self.persist();
    }

    /// Schedule a width for the next frame, clamped to the limits. Returns
    /// `true` if the caller should request an animation frame. Non-finite
    /// widths are ignored.
    pub fn schedule_width(&mut self, day: Day, width: f32) -> bool {
        if !width.is_finite() {
            return false;
        }
        self.frame
            .schedule(day, LayoutField::Width, self.config.clamp_width(width))
    }

    /// Schedule an observed height for the next frame. Negative or
    /// non-finite heights are ignored.
    pub fn schedule_height(&mut self, day: Day, height: f32) -> bool {
        if !height.is_finite() || height < 0.0 {
            return false;
        }
        self.frame.schedule(day, LayoutField::Height, height)
    }

    #[must_use]
    pub fn has_pending_frame(&self) -> bool {
        !self.frame.is_empty()
    }

    /// Apply the frame's coalesced writes and persist once if anything
    /// changed. Returns the number of fields that changed.
    pub fn flush_frame(&mut self) -> usize {
        let batch = self.frame.drain();
        let mut next = self.prefs.clone();
        let mut changed = 0;
        for write in batch {
            let slot = match write.field {
                LayoutField::Width => &mut next.width[write.day],
                LayoutField::Height => &mut next.height[write.day],
            };
            if *slot != write.value {
                *slot = write.value;
                changed += 1;
            }
        }
        if changed > 0 {
            self.prefs = next;
            tracing::trace!(target: "planboard.layout", changed, "frame writes applied");
            self.persist();
        }
        changed
    }

    /// Replace the column order. Returns `false` (and changes nothing) if
    /// `order` is not a permutation of the seven days.
    pub fn set_order(&mut self, order: Vec<Day>) -> bool {
        if !ColumnPreferences::order_is_permutation(&order) {
            tracing::debug!(target: "planboard.layout", ?order, "rejected column order");
            return false;
        }
        if order != self.prefs.order {
            self.prefs = self.prefs.with_order(order);
            self.persist();
        }
        true
    }

    /// Set zoom, clamped to the limits. Non-finite values are ignored.
    /// Returns the effective zoom.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            let zoom = self.config.clamp_zoom(zoom);
            if zoom != self.prefs.zoom {
                self.prefs = self.prefs.with_zoom(zoom);
                self.persist();
            }
        }
        self.prefs.zoom
    }

    /// Back to defaults, persisted.
    pub fn reset(&mut self) {
        self.frame.clear();
        self.prefs = ColumnPreferences::defaults(&self.config);
        self.persist();
    }

    /// Drop frame writes that were never flushed.
    pub fn discard_pending(&mut self) {
        self.frame.clear();
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.prefs)
            .map_err(crate::storage::StorageError::from)
            .and_then(|blob| self.storage.set(PREFERENCES_KEY, &blob));
        if let Err(err) = result {
            self.write_failures += 1;
            tracing::warn!(
                target: "planboard.layout",
                storage = self.storage.name(),
                error = %err,
                "failed to persist column preferences"
            );
        }
    }
}
