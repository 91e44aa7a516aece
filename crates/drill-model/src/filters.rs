//! Cross-cutting view filters.
//!
//! Filters are logically global: one active set applies to the whole drill
//! path. Each stack entry still keeps its own copy so that breadcrumb
//! navigation can restore the filters that were active at that depth.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

// =============================================================================
// TIME RANGE
// =============================================================================

/// Preset time windows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    /// Last 24 hours.
    Day,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    #[default]
    Month,
    /// Last 90 days.
    Quarter,
    /// Last 12 months.
    Year,
}

impl TimeRange {
    /// Wire tag used in the query string.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Day => "24h",
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
            Self::Year => "12m",
        }
    }

    /// Display label for pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Day => "Last 24 hours",
            Self::Week => "Last 7 days",
            Self::Month => "Last 30 days",
            Self::Quarter => "Last 90 days",
            Self::Year => "Last 12 months",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "24h" => Some(Self::Day),
            "7d" => Some(Self::Week),
            "30d" => Some(Self::Month),
            "90d" => Some(Self::Quarter),
            "12m" => Some(Self::Year),
            _ => None,
        }
    }

    /// All presets, shortest first.
    pub const fn all() -> &'static [TimeRange] {
        &[Self::Day, Self::Week, Self::Month, Self::Quarter, Self::Year]
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for TimeRange {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(&s.trim().to_lowercase())
            .ok_or_else(|| ModelError::UnknownRange(s.to_string()))
    }
}

// =============================================================================
// VIEW MODE
// =============================================================================

/// How the current scope is visualized.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewMode {
    /// Choropleth map.
    #[default]
    Map,
    /// Heat grid.
    Heat,
}

impl ViewMode {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Heat => "heat",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "map" => Some(Self::Map),
            "heat" => Some(Self::Heat),
            _ => None,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for ViewMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(&s.trim().to_lowercase())
            .ok_or_else(|| ModelError::UnknownViewMode(s.to_string()))
    }
}

// =============================================================================
// FILTERS
// =============================================================================

/// Active filter set.
///
/// `metric` is an opaque key; this crate never checks it against a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filters {
    /// Selected metric key.
    pub metric: String,
    /// Time window.
    pub range: TimeRange,
    /// Visualization mode.
    pub view_mode: ViewMode,
    /// Optional overlay layer key.
    pub overlay: Option<String>,
}

impl Filters {
    /// Create filters for a metric with default range and view.
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = view_mode;
        self
    }

    /// Set the overlay. An empty key means no overlay.
    #[must_use]
    pub fn with_overlay(mut self, overlay: Option<String>) -> Self {
        self.overlay = overlay.filter(|overlay| !overlay.is_empty());
        self
    }

    /// Return a copy with `patch` applied. Unset patch fields keep their value.
    ///
    /// Setting an empty overlay clears it.
    #[must_use]
    pub fn apply(&self, patch: &FilterPatch) -> Self {
        Self {
            metric: patch.metric.clone().unwrap_or_else(|| self.metric.clone()),
            range: patch.range.unwrap_or(self.range),
            view_mode: patch.view_mode.unwrap_or(self.view_mode),
            overlay: match &patch.overlay {
                Some(Some(overlay)) if overlay.is_empty() => None,
                Some(overlay) => overlay.clone(),
                None => self.overlay.clone(),
            },
        }
    }
}

/// Partial filter update.
///
/// `overlay` is doubly optional: `Some(None)` clears the overlay, `None`
/// leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPatch {
    pub metric: Option<String>,
    pub range: Option<TimeRange>,
    pub view_mode: Option<ViewMode>,
    pub overlay: Option<Option<String>>,
}

impl FilterPatch {
    pub fn metric(metric: impl Into<String>) -> Self {
        Self {
            metric: Some(metric.into()),
            ..Self::default()
        }
    }

    pub fn range(range: TimeRange) -> Self {
        Self {
            range: Some(range),
            ..Self::default()
        }
    }

    pub fn view_mode(view_mode: ViewMode) -> Self {
        Self {
            view_mode: Some(view_mode),
            ..Self::default()
        }
    }

    pub fn overlay(overlay: Option<String>) -> Self {
        Self {
            overlay: Some(overlay),
            ..Self::default()
        }
    }

    /// Merge `other` over `self`; fields set in `other` win.
    #[must_use]
    pub fn merge(mut self, other: FilterPatch) -> Self {
        if other.metric.is_some() {
            self.metric = other.metric;
        }
        if other.range.is_some() {
            self.range = other.range;
        }
        if other.view_mode.is_some() {
            self.view_mode = other.view_mode;
        }
        if other.overlay.is_some() {
            self.overlay = other.overlay;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.metric.is_none()
            && self.range.is_none()
            && self.view_mode.is_none()
            && self.overlay.is_none()
    }
}
