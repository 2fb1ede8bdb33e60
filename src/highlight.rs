//! Highlight Engine - per-feature map style computation
//!
//! Pure function of the zone catalog, current gap set, borough selector,
//! highlight state and quick-filter chip. Every call produces the complete
//! style set, so re-applying unchanged inputs yields identical output and the
//! renderer replaces styles wholesale.
//!
//! Tiers, in priority order:
//!   1. OutOfScope  - excluded by the borough selector, always suppressed
//!   2. Emphasized  - in scope and in the applied underserved highlight
//!   3. Gap         - in scope and underserved
//!   4. Normal      - in scope, default fill (heavier when one borough is selected)

use rustc_hash::FxHashSet;

use crate::catalog::ZoneCatalog;
use crate::model::{BoroughScope, GapSet, QuickFilter, ZoneId, ZoneRecord};

const OUTLINE: &str = "#c9d1d9";
const BASE_FILL: &str = "#58a6ff";
const GAP_TONE: &str = "#f0883e";
const EMPHASIS: &str = "#b01f02";

// ============================================================================
// Highlight state
// ============================================================================

/// Borough-panel driven emphasis of underserved zones
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HighlightState {
    pub scope: BoroughScope,
    pub emphasized_ids: FxHashSet<ZoneId>,
    /// Indicator on the borough panel's underserved control
    pub toggle_active: bool,
}

impl HighlightState {
    /// Emphasis is drawn while any ids are emphasized
    pub fn is_applied(&self) -> bool {
        !self.emphasized_ids.is_empty()
    }

    pub fn apply(&mut self, scope: BoroughScope, ids: impl IntoIterator<Item = ZoneId>) {
        self.scope = scope;
        self.emphasized_ids = ids.into_iter().collect();
        self.toggle_active = true;
    }

    pub fn clear(&mut self) {
        self.emphasized_ids.clear();
        self.toggle_active = false;
    }
}

// ============================================================================
// Styles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTier {
    OutOfScope,
    Emphasized,
    Gap,
    Normal,
}

/// Quick-filter visibility, independent of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Dimmed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub stroke_color: &'static str,
    pub fill_color: &'static str,
    pub weight: f64,
    pub stroke_opacity: f64,
    pub fill_opacity: f64,
    /// Drawn above the other features
    pub raised: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStyle {
    pub zone_id: ZoneId,
    pub tier: StyleTier,
    pub visibility: Visibility,
    pub paint: Paint,
}

impl FeatureStyle {
    /// In scope and not dimmed by the quick filter
    pub fn is_visible(&self) -> bool {
        self.tier != StyleTier::OutOfScope && self.visibility == Visibility::Shown
    }
}

/// Full style set for one render pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapStyle {
    pub features: Vec<FeatureStyle>,
    pub visible_count: usize,
}

impl MapStyle {
    pub fn get(&self, zone: ZoneId) -> Option<&FeatureStyle> {
        self.features.iter().find(|f| f.zone_id == zone)
    }

    /// No zone survives scope and quick filter
    pub fn is_empty_selection(&self) -> bool {
        self.visible_count == 0
    }
}

pub struct HighlightInputs<'a> {
    pub catalog: &'a ZoneCatalog,
    pub gaps: &'a GapSet,
    pub scope: &'a BoroughScope,
    pub highlight: &'a HighlightState,
    pub quick_filter: QuickFilter,
}

pub struct HighlightEngine;

impl HighlightEngine {
    pub fn compute(inputs: &HighlightInputs<'_>) -> MapStyle {
        let features: Vec<FeatureStyle> = inputs
            .catalog
            .iter()
            .map(|zone| Self::style_for(zone, inputs))
            .collect();
        let visible_count = features.iter().filter(|f| f.is_visible()).count();
        MapStyle {
            features,
            visible_count,
        }
    }

    pub fn classify(zone: &ZoneRecord, inputs: &HighlightInputs<'_>) -> StyleTier {
        if !inputs.scope.contains(&zone.borough) {
            return StyleTier::OutOfScope;
        }
        let emphasized = inputs.highlight.is_applied()
            && inputs.highlight.scope.contains(&zone.borough)
            && inputs.highlight.emphasized_ids.contains(&zone.id);
        if emphasized {
            StyleTier::Emphasized
        } else if inputs.gaps.contains(&zone.zone_name) {
            StyleTier::Gap
        } else {
            StyleTier::Normal
        }
    }

    fn style_for(zone: &ZoneRecord, inputs: &HighlightInputs<'_>) -> FeatureStyle {
        let tier = Self::classify(zone, inputs);
        let is_gap = inputs.gaps.contains(&zone.zone_name);
        let visibility = if inputs.quick_filter.shows(is_gap) {
            Visibility::Shown
        } else {
            Visibility::Dimmed
        };

        let mut paint = tier_paint(tier, is_gap, inputs.scope.is_all());
        if tier != StyleTier::OutOfScope {
            match (inputs.quick_filter, visibility) {
                (QuickFilter::All, _) => {}
                (_, Visibility::Shown) => {
                    paint.stroke_opacity = 1.0;
                    paint.fill_opacity = if is_gap { 0.6 } else { 0.3 };
                }
                (_, Visibility::Dimmed) => {
                    paint.stroke_opacity = 0.1;
                    paint.fill_opacity = 0.05;
                    paint.raised = false;
                }
            }
        }

        FeatureStyle {
            zone_id: zone.id,
            tier,
            visibility,
            paint,
        }
    }
}

fn tier_paint(tier: StyleTier, is_gap: bool, citywide: bool) -> Paint {
    match tier {
        StyleTier::OutOfScope => Paint {
            stroke_color: OUTLINE,
            fill_color: if is_gap { GAP_TONE } else { BASE_FILL },
            weight: 0.5,
            stroke_opacity: 1.0,
            fill_opacity: 0.02,
            raised: false,
        },
        StyleTier::Emphasized => Paint {
            stroke_color: EMPHASIS,
            fill_color: EMPHASIS,
            weight: 4.0,
            stroke_opacity: 1.0,
            fill_opacity: 0.8,
            raised: true,
        },
        StyleTier::Gap => Paint {
            stroke_color: GAP_TONE,
            fill_color: GAP_TONE,
            weight: if citywide { 2.0 } else { 3.0 },
            stroke_opacity: 1.0,
            fill_opacity: if citywide { 0.5 } else { 0.4 },
            raised: false,
        },
        StyleTier::Normal => Paint {
            stroke_color: OUTLINE,
            fill_color: BASE_FILL,
            weight: if citywide { 1.0 } else { 3.0 },
            stroke_opacity: 1.0,
            fill_opacity: if citywide { 0.1 } else { 0.4 },
            raised: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GapRecord;
    use approx::assert_relative_eq;

    fn zone(id: u32, borough: &str, name: &str) -> ZoneRecord {
        ZoneRecord {
            id: ZoneId(id),
            borough: borough.into(),
            zone_name: name.into(),
            geometry: None,
        }
    }

    fn fixture() -> (ZoneCatalog, GapSet) {
        let catalog = ZoneCatalog::from_records(vec![
            zone(1, "X", "A"),
            zone(2, "X", "B"),
            zone(3, "Y", "C"),
        ]);
        let gaps = GapSet::from_records(vec![
            GapRecord { zone_name: "A".into(), borough: Some("X".into()), ratio: 2.5 },
            GapRecord { zone_name: "C".into(), borough: Some("Y".into()), ratio: 3.1 },
        ]);
        (catalog, gaps)
    }

    fn compute(
        catalog: &ZoneCatalog,
        gaps: &GapSet,
        scope: &BoroughScope,
        highlight: &HighlightState,
        quick_filter: QuickFilter,
    ) -> MapStyle {
        HighlightEngine::compute(&HighlightInputs {
            catalog,
            gaps,
            scope,
            highlight,
            quick_filter,
        })
    }

    #[test]
    fn test_borough_scope_suppresses_other_boroughs() {
        let (catalog, gaps) = fixture();
        let scope = BoroughScope::named("X");
        let style = compute(&catalog, &gaps, &scope, &HighlightState::default(), QuickFilter::All);

        assert_eq!(style.get(ZoneId(1)).unwrap().tier, StyleTier::Gap);
        assert_eq!(style.get(ZoneId(2)).unwrap().tier, StyleTier::Normal);
        // C is a gap but out of scope
        let c = style.get(ZoneId(3)).unwrap();
        assert_eq!(c.tier, StyleTier::OutOfScope);
        assert_relative_eq!(c.paint.fill_opacity, 0.02);
        assert_eq!(style.visible_count, 2);
    }

    #[test]
    fn test_single_borough_scales_normal_weight() {
        let (catalog, gaps) = fixture();
        let citywide = compute(&catalog, &gaps, &BoroughScope::All, &HighlightState::default(), QuickFilter::All);
        let scoped = compute(&catalog, &gaps, &BoroughScope::named("X"), &HighlightState::default(), QuickFilter::All);

        assert_relative_eq!(citywide.get(ZoneId(2)).unwrap().paint.weight, 1.0);
        assert_relative_eq!(scoped.get(ZoneId(2)).unwrap().paint.weight, 3.0);
    }

    #[test]
    fn test_emphasis_outranks_gap() {
        let (catalog, gaps) = fixture();
        let mut highlight = HighlightState::default();
        highlight.apply(BoroughScope::named("X"), [ZoneId(1)]);
        let style = compute(&catalog, &gaps, &BoroughScope::All, &highlight, QuickFilter::All);

        let a = style.get(ZoneId(1)).unwrap();
        assert_eq!(a.tier, StyleTier::Emphasized);
        assert!(a.paint.raised);
        assert_relative_eq!(a.paint.weight, 4.0);
        // C is a gap in another borough, untouched by the X highlight
        assert_eq!(style.get(ZoneId(3)).unwrap().tier, StyleTier::Gap);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let (catalog, gaps) = fixture();
        let mut highlight = HighlightState::default();
        highlight.apply(BoroughScope::All, [ZoneId(3)]);
        let scope = BoroughScope::named("Y");
        let first = compute(&catalog, &gaps, &scope, &highlight, QuickFilter::Underserved);
        let second = compute(&catalog, &gaps, &scope, &highlight, QuickFilter::Underserved);
        assert_eq!(first, second);
    }

    #[test]
    fn test_quick_filter_underserved_then_all_restores() {
        let (catalog, gaps) = fixture();
        let none = HighlightState::default();
        let underserved = compute(&catalog, &gaps, &BoroughScope::All, &none, QuickFilter::Underserved);
        assert_eq!(underserved.get(ZoneId(2)).unwrap().visibility, Visibility::Dimmed);
        assert_eq!(underserved.visible_count, 2);

        let all = compute(&catalog, &gaps, &BoroughScope::All, &none, QuickFilter::All);
        assert!(all.features.iter().all(|f| f.visibility == Visibility::Shown));
        assert_eq!(all.visible_count, 3);
    }

    #[test]
    fn test_empty_selection_detected() {
        let (catalog, _) = fixture();
        let style = compute(&catalog, &GapSet::default(), &BoroughScope::All, &HighlightState::default(), QuickFilter::Underserved);
        assert!(style.is_empty_selection());
    }

    #[test]
    fn test_highlight_clear_resets_toggle() {
        let mut highlight = HighlightState::default();
        highlight.apply(BoroughScope::named("Brooklyn"), [ZoneId(1), ZoneId(2)]);
        assert!(highlight.is_applied() && highlight.toggle_active);
        highlight.clear();
        assert!(!highlight.is_applied());
        assert!(!highlight.toggle_active);
    }
}
