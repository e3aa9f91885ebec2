//! Renderer-agnostic wheel geometry
//!
//! Computes everything a renderer needs to draw an unrotated wheel: one arc
//! per run of identical labels, label placement, fill colours and pegs. The
//! engine's rotation is applied on top by the renderer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::segments::SegmentList;

/// Fill palette, assigned to distinct labels in first-appearance order
pub const WHEEL_COLORS: [&str; 14] = [
    "#f87171", "#fb923c", "#facc15", "#a3e635", "#4ade80", "#34d399", "#2dd4bf",
    "#67e8f9", "#60a5fa", "#818cf8", "#a78bfa", "#c084fc", "#f472b6", "#fb7185",
];

/// Fill for labels missing from the colour map
pub const FALLBACK_COLOR: &str = "#374151";

/// Default drawing size (square, px)
pub const DEFAULT_SIZE: f64 = 500.0;

const RIM_MARGIN: f64 = 10.0;
const LABEL_INSET: f64 = 15.0;
const PEG_RADIUS: f64 = 4.0;
const MAX_LABEL_CHARS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Pie slice covering one label group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcGeometry {
    pub start_angle: f64,
    pub end_angle: f64,
    pub start: Point,
    pub end: Point,
    pub large_arc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPlacement {
    pub text: String,
    pub position: Point,
    /// Text rotation around `position` (degrees)
    pub rotation: f64,
    pub anchor: TextAnchor,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupLayout {
    pub label: String,
    pub start_index: usize,
    pub count: usize,
    pub color: String,
    pub arc: ArcGeometry,
    pub text: LabelPlacement,
}

impl GroupLayout {
    /// SVG path data for the slice
    pub fn path_data(&self, center: f64, radius: f64) -> String {
        format!(
            "M {center},{center} L {},{} A {radius},{radius} 0 {} 1 {},{} Z",
            self.arc.start.x,
            self.arc.start.y,
            u8::from(self.arc.large_arc),
            self.arc.end.x,
            self.arc.end.y
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelLayout {
    pub size: f64,
    pub center: f64,
    pub radius: f64,
    pub segment_angle: f64,
    pub groups: Vec<GroupLayout>,
    pub pegs: Vec<Point>,
    pub peg_radius: f64,
}

impl WheelLayout {
    pub fn compute(segments: &SegmentList, size: f64) -> Self {
        let center = size / 2.0;
        let radius = size / 2.0 - RIM_MARGIN;
        let count = segments.len();

        if count == 0 {
            return Self {
                size,
                center,
                radius,
                segment_angle: 0.0,
                groups: Vec::new(),
                pegs: Vec::new(),
                peg_radius: PEG_RADIUS,
            };
        }

        let segment_angle = segments.segment_angle();
        let colors = color_map(segments);
        let on_rim = |degrees: f64, r: f64| Point {
            x: center + r * degrees.to_radians().cos(),
            y: center + r * degrees.to_radians().sin(),
        };

        let groups = segments
            .groups()
            .into_iter()
            .map(|group| {
                let start_angle = segment_angle * group.start_index as f64;
                let group_angle = segment_angle * group.count as f64;
                let end_angle = start_angle + group_angle;

                let text_angle = start_angle + group_angle / 2.0;
                let reversed = text_angle > 90.0 && text_angle < 270.0;

                let text = LabelPlacement {
                    text: truncate_label(&group.label),
                    position: on_rim(text_angle, radius - LABEL_INSET),
                    rotation: if reversed { text_angle - 180.0 } else { text_angle },
                    anchor: if reversed { TextAnchor::Start } else { TextAnchor::End },
                    font_size: font_size(count, group.count),
                };

                GroupLayout {
                    color: colors
                        .get(group.label.as_str())
                        .copied()
                        .unwrap_or(FALLBACK_COLOR)
                        .to_string(),
                    arc: ArcGeometry {
                        start_angle,
                        end_angle,
                        start: on_rim(start_angle, radius),
                        end: on_rim(end_angle, radius),
                        large_arc: group_angle > 180.0,
                    },
                    text,
                    label: group.label,
                    start_index: group.start_index,
                    count: group.count,
                }
            })
            .collect();

        let pegs = (0..count)
            .map(|index| on_rim(segment_angle * index as f64, radius))
            .collect();

        Self {
            size,
            center,
            radius,
            segment_angle,
            groups,
            pegs,
            peg_radius: PEG_RADIUS,
        }
    }
}

/// Colour per distinct label. With fewer labels than colours the picks are
/// spread across the palette.
pub fn color_map(segments: &SegmentList) -> HashMap<&str, &'static str> {
    let unique = segments.unique_labels();
    let palette = WHEEL_COLORS.len();
    let step = if !unique.is_empty() && unique.len() < palette {
        palette / unique.len()
    } else {
        1
    };
    unique
        .into_iter()
        .enumerate()
        .map(|(index, label)| (label, WHEEL_COLORS[(index * step) % palette]))
        .collect()
}

/// Labels longer than 15 characters are cut to 14 plus an ellipsis
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > MAX_LABEL_CHARS {
        let mut short: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
        short.push('…');
        short
    } else {
        label.to_string()
    }
}

/// Bigger wheels get smaller text; merged groups get bigger text
pub fn font_size(segment_count: usize, group_count: usize) -> f64 {
    let base = 30.0 - segment_count as f64 * 0.5;
    (base + group_count.saturating_sub(1) as f64 * 5.0).clamp(10.0, 50.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_empty_wheel_has_no_geometry() {
        let layout = WheelLayout::compute(&SegmentList::default(), DEFAULT_SIZE);
        assert!(layout.groups.is_empty());
        assert!(layout.pegs.is_empty());
        assert_eq!(layout.radius, 240.0);
    }

    #[test]
    fn test_groups_and_pegs() {
        let segments = SegmentList::new(["a", "a", "b", "c"]);
        let layout = WheelLayout::compute(&segments, DEFAULT_SIZE);
        assert_eq!(layout.groups.len(), 3);
        assert_eq!(layout.pegs.len(), 4);

        let first = &layout.groups[0];
        assert_eq!(first.count, 2);
        assert_eq!(first.arc.start_angle, 0.0);
        assert_eq!(first.arc.end_angle, 180.0);
        assert!(!first.arc.large_arc);
        assert_abs_diff_eq!(first.arc.start.x, 490.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.arc.end.x, 10.0, epsilon = 1e-9);
        // Centre at 90°: not reversed (strictly between 90 and 270 flips)
        assert_eq!(first.text.anchor, TextAnchor::End);

        let second = &layout.groups[1];
        assert_eq!(second.text.anchor, TextAnchor::Start);
        assert_abs_diff_eq!(second.text.rotation, 225.0 - 180.0);

        assert_abs_diff_eq!(layout.pegs[1].y, 490.0, epsilon = 1e-9);
    }

    #[test]
    fn test_single_group_uses_large_arc() {
        let segments = SegmentList::new(["x", "x", "x"]);
        let layout = WheelLayout::compute(&segments, DEFAULT_SIZE);
        assert_eq!(layout.groups.len(), 1);
        assert!(layout.groups[0].arc.large_arc);
        let path = layout.groups[0].path_data(layout.center, layout.radius);
        assert!(path.starts_with("M 250,250 L 490,250 A 240,240 0 1 1"));
    }

    #[test]
    fn test_colors_spread_over_palette() {
        let segments = SegmentList::new(["a", "b", "a", "c"]);
        let colors = color_map(&segments);
        assert_eq!(colors.len(), 3);
        // 14 / 3 = step 4
        assert_eq!(colors["a"], WHEEL_COLORS[0]);
        assert_eq!(colors["b"], WHEEL_COLORS[4]);
        assert_eq!(colors["c"], WHEEL_COLORS[8]);

        let many: SegmentList = (0..20).map(|i| i.to_string()).collect();
        let colors = color_map(&many);
        assert_eq!(colors["14"], WHEEL_COLORS[0]);
        assert_eq!(colors["15"], WHEEL_COLORS[1]);
    }

    #[test]
    fn test_label_truncation() {
        assert_eq!(truncate_label("short"), "short");
        assert_eq!(truncate_label("exactly15chars!"), "exactly15chars!");
        assert_eq!(truncate_label("this label is too long"), "this label is …");
        assert_eq!(truncate_label("ääääääääääääääää").chars().count(), 15);
    }

    #[test]
    fn test_font_size_clamped() {
        assert_eq!(font_size(4, 1), 28.0);
        assert_eq!(font_size(4, 3), 38.0);
        assert_eq!(font_size(100, 1), 10.0);
        assert_eq!(font_size(2, 10), 50.0);
    }
}
