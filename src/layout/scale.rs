//! Render scale calculation.

use crate::model::Dimension;
use serde::{Deserialize, Serialize};

/// Window size and device-scale multiplier for one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalePlan {
    /// Window size handed to the rasterizer
    pub window: Dimension,

    /// Uniform device-scale multiplier, never below 1.0
    pub scale: f64,
}

/// Compute the window and scale that render a page at least as large as
/// the canonical size.
///
/// A page without a viewport is rendered at the canonical size. A viewport
/// already covering the canonical size renders natively; otherwise the
/// smallest uniform multiplier that covers it in both axes is used. Pages
/// are never scaled below their declared viewport.
pub fn render_scale(canonical: Dimension, viewport: Dimension) -> ScalePlan {
    let window = if viewport.is_degenerate() {
        canonical
    } else {
        viewport
    };

    let scale = if window.covers(canonical) {
        1.0
    } else {
        let sx = canonical.width as f64 / window.width as f64;
        let sy = canonical.height as f64 / window.height as f64;
        sx.max(sy).max(1.0)
    };

    ScalePlan { window, scale }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: Dimension = Dimension::new(1200, 1600);

    #[test]
    fn test_no_viewport_uses_canonical() {
        let plan = render_scale(CANONICAL, Dimension::UNSPECIFIED);
        assert_eq!(plan.window, CANONICAL);
        assert_eq!(plan.scale, 1.0);
    }

    #[test]
    fn test_larger_viewport_native() {
        let plan = render_scale(CANONICAL, Dimension::new(1500, 2000));
        assert_eq!(plan.window, Dimension::new(1500, 2000));
        assert_eq!(plan.scale, 1.0);
    }

    #[test]
    fn test_smaller_viewport_upscales() {
        let plan = render_scale(CANONICAL, Dimension::new(600, 800));
        assert_eq!(plan.window, Dimension::new(600, 800));
        assert_eq!(plan.scale, 2.0);
    }

    #[test]
    fn test_uses_larger_axis_ratio() {
        let plan = render_scale(CANONICAL, Dimension::new(600, 1000));
        assert_eq!(plan.scale, 2.0);
        let plan = render_scale(CANONICAL, Dimension::new(1000, 400));
        assert_eq!(plan.scale, 4.0);
    }

    #[test]
    fn test_one_axis_covered() {
        let plan = render_scale(CANONICAL, Dimension::new(2400, 800));
        assert_eq!(plan.scale, 2.0);
    }

    #[test]
    fn test_half_declared_viewport_treated_as_absent() {
        let plan = render_scale(CANONICAL, Dimension::new(600, 0));
        assert_eq!(plan.window, CANONICAL);
        assert_eq!(plan.scale, 1.0);
    }

    #[test]
    fn test_scale_never_below_one() {
        let canonicals = [(1, 1), (600, 800), (1200, 1600), (4000, 3000)];
        let viewports = [(0, 0), (1, 1), (300, 2000), (599, 801), (600, 800), (8000, 8000)];
        for &c in &canonicals {
            for &v in &viewports {
                let plan = render_scale(Dimension::from(c), Dimension::from(v));
                assert!(plan.scale >= 1.0, "{:?} / {:?} -> {}", c, v, plan.scale);
                let out = Dimension::new(
                    (plan.window.width as f64 * plan.scale).ceil() as u32,
                    (plan.window.height as f64 * plan.scale).ceil() as u32,
                );
                assert!(out.covers(Dimension::from(c)));
            }
        }
    }
}
