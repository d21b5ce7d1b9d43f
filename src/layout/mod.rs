//! Page geometry: the canonical size survey and per-page render scale.

mod scale;
mod survey;

pub use scale::{render_scale, ScalePlan};
pub use survey::{canonical_size, SizeSurvey};
