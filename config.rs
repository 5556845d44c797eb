/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Tunables for a single layout run, mirroring `servo_config::opts`: a
//! plain, `Default`-able struct rather than a crate-spanning global
//! (SPEC_FULL §10.3).

use app_units::Au;
use serde::{Deserialize, Serialize};

/// Default page size absent an `@page` rule: A4 at 96 CSS px/inch.
pub const DEFAULT_PAGE_WIDTH_PX: f32 = 793.7;
pub const DEFAULT_PAGE_HEIGHT_PX: f32 = 1122.5;
pub const DEFAULT_PAGE_MARGIN_PX: f32 = 72.0;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Fallback font chain used when the font cascade fails entirely
    /// (§7 "if the whole cascade fails the engine picks a platform
    /// serif").
    pub fallback_font_family: String,

    /// Upper bound on multi-column balancing iterations (§4.8 step 2,
    /// §7 "Layout saturation"). Convergence is guaranteed by the
    /// `minSpaceShortage` argument, but a cap still guards against a
    /// pathological style engine returning a non-positive shortage.
    pub max_column_balance_iterations: u32,

    /// Whether the page driver fragments at all; `false` degenerates to a
    /// single unpaginated flow (§4.9 "0 if unpaginated").
    pub fragmentation_enabled: bool,

    pub default_page_width: Au,
    pub default_page_height: Au,
    pub default_page_margin: Au,

    /// Whether the page driver may shrink-to-fit horizontal overflow by
    /// choosing a page scale < 1 (§4.10).
    pub allow_page_shrink_to_fit: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            fallback_font_family: "serif".to_string(),
            max_column_balance_iterations: 32,
            fragmentation_enabled: true,
            default_page_width: Au::from_f32_px(DEFAULT_PAGE_WIDTH_PX),
            default_page_height: Au::from_f32_px(DEFAULT_PAGE_HEIGHT_PX),
            default_page_margin: Au::from_f32_px(DEFAULT_PAGE_MARGIN_PX),
            allow_page_shrink_to_fit: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_positive_page_size() {
        let config = LayoutConfig::default();
        assert!(config.default_page_width.to_f32_px() > 0.0);
        assert!(config.default_page_height.to_f32_px() > 0.0);
    }
}
