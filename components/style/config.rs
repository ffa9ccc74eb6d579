/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Knobs of the style system that embedders may want to turn.

use crate::media_queries::{Device, MediaType};
use euclid::default::Size2D;
use selectors::matching::QuirksMode;
use serde::{Deserialize, Serialize};

/// The largest number of simple selectors a single style rule may hold before
/// it gets split into several rules.
pub const MAX_SELECTOR_COMPONENT_COUNT: usize = 8192;

/// Global flags for the style system.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Style rules whose selector lists hold more simple selectors than this
    /// are split at parse time.
    pub max_selector_component_count: usize,

    /// Compact rule set buckets after each stylesheet is folded in.
    pub auto_shrink_rule_sets: bool,

    /// When false, only user-agent rules apply.
    pub match_author_and_user_styles: bool,

    /// Whether the document is in quirks mode.
    pub quirks_mode: bool,

    /// Whether the document is a view-source document.
    pub view_source: bool,

    /// The media type media queries are evaluated against.
    pub media_type: String,

    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        StyleConfig {
            max_selector_component_count: MAX_SELECTOR_COMPONENT_COUNT,
            auto_shrink_rule_sets: true,
            match_author_and_user_styles: true,
            quirks_mode: false,
            view_source: false,
            media_type: "screen".to_owned(),
            viewport_width: 800.,
            viewport_height: 600.,
        }
    }
}

impl StyleConfig {
    /// Reads a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        if self.quirks_mode {
            QuirksMode::Quirks
        } else {
            QuirksMode::NoQuirks
        }
    }

    /// The device media queries are evaluated against.
    pub fn device(&self) -> Device {
        Device::new(
            MediaType::from_ident(&self.media_type),
            Size2D::new(self.viewport_width, self.viewport_height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = StyleConfig::from_json(r#"{ "quirks_mode": true, "media_type": "print" }"#)
            .unwrap();
        assert_eq!(config.quirks_mode(), QuirksMode::Quirks);
        assert_eq!(config.max_selector_component_count, MAX_SELECTOR_COMPONENT_COUNT);
        assert_eq!(config.device().media_type(), &MediaType::Print);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(StyleConfig::from_json("{ quirks_mode: yes }").is_err());
    }
}
