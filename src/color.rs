use std::collections::BTreeMap;
use std::str::FromStr;

use palette::{Darken, IntoColor, Hsl, Srgb};

use crate::data::model::FundingSource;

// ---------------------------------------------------------------------------
// Series palette: funding source → colour
// ---------------------------------------------------------------------------

/// Fixed colours per series, shared by the chart and the composition bar.
const SERIES_HEX: [(FundingSource, &str); 5] = [
    (FundingSource::Total, "#3B82F6"),
    (FundingSource::Government, "#EF4444"),
    (FundingSource::PrepaidPrivate, "#10B981"),
    (FundingSource::OutOfPocket, "#F59E0B"),
    (FundingSource::DevelopmentAssistance, "#8B5CF6"),
];

/// Maps each series to its display colour.
#[derive(Debug, Clone)]
pub struct SeriesPalette {
    mapping: BTreeMap<FundingSource, Srgb<u8>>,
    default_color: Srgb<u8>,
}

impl Default for SeriesPalette {
    fn default() -> Self {
        let mapping = SERIES_HEX
            .iter()
            .filter_map(|&(source, hex)| Srgb::<u8>::from_str(hex).ok().map(|c| (source, c)))
            .collect();
        SeriesPalette {
            mapping,
            default_color: Srgb::new(107, 114, 128),
        }
    }
}

impl SeriesPalette {
    pub fn color_for(&self, source: FundingSource) -> Srgb<u8> {
        self.mapping
            .get(&source)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// `#RRGGBB` for CSS and Plotly.
    pub fn hex(&self, source: FundingSource) -> String {
        let c = self.color_for(source);
        format!("#{:02X}{:02X}{:02X}", c.red, c.green, c.blue)
    }

    /// Translucent variant for box fills.
    pub fn fill(&self, source: FundingSource, alpha: f32) -> String {
        let c = self.color_for(source);
        format!("rgba({}, {}, {}, {alpha})", c.red, c.green, c.blue)
    }

    /// A darker shade for box outlines and hover labels.
    pub fn outline(&self, source: FundingSource) -> String {
        let rgb: Srgb<f32> = self.color_for(source).into_format();
        let hsl: Hsl = rgb.into_color();
        let darker: Srgb<f32> = hsl.darken(0.15).into_color();
        let c: Srgb<u8> = darker.into_format();
        format!("#{:02X}{:02X}{:02X}", c.red, c.green, c.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_series_has_its_own_colour() {
        let palette = SeriesPalette::default();
        assert_eq!(palette.hex(FundingSource::Total), "#3B82F6");
        assert_eq!(palette.hex(FundingSource::DevelopmentAssistance), "#8B5CF6");
        let seen: std::collections::BTreeSet<String> =
            FundingSource::ALL.iter().map(|&s| palette.hex(s)).collect();
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn fill_keeps_channels_and_sets_alpha() {
        let palette = SeriesPalette::default();
        assert_eq!(palette.fill(FundingSource::Government, 0.2), "rgba(239, 68, 68, 0.2)");
    }

    #[test]
    fn outline_is_darker() {
        let palette = SeriesPalette::default();
        let base = palette.color_for(FundingSource::PrepaidPrivate);
        let outline = palette.outline(FundingSource::PrepaidPrivate);
        let darker = Srgb::<u8>::from_str(&outline).expect("hex");
        assert!(u32::from(darker.green) < u32::from(base.green));
    }
}
