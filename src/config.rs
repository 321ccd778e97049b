use crate::foundation::core::{Canvas, Rgba8Premul, Viewport};
use crate::foundation::error::{TimewaveError, TimewaveResult};
use crate::keyframes::color::ColorDef;
use crate::timing::description::TimeLayout;

/// Stroke colors assigned to properties in discovery order.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1f77b488",
    "#ff7f0e88",
    "#2ca02c88",
    "#d6272888",
    "#9467bd88",
    "#8c564b88",
    "#e377c288",
    "#7f7f7f88",
    "#bcbd2288",
    "#17becf88",
];

/// How color and opacity properties are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Every property is a sampled curve; colors use the HSL-sum height proxy.
    #[default]
    Curve,
    /// Colors become keyframe gradients; opacity gets a gradient overlay on top of its curve.
    AreaFill,
}

/// Inspector configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct InspectorOpts {
    /// Pixel size of each animation's property raster.
    pub canvas: Canvas,
    /// Drawing-space size of the easing editor.
    pub easing_viewport: Viewport,
    pub time_layout: TimeLayout,
    pub mode: RenderMode,
    /// CSS color literals, cycled in property discovery order.
    pub palette: Vec<String>,
}

impl Default for InspectorOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 600,
                height: 100,
            },
            easing_viewport: Viewport {
                width: 600.0,
                height: 100.0,
            },
            time_layout: TimeLayout::default(),
            mode: RenderMode::default(),
            palette: DEFAULT_PALETTE.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl InspectorOpts {
    pub fn validate(&self) -> TimewaveResult<()> {
        self.canvas.validate()?;
        Viewport::new(self.easing_viewport.width, self.easing_viewport.height)?;
        let m = self.time_layout.trailing_margin;
        if !m.is_finite() || m < 0.0 {
            return Err(TimewaveError::validation(
                "time_layout.trailing_margin must be finite and >= 0",
            ));
        }
        if self.time_layout.iteration_cap == 0 {
            return Err(TimewaveError::validation(
                "time_layout.iteration_cap must be >= 1",
            ));
        }
        if self.palette.is_empty() {
            return Err(TimewaveError::validation("palette must not be empty"));
        }
        for c in &self.palette {
            ColorDef::parse_css(c)?;
        }
        Ok(())
    }

    /// Palette entry for the `i`-th discovered property.
    pub fn color_for(&self, i: usize) -> TimewaveResult<ColorDef> {
        let literal = self
            .palette
            .get(i % self.palette.len().max(1))
            .ok_or_else(|| TimewaveError::validation("palette must not be empty"))?;
        ColorDef::parse_css(literal)
    }

    pub fn background(&self) -> Rgba8Premul {
        Rgba8Premul::WHITE
    }
}
