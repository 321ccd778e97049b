use crate::foundation::core::AnimationId;
use crate::foundation::error::TimewaveResult;
use crate::geometry::drag::EasingEditor;
use crate::keyframes::{Keyframe, resolve_offsets};
use crate::model::property::{TrackedProperty, track_properties};
use crate::raster::cache::RasterCache;
use crate::timing::description::{TimeLayout, TimingDescription};

/// The element an animation is attached to. Opaque to sampling; only used for labels.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TargetDesc {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
}

impl TargetDesc {
    /// `tag#id`, or `tag.class1.class2` when there is no id.
    pub fn label(&self) -> String {
        let tag = self.tag.to_ascii_lowercase();
        match &self.id {
            Some(id) if !id.is_empty() => format!("{tag}#{id}"),
            _ => {
                let mut out = tag;
                for c in &self.classes {
                    out.push('.');
                    out.push_str(c);
                }
                out
            }
        }
    }
}

/// A ruler tick: a time value and its horizontal position as a fraction of the width.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct RulerLabel {
    pub value: f64,
    pub fraction: f64,
}

/// Everything the inspector tracks for one animation.
#[derive(Debug)]
pub struct AnimationContext {
    pub id: AnimationId,
    pub target: TargetDesc,
    pub timing: TimingDescription,
    pub keyframes: Vec<Keyframe>,
    pub properties: Vec<TrackedProperty>,
    pub time_layout: TimeLayout,
    pub cache: RasterCache,
    pub editor: EasingEditor,
}

impl AnimationContext {
    pub fn build(
        id: AnimationId,
        target: TargetDesc,
        timing: TimingDescription,
        mut keyframes: Vec<Keyframe>,
        time_layout: TimeLayout,
        canvas_height: u32,
    ) -> TimewaveResult<Self> {
        timing.validate()?;
        resolve_offsets(&mut keyframes)?;
        let properties = track_properties(&keyframes, canvas_height)?;
        Ok(Self {
            id,
            target,
            timing,
            keyframes,
            properties,
            time_layout,
            cache: RasterCache::default(),
            editor: EasingEditor::default(),
        })
    }

    pub fn property(&self, name: &str) -> Option<&TrackedProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn total_time(&self) -> f64 {
        self.timing.total_time(self.time_layout)
    }

    pub fn display_window(&self) -> f64 {
        self.timing.display_window(self.time_layout)
    }

    /// Labels at `0`, half the total time and the total time.
    pub fn ruler_labels(&self) -> [RulerLabel; 3] {
        let total = self.total_time();
        let window = self.display_window();
        let per_label = total / 2.0;
        std::array::from_fn(|i| {
            let value = per_label * i as f64;
            let fraction = if window > 0.0 { value / window } else { 0.0 };
            RulerLabel { value, fraction }
        })
    }

    /// Replace timing and drop every cached layer. Tracked property ranges are left alone.
    pub fn set_timing(&mut self, timing: TimingDescription) -> TimewaveResult<()> {
        timing.validate()?;
        self.timing = timing;
        self.cache.invalidate();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/context.rs"]
mod tests;
