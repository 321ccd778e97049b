use crate::foundation::error::TimewaveResult;
use crate::keyframes::{Keyframe, PropertyKind, parse_value};

/// Value range of one animated property, observed across its declared keyframes.
///
/// Built once from keyframe literals; later timing edits never widen or narrow it.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TrackedProperty {
    pub name: String,
    pub kind: PropertyKind,
    pub min: f64,
    pub max: f64,
    /// Number of keyframes declaring this property.
    pub sample_count: usize,
    /// `canvas_height / (max - min)`, or `0` for a property that never changes.
    pub vertical_scale: f64,
}

impl TrackedProperty {
    fn observe(name: &str, kind: PropertyKind, v: f64) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            min: v,
            max: v,
            sample_count: 1,
            vertical_scale: 0.0,
        }
    }

    fn finish(&mut self, canvas_height: f64) {
        let distance = self.max - self.min;
        self.vertical_scale = if distance == 0.0 {
            0.0
        } else {
            canvas_height / distance
        };
    }

    /// Y coordinate (from the top) where a sample of `value` ends its column.
    pub fn column_top(&self, value: f64, canvas_height: f64) -> f64 {
        canvas_height - (value - self.min) * self.vertical_scale
    }
}

/// Tracked properties in discovery order (first keyframe first, declaration order within it).
///
/// Properties whose literals cannot be reduced to a number or color are left out.
pub fn track_properties(
    keyframes: &[Keyframe],
    canvas_height: u32,
) -> TimewaveResult<Vec<TrackedProperty>> {
    let mut out: Vec<TrackedProperty> = Vec::new();
    let mut rejected: Vec<String> = Vec::new();

    for kf in keyframes {
        for (name, literal) in &kf.values {
            if rejected.contains(name) {
                continue;
            }
            let parsed = match parse_value(literal) {
                Ok(p) => p,
                Err(err) => {
                    tracing::warn!(property = %name, %err, "property is not drawable; skipping");
                    out.retain(|p| &p.name != name);
                    rejected.push(name.clone());
                    continue;
                }
            };
            let v = parsed.scalar();
            match out.iter_mut().find(|p| &p.name == name) {
                Some(p) => {
                    p.min = p.min.min(v);
                    p.max = p.max.max(v);
                    p.sample_count += 1;
                }
                None => out.push(TrackedProperty::observe(name, parsed.kind(name), v)),
            }
        }
    }

    let h = f64::from(canvas_height);
    for p in &mut out {
        p.finish(h);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/model/property.rs"]
mod tests;
