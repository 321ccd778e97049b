use std::collections::BTreeMap;

use crate::config::InspectorOpts;
use crate::engine::keyframe::KeyframeEngine;
use crate::foundation::core::AnimationId;
use crate::foundation::error::{TimewaveError, TimewaveResult};
use crate::keyframes::Keyframe;
use crate::model::context::TargetDesc;
use crate::timing::description::TimingDescription;

/// A JSON document describing a page's animations and how to inspect them.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct InspectorDoc {
    #[serde(default)]
    pub opts: InspectorOpts,
    pub animations: Vec<AnimationDoc>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AnimationDoc {
    /// Defaults to `animation-N` by position.
    #[serde(default)]
    pub id: Option<AnimationId>,
    #[serde(default)]
    pub target: TargetDesc,
    pub timing: TimingDescription,
    pub keyframes: Vec<Keyframe>,
    /// Unanimated style of the target, used outside the active interval without fill.
    #[serde(default)]
    pub base: BTreeMap<String, String>,
}

impl InspectorDoc {
    pub fn from_json(s: &str) -> TimewaveResult<Self> {
        let doc: Self = serde_json::from_str(s).map_err(|e| TimewaveError::serde(e.to_string()))?;
        doc.opts.validate()?;
        Ok(doc)
    }

    pub fn to_json_pretty(&self) -> TimewaveResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TimewaveError::serde(e.to_string()))
    }

    /// Load every animation into a fresh [`KeyframeEngine`].
    pub fn build_engine(&self) -> TimewaveResult<KeyframeEngine> {
        let mut engine = KeyframeEngine::new();
        for (i, a) in self.animations.iter().enumerate() {
            let id = a
                .id
                .clone()
                .unwrap_or_else(|| AnimationId::from_ordinal(i + 1));
            engine.add_with_id(
                id,
                a.target.clone(),
                a.timing,
                a.keyframes.clone(),
                a.base.clone(),
            )?;
        }
        Ok(engine)
    }
}
