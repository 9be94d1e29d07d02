//! Transform plans: YAML files, command-line operations, and built-in presets.
//!
//! A plan file looks like:
//!
//! ```yaml
//! section: data_particles
//! codec: rejoin
//! operations:
//!   - column: _rlnAngleRot
//!     transform: { kind: invert-offset, by: 125 }
//!   - column: _rlnAngleTilt
//!     transform: { kind: invert }
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::{Transform, TransformOp};
use crate::{
    rows::RowCodec,
    scanner::{DEFAULT_SECTION, Dialect},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformPlan {
    #[serde(default = "default_section")]
    pub section: String,
    #[serde(default)]
    pub codec: RowCodec,
    #[serde(default)]
    pub dialect: Dialect,
    pub operations: Vec<TransformOp>,
}

fn default_section() -> String {
    DEFAULT_SECTION.to_string()
}

impl TransformPlan {
    pub fn new(operations: Vec<TransformOp>) -> Self {
        Self {
            section: default_section(),
            codec: RowCodec::default(),
            dialect: Dialect::default(),
            operations,
        }
    }

    pub fn with_codec(mut self, codec: RowCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening plan file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing plan file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let plan: TransformPlan = serde_yaml::from_str(raw)?;
        if plan.operations.is_empty() {
            return Err(anyhow!("Plan defines no operations"));
        }
        for op in &plan.operations {
            op.transform
                .validate()
                .with_context(|| format!("Operation on {}", op.column))?;
        }
        Ok(plan)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn preset(preset: Preset) -> Self {
        const ROT: &str = "_rlnAngleRot";
        const TILT: &str = "_rlnAngleTilt";
        const PSI_PRIOR: &str = "_rlnAnglePsiPrior";
        match preset {
            Preset::Rot180 => Self::new(vec![TransformOp::new(
                ROT,
                Transform::Rotate { by: 180.0 },
            )]),
            Preset::RotateBy180 => Self::new(vec![TransformOp::new(
                ROT,
                Transform::Offset { by: 180.0 },
            )])
            .with_codec(RowCodec::Preserve),
            Preset::Psi90 => Self::new(vec![
                TransformOp::new(PSI_PRIOR, Transform::Offset { by: 90.0 }).optional(),
            ]),
            Preset::Rot125TiltInvert => Self::new(vec![
                TransformOp::new(ROT, Transform::InvertOffset { by: 125.0 }),
                TransformOp::new(TILT, Transform::Invert),
            ]),
        }
    }
}

/// Named plans for the common particle re-orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Rotate _rlnAngleRot by 180 degrees, wrapped into [0, 360)
    #[value(name = "rot180")]
    Rot180,
    /// Add 180 to _rlnAngleRot, keeping the original column spacing
    #[value(name = "rotate-by-180")]
    RotateBy180,
    /// Add 90 to _rlnAnglePsiPrior when the column is present
    #[value(name = "psi90")]
    Psi90,
    /// Set _rlnAngleRot to -rot + 125 and invert _rlnAngleTilt
    #[value(name = "rot125-tilt-invert")]
    Rot125TiltInvert,
}
