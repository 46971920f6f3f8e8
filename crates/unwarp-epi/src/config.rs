//! Run configuration.

use crate::modulation::Modulation;

/// Settings for an unwarping run.
#[derive(Debug, Clone, PartialEq)]
pub struct UnwarpConfig {
    /// Intensity modulation applied to each sample.
    pub modulation: Modulation,
    /// Volume the field map is aligned to, if any.
    pub alignment: Option<usize>,
    /// Output value where the displaced position falls outside the data.
    pub background: f64,
}

impl Default for UnwarpConfig {
    fn default() -> Self {
        Self {
            modulation: Modulation::Jacobian,
            alignment: None,
            background: 0.0,
        }
    }
}

impl UnwarpConfig {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable Jacobian modulation.
    pub fn without_modulation(mut self) -> Self {
        self.modulation = Modulation::None;
        self
    }

    /// Set the modulation mode.
    pub fn with_modulation(mut self, modulation: Modulation) -> Self {
        self.modulation = modulation;
        self
    }

    /// Align the field to volume `index`.
    pub fn with_alignment(mut self, index: usize) -> Self {
        self.alignment = Some(index);
        self
    }

    /// Set the alignment volume from a signed index; negative means none.
    pub fn with_field_index(mut self, index: i64) -> Self {
        self.alignment = usize::try_from(index).ok();
        self
    }

    /// Set the background value of the data sampler.
    pub fn with_background(mut self, value: f64) -> Self {
        self.background = value;
        self
    }
}
