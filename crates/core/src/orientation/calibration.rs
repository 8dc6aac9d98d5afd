//! Zero-point calibration
//!
//! The first orientation decoded after boot becomes the zero reference and
//! every later sample is reported relative to it. There is no command to
//! re-zero; the reference lives until power-off.

use super::EulerAngles;

/// One-shot zero reference
///
/// ```text
/// Uncalibrated --first sample--> Calibrated(baseline)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ZeroReference {
    /// No sample seen yet
    #[default]
    Uncalibrated,
    /// Baseline captured from the first sample
    Calibrated(EulerAngles),
}

impl ZeroReference {
    pub const fn new() -> Self {
        Self::Uncalibrated
    }

    /// Return `sample` relative to the baseline, capturing it on first use.
    ///
    /// The first call returns all zeros.
    pub fn apply(&mut self, sample: EulerAngles) -> EulerAngles {
        let baseline = match *self {
            Self::Uncalibrated => {
                *self = Self::Calibrated(sample);
                sample
            }
            Self::Calibrated(baseline) => baseline,
        };
        sample - baseline
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self, Self::Calibrated(_))
    }

    pub fn baseline(&self) -> Option<EulerAngles> {
        match self {
            Self::Uncalibrated => None,
            Self::Calibrated(baseline) => Some(*baseline),
        }
    }
}
