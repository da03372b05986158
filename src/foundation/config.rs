use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::foundation::error::{MixerError, MixerResult};

const MAX_CANCEL_JOIN_TIMEOUT_MS: u64 = 10_000;

/// Resampling kernel used when images are resized to the common shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    /// Lanczos with window 3.
    #[default]
    Lanczos3,
    /// Cubic (Catmull-Rom).
    CatmullRom,
    /// Gaussian.
    Gaussian,
    /// Linear.
    Triangle,
    /// Nearest neighbour.
    Nearest,
}

impl ResampleFilter {
    pub(crate) fn to_image_filter(self) -> image::imageops::FilterType {
        use image::imageops::FilterType;
        match self {
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::Nearest => FilterType::Nearest,
        }
    }
}

/// Tunables shared by the image stores, the mixing engine and the job runner.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MixerConfig {
    /// Kernel used by size unification.
    pub resample_filter: ResampleFilter,
    /// Upper bound on how long `cancel_running` waits for a superseded job.
    pub cancel_join_timeout_ms: u64,
    /// Run FFT row/column passes on the rayon pool.
    pub parallel_fft: bool,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            resample_filter: ResampleFilter::default(),
            cancel_join_timeout_ms: 100,
            parallel_fft: true,
        }
    }
}

impl MixerConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(s: &str) -> MixerResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| MixerError::validation(format!("invalid mixer config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> MixerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read mixer config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Reject values outside their supported range.
    pub fn validate(&self) -> MixerResult<()> {
        if self.cancel_join_timeout_ms > MAX_CANCEL_JOIN_TIMEOUT_MS {
            return Err(MixerError::validation(format!(
                "cancel_join_timeout_ms must be <= {MAX_CANCEL_JOIN_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }

    /// `cancel_join_timeout_ms` as a [`Duration`].
    pub fn cancel_join_timeout(&self) -> Duration {
        Duration::from_millis(self.cancel_join_timeout_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
