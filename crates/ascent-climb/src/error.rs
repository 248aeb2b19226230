/// Errors that can occur while loading or validating climb configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse climb config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("climbing half-height {climbing} must be below standing half-height {standing}")]
    HalfHeightOrder { climbing: f32, standing: f32 },

    #[error("probe capsule half-height {half_height} is smaller than its radius {radius}")]
    ProbeCapsule { radius: f32, half_height: f32 },

    #[error("stop angle {0} is outside 0..=180 degrees")]
    StopAngle(f32),
}
