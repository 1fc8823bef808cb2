use crate::problem::Problem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub mode: Mode,

    /// The browser host renders at min(devicePixelRatio, max_pixel_ratio).
    pub max_pixel_ratio: f64,

    /// Seconds. Caps how far a single frame can advance the animation.
    pub max_frame_time: Option<f32>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mode: Mode::Normal,
            max_pixel_ratio: 2.0,
            max_frame_time: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, Problem> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Both limits must be positive and finite.
    pub fn validate(&self) -> Result<(), Problem> {
        if !(self.max_pixel_ratio.is_finite() && self.max_pixel_ratio > 0.0) {
            return Err(Problem::InvalidSetting {
                name: "maxPixelRatio",
                value: self.max_pixel_ratio,
            });
        }

        if let Some(max_frame_time) = self.max_frame_time {
            if !(max_frame_time.is_finite() && max_frame_time > 0.0) {
                return Err(Problem::InvalidSetting {
                    name: "maxFrameTime",
                    value: f64::from(max_frame_time),
                });
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Default, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum Mode {
    #[default]
    Normal,
    DebugNoise,
}

impl Mode {
    pub fn all() -> &'static [Mode] {
        &[Mode::Normal, Mode::DebugNoise]
    }

    pub(crate) fn fragment_entry_point(&self) -> &'static str {
        match self {
            Mode::Normal => "fs_main",
            Mode::DebugNoise => "fs_noise",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
    }

    #[test]
    fn test_camel_case_fields() {
        let settings = Settings::from_json(
            r#"{ "mode": "DebugNoise", "maxPixelRatio": 1.5, "maxFrameTime": 0.1 }"#,
        )
        .unwrap();

        assert_eq!(settings.mode, Mode::DebugNoise);
        assert_eq!(settings.max_pixel_ratio, 1.5);
        assert_eq!(settings.max_frame_time, Some(0.1));
    }

    #[test]
    fn test_rejects_bad_limits() {
        for json in [
            r#"{ "maxFrameTime": -1.0 }"#,
            r#"{ "maxFrameTime": 0.0 }"#,
            r#"{ "maxPixelRatio": 0.0 }"#,
            r#"{ "maxPixelRatio": -2.0 }"#,
        ] {
            assert!(
                matches!(
                    Settings::from_json(json),
                    Err(Problem::InvalidSetting { .. })
                ),
                "{}",
                json
            );
        }
    }

    #[test]
    fn test_rejects_non_finite_limits() {
        let settings = Settings {
            max_pixel_ratio: f64::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            max_frame_time: Some(f32::INFINITY),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(Settings::from_json(r#"{ "mode": "Plasma" }"#).is_err());
    }
}
