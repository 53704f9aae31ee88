//! Slider position to physical value mapping.
//!
//! Linear controls use the slider value as-is. Log-scale controls map a
//! position in `[0, 1]` onto a decade range and quantize the result the same
//! way the device driver does: `floor(10^x) + 1`. Because of that
//! quantization, `to_normalized(to_physical(p))` only returns to `p` within
//! one [`LogScale::quantization_step`].

use crate::error::{PanelError, PanelResult};

/// Decade bounds of a log-scale control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    /// `log10` of the lowest value.
    pub lower: f64,
    /// `log10` of the highest value.
    pub upper: f64,
}

impl LogScale {
    /// Audible frequency range, 20 Hz to 20 kHz.
    pub const AUDIO: LogScale = LogScale {
        lower: 1.301_029_995_663_981_2,
        upper: 4.301_029_995_663_981,
    };

    /// Creates a scale from decade bounds.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Creates a scale from the physical bounds.
    pub fn from_hz(min: f64, max: f64) -> Self {
        Self::new(min.log10(), max.log10())
    }

    fn span(&self) -> f64 {
        self.upper - self.lower
    }

    /// Maps a slider position to a physical value.
    ///
    /// Positions outside `[0, 1]` are not clamped.
    pub fn to_physical(&self, position: f64, log_scale: bool) -> f64 {
        if !log_scale {
            return position;
        }
        10f64.powf(self.lower + self.span() * position).floor() + 1.0
    }

    /// Maps a physical value back to a slider position.
    pub fn to_normalized(&self, value: f64, log_scale: bool) -> PanelResult<f64> {
        if !log_scale {
            return Ok(value);
        }
        // also rejects NaN
        if !(value > 0.0) {
            return Err(PanelError::InvalidValue { value });
        }
        Ok((value.log10() - self.lower) / self.span())
    }

    /// Largest normalized error the quantization can introduce at `position`.
    pub fn quantization_step(&self, position: f64) -> f64 {
        let raw = 10f64.powf(self.lower + self.span() * position);
        (1.0 + 1.0 / raw).log10() / self.span()
    }
}

impl Default for LogScale {
    fn default() -> Self {
        Self::AUDIO
    }
}

/// Maps a slider position to a physical value on the audio scale.
pub fn to_physical(position: f64, log_scale: bool) -> f64 {
    LogScale::AUDIO.to_physical(position, log_scale)
}

/// Maps a physical value to a slider position on the audio scale.
pub fn to_normalized(value: f64, log_scale: bool) -> PanelResult<f64> {
    LogScale::AUDIO.to_normalized(value, log_scale)
}

/// Formats a physical value for a control label.
pub fn format_value(value: f64) -> String {
    format!("{value}")
}
