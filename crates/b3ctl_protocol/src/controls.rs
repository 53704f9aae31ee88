//! The fixed set of tunable device parameters.

/// Low-pass filter cutoff, in Hz.
pub const LPF_CUTOFF: &str = "lpf_cutoff";
/// High-pass filter cutoff, in Hz.
pub const HPF_CUTOFF: &str = "hpf_cutoff";
/// RMS level above which the body actuator fires.
pub const BODY_THRESHOLD: &str = "body_threshold";
/// RMS level above which the mouth actuator fires.
pub const MOUTH_THRESHOLD: &str = "mouth_threshold";
/// RMS averaging window, in milliseconds.
pub const RMS_WINDOW_MS: &str = "rms_window_ms";
/// Minimum interval between actuator flips, in milliseconds.
pub const FLIP_INTERVAL_MS: &str = "flip_interval_ms";
/// Audio chunk size, in milliseconds. Device-only.
pub const CHUNK_SIZE_MS: &str = "chunk_size_ms";
/// Number of audio buffers. Device-only.
pub const BUFFER_COUNT: &str = "buffer_count";
/// Resume position used when leaving pause. Device-only.
pub const SEEK_TIME: &str = "seek_time";

/// Every key the device accepts in its configuration file.
pub const DEVICE_CONFIG_KEYS: [&str; 9] = [
    LPF_CUTOFF,
    HPF_CUTOFF,
    BODY_THRESHOLD,
    MOUTH_THRESHOLD,
    CHUNK_SIZE_MS,
    BUFFER_COUNT,
    SEEK_TIME,
    RMS_WINDOW_MS,
    FLIP_INTERVAL_MS,
];

/// One tunable parameter exposed to the operator as a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Control {
    /// Stable identifier used by the presentation layer.
    pub id: &'static str,
    /// Key name in the device configuration.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Whether the slider position maps onto a logarithmic frequency scale.
    pub log_scale: bool,
}

/// Number of controls shown by the panel.
pub const CONTROL_COUNT: usize = 6;

/// The controls shown by the panel, in display order.
pub static CONTROLS: [Control; CONTROL_COUNT] = [
    Control {
        id: "lpfCutoff",
        key: LPF_CUTOFF,
        label: "LPF cutoff (hz)",
        log_scale: true,
    },
    Control {
        id: "hpfCutoff",
        key: HPF_CUTOFF,
        label: "HPF cutoff (hz)",
        log_scale: true,
    },
    Control {
        id: "bodyThreshold",
        key: BODY_THRESHOLD,
        label: "Body threshold (rms)",
        log_scale: false,
    },
    Control {
        id: "mouthThreshold",
        key: MOUTH_THRESHOLD,
        label: "Mouth threshold (rms)",
        log_scale: false,
    },
    Control {
        id: "rmsWindow",
        key: RMS_WINDOW_MS,
        label: "RMS window (ms)",
        log_scale: false,
    },
    Control {
        id: "flipInterval",
        key: FLIP_INTERVAL_MS,
        label: "Flip interval (ms)",
        log_scale: false,
    },
];

/// Finds a control by its presentation identifier.
pub fn control_by_id(id: &str) -> Option<&'static Control> {
    CONTROLS.iter().find(|c| c.id == id)
}

/// Finds a control by its device config key.
pub fn control_by_key(key: &str) -> Option<&'static Control> {
    CONTROLS.iter().find(|c| c.key == key)
}

/// Finds a control by identifier or config key.
pub fn lookup_control(name: &str) -> Option<&'static Control> {
    control_by_id(name).or_else(|| control_by_key(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn control_table_shape() {
        assert_eq!(CONTROLS.len(), 6);
        let log: Vec<_> = CONTROLS.iter().filter(|c| c.log_scale).map(|c| c.key).collect();
        assert_eq!(log, vec![LPF_CUTOFF, HPF_CUTOFF]);

        let ids: HashSet<_> = CONTROLS.iter().map(|c| c.id).collect();
        let keys: HashSet<_> = CONTROLS.iter().map(|c| c.key).collect();
        assert_eq!(ids.len(), 6);
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn control_keys_are_device_keys() {
        for control in &CONTROLS {
            assert!(DEVICE_CONFIG_KEYS.contains(&control.key), "{}", control.key);
        }
    }

    #[test]
    fn lookup_by_id_and_key() {
        assert_eq!(control_by_id("hpfCutoff").unwrap().key, HPF_CUTOFF);
        assert_eq!(control_by_key(RMS_WINDOW_MS).unwrap().id, "rmsWindow");
        assert_eq!(lookup_control("flip_interval_ms").unwrap().id, "flipInterval");
        assert_eq!(lookup_control("bodyThreshold").unwrap().key, BODY_THRESHOLD);
        assert!(lookup_control("volume").is_none());
        assert!(control_by_key(SEEK_TIME).is_none());
    }
}
