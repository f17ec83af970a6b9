use parley_core::utils::SPEAKING_THRESHOLD_DB;

/// Energy-threshold voice activity detection over byte frequency bins.
#[derive(Debug, Clone, Copy)]
pub struct SpeechDetector {
    threshold_db: f32,
}

impl Default for SpeechDetector {
    fn default() -> Self {
        Self::new(SPEAKING_THRESHOLD_DB)
    }
}

impl SpeechDetector {
    pub fn new(threshold_db: f32) -> Self {
        Self { threshold_db }
    }

    pub fn threshold_db(&self) -> f32 {
        self.threshold_db
    }

    /// Average bin magnitude relative to full scale, in decibels.
    /// Silence (or no bins) is negative infinity.
    pub fn level_db(bins: &[u8]) -> f32 {
        if bins.is_empty() {
            return f32::NEG_INFINITY;
        }
        let sum: u32 = bins.iter().map(|&b| u32::from(b)).sum();
        let average = sum as f32 / bins.len() as f32;
        20.0 * (average / 255.0).log10()
    }

    pub fn is_speaking(&self, bins: &[u8], muted: bool) -> bool {
        !muted && Self::level_db(bins) > self.threshold_db
    }
}

/// Reports a value only when it differs from the previous one.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTrigger {
    current: bool,
}

impl EdgeTrigger {
    pub fn current(&self) -> bool {
        self.current
    }

    pub fn update(&mut self, value: bool) -> Option<bool> {
        if value == self.current {
            return None;
        }
        self.current = value;
        Some(value)
    }
}
