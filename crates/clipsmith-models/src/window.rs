//! Highlight window selection result.

use serde::{Deserialize, Serialize};

/// A selected (start, duration) sub-interval of the source media.
///
/// Invariant: `start_secs >= 0`, `duration_secs > 0`, and
/// `start_secs + duration_secs <= source duration`. The last constraint is
/// enforced by clamping rather than erroring, since highlight selection must
/// always yield a usable window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightWindow {
    /// Offset into the source in seconds
    pub start_secs: f64,
    /// Window length in seconds
    pub duration_secs: f64,
}

impl HighlightWindow {
    pub fn new(start_secs: f64, duration_secs: f64) -> Self {
        Self {
            start_secs: start_secs.max(0.0),
            duration_secs,
        }
    }

    /// Clamp the window so it fits inside `total_secs` of media.
    ///
    /// A window longer than the source collapses to the full source:
    /// start 0, duration = total.
    pub fn clamp_to(self, total_secs: f64) -> Self {
        if self.duration_secs >= total_secs {
            return Self {
                start_secs: 0.0,
                duration_secs: total_secs,
            };
        }
        let max_start = total_secs - self.duration_secs;
        Self {
            start_secs: self.start_secs.clamp(0.0, max_start),
            duration_secs: self.duration_secs,
        }
    }

    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_start_clamped_at_construction() {
        let w = HighlightWindow::new(-5.0, 30.0);
        assert_eq!(w.start_secs, 0.0);
    }

    #[test]
    fn test_window_fits_unchanged() {
        let w = HighlightWindow::new(120.0, 60.0).clamp_to(300.0);
        assert_eq!(w, HighlightWindow::new(120.0, 60.0));
    }

    #[test]
    fn test_window_longer_than_source_collapses() {
        let w = HighlightWindow::new(10.0, 60.0).clamp_to(30.0);
        assert_eq!(w.start_secs, 0.0);
        assert_eq!(w.duration_secs, 30.0);
    }

    #[test]
    fn test_window_overhanging_end_slides_back() {
        let w = HighlightWindow::new(280.0, 60.0).clamp_to(300.0);
        assert_eq!(w.start_secs, 240.0);
        assert_eq!(w.duration_secs, 60.0);
        assert!(w.end_secs() <= 300.0);
    }
}
