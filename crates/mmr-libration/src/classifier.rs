//! Classification of a break list into a libration kind.

use mmr_core::{Convention, LibrationKind};
use serde::{Deserialize, Serialize};

/// Thresholds of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Integration span in years; breaks at or after it are ignored.
    pub x_stop: f64,
    /// Shortest interval between breaks that counts as libration, in years.
    pub min_libration_span: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            x_stop: 100_000.0,
            min_libration_span: 20_000.0,
        }
    }
}

/// Outcome of classifying one convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Libration {
    /// Classification.
    pub kind: LibrationKind,
    /// Share of the span spent librating, in percent.
    pub percentage: f64,
    /// Longest interval between consecutive breaks, in years.
    pub max_diff: f64,
}

/// Classifies the breaks found under `convention`.
///
/// Returns `None` for plain circulation, which is never recorded.
pub fn classify(
    breaks: &[f64],
    convention: Convention,
    settings: &ClassifierSettings,
) -> Option<Libration> {
    let relevant: Vec<f64> = breaks
        .iter()
        .copied()
        .filter(|year| *year < settings.x_stop)
        .collect();

    if relevant.is_empty() {
        return Some(Libration {
            kind: LibrationKind::new(true, convention),
            percentage: 100.0,
            max_diff: 0.0,
        });
    }

    let mut sum = 0.0;
    let mut max_diff = 0.0f64;
    for pair in relevant.windows(2) {
        let interval = pair[1] - pair[0];
        max_diff = max_diff.max(interval);
        if interval >= settings.min_libration_span {
            sum += interval;
        }
    }

    let percentage = 100.0 * sum / settings.x_stop;
    if percentage <= 0.0 {
        return None;
    }
    Some(Libration {
        kind: LibrationKind::new(false, convention),
        percentage,
        max_diff,
    })
}
