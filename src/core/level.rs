//! Level calculation - pure mapping from a lifetime talent total to a level.
//!
//! Levels are derived from `max_talent` (the high-water mark), never from the
//! spendable balance, so spending talents can never demote a student. All
//! functions here are deterministic and total; no state, no I/O.

/// Semantic color token for a level band.
///
/// The terminal UI maps each token to a concrete color; keeping the token
/// abstract here keeps level logic free of any presentation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBand {
    /// Band 1
    Bronze,
    /// Band 2
    Silver,
    /// Band 3
    Gold,
    /// Band 4
    Platinum,
    /// Band 5
    Emerald,
    /// Band 6
    Sapphire,
    /// Band 7
    Ruby,
    /// Band 8 (top)
    Diamond,
}

/// One resolved level: number, display name, color token, and the band's
/// lower threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    /// 1-based level number
    pub level: u32,
    /// Display name shown next to the level number
    pub name: &'static str,
    /// Color token for the progress gauge
    pub band: ColorBand,
    /// Lowest `max_talent` value that reaches this level
    pub threshold: i64,
}

/// Ordered threshold table. Explicit rather than a formula so bands could be
/// made non-uniform without touching any caller.
const LEVELS: [(i64, &str, ColorBand); 8] = [
    (0, "Bronze", ColorBand::Bronze),
    (50, "Silver", ColorBand::Silver),
    (100, "Gold", ColorBand::Gold),
    (150, "Platinum", ColorBand::Platinum),
    (200, "Emerald", ColorBand::Emerald),
    (250, "Sapphire", ColorBand::Sapphire),
    (300, "Ruby", ColorBand::Ruby),
    (350, "Diamond", ColorBand::Diamond),
];

/// Resolves the level for a lifetime talent total.
///
/// Total for every input: values below the first threshold (including
/// negatives, which the data model never produces) resolve to the first band,
/// and values beyond the top threshold clamp to the top band.
#[must_use]
pub fn level_for(max_talent: i64) -> LevelInfo {
    let mut index = 0;
    for (i, (threshold, _, _)) in LEVELS.iter().enumerate() {
        if max_talent >= *threshold {
            index = i;
        } else {
            break;
        }
    }

    let (threshold, name, band) = LEVELS[index];
    // Cast safety: index < LEVELS.len() = 8.
    #[allow(clippy::cast_possible_truncation)]
    let level = index as u32 + 1;
    LevelInfo {
        level,
        name,
        band,
        threshold,
    }
}

/// Returns the `max_talent` value needed to reach the next level, or `None`
/// when already in the top band.
#[must_use]
pub fn next_threshold(max_talent: i64) -> Option<i64> {
    LEVELS
        .iter()
        .map(|(threshold, _, _)| *threshold)
        .find(|threshold| *threshold > max_talent)
}

/// Progress through the current band as a fraction in `[0, 1]`.
///
/// Table-driven: the fraction is the distance covered between the current
/// band's lower threshold and the next band's threshold. The top band has no
/// next threshold and pegs at `1.0`.
#[must_use]
pub fn progress_toward_next(max_talent: i64) -> f64 {
    let info = level_for(max_talent);
    let Some(next) = next_threshold(max_talent) else {
        return 1.0;
    };

    let covered = max_talent.saturating_sub(info.threshold).max(0);
    let span = next - info.threshold;
    // Cast safety: covered < span <= 50, far below f64's exact-integer range.
    #[allow(clippy::cast_precision_loss)]
    let fraction = covered as f64 / span as f64;
    fraction
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_level_for_zero() {
        let info = level_for(0);
        assert_eq!(info.level, 1);
        assert_eq!(info.name, "Bronze");
        assert_eq!(info.band, ColorBand::Bronze);
        assert_eq!(info.threshold, 0);
    }

    #[test]
    fn test_level_for_negative_clamps_to_first_band() {
        let info = level_for(-10);
        assert_eq!(info.level, 1);
        assert_eq!(info.name, "Bronze");
    }

    #[test]
    fn test_level_boundaries() {
        // One below a threshold stays in the lower band
        assert_eq!(level_for(49).name, "Bronze");
        // Exactly on a threshold enters the new band
        assert_eq!(level_for(50).name, "Silver");
        assert_eq!(level_for(50).level, 2);
        assert_eq!(level_for(349).name, "Ruby");
        assert_eq!(level_for(350).name, "Diamond");
    }

    #[test]
    fn test_level_top_band_clamps() {
        assert_eq!(level_for(350).level, 8);
        assert_eq!(level_for(351).level, 8);
        assert_eq!(level_for(100_000).level, 8);
        assert_eq!(level_for(100_000).name, "Diamond");
    }

    #[test]
    fn test_level_table_property() {
        // Every total sits at or above its band's lower threshold and below
        // the next band's threshold (or is in the top band).
        for m in 0..=500 {
            let info = level_for(m);
            assert!(info.threshold <= m, "lower threshold above {m}");
            match next_threshold(m) {
                Some(next) => assert!(next > m, "next threshold not above {m}"),
                None => assert_eq!(info.level, 8, "only the top band lacks a next threshold"),
            }
        }
    }

    #[test]
    fn test_next_threshold() {
        assert_eq!(next_threshold(0), Some(50));
        assert_eq!(next_threshold(49), Some(50));
        assert_eq!(next_threshold(50), Some(100));
        assert_eq!(next_threshold(349), Some(350));
        assert_eq!(next_threshold(350), None);
        assert_eq!(next_threshold(100_000), None);
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(progress_toward_next(0), 0.0);
        assert_eq!(progress_toward_next(25), 0.5);
        assert_eq!(progress_toward_next(49), 49.0 / 50.0);
        // Entering a band resets progress
        assert_eq!(progress_toward_next(50), 0.0);
        assert_eq!(progress_toward_next(125), 0.5);
    }

    #[test]
    fn test_progress_top_band_pegs_at_one() {
        assert_eq!(progress_toward_next(350), 1.0);
        assert_eq!(progress_toward_next(1_000), 1.0);
    }

    #[test]
    fn test_progress_stays_in_unit_interval() {
        for m in 0..=500 {
            let fraction = progress_toward_next(m);
            assert!(
                (0.0..=1.0).contains(&fraction),
                "progress {fraction} out of range for {m}"
            );
        }
    }
}
