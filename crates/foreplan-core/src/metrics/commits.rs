//! Declining-commit-frequency heuristic over repository history.
//!
//! The raw metric measures how much inter-commit intervals are lengthening:
//! each interval is compared against the running mean of the intervals
//! before it, the excess is expressed as a fraction of the interval, and
//! the fractions are combined with linearly increasing weights so recent
//! behavior dominates. The gap between the last commit and `now` counts as
//! one final open interval, so a repository that has gone quiet scores
//! high even when its historic cadence was steady.

use chrono::{DateTime, Utc};

/// Below this many commits the cadence carries no signal.
pub const MIN_COMMITS: usize = 3;

/// Degree to which commit intervals are lengthening, in `[0, 1)`.
///
/// Timestamps may arrive in any order; fewer than [`MIN_COMMITS`] of them
/// yield 0.
pub fn declining_commit_frequency(timestamps: &[DateTime<Utc>], now: DateTime<Utc>) -> f64 {
    if timestamps.len() < MIN_COMMITS {
        return 0.0;
    }

    let mut seconds: Vec<i64> = timestamps.iter().map(DateTime::timestamp).collect();
    seconds.sort_unstable();

    let mut intervals: Vec<f64> = seconds
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) as f64 / 3600.0)
        .collect();
    let tail = (now.timestamp() - seconds[seconds.len() - 1]) as f64 / 3600.0;
    if tail > 0.0 {
        intervals.push(tail);
    }

    // Excess of each interval over the running mean of its predecessors,
    // as a fraction of the interval itself (so each term stays below 1).
    let mut deviations = Vec::with_capacity(intervals.len());
    deviations.push(0.0);
    let mut mean = intervals[0];
    for (i, &interval) in intervals.iter().enumerate().skip(1) {
        let deviation = if mean > 0.0 && interval > mean {
            (interval - mean) / interval
        } else {
            0.0
        };
        deviations.push(deviation);
        mean += (interval - mean) / (i + 1) as f64;
    }

    let count = deviations.len();
    let weight_total: f64 = (1..=count).map(|i| i as f64).sum();
    deviations
        .iter()
        .enumerate()
        .map(|(i, deviation)| deviation * (i + 1) as f64 / weight_total)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn commits_at_hours(hours: &[i64]) -> Vec<DateTime<Utc>> {
        hours.iter().map(|&h| base() + Duration::hours(h)).collect()
    }

    #[test]
    fn too_few_commits_carry_no_signal() {
        assert_eq!(declining_commit_frequency(&[], base()), 0.0);
        let two = commits_at_hours(&[0, 24]);
        assert_eq!(declining_commit_frequency(&two, base() + Duration::hours(25)), 0.0);
    }

    #[test]
    fn steady_cadence_scores_zero() {
        let commits = commits_at_hours(&[0, 24, 48, 72, 96]);
        let value = declining_commit_frequency(&commits, base() + Duration::hours(97));
        assert_eq!(value, 0.0);
    }

    #[test]
    fn accelerating_cadence_scores_zero() {
        let commits = commits_at_hours(&[0, 48, 72, 84, 90]);
        let value = declining_commit_frequency(&commits, base() + Duration::hours(91));
        assert_eq!(value, 0.0);
    }

    #[test]
    fn lengthening_intervals_raise_the_score() {
        let commits = commits_at_hours(&[0, 24, 48, 96, 192, 384]);
        let value = declining_commit_frequency(&commits, base() + Duration::hours(385));
        assert!(value > 0.3, "got {value}");
        assert!(value < 1.0);
    }

    #[test]
    fn recent_silence_raises_the_score() {
        let commits = commits_at_hours(&[0, 24, 48, 72, 96]);
        let quiet = declining_commit_frequency(&commits, base() + Duration::hours(96 + 500));
        let active = declining_commit_frequency(&commits, base() + Duration::hours(97));
        assert!(quiet > active);
        assert!(quiet > 0.2, "got {quiet}");
    }

    #[test]
    fn order_of_timestamps_does_not_matter() {
        let sorted = commits_at_hours(&[0, 24, 48, 96, 192]);
        let mut shuffled = sorted.clone();
        shuffled.reverse();
        shuffled.swap(1, 3);

        let now = base() + Duration::hours(193);
        assert_eq!(
            declining_commit_frequency(&sorted, now),
            declining_commit_frequency(&shuffled, now)
        );
    }
}
