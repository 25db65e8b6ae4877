use super::feed::Linescores;
use crate::pool::{Quarter, QuarterScores, ScorePair};

/// Cumulative end-of-quarter scores from per-period linescores.
///
/// `qN` is the running total of periods `1..=N` for both teams and is only
/// set once the away side has a value for period `N`; a missing home value
/// for that period counts as zero. Overtime periods are ignored.
pub fn derive_checkpoints(linescores: &Linescores) -> QuarterScores {
    let mut checkpoints = QuarterScores::default();
    let mut away_total = 0u32;
    let mut home_total = 0u32;

    for quarter in Quarter::ALL {
        let index = quarter.number() - 1;
        let Some(away) = linescores.away.get(index) else {
            break;
        };
        away_total = away_total.saturating_add(*away);
        home_total = home_total.saturating_add(linescores.home.get(index).copied().unwrap_or(0));
        checkpoints = checkpoints.with(quarter, Some(ScorePair(away_total, home_total)));
    }

    checkpoints
}
