use log::info;

use super::checkpoints::derive_checkpoints;
use super::live::LiveGameStore;
use crate::pool::{Pool, QuarterScores};

/// Merges freshly derived checkpoints into stored quarter scores.
///
/// A quarter the fresh data defines overwrites the stored pair; a quarter
/// it lacks keeps whatever was stored, manual or from an earlier poll. The
/// merge is idempotent and never turns a known quarter back into unknown.
pub fn reconcile(stored: &QuarterScores, fresh: &QuarterScores) -> QuarterScores {
    QuarterScores {
        q1: fresh.q1.or(stored.q1),
        q2: fresh.q2.or(stored.q2),
        q3: fresh.q3.or(stored.q3),
        q4: fresh.q4.or(stored.q4),
    }
}

/// Applies the linked game's checkpoints to one pool.
///
/// Returns the replacement pool when its scores changed, None when the pool
/// has no linked game, the store does not know the game, or nothing moved.
pub fn reconcile_pool(pool: &Pool, store: &LiveGameStore) -> Option<Pool> {
    let game = store.game(pool.game_id.as_deref()?)?;
    let merged = reconcile(&pool.scores, &derive_checkpoints(&game.linescores));
    if merged == pool.scores {
        return None;
    }

    info!("Pool {} updated from game {}: {}", pool.id, game.id, game.summary());
    Some(pool.with_scores(merged))
}

/// Reconciles every pool against the store. Returns the new collection and
/// how many pools changed.
pub fn apply_live_scores(pools: &[Pool], store: &LiveGameStore) -> (Vec<Pool>, usize) {
    let mut changed = 0;
    let updated = pools
        .iter()
        .map(|pool| match reconcile_pool(pool, store) {
            Some(next) => {
                changed += 1;
                next
            }
            None => pool.clone(),
        })
        .collect();
    (updated, changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{PoolType, Quarter, ScorePair};
    use crate::scores::feed::{GameRecord, GameStatus, Linescores, TeamScore};
    use pretty_assertions::assert_eq;

    fn game(id: &str, away: &[u32], home: &[u32]) -> GameRecord {
        GameRecord {
            id: id.to_string(),
            status: GameStatus::InProgress,
            period: away.len() as u32,
            clock: "8:00".to_string(),
            away: TeamScore { abbr: "SF".to_string(), score: away.iter().sum() },
            home: TeamScore { abbr: "KC".to_string(), score: home.iter().sum() },
            linescores: Linescores {
                away: away.to_vec(),
                home: home.to_vec(),
            },
        }
    }

    #[test]
    fn test_reconcile_fills_and_preserves() {
        let stored = QuarterScores {
            q1: Some(ScorePair(7, 0)),
            ..Default::default()
        };
        let fresh = QuarterScores {
            q1: Some(ScorePair(7, 0)),
            q2: Some(ScorePair(10, 10)),
            ..Default::default()
        };

        let merged = reconcile(&stored, &fresh);
        assert_eq!(
            merged,
            QuarterScores {
                q1: Some(ScorePair(7, 0)),
                q2: Some(ScorePair(10, 10)),
                q3: None,
                q4: None,
            }
        );
        assert_eq!(reconcile(&merged, &fresh), merged);
    }

    #[test]
    fn test_reconcile_never_reverts_known_quarters() {
        let stored = QuarterScores {
            q3: Some(ScorePair(13, 9)),
            ..Default::default()
        };
        let merged = reconcile(&stored, &QuarterScores::default());
        assert_eq!(merged.q3, Some(ScorePair(13, 9)));
    }

    #[test]
    fn test_live_value_overwrites_stored() {
        let stored = QuarterScores {
            q1: Some(ScorePair(3, 0)),
            ..Default::default()
        };
        let fresh = QuarterScores {
            q1: Some(ScorePair(7, 0)),
            ..Default::default()
        };
        assert_eq!(reconcile(&stored, &fresh).q1, Some(ScorePair(7, 0)));
    }

    #[test]
    fn test_apply_live_scores_only_touches_linked_pools() {
        let store = LiveGameStore::new();
        store.update_games(vec![game("g1", &[7, 3], &[0, 10])]);

        let linked = Pool::new("linked", PoolType::Quarters)
            .with_game(Some("g1".to_string()))
            .with_manual_score(Quarter::Q4, Some(ScorePair(1, 1)));
        let unlinked = Pool::new("manual", PoolType::Quarters);
        let unknown_game = Pool::new("elsewhere", PoolType::Quarters).with_game(Some("g9".to_string()));

        let (pools, changed) = apply_live_scores(&[linked, unlinked.clone(), unknown_game.clone()], &store);

        assert_eq!(changed, 1);
        assert_eq!(pools[0].scores.q1, Some(ScorePair(7, 0)));
        assert_eq!(pools[0].scores.q2, Some(ScorePair(10, 10)));
        assert_eq!(pools[0].scores.q4, Some(ScorePair(1, 1)));
        assert_eq!(pools[1], unlinked);
        assert_eq!(pools[2], unknown_game);

        let (_, again) = apply_live_scores(&pools, &store);
        assert_eq!(again, 0);
    }
}
