//! Power-up composition.
//!
//! A pure, deterministic merge step: two raw snapshots (a player's own and
//! the opponent's) plus each side's active power-ups compose into the two
//! effective views actually rendered. Power-ups only ever touch the cloned
//! view, never a canonical grid, and they apply in a fixed precedence so
//! two effects on one cell compose predictably regardless of list order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::document::GameDocument;
use crate::grid::{Coord, Correctness};
use crate::snapshot::Snapshot;

/// Cell color used by coloring effects that carry no color of their own.
const FALLBACK_EFFECT_COLOR: &str = "#9b59b6";

/// Power-up kinds, declared in application precedence: blocking effects
/// before coloring effects before informational effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerupKind {
    /// Blocks edits on the target cells.
    Freeze,
    /// Cosmetic recoloring of the target cells.
    Color,
    /// Reveals the correctness of the target cells in the view only.
    Peek,
}

/// Whose view an effect composes into, relative to the effect's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliesTo {
    #[serde(rename = "self")]
    Own,
    Opponent,
}

/// A transient, targeted effect.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerupEffect {
    pub kind: PowerupKind,
    pub target_cells: BTreeSet<Coord>,
    pub applies_to: AppliesTo,
    /// Absent means the effect never expires on its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Millis>,
    /// Color payload for [`PowerupKind::Color`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl PowerupEffect {
    pub fn is_active(&self, now: Millis) -> bool {
        self.expires_at.is_none_or(|expiry| now < expiry)
    }
}

/// Drop expired effects from an authoritative power-up list. Returns how
/// many were removed.
pub fn prune_expired(effects: &mut Vec<PowerupEffect>, now: Millis) -> usize {
    let before = effects.len();
    effects.retain(|effect| effect.is_active(now));
    before - effects.len()
}

/// A snapshot with power-ups composed in: the state one side actually
/// renders. Exposes the full snapshot shape so consumers are agnostic to
/// whether power-ups are active.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveView {
    doc: GameDocument,
    frozen: BTreeSet<Coord>,
}

impl EffectiveView {
    pub fn doc(&self) -> &GameDocument {
        &self.doc
    }

    /// Cells an active freeze effect is blocking. Feed this into
    /// `GameModel::set_active_freezes` so edits on them are rejected.
    pub fn frozen(&self) -> &BTreeSet<Coord> {
        &self.frozen
    }

    pub fn is_frozen(&self, coord: Coord) -> bool {
        self.frozen.contains(&coord)
    }
}

/// The two effective views produced by one composition.
#[derive(Debug, Clone, PartialEq)]
pub struct Composed {
    pub own: EffectiveView,
    pub opponent: Option<EffectiveView>,
}

/// Compose the raw snapshots and active power-ups into both effective
/// views. Pure: identical inputs always yield identical outputs.
///
/// An effect owned by one side with `AppliesTo::Own` lands in that side's
/// view; with `AppliesTo::Opponent` it lands in the other side's view of
/// their own grid. Expired effects are excluded.
pub fn apply(
    own: &Snapshot,
    opponent: Option<&Snapshot>,
    own_powerups: &[PowerupEffect],
    opponent_powerups: &[PowerupEffect],
    now: Millis,
) -> Composed {
    let own_active: Vec<&PowerupEffect> =
        own_powerups.iter().filter(|e| e.is_active(now)).collect();
    let opponent_active: Vec<&PowerupEffect> = opponent_powerups
        .iter()
        .filter(|e| e.is_active(now))
        .collect();

    let own_view = compose(
        own,
        own_active
            .iter()
            .filter(|e| e.applies_to == AppliesTo::Own)
            .chain(opponent_active.iter().filter(|e| e.applies_to == AppliesTo::Opponent))
            .copied()
            .collect(),
    );
    let opponent_view = opponent.map(|snapshot| {
        compose(
            snapshot,
            opponent_active
                .iter()
                .filter(|e| e.applies_to == AppliesTo::Own)
                .chain(own_active.iter().filter(|e| e.applies_to == AppliesTo::Opponent))
                .copied()
                .collect(),
        )
    });

    Composed {
        own: own_view,
        opponent: opponent_view,
    }
}

/// Apply one side's effects to a clone of its snapshot. Effects sort into
/// precedence order first; within one kind the derived ordering of the
/// effect itself breaks ties, so composition never depends on list order.
fn compose(base: &Snapshot, mut effects: Vec<&PowerupEffect>) -> EffectiveView {
    effects.sort();

    let mut doc = base.doc().clone();
    let mut frozen = BTreeSet::new();

    for effect in effects {
        for &coord in &effect.target_cells {
            if !doc.grid.in_bounds(coord) {
                continue;
            }
            match effect.kind {
                PowerupKind::Freeze => {
                    frozen.insert(coord);
                }
                PowerupKind::Color => {
                    if let Ok(cell) = doc.grid.cell_mut(coord) {
                        cell.color = Some(
                            effect
                                .color
                                .clone()
                                .unwrap_or_else(|| FALLBACK_EFFECT_COLOR.to_string()),
                        );
                    }
                }
                PowerupKind::Peek => {
                    let answer = crate::grid::solution_at(&doc.solution, coord).to_string();
                    if let Ok(cell) = doc.grid.cell_mut(coord) {
                        if !cell.is_empty() {
                            cell.correct = if cell.value == answer {
                                Correctness::Correct
                            } else {
                                Correctness::Incorrect
                            };
                        }
                    }
                }
            }
        }
    }

    EffectiveView { doc, frozen }
}

/// Memoizing wrapper around [`apply`].
///
/// Composition is pure, so the result is cached keyed by both snapshots'
/// optimistic counters and the active effect lists; it is recomputed only
/// when that key changes.
#[derive(Default)]
pub struct PowerupEngine {
    cache: Option<(CacheKey, Composed)>,
    hits: u64,
}

/// Full memo key: pid + counter per side plus the active effect lists.
/// `now` participates only through which effects are still active.
/// Compared by equality, so distinct inputs can never alias.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    own: (String, u64),
    opponent: Option<(String, u64)>,
    own_effects: Vec<PowerupEffect>,
    opponent_effects: Vec<PowerupEffect>,
}

impl PowerupEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many calls were answered from the cache.
    pub fn cache_hits(&self) -> u64 {
        self.hits
    }

    pub fn apply(
        &mut self,
        own: &Snapshot,
        opponent: Option<&Snapshot>,
        own_powerups: &[PowerupEffect],
        opponent_powerups: &[PowerupEffect],
        now: Millis,
    ) -> Composed {
        let key = CacheKey {
            own: (own.pid().to_string(), own.optimistic_counter()),
            opponent: opponent.map(|s| (s.pid().to_string(), s.optimistic_counter())),
            own_effects: own_powerups
                .iter()
                .filter(|e| e.is_active(now))
                .cloned()
                .collect(),
            opponent_effects: opponent_powerups
                .iter()
                .filter(|e| e.is_active(now))
                .cloned()
                .collect(),
        };
        if let Some((cached_key, cached)) = &self.cache {
            if *cached_key == key {
                self.hits += 1;
                return cached.clone();
            }
        }
        let composed = apply(own, opponent, own_powerups, opponent_powerups, now);
        self.cache = Some((key, composed.clone()));
        composed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ClueSet, GameDocument};

    fn snapshot() -> Snapshot {
        let doc = GameDocument::new(
            vec![
                vec!["A".to_string(), "B".to_string()],
                vec!["C".to_string(), "D".to_string()],
            ],
            None,
            None,
            ClueSet::default(),
        )
        .expect("build document");
        Snapshot::new(doc)
    }

    fn effect(kind: PowerupKind, applies_to: AppliesTo, cells: &[(usize, usize)]) -> PowerupEffect {
        PowerupEffect {
            kind,
            target_cells: cells.iter().map(|&(r, c)| Coord::new(r, c)).collect(),
            applies_to,
            expires_at: None,
            color: None,
        }
    }

    #[test]
    fn test_apply_is_deterministic() {
        let own = snapshot();
        let opp = snapshot();
        let own_fx = vec![
            effect(PowerupKind::Color, AppliesTo::Own, &[(0, 0)]),
            effect(PowerupKind::Freeze, AppliesTo::Opponent, &[(1, 1)]),
        ];
        let opp_fx = vec![effect(PowerupKind::Peek, AppliesTo::Own, &[(0, 1)])];

        let first = apply(&own, Some(&opp), &own_fx, &opp_fx, 100);
        let second = apply(&own, Some(&opp), &own_fx, &opp_fx, 100);
        assert_eq!(first, second);
    }

    #[test]
    fn test_composition_independent_of_list_order() {
        let own = snapshot();
        let mut color = effect(PowerupKind::Color, AppliesTo::Own, &[(1, 1)]);
        color.color = Some("#123456".to_string());
        let freeze = effect(PowerupKind::Freeze, AppliesTo::Own, &[(1, 1)]);

        let forward = apply(&own, None, &[color.clone(), freeze.clone()], &[], 0);
        let reversed = apply(&own, None, &[freeze, color], &[], 0);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_freeze_and_color_compose_on_one_cell() {
        let own = snapshot();
        let mut color = effect(PowerupKind::Color, AppliesTo::Own, &[(1, 1)]);
        color.color = Some("#123456".to_string());
        let freeze = effect(PowerupKind::Freeze, AppliesTo::Own, &[(1, 1)]);

        let composed = apply(&own, None, &[freeze, color], &[], 0);
        let view = &composed.own;
        assert!(view.is_frozen(Coord::new(1, 1)));
        assert_eq!(
            view.doc().grid.cell(Coord::new(1, 1)).unwrap().color.as_deref(),
            Some("#123456")
        );
    }

    #[test]
    fn test_opponent_powerup_lands_in_own_view() {
        let own = snapshot();
        let opp = snapshot();
        // The opponent played a freeze against us.
        let opp_fx = vec![effect(PowerupKind::Freeze, AppliesTo::Opponent, &[(0, 0)])];

        let composed = apply(&own, Some(&opp), &[], &opp_fx, 0);
        assert!(composed.own.is_frozen(Coord::new(0, 0)));
        assert!(!composed.opponent.unwrap().is_frozen(Coord::new(0, 0)));
    }

    #[test]
    fn test_canonical_snapshots_never_mutated() {
        let own = snapshot();
        let opp = snapshot();
        let own_before = own.clone();
        let opp_before = opp.clone();
        let mut color = effect(PowerupKind::Color, AppliesTo::Opponent, &[(0, 0), (1, 0)]);
        color.color = Some("#fff".to_string());

        let composed = apply(&own, Some(&opp), &[color], &[], 0);
        let opp_view = composed.opponent.unwrap();
        assert_eq!(
            opp_view.doc().grid.cell(Coord::new(0, 0)).unwrap().color.as_deref(),
            Some("#fff")
        );
        // Views are derived; the canonical inputs are untouched.
        assert_eq!(own, own_before);
        assert_eq!(opp, opp_before);
    }

    #[test]
    fn test_peek_reveals_correctness_in_view_only() {
        let mut doc = snapshot().doc().clone();
        doc.grid.cell_mut(Coord::new(0, 0)).unwrap().value = "A".to_string();
        doc.grid.cell_mut(Coord::new(0, 1)).unwrap().value = "X".to_string();
        let own = Snapshot::new(doc);

        let peek = effect(PowerupKind::Peek, AppliesTo::Own, &[(0, 0), (0, 1), (1, 0)]);
        let composed = apply(&own, None, &[peek], &[], 0);
        let grid = &composed.own.doc().grid;
        assert_eq!(grid.cell(Coord::new(0, 0)).unwrap().correct, Correctness::Correct);
        assert_eq!(grid.cell(Coord::new(0, 1)).unwrap().correct, Correctness::Incorrect);
        // Empty cell stays unknown; canonical snapshot keeps all unknown.
        assert_eq!(grid.cell(Coord::new(1, 0)).unwrap().correct, Correctness::Unknown);
        assert_eq!(
            own.doc().grid.cell(Coord::new(0, 0)).unwrap().correct,
            Correctness::Unknown
        );
    }

    #[test]
    fn test_expired_effects_are_excluded() {
        let own = snapshot();
        let mut freeze = effect(PowerupKind::Freeze, AppliesTo::Own, &[(0, 0)]);
        freeze.expires_at = Some(1_000);

        let active = apply(&own, None, std::slice::from_ref(&freeze), &[], 999);
        assert!(active.own.is_frozen(Coord::new(0, 0)));

        let expired = apply(&own, None, std::slice::from_ref(&freeze), &[], 1_000);
        assert!(!expired.own.is_frozen(Coord::new(0, 0)));

        let mut list = vec![freeze];
        assert_eq!(prune_expired(&mut list, 1_000), 1);
        assert!(list.is_empty());
    }

    #[test]
    fn test_out_of_range_targets_are_ignored() {
        let own = snapshot();
        let freeze = effect(PowerupKind::Freeze, AppliesTo::Own, &[(9, 9)]);
        let composed = apply(&own, None, &[freeze], &[], 0);
        assert!(composed.own.frozen().is_empty());
    }

    #[test]
    fn test_engine_memoizes_by_counter_and_effects() {
        let own = snapshot();
        let fx = vec![effect(PowerupKind::Color, AppliesTo::Own, &[(0, 0)])];
        let mut engine = PowerupEngine::new();

        let first = engine.apply(&own, None, &fx, &[], 0);
        let second = engine.apply(&own, None, &fx, &[], 0);
        assert_eq!(first, second);
        assert_eq!(engine.cache_hits(), 1);

        // A new counter invalidates the cache.
        let mut doc = own.doc().clone();
        doc.optimistic_counter += 1;
        let newer = Snapshot::new(doc);
        engine.apply(&newer, None, &fx, &[], 0);
        assert_eq!(engine.cache_hits(), 1);

        // So does a change to the active effect list.
        engine.apply(&newer, None, &[], &[], 0);
        assert_eq!(engine.cache_hits(), 1);
    }

    #[test]
    fn test_memo_distinguishes_effect_lists_with_equal_counters() {
        let own = snapshot();
        let mut color = effect(PowerupKind::Color, AppliesTo::Own, &[(0, 0)]);
        color.color = Some("#111".to_string());
        let freeze = effect(PowerupKind::Freeze, AppliesTo::Own, &[(0, 0)]);
        let mut engine = PowerupEngine::new();

        let with_color = engine.apply(&own, None, std::slice::from_ref(&color), &[], 0);
        let with_freeze = engine.apply(&own, None, std::slice::from_ref(&freeze), &[], 0);

        // Same snapshot counters, different effects: never served stale.
        assert_ne!(with_color, with_freeze);
        assert!(with_freeze.own.is_frozen(Coord::new(0, 0)));
        assert!(!with_color.own.is_frozen(Coord::new(0, 0)));
        assert_eq!(engine.cache_hits(), 0);
    }
}
