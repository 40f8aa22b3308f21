use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CharacterId};
use crate::events::{RoundResult, UiEvent};
use crate::game_mode::ModePolicy;
use crate::player::{SLOT_COUNT, SlotId, spawn_position};
use crate::prize::{Prize, PrizeRules};
use crate::store::SessionState;
use crate::time::Millis;

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub canvas: Vec2,
    pub character_size: f32,
    pub prize_size: f32,
    pub slots: Vec<SlotSprite>,
    pub prizes: Vec<PrizeSprite>,
    pub exit_prompt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSprite {
    pub slot: SlotId,
    pub character: CharacterId,
    pub image: String,
    pub position: Vec2,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeSprite {
    pub position: Vec2,
    pub prize_type: String,
    pub art: String,
    pub scale: f32,
    pub opacity: f32,
}

/// Receives one snapshot per simulated frame.
pub trait RenderSink {
    fn draw(&mut self, frame: &RenderSnapshot);
}

/// Inputs to a single simulation step.
pub struct Step<'a, R: Rng> {
    pub now: Millis,
    pub catalog: &'a Catalog,
    pub rules: &'a PrizeRules,
    /// Per-slot displacement for this frame, already gated on slot state.
    pub movement: [Vec2; SLOT_COUNT],
    pub policy: &'a mut dyn ModePolicy,
    pub rng: &'a mut R,
}

/// Deferred wraparound along one axis: a sprite leaves completely before it
/// re-enters from the opposite edge.
pub fn wrap_axis(pos: f32, extent: f32, size: f32) -> f32 {
    if pos >= extent + size {
        -size
    } else if pos < -size {
        extent
    } else {
        pos
    }
}

fn overlaps(a: Vec2, a_size: f32, b: Vec2, b_size: f32) -> bool {
    a.x < b.x + b_size && a.x + a_size > b.x && a.y < b.y + b_size && a.y + a_size > b.y
}

/// Distinct prize types of participating slots, with the art each is drawn
/// with, in slot order.
fn participating_prize_types(state: &SessionState, catalog: &Catalog) -> Vec<(String, String)> {
    let mut types: Vec<(String, String)> = Vec::new();
    for slot in state.players.iter().filter(|p| p.is_playing()) {
        let Some(id) = &slot.character else { continue };
        let Some(prize_type) = catalog.prize_type(id) else {
            continue;
        };
        if !types.iter().any(|(t, _)| t == prize_type) {
            types.push((prize_type.to_string(), catalog.prize_art(id)));
        }
    }
    types
}

/// Top every participating prize type up to `num_prizes`.
pub fn replenish(
    state: &mut SessionState,
    catalog: &Catalog,
    rules: &PrizeRules,
    rng: &mut impl Rng,
    now: Millis,
) {
    let target = catalog.settings().num_prizes;
    for (prize_type, art) in participating_prize_types(state, catalog) {
        let have = state
            .prizes
            .iter()
            .filter(|p| p.prize_type == prize_type)
            .count();
        for _ in have..target {
            let prize = Prize::spawn(&prize_type, &art, state.canvas, rules, now, rng);
            state.prizes.push(prize);
        }
    }
}

/// Reset positions and scores of the participating slots and lay out a fresh
/// prize field.
pub fn start_round(
    state: &mut SessionState,
    events: &mut Vec<UiEvent>,
    catalog: &Catalog,
    rules: &PrizeRules,
    policy: &dyn ModePolicy,
    rng: &mut impl Rng,
    now: Millis,
) {
    for slot in &mut state.players {
        slot.position = spawn_position(slot.id);
        slot.score = 0;
        if slot.is_playing() {
            events.push(UiEvent::ScoreChanged {
                slot: slot.id,
                score: 0,
                race_progress: policy.progress(0),
            });
        }
    }
    state.result = None;
    state.prizes.clear();
    replenish(state, catalog, rules, rng, now);
}

/// Discard and respawn the whole prize field, e.g. after a resize.
pub fn regenerate_prizes(
    state: &mut SessionState,
    catalog: &Catalog,
    rules: &PrizeRules,
    rng: &mut impl Rng,
    now: Millis,
) {
    state.prizes.clear();
    replenish(state, catalog, rules, rng, now);
}

/// Advance the round by one frame. Returns the result if a score change
/// ended the round; the remaining collisions of that frame are skipped.
pub fn tick<R: Rng>(
    state: &mut SessionState,
    events: &mut Vec<UiEvent>,
    step: &mut Step<'_, R>,
) -> Option<RoundResult> {
    let settings = step.catalog.settings();
    let char_size = settings.character_size;
    let canvas = state.canvas;

    // Movement
    for slot in state.players.iter_mut().filter(|p| p.is_playing()) {
        let mut pos = slot.position + step.movement[slot.id];
        pos.x = wrap_axis(pos.x, canvas.x, char_size);
        pos.y = wrap_axis(pos.y, canvas.y, char_size);
        slot.position = pos;
    }

    // Aging
    for prize in &mut state.prizes {
        prize.update(step.now);
    }
    state.prizes.retain(|p| !p.expired);

    // Collision
    let mut collected = vec![false; state.prizes.len()];
    for id in 0..SLOT_COUNT {
        let slot = &state.players[id];
        if !slot.is_playing() {
            continue;
        }
        let Some(prize_type) = slot
            .character
            .as_ref()
            .and_then(|c| step.catalog.prize_type(c))
        else {
            continue;
        };
        let position = slot.position;

        for (i, prize) in state.prizes.iter_mut().enumerate() {
            if collected[i]
                || prize.prize_type != prize_type
                || !overlaps(position, char_size, prize.position, step.rules.prize_size)
            {
                continue;
            }
            collected[i] = true;
            prize.respawn(canvas, step.rules, step.now, step.rng);

            let player = &mut state.players[id];
            player.score += 1;
            events.push(UiEvent::ScoreChanged {
                slot: id,
                score: player.score,
                race_progress: step.policy.progress(player.score),
            });
            tracing::debug!(slot = id, score = player.score, "Prize collected");

            let scores = [state.players[0].score, state.players[1].score];
            if let Some(result) = step.policy.on_score_changed(&scores) {
                return Some(result);
            }
        }
    }

    replenish(state, step.catalog, step.rules, step.rng, step.now);
    None
}

/// Build the render snapshot for the current state.
pub fn snapshot(
    state: &SessionState,
    catalog: &Catalog,
    now: Millis,
    throb_window: Millis,
) -> RenderSnapshot {
    let settings = catalog.settings();
    let slots = state
        .players
        .iter()
        .filter(|p| p.is_playing())
        .filter_map(|p| {
            let character = p.character.clone()?;
            let image = catalog
                .get(&character)
                .map(|c| c.image.clone())
                .unwrap_or_default();
            Some(SlotSprite {
                slot: p.id,
                character,
                image,
                position: p.position,
                score: p.score,
            })
        })
        .collect();
    let prizes = state
        .prizes
        .iter()
        .map(|p| PrizeSprite {
            position: p.position,
            prize_type: p.prize_type.clone(),
            art: p.art.clone(),
            scale: p.throb_scale(now, throb_window),
            opacity: p.opacity(now, throb_window),
        })
        .collect();

    RenderSnapshot {
        canvas: state.canvas,
        character_size: settings.character_size,
        prize_size: settings.prize_size,
        slots,
        prizes,
        exit_prompt: state.exit_prompt,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::catalog::{CharacterRecord, GameSettings};
    use crate::config::SessionConfig;
    use crate::game_mode::{FreePlay, Race};
    use crate::player::SlotState;
    use crate::test_helpers::sample_catalog;

    fn playing_state(catalog: &Catalog) -> SessionState {
        let mut state = SessionState::new(Vec2::new(800.0, 600.0), &SessionConfig::default());
        state.players[0].character = Some(catalog.available()[0].clone());
        state.players[1].character = Some(catalog.available()[1].clone());
        for slot in &mut state.players {
            slot.state = SlotState::Playing;
        }
        state
    }

    fn rules(catalog: &Catalog) -> PrizeRules {
        PrizeRules::new(catalog.settings(), &SessionConfig::default())
    }

    #[test]
    fn wrap_scenarios() {
        let (w, size) = (800.0, 200.0);
        // Still partly visible: no wrap yet
        assert_eq!(wrap_axis(w - 5.0 + 10.0, w, size), w + 5.0);
        assert_eq!(wrap_axis(w + size, w, size), -size);
        assert_eq!(wrap_axis(-size - 1.0, w, size), w);
        assert_eq!(wrap_axis(-size, w, size), -size);
    }

    #[test]
    fn start_round_lays_out_field() {
        let catalog = sample_catalog();
        let mut state = playing_state(&catalog);
        state.players[0].score = 9;
        state.players[0].position = Vec2::new(500.0, 500.0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut events = Vec::new();

        start_round(
            &mut state,
            &mut events,
            &catalog,
            &rules(&catalog),
            &FreePlay,
            &mut rng,
            0,
        );

        assert_eq!(state.players[0].score, 0);
        assert_eq!(state.players[0].position, Vec2::new(100.0, 100.0));
        assert_eq!(state.players[1].position, Vec2::new(300.0, 100.0));
        // Two distinct prize types, five each
        assert_eq!(state.prizes.len(), 10);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn sitting_out_slot_gets_no_prizes() {
        let catalog = sample_catalog();
        let mut state = playing_state(&catalog);
        state.players[1].state = SlotState::CharacterSelection;
        state.players[1].character = None;
        let mut rng = StdRng::seed_from_u64(1);

        regenerate_prizes(&mut state, &catalog, &rules(&catalog), &mut rng, 0);
        let expected = catalog.prize_type(&catalog.available()[0]).unwrap();
        assert_eq!(state.prizes.len(), 5);
        assert!(state.prizes.iter().all(|p| p.prize_type == expected));
    }

    #[test]
    fn expired_prizes_removed_before_collision() {
        let catalog = sample_catalog();
        let mut state = playing_state(&catalog);
        let prize_type = catalog.prize_type(&catalog.available()[0]).unwrap();
        state.prizes = vec![Prize {
            position: Vec2::new(120.0, 120.0),
            prize_type: prize_type.to_string(),
            art: prize_type.to_string(),
            spawn_time: 0,
            lifetime: 10_000,
            expired: false,
        }];
        state.players[0].position = Vec2::new(100.0, 100.0);

        let mut rng = StdRng::seed_from_u64(2);
        let mut policy = FreePlay;
        let rules = rules(&catalog);
        let mut step = Step {
            now: 10_000,
            catalog: &catalog,
            rules: &rules,
            movement: [Vec2::ZERO; 2],
            policy: &mut policy,
            rng: &mut rng,
        };
        let mut events = Vec::new();
        assert!(tick(&mut state, &mut events, &mut step).is_none());
        assert_eq!(state.players[0].score, 0);
        assert!(state.prizes.iter().all(|p| p.spawn_time == 10_000));
    }

    #[test]
    fn matching_prize_scores_once_and_respawns() {
        let catalog = sample_catalog();
        let mut state = playing_state(&catalog);
        let prize_type = catalog.prize_type(&catalog.available()[0]).unwrap();
        let other_type = catalog.prize_type(&catalog.available()[1]).unwrap();
        state.prizes = vec![
            Prize {
                position: Vec2::new(150.0, 150.0),
                prize_type: prize_type.to_string(),
                art: prize_type.to_string(),
                spawn_time: 0,
                lifetime: 12_000,
                expired: false,
            },
            Prize {
                position: Vec2::new(160.0, 160.0),
                prize_type: other_type.to_string(),
                art: other_type.to_string(),
                spawn_time: 0,
                lifetime: 12_000,
                expired: false,
            },
        ];
        // Both slots on top of both prizes
        state.players[0].position = Vec2::new(100.0, 100.0);
        state.players[1].position = Vec2::new(100.0, 100.0);

        let mut rng = StdRng::seed_from_u64(3);
        let mut policy = FreePlay;
        let rules = rules(&catalog);
        let mut step = Step {
            now: 1_000,
            catalog: &catalog,
            rules: &rules,
            movement: [Vec2::ZERO; 2],
            policy: &mut policy,
            rng: &mut rng,
        };
        let mut events = Vec::new();
        tick(&mut state, &mut events, &mut step);

        // Each slot only collects its own type
        assert_eq!(state.scores(), [1, 1]);
        assert_eq!(state.prizes[0].spawn_time, 1_000);
        assert_eq!(state.prizes[1].spawn_time, 1_000);
        // Replenished to five per type
        assert_eq!(state.prizes.len(), 10);
    }

    #[test]
    fn shared_type_prize_collected_once_per_tick() {
        let shared = |id: &str| CharacterRecord {
            id: CharacterId::new(id),
            player_name: id.to_uppercase(),
            image: format!("{id}.png"),
            prize: Some("star.png".to_string()),
            prize_type: "star".to_string(),
        };
        let mut catalog = Catalog::new(vec![shared("aria"), shared("dax")], GameSettings::default());
        catalog.resolve_assets(|_| true);

        // Canvas barely larger than a prize: every respawn lands under both sprites
        let mut state = playing_state(&catalog);
        state.canvas = Vec2::new(60.0, 60.0);
        state.players[0].position = Vec2::ZERO;
        state.players[1].position = Vec2::ZERO;
        state.prizes = vec![Prize {
            position: Vec2::new(5.0, 5.0),
            prize_type: "star".to_string(),
            art: "star.png".to_string(),
            spawn_time: 0,
            lifetime: 12_000,
            expired: false,
        }];

        let mut rng = StdRng::seed_from_u64(4);
        let mut policy = FreePlay;
        let rules = rules(&catalog);
        let mut step = Step {
            now: 1_000,
            catalog: &catalog,
            rules: &rules,
            movement: [Vec2::ZERO; 2],
            policy: &mut policy,
            rng: &mut rng,
        };
        let mut events = Vec::new();
        tick(&mut state, &mut events, &mut step);

        assert_eq!(state.scores(), [1, 0]);
        assert_eq!(state.scores().iter().sum::<u32>(), 1);
        let char_size = catalog.settings().character_size;
        assert!(overlaps(Vec2::ZERO, char_size, state.prizes[0].position, rules.prize_size));
        assert_eq!(state.prizes[0].spawn_time, 1_000);
    }

    #[test]
    fn race_end_skips_remaining_collisions() {
        let catalog = sample_catalog();
        let mut state = playing_state(&catalog);
        let prize_type = catalog.prize_type(&catalog.available()[0]).unwrap();
        let other_type = catalog.prize_type(&catalog.available()[1]).unwrap();
        state.players[0].score = 14;
        state.players[1].score = 14;
        state.players[0].position = Vec2::new(100.0, 100.0);
        state.players[1].position = Vec2::new(100.0, 100.0);
        state.prizes = [prize_type, other_type]
            .into_iter()
            .map(|t| Prize {
                position: Vec2::new(150.0, 150.0),
                prize_type: t.to_string(),
                art: t.to_string(),
                spawn_time: 0,
                lifetime: 12_000,
                expired: false,
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(4);
        let mut policy = Race::new(15);
        let rules = rules(&catalog);
        let mut step = Step {
            now: 500,
            catalog: &catalog,
            rules: &rules,
            movement: [Vec2::ZERO; 2],
            policy: &mut policy,
            rng: &mut rng,
        };
        let mut events = Vec::new();
        let result = tick(&mut state, &mut events, &mut step).unwrap();

        assert_eq!(result.outcome, crate::events::RoundOutcome::Winner(0));
        assert_eq!(state.scores(), [15, 14]);
    }

    #[test]
    fn movement_applies_to_playing_slots() {
        let catalog = sample_catalog();
        let mut state = playing_state(&catalog);
        state.players[0].position = Vec2::new(795.0, 100.0);
        let mut rng = StdRng::seed_from_u64(5);
        let mut policy = FreePlay;
        let rules = rules(&catalog);
        let mut step = Step {
            now: 0,
            catalog: &catalog,
            rules: &rules,
            movement: [Vec2::new(10.0, 0.0), Vec2::new(0.0, -10.0)],
            policy: &mut policy,
            rng: &mut rng,
        };
        let mut events = Vec::new();
        tick(&mut state, &mut events, &mut step);

        assert_eq!(state.players[0].position, Vec2::new(805.0, 100.0));
        assert_eq!(state.players[1].position, Vec2::new(300.0, 90.0));
    }

    #[test]
    fn snapshot_lists_playing_slots_and_prizes() {
        let catalog = sample_catalog();
        let mut state = playing_state(&catalog);
        state.players[1].state = SlotState::CharacterSelection;
        let mut rng = StdRng::seed_from_u64(6);
        regenerate_prizes(&mut state, &catalog, &rules(&catalog), &mut rng, 0);

        let frame = snapshot(&state, &catalog, 0, 5_000);
        assert_eq!(frame.slots.len(), 1);
        assert_eq!(frame.slots[0].slot, 0);
        assert_eq!(frame.prizes.len(), 5);
        assert!(frame.prizes.iter().all(|p| p.scale == 1.0 && p.opacity == 1.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn wrap_keeps_position_in_band(
                pos in -1_000.0f32..2_000.0,
                extent in 100.0f32..1_500.0,
                size in 10.0f32..300.0,
            ) {
                let wrapped = wrap_axis(pos, extent, size);
                prop_assert!(wrapped >= -size);
                prop_assert!(wrapped < extent + size);
            }
        }
    }
}
