//! Per-tick simulation driver
//!
//! Exactly one entry point advances the world: `simulate(dt, intent)`,
//! called once per rendered frame with a clamped delta. Order within a tick
//! is fixed: effect timers decay, the player updates (tools, movement,
//! concealment, pickups), every enemy updates, then the detection arbiter
//! runs and short-circuits the tick on a hit.

use super::detect;
use super::effects::{self, ToolEffect, ToolKind};
use super::enemy::EnemyContext;
use super::state::{GameEvent, GamePhase, PlayerIntent, Simulation, ToolRequest};
use crate::consts::*;
use crate::heading_vec;

impl Simulation {
    /// Advance the world by one frame. Emits the tick's discrete events for
    /// the rendering/audio/HUD layers. A paused game simply never calls this.
    pub fn simulate(&mut self, dt: f32, intent: &PlayerIntent) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != GamePhase::Running {
            return events;
        }
        let dt = dt.clamp(0.0, MAX_DT);
        if dt == 0.0 {
            return events;
        }
        self.metrics.elapsed += dt;

        // Effect and noise timers decay; throwables integrate and stick here
        let pulses = effects::advance(&mut self.effects, &mut self.noise, &self.level.grid, dt);
        self.metrics.noise_emitted += pulses as f32;

        if let Some(request) = intent.tool {
            self.use_tool(&request, &mut events);
        }

        let (moved, dashed) = self.player.update_movement(
            dt,
            intent.move_dir,
            intent.stealth,
            intent.hide,
            intent.dash,
            &self.level.grid,
            &self.level.obstacles,
        );
        self.metrics.distance += moved;
        if dashed {
            self.metrics.dash_count += 1;
        }

        // Aggregate loudness for the HUD, plus the implicit noise source
        // seekers can hear directly
        let ambient_radius = self.player.ambient_noise_radius();
        if ambient_radius > 0.0 {
            self.noise_level = (self.noise_level + NOISE_LEVEL_RISE * dt).min(1.0);
            self.metrics.noise_emitted += dt;
        }
        self.noise_level = (self.noise_level - NOISE_LEVEL_DECAY * dt).max(0.0);

        self.collect_pickups(&mut events);
        self.update_concealment();
        if self.player.in_safe_zone {
            self.metrics.safe_time += dt;
        }

        // Enemies hear, steer and move
        let level = &mut self.level;
        let ctx = EnemyContext {
            grid: &level.grid,
            obstacles: &level.obstacles,
            player_pos: self.player.pos,
            player_noise_radius: ambient_radius,
            effects: &self.effects,
            noise: &self.noise,
            ambient_light: level.ambient_light,
        };
        for enemy in level.enemies.iter_mut() {
            enemy.update(dt, &mut self.rng, &ctx);
        }

        // Detection short-circuits the rest of the tick
        if let Some(index) = detect::scan(&self.level, &self.player) {
            let archetype = self.level.enemies[index].archetype;
            self.metrics.detections += 1;
            self.metrics.deaths += 1;
            self.player.respawn(self.level.spawn);
            events.push(GameEvent::Detected { by: archetype });
            log::info!("detected by {archetype:?}; respawning");
            return events;
        }

        if self.level.all_samples_collected() && self.level.exit.contains(self.player.pos) {
            self.phase = GamePhase::LevelComplete;
            events.push(GameEvent::LevelComplete);
            log::info!(
                "level {} complete in {:.1}s (par {:.1}s)",
                self.level_index,
                self.metrics.elapsed,
                self.metrics.par_time
            );
        }

        events
    }

    /// Spend a charge and realize the tool. Invoking with zero charges is a
    /// silent no-op.
    fn use_tool(&mut self, request: &ToolRequest, events: &mut Vec<GameEvent>) {
        if !self.charges.try_spend(request.kind) {
            return;
        }
        self.metrics.tool_uses[request.kind.index()] += 1;
        let origin = self.player.pos;
        match request.kind {
            ToolKind::Decoy => self.effects.push(ToolEffect::decoy(origin)),
            ToolKind::Foam => self
                .effects
                .push(ToolEffect::foam(request.aim.unwrap_or(origin))),
            ToolKind::Flash => self
                .effects
                .push(ToolEffect::flash(request.aim.unwrap_or(origin))),
            ToolKind::Throwable => {
                let dir = request
                    .aim
                    .map(|aim| aim - origin)
                    .filter(|v| v.length_squared() > 1e-6)
                    .map(|v| v.normalize())
                    .unwrap_or_else(|| heading_vec(self.player.facing));
                self.effects.push(ToolEffect::throwable(origin, dir * THROW_SPEED));
            }
            ToolKind::Shutdown => {
                let nearest = self
                    .level
                    .enemies
                    .iter()
                    .enumerate()
                    .map(|(i, e)| (i, (e.pos - origin).length()))
                    .filter(|&(_, d)| d <= SHUTDOWN_RANGE)
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(i, _)| i);
                if let Some(index) = nearest {
                    let enemy = self.level.enemies.remove(index);
                    self.metrics.clamp_bonus += enemy.archetype.clamp_bonus();
                    events.push(GameEvent::EnemyClamped {
                        archetype: enemy.archetype,
                    });
                }
            }
        }
        events.push(GameEvent::ToolUsed { kind: request.kind });
    }

    fn collect_pickups(&mut self, events: &mut Vec<GameEvent>) {
        let pos = self.player.pos;
        for sample in &mut self.level.samples {
            if !sample.collected && (sample.pos - pos).length() <= PICKUP_RADIUS {
                sample.collected = true;
                events.push(GameEvent::Pickup { pos: sample.pos });
            }
        }
        let mut refill = false;
        for card in &mut self.level.keycards {
            if !card.taken && (card.pos - pos).length() <= PICKUP_RADIUS {
                card.taken = true;
                refill = true;
                for zone in &mut self.level.safe_zones {
                    if zone.hue == card.hue && !zone.unlocked {
                        zone.unlocked = true;
                        events.push(GameEvent::ZoneUnlocked { hue: zone.hue });
                    }
                }
            }
        }
        // Keycards restore the full tool allotment
        if refill {
            self.charges.refill();
        }
    }

    /// Derive safe-zone containment; the first entry into an unlocked zone
    /// marks it visited and also restores tool charges
    fn update_concealment(&mut self) {
        let pos = self.player.pos;
        let mut inside = false;
        for zone in &mut self.level.safe_zones {
            if zone.unlocked && zone.rect.contains(pos) {
                inside = true;
                if !zone.visited {
                    zone.visited = true;
                    self.charges.refill();
                }
            }
        }
        self.player.in_safe_zone = inside;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::{Archetype, Enemy};
    use glam::Vec2;
    use std::f32::consts::PI;

    const DT: f32 = 1.0 / 60.0;

    fn running_sim(seed: &str) -> Simulation {
        let mut sim = Simulation::new(seed, false);
        sim.start();
        sim
    }

    #[test]
    fn test_determinism() {
        // Two simulations with the same seed and inputs stay identical
        let mut a = running_sim("99999");
        let mut b = running_sim("99999");
        let intents = [
            PlayerIntent {
                move_dir: Vec2::new(1.0, 0.0),
                ..Default::default()
            },
            PlayerIntent {
                move_dir: Vec2::new(0.3, 1.0),
                stealth: true,
                ..Default::default()
            },
            PlayerIntent {
                move_dir: Vec2::new(1.0, 0.0),
                dash: true,
                ..Default::default()
            },
            PlayerIntent::default(),
        ];
        for _ in 0..120 {
            for intent in &intents {
                let ea = a.simulate(DT, intent);
                let eb = b.simulate(DT, intent);
                assert_eq!(ea, eb);
            }
        }
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(
            serde_json::to_string(&a.level).unwrap(),
            serde_json::to_string(&b.level).unwrap()
        );
    }

    #[test]
    fn test_keycard_unlocks_zone_and_refills_same_tick() {
        let mut sim = running_sim("abc");
        // Spend a charge so the refill is observable
        sim.simulate(
            DT,
            &PlayerIntent {
                tool: Some(ToolRequest {
                    kind: ToolKind::Decoy,
                    aim: None,
                }),
                ..Default::default()
            },
        );
        assert_eq!(
            sim.charges.get(ToolKind::Decoy),
            ToolKind::Decoy.base_charges() - 1
        );

        let card = sim.level.keycards[0].clone();
        sim.player.pos = card.pos;
        let events = sim.simulate(DT, &PlayerIntent::default());
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::ZoneUnlocked { hue } if *hue == card.hue)),
            "no unlock in {events:?}"
        );
        let zone = sim
            .level
            .safe_zones
            .iter()
            .find(|z| z.hue == card.hue)
            .unwrap();
        assert!(zone.unlocked);
        assert_eq!(
            sim.charges.get(ToolKind::Decoy),
            ToolKind::Decoy.base_charges()
        );
    }

    #[test]
    fn test_detection_respawns_with_grace_window() {
        let mut sim = running_sim("abc");
        // A sentry inside the cleared spawn pocket, staring at the player
        let watcher_pos = sim.player.pos + Vec2::new(40.0, 0.0);
        sim.level.enemies = vec![Enemy::new(Archetype::Sentry, watcher_pos, PI, 0.0)];
        let events = sim.simulate(DT, &PlayerIntent::default());
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::Detected { by: Archetype::Sentry })),
            "no detection in {events:?}"
        );
        assert_eq!(sim.metrics.detections, 1);
        assert_eq!(sim.metrics.deaths, 1);
        assert_eq!(sim.player.pos, sim.level.spawn);
        assert!(sim.player.invuln_timer > 0.0);
        assert_eq!(sim.phase, GamePhase::Running);

        // The grace window holds on the very next tick
        let events = sim.simulate(DT, &PlayerIntent::default());
        assert!(events.iter().all(|e| !matches!(e, GameEvent::Detected { .. })));
    }

    #[test]
    fn test_zero_charge_invocation_is_silent_noop() {
        let mut sim = running_sim("abc");
        let flash = PlayerIntent {
            tool: Some(ToolRequest {
                kind: ToolKind::Flash,
                aim: None,
            }),
            ..Default::default()
        };
        let first = sim.simulate(DT, &flash);
        assert!(first
            .iter()
            .any(|e| matches!(e, GameEvent::ToolUsed { kind: ToolKind::Flash })));
        let second = sim.simulate(DT, &flash);
        assert!(second
            .iter()
            .all(|e| !matches!(e, GameEvent::ToolUsed { .. })));
        assert_eq!(sim.metrics.tool_uses[ToolKind::Flash.index()], 1);
        assert_eq!(sim.charges.get(ToolKind::Flash), 0);
    }

    #[test]
    fn test_shutdown_clamps_nearest_enemy() {
        let mut sim = running_sim("abc");
        let near = sim.player.pos + Vec2::new(30.0, 0.0);
        let far = sim.player.pos + Vec2::new(44.0, 0.0);
        sim.level.enemies = vec![
            Enemy::new(Archetype::Seeker, far, 0.0, 0.0),
            Enemy::new(Archetype::Camera, near, 0.0, 0.0),
        ];
        let events = sim.simulate(
            DT,
            &PlayerIntent {
                tool: Some(ToolRequest {
                    kind: ToolKind::Shutdown,
                    aim: None,
                }),
                hide: true,
                ..Default::default()
            },
        );
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::EnemyClamped { archetype: Archetype::Camera })));
        assert_eq!(sim.level.enemies.len(), 1);
        assert_eq!(sim.level.enemies[0].archetype, Archetype::Seeker);
        assert_eq!(
            sim.metrics.clamp_bonus,
            crate::tuning::CLAMP_BONUS_CAMERA
        );
    }

    #[test]
    fn test_exit_requires_all_samples() {
        let mut sim = running_sim("abc");
        sim.level.enemies.clear();
        sim.player.pos = sim.level.exit.center();
        let events = sim.simulate(DT, &PlayerIntent::default());
        assert!(events.iter().all(|e| !matches!(e, GameEvent::LevelComplete)));
        assert_eq!(sim.phase, GamePhase::Running);

        for sample in &mut sim.level.samples {
            sample.collected = true;
        }
        sim.player.pos = sim.level.exit.center();
        let events = sim.simulate(DT, &PlayerIntent::default());
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelComplete)));
        assert_eq!(sim.phase, GamePhase::LevelComplete);
    }

    #[test]
    fn test_oversized_delta_is_clamped() {
        let mut sim = running_sim("abc");
        sim.level.enemies.clear();
        sim.simulate(5.0, &PlayerIntent::default());
        assert!(sim.metrics.elapsed <= MAX_DT + 1e-6);
    }
}
