use std::sync::Arc;

use crate::ai::frame::{
    Frame, FrameRef, IMAGE_SIZE, MAX_SKILLS, NUM_STATS, SIGHT_AREA, SIGHT_DIAMETER,
};
use crate::sim::pawn::NUM_KINDS;
use crate::sim::world::{Vec2, World};

/// Channel planes of the egocentric observation image.
const PLANE_BOUNDS: usize = 0;
const PLANE_ALLY_HEALTH: usize = 1;
const PLANE_ENEMY_HEALTH: usize = 2;
const PLANE_ALLY_KIND: usize = 3;
const PLANE_ENEMY_KIND: usize = 4;
const PLANE_ENEMY_SKILL: usize = 5;

fn plane_index(plane: usize, lx: i32, ly: i32) -> usize {
    plane * SIGHT_AREA + ly as usize * SIGHT_DIAMETER + lx as usize
}

/// Capture what one pawn sees: a stack of planes centered on the pawn plus
/// a handful of own-state scalars.
pub fn capture(world: &World, idx: usize) -> FrameRef {
    let me = &world.pawns[idx];
    let half = (SIGHT_DIAMETER / 2) as i32;
    let origin = Vec2 {
        x: me.pos.x - half,
        y: me.pos.y - half,
    };

    let mut image = vec![0.0f32; IMAGE_SIZE];

    for ly in 0..SIGHT_DIAMETER as i32 {
        for lx in 0..SIGHT_DIAMETER as i32 {
            let tile = Vec2 {
                x: origin.x + lx,
                y: origin.y + ly,
            };
            if world.in_bounds(tile) {
                image[plane_index(PLANE_BOUNDS, lx, ly)] = 1.0;
            }
        }
    }

    for (i, other) in world.pawns.iter().enumerate() {
        if i == idx || other.pending_kill {
            continue;
        }
        let lx = other.pos.x - origin.x;
        let ly = other.pos.y - origin.y;
        if lx < 0 || ly < 0 || lx >= SIGHT_DIAMETER as i32 || ly >= SIGHT_DIAMETER as i32 {
            continue;
        }
        let arch = other.archetype();
        let health = other.health as f32 / arch.max_health as f32;
        let kind = (other.kind.index() + 1) as f32 / NUM_KINDS as f32;
        if other.team == me.team {
            image[plane_index(PLANE_ALLY_HEALTH, lx, ly)] = health;
            image[plane_index(PLANE_ALLY_KIND, lx, ly)] = kind;
        } else {
            image[plane_index(PLANE_ENEMY_HEALTH, lx, ly)] = health;
            image[plane_index(PLANE_ENEMY_KIND, lx, ly)] = kind;
            for (slot, skill) in arch.skills.iter().enumerate() {
                if skill.is_some() && other.skill_cooldowns[slot] == 0 {
                    image[plane_index(PLANE_ENEMY_SKILL + slot, lx, ly)] = 1.0;
                }
            }
        }
    }

    let arch = me.archetype();
    let mut stats = [0.0f32; NUM_STATS];
    stats[0] = me.health as f32 / arch.max_health as f32;
    stats[1] = me.cooldown as f32 / arch.max_cooldown.max(1) as f32;
    stats[2] = me.pos.x as f32 / (world.size.x - 1) as f32;
    stats[3] = me.pos.y as f32 / (world.size.y - 1) as f32;
    for slot in 0..MAX_SKILLS {
        stats[4 + slot] = match arch.skills[slot] {
            Some(skill) => me.skill_cooldowns[slot] as f32 / skill.cooldown as f32,
            None => 0.0,
        };
    }

    Arc::new(Frame::new(image, stats))
}
