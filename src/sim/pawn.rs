use crate::ai::brain::Brain;
use crate::ai::frame::{MAX_SKILLS, NUM_MOVE_DIRS};
use crate::sim::world::Vec2;

pub const ACTION_ATTACK: usize = 0;
pub const ACTION_MOVE_BASE: usize = 1;
pub const ACTION_SKILL_BASE: usize = ACTION_MOVE_BASE + NUM_MOVE_DIRS;

/// Movement directions, indexed by `action - ACTION_MOVE_BASE`.
pub const DIRS: [Vec2; NUM_MOVE_DIRS] = [
    Vec2 { x: 1, y: 0 },
    Vec2 { x: 0, y: 1 },
    Vec2 { x: -1, y: 0 },
    Vec2 { x: 0, y: -1 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PawnKind {
    Minion,
    RangeMinion,
    Hero,
}

pub const NUM_KINDS: usize = 3;

impl PawnKind {
    pub fn archetype(self) -> &'static Archetype {
        match self {
            PawnKind::Minion => &MINION,
            PawnKind::RangeMinion => &RANGE_MINION,
            PawnKind::Hero => &HERO,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PawnKind::Minion => 0,
            PawnKind::RangeMinion => 1,
            PawnKind::Hero => 2,
        }
    }
}

/// Basic-attack parameters. Bounties are paid to whoever lands the hit or
/// the kill, so squishier targets carry the rewards on their own spec.
#[derive(Debug, Clone, Copy)]
pub struct CombatSpec {
    pub range: i32,
    pub damage: i32,
    pub attack_reward: f32,
    pub kill_reward: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct SkillSpec {
    pub cooldown: i32,
    pub range: i32,
    pub damage: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathBehavior {
    Respawn,
    EndsMatch,
}

/// Capability table for one pawn kind. Everything a pawn can do is data
/// here; there is no per-kind behavior code.
#[derive(Debug)]
pub struct Archetype {
    pub kind: PawnKind,
    pub code: char,
    pub max_health: i32,
    pub max_cooldown: i32,
    pub combat: Option<CombatSpec>,
    pub can_move: bool,
    pub skills: [Option<SkillSpec>; MAX_SKILLS],
    pub death: DeathBehavior,
}

pub static MINION: Archetype = Archetype {
    kind: PawnKind::Minion,
    code: 'm',
    max_health: 2,
    max_cooldown: 5,
    combat: Some(CombatSpec {
        range: 1,
        damage: 1,
        attack_reward: 0.1,
        kill_reward: 0.5,
    }),
    can_move: true,
    skills: [None, None],
    death: DeathBehavior::Respawn,
};

pub static RANGE_MINION: Archetype = Archetype {
    kind: PawnKind::RangeMinion,
    code: 'r',
    max_health: 1,
    max_cooldown: 3,
    combat: Some(CombatSpec {
        range: 2,
        damage: 1,
        attack_reward: 0.1,
        kill_reward: 0.5,
    }),
    can_move: true,
    skills: [None, None],
    death: DeathBehavior::Respawn,
};

pub static HERO: Archetype = Archetype {
    kind: PawnKind::Hero,
    code: 'H',
    max_health: 3,
    max_cooldown: 15,
    combat: Some(CombatSpec {
        range: 3,
        damage: 1,
        attack_reward: 0.2,
        kill_reward: 1.0,
    }),
    can_move: true,
    skills: [
        Some(SkillSpec {
            cooldown: 10,
            range: 2,
            damage: 2,
        }),
        None,
    ],
    death: DeathBehavior::EndsMatch,
};

/// One unit on the grid. Dead pawns stay in the arena with `pending_kill`
/// set until the respawn pass recycles them.
pub struct Pawn {
    pub kind: PawnKind,
    pub team: usize,
    pub pos: Vec2,
    pub health: i32,
    pub cooldown: i32,
    pub skill_cooldowns: [i32; MAX_SKILLS],
    pub reward: f32,
    pub action: usize,
    pub pending_kill: bool,
    pub brain: Brain,
    /// Index of the network this pawn's experiences feed.
    pub net: usize,
}

impl Pawn {
    pub fn new(kind: PawnKind, team: usize, net: usize, pos: Vec2) -> Self {
        Pawn {
            kind,
            team,
            pos,
            health: kind.archetype().max_health,
            cooldown: 0,
            skill_cooldowns: [0; MAX_SKILLS],
            reward: 0.0,
            action: 0,
            pending_kill: false,
            brain: Brain::new(),
            net,
        }
    }

    pub fn archetype(&self) -> &'static Archetype {
        self.kind.archetype()
    }

    /// Reset for reuse after death: full health, cold cooldowns, and a fresh
    /// brain so no stale frame history leaks into the new life.
    pub fn respawn_at(&mut self, pos: Vec2) {
        self.pos = pos;
        self.health = self.archetype().max_health;
        self.cooldown = 0;
        self.skill_cooldowns = [0; MAX_SKILLS];
        self.reward = 0.0;
        self.action = 0;
        self.pending_kill = false;
        self.brain = Brain::new();
    }
}
