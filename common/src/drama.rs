use rand::Rng;
use serde::Serialize;

/// Scripted twist handed to the narration service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DramaEvent {
    pub id: &'static str,
    pub desc: &'static str,
}

pub const DRAMA_POOL: [DramaEvent; 26] = [
    DramaEvent {
        id: "meteor",
        desc: "A massive meteor crashes into the battlefield, the shockwave blasting both sides",
    },
    DramaEvent {
        id: "earthquake",
        desc: "The earth splits open, lava erupting from the cracks",
    },
    DramaEvent {
        id: "storm",
        desc: "A sudden lightning storm appears. A bolt strikes the boss directly",
    },
    DramaEvent {
        id: "eclipse",
        desc: "An eclipse occurs, amplifying the power of darkness",
    },
    DramaEvent {
        id: "blizzard",
        desc: "A fierce blizzard engulfs the battlefield, reducing visibility to zero",
    },
    DramaEvent {
        id: "flood",
        desc: "An underground water vein bursts, flooding the battlefield",
    },
    DramaEvent {
        id: "ancient_spirit",
        desc: "The ghost of an ancient warrior appears and possesses a party member, greatly empowering them",
    },
    DramaEvent {
        id: "sealed_power",
        desc: "One party member awakens to their hidden bloodline power and transforms",
    },
    DramaEvent {
        id: "dragon_roar",
        desc: "The boss unleashes a soul-crushing roar, drastically reducing the entire party's attack power",
    },
    DramaEvent {
        id: "boss_evolve",
        desc: "Cornered, the boss evolves into its second form",
    },
    DramaEvent {
        id: "dimension_crack",
        desc: "A dimensional rift opens, otherworldly energy pouring through",
    },
    DramaEvent {
        id: "curse_backfire",
        desc: "The boss's curse magic goes haywire, beginning to consume itself",
    },
    DramaEvent {
        id: "hostage",
        desc: "The boss takes a party member hostage, using them as a shield",
    },
    DramaEvent {
        id: "trap",
        desc: "An ancient trap activates, filling the area with poisonous mist",
    },
    DramaEvent {
        id: "gravity_flip",
        desc: "Gravity reverses, everyone floats into the air",
    },
    DramaEvent {
        id: "mirror_world",
        desc: "A mirror barrier unfolds, reflecting everyone's attacks",
    },
    DramaEvent {
        id: "sacrifice",
        desc: "A party member sacrifices their own HP to fully heal their allies",
    },
    DramaEvent {
        id: "weapon_break",
        desc: "The boss's attack destroys the main weapon, but the fragments reform into a new weapon",
    },
    DramaEvent {
        id: "time_slow",
        desc: "Time magic activates, the battlefield moving in slow motion",
    },
    DramaEvent {
        id: "slime_rain",
        desc: "A horde of slimes rains from the sky, causing chaos",
    },
    DramaEvent {
        id: "treasure",
        desc: "The battle's impact unearths a legendary treasure chest",
    },
    DramaEvent {
        id: "phoenix_flame",
        desc: "Phoenix flames erupt, reviving a fallen ally",
    },
    DramaEvent {
        id: "crystal_prison",
        desc: "A massive crystal rises, sealing one of the boss's wings",
    },
    DramaEvent {
        id: "blood_moon",
        desc: "A blood moon rises, instantly charging everyone's special attack gauge",
    },
    DramaEvent {
        id: "soul_link",
        desc: "The party members' souls resonate, sharing damage among them",
    },
    DramaEvent {
        id: "void_zone",
        desc: "Part of the battlefield is swallowed by the void, forcing close-quarters combat",
    },
];

/// Draws up to `count` distinct twists from the pool.
pub fn pick_drama_events<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<DramaEvent> {
    let mut pool = DRAMA_POOL.to_vec();
    let mut picked = Vec::with_capacity(count.min(pool.len()));
    while picked.len() < count && !pool.is_empty() {
        let index = rng.gen_range(0..pool.len());
        picked.push(pool.swap_remove(index));
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn picks_distinct_events() {
        let mut rng = StdRng::seed_from_u64(3);
        let picked = pick_drama_events(&mut rng, 2);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0].id, picked[1].id);
        assert_eq!(pick_drama_events(&mut rng, 100).len(), DRAMA_POOL.len());
    }
}
