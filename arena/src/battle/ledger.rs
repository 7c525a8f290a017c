use common::CharacterStats;

/// HP given to party members whose stat block has none.
pub const DEFAULT_PARTY_HP: u32 = 100;
/// HP given to a fusion unit whose stat block has none.
pub const DEFAULT_FUSION_HP: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gauge {
    pub name: String,
    pub hp: u32,
    pub max: u32,
}

impl Gauge {
    pub fn new(name: impl Into<String>, hp: u32) -> Self {
        Self {
            name: name.into(),
            hp,
            max: hp,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.hp as f32 / self.max as f32
        }
    }

    fn take(&mut self, damage: u32) {
        self.hp = self.hp.saturating_sub(damage);
    }
}

/// Hit points of everyone in the current battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpLedger {
    pub boss: Gauge,
    pub party: Vec<Gauge>,
    pub fusion: Option<Gauge>,
}

impl HpLedger {
    pub fn new(boss: &CharacterStats, party: &[CharacterStats]) -> Self {
        Self {
            boss: Gauge::new(boss.name.clone(), boss.hp),
            party: party
                .iter()
                .map(|member| Gauge::new(member.name.clone(), or_default(member.hp, DEFAULT_PARTY_HP)))
                .collect(),
            fusion: None,
        }
    }

    pub fn join_fusion(&mut self, stats: &CharacterStats) {
        self.fusion = Some(Gauge::new(
            stats.name.clone(),
            or_default(stats.hp, DEFAULT_FUSION_HP),
        ));
    }

    pub fn damage_boss(&mut self, damage: u32) {
        self.boss.take(damage);
    }

    /// A boss strike: lands on the living party member called `target`,
    /// otherwise on the fusion unit.
    pub fn strike_party(&mut self, target: &str, damage: u32) {
        if let Some(member) = self.living_member(target) {
            member.take(damage);
        } else if let Some(fusion) = self.fusion.as_mut() {
            fusion.take(damage);
        }
    }

    /// Damage from a scripted twist, aimed by name at anyone.
    pub fn apply_event_damage(&mut self, target: &str, damage: u32) {
        if damage == 0 {
            return;
        }
        if target == self.boss.name {
            self.boss.take(damage);
            return;
        }
        if let Some(member) = self.living_member(target) {
            member.take(damage);
        }
        if let Some(fusion) = self.fusion.as_mut().filter(|fusion| fusion.name == target) {
            fusion.take(damage);
        }
    }

    fn living_member(&mut self, name: &str) -> Option<&mut Gauge> {
        self.party
            .iter_mut()
            .find(|member| member.name == name && member.is_alive())
    }
}

fn or_default(hp: u32, default: u32) -> u32 {
    if hp == 0 { default } else { hp }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(name: &str, hp: u32) -> CharacterStats {
        CharacterStats {
            name: name.to_string(),
            hp,
            ..Default::default()
        }
    }

    fn ledger() -> HpLedger {
        let mut ledger = HpLedger::new(
            &stats("Dark Dragon", 500),
            &[stats("Ember", 120), stats("Pebble", 0)],
        );
        ledger.join_fusion(&stats("Emberstone", 0));
        ledger
    }

    #[test]
    fn missing_hp_falls_back_to_defaults() {
        let ledger = ledger();
        assert_eq!(ledger.party[1].max, DEFAULT_PARTY_HP);
        assert_eq!(ledger.fusion.as_ref().map(|f| f.max), Some(DEFAULT_FUSION_HP));
    }

    #[test]
    fn hp_never_goes_below_zero() {
        let mut ledger = ledger();
        ledger.damage_boss(9_999);
        assert_eq!(ledger.boss.hp, 0);
        assert!(!ledger.boss.is_alive());
    }

    #[test]
    fn boss_strike_falls_through_to_the_fusion_unit() {
        let mut ledger = ledger();
        ledger.strike_party("Ember", 200);
        assert_eq!(ledger.party[0].hp, 0);

        ledger.strike_party("Ember", 30);
        assert_eq!(ledger.fusion.as_ref().map(|f| f.hp), Some(170));

        ledger.strike_party("Nobody", 20);
        assert_eq!(ledger.fusion.as_ref().map(|f| f.hp), Some(150));
    }

    #[test]
    fn event_damage_is_routed_by_name() {
        let mut ledger = ledger();
        ledger.apply_event_damage("Dark Dragon", 50);
        ledger.apply_event_damage("Pebble", 40);
        ledger.apply_event_damage("Emberstone", 10);
        ledger.apply_event_damage("Nobody", 10);

        assert_eq!(ledger.boss.hp, 450);
        assert_eq!(ledger.party[1].hp, 60);
        assert_eq!(ledger.party[0].hp, 120);
        assert_eq!(ledger.fusion.as_ref().map(|f| f.hp), Some(190));
    }
}
