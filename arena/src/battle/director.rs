//! Sequencing of a narrated battle.
//!
//! The director owns no entities. It is fed the fusion result, the narration
//! script and attack completions, and answers with [`DirectorCommand`]s for
//! the ECS side to carry out. Exactly one script event is in flight at a
//! time and every event is followed by a display delay.

use std::collections::VecDeque;
use std::time::Duration;

use common::{BattleOutcome, CharacterStats, DramaEvent, Element, Winner, calc_battle_outcome};
use protocol::{BattleAction, BattleEvent, NarrationRequest};
use thiserror::Error;

use super::ledger::HpLedger;
use crate::combat::AttackTicket;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BattleError {
    #[error("battle narration failed: {0}")]
    Narration(String),
    #[error("fusion unit did not arrive after {}s", waited.as_secs())]
    FusionStalled { waited: Duration },
    #[error("fusion failed: {0}")]
    FusionFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattlePhase {
    AwaitingFusion,
    Narrating,
    Playing,
    Won,
    Lost,
    Error,
}

impl BattlePhase {
    pub fn is_over(self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Error)
    }
}

/// Someone on the battlefield, by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combatant {
    Boss,
    Party(usize),
    Fusion,
}

/// Pauses between script events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleTiming {
    pub opening: Duration,
    pub after_attack: Duration,
    pub after_event: Duration,
    pub victory_delay: Duration,
    pub fusion_timeout: Duration,
}

impl Default for BattleTiming {
    fn default() -> Self {
        Self {
            opening: Duration::from_millis(3500),
            after_attack: Duration::from_millis(3500),
            after_event: Duration::from_millis(4500),
            victory_delay: Duration::from_millis(800),
            fusion_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectorCommand {
    Narrate(NarrationRequest),
    Strike {
        ticket: AttackTicket,
        attacker: Combatant,
        target: Combatant,
        element: Element,
    },
    SummonFusion,
    Finale {
        winner: Winner,
        victory_delay: Duration,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DamageRoute {
    Boss,
    Party(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Wait {
    Ready,
    Delay(Duration),
    Attack {
        ticket: AttackTicket,
        route: DamageRoute,
        damage: u32,
    },
}

#[derive(Debug, Clone)]
pub struct BattleDirector {
    stage: u32,
    boss: CharacterStats,
    party: Vec<CharacterStats>,
    fusion: Option<CharacterStats>,
    outcome: Option<BattleOutcome>,
    phase: BattlePhase,
    ledger: HpLedger,
    log: Vec<String>,
    events: VecDeque<BattleEvent>,
    wait: Wait,
    fusion_waited: Duration,
    timing: BattleTiming,
    next_ticket: u64,
    error: Option<BattleError>,
}

impl BattleDirector {
    pub fn new(stage: u32, boss: CharacterStats, party: Vec<CharacterStats>, timing: BattleTiming) -> Self {
        let ledger = HpLedger::new(&boss, &party);
        let log = vec![
            format!("STAGE {stage}: {} appears!", boss.name),
            "Waiting for the fusion to finish...".to_string(),
        ];
        Self {
            stage,
            boss,
            party,
            fusion: None,
            outcome: None,
            phase: BattlePhase::AwaitingFusion,
            ledger,
            log,
            events: VecDeque::new(),
            wait: Wait::Ready,
            fusion_waited: Duration::ZERO,
            timing,
            next_ticket: 0,
            error: None,
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn ledger(&self) -> &HpLedger {
        &self.ledger
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    pub fn error(&self) -> Option<&BattleError> {
        self.error.as_ref()
    }

    pub fn boss(&self) -> &CharacterStats {
        &self.boss
    }

    pub fn fusion_stats(&self) -> Option<&CharacterStats> {
        self.fusion.as_ref()
    }

    pub fn party_won(&self) -> bool {
        self.phase == BattlePhase::Won
    }

    /// The fusion unit is known: decide the winner and ask for a script.
    pub fn fusion_ready(
        &mut self,
        stats: CharacterStats,
        drama: Vec<DramaEvent>,
    ) -> Option<DirectorCommand> {
        if self.phase != BattlePhase::AwaitingFusion {
            return None;
        }
        let outcome = calc_battle_outcome(&self.party, Some(&stats), &self.boss);
        self.outcome = Some(outcome);
        self.fusion = Some(stats.clone());
        self.phase = BattlePhase::Narrating;
        self.log.push("Scripting the battle...".to_string());
        Some(DirectorCommand::Narrate(NarrationRequest {
            party_stats: self.party.clone(),
            fusion_stats: stats,
            boss: self.boss.clone(),
            stage: self.stage,
            winner: outcome.winner,
            drama,
        }))
    }

    pub fn narration_ready(&mut self, events: Vec<BattleEvent>) {
        if self.phase != BattlePhase::Narrating {
            return;
        }
        self.events = events.into();
        self.phase = BattlePhase::Playing;
        self.wait = Wait::Delay(self.timing.opening);
        self.log = vec![format!("STAGE {}: {} appears!", self.stage, self.boss.name)];
    }

    /// Ends the battle in the error phase. Finished battles are left alone.
    pub fn fail(&mut self, error: BattleError) {
        if self.phase.is_over() {
            return;
        }
        self.log.push(format!("Battle aborted: {error}"));
        self.error = Some(error);
        self.phase = BattlePhase::Error;
        self.events.clear();
        self.wait = Wait::Ready;
    }

    /// Settles the damage of a finished strike and starts the pause after it.
    pub fn attack_finished(&mut self, ticket: AttackTicket) {
        let Wait::Attack {
            ticket: expected,
            route,
            damage,
        } = &self.wait
        else {
            return;
        };
        if *expected != ticket {
            return;
        }
        let (route, damage) = (route.clone(), *damage);
        self.settle(&route, damage);
        self.wait = Wait::Delay(self.timing.after_attack);
    }

    pub fn tick(&mut self, delta: Duration) -> Vec<DirectorCommand> {
        match self.phase {
            BattlePhase::AwaitingFusion => {
                self.fusion_waited += delta;
                if self.fusion_waited >= self.timing.fusion_timeout {
                    self.fail(BattleError::FusionStalled {
                        waited: self.fusion_waited,
                    });
                }
                Vec::new()
            }
            BattlePhase::Playing => {
                if let Wait::Delay(remaining) = &mut self.wait {
                    *remaining = remaining.saturating_sub(delta);
                    if !remaining.is_zero() {
                        return Vec::new();
                    }
                    self.wait = Wait::Ready;
                }
                if self.wait == Wait::Ready {
                    self.advance()
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    /// Plays the next script event; each one leaves the director waiting.
    fn advance(&mut self) -> Vec<DirectorCommand> {
        let Some(event) = self.events.pop_front() else {
            self.log.push("The battle is over.".to_string());
            return vec![self.finish()];
        };

        match event.action {
            BattleAction::Result => {
                self.log.push(event.text.clone());
                vec![self.finish()]
            }
            BattleAction::FusionArrive => {
                let name = self.fusion.as_ref().map(|stats| stats.name.clone()).unwrap_or_default();
                if let Some(stats) = self.fusion.clone() {
                    self.ledger.join_fusion(&stats);
                }
                self.log.push(if event.text.is_empty() {
                    format!("{name} joins the battle!")
                } else {
                    event.text.clone()
                });
                self.wait = Wait::Delay(self.timing.after_event);
                vec![DirectorCommand::SummonFusion]
            }
            BattleAction::Drama | BattleAction::Event => {
                self.log.push(event.text.clone());
                if let Some(target) = &event.target {
                    self.ledger.apply_event_damage(target, event.damage);
                }
                self.wait = Wait::Delay(self.timing.after_event);
                Vec::new()
            }
            BattleAction::Attack | BattleAction::Special => self.strike(&event),
            BattleAction::Unknown => {
                self.log.push(event.text.clone());
                self.wait = Wait::Delay(self.timing.after_event);
                Vec::new()
            }
        }
    }

    fn strike(&mut self, event: &BattleEvent) -> Vec<DirectorCommand> {
        self.log.push(if event.crit {
            format!("CRITICAL! {}", event.text)
        } else {
            event.text.clone()
        });

        let target_name = event.target.clone().unwrap_or_default();
        let boss_attacks = event.actor == self.boss.name;
        let (attacker, target, route) = if boss_attacks {
            (
                Some(Combatant::Boss),
                self.find_party(&target_name),
                DamageRoute::Party(target_name),
            )
        } else {
            (
                self.find_party(&event.actor),
                Some(Combatant::Boss),
                DamageRoute::Boss,
            )
        };

        let (Some(attacker), Some(target)) = (attacker, target) else {
            self.settle(&route, event.damage);
            self.wait = Wait::Delay(self.timing.after_attack);
            return Vec::new();
        };

        self.next_ticket += 1;
        let ticket = AttackTicket(self.next_ticket);
        self.wait = Wait::Attack {
            ticket,
            route,
            damage: event.damage,
        };
        vec![DirectorCommand::Strike {
            ticket,
            attacker,
            target,
            element: self.element_of(&event.actor, boss_attacks),
        }]
    }

    /// Party member by name, else the fusion unit once it has arrived, else
    /// the first party member.
    pub fn find_party(&self, name: &str) -> Option<Combatant> {
        if let Some(index) = self.party.iter().position(|member| member.name == name) {
            return Some(Combatant::Party(index));
        }
        if self.ledger.fusion.is_some() {
            return Some(Combatant::Fusion);
        }
        (!self.party.is_empty()).then_some(Combatant::Party(0))
    }

    fn element_of(&self, actor: &str, boss_attacks: bool) -> Element {
        if boss_attacks {
            return self.boss.element;
        }
        self.party
            .iter()
            .chain(self.fusion.as_ref())
            .find(|member| member.name == actor)
            .map(|member| member.element)
            .unwrap_or(Element::Fire)
    }

    fn settle(&mut self, route: &DamageRoute, damage: u32) {
        match route {
            DamageRoute::Boss => self.ledger.damage_boss(damage),
            DamageRoute::Party(name) => self.ledger.strike_party(name, damage),
        }
    }

    /// The precomputed winner decides the result, whatever the script said.
    fn finish(&mut self) -> DirectorCommand {
        let winner = self.outcome.map(|outcome| outcome.winner).unwrap_or(Winner::Boss);
        self.phase = match winner {
            Winner::Party => BattlePhase::Won,
            Winner::Boss => BattlePhase::Lost,
        };
        self.events.clear();
        self.wait = Wait::Ready;
        DirectorCommand::Finale {
            winner,
            victory_delay: self.timing.victory_delay,
        }
    }
}
