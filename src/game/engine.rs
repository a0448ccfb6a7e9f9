//! # Turn Engine
//!
//! Drives the game: rounds, per-player turns, movement, traps, combat, tile effects
//! and victory.
//!
//! The engine is a single async sequence. It suspends only at the input gate
//! (direction choice, confirmation, target choice, dice acknowledgement and event
//! verdicts), so at most one player's turn is ever in progress and at most one
//! prompt is ever outstanding. Every state mutation happens inside this sequence.

use crate::events::{Effect, EventCategory, EventTables, TrapEffect};
use crate::game::combat::{apply_damage, DamageOutcome};
use crate::game::{
    ActiveEvent, Direction, GameState, GridMap, ImmunityPolicy, PlayerId, Position, RulesConfig,
    TileKind, Trap,
};
use crate::input::InputGate;
use crate::rendering::{Fx, NullPresenter, Presenter};
use crate::utils::Dice;
use crate::{BoardError, BoardResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Stops a running engine from outside, before its next player turn.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// The turn engine.
///
/// Holds its collaborators directly: the immutable map, the game state it owns, the
/// input gate it suspends on, the event tables and the presenter it notifies.
#[derive(Debug)]
pub struct TurnEngine<P: Presenter = NullPresenter> {
    map: Arc<GridMap>,
    state: GameState,
    gate: InputGate,
    tables: EventTables,
    rules: RulesConfig,
    dice: Dice,
    rng: StdRng,
    presenter: P,
    running: Arc<AtomicBool>,
}

impl TurnEngine<NullPresenter> {
    /// Creates an engine with no presenter.
    ///
    /// Dice and draws are seeded from `rules.seed`.
    pub fn new(
        map: Arc<GridMap>,
        state: GameState,
        gate: InputGate,
        tables: EventTables,
        rules: RulesConfig,
    ) -> Self {
        Self {
            dice: Dice::new(rules.seed),
            rng: StdRng::seed_from_u64(rules.seed.wrapping_add(1)),
            map,
            state,
            gate,
            tables,
            rules,
            presenter: NullPresenter,
            running: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl<P: Presenter> TurnEngine<P> {
    /// Swaps in a presenter.
    pub fn with_presenter<Q: Presenter>(self, presenter: Q) -> TurnEngine<Q> {
        TurnEngine {
            map: self.map,
            state: self.state,
            gate: self.gate,
            tables: self.tables,
            rules: self.rules,
            dice: self.dice,
            rng: self.rng,
            presenter,
            running: self.running,
        }
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Gives the state back, e.g. to save it.
    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Access to the dice, mainly to queue scripted faces.
    pub fn dice_mut(&mut self) -> &mut Dice {
        &mut self.dice
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.state.winner
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Plays rounds until someone wins, the engine is stopped, or the round limit
    /// is hit. Returns the winner, if any.
    ///
    /// Any error is fatal: the loop halts and the error is returned as is.
    pub async fn run(&mut self) -> BoardResult<Option<PlayerId>> {
        log::info!(
            "Starting game {} with {} players",
            self.state.game_id,
            self.state.players.len()
        );

        while self.is_running() && !self.state.is_finished() {
            if let Some(limit) = self.rules.max_rounds {
                if self.state.round >= limit {
                    log::info!("Round limit {} reached", limit);
                    break;
                }
            }
            self.play_round().await?;
        }

        self.running.store(false, Ordering::SeqCst);
        match self.state.winner {
            Some(winner) => log::info!("Game over, player {} wins", winner),
            None => log::info!("Game stopped without a winner"),
        }
        Ok(self.state.winner)
    }

    /// Plays one round: every player in turn order, stopping early on victory.
    pub async fn play_round(&mut self) -> BoardResult<()> {
        self.state.round += 1;
        log::info!("Round {}", self.state.round);

        for id in self.state.player_ids() {
            if !self.is_running() || self.state.is_finished() {
                break;
            }
            self.play_turn(id).await?;
        }
        Ok(())
    }

    /// Plays a single player's turn.
    pub async fn play_turn(&mut self, id: PlayerId) -> BoardResult<()> {
        self.state.set_active(Some(id));
        self.presenter.highlight(Some(id));
        let position = self.state.player(id)?.position;
        self.presenter.focus(id, position);

        let policy = self.rules.immunity_policy;
        let player = self.state.player_mut(id)?;
        if policy == ImmunityPolicy::EveryTurn && player.immune > 0 {
            player.immune -= 1;
        }

        if player.dizziness > 0 {
            player.dizziness -= 1;
            let message = format!("{} is dizzy and skips the turn", player.name);
            self.state.push_message(message);
            self.end_turn();
            return Ok(());
        }

        if policy == ImmunityPolicy::WhenActing && player.immune > 0 {
            player.immune -= 1;
        }

        let steps = self.roll_steps(id).await?;
        self.state.steps = Some(steps);

        while let Some(remaining) = self.state.steps.filter(|steps| *steps > 0) {
            self.walk(id).await?;
            self.state.steps = Some(remaining - 1);
            self.spring_traps(id)?;
            for other in self.state.collisions(id)? {
                self.attack(id, other, false).await?;
            }
        }

        self.state.steps = None;
        self.trigger_tile(id).await?;
        self.end_turn();
        Ok(())
    }

    fn end_turn(&mut self) {
        self.state.steps = None;
        self.state.set_active(None);
        self.presenter.highlight(None);
    }

    /// Rolls for movement and waits for the roll to be acknowledged.
    ///
    /// Uses two dice when the player has a doubled roll pending.
    pub async fn roll_steps(&mut self, id: PlayerId) -> BoardResult<u32> {
        let doubles = self.state.player_mut(id)?.take_double_dice();
        let roll = self.dice.roll(doubles);
        log::debug!("Player {} rolled {:?}", id, roll.faces);

        self.state.pending_dice = Some(roll.total);
        self.gate
            .acknowledge_dice(id, roll.faces.clone(), roll.total)
            .await?;
        self.state.pending_dice = None;

        let name = self.name(id)?;
        self.state
            .push_message(format!("{} rolled {}", name, roll.total));
        Ok(roll.total)
    }

    /// Moves the player one step.
    ///
    /// A pending fixed direction is used without asking and then cleared. Otherwise
    /// a single legal option is taken automatically and several options are put to
    /// the player. Running into a dead end is fatal.
    pub async fn walk(&mut self, id: PlayerId) -> BoardResult<Position> {
        let player = self.state.player(id)?;
        let (position, facing, fixed) = (player.position, player.direction, player.fixed_direction);

        let moves = self.map.legal_moves(position, Some(facing));
        if moves.is_empty() {
            return Err(BoardError::DeadEnd(position));
        }

        let direction = if fixed {
            facing
        } else if let [(only, _)] = moves.as_slice() {
            *only
        } else {
            let options = moves.iter().map(|(direction, _)| *direction).collect();
            self.gate.choose_direction(id, options).await?
        };

        let target = moves
            .iter()
            .find(|(candidate, _)| *candidate == direction)
            .map(|(_, target)| *target)
            .ok_or_else(|| {
                BoardError::InvalidState(format!(
                    "Player {} cannot move {} from {}",
                    id, direction, position
                ))
            })?;

        let player = self.state.player_mut(id)?;
        player.fixed_direction = false;
        player.direction = direction;
        player.position = target;
        log::debug!("Player {} walks {} to {}", id, direction, target);

        self.presenter.focus(id, target);
        self.pause(self.rules.step_delay()).await;
        Ok(target)
    }

    /// Fires every trap under the player, except their own.
    fn spring_traps(&mut self, id: PlayerId) -> BoardResult<()> {
        let position = self.state.player(id)?.position;
        let (sprung, kept): (Vec<Trap>, Vec<Trap>) = std::mem::take(&mut self.state.traps)
            .into_iter()
            .partition(|trap| trap.position == position && trap.owner != Some(id));
        self.state.traps = kept;

        for trap in sprung {
            let name = self.name(id)?;
            match trap.effect {
                TrapEffect::Damage(amount) => {
                    self.state
                        .push_message(format!("{} springs a trap at {}", name, position));
                    self.damage(id, amount, trap.owner)?;
                }
                TrapEffect::Stun(turns) => {
                    self.state.player_mut(id)?.dizziness += turns;
                    self.state.push_message(format!(
                        "{} slips at {} and loses {} turn(s)",
                        name, position, turns
                    ));
                }
                TrapEffect::Score(delta) => {
                    let applied = self.state.player_mut(id)?.add_score(delta);
                    self.state.push_message(format!(
                        "{} hits a trap at {}: {:+} points",
                        name, position, applied
                    ));
                }
            }
        }
        Ok(())
    }

    /// Runs the effect of the tile the player is standing on.
    pub async fn trigger_tile(&mut self, id: PlayerId) -> BoardResult<()> {
        let position = self.state.player(id)?.position;
        let tile = self.map.tile_at(position)?;
        let name = self.name(id)?;
        log::debug!("{} arrives at {} {}", name, tile.label(), position);

        match tile {
            TileKind::Spawner => {
                let player = self.state.player_mut(id)?;
                player.add_score(self.rules.spawner_bonus);
                let score = player.score;
                self.state.push_message(format!(
                    "{} gains {} points at the spawner",
                    name, self.rules.spawner_bonus
                ));

                if score >= self.state.victory_score {
                    self.state.declare_winner(id);
                    self.running.store(false, Ordering::SeqCst);
                    self.state.push_message(format!("{} wins!", name));
                    self.presenter.effect(Fx::Victory { player: id });
                }
            }
            TileKind::Task => self.run_event(id, EventCategory::Task).await?,
            TileKind::Opportunity => self.run_event(id, EventCategory::Opportunity).await?,
            TileKind::Destiny => self.run_event(id, EventCategory::Destiny).await?,
            TileKind::Punishment => self.run_event(id, EventCategory::Punishment).await?,
            TileKind::Teleport => {
                if self.gate.confirm(id, "Use the teleport?").await? {
                    self.teleport(id).await?;
                } else {
                    self.state
                        .push_message(format!("{} stays put", name));
                }
            }
            TileKind::Prison => {
                self.state.player_mut(id)?.dizziness += 1;
                self.state
                    .push_message(format!("{} is locked up for a turn", name));
            }
            TileKind::Hospital => {
                let player = self.state.player_mut(id)?;
                player.heal();
                player.dizziness += 1;
                self.state
                    .push_message(format!("{} is treated and rests for a turn", name));
            }
            TileKind::Empty => return Err(BoardError::UnreachableTile(position)),
        }
        Ok(())
    }

    /// Draws from a table, opens the event, waits for the verdict, applies the
    /// effect and closes the event.
    async fn run_event(&mut self, id: PlayerId, category: EventCategory) -> BoardResult<()> {
        let entry = self.tables.draw(category, &mut self.rng)?;
        let has_fail = category.has_fail();
        let name = self.name(id)?;
        self.state.push_message(format!(
            "{} draws the {} '{}'",
            name,
            category.label(),
            entry.title
        ));

        self.state.open_event(ActiveEvent {
            category,
            player: id,
            title: entry.title.clone(),
            description: entry.description.clone(),
            has_fail,
            effect: entry.effect.clone(),
        })?;

        let success = self
            .gate
            .verdict(id, category, &entry.title, &entry.description, has_fail)
            .await?;
        self.apply_effect(id, &entry.effect, success).await?;
        self.state.close_event()?;
        Ok(())
    }

    /// Applies a table effect to the player. `success` only matters for task scores.
    pub async fn apply_effect(
        &mut self,
        id: PlayerId,
        effect: &Effect,
        success: bool,
    ) -> BoardResult<()> {
        let name = self.name(id)?;
        match *effect {
            Effect::Score {
                success: reward,
                failure: penalty,
            } => {
                let player = self.state.player_mut(id)?;
                let delta = if !success {
                    penalty
                } else if player.take_double_task_score() {
                    reward * 2
                } else {
                    reward
                };
                let applied = player.add_score(delta);
                let outcome = if success { "completes" } else { "fails" };
                self.state.push_message(format!(
                    "{} {} the task: {:+} points",
                    name, outcome, applied
                ));
            }
            Effect::AddScore(delta) => {
                let applied = self.state.player_mut(id)?.add_score(delta);
                self.state
                    .push_message(format!("{}: {:+} points", name, applied));
            }
            Effect::Damage(amount) => {
                self.damage(id, amount, None)?;
            }
            Effect::Heal => {
                self.state.player_mut(id)?.heal();
                self.state
                    .push_message(format!("{} is back to full health", name));
            }
            Effect::Stun(turns) => {
                self.state.player_mut(id)?.dizziness += turns;
                self.state
                    .push_message(format!("{} will miss {} turn(s)", name, turns));
            }
            Effect::Immunity(turns) => {
                self.state.player_mut(id)?.immune += turns;
                self.state
                    .push_message(format!("{} is protected for {} turn(s)", name, turns));
            }
            Effect::DoubleDice => {
                self.state.player_mut(id)?.double_dice += 1;
                self.state
                    .push_message(format!("{} will roll two dice next time", name));
            }
            Effect::DoubleDamage => {
                self.state.player_mut(id)?.double_damage += 1;
                self.state
                    .push_message(format!("{}'s next attack deals double damage", name));
            }
            Effect::DoubleTaskScore => {
                self.state.player_mut(id)?.double_task_score = true;
                self.state
                    .push_message(format!("{}'s next task pays double", name));
            }
            Effect::Teleport => {
                self.teleport(id).await?;
            }
            Effect::ForcedAttack => {
                let candidates = self.state.others(id);
                if candidates.is_empty() {
                    self.state
                        .push_message(format!("{} has nobody to fight", name));
                } else {
                    let target = self
                        .gate
                        .choose_target(id, "Choose a player to attack", candidates)
                        .await?;
                    self.attack(id, target, true).await?;
                }
            }
            Effect::StealScore { amount } => {
                let candidates = self.state.others(id);
                if candidates.is_empty() {
                    self.state
                        .push_message(format!("{} has nobody to rob", name));
                } else {
                    let target = self
                        .gate
                        .choose_target(id, "Choose a player to rob", candidates)
                        .await?;
                    let victim = self.state.player_mut(target)?;
                    let taken = amount.min(victim.score).max(0);
                    victim.score -= taken;
                    let victim_name = victim.name.clone();
                    self.state.player_mut(id)?.score += taken;
                    self.state.push_message(format!(
                        "{} takes {} points from {}",
                        name, taken, victim_name
                    ));
                }
            }
            Effect::PlaceTrap(trap_effect) => {
                let position = self.state.player(id)?.position;
                self.state.traps.push(Trap {
                    position,
                    owner: Some(id),
                    effect: trap_effect,
                });
                self.state
                    .push_message(format!("{} sets a trap at {}", name, position));
            }
        }
        Ok(())
    }

    /// Sends the player to a random other teleport tile.
    ///
    /// The player's next step follows a random legal direction from the destination
    /// without asking.
    pub async fn teleport(&mut self, id: PlayerId) -> BoardResult<()> {
        let from = self.state.player(id)?.position;
        let name = self.name(id)?;

        let destinations: Vec<Position> = self
            .map
            .teleports()
            .iter()
            .copied()
            .filter(|teleport| *teleport != from)
            .collect();
        let Some(&to) = destinations.choose(&mut self.rng) else {
            self.state
                .push_message(format!("The teleport hums but {} goes nowhere", name));
            return Ok(());
        };

        let directions: Vec<Direction> = self
            .map
            .legal_moves(to, None)
            .into_iter()
            .map(|(direction, _)| direction)
            .collect();
        let Some(&facing) = directions.choose(&mut self.rng) else {
            return Err(BoardError::DeadEnd(to));
        };

        let player = self.state.player_mut(id)?;
        player.position = to;
        player.direction = facing;
        player.fixed_direction = true;

        self.state
            .push_message(format!("{} teleports to {}", name, to));
        self.presenter.effect(Fx::Teleport {
            player: id,
            from,
            to,
        });
        self.presenter.focus(id, to);
        Ok(())
    }

    /// Has `attacker` attack `target`.
    ///
    /// The attack is voided when the attacker stands in a hospital or the target is
    /// immune, and declined when an unforced attacker says no. Returns the damage
    /// outcome when a blow actually lands.
    pub async fn attack(
        &mut self,
        attacker: PlayerId,
        target: PlayerId,
        forced: bool,
    ) -> BoardResult<Option<DamageOutcome>> {
        let position = self.state.player(attacker)?.position;
        let attacker_name = self.name(attacker)?;
        let target_name = self.name(target)?;

        if self.map.tile_at(position)? == TileKind::Hospital {
            log::warn!("Attack by player {} voided: in hospital", attacker);
            self.state.push_message(format!(
                "{} is in the hospital and cannot attack",
                attacker_name
            ));
            return Ok(None);
        }

        if self.state.player(target)?.is_immune() {
            log::warn!("Attack on player {} voided: immune", target);
            self.state.push_message(format!(
                "{} is immune, the attack fails",
                target_name
            ));
            return Ok(None);
        }

        if !forced
            && !self
                .gate
                .confirm(attacker, format!("Attack {}?", target_name))
                .await?
        {
            self.state.push_message(format!(
                "{} lets {} pass",
                attacker_name, target_name
            ));
            return Ok(None);
        }

        let doubled = self.state.player_mut(attacker)?.take_double_damage();
        let roll = self.dice.roll_die() as i32;
        let amount = if doubled { roll * 2 } else { roll };

        self.damage(target, amount, Some(attacker)).map(Some)
    }

    /// Deals damage to `target`, optionally credited to `source`, and reports it.
    pub fn damage(
        &mut self,
        target: PlayerId,
        amount: i32,
        source: Option<PlayerId>,
    ) -> BoardResult<DamageOutcome> {
        let outcome = apply_damage(
            &mut self.state,
            target,
            amount,
            source,
            self.rules.plunder_percent,
        )?;
        self.presenter.effect(Fx::Damage { target, amount });

        let target_name = self.name(target)?;
        let source_name = source.map(|source| self.name(source)).transpose()?;
        match &source_name {
            Some(source_name) => self.state.push_message(format!(
                "{} hits {} for {} damage",
                source_name, target_name, amount
            )),
            None => self
                .state
                .push_message(format!("{} takes {} damage", target_name, amount)),
        };

        if outcome.knocked_out {
            self.presenter.effect(Fx::Knockout { target });
            match &source_name {
                Some(source_name) => self.state.push_message(format!(
                    "{} is knocked out, {} plunders {} points",
                    target_name, source_name, outcome.plunder
                )),
                None => self.state.push_message(format!(
                    "{} is knocked out and loses {} points",
                    target_name, outcome.plunder
                )),
            };
        }
        Ok(outcome)
    }

    fn name(&self, id: PlayerId) -> BoardResult<String> {
        Ok(self.state.player(id)?.name.clone())
    }

    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
