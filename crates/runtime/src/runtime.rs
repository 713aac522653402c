//! High-level match orchestrator.
//!
//! A [`Match`] owns one [`Game`] and drives it through the turn phases,
//! awaiting both move providers concurrently between the offer and the
//! resolution. [`MatchBuilder`] handles character selection and wiring.

use std::sync::Arc;
use std::time::Duration;

use duel_content::Roster;
use duel_core::{
    BattleConfig, Card, Channel, CharacterSource, Dice, Game, GamePlugin, MessageSink, MoveOffer,
    MoveSlot, PerSide, SeededDice, Side, TurnPhase,
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::api::{
    CharacterChoice, CharacterSelector, CollaboratorKind, MatchHandle, MoveProvider, MoveRequest,
    Result, RuntimeError,
};
use crate::events::{Event, EventBus, LogEvent, MatchEvent, TurnEvent};
use crate::plugins::DamageLogPlugin;
use crate::report::MatchReport;

/// Match configuration shared by the builder and the orchestrator.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub battle: BattleConfig,
    /// Time each side gets to pick a move.
    pub turn_duration: Duration,
    /// Time each side gets to pick a character.
    pub selection_timeout: Duration,
    /// Pause after every published batch of battle text.
    pub text_delay: Duration,
    pub event_buffer_size: usize,
    /// Seeds the match dice. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Copy each hand into the game room before moves are picked.
    pub reveal_hand: bool,
    /// Copy each side's offered moves into the game room.
    pub reveal_draw: bool,
    /// Names used when announcing character picks.
    pub players: PerSide<String>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            turn_duration: Duration::from_secs(60),
            selection_timeout: Duration::from_secs(60),
            text_delay: Duration::ZERO,
            event_buffer_size: 100,
            seed: None,
            reveal_hand: false,
            reveal_draw: false,
            players: PerSide::new("Challenger".to_string(), "Challenged".to_string()),
        }
    }
}

/// A started match. Built by [`MatchBuilder`], consumed by [`Match::run`].
pub struct Match {
    game: Game,
    config: MatchConfig,
    providers: PerSide<Arc<dyn MoveProvider>>,
    choices: PerSide<Option<CharacterChoice>>,
    damage: Arc<DamageLogPlugin>,
    event_bus: EventBus,
    phase: TurnPhase,
}

impl Match {
    /// Create a new match builder
    pub fn builder() -> MatchBuilder {
        MatchBuilder::new()
    }

    /// Get a cloneable handle for spectators
    pub fn handle(&self) -> MatchHandle {
        MatchHandle::new(self.event_bus.clone())
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Plays turns until the game reports game over.
    pub async fn run(mut self) -> Result<MatchReport> {
        self.game.start()?;
        self.announce_choices();
        let characters = PerSide::from_fn(|side| self.game.character(side).name.clone());
        self.event_bus
            .publish(Event::Match(MatchEvent::Started { characters }));
        self.flush().await;

        while !self.game.game_over {
            self.play_turn().await?;
        }

        let report = MatchReport::finished(&self.game, self.choices.clone(), self.damage.totals());
        info!(
            target: "duel::runtime",
            result = ?report.result,
            turns = report.turns,
            "match finished"
        );
        self.event_bus
            .publish(Event::Match(MatchEvent::Finished(report.clone())));
        Ok(report)
    }

    /// Runs one turn from TurnStart to TurnEnd.
    pub async fn play_turn(&mut self) -> Result<()> {
        self.enter(TurnPhase::TurnStart);
        self.game.begin_turn()?;
        self.flush().await;
        if self.game.game_over {
            return Ok(());
        }

        self.enter(TurnPhase::MoveOffer);
        let challenger = self.offer(Side::Challenger)?;
        let challenged = self.offer(Side::Challenged)?;
        let offers = PerSide::new(challenger, challenged);
        self.flush().await;

        self.enter(TurnPhase::MoveSelect);
        let moves = self.select_moves(&offers).await?;
        self.flush().await;

        self.enter(TurnPhase::MoveResolve);
        let order = self.game.resolve_moves(&moves)?;
        self.flush().await;

        self.enter(TurnPhase::EffectResolve);
        self.game.resolve_timed_effects(order)?;

        self.enter(TurnPhase::TurnEnd);
        self.game.end_turn(order, &moves)?;
        self.flush().await;
        Ok(())
    }

    fn enter(&mut self, phase: TurnPhase) {
        self.phase = phase;
        let turn = self.game.turn_count;
        debug!(target: "duel::runtime", turn, phase = phase.as_str(), "phase");
        self.event_bus
            .publish(Event::Turn(TurnEvent::Phase { turn, phase }));
    }

    fn offer(&mut self, side: Side) -> Result<MoveOffer> {
        let hand = self.config.reveal_hand.then(|| self.hand_listing(side));
        let offer = self.game.offer_moves(side)?;
        if let Some(hand) = hand {
            self.game.messages.gameroom(hand);
        }
        if self.config.reveal_draw {
            let name = self.game.character(side).name.clone();
            self.game
                .messages
                .gameroom(format!("## {name}'s Active Cards: "));
            self.game.messages.gameroom(offer.render());
        }
        Ok(offer)
    }

    fn hand_listing(&self, side: Side) -> String {
        let character = self.game.character(side);
        let mut lines = vec![format!("# {} {}'s Hand:", character.emoji, character.name)];
        lines.extend(
            character
                .hand
                .iter()
                .enumerate()
                .map(|(i, card)| format!("- {i}: {}", card.summary())),
        );
        lines.join("\n")
    }

    /// Awaits both providers together and plays the valid selections.
    async fn select_moves(&mut self, offers: &PerSide<MoveOffer>) -> Result<PerSide<Option<Card>>> {
        let requests = PerSide::from_fn(|side| self.request(side, &offers[side]));
        let challenger = Arc::clone(&self.providers[Side::Challenger]);
        let challenged = Arc::clone(&self.providers[Side::Challenged]);
        let budget = self.config.turn_duration;

        let (first, second) = tokio::join!(
            select_within(challenger.as_ref(), &requests[Side::Challenger], budget),
            select_within(challenged.as_ref(), &requests[Side::Challenged], budget),
        );
        let selections = PerSide::new(first?, second?);

        let mut moves: PerSide<Option<Card>> = PerSide::default();
        for side in Side::BOTH {
            let (picked, timed_out) = selections[side];
            let slot = picked.filter(|slot| offers[side].contains(*slot));
            if picked.is_some() && slot.is_none() {
                warn!(target: "duel::runtime", ?side, slot = ?picked, "selection not in offer");
            }
            if timed_out {
                let line = format!(
                    "{} did not pick a move in time.",
                    self.game.character(side).name
                );
                self.game.messages.push(Channel::Private(side), line);
            }
            self.event_bus.publish(Event::Turn(TurnEvent::MoveSelected {
                turn: self.game.turn_count,
                side,
                slot,
                timed_out,
            }));
            if let Some(slot) = slot {
                moves[side] = Some(self.game.play_selection(side, slot, &offers[side])?);
            }
        }
        Ok(moves)
    }

    fn request(&self, side: Side, offer: &MoveOffer) -> MoveRequest {
        let character = self.game.character(side);
        MoveRequest {
            side,
            turn: self.game.turn_count,
            character: character.name.clone(),
            stats: character.stats,
            hand_size: character.hand.len(),
            offer: offer.clone(),
            budget: self.config.turn_duration,
        }
    }

    fn announce_choices(&mut self) {
        for side in Side::BOTH {
            let Some(choice) = &self.choices[side] else {
                continue;
            };
            let player = &self.config.players[side];
            let character = self.game.character(side);
            let line = if choice.random {
                format!(
                    "## {player} rolled the dice and got {} **{}**!",
                    character.emoji, character.name
                )
            } else {
                format!(
                    "## {player} selected {} **{}**!",
                    character.emoji, character.name
                )
            };
            self.game.messages.gameroom(line);
        }
    }

    /// Publishes every pending channel, game room first.
    async fn flush(&mut self) {
        let channels = self.game.messages.dirty_channels();
        if channels.is_empty() {
            return;
        }
        for channel in channels {
            let lines = self.game.messages.flush(channel);
            self.event_bus.publish(Event::Log(LogEvent { channel, lines }));
        }
        if !self.config.text_delay.is_zero() {
            tokio::time::sleep(self.config.text_delay).await;
        }
    }
}

/// Asks `provider` for a move, treating a missed deadline as no move.
async fn select_within(
    provider: &dyn MoveProvider,
    request: &MoveRequest,
    budget: Duration,
) -> Result<(Option<MoveSlot>, bool)> {
    match timeout(budget, provider.select_move(request)).await {
        Ok(selection) => Ok((selection?, false)),
        Err(_) => {
            debug!(target: "duel::runtime", side = ?request.side, "move selection timed out");
            Ok((None, true))
        }
    }
}

/// Builder for [`Match`] with flexible configuration.
pub struct MatchBuilder {
    config: MatchConfig,
    source: Arc<dyn CharacterSource>,
    selectors: PerSide<Option<Arc<dyn CharacterSelector>>>,
    providers: PerSide<Option<Arc<dyn MoveProvider>>>,
    plugins: Vec<Arc<dyn GamePlugin>>,
    dice: Option<Box<dyn Dice>>,
    event_bus: Option<EventBus>,
}

impl MatchBuilder {
    fn new() -> Self {
        Self {
            config: MatchConfig::default(),
            source: Arc::new(Roster::standard()),
            selectors: PerSide::default(),
            providers: PerSide::default(),
            plugins: Vec::new(),
            dice: None,
            event_bus: None,
        }
    }

    /// Override match configuration
    pub fn config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the standard roster as the source of character templates
    pub fn characters(mut self, source: impl CharacterSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    pub fn selector(mut self, side: Side, selector: impl CharacterSelector + 'static) -> Self {
        self.selectors[side] = Some(Arc::new(selector));
        self
    }

    pub fn provider(mut self, side: Side, provider: impl MoveProvider + 'static) -> Self {
        self.providers[side] = Some(Arc::new(provider));
        self
    }

    /// Register an engine plugin. Plugins run in registration order.
    pub fn plugin(mut self, plugin: Arc<dyn GamePlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Override the dice, ignoring `MatchConfig::seed`
    pub fn dice(mut self, dice: impl Dice + 'static) -> Self {
        self.dice = Some(Box::new(dice));
        self
    }

    /// Publish to an existing bus instead of creating one
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Asks both selectors for a character and builds the match.
    ///
    /// Returns `Ok(None)` when a side made no choice in time.
    pub async fn build(self) -> Result<Option<Match>> {
        match self.prepare().await? {
            Prepared::Ready(game) => Ok(Some(game)),
            Prepared::Incomplete { .. } => Ok(None),
        }
    }

    /// Builds and runs the match, reporting an incomplete match when a side
    /// made no character choice.
    pub async fn run(self) -> Result<MatchReport> {
        match self.prepare().await? {
            Prepared::Ready(game) => game.run().await,
            Prepared::Incomplete { event_bus, report } => {
                event_bus.publish(Event::Match(MatchEvent::Finished(report.clone())));
                Ok(report)
            }
        }
    }

    async fn prepare(self) -> Result<Prepared> {
        let providers = PerSide::new(
            required(&self.providers, Side::Challenger, CollaboratorKind::MoveProvider)?,
            required(&self.providers, Side::Challenged, CollaboratorKind::MoveProvider)?,
        );
        let choices = self.choose_characters().await?;
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| EventBus::with_capacity(self.config.event_buffer_size));

        let (Some(first), Some(second)) = (&choices[Side::Challenger], &choices[Side::Challenged])
        else {
            info!(target: "duel::runtime", "match incomplete: missing character choice");
            let report = MatchReport::incomplete(choices);
            return Ok(Prepared::Incomplete { event_bus, report });
        };
        let challenger = self
            .source
            .character(&first.name)
            .ok_or_else(|| RuntimeError::UnknownCharacter(first.name.clone()))?;
        let challenged = self
            .source
            .character(&second.name)
            .ok_or_else(|| RuntimeError::UnknownCharacter(second.name.clone()))?;

        let dice: Box<dyn Dice> = match (self.dice, self.config.seed) {
            (Some(dice), _) => dice,
            (None, Some(seed)) => Box::new(SeededDice::new(seed)),
            (None, None) => Box::new(SeededDice::from_entropy()),
        };
        let damage = Arc::new(DamageLogPlugin::new());
        let mut plugins = self.plugins;
        plugins.push(damage.clone());
        let game = Game::new(&challenger, &challenged, self.config.battle.clone(), dice)
            .with_plugins(plugins);

        info!(
            target: "duel::runtime",
            challenger = %challenger.name,
            challenged = %challenged.name,
            turn_limit = self.config.battle.turn_limit,
            "match built"
        );
        Ok(Prepared::Ready(Match {
            game,
            config: self.config,
            providers,
            choices,
            damage,
            event_bus,
            phase: TurnPhase::TurnStart,
        }))
    }

    async fn choose_characters(&self) -> Result<PerSide<Option<CharacterChoice>>> {
        let kind = CollaboratorKind::CharacterSelector;
        let challenger = required(&self.selectors, Side::Challenger, kind)?;
        let challenged = required(&self.selectors, Side::Challenged, kind)?;
        let roster = self.source.names();
        let budget = self.config.selection_timeout;

        let (first, second) = tokio::join!(
            timeout(budget, challenger.select_character(Side::Challenger, &roster)),
            timeout(budget, challenged.select_character(Side::Challenged, &roster)),
        );
        let first = first.unwrap_or(Ok(None))?;
        let second = second.unwrap_or(Ok(None))?;
        Ok(PerSide::new(first, second))
    }
}

enum Prepared {
    Ready(Match),
    Incomplete {
        event_bus: EventBus,
        report: MatchReport,
    },
}

impl Default for MatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn required<T: ?Sized>(
    slots: &PerSide<Option<Arc<T>>>,
    side: Side,
    kind: CollaboratorKind,
) -> Result<Arc<T>> {
    slots[side]
        .clone()
        .ok_or(RuntimeError::CollaboratorNotSet { kind, side })
}
