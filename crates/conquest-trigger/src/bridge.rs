//! The engine's window onto a running game
//!
//! Trigger code never owns the game. It reads [`GameData`] through a
//! [`Bridge`], submits every mutation as a [`ChangeSet`], writes history
//! through the bridge's [`HistoryWriter`] and reports everything else
//! (messages, captures, game over) to the bridge's collaborators.
//!
//! [`LocalBridge`] is the in-process implementation: it owns the data, a
//! [`History`] and the dice, and keeps what it was told for inspection.

use conquest_core::{Change, ChangeSet, GameData, GameRng, History, HistoryWriter, Result, Unit};
use tracing::{debug, info};

/// Access to the game for the duration of one firing pass
pub trait Bridge {
    fn data(&self) -> &GameData;

    /// Apply `changes` atomically and record them in history.
    fn add_change(&mut self, changes: ChangeSet) -> Result<()>;

    fn history_writer(&mut self) -> &mut dyn HistoryWriter;

    /// Current game round, starting at 1.
    fn round(&self) -> u32;

    /// Roll one die, returning a zero-based face.
    fn roll_die(&mut self, sides: u32, annotation: &str) -> u32;

    /// Fresh units, not yet placed anywhere.
    ///
    /// Their ids are reserved by the next change set submitted; units
    /// that never make it into one leave the id counter untouched.
    fn create_units(&mut self, unit_type: &str, count: u32, owner: Option<&str>)
        -> Result<Vec<Unit>>;

    /// Show `message` to `players`.
    fn report_message(&mut self, players: &[String], message: &str, title: &str);

    /// Tell the battle tracker `player` took `territory` this turn.
    fn mark_captured(&mut self, territory: &str, player: &str);

    /// Tell the battle tracker a relationship changed this turn.
    fn record_relationship_change(
        &mut self,
        player1: &str,
        player2: &str,
        previous: &str,
        relationship_type: &str,
    );

    fn signal_game_over(&mut self, status: &str, winners: &[String]);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedMessage {
    pub players: Vec<String>,
    pub message: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub territory: String,
    pub player: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipUpdate {
    pub player1: String,
    pub player2: String,
    pub previous: String,
    pub relationship_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOver {
    pub status: String,
    pub winners: Vec<String>,
}

/// A bridge over game data held in this process
#[derive(Debug, Clone)]
pub struct LocalBridge {
    data: GameData,
    history: History,
    rng: GameRng,
    round: u32,
    /// Ids handed out since the last submitted change set.
    pending_unit_ids: u64,
    submitted: Vec<ChangeSet>,
    messages: Vec<ReportedMessage>,
    captures: Vec<Capture>,
    relationship_updates: Vec<RelationshipUpdate>,
    game_over: Option<GameOver>,
}

impl LocalBridge {
    pub fn new(data: GameData) -> Self {
        let mut history = History::new();
        history.set_round(1);
        Self {
            data,
            history,
            rng: GameRng::default(),
            round: 1,
            pending_unit_ids: 0,
            submitted: Vec::new(),
            messages: Vec::new(),
            captures: Vec::new(),
            relationship_updates: Vec::new(),
            game_over: None,
        }
    }

    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_history(mut self, mut history: History) -> Self {
        history.set_round(self.round);
        self.history = history;
        self
    }

    pub fn set_round(&mut self, round: u32) {
        self.round = round;
        self.history.set_round(round);
    }

    pub fn set_step(&mut self, step: Option<String>) {
        self.history.set_step(step);
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Change sets applied so far, in submission order.
    pub fn submitted(&self) -> &[ChangeSet] {
        &self.submitted
    }

    pub fn messages(&self) -> &[ReportedMessage] {
        &self.messages
    }

    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    pub fn relationship_updates(&self) -> &[RelationshipUpdate] {
        &self.relationship_updates
    }

    pub fn game_over(&self) -> Option<&GameOver> {
        self.game_over.as_ref()
    }

    pub fn into_data(self) -> GameData {
        self.data
    }
}

impl Bridge for LocalBridge {
    fn data(&self) -> &GameData {
        &self.data
    }

    fn add_change(&mut self, changes: ChangeSet) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let changes = if self.pending_unit_ids > 0 {
            let previous = self.data.next_unit_id();
            let mut reserved = ChangeSet::from(Change::UnitIds {
                previous,
                next: previous + self.pending_unit_ids,
            });
            reserved.extend(changes);
            self.pending_unit_ids = 0;
            reserved
        } else {
            changes
        };
        self.data.apply(&changes)?;
        self.history.record_changes(&changes);
        self.submitted.push(changes);
        Ok(())
    }

    fn history_writer(&mut self) -> &mut dyn HistoryWriter {
        &mut self.history
    }

    fn round(&self) -> u32 {
        self.round
    }

    fn roll_die(&mut self, sides: u32, annotation: &str) -> u32 {
        let roll = self.rng.roll_die(sides);
        debug!(sides, roll, annotation, "rolled die");
        roll
    }

    fn create_units(
        &mut self,
        unit_type: &str,
        count: u32,
        owner: Option<&str>,
    ) -> Result<Vec<Unit>> {
        let first = self.data.next_unit_id() + self.pending_unit_ids;
        let units = self.data.build_units(unit_type, count, owner, first)?;
        self.pending_unit_ids += u64::from(count);
        Ok(units)
    }

    fn report_message(&mut self, players: &[String], message: &str, title: &str) {
        self.messages.push(ReportedMessage {
            players: players.to_vec(),
            message: message.to_string(),
            title: title.to_string(),
        });
    }

    fn mark_captured(&mut self, territory: &str, player: &str) {
        self.captures.push(Capture {
            territory: territory.to_string(),
            player: player.to_string(),
        });
    }

    fn record_relationship_change(
        &mut self,
        player1: &str,
        player2: &str,
        previous: &str,
        relationship_type: &str,
    ) {
        self.relationship_updates.push(RelationshipUpdate {
            player1: player1.to_string(),
            player2: player2.to_string(),
            previous: previous.to_string(),
            relationship_type: relationship_type.to_string(),
        });
    }

    fn signal_game_over(&mut self, status: &str, winners: &[String]) {
        info!(status, ?winners, "game over");
        self.game_over = Some(GameOver {
            status: status.to_string(),
            winners: winners.to_vec(),
        });
    }
}
