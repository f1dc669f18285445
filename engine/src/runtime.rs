use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::bail;
use rand::SeedableRng;
use util::{srng, GameRng};

use crate::{
    evaluate, prelude::*, Chase, Enemy, GridMap, Layout, Msg, Path,
    Pathfinder, Player, Pursuit, Rejection, Result, ScenarioStatus,
    SessionConfig, Ticket, Turn, TurnController,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Intent {
    Preview,
    Commit,
}

/// Finished path query on its way back to the session.
struct Completion {
    ticket: Ticket,
    intent: Intent,
    target: IVec2,
    path: Option<Path>,
}

/// Main data container for a running game.
///
/// Owns the map, the agents and the turn state, and turns presentation
/// layer input events into game state changes.
pub struct Session {
    config: SessionConfig,
    grid: GridMap,
    goal: IVec2,
    player: Player,
    enemies: Vec<Enemy>,
    turns: TurnController,
    pathfinder: Pathfinder,
    pursuit: Box<dyn Pursuit>,
    rng: GameRng,

    send: Sender<Completion>,
    recv: Receiver<Completion>,
    latest_preview: Option<Ticket>,
    latest_commit: Option<Ticket>,
    preview: Vec<IVec2>,

    status: ScenarioStatus,
    /// Game over has been reported, the session is frozen.
    reported: bool,
    msgs: Vec<Msg>,
}

impl Session {
    /// Start a session on a generated map.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let mut rng = if config.seed.is_empty() {
            GameRng::from_entropy()
        } else {
            srng(config.seed.as_str())
        };

        let layout = Layout::generate(&config, &mut rng)?;
        Session::from_layout(config, layout, rng)
    }

    /// Start a session with a known layout.
    pub fn from_layout(
        config: SessionConfig,
        layout: Layout,
        rng: GameRng,
    ) -> Result<Self> {
        config.validate()?;

        let Layout {
            grid,
            player,
            goal,
            enemies,
        } = layout;

        for (what, pos) in [("player", player), ("goal", goal)]
            .into_iter()
            .chain(enemies.iter().map(|&p| ("enemy", p)))
        {
            if !grid.is_walkable(pos) {
                bail!("Session: Bad {what} position {pos}");
            }
        }

        let enemies = enemies
            .into_iter()
            .map(|p| {
                Enemy::new(
                    &grid,
                    p,
                    config.vision(),
                    config.enemy_max_move_distance,
                )
            })
            .collect();

        let (send, recv) = mpsc::channel();
        let mut ret = Session {
            turns: TurnController::new(config.max_move_distance),
            pathfinder: Pathfinder::new(config.path_settings()),
            config,
            grid,
            goal,
            player: Player::new(player),
            enemies,
            pursuit: Box::new(Chase),
            rng,
            send,
            recv,
            latest_preview: None,
            latest_commit: None,
            preview: Vec::new(),
            status: ScenarioStatus::Ongoing,
            reported: false,
            msgs: Vec::new(),
        };

        ret.scan();
        Ok(ret)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    pub fn goal(&self) -> IVec2 {
        self.goal
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn turn(&self) -> Turn {
        self.turns.turn()
    }

    /// Moves the player can still commit to this turn.
    pub fn remaining_moves(&self) -> u32 {
        self.turns.remaining()
    }

    /// Tiles of the latest path preview.
    pub fn preview(&self) -> &[IVec2] {
        &self.preview
    }

    pub fn status(&self) -> ScenarioStatus {
        self.status
    }

    /// Replace the strategy alerted enemies use to hunt the player.
    pub fn set_pursuit(&mut self, pursuit: impl Pursuit + 'static) {
        self.pursuit = Box::new(pursuit);
    }

    /// Take the events emitted since the last call.
    pub fn drain_msgs(&mut self) -> Vec<Msg> {
        std::mem::take(&mut self.msgs)
    }

    /// Whether the player can be ordered to move to the tile.
    pub fn is_valid_target(&self, tile: IVec2) -> bool {
        self.grid.is_walkable(tile)
            && tile != self.player.pos()
            && !self.enemies.iter().any(|e| e.pos() == tile)
    }

    fn check_player_input(&self, tile: IVec2) -> Result<(), Rejection> {
        if self.reported || self.status.is_over() {
            Err(Rejection::GameOver)
        } else if !self.turns.is_player_turn() {
            Err(Rejection::NotPlayerTurn)
        } else if !self.is_valid_target(tile) {
            Err(Rejection::InvalidTarget(tile))
        } else {
            Ok(())
        }
    }

    fn request_path(&mut self, intent: Intent, target: IVec2) -> Ticket {
        let send = self.send.clone();
        let occupied: Vec<IVec2> =
            self.enemies.iter().map(|e| e.pos()).collect();
        self.pathfinder.find_path(
            self.player.pos(),
            target,
            occupied,
            move |ticket, path| {
                // Receiver lives as long as the session that owns the
                // pathfinder.
                let _ = send.send(Completion {
                    ticket,
                    intent,
                    target,
                    path,
                });
            },
        )
    }

    /// Pointer hovers over a tile, show where the player would go.
    ///
    /// The preview updates once the path query completes on the next tick
    /// or `flush_paths`. An invalid tile leaves the current preview as is.
    pub fn on_pointer_move(
        &mut self,
        tile: IVec2,
    ) -> Result<Ticket, Rejection> {
        self.check_player_input(tile)?;
        let ticket = self.request_path(Intent::Preview, tile);
        self.latest_preview = Some(ticket);
        Ok(ticket)
    }

    /// Pointer clicked on a tile, order the player to move there.
    ///
    /// The move is committed when the path query completes, if the path fits
    /// in the remaining move budget.
    pub fn on_pointer_down(
        &mut self,
        tile: IVec2,
    ) -> Result<Ticket, Rejection> {
        if let Err(e) = self.check_player_input(tile) {
            self.msgs.push(Msg::MoveRejected(e));
            return Err(e);
        }
        let ticket = self.request_path(Intent::Commit, tile);
        self.latest_commit = Some(ticket);
        Ok(ticket)
    }

    /// Player is done for this turn.
    ///
    /// Any committed path the player hasn't finished walking is walked to the
    /// end first. If the walk ends the game the turn stays with the player
    /// and the next tick reports the outcome.
    pub fn on_end_turn_requested(&mut self) -> Result<(), Rejection> {
        if self.reported || self.status.is_over() {
            return Err(Rejection::GameOver);
        }
        if !self.turns.is_player_turn() {
            return Err(Rejection::NotPlayerTurn);
        }

        while self.step_player() {
            if evaluate(self.player.pos(), &self.enemies, self.goal).is_over() {
                // Stop on the tile that ended the game, next tick reports it.
                log::debug!("Session: Walk ends game at {}", self.player.pos());
                return Ok(());
            }
        }

        self.turns.end_player_turn();
        self.latest_preview = None;
        self.latest_commit = None;
        self.preview.clear();

        log::debug!("Session: Player ends turn at {}", self.player.pos());
        self.msgs.push(Msg::TurnChanged(Turn::Ai));
        Ok(())
    }

    /// Resolve queued path queries and apply their results.
    pub fn flush_paths(&mut self) {
        self.pathfinder.calculate(&self.grid);

        while let Ok(done) = self.recv.try_recv() {
            match done.intent {
                Intent::Preview => self.apply_preview(done),
                Intent::Commit => self.apply_commit(done),
            }
        }
    }

    fn apply_preview(&mut self, done: Completion) {
        if self.latest_preview != Some(done.ticket) {
            log::trace!("Session: Dropping stale preview {:?}", done.ticket);
            return;
        }
        self.latest_preview = None;

        let Some(mut path) = done.path else {
            return;
        };
        if !self.turns.is_player_turn() || self.status.is_over() {
            return;
        }

        path.truncate(self.turns.remaining() as usize + 1);
        self.preview = path.clone();
        self.msgs.push(Msg::PathPreview(path));
    }

    fn apply_commit(&mut self, done: Completion) {
        if let Err(e) = self.try_commit(done) {
            log::warn!("Session: Move rejected: {e}");
            self.msgs.push(Msg::MoveRejected(e));
        }
    }

    fn try_commit(&mut self, done: Completion) -> Result<(), Rejection> {
        if self.latest_commit != Some(done.ticket) {
            return Err(Rejection::Superseded);
        }
        self.latest_commit = None;

        if self.status.is_over() {
            return Err(Rejection::GameOver);
        }
        if !self.turns.is_player_turn() {
            return Err(Rejection::NotPlayerTurn);
        }

        let Some(path) = done.path else {
            return Err(Rejection::NoPath(done.target));
        };
        if path.first() != Some(&self.player.pos()) {
            // Player moved after the query was made.
            return Err(Rejection::Superseded);
        }

        let cost = path.len() as u32 - 1;
        let remaining = self.turns.spend(cost)?;

        log::debug!(
            "Session: Player commits to {} in {cost} moves, {remaining} left",
            done.target
        );
        self.player.set_path(path.clone());
        self.preview.clear();
        self.msgs.push(Msg::MoveCommitted { path, remaining });

        self.scan();
        Ok(())
    }

    /// Advance the session by one update.
    ///
    /// During the player's turn the player walks one tile along the
    /// committed path. During the AI turn every enemy takes its turn and the
    /// turn passes back to the player. Returns the outcome on the tick the
    /// game ends and `None` on every other tick, including all ticks after
    /// the end.
    pub fn tick(&mut self) -> Option<ScenarioStatus> {
        if self.reported {
            return None;
        }

        self.flush_paths();

        // The player may have walked into an end state when ending the turn.
        if let Some(status) = self.check_end() {
            return Some(status);
        }

        match self.turns.turn() {
            Turn::Player => {
                self.step_player();
            }
            Turn::Ai => self.run_ai(),
        }

        self.check_end()
    }

    fn check_end(&mut self) -> Option<ScenarioStatus> {
        self.status = evaluate(self.player.pos(), &self.enemies, self.goal);
        if !self.status.is_over() {
            return None;
        }

        log::info!("Session: Game over, {}", self.status);
        self.reported = true;
        self.preview.clear();
        self.msgs.push(Msg::GameOver(self.status));
        Some(self.status)
    }

    /// Walk the player one tile, returns false if the player isn't moving.
    fn step_player(&mut self) -> bool {
        if self.player.advance().is_none() {
            return false;
        }
        self.scan();
        true
    }

    /// Every enemy looks for the player.
    fn scan(&mut self) {
        let player = self.player.pos();
        for e in self.enemies.iter_mut() {
            let was_alerted = e.is_alerted();
            e.scan(&self.grid, player);
            if !was_alerted && e.is_alerted() {
                self.msgs.push(Msg::EnemyAlerted(e.pos()));
            }
        }
    }

    fn run_ai(&mut self) {
        let player = self.player.pos();

        for i in 0..self.enemies.len() {
            let occupied: HashSet<IVec2> = self
                .enemies
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, e)| e.pos())
                .collect();

            let enemy = &mut self.enemies[i];
            let report = enemy.take_turn(
                &self.grid,
                player,
                &occupied,
                &*self.pursuit,
                &mut self.rng,
            );

            if report.became_alerted {
                self.msgs.push(Msg::EnemyAlerted(enemy.pos()));
            }
            if report.captured {
                break;
            }
        }

        self.turns.end_ai_turn();
        self.msgs.push(Msg::TurnChanged(Turn::Player));
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Rejection::*, Wander};

    fn session(config: SessionConfig, map: &str) -> Session {
        Session::from_layout(
            config,
            Layout::from_ascii(map).unwrap(),
            srng("test"),
        )
        .unwrap()
    }

    fn stationary() -> SessionConfig {
        SessionConfig {
            enemy_max_move_distance: 0,
            ..Default::default()
        }
    }

    /// Tick until the player stops walking.
    fn walk(s: &mut Session) -> Option<ScenarioStatus> {
        while s.player().is_moving() {
            if let Some(status) = s.tick() {
                return Some(status);
            }
        }
        None
    }

    fn commit(s: &mut Session, tile: IVec2) {
        s.on_pointer_down(tile).unwrap();
        s.flush_paths();
    }

    #[test]
    fn immediate_win() {
        let mut s = session(Default::default(), "*");
        assert_eq!(s.status(), ScenarioStatus::Ongoing);
        assert_eq!(s.tick(), Some(ScenarioStatus::Won));
        assert_eq!(s.status().to_string(), "win");

        // Reported once, then frozen.
        assert_eq!(s.tick(), None);
        assert_eq!(s.status(), ScenarioStatus::Won);
        let overs = s
            .drain_msgs()
            .into_iter()
            .filter(|m| matches!(m, Msg::GameOver(_)))
            .count();
        assert_eq!(overs, 1);
        assert_eq!(s.on_pointer_down(ivec2(0, 0)), Err(GameOver));
        assert_eq!(s.on_end_turn_requested(), Err(GameOver));
    }

    #[test]
    fn capture_after_approach() {
        let config = SessionConfig {
            enemy_vision_range: 1,
            ..Default::default()
        };
        let mut s = session(
            config,
            "
            @...G
            .....
            .....
            .....
            ....E",
        );

        // Enemy tile is not a valid target.
        assert_eq!(
            s.on_pointer_down(ivec2(4, 4)),
            Err(InvalidTarget(ivec2(4, 4)))
        );

        commit(&mut s, ivec2(3, 3));
        assert_eq!(s.remaining_moves(), 1);
        assert_eq!(s.player().path().len(), 4);
        assert_eq!(walk(&mut s), None);
        assert_eq!(s.player().pos(), ivec2(3, 3));
        assert_eq!(s.status(), ScenarioStatus::Ongoing);
        assert!(s.enemies()[0].is_alerted());

        // Enemy goes for the player.
        s.on_end_turn_requested().unwrap();
        assert_eq!(s.tick(), Some(ScenarioStatus::Lost));
        assert_eq!(s.enemies()[0].pos(), ivec2(3, 3));
        assert_eq!(s.status().to_string(), "lose");
    }

    #[test]
    fn stationary_enemy_is_harmless() {
        let config = SessionConfig {
            enemy_vision_range: 1,
            ..stationary()
        };
        let mut s = session(
            config,
            "
            @...G
            .....
            .....
            .....
            ....E",
        );
        commit(&mut s, ivec2(3, 3));
        walk(&mut s);
        s.on_end_turn_requested().unwrap();
        assert_eq!(s.tick(), None);
        assert_eq!(s.turn(), Turn::Player);
        assert_eq!(s.status(), ScenarioStatus::Ongoing);
        assert_eq!(s.enemies()[0].pos(), ivec2(4, 4));
        assert_eq!(
            evaluate(ivec2(4, 4), s.enemies(), s.goal()),
            ScenarioStatus::Lost
        );
    }

    #[test]
    fn walled_off_goal() {
        let mut s = session(
            Default::default(),
            "
            @.#..
            ..#.G
            ..#..",
        );

        s.on_pointer_down(ivec2(4, 1)).unwrap();
        assert_eq!(s.tick(), None);
        assert!(s
            .drain_msgs()
            .contains(&Msg::MoveRejected(NoPath(ivec2(4, 1)))));
        assert_eq!(s.remaining_moves(), 4);
        assert!(!s.player().is_moving());

        for _ in 0..50 {
            s.on_pointer_down(ivec2(4, 1)).unwrap();
            s.on_end_turn_requested().unwrap();
            assert_eq!(s.tick(), None);
            assert_eq!(s.tick(), None);
        }
        assert_eq!(s.status(), ScenarioStatus::Ongoing);
        assert_eq!(s.player().pos(), ivec2(0, 0));
    }

    #[test]
    fn alert_sticks() {
        let config = SessionConfig {
            enemy_vision_range: 3,
            ..stationary()
        };
        let mut s = session(
            config,
            "
            E.......
            .......@
            .......G",
        );
        assert!(!s.enemies()[0].is_alerted());

        commit(&mut s, ivec2(3, 1));
        walk(&mut s);
        assert!(s.enemies()[0].is_alerted());
        s.on_end_turn_requested().unwrap();
        s.tick();

        commit(&mut s, ivec2(2, 1));
        walk(&mut s);
        assert!(s.enemies()[0].visibility().is_visible(ivec2(2, 1)));

        // Walk out of range.
        s.on_end_turn_requested().unwrap();
        s.tick();
        commit(&mut s, ivec2(6, 1));
        walk(&mut s);
        assert!(!s.enemies()[0].visibility().is_visible(s.player().pos()));
        assert!(s.enemies()[0].is_alerted());

        let alerts = s
            .drain_msgs()
            .into_iter()
            .filter(|m| matches!(m, Msg::EnemyAlerted(_)))
            .count();
        assert_eq!(alerts, 1);
    }

    #[test]
    fn preview_follows_latest_pointer() {
        let mut s = session(
            Default::default(),
            "
            @.......
            ........
            .......G",
        );

        let a = s.on_pointer_move(ivec2(2, 0)).unwrap();
        let b = s.on_pointer_move(ivec2(7, 0)).unwrap();
        assert!(b > a);
        assert!(s.preview().is_empty());

        s.flush_paths();
        // Cut to the budget of 4 moves.
        assert_eq!(s.preview().len(), 5);
        assert_eq!(s.preview()[0], ivec2(0, 0));
        assert_eq!(s.preview()[4].x, 4);

        let previews: Vec<Msg> = s
            .drain_msgs()
            .into_iter()
            .filter(|m| matches!(m, Msg::PathPreview(_)))
            .collect();
        assert_eq!(previews, vec![Msg::PathPreview(s.preview().to_vec())]);

        // Previews don't spend anything.
        assert_eq!(s.remaining_moves(), 4);
        assert!(!s.player().is_moving());
    }

    #[test]
    fn budget_enforced_at_commit() {
        let mut s = session(
            Default::default(),
            "
            @.......
            ........
            .......G",
        );

        s.on_pointer_down(ivec2(6, 0)).unwrap();
        s.flush_paths();
        assert_eq!(
            s.drain_msgs(),
            vec![Msg::MoveRejected(Rejection::OverBudget(
                crate::OverBudget {
                    cost: 6,
                    remaining: 4
                }
            ))]
        );
        assert_eq!(s.remaining_moves(), 4);
        assert!(!s.player().is_moving());

        commit(&mut s, ivec2(3, 0));
        assert_eq!(s.remaining_moves(), 1);
        walk(&mut s);

        commit(&mut s, ivec2(4, 0));
        assert_eq!(s.remaining_moves(), 0);
        walk(&mut s);
        assert_eq!(s.player().pos(), ivec2(4, 0));

        // Budget is full again on the next turn.
        s.on_end_turn_requested().unwrap();
        assert_eq!(s.on_pointer_down(ivec2(5, 0)), Err(NotPlayerTurn));
        s.tick();
        assert_eq!(s.turn(), Turn::Player);
        assert_eq!(s.remaining_moves(), 4);
    }

    #[test]
    fn only_latest_commit_applies() {
        let mut s = session(
            Default::default(),
            "
            @.......
            ........
            .......G",
        );
        s.on_pointer_down(ivec2(1, 0)).unwrap();
        s.on_pointer_down(ivec2(2, 0)).unwrap();
        s.flush_paths();

        assert_eq!(s.remaining_moves(), 2);
        assert_eq!(s.player().path().last(), Some(&ivec2(2, 0)));
        assert!(s.drain_msgs().contains(&Msg::MoveRejected(Superseded)));
    }

    #[test]
    fn invalid_targets() {
        let mut s = session(
            Default::default(),
            "
            @.#.
            ...E
            ...G",
        );
        for tile in [ivec2(2, 0), ivec2(0, 0), ivec2(3, 1), ivec2(-1, 0)] {
            assert_eq!(s.on_pointer_move(tile), Err(InvalidTarget(tile)));
            assert_eq!(s.on_pointer_down(tile), Err(InvalidTarget(tile)));
        }
        assert!(s.is_valid_target(ivec2(3, 2)));
        s.flush_paths();
        assert!(s.preview().is_empty());
        assert_eq!(s.remaining_moves(), 4);
    }

    #[test]
    fn end_turn_finishes_walk() {
        let mut s = session(
            stationary(),
            "
            @.......
            ........
            .......G",
        );
        commit(&mut s, ivec2(4, 0));
        assert_eq!(s.tick(), None);
        assert_eq!(s.player().pos().x, 1);

        s.on_end_turn_requested().unwrap();
        assert_eq!(s.player().pos(), ivec2(4, 0));
        assert_eq!(s.on_end_turn_requested(), Err(NotPlayerTurn));
    }

    #[test]
    fn vision_range_past_map_size() {
        let config = SessionConfig {
            enemy_vision_range: 40_000,
            ..stationary()
        };
        let s = session(config, "@.E\n..G");
        assert!(s.enemies()[0].is_alerted());
        assert_eq!(s.enemies()[0].visibility().len(), 6);
    }

    #[test]
    fn end_turn_stops_walk_on_goal() {
        let mut s = session(stationary(), "@.G..");
        commit(&mut s, ivec2(4, 0));
        assert_eq!(s.player().path().len(), 5);

        s.on_end_turn_requested().unwrap();
        assert_eq!(s.player().pos(), ivec2(2, 0));
        assert_eq!(s.tick(), Some(ScenarioStatus::Won));
        assert_eq!(s.status(), ScenarioStatus::Won);
        assert!(
            !s.drain_msgs()
                .iter()
                .any(|m| matches!(m, Msg::TurnChanged(Turn::Ai)))
        );
    }

    #[test]
    fn reach_goal() {
        let mut s = session(
            Default::default(),
            "
            @..G
            ....",
        );
        commit(&mut s, ivec2(3, 0));
        assert_eq!(walk(&mut s), Some(ScenarioStatus::Won));
        assert_eq!(s.tick(), None);
    }

    #[test]
    fn goal_reached_before_enemies_act() {
        let mut s = session(
            Default::default(),
            "
            @..G
            ...E",
        );
        assert!(s.enemies()[0].is_alerted());
        commit(&mut s, ivec2(3, 0));
        s.on_end_turn_requested().unwrap();
        assert_eq!(s.player().pos(), ivec2(3, 0));
        assert_eq!(s.tick(), Some(ScenarioStatus::Won));
        assert_eq!(s.enemies()[0].pos(), ivec2(3, 1));
    }

    #[test]
    fn wandering_enemies_keep_off_walls() {
        let mut s = Session::new(SessionConfig {
            seed: "wander".into(),
            ..Default::default()
        })
        .unwrap();
        s.set_pursuit(Wander);

        for _ in 0..30 {
            if s.status().is_over() {
                break;
            }
            s.on_end_turn_requested().unwrap();
            s.tick();
            let posns: HashSet<IVec2> =
                s.enemies().iter().map(|e| e.pos()).collect();
            assert_eq!(posns.len(), s.enemies().len());
            for e in s.enemies() {
                assert!(s.grid().is_walkable(e.pos()));
                assert!(e.moved() <= 5);
            }
        }
    }
}
