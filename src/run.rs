use engine::prelude::*;

/// Play the player's side of the session.
///
/// Every turn the player heads for the goal and walks as far as the move
/// budget allows, then hands the turn to the enemies. Stops when the game
/// ends or after `max_turns` turns. `on_turn` sees the session after each
/// full round.
pub fn autopilot(
    s: &mut Session,
    max_turns: u32,
    mut on_turn: impl FnMut(&Session),
) -> ScenarioStatus {
    let mut stuck = false;

    for turn in 1..=max_turns {
        if let Some(target) = next_stop(s) {
            stuck = false;
            if s.on_pointer_down(target).is_ok() {
                loop {
                    if let Some(status) = s.tick() {
                        return status;
                    }
                    if !s.player().is_moving() {
                        break;
                    }
                }
            }
        } else if !stuck {
            log::warn!("autopilot: No way to the goal at {}", s.goal());
            stuck = true;
        }

        if let Err(e) = s.on_end_turn_requested() {
            log::warn!("autopilot: Can't end turn {turn}: {e}");
            break;
        }
        if let Some(status) = s.tick() {
            return status;
        }

        for m in s.drain_msgs() {
            log::debug!("autopilot: {m:?}");
        }
        on_turn(s);
    }

    s.status()
}

/// Furthest tile towards the goal the player can reach this turn.
fn next_stop(s: &mut Session) -> Option<IVec2> {
    s.on_pointer_move(s.goal()).ok()?;
    s.flush_paths();
    let &stop = s.preview().last()?;
    (stop != s.player().pos()).then_some(stop)
}

#[cfg(test)]
mod test {
    use engine::{Layout, ScenarioStatus};
    use util::srng;

    use super::*;

    fn session(map: &str) -> Session {
        Session::from_layout(
            Default::default(),
            Layout::from_ascii(map).unwrap(),
            srng("autopilot"),
        )
        .unwrap()
    }

    #[test]
    fn walks_to_goal() {
        let mut s = session("G.....@");
        let mut turns = 0;
        let status = autopilot(&mut s, 10, |_| turns += 1);
        assert_eq!(status, ScenarioStatus::Won);
        assert_eq!(s.player().pos(), ivec2(0, 0));
        assert_eq!(turns, 1);
    }

    #[test]
    fn gives_up_on_walled_goal() {
        let mut s = session("@#G");
        let status = autopilot(&mut s, 5, |_| {});
        assert_eq!(status, ScenarioStatus::Ongoing);
        assert_eq!(s.player().pos(), ivec2(0, 0));
    }
}
