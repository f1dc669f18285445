use std::fmt::Write;

use engine::prelude::*;

/// Map picture with the status line below it.
pub fn render(s: &Session) -> String {
    let mut ret = render_map(s);
    let _ = write!(
        ret,
        "{:?} turn, {} moves left, {}",
        s.turn(),
        s.remaining_moves(),
        s.status()
    );
    ret
}

/// Draw the map as text.
///
/// `@` is the player, `G` the goal, `E` an idle enemy and `!` an alerted
/// one. Cells seen by any enemy show as `:` and the path preview as `*`.
pub fn render_map(s: &Session) -> String {
    let grid = s.grid();
    let mut ret = String::new();

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            ret.push(glyph(s, ivec2(x, y)));
        }
        ret.push('\n');
    }
    ret
}

fn glyph(s: &Session, pos: IVec2) -> char {
    if s.player().pos() == pos {
        return '@';
    }
    if let Some(e) = s.enemies().iter().find(|e| e.pos() == pos) {
        return if e.is_alerted() { '!' } else { 'E' };
    }
    if s.goal() == pos {
        return 'G';
    }
    if !s.grid().is_walkable(pos) {
        return '#';
    }
    if s.preview().contains(&pos) {
        return '*';
    }
    if s.enemies().iter().any(|e| e.visibility().is_visible(pos)) {
        return ':';
    }
    '.'
}
