//! Lane layout.
//!
//! Each node kind owns a fixed column; rows are handed out per column in
//! placement order, so a given registration order always lays out the same.

use crate::graph::model::{NodeKind, Position};

/// Vertical distance between consecutive nodes of a lane.
pub const ROW_SPACING: i64 = 250;

/// Column of each lane.
pub fn lane_x(kind: NodeKind) -> i64 {
    match kind {
        NodeKind::Group | NodeKind::Subgroup => 0,
        NodeKind::Route => 450,
        NodeKind::Controller => 800,
        NodeKind::Middleware => 1150,
        NodeKind::Validation => 1500,
    }
}

fn lane_index(kind: NodeKind) -> usize {
    match kind {
        NodeKind::Group | NodeKind::Subgroup => 0,
        NodeKind::Route => 1,
        NodeKind::Controller => 2,
        NodeKind::Middleware => 3,
        NodeKind::Validation => 4,
    }
}

/// Per-lane row counters.
#[derive(Debug, Default)]
pub struct Layout {
    rows: [i64; 5],
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position for the next node placed in `kind`'s lane.
    pub fn place(&mut self, kind: NodeKind) -> Position {
        let row = &mut self.rows[lane_index(kind)];
        let position = Position {
            x: lane_x(kind),
            y: *row,
        };
        *row += ROW_SPACING;
        position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lanes_advance_independently() {
        let mut layout = Layout::new();
        assert_eq!(layout.place(NodeKind::Group), Position { x: 0, y: 0 });
        assert_eq!(layout.place(NodeKind::Route), Position { x: 450, y: 0 });
        assert_eq!(layout.place(NodeKind::Subgroup), Position { x: 0, y: 250 });
        assert_eq!(layout.place(NodeKind::Validation), Position { x: 1500, y: 0 });
        assert_eq!(layout.place(NodeKind::Route), Position { x: 450, y: 250 });
    }
}
