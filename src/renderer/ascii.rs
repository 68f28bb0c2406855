//! Character-cell rendering of the canvas
//!
//! Each cell covers a fixed patch of the playfield. Shapes are painted in
//! stacking order so later items win, and text is written last at its anchor.

use crate::consts::*;
use crate::sim::{Canvas, Shape, ShapeKind};

/// Glyph for a filled shape
fn glyph(shape: &Shape) -> char {
    match shape.kind {
        ShapeKind::Oval => 'O',
        ShapeKind::Rectangle if shape.has_tag(BRICK_TAG) => {
            if shape.fill == BRICK_DAMAGED { '%' } else { '#' }
        }
        ShapeKind::Rectangle => '=',
        ShapeKind::Text { .. } => ' ',
    }
}

/// Render `canvas` into `cols` x `rows` characters, one line per row
pub fn render(canvas: &Canvas, cols: usize, rows: usize) -> String {
    if cols == 0 || rows == 0 {
        return String::new();
    }
    let cell_w = canvas.width() / cols as f32;
    let cell_h = canvas.height() / rows as f32;
    let mut grid = vec![vec![' '; cols]; rows];

    let cell_of = |x: f32, y: f32| -> (usize, usize) {
        let col = (x / cell_w).floor().clamp(0.0, (cols - 1) as f32) as usize;
        let row = (y / cell_h).floor().clamp(0.0, (rows - 1) as f32) as usize;
        (col, row)
    };

    for (_, shape) in canvas.iter() {
        if matches!(shape.kind, ShapeKind::Text { .. }) {
            continue;
        }
        let b = shape.bounds;
        if b.max.x < 0.0 || b.min.x >= canvas.width() || b.max.y < 0.0 || b.min.y >= canvas.height() {
            continue;
        }
        let (c0, r0) = cell_of(b.min.x, b.min.y);
        let (c1, r1) = cell_of(b.max.x - 0.01, b.max.y - 0.01);
        let ch = glyph(shape);
        for row in grid.iter_mut().take(r1.max(r0) + 1).skip(r0) {
            for cell in row.iter_mut().take(c1.max(c0) + 1).skip(c0) {
                *cell = ch;
            }
        }
    }

    for (_, shape) in canvas.iter() {
        if let ShapeKind::Text { text, .. } = &shape.kind {
            let (col, row) = cell_of(shape.bounds.min.x, shape.bounds.min.y);
            let len = text.chars().count();
            let start = col.saturating_sub(len / 2);
            for (i, ch) in text.chars().enumerate() {
                if let Some(cell) = grid[row].get_mut(start + i) {
                    *cell = ch;
                }
            }
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::Game;

    #[test]
    fn test_frame_dimensions() {
        let game = Game::new(Settings::default(), 1);
        let frame = render(game.canvas(), 80, 30);
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines.len(), 30);
        assert!(lines.iter().all(|l| l.chars().count() == 80));
    }

    #[test]
    fn test_bricks_and_paddle_drawn() {
        let game = Game::new(Settings::default(), 1);
        let frame = render(game.canvas(), 80, 30);
        let lines: Vec<&str> = frame.lines().collect();
        // Bricks occupy rows 2..=5 (y 40..120 at 20 units per row)
        assert!(lines[2].contains('#'));
        // Paddle at y 545..555 lands on row 27
        assert!(lines[27].contains('='));
    }

    #[test]
    fn test_text_written_over_shapes() {
        let mut canvas = Canvas::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, BACKGROUND);
        canvas.create_text(glam::Vec2::new(400.0, 300.0), "Game Over", 40, RED);
        let frame = render(&canvas, 80, 30);
        assert!(frame.lines().nth(15).unwrap().contains("Game Over"));
    }

    #[test]
    fn test_empty_grid() {
        let canvas = Canvas::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, BACKGROUND);
        assert!(render(&canvas, 0, 10).is_empty());
    }
}
