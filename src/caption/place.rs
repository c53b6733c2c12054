use super::{CaptionSlot, DerivedMetrics, DrawInstruction, Paint};

/// Positions already-wrapped lines inside `slot`.
///
/// Lines stack downward one `line_height_px` apart. Each non-empty line yields
/// a stroke instruction followed by a fill at the same coordinates; empty lines
/// still take up vertical space but draw nothing.
pub fn place(lines: &[String], slot: CaptionSlot, metrics: &DerivedMetrics) -> Vec<DrawInstruction> {
    if lines.is_empty() {
        return Vec::new();
    }

    let line_height = metrics.line_height_px as f64;
    let (x, y_top) = match slot {
        CaptionSlot::Anchor { x_center, y_top } => (x_center, y_top),
        CaptionSlot::Panel { rect, padding } => {
            let block_height = lines.len() as f64 * line_height;
            let x = rect.x as f64 + rect.w as f64 / 2.0;
            let y = rect.y as f64 + (padding as f64).max((rect.h as f64 - block_height) / 2.0);
            (x, y)
        }
    };

    let mut instructions = Vec::with_capacity(lines.len() * 2);
    for (idx, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let y = y_top + idx as f64 * line_height;
        if metrics.stroke_px > 0 {
            instructions.push(DrawInstruction {
                line: line.clone(),
                x,
                y,
                paint: Paint::Stroke,
            });
        }
        instructions.push(DrawInstruction {
            line: line.clone(),
            x,
            y,
            paint: Paint::Fill,
        });
    }
    instructions
}
