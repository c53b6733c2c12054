use super::{
    CanvasDimensions, DerivedMetrics, LINE_HEIGHT_FACTOR, LayoutConfig, MIN_FONT_PX,
    REFERENCE_FONT_PX,
};

/// Pixel sizing for one request. All lengths scale with the canvas height so
/// every layout variant shares the same type size.
pub fn compute_metrics(dims: CanvasDimensions, config: &LayoutConfig) -> DerivedMetrics {
    let config = config.clamped();
    let height = dims.height as f64;

    let margin_px = config.margin_fraction * height;
    let base_font_px = ((config.font_size_fraction * height).floor() as u32).max(MIN_FONT_PX);
    let stroke_px =
        ((config.stroke_weight * base_font_px as f64 / REFERENCE_FONT_PX).round() as u32).max(1);
    let line_height_px = (base_font_px as f64 * LINE_HEIGHT_FACTOR).round() as u32;
    let box_width_px = (dims.width as f64 - margin_px * 2.0).max(0.0);

    DerivedMetrics {
        margin_px,
        base_font_px,
        stroke_px,
        line_height_px,
        box_width_px,
    }
}
