use super::{
    CaptionError, CaptionLayout, CaptionRequest, CaptionResult, CaptionSlot, CanvasDimensions,
    DerivedMetrics, DrawInstruction, FontSpec, LayoutConfig, LayoutVariant,
    PANEL_PADDING_FRACTION, ROW_COUNT, Rectangle, TextMeasurer, compute_metrics, place, wrap,
};

/// Caption rectangles for a panel layout plus the inner padding they share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelGrid {
    pub rects: Vec<Rectangle>,
    pub padding: u32,
}

impl PanelGrid {
    fn slots(&self) -> impl Iterator<Item = CaptionSlot> + '_ {
        self.rects.iter().map(|rect| CaptionSlot::Panel {
            rect: *rect,
            padding: self.padding,
        })
    }
}

fn panel_padding(w: u32, h: u32) -> u32 {
    (w.min(h) as f64 * PANEL_PADDING_FRACTION).round() as u32
}

/// Right half of the canvas split at its vertical midpoint: top-right, then bottom-right.
pub fn comparison_panels(dims: CanvasDimensions) -> PanelGrid {
    let col_w = dims.width / 2;
    let row_h = dims.height / 2;
    let right_w = dims.width - col_w;
    PanelGrid {
        rects: vec![
            Rectangle {
                x: col_w,
                y: 0,
                w: right_w,
                h: row_h,
            },
            Rectangle {
                x: col_w,
                y: row_h,
                w: right_w,
                h: dims.height - row_h,
            },
        ],
        padding: panel_padding(col_w, row_h),
    }
}

/// Right half of the canvas cut into five rows; the last row takes the
/// leftover pixels so the rows tile the full height.
pub fn multicomparison_rows(dims: CanvasDimensions) -> PanelGrid {
    let col_w = dims.width / 2;
    let right_w = dims.width - col_w;
    let row_h = dims.height / ROW_COUNT as u32;
    let rects = (0..ROW_COUNT as u32)
        .map(|idx| {
            let y = idx * row_h;
            let h = if idx + 1 == ROW_COUNT as u32 {
                dims.height - y
            } else {
                row_h
            };
            Rectangle {
                x: col_w,
                y,
                w: right_w,
                h,
            }
        })
        .collect();
    PanelGrid {
        rects,
        padding: panel_padding(right_w, row_h),
    }
}

/// Picks the five row captions for a multicomparison layout.
///
/// The ordered list wins whenever it has entries; otherwise the per-row values
/// that are set are taken in row order, skipping unset rows. Either way the
/// result is padded with empty strings or cut to exactly five entries.
pub fn resolve_rows(ordered: &[String], per_row: &[Option<String>]) -> Vec<String> {
    let mut rows: Vec<String> = if ordered.is_empty() {
        per_row.iter().flatten().cloned().collect()
    } else {
        ordered.to_vec()
    };
    rows.resize(ROW_COUNT, String::new());
    rows
}

/// Lays out `captions` for `variant` and returns the draw list.
pub fn layout(
    variant: LayoutVariant,
    captions: &[String],
    dims: CanvasDimensions,
    config: &LayoutConfig,
    measurer: &dyn TextMeasurer,
) -> CaptionResult<Vec<DrawInstruction>> {
    let (_, _, instructions) = build(variant, captions, dims, config, measurer)?;
    Ok(instructions)
}

/// Like [`layout`], but keeps the sizing and font alongside the draw list.
pub fn compose(request: &CaptionRequest<'_>) -> CaptionResult<CaptionLayout> {
    let (metrics, font, instructions) = build(
        request.layout,
        &request.captions,
        request.dims,
        &request.config,
        request.measurer,
    )?;
    let config = request.config.clamped();
    Ok(CaptionLayout {
        layout: request.layout,
        dims: request.dims,
        metrics,
        font,
        fill_color: config.fill_color,
        stroke_color: config.stroke_color,
        instructions,
    })
}

fn build(
    variant: LayoutVariant,
    captions: &[String],
    dims: CanvasDimensions,
    config: &LayoutConfig,
    measurer: &dyn TextMeasurer,
) -> CaptionResult<(DerivedMetrics, FontSpec, Vec<DrawInstruction>)> {
    dims.validate()?;
    let captions = slot_captions(variant, captions)?;

    let config = config.clamped();
    let metrics = compute_metrics(dims, &config);
    let font = FontSpec {
        family: config.font_family.clone(),
        size_px: metrics.base_font_px,
        bold: true,
    };
    let measure = |text: &str| measurer.measure(text, &font);
    let wrap_for = |caption: &str, max_width: f64| -> Vec<String> {
        wrap(
            &config.transform(caption),
            max_width,
            config.max_lines_per_box,
            &measure,
        )
    };

    let mut instructions = Vec::new();
    match variant {
        LayoutVariant::Classic => {
            let x_center = dims.width as f64 / 2.0;
            let top = wrap_for(&captions[0], metrics.box_width_px);
            instructions.extend(place(
                &top,
                CaptionSlot::Anchor {
                    x_center,
                    y_top: metrics.margin_px,
                },
                &metrics,
            ));

            let bottom = wrap_for(&captions[1], metrics.box_width_px);
            let block_height = bottom.len() as f64 * metrics.line_height_px as f64;
            instructions.extend(place(
                &bottom,
                CaptionSlot::Anchor {
                    x_center,
                    y_top: dims.height as f64 - metrics.margin_px - block_height,
                },
                &metrics,
            ));
        }
        LayoutVariant::Comparison | LayoutVariant::Multicomparison => {
            let grid = if variant == LayoutVariant::Comparison {
                comparison_panels(dims)
            } else {
                multicomparison_rows(dims)
            };
            for (slot, caption) in grid.slots().zip(captions.iter()) {
                let lines = wrap_for(caption, slot.max_width(&metrics));
                instructions.extend(place(&lines, slot, &metrics));
            }
        }
    }

    Ok((metrics, font, instructions))
}

fn slot_captions(variant: LayoutVariant, captions: &[String]) -> CaptionResult<Vec<String>> {
    match variant {
        LayoutVariant::Multicomparison => Ok(resolve_rows(captions, &[])),
        LayoutVariant::Classic | LayoutVariant::Comparison => {
            let expected = variant.slot_count();
            if captions.len() > expected {
                return Err(CaptionError::invalid_input(format!(
                    "{} layout takes at most {} captions (got {})",
                    variant,
                    expected,
                    captions.len()
                )));
            }
            let mut padded = captions.to_vec();
            padded.resize(expected, String::new());
            Ok(padded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::Paint;
    use crate::caption::testing::fixed_advance;

    fn captions(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn dims(width: u32, height: u32) -> CanvasDimensions {
        CanvasDimensions { width, height }
    }

    #[test]
    fn classic_top_caption_on_one_line() {
        let out = layout(
            LayoutVariant::Classic,
            &captions(&["hello world", ""]),
            dims(800, 600),
            &LayoutConfig::default(),
            &fixed_advance,
        )
        .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].line, "HELLO WORLD");
        assert_eq!(out[0].paint, Paint::Stroke);
        assert_eq!(out[1].paint, Paint::Fill);
        assert!(out.iter().all(|ins| ins.x == 400.0 && ins.y == 30.0));
    }

    #[test]
    fn classic_bottom_block_sits_one_margin_above_the_edge() {
        // 60px font => 10px per char, box is 740px => 74 chars per line
        let long = "word ".repeat(20);
        let out = layout(
            LayoutVariant::Classic,
            &captions(&["", &long]),
            dims(800, 600),
            &LayoutConfig::default(),
            &fixed_advance,
        )
        .unwrap();
        assert_eq!(out.len(), 4);
        // two lines of 66px: 600 - 30 - 132
        assert_eq!(out[0].y, 438.0);
        assert_eq!(out[2].y, 504.0);
    }

    #[test]
    fn uppercase_can_be_disabled() {
        let config = LayoutConfig {
            uppercase: false,
            ..LayoutConfig::default()
        };
        let out = layout(
            LayoutVariant::Classic,
            &captions(&["Mixed Case"]),
            dims(800, 600),
            &config,
            &fixed_advance,
        )
        .unwrap();
        assert_eq!(out[0].line, "Mixed Case");
    }

    #[test]
    fn comparison_rectangles_on_800x600() {
        let grid = comparison_panels(dims(800, 600));
        assert_eq!(
            grid.rects,
            vec![
                Rectangle {
                    x: 400,
                    y: 0,
                    w: 400,
                    h: 300
                },
                Rectangle {
                    x: 400,
                    y: 300,
                    w: 400,
                    h: 300
                },
            ]
        );
        assert_eq!(grid.padding, 24);
    }

    #[test]
    fn comparison_odd_dimensions_give_extra_pixel_to_right_and_bottom() {
        let grid = comparison_panels(dims(801, 601));
        assert_eq!(grid.rects[0].w, 401);
        assert_eq!(grid.rects[0].h, 300);
        assert_eq!(grid.rects[1].y, 300);
        assert_eq!(grid.rects[1].h, 301);
    }

    #[test]
    fn comparison_captions_map_to_right_panels() {
        let out = layout(
            LayoutVariant::Comparison,
            &captions(&["top", "bottom"]),
            dims(800, 600),
            &LayoutConfig::default(),
            &fixed_advance,
        )
        .unwrap();
        let fills: Vec<(&str, f64, f64)> = out
            .iter()
            .filter(|ins| !ins.is_stroke())
            .map(|ins| (ins.line.as_str(), ins.x, ins.y))
            .collect();
        assert_eq!(fills, vec![("TOP", 600.0, 117.0), ("BOTTOM", 600.0, 417.0)]);
    }

    #[test]
    fn multicomparison_rows_tile_the_right_half() {
        let canvas = dims(801, 603);
        let grid = multicomparison_rows(canvas);
        assert_eq!(grid.rects.len(), 5);
        let heights: u32 = grid.rects.iter().map(|rect| rect.h).sum();
        assert_eq!(heights, 603);
        let area: u64 = grid.rects.iter().map(Rectangle::area).sum();
        assert_eq!(area, 401 * 603);
        assert_eq!(grid.rects[4].h, 123);
        for pair in grid.rects.windows(2) {
            assert_eq!(pair[0].y + pair[0].h, pair[1].y);
        }
        // min(401, 120) * 0.08 = 9.6
        assert_eq!(grid.padding, 10);
    }

    #[test]
    fn rows_pad_short_lists() {
        assert_eq!(
            resolve_rows(&captions(&["A", "B"]), &[]),
            captions(&["A", "B", "", "", ""])
        );
    }

    #[test]
    fn rows_cut_long_lists() {
        assert_eq!(
            resolve_rows(&captions(&["1", "2", "3", "4", "5", "6", "7"]), &[]),
            captions(&["1", "2", "3", "4", "5"])
        );
    }

    #[test]
    fn rows_fall_back_to_per_row_values() {
        let per_row = [Some("A".to_string()), Some("B".to_string()), None, None, None];
        assert_eq!(resolve_rows(&[], &per_row), resolve_rows(&captions(&["A", "B"]), &[]));

        let sparse = [None, None, Some("C".to_string()), None, None];
        assert_eq!(resolve_rows(&[], &sparse), captions(&["C", "", "", "", ""]));
    }

    #[test]
    fn unset_rows_are_skipped_not_kept_as_gaps() {
        let per_row = [
            Some("A".to_string()),
            None,
            Some("C".to_string()),
            None,
            None,
        ];
        assert_eq!(resolve_rows(&[], &per_row), captions(&["A", "C", "", "", ""]));
        let blank = [Some("A".to_string()), Some(String::new()), None, None, None];
        assert_eq!(resolve_rows(&[], &blank), captions(&["A", "", "", "", ""]));
    }

    #[test]
    fn ordered_list_wins_over_per_row_values() {
        let per_row = [Some("X".to_string()), None, None, None, None];
        assert_eq!(
            resolve_rows(&captions(&["A"]), &per_row),
            captions(&["A", "", "", "", ""])
        );
    }

    #[test]
    fn empty_captions_produce_no_instructions() {
        for variant in [
            LayoutVariant::Classic,
            LayoutVariant::Comparison,
            LayoutVariant::Multicomparison,
        ] {
            let out = layout(
                variant,
                &captions(&["", "   "]),
                dims(800, 600),
                &LayoutConfig::default(),
                &fixed_advance,
            )
            .unwrap();
            assert!(out.is_empty(), "{variant} drew something");
        }
    }

    #[test]
    fn multicomparison_draws_each_row_inside_its_band() {
        let out = layout(
            LayoutVariant::Multicomparison,
            &captions(&["a", "b", "c", "d", "e"]),
            dims(1000, 1000),
            &LayoutConfig::default(),
            &fixed_advance,
        )
        .unwrap();
        let fills: Vec<&DrawInstruction> = out.iter().filter(|ins| !ins.is_stroke()).collect();
        assert_eq!(fills.len(), 5);
        for (idx, ins) in fills.iter().enumerate() {
            let band_top = idx as f64 * 200.0;
            assert_eq!(ins.x, 750.0);
            assert!(ins.y >= band_top && ins.y < band_top + 200.0);
        }
    }

    #[test]
    fn too_many_captions_for_two_slot_layouts_is_an_error() {
        let err = layout(
            LayoutVariant::Comparison,
            &captions(&["a", "b", "c"]),
            dims(800, 600),
            &LayoutConfig::default(),
            &fixed_advance,
        )
        .unwrap_err();
        assert!(matches!(err, CaptionError::InvalidLayoutInput(_)));
    }

    #[test]
    fn zero_sized_canvas_is_an_error() {
        let err = layout(
            LayoutVariant::Classic,
            &captions(&["a"]),
            dims(0, 600),
            &LayoutConfig::default(),
            &fixed_advance,
        )
        .unwrap_err();
        assert!(matches!(err, CaptionError::InvalidLayoutInput(_)));
    }

    #[test]
    fn compose_reports_metrics_and_font() {
        let request = CaptionRequest {
            dims: dims(800, 600),
            layout: LayoutVariant::Classic,
            captions: captions(&["top", "bottom"]),
            config: LayoutConfig::default(),
            measurer: &fixed_advance,
        };
        let composed = compose(&request).unwrap();
        assert_eq!(composed.metrics.base_font_px, 60);
        assert_eq!(composed.font.size_px, 60);
        assert!(composed.font.bold);
        assert_eq!(composed.instructions.len(), 4);
    }
}
