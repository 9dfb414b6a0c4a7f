use crate::error::LayoutError;
use crate::models::{DisplayItem, GalleryItem, RowClosure, RowModel};

/// Configuration for the justified row layout algorithm.
///
/// Items are placed left-to-right at the target height with widths following
/// their source aspect ratios. A row that overflows the target width is
/// resolved by a best-fit decision (keep or push back the crossing item) and
/// then uniformly rescaled so its total rendered width lands exactly on
/// `row_width`. The final row is emitted without rescale.
#[derive(Debug, Clone)]
pub struct JustifiedLayout {
    /// Target width of each completed row in pixels.
    pub row_width: f32,
    /// Preferred item height before any row rescale, in pixels (default: 220).
    pub target_height: f32,
    /// Horizontal spacing accounted per item in pixels (default: 0).
    pub item_spacing: f32,
}

impl Default for JustifiedLayout {
    fn default() -> Self {
        Self {
            row_width: 1280.0,
            target_height: 220.0,
            item_spacing: 0.0,
        }
    }
}

/// Outcome of placing one item into the open row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Row still has room; keep accumulating.
    Open,
    /// Accumulated width landed exactly on the target.
    ExactFill,
    /// Target width was crossed and the crossing item stays in this row.
    OverflowKeep,
    /// Target width was crossed and the crossing item moves to the next row.
    OverflowPushBack,
}

/// Minimal per-row record from which a layout can be reconstructed without
/// re-running the packing pass. Used by the layout cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RowBreak {
    /// Start index in the items slice (inclusive).
    pub start_index: usize,
    /// End index in the items slice (exclusive).
    pub end_index: usize,
    /// How the row closed; decides whether reconstruction rescales it.
    pub closure: RowClosure,
}

impl JustifiedLayout {
    /// Creates a new layout with custom parameters.
    pub fn new(row_width: f32, target_height: f32, item_spacing: f32) -> Self {
        Self {
            row_width,
            target_height,
            item_spacing,
        }
    }

    /// Computes display dimensions for every item.
    ///
    /// # Algorithm
    /// 1. Stream items left-to-right at the target height, width following
    ///    each item's aspect ratio.
    /// 2. A row whose accumulated width lands exactly on `row_width` closes
    ///    unchanged.
    /// 3. A row that crosses `row_width` closes on whichever side of the
    ///    target is nearer: the crossing item is kept, or pushed back to open
    ///    the next row. Either way the closed row is uniformly rescaled so it
    ///    spans `row_width` exactly.
    /// 4. The final row is emitted as-is and may be under- or over-filled.
    ///
    /// # Returns
    /// The flattened concatenation of all rows, one record per input item, in
    /// input order. Row boundaries are not exposed; consumers that need the
    /// grouping re-derive it from cumulative widths.
    pub fn build_rows(&self, items: &[GalleryItem]) -> Result<Vec<DisplayItem>, LayoutError> {
        let rows = self.compute_rows(items)?;
        let mut flat = Vec::with_capacity(items.len());
        for row in rows {
            flat.extend(row.items);
        }
        Ok(flat)
    }

    /// Total vertical extent of the laid-out gallery, for scroll sizing.
    pub fn total_height(&self, items: &[GalleryItem], row_gap: f32) -> Result<f32, LayoutError> {
        let rows = self.compute_rows(items)?;
        if rows.is_empty() {
            return Ok(0.0);
        }
        let heights_sum: f32 = rows.iter().map(|r| r.height_px()).sum();
        let gaps_sum = (rows.len() - 1) as f32 * row_gap;
        Ok(heights_sum + gaps_sum)
    }

    /// Row-structured layout. Internal: the public result is flat.
    pub(crate) fn compute_rows(&self, items: &[GalleryItem]) -> Result<Vec<RowModel>, LayoutError> {
        self.validate()?;
        let ratios = self.item_ratios(items)?;

        let mut rows: Vec<RowModel> = Vec::new();
        let mut current: Vec<DisplayItem> = Vec::new();
        let mut remaining = self.row_width;

        // Explicit integer cursor: the push-back branch leaves it in place so
        // the popped item is re-processed as the first item of the next row.
        let mut cursor = 0usize;
        while cursor < ratios.len() {
            let desired_width = self.target_height * ratios[cursor];
            remaining -= desired_width + self.item_spacing;
            current.push(DisplayItem {
                index: cursor,
                width: desired_width,
                height: self.target_height,
            });

            let placement = self.classify(remaining, &current);
            let is_last = cursor + 1 == ratios.len();

            match (placement, is_last) {
                (Placement::Open, false) => {
                    cursor += 1;
                }
                (Placement::Open, true) => {
                    // End of input with a partially filled row: flush it
                    // unrescaled.
                    Self::close_row(&mut rows, &mut current, RowClosure::Trailing);
                    cursor += 1;
                }
                (Placement::ExactFill, _) => {
                    // An exactly filled row leaves nothing behind, so the
                    // trailing flush has no work even on the last item.
                    Self::close_row(&mut rows, &mut current, RowClosure::Exact);
                    remaining = self.row_width;
                    cursor += 1;
                }
                (Placement::OverflowKeep, _) => {
                    // Same on the last item: the row empties here and the
                    // trailing flush is skipped rather than emitting an empty
                    // row.
                    let factor = self.scale_factor(&current);
                    self.rescale_row(&mut current, factor);
                    Self::close_row(&mut rows, &mut current, RowClosure::Rescaled);
                    remaining = self.row_width;
                    cursor += 1;
                }
                (Placement::OverflowPushBack, _) => {
                    // The cursor stays put; the trailing check runs against
                    // the re-processed item on the next iteration.
                    current.pop();
                    let factor = self.scale_factor(&current);
                    self.rescale_row(&mut current, factor);
                    Self::close_row(&mut rows, &mut current, RowClosure::Rescaled);
                    remaining = self.row_width;
                }
            }
        }

        Ok(rows)
    }

    /// Layout reduced to row breaks, for cache storage.
    pub(crate) fn compute_breaks(
        &self,
        items: &[GalleryItem],
    ) -> Result<Vec<RowBreak>, LayoutError> {
        let rows = self.compute_rows(items)?;
        let mut start = 0usize;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let end = start + row.items.len();
            out.push(RowBreak {
                start_index: start,
                end_index: end,
                closure: row.closure,
            });
            start = end;
        }
        Ok(out)
    }

    /// Reconstructs rows from cached breaks without re-running the packing
    /// pass. Breaks must partition `items` in order; the cache revalidates
    /// the item count before calling this.
    pub(crate) fn rows_from_breaks(
        &self,
        items: &[GalleryItem],
        breaks: &[RowBreak],
    ) -> Result<Vec<RowModel>, LayoutError> {
        self.validate()?;
        let ratios = self.item_ratios(items)?;

        let mut rows = Vec::with_capacity(breaks.len());
        for (row_idx, brk) in breaks.iter().enumerate() {
            let mut row: Vec<DisplayItem> = ratios[brk.start_index..brk.end_index]
                .iter()
                .enumerate()
                .map(|(offset, ratio)| DisplayItem {
                    index: brk.start_index + offset,
                    width: self.target_height * ratio,
                    height: self.target_height,
                })
                .collect();

            if brk.closure == RowClosure::Rescaled {
                let factor = self.scale_factor(&row);
                self.rescale_row(&mut row, factor);
            }

            rows.push(RowModel::new(row_idx as u32, brk.closure, row));
        }

        Ok(rows)
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if !self.row_width.is_finite() || self.row_width <= 0.0 {
            return Err(LayoutError::Configuration(format!(
                "row_width must be a positive number, got {}",
                self.row_width
            )));
        }
        if !self.target_height.is_finite() || self.target_height <= 0.0 {
            return Err(LayoutError::Configuration(format!(
                "target_height must be a positive number, got {}",
                self.target_height
            )));
        }
        if !self.item_spacing.is_finite() || self.item_spacing < 0.0 {
            return Err(LayoutError::Configuration(format!(
                "item_spacing must be non-negative, got {}",
                self.item_spacing
            )));
        }
        Ok(())
    }

    /// Resolves and checks every item's aspect ratio up front, so an invalid
    /// item aborts the layout before any row is built.
    fn item_ratios(&self, items: &[GalleryItem]) -> Result<Vec<f32>, LayoutError> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let aspect_ratio = item.aspect_ratio();
                if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
                    return Err(LayoutError::InvalidItem {
                        index,
                        aspect_ratio,
                    });
                }
                Ok(aspect_ratio)
            })
            .collect()
    }

    fn classify(&self, remaining: f32, current: &[DisplayItem]) -> Placement {
        if remaining == 0.0 {
            return Placement::ExactFill;
        }
        if remaining > 0.0 {
            return Placement::Open;
        }
        // A lone item cannot be pushed back: it would re-open the next row
        // and overflow it the same way. Keep it and rescale down.
        if current.len() == 1 {
            return Placement::OverflowKeep;
        }
        let keep_width = self.row_width_of(current, false);
        let drop_width = self.row_width_of(current, true);
        if (keep_width - self.row_width) < (self.row_width - drop_width) {
            Placement::OverflowKeep
        } else {
            Placement::OverflowPushBack
        }
    }

    /// Total rendered width of the row, spacing included. With `exclude_last`
    /// the width is evaluated as if the most recently added item were moved
    /// out to the next row.
    fn row_width_of(&self, row: &[DisplayItem], exclude_last: bool) -> f32 {
        let count = if exclude_last {
            row.len().saturating_sub(1)
        } else {
            row.len()
        };
        let widths_sum: f32 = row[..count].iter().map(|item| item.width).sum();
        widths_sum + count as f32 * self.item_spacing
    }

    /// Uniform multiplier that brings the row's total width to `row_width`.
    /// Spacing does not scale, so it is removed from both sides first.
    fn scale_factor(&self, row: &[DisplayItem]) -> f32 {
        let current_width = self.row_width_of(row, false);
        let total_spacing = row.len() as f32 * self.item_spacing;
        (self.row_width - total_spacing) / (current_width - total_spacing)
    }

    /// Applies the scale factor to every item in the row. Width and height
    /// scale together, so each item keeps its aspect ratio.
    fn rescale_row(&self, row: &mut [DisplayItem], factor: f32) {
        let actual_height = self.target_height * factor;
        for item in row.iter_mut() {
            item.width *= factor;
            item.height = actual_height;
        }
    }

    fn close_row(rows: &mut Vec<RowModel>, current: &mut Vec<DisplayItem>, closure: RowClosure) {
        let row_index = rows.len() as u32;
        rows.push(RowModel::new(row_index, closure, std::mem::take(current)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> GalleryItem {
        GalleryItem::new(1000.0, 1000.0)
    }

    fn squares(n: usize) -> Vec<GalleryItem> {
        vec![square(); n]
    }

    fn assert_row_justified(layout: &JustifiedLayout, row: &RowModel) {
        let widths_sum: f32 = row.items.iter().map(|item| item.width).sum();
        let total = widths_sum + row.items.len() as f32 * layout.item_spacing;
        assert!(
            (total - layout.row_width).abs() <= layout.row_width * 1e-5,
            "row {} spans {} instead of {}",
            row.row_index,
            total,
            layout.row_width
        );
    }

    #[test]
    fn test_empty_items() {
        let layout = JustifiedLayout::default();
        let flat = layout.build_rows(&[]).unwrap();
        assert!(flat.is_empty());
    }

    #[test]
    fn test_exact_fit_rows() {
        // Three squares fill the row exactly; the fourth lands alone in an
        // unrescaled trailing row.
        let layout = JustifiedLayout::new(30.0, 10.0, 0.0);
        let flat = layout.build_rows(&squares(4)).unwrap();

        assert_eq!(flat.len(), 4);
        for (i, item) in flat.iter().enumerate() {
            assert_eq!(item.index, i);
            assert!((item.width - 10.0).abs() < 0.01);
            assert!((item.height - 10.0).abs() < 0.01);
        }

        let rows = layout.compute_rows(&squares(4)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].closure, RowClosure::Exact);
        assert_eq!(rows[0].items.len(), 3);
        assert_eq!(rows[1].closure, RowClosure::Trailing);
        assert_eq!(rows[1].items.len(), 1);
    }

    #[test]
    fn test_overflow_pushes_back_last_and_rescales() {
        // Third square overflows 25px; keeping it (30) and dropping it (20)
        // are equally far from the target, which resolves to dropping. The
        // first two squares scale up to 12.5 and the third re-runs as the
        // trailing row.
        let layout = JustifiedLayout::new(25.0, 10.0, 0.0);
        let flat = layout.build_rows(&squares(3)).unwrap();

        assert_eq!(flat.len(), 3);
        assert!((flat[0].width - 12.5).abs() < 0.01);
        assert!((flat[0].height - 12.5).abs() < 0.01);
        assert!((flat[1].width - 12.5).abs() < 0.01);
        assert!((flat[2].width - 10.0).abs() < 0.01);
        assert!((flat[2].height - 10.0).abs() < 0.01);

        let rows = layout.compute_rows(&squares(3)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].closure, RowClosure::Rescaled);
        assert_row_justified(&layout, &rows[0]);
        assert_eq!(rows[1].closure, RowClosure::Trailing);
    }

    #[test]
    fn test_overflow_keeps_last_when_closer() {
        // Widths 10 + 10 + 6 overflow by 1; dropping the third would leave
        // the row 5 short, so it stays and the row scales down by 25/26.
        let items = [square(), square(), GalleryItem::from_aspect_ratio(0.6)];
        let layout = JustifiedLayout::new(25.0, 10.0, 0.0);
        let rows = layout.compute_rows(&items).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].closure, RowClosure::Rescaled);
        assert_eq!(rows[0].items.len(), 3);
        assert_row_justified(&layout, &rows[0]);

        let factor = 25.0 / 26.0;
        assert!((rows[0].items[0].width - 10.0 * factor).abs() < 0.01);
        assert!((rows[0].items[2].width - 6.0 * factor).abs() < 0.01);
        assert!((rows[0].height_px() - 10.0 * factor).abs() < 0.01);
    }

    #[test]
    fn test_overflow_on_final_item_kept_emits_no_empty_row() {
        // The second item overflows and wins the best-fit check, so the whole
        // input closes as one rescaled row and no trailing row follows.
        let items = [square(), GalleryItem::from_aspect_ratio(1.6)];
        let layout = JustifiedLayout::new(25.0, 10.0, 0.0);
        let rows = layout.compute_rows(&items).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].closure, RowClosure::Rescaled);
        assert_eq!(rows[0].items.len(), 2);
        assert_row_justified(&layout, &rows[0]);

        let flat = layout.build_rows(&items).unwrap();
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_overflow_on_final_item_pushed_back_becomes_trailing() {
        // Same shape as the push-back case above, asserting specifically that
        // the item popped on the final step is not lost: it re-runs and
        // flushes as the trailing row.
        let layout = JustifiedLayout::new(25.0, 10.0, 0.0);
        let flat = layout.build_rows(&squares(3)).unwrap();

        assert_eq!(flat.len(), 3);
        let indices: Vec<usize> = flat.iter().map(|item| item.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_single_item_wider_than_row_is_kept() {
        // A 6:1 panorama at height 10 is 60px wide against a 25px row. It
        // cannot be pushed back (there is no next item taking its place in
        // this row), so it scales down to span the row alone.
        let items = [GalleryItem::from_aspect_ratio(6.0)];
        let layout = JustifiedLayout::new(25.0, 10.0, 0.0);
        let rows = layout.compute_rows(&items).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].closure, RowClosure::Rescaled);
        assert!((rows[0].items[0].width - 25.0).abs() < 0.01);
        assert!((rows[0].height_px() - 25.0 / 6.0).abs() < 0.01);
    }

    #[test]
    fn test_spacing_counts_toward_row_width() {
        // 3 squares at width 10 with 2px spacing overflow a 34px row by 2;
        // keeping the third is nearer. Spacing does not scale, so the factor
        // is (34 - 6) / (36 - 6).
        let layout = JustifiedLayout::new(34.0, 10.0, 2.0);
        let rows = layout.compute_rows(&squares(3)).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].closure, RowClosure::Rescaled);
        assert_row_justified(&layout, &rows[0]);

        let factor = 28.0 / 30.0;
        for item in &rows[0].items {
            assert!((item.width - 10.0 * factor).abs() < 0.01);
            assert!((item.height - 10.0 * factor).abs() < 0.01);
        }
    }

    #[test]
    fn test_mixed_ratios_cover_all_items_in_order() {
        let items = vec![
            GalleryItem::new(1920.0, 1080.0),
            GalleryItem::new(1000.0, 1000.0),
            GalleryItem::new(1080.0, 1920.0),
            GalleryItem::new(2560.0, 1080.0),
            GalleryItem::unknown(),
            GalleryItem::new(3000.0, 2000.0),
            GalleryItem::new(800.0, 1200.0),
            GalleryItem::new(1600.0, 900.0),
        ];
        let layout = JustifiedLayout::new(600.0, 180.0, 4.0);
        let flat = layout.build_rows(&items).unwrap();

        assert_eq!(flat.len(), items.len());
        for (i, item) in flat.iter().enumerate() {
            assert_eq!(item.index, i);
            assert!(item.width > 0.0);
            assert!(item.height > 0.0);
        }

        // Every closed row except the trailing one spans the target width,
        // and rescaling preserves each item's aspect ratio.
        let rows = layout.compute_rows(&items).unwrap();
        for row in &rows[..rows.len() - 1] {
            assert_row_justified(&layout, row);
        }
        assert_eq!(rows.last().unwrap().closure, RowClosure::Trailing);

        for (item, source) in flat.iter().zip(items.iter()) {
            let ratio = item.width / item.height;
            assert!(
                (ratio - source.aspect_ratio()).abs() < 1e-3,
                "item {} ratio drifted: {} vs {}",
                item.index,
                ratio,
                source.aspect_ratio()
            );
        }
    }

    #[test]
    fn test_unknown_dimensions_lay_out_as_squares() {
        let layout = JustifiedLayout::new(30.0, 10.0, 0.0);
        let flat = layout.build_rows(&[GalleryItem::unknown()]).unwrap();
        assert_eq!(flat.len(), 1);
        assert!((flat[0].width - 10.0).abs() < 0.01);
        assert!((flat[0].height - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let items = squares(2);

        let zero_width = JustifiedLayout::new(0.0, 10.0, 0.0);
        assert!(matches!(
            zero_width.build_rows(&items),
            Err(LayoutError::Configuration(_))
        ));

        let negative_height = JustifiedLayout::new(100.0, -10.0, 0.0);
        assert!(matches!(
            negative_height.build_rows(&items),
            Err(LayoutError::Configuration(_))
        ));

        let negative_spacing = JustifiedLayout::new(100.0, 10.0, -1.0);
        assert!(matches!(
            negative_spacing.build_rows(&items),
            Err(LayoutError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_item_rejected_without_partial_output() {
        let layout = JustifiedLayout::new(30.0, 10.0, 0.0);
        let items = [square(), GalleryItem::from_aspect_ratio(-2.0), square()];

        match layout.build_rows(&items) {
            Err(LayoutError::InvalidItem {
                index,
                aspect_ratio,
            }) => {
                assert_eq!(index, 1);
                assert!((aspect_ratio + 2.0).abs() < 1e-6);
            }
            other => panic!("expected InvalidItem, got {:?}", other),
        }

        // Non-finite ratios are rejected the same way.
        let items = [GalleryItem::new(f32::MAX, f32::MIN_POSITIVE)];
        assert!(matches!(
            layout.build_rows(&items),
            Err(LayoutError::InvalidItem { index: 0, .. })
        ));
    }

    #[test]
    fn test_exact_row_is_not_rescaled() {
        // The exact-fill path must leave widths untouched rather than apply a
        // factor-1 rescale.
        let layout = JustifiedLayout::new(30.0, 10.0, 0.0);
        let rows = layout.compute_rows(&squares(3)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].closure, RowClosure::Exact);
        for item in &rows[0].items {
            assert_eq!(item.width, 10.0);
            assert_eq!(item.height, 10.0);
        }
    }

    #[test]
    fn test_rows_from_breaks_matches_compute() {
        let items = vec![
            GalleryItem::new(1920.0, 1080.0),
            GalleryItem::new(1000.0, 1000.0),
            GalleryItem::new(1080.0, 1920.0),
            GalleryItem::new(2560.0, 1080.0),
            GalleryItem::new(1600.0, 900.0),
            GalleryItem::unknown(),
        ];
        let layout = JustifiedLayout::new(500.0, 150.0, 3.0);

        let direct = layout.compute_rows(&items).unwrap();
        let breaks = layout.compute_breaks(&items).unwrap();
        let rebuilt = layout.rows_from_breaks(&items, &breaks).unwrap();

        assert_eq!(direct.len(), rebuilt.len());
        for (a, b) in direct.iter().zip(rebuilt.iter()) {
            assert_eq!(a.closure, b.closure);
            assert_eq!(a.items.len(), b.items.len());
            for (x, y) in a.items.iter().zip(b.items.iter()) {
                assert_eq!(x.index, y.index);
                assert!((x.width - y.width).abs() < 0.01);
                assert!((x.height - y.height).abs() < 0.01);
            }
        }
    }

    #[test]
    fn test_total_height() {
        let layout = JustifiedLayout::new(30.0, 10.0, 0.0);
        // Two rows of height 10 with a 5px gap between them.
        let total = layout.total_height(&squares(4), 5.0).unwrap();
        assert!((total - 25.0).abs() < 0.01);

        assert_eq!(layout.total_height(&[], 5.0).unwrap(), 0.0);
    }
}
