use log::debug;

use crate::geometry::Rect;
use crate::ocr::RecognizedSymbol;
use crate::pool::{AxisDigits, AXIS_LEN};

/// Direction along which labels are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Column labels, ordered left to right
    X,
    /// Row labels, ordered top to bottom
    Y,
}

/// Single-digit symbols at or above `min_confidence`, in input order.
pub fn confident_digits(
    symbols: &[RecognizedSymbol],
    min_confidence: f32,
) -> impl Iterator<Item = (u8, &RecognizedSymbol)> {
    symbols
        .iter()
        .filter(move |s| s.confidence >= min_confidence)
        .filter_map(|s| s.digit().map(|d| (d, s)))
}

/// Ordinal slot of a position along an axis span, or None outside the span.
pub fn bucket_index(center: f32, axis_start: f32, axis_size: f32) -> Option<usize> {
    if axis_size <= 0.0 {
        return None;
    }
    let bucket = (((center - axis_start) / axis_size) * AXIS_LEN as f32).floor();
    if bucket < 0.0 || bucket >= AXIS_LEN as f32 {
        return None;
    }
    Some(bucket as usize)
}

/// Buckets edge symbols into the ten ordinal slots of `grid_rect` along
/// `axis`. Symbols must already be in the same coordinate space as
/// `grid_rect`.
///
/// When two symbols land in one slot the strictly more confident one wins;
/// on an exact tie the one seen first stays. Slots nobody lands in stay
/// unknown, so an unreadable strip comes back as ten unknowns.
pub fn resolve_axis(
    symbols: &[RecognizedSymbol],
    axis: Axis,
    grid_rect: &Rect,
    min_confidence: f32,
) -> AxisDigits {
    let (axis_start, axis_size) = match axis {
        Axis::X => (grid_rect.x, grid_rect.w),
        Axis::Y => (grid_rect.y, grid_rect.h),
    };

    let mut best: [Option<(u8, f32)>; AXIS_LEN] = [None; AXIS_LEN];

    for (digit, symbol) in confident_digits(symbols, min_confidence) {
        let (cx, cy) = symbol.bbox.center();
        let center = match axis {
            Axis::X => cx,
            Axis::Y => cy,
        };

        let Some(index) = bucket_index(center, axis_start, axis_size) else {
            continue;
        };

        match best[index] {
            Some((_, conf)) if symbol.confidence <= conf => {}
            _ => best[index] = Some((digit, symbol.confidence)),
        }
    }

    let digits = best
        .iter()
        .enumerate()
        .fold(AxisDigits::unknown(), |acc, (i, slot)| acc.with_digit(i, slot.map(|(d, _)| d)));

    debug!(
        "Resolved {:?} axis from {} symbol(s): [{}]",
        axis,
        symbols.len(),
        digits
    );

    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    fn sym(text: &str, confidence: f32, cx: f32, cy: f32) -> RecognizedSymbol {
        RecognizedSymbol {
            text: text.to_string(),
            confidence,
            bbox: BBox::new(cx - 4.0, cy - 6.0, cx + 4.0, cy + 6.0),
        }
    }

    /// Grid from x=100..600, y=200..907 (cells 50 wide, 70.7 tall).
    fn grid() -> Rect {
        Rect::new(100.0, 200.0, 500.0, 707.0)
    }

    #[test]
    fn test_buckets_columns_by_center() {
        let digits = [7, 2, 9, 0, 4, 1, 8, 3, 6, 5];
        let symbols: Vec<RecognizedSymbol> = digits
            .iter()
            .enumerate()
            .map(|(i, d)| sym(&d.to_string(), 90.0, 125.0 + 50.0 * i as f32, 180.0))
            .collect();

        let resolved = resolve_axis(&symbols, Axis::X, &grid(), 40.0);
        assert_eq!(resolved, AxisDigits::from_digits(digits));
    }

    #[test]
    fn test_buckets_rows_by_vertical_center() {
        let symbols = vec![sym("3", 80.0, 80.0, 235.0), sym("8", 80.0, 80.0, 870.0)];

        let resolved = resolve_axis(&symbols, Axis::Y, &grid(), 40.0);
        assert_eq!(resolved.get(0), Some(3));
        assert_eq!(resolved.get(9), Some(8));
        assert_eq!(resolved.known_count(), 2);
    }

    #[test]
    fn test_low_confidence_and_multi_char_discarded() {
        let symbols = vec![
            sym("5", 39.9, 125.0, 180.0),
            sym("12", 95.0, 175.0, 180.0),
            sym("", 95.0, 225.0, 180.0),
            sym("6", 40.0, 275.0, 180.0),
        ];

        let resolved = resolve_axis(&symbols, Axis::X, &grid(), 40.0);
        assert_eq!(resolved.get(0), None);
        assert_eq!(resolved.get(1), None);
        assert_eq!(resolved.get(2), None);
        assert_eq!(resolved.get(3), Some(6));
    }

    #[test]
    fn test_symbols_outside_span_discarded() {
        let symbols = vec![sym("1", 90.0, 90.0, 180.0), sym("2", 90.0, 605.0, 180.0)];
        assert!(resolve_axis(&symbols, Axis::X, &grid(), 40.0).is_empty());
    }

    #[test]
    fn test_higher_confidence_wins_slot() {
        let symbols = vec![sym("1", 60.0, 120.0, 180.0), sym("7", 85.0, 130.0, 180.0)];
        assert_eq!(resolve_axis(&symbols, Axis::X, &grid(), 40.0).get(0), Some(7));
    }

    #[test]
    fn test_exact_tie_keeps_first_seen() {
        let symbols = vec![sym("1", 70.0, 120.0, 180.0), sym("7", 70.0, 130.0, 180.0)];
        let first = resolve_axis(&symbols, Axis::X, &grid(), 40.0);
        assert_eq!(first.get(0), Some(1));
        // Same order, same answer
        assert_eq!(resolve_axis(&symbols, Axis::X, &grid(), 40.0), first);
    }

    #[test]
    fn test_zero_extent_grid_yields_unknowns() {
        let symbols = vec![sym("4", 90.0, 100.0, 180.0)];
        let flat = Rect::new(100.0, 200.0, 0.0, 707.0);
        assert!(resolve_axis(&symbols, Axis::X, &flat, 40.0).is_empty());
    }

    #[test]
    fn test_every_resolved_slot_matches_its_bucket() {
        let symbols: Vec<RecognizedSymbol> = (0..40)
            .map(|i| {
                let cx = 90.0 + 13.7 * i as f32;
                sym(&(i % 10).to_string(), 40.0 + (i * 7 % 60) as f32, cx, 180.0)
            })
            .collect();
        let g = grid();

        let resolved = resolve_axis(&symbols, Axis::X, &g, 40.0);
        for (slot, value) in resolved.slots().iter().enumerate() {
            if let Some(d) = value {
                assert!(symbols.iter().any(|s| {
                    s.digit() == Some(*d) && bucket_index(s.bbox.center().0, g.x, g.w) == Some(slot)
                }));
            }
        }
    }
}
