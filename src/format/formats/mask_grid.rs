//! Dense mask grid format.
//!
//! One text file per image holding `height` rows of `width` space-separated
//! non-negative integers. `0` is unlabeled; `n` is the class at registry
//! index `n - 1`.

use ndarray::Array2;

use crate::format::error::FormatError;
use crate::format::traits::{
    Decoded, Encoded, FormatWarning, LabelContext, LabelFormat, WarningKind,
};
use crate::mask::MaskGrid;
use crate::model::ImageBounds;

/// Whitespace-separated integer grid.
///
/// Any grid that cannot be read cell for cell, or whose size differs from
/// the image, is replaced by an all-unlabeled grid and reported as a warning.
pub struct MaskGridFormat;

impl LabelFormat for MaskGridFormat {
    type Labels = MaskGrid;

    fn id(&self) -> &'static str {
        "mask"
    }

    fn display_name(&self) -> &'static str {
        "Mask grid (TXT)"
    }

    fn encode(&self, labels: &MaskGrid, ctx: &mut LabelContext<'_>) -> Result<Encoded, FormatError> {
        if labels.bounds() != ctx.bounds {
            return Err(FormatError::InvalidDimensions {
                width: labels.bounds().width,
                height: labels.bounds().height,
            });
        }

        let mut text = String::with_capacity(labels.width() * labels.height() * 2);
        for row in labels.cells().rows() {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            text.push_str(&line.join(" "));
            text.push('\n');
        }

        Ok(Encoded {
            text,
            records: labels.height(),
            dropped: 0,
        })
    }

    fn decode(&self, text: &str, ctx: &mut LabelContext<'_>) -> Decoded<MaskGrid> {
        let bounds = ctx.bounds;

        let rows = match parse_rows(text) {
            Ok(rows) => rows,
            Err(warning) => {
                return Decoded {
                    labels: MaskGrid::new(bounds),
                    warnings: vec![warning],
                };
            }
        };

        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width != bounds.width as usize || height != bounds.height as usize {
            let warning = FormatWarning::new(
                WarningKind::DimensionMismatch,
                format!(
                    "mask is {}x{} but image is {}x{}; starting blank",
                    width, height, bounds.width, bounds.height
                ),
            );
            return Decoded {
                labels: MaskGrid::new(bounds),
                warnings: vec![warning],
            };
        }

        let cells: Vec<u32> = rows.into_iter().flatten().collect();
        match Array2::from_shape_vec((height, width), cells) {
            Ok(cells) => Decoded::clean(MaskGrid::from_array(cells)),
            Err(e) => Decoded {
                labels: MaskGrid::new(bounds),
                warnings: vec![FormatWarning::new(WarningKind::MalformedGrid, e.to_string())],
            },
        }
    }

    fn empty(&self, bounds: ImageBounds) -> MaskGrid {
        MaskGrid::new(bounds)
    }
}

/// Split text into rows of cell values, skipping blank lines.
fn parse_rows(text: &str) -> Result<Vec<Vec<u32>>, FormatWarning> {
    let mut rows: Vec<Vec<u32>> = Vec::new();

    for (line_no, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l.trim())) {
        if line.is_empty() {
            continue;
        }

        let row = line
            .split_whitespace()
            .map(parse_cell)
            .collect::<Option<Vec<u32>>>()
            .ok_or_else(|| {
                FormatWarning::new(WarningKind::MalformedGrid, "cell is not a non-negative integer")
                    .at_line(line_no)
            })?;

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(FormatWarning::new(
                    WarningKind::MalformedGrid,
                    format!("row has {} cells, expected {}", row.len(), first.len()),
                )
                .at_line(line_no));
            }
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Parse one cell. Integral floats such as `2.0` are accepted.
fn parse_cell(token: &str) -> Option<u32> {
    if let Ok(value) = token.parse::<u32>() {
        return Some(value);
    }
    let value: f64 = token.parse().ok()?;
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX))
        .then_some(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("3"), Some(3));
        assert_eq!(parse_cell("2.0"), Some(2));
        assert_eq!(parse_cell("2.5"), None);
        assert_eq!(parse_cell("-1"), None);
        assert_eq!(parse_cell("x"), None);
    }

    #[test]
    fn test_parse_rows_skips_blank_lines() {
        let rows = parse_rows("0 1\n\n2 0\n").unwrap();
        assert_eq!(rows, vec![vec![0, 1], vec![2, 0]]);
    }

    #[test]
    fn test_parse_rows_rejects_ragged() {
        let warning = parse_rows("0 1\n2\n").unwrap_err();
        assert_eq!(warning.kind, WarningKind::MalformedGrid);
        assert_eq!(warning.line, Some(2));
    }
}
