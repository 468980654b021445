// Charts of the discrepancies, drawn as SVG files.

use std::error::Error;
use std::path::Path;

use cons_relation::summary::histogram;
use cons_relation::{BinLayout, RelationRow};
use log::debug;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::recon::*;

/// Title and axis descriptions of a chart.
pub struct ChartText {
    pub title: &'static str,
    pub x_desc: &'static str,
    pub y_desc: &'static str,
}

pub const MP_PARTY_DIFF_TEXT: ChartText = ChartText {
    title: "Distribution of MP-Party Vote Difference by Constituency",
    x_desc: "MP-Party Difference",
    y_desc: "Count of Constituencies",
};

pub const ERROR_PER_STATION_TEXT: ChartText = ChartText {
    title: "Distribution of MP-Party Error Per Station by Constituency",
    x_desc: "MP-Party Error Per Station",
    y_desc: "Count of Constituencies",
};

const INTEREST_BARS_TEXT: ChartText = ChartText {
    title: "MP-Party Difference by Constituency (|error/station| > 3, sorted max to min)",
    x_desc: "Constituency ID",
    y_desc: "MP-Party Difference",
};

/// Draws the histogram of `values` with the given bins. Each non-empty bin
/// is labelled with its count.
pub fn draw_histogram(
    path: &Path,
    values: &[f64],
    layout: &BinLayout,
    text: &ChartText,
) -> ReconResult<()> {
    let counts = histogram(values, layout);
    debug!(
        "draw_histogram: {} values, {} in range",
        values.len(),
        counts.iter().sum::<u64>()
    );
    render_histogram(path, &counts, &layout.edges(), text).map_err(|e| {
        DrawingChartSnafu {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .build()
    })
}

/// Draws one bar per constituency, in the given order, labelled by `cons_id`.
pub fn draw_interest_bars(path: &Path, rows: &[RelationRow]) -> ReconResult<()> {
    let bars: Vec<(String, i64)> = rows
        .iter()
        .filter_map(|r| {
            r.mp_party_diff.map(|d| {
                let label = r
                    .cons_id
                    .as_ref()
                    .map(|k| k.to_string())
                    .unwrap_or_default();
                (label, d)
            })
        })
        .collect();
    render_bars(path, &bars, &INTEREST_BARS_TEXT).map_err(|e| {
        DrawingChartSnafu {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .build()
    })
}

fn label_style(v_pos: VPos) -> TextStyle<'static> {
    TextStyle::from(("sans-serif", 10.0).into_font()).pos(Pos::new(HPos::Center, v_pos))
}

fn render_histogram(
    path: &Path,
    counts: &[u64],
    edges: &[f64],
    text: &ChartText,
) -> Result<(), Box<dyn Error>> {
    let (x_min, x_max) = match (edges.first(), edges.last()) {
        (Some(a), Some(b)) if a < b => (*a, *b),
        _ => return Err(format!("invalid bin edges {:?}", edges).into()),
    };
    let y_max = counts.iter().copied().max().unwrap_or(0);
    // Room above the tallest bar for its label.
    let y_top = (y_max + y_max / 10 + 1) as f64;

    let root = SVGBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(text.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0f64..y_top)?;
    chart
        .configure_mesh()
        .x_desc(text.x_desc)
        .y_desc(text.y_desc)
        .draw()?;

    let filled = || {
        counts
            .iter()
            .zip(edges.windows(2))
            .filter(|(c, _)| **c > 0)
            .map(|(c, w)| (*c as f64, w[0], w[1]))
    };
    chart.draw_series(
        filled().map(|(c, lo, hi)| Rectangle::new([(lo, 0.0), (hi, c)], BLUE.mix(0.7).filled())),
    )?;
    chart.draw_series(
        filled().map(|(c, lo, hi)| Rectangle::new([(lo, 0.0), (hi, c)], BLACK.stroke_width(1))),
    )?;
    chart.draw_series(filled().map(|(c, lo, hi)| {
        Text::new(
            format!("{}", c as u64),
            ((lo + hi) / 2.0, c),
            label_style(VPos::Bottom),
        )
    }))?;

    // Zero reference line
    if x_min <= 0.0 && 0.0 <= x_max {
        chart.draw_series(LineSeries::new(
            vec![(0.0, 0.0), (0.0, y_top)],
            RED.stroke_width(2),
        ))?;
    }
    root.present()?;
    Ok(())
}

fn render_bars(path: &Path, bars: &[(String, i64)], text: &ChartText) -> Result<(), Box<dyn Error>> {
    let n = bars.len();
    let lowest = bars.iter().map(|b| b.1).min().unwrap_or(0).min(0) as f64;
    let highest = bars.iter().map(|b| b.1).max().unwrap_or(0).max(0) as f64;
    let pad = ((highest - lowest) * 0.1).max(1.0);

    let root = SVGBackend::new(path, (1600, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(text.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(80)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (0u32..n.max(1) as u32).into_segmented(),
            (lowest - pad)..(highest + pad),
        )?;

    let x_label = |v: &SegmentValue<u32>| -> String {
        match v {
            SegmentValue::CenterOf(i) => bars
                .get(*i as usize)
                .map(|b| b.0.clone())
                .unwrap_or_default(),
            _ => String::new(),
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n.max(1))
        .x_label_formatter(&x_label)
        .x_desc(text.x_desc)
        .y_desc(text.y_desc)
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.7).filled())
            .margin(4)
            .data(bars.iter().enumerate().map(|(i, (_, d))| (i as u32, *d as f64))),
    )?;
    chart.draw_series(bars.iter().enumerate().map(|(i, (_, d))| {
        let v_pos = if *d >= 0 { VPos::Bottom } else { VPos::Top };
        Text::new(
            format!("{}", d),
            (SegmentValue::CenterOf(i as u32), *d as f64),
            label_style(v_pos),
        )
    }))?;
    chart.draw_series(LineSeries::new(
        vec![(SegmentValue::Exact(0), 0.0), (SegmentValue::Last, 0.0)],
        RED.stroke_width(2),
    ))?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cons_relation::ConsKey;
    use std::fs;

    #[test]
    fn histogram_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.svg");
        draw_histogram(
            &path,
            &[-250.0, 0.0, 10.0, 99999.0],
            &BinLayout::MP_PARTY_DIFF,
            &MP_PARTY_DIFF_TEXT,
        )
        .unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("<svg"));
        assert!(contents.contains("MP-Party Difference"));
    }

    #[test]
    fn empty_histogram_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.svg");
        draw_histogram(&path, &[], &BinLayout::ERROR_PER_STATION, &ERROR_PER_STATION_TEXT)
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn bars_are_labelled_by_constituency() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.svg");
        let rows: Vec<RelationRow> = [("N_7", 120), ("N_3", -45)]
            .iter()
            .map(|(id, d)| RelationRow {
                cons_id: Some(ConsKey::Text(id.to_string())),
                mp_party_diff: Some(*d),
                ..RelationRow::default()
            })
            .collect();
        draw_interest_bars(&path, &rows).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("N_7"));
        assert!(contents.contains("-45"));
    }
}
