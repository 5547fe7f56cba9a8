//! Chart primitives on top of the plotters bitmap backend.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontStyle, FontTransform};
use std::collections::BTreeMap;
use std::path::Path;

use crate::analysis::counts::{Count, CrossTab};
use crate::analysis::summary::KeepSkipByCountry;

pub const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
pub const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);
pub const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
pub const LIGHT_BLUE: RGBColor = RGBColor(173, 216, 230);
pub const GOLD: RGBColor = RGBColor(255, 215, 0);
pub const PURPLE: RGBColor = RGBColor(128, 0, 128);

const HEAT_LOW: RGBColor = RGBColor(255, 255, 204);
const HEAT_HIGH: RGBColor = RGBColor(189, 0, 38);

fn title_font(title: &str) -> (&str, FontDesc<'static>) {
    (title, ("sans-serif", 32).into_font().style(FontStyle::Bold))
}

/// Headroom above the tallest bar so it does not touch the frame.
pub fn y_upper(max: usize) -> usize {
    max + max / 10 + 1
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<HSLColor> {
    (0..n)
        .map(|i| HSLColor(i as f64 / n as f64, 0.75, 0.5))
        .collect()
}

/// Linear blend from pale yellow to deep red as `value` approaches `max`.
pub fn heat_color(value: usize, max: usize) -> RGBColor {
    let t = if max == 0 {
        0.0
    } else {
        value as f64 / max as f64
    };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(
        lerp(HEAT_LOW.0, HEAT_HIGH.0),
        lerp(HEAT_LOW.1, HEAT_HIGH.1),
        lerp(HEAT_LOW.2, HEAT_HIGH.2),
    )
}

/// One bar of a histogram: `[start, end)` and how many values fell in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Splits the value range into `bins` equal-width bins. The last bin is
/// closed so the maximum is counted. `NaN` and infinite values are ignored.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<Bin> {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(lo), Some(hi)) = (
        values.iter().copied().min_by(f64::total_cmp),
        values.iter().copied().max_by(f64::total_cmp),
    ) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if lo == hi {
        return vec![Bin {
            start: lo - 0.5,
            end: hi + 0.5,
            count: values.len(),
        }];
    }

    let width = (hi - lo) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: lo + width * i as f64,
            end: lo + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in &values {
        let i = (((v - lo) / width) as usize).min(bins - 1);
        out[i].count += 1;
    }
    out
}

fn segment_label(labels: &[String], v: &SegmentValue<usize>) -> String {
    match v {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

pub fn bar_chart(
    path: &Path,
    size: (u32, u32),
    title: &str,
    x_desc: &str,
    bars: &[Count],
    color: RGBColor,
    rotate_labels: bool,
) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<String> = bars.iter().map(|c| c.label.clone()).collect();
    let max = bars.iter().map(|c| c.count).max().unwrap_or(0);
    let (caption, font) = title_font(title);

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, font)
        .margin(20)
        .x_label_area_size(if rotate_labels { 160 } else { 50 })
        .y_label_area_size(70)
        .build_cartesian_2d((0..bars.len().max(1)).into_segmented(), 0..y_upper(max))?;

    let label_font = if rotate_labels {
        ("sans-serif", 14).into_font().transform(FontTransform::Rotate90)
    } else {
        ("sans-serif", 14).into_font()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Number of Annotations")
        .x_labels(bars.len().max(1))
        .x_label_formatter(&|v| segment_label(&labels, v))
        .x_label_style(label_font)
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(color.filled())
            .margin(4)
            .data(bars.iter().enumerate().map(|(i, c)| (i, c.count))),
    )?;

    root.present()?;
    Ok(())
}

pub fn pie_chart(path: &Path, title: &str, slices: &[Count], colors: &[RGBColor]) -> Result<()> {
    let root = BitMapBackend::new(path, (1000, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let (caption, font) = title_font(title);
    let root = root.titled(caption, font)?;

    if !slices.is_empty() && !colors.is_empty() {
        let dims = root.dim_in_pixel();
        let center = (dims.0 as i32 / 2, dims.1 as i32 / 2);
        let radius = dims.0.min(dims.1) as f64 * 0.35;
        let sizes: Vec<f64> = slices.iter().map(|c| c.count as f64).collect();
        let labels: Vec<&str> = slices.iter().map(|c| c.label.as_str()).collect();
        let colors: Vec<RGBColor> = (0..slices.len()).map(|i| colors[i % colors.len()]).collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style(("sans-serif", 22).into_font().color(&BLACK));
        pie.percentages(("sans-serif", radius * 0.08).into_font().color(&BLACK));
        root.draw(&pie)?;
    }

    root.present()?;
    Ok(())
}

pub fn histogram(path: &Path, title: &str, x_desc: &str, bins: &[Bin]) -> Result<()> {
    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let lo = bins.first().map(|b| b.start).unwrap_or(0.0);
    let hi = bins.last().map(|b| b.end).unwrap_or(1.0);
    let max = bins.iter().map(|b| b.count).max().unwrap_or(0);
    let (caption, font) = title_font(title);

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, font)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(lo..hi, 0..y_upper(max))?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Frequency")
        .light_line_style(BLACK.mix(0.05).stroke_width(1))
        .draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0), (b.end, b.count)], SKY_BLUE.mix(0.7).filled())
    }))?;

    root.present()?;
    Ok(())
}

/// A geocoded point tagged with the country used for colouring.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

pub fn scatter_map(path: &Path, title: &str, points: &[MapPoint]) -> Result<()> {
    let root = BitMapBackend::new(path, (1600, 1000)).into_drawing_area();
    root.fill(&WHITE)?;

    let (lon_range, lat_range) = if points.is_empty() {
        (-20.0..65.0, -5.0..45.0)
    } else {
        let lons: Vec<f64> = points.iter().map(|p| p.longitude).collect();
        let lats: Vec<f64> = points.iter().map(|p| p.latitude).collect();
        (padded_range(&lons, 2.0), padded_range(&lats, 2.0))
    };

    let mut countries: Vec<&str> = points.iter().map(|p| p.country.as_str()).collect();
    countries.sort_unstable();
    countries.dedup();
    let palette = generate_palette(countries.len());
    let (caption, font) = title_font(title);

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, font)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(lon_range, lat_range)?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .light_line_style(BLACK.mix(0.05).stroke_width(1))
        .draw()?;

    for (country, color) in countries.iter().zip(palette) {
        chart
            .draw_series(
                points
                    .iter()
                    .filter(|p| p.country == *country)
                    .map(|p| Circle::new((p.longitude, p.latitude), 6, color.mix(0.6).filled())),
            )?
            .label(*country)
            .legend(move |(x, y)| Circle::new((x, y), 6, color.filled()));
    }

    if !countries.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8).filled())
            .border_style(BLACK.stroke_width(1))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn padded_range(values: &[f64], pad: f64) -> std::ops::Range<f64> {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (lo - pad)..(hi + pad)
}

pub fn heatmap(path: &Path, title: &str, tab: &CrossTab) -> Result<()> {
    let root = BitMapBackend::new(path, (1400, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let n_cols = tab.columns.len().max(1);
    let n_rows = tab.rows.len().max(1);
    let max = tab.max_cell();
    let (caption, font) = title_font(title);

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, font)
        .margin(20)
        .x_label_area_size(120)
        .y_label_area_size(140)
        .build_cartesian_2d((0..n_cols).into_segmented(), (0..n_rows).into_segmented())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Type")
        .y_desc("Emotion")
        .x_labels(n_cols)
        .y_labels(n_rows)
        .x_label_formatter(&|v| segment_label(&tab.columns, v))
        .y_label_formatter(&|v| segment_label(&tab.rows, v))
        .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
        .draw()?;

    let cells: Vec<(usize, usize, usize)> = tab
        .cells
        .iter()
        .enumerate()
        .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, &n)| (r, c, n)))
        .collect();

    chart.draw_series(cells.iter().map(|&(r, c, n)| {
        Rectangle::new(
            [
                (SegmentValue::Exact(c), SegmentValue::Exact(r)),
                (SegmentValue::Exact(c + 1), SegmentValue::Exact(r + 1)),
            ],
            heat_color(n, max).filled(),
        )
    }))?;

    let text_style = ("sans-serif", 18)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(cells.iter().map(|&(r, c, n)| {
        Text::new(
            n.to_string(),
            (SegmentValue::CenterOf(c), SegmentValue::CenterOf(r)),
            text_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

pub fn daily_line(path: &Path, title: &str, per_day: &BTreeMap<NaiveDate, usize>) -> Result<()> {
    let root = BitMapBackend::new(path, (1600, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let first = per_day.keys().next().copied();
    let span = match (first, per_day.keys().next_back()) {
        (Some(first), Some(last)) => (*last - first).num_days().max(1),
        _ => 1,
    };
    let max = per_day.values().copied().max().unwrap_or(0);
    let points: Vec<(i64, usize)> = match first {
        Some(first) => per_day
            .iter()
            .map(|(date, &n)| ((*date - first).num_days(), n))
            .collect(),
        None => Vec::new(),
    };
    let (caption, font) = title_font(title);

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, font)
        .margin(20)
        .x_label_area_size(110)
        .y_label_area_size(70)
        .build_cartesian_2d(0..span, 0..y_upper(max))?;

    let day_label = |offset: &i64| match first {
        Some(first) => (first + Duration::days(*offset)).format("%Y-%m-%d").to_string(),
        None => String::new(),
    };
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Number of Annotations")
        .light_line_style(BLACK.mix(0.05).stroke_width(1))
        .x_label_formatter(&day_label)
        .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
    )?;

    root.present()?;
    Ok(())
}

pub fn stacked_keep_skip(path: &Path, title: &str, rows: &[KeepSkipByCountry]) -> Result<()> {
    let root = BitMapBackend::new(path, (1400, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<String> = rows.iter().map(|r| r.country.clone()).collect();
    let max = rows.iter().map(|r| r.keep + r.skip).max().unwrap_or(0);
    let (caption, font) = title_font(title);

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, font)
        .margin(20)
        .x_label_area_size(160)
        .y_label_area_size(70)
        .build_cartesian_2d((0..rows.len().max(1)).into_segmented(), 0..y_upper(max))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Country")
        .y_desc("Number of Annotations")
        .x_labels(rows.len().max(1))
        .x_label_formatter(&|v| segment_label(&labels, v))
        .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
        .draw()?;

    let bar = |i: usize, bottom: usize, top: usize, color: RGBColor| {
        let mut rect = Rectangle::new(
            [
                (SegmentValue::Exact(i), bottom),
                (SegmentValue::Exact(i + 1), top),
            ],
            color.filled(),
        );
        rect.set_margin(0, 0, 4, 4);
        rect
    };

    chart
        .draw_series(rows.iter().enumerate().map(|(i, r)| bar(i, 0, r.keep, LIGHT_GREEN)))?
        .label("Keep")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], LIGHT_GREEN.filled()));
    chart
        .draw_series(
            rows.iter()
                .enumerate()
                .map(|(i, r)| bar(i, r.keep, r.keep + r.skip, LIGHT_CORAL)),
        )?
        .label("Skip")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], LIGHT_CORAL.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8).filled())
        .border_style(BLACK.stroke_width(1))
        .draw()?;

    root.present()?;
    Ok(())
}
