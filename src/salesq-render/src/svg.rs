//! SVG rendering of chart specs
//!
//! [`Renderer`] is the seam between chart descriptions and an output
//! format. [`SvgRenderer`] draws every [`ChartKind`] as a standalone
//! `<svg>` element with hover tooltips carried in `<title>` children.

use crate::chart::{BoxGroup, Category, ChartKind, ChartSpec, Orientation, Point, Series};
use crate::Result;

use log::trace;
use salesq_core::insight::{format_currency, truncate_label};
use salesq_core::ops::stats::Bin;
use serde::Serialize;

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Default series colours, cycled when a chart has more items
pub const PALETTE: [&str; 7] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FECA57", "#FF9FF3", "#54A0FF",
];

const AXIS_COLOR: &str = "#333333";
const GRID_COLOR: &str = "#E5E5E5";
const MISSING_COLOR: &str = "#EEEEEE";
const MEAN_COLOR: &str = "#E74C3C";

/// Turns a chart description into something displayable
pub trait Renderer {
    fn render(&self, spec: &ChartSpec) -> Result<Renderable>;
}

/// A rendered chart; `markup` is opaque to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Renderable {
    pub kind: ChartKind,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub markup: String,
}

/// Draws charts as SVG
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    pub width: u32,
    pub height: u32,
    pub palette: Vec<String>,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new(480, 360)
    }
}

impl SvgRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            palette: PALETTE.iter().map(ToString::to_string).collect(),
        }
    }

    fn color(&self, index: usize) -> &str {
        self.palette
            .get(index % self.palette.len().max(1))
            .map_or(PALETTE[0], String::as_str)
    }

    fn area(&self, spec: &ChartSpec) -> Area {
        let (left, bottom) = match (&spec.series, spec.orientation) {
            (Series::Categorical(_), _) if spec.kind == ChartKind::Pie => (12.0, 12.0),
            (Series::Categorical(_), Orientation::Horizontal) => (150.0, 40.0),
            (Series::Grid { .. }, _) => (110.0, 48.0),
            _ => (64.0, 48.0),
        };
        let width = f64::from(self.width);
        let height = f64::from(self.height);
        Area {
            left,
            top: 40.0,
            width: (width - left - 16.0).max(1.0),
            height: (height - 40.0 - bottom).max(1.0),
        }
    }

    fn pie(&self, canvas: &mut Canvas, area: Area, items: &[Category]) {
        let total: f64 = items.iter().map(|c| c.value.max(0.0)).sum();
        if total <= 0.0 {
            canvas.no_data();
            return;
        }

        let legend_width = area.width * 0.35;
        let plot_width = area.width - legend_width;
        let r = (plot_width.min(area.height) / 2.0 - 4.0).max(1.0);
        let cx = area.left + plot_width / 2.0;
        let cy = area.top + area.height / 2.0;
        let legend_x = area.left + plot_width + 8.0;

        let mut start = -FRAC_PI_2;
        for (i, item) in items.iter().enumerate() {
            let value = item.value.max(0.0);
            let share = value / total;
            let sweep = share * TAU;
            let color = self.color(i);
            let tooltip = format!(
                "{}: {} ({:.1}%)",
                item.label,
                format_currency(item.value),
                share * 100.0
            );

            if sweep >= TAU - 1e-9 {
                canvas.circle(cx, cy, r, color, Some(&tooltip));
            } else if sweep > 0.0 {
                let end = start + sweep;
                let (x1, y1) = (cx + r * start.cos(), cy + r * start.sin());
                let (x2, y2) = (cx + r * end.cos(), cy + r * end.sin());
                let large = u8::from(sweep > PI);
                canvas.path(
                    &format!(
                        "M {cx:.2} {cy:.2} L {x1:.2} {y1:.2} A {r:.2} {r:.2} 0 {large} 1 {x2:.2} {y2:.2} Z"
                    ),
                    color,
                    Some(&tooltip),
                );
            }
            if share >= 0.03 {
                let mid = start + sweep / 2.0;
                canvas.text(
                    cx + 0.65 * r * mid.cos(),
                    cy + 0.65 * r * mid.sin() + 4.0,
                    &format!("{:.1}%", share * 100.0),
                    Anchor::Middle,
                    10,
                );
            }
            start += sweep;

            let legend_y = area.top + 18.0 * i as f64;
            canvas.rect(legend_x, legend_y, 10.0, 10.0, color, None);
            canvas.text(
                legend_x + 14.0,
                legend_y + 9.0,
                &truncate_label(&item.label, 18),
                Anchor::Start,
                10,
            );
        }
    }

    fn bars(&self, canvas: &mut Canvas, area: Area, items: &[Category]) {
        let max = max_value(items.iter().map(|c| c.value));
        canvas.y_axis(area, 0.0, max, compact);

        let band = area.width / items.len() as f64;
        let every = items.len().div_ceil(24);
        for (i, item) in items.iter().enumerate() {
            let height = item.value.max(0.0) / max * area.height;
            let x = area.left + band * i as f64 + band * 0.15;
            let tooltip = format!("{}: {}", item.label, format_currency(item.value));
            canvas.rect(x, area.bottom() - height, band * 0.7, height, self.color(i), Some(&tooltip));
            if i % every == 0 {
                canvas.text(
                    area.left + band * (i as f64 + 0.5),
                    area.bottom() + 14.0,
                    &truncate_label(&item.label, 12),
                    Anchor::Middle,
                    10,
                );
            }
        }
    }

    fn horizontal_bars(&self, canvas: &mut Canvas, area: Area, items: &[Category]) {
        let max = max_value(items.iter().map(|c| c.value));
        canvas.x_axis(area, 0.0, max, compact);

        let band = area.height / items.len() as f64;
        for (i, item) in items.iter().enumerate() {
            let width = item.value.max(0.0) / max * area.width;
            let y = area.top + band * i as f64 + band * 0.15;
            let tooltip = format!("{}: {}", item.label, format_currency(item.value));
            canvas.rect(area.left, y, width, band * 0.7, self.color(i), Some(&tooltip));
            canvas.text(
                area.left - 6.0,
                y + band * 0.35 + 4.0,
                &truncate_label(&item.label, 22),
                Anchor::End,
                10,
            );
        }
    }

    fn line(&self, canvas: &mut Canvas, area: Area, items: &[Category]) {
        let max = max_value(items.iter().map(|c| c.value));
        canvas.y_axis(area, 0.0, max, compact);

        let n = items.len();
        let x = |i: usize| {
            if n == 1 {
                area.left + area.width / 2.0
            } else {
                area.left + area.width * i as f64 / (n - 1) as f64
            }
        };
        let y = |v: f64| area.bottom() - v.max(0.0) / max * area.height;

        let points: Vec<String> = items
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:.2},{:.2}", x(i), y(c.value)))
            .collect();
        canvas.polyline(&points.join(" "), self.color(2));

        let every = n.div_ceil(12);
        for (i, item) in items.iter().enumerate() {
            let tooltip = format!("{}: {}", item.label, format_currency(item.value));
            if n <= 60 {
                canvas.circle(x(i), y(item.value), 3.0, self.color(2), Some(&tooltip));
            }
            if i % every == 0 {
                canvas.text(x(i), area.bottom() + 14.0, &truncate_label(&item.label, 10), Anchor::Middle, 10);
            }
        }
    }

    fn scatter(&self, canvas: &mut Canvas, area: Area, points: &[Point]) {
        let max_x = max_value(points.iter().map(|p| p.x));
        let max_y = max_value(points.iter().map(|p| p.y));
        canvas.y_axis(area, 0.0, max_y, compact);
        canvas.x_ticks(area, 0.0, max_x, compact);

        for (i, point) in points.iter().enumerate() {
            let cx = area.left + point.x.max(0.0) / max_x * area.width;
            let cy = area.bottom() - point.y.max(0.0) / max_y * area.height;
            let tooltip = format!("{}: {} orders, {}", point.label, point.x, format_currency(point.y));
            canvas.circle(cx, cy, 7.0, self.color(i), Some(&tooltip));
            canvas.text(cx + 9.0, cy + 4.0, &truncate_label(&point.label, 16), Anchor::Start, 10);
        }
    }

    fn heatmap(
        canvas: &mut Canvas,
        area: Area,
        rows: &[String],
        columns: &[String],
        cells: &[Vec<Option<f64>>],
    ) {
        let max = max_value(cells.iter().flatten().flatten().copied());
        let cell_width = area.width / columns.len() as f64;
        let cell_height = area.height / rows.len() as f64;

        for (r, row) in rows.iter().enumerate() {
            let y = area.top + cell_height * r as f64;
            for (c, column) in columns.iter().enumerate() {
                let x = area.left + cell_width * c as f64;
                let value = cells.get(r).and_then(|row| row.get(c)).copied().flatten();
                let fill = value.map_or_else(|| MISSING_COLOR.to_string(), |v| heat(v / max));
                let tooltip = format!(
                    "{row} / {column}: {}",
                    value.map_or_else(|| "no sales".to_string(), format_currency)
                );
                canvas.rect(x, y, cell_width, cell_height, &fill, Some(&tooltip));
                if let Some(v) = value {
                    canvas.text(
                        x + cell_width / 2.0,
                        y + cell_height / 2.0 + 4.0,
                        &format!("{v:.0}"),
                        Anchor::Middle,
                        10,
                    );
                }
            }
            canvas.text(area.left - 6.0, y + cell_height / 2.0 + 4.0, &truncate_label(row, 16), Anchor::End, 10);
        }
        for (c, column) in columns.iter().enumerate() {
            canvas.text(
                area.left + cell_width * (c as f64 + 0.5),
                area.bottom() + 14.0,
                &truncate_label(column, 14),
                Anchor::Middle,
                10,
            );
        }
    }

    fn histogram(&self, canvas: &mut Canvas, area: Area, bins: &[Bin], mean: Option<f64>) {
        let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
            return;
        };
        let lo = first.lower;
        let span = if last.upper > lo { last.upper - lo } else { 1.0 };
        let max = max_value(bins.iter().map(|b| b.count as f64));
        canvas.y_axis(area, 0.0, max, |v| format!("{v:.0}"));
        canvas.x_ticks(area, lo, lo + span, compact);

        let x = |v: f64| area.left + (v - lo) / span * area.width;
        for bin in bins {
            let height = bin.count as f64 / max * area.height;
            let tooltip = format!(
                "{} to {}: {}",
                format_currency(bin.lower),
                format_currency(bin.upper),
                bin.count
            );
            canvas.rect(
                x(bin.lower),
                area.bottom() - height,
                (x(bin.upper) - x(bin.lower)).max(0.5),
                height,
                self.color(1),
                Some(&tooltip),
            );
        }

        if let Some(mean) = mean {
            let mx = x(mean);
            canvas.dashed_line(mx, area.top, mx, area.bottom(), MEAN_COLOR);
            canvas.text(
                area.right(),
                area.top + 12.0,
                &format!("Mean: {}", format_currency(mean)),
                Anchor::End,
                10,
            );
        }
    }

    fn boxes(&self, canvas: &mut Canvas, area: Area, groups: &[BoxGroup]) {
        let values = || {
            groups.iter().flat_map(|g| {
                [g.stats.lower_whisker, g.stats.upper_whisker]
                    .into_iter()
                    .chain(g.stats.outliers.iter().copied())
            })
        };
        let lo = values().fold(f64::INFINITY, f64::min).min(0.0);
        let hi = values().fold(f64::NEG_INFINITY, f64::max);
        let span = if hi > lo { hi - lo } else { 1.0 };
        canvas.y_axis(area, lo, lo + span, compact);

        let y = |v: f64| area.bottom() - (v - lo) / span * area.height;
        let band = area.width / groups.len() as f64;
        for (i, group) in groups.iter().enumerate() {
            let s = &group.stats;
            let cx = area.left + band * (i as f64 + 0.5);
            let half = band * 0.25;
            let tooltip = format!(
                "{}: median {}, IQR {} to {}",
                group.label,
                format_currency(s.median),
                format_currency(s.q1),
                format_currency(s.q3)
            );

            canvas.line(cx, y(s.lower_whisker), cx, y(s.q1), AXIS_COLOR);
            canvas.line(cx, y(s.q3), cx, y(s.upper_whisker), AXIS_COLOR);
            canvas.line(cx - half / 2.0, y(s.lower_whisker), cx + half / 2.0, y(s.lower_whisker), AXIS_COLOR);
            canvas.line(cx - half / 2.0, y(s.upper_whisker), cx + half / 2.0, y(s.upper_whisker), AXIS_COLOR);
            canvas.rect(
                cx - half,
                y(s.q3),
                half * 2.0,
                (y(s.q1) - y(s.q3)).max(0.5),
                self.color(i),
                Some(&tooltip),
            );
            canvas.line(cx - half, y(s.median), cx + half, y(s.median), AXIS_COLOR);
            for outlier in &s.outliers {
                canvas.hollow_circle(cx, y(*outlier), 2.5, AXIS_COLOR);
            }
            canvas.text(cx, area.bottom() + 14.0, &truncate_label(&group.label, 14), Anchor::Middle, 10);
        }
    }
}

impl Renderer for SvgRenderer {
    fn render(&self, spec: &ChartSpec) -> Result<Renderable> {
        let mut canvas = Canvas::new(self.width, self.height);
        canvas.title(&spec.title);
        let area = self.area(spec);

        if spec.series.is_empty() {
            canvas.no_data();
        } else {
            match &spec.series {
                Series::Categorical(items) => match (spec.kind, spec.orientation) {
                    (ChartKind::Pie, _) => self.pie(&mut canvas, area, items),
                    (ChartKind::Line, _) => self.line(&mut canvas, area, items),
                    (_, Orientation::Horizontal) => self.horizontal_bars(&mut canvas, area, items),
                    _ => self.bars(&mut canvas, area, items),
                },
                Series::Points(points) => self.scatter(&mut canvas, area, points),
                Series::Grid {
                    rows,
                    columns,
                    cells,
                } => Self::heatmap(&mut canvas, area, rows, columns, cells),
                Series::Distribution { bins, mean } => {
                    self.histogram(&mut canvas, area, bins, *mean);
                }
                Series::Groups(groups) => self.boxes(&mut canvas, area, groups),
            }
            canvas.axis_labels(area, spec.x_label.as_deref(), spec.y_label.as_deref());
        }

        trace!("Rendered {} chart '{}'", spec.kind, spec.title);
        Ok(Renderable {
            kind: spec.kind,
            title: spec.title.clone(),
            width: self.width,
            height: self.height,
            markup: canvas.finish(spec.kind),
        })
    }
}

/// Plot region inside the margins
#[derive(Debug, Clone, Copy)]
struct Area {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Area {
    fn right(self) -> f64 {
        self.left + self.width
    }

    fn bottom(self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy)]
enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

struct Canvas {
    width: u32,
    height: u32,
    body: String,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    fn push(&mut self, element: &str) {
        self.body.push_str(element);
        self.body.push('\n');
    }

    fn closed(element: &str, tooltip: Option<&str>) -> String {
        match tooltip {
            Some(tip) => {
                let tag = element.split_whitespace().next().unwrap_or("<g");
                format!("{element}><title>{}</title></{}>", escape(tip), &tag[1..])
            }
            None => format!("{element}/>"),
        }
    }

    fn title(&mut self, title: &str) {
        let x = f64::from(self.width) / 2.0;
        self.push(&format!(
            r#"<text x="{x:.1}" y="22" text-anchor="middle" font-size="14" font-weight="bold">{}</text>"#,
            escape(title)
        ));
    }

    fn no_data(&mut self) {
        let x = f64::from(self.width) / 2.0;
        let y = f64::from(self.height) / 2.0;
        self.text(x, y, "No data", Anchor::Middle, 12);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: &str, tooltip: Option<&str>) {
        let element = format!(
            r#"<rect x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}" fill="{fill}" stroke="{AXIS_COLOR}" stroke-width="0.3""#
        );
        self.push(&Self::closed(&element, tooltip));
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, tooltip: Option<&str>) {
        let element = format!(
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}" fill="{fill}" fill-opacity="0.85""#
        );
        self.push(&Self::closed(&element, tooltip));
    }

    fn hollow_circle(&mut self, cx: f64, cy: f64, r: f64, stroke: &str) {
        self.push(&format!(
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}" fill="none" stroke="{stroke}"/>"#
        ));
    }

    fn path(&mut self, d: &str, fill: &str, tooltip: Option<&str>) {
        let element = format!(r##"<path d="{d}" fill="{fill}" stroke="#FFFFFF" stroke-width="1""##);
        self.push(&Self::closed(&element, tooltip));
    }

    fn polyline(&mut self, points: &str, stroke: &str) {
        self.push(&format!(
            r#"<polyline points="{points}" fill="none" stroke="{stroke}" stroke-width="2"/>"#
        ));
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        self.push(&format!(
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{stroke}" stroke-width="1"/>"#
        ));
    }

    fn dashed_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        self.push(&format!(
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{stroke}" stroke-width="2" stroke-dasharray="6 4"/>"#
        ));
    }

    fn text(&mut self, x: f64, y: f64, text: &str, anchor: Anchor, size: u32) {
        self.push(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="{}" font-size="{size}">{}</text>"#,
            anchor.as_str(),
            escape(text)
        ));
    }

    /// Gridlines and tick labels for values `lo..=hi` along the left edge
    fn y_axis(&mut self, area: Area, lo: f64, hi: f64, label: impl Fn(f64) -> String) {
        for k in 0..=4 {
            let fraction = f64::from(k) / 4.0;
            let y = area.bottom() - fraction * area.height;
            self.line(area.left, y, area.right(), y, GRID_COLOR);
            self.text(area.left - 6.0, y + 4.0, &label(lo + (hi - lo) * fraction), Anchor::End, 10);
        }
        self.frame(area);
    }

    /// Gridlines and tick labels for values `lo..=hi` along the bottom edge
    fn x_axis(&mut self, area: Area, lo: f64, hi: f64, label: impl Fn(f64) -> String) {
        for k in 0..=4 {
            let fraction = f64::from(k) / 4.0;
            let x = area.left + fraction * area.width;
            self.line(x, area.top, x, area.bottom(), GRID_COLOR);
            self.text(x, area.bottom() + 14.0, &label(lo + (hi - lo) * fraction), Anchor::Middle, 10);
        }
        self.frame(area);
    }

    /// End labels only, for axes whose gridlines would clutter
    fn x_ticks(&mut self, area: Area, lo: f64, hi: f64, label: impl Fn(f64) -> String) {
        self.text(area.left, area.bottom() + 14.0, &label(lo), Anchor::Start, 10);
        self.text(area.right(), area.bottom() + 14.0, &label(hi), Anchor::End, 10);
    }

    fn frame(&mut self, area: Area) {
        self.line(area.left, area.top, area.left, area.bottom(), AXIS_COLOR);
        self.line(area.left, area.bottom(), area.right(), area.bottom(), AXIS_COLOR);
    }

    fn axis_labels(&mut self, area: Area, x_label: Option<&str>, y_label: Option<&str>) {
        if let Some(label) = x_label {
            let y = f64::from(self.height) - 8.0;
            self.text(area.left + area.width / 2.0, y, label, Anchor::Middle, 11);
        }
        if let Some(label) = y_label {
            let y = area.top + area.height / 2.0;
            self.push(&format!(
                r#"<text x="14" y="{y:.2}" text-anchor="middle" font-size="11" transform="rotate(-90 14 {y:.2})">{}</text>"#,
                escape(label)
            ));
        }
    }

    fn finish(self, kind: ChartKind) -> String {
        let (w, h) = (self.width, self.height);
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"salesq-chart chart-{kind}\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n<rect width=\"{w}\" height=\"{h}\" fill=\"#FFFFFF\"/>\n{}</svg>",
            self.body
        )
    }
}

/// Largest value, or 1 when nothing is positive
fn max_value(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0, f64::max);
    if max > 0.0 {
        max
    } else {
        1.0
    }
}

/// Short tick label: `1.2M`, `350k`, `12`
fn compact(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.0}k", value / 1_000.0)
    } else {
        format!("{value:.0}")
    }
}

/// Yellow to red ramp for `t` in 0..=1
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn heat(t: f64) -> String {
    let t = t.clamp(0.0, 1.0);
    let channel = |from: f64, to: f64| (from + (to - from) * t).round() as u8;
    format!(
        "#{:02X}{:02X}{:02X}",
        channel(255.0, 189.0),
        channel(255.0, 0.0),
        channel(204.0, 38.0)
    )
}

/// Escape text for use in SVG and HTML content or attributes
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
