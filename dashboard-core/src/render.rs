use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

use crate::model::{ForecastRecord, ForecastTable};

/// Output bitmap size in pixels.
const DASHBOARD_SIZE: (u32, u32) = (1800, 1200);

const TITLE_FONT: (&str, i32) = ("sans-serif", 40);
const PANEL_TITLE_FONT: (&str, i32) = ("sans-serif", 24);
const LABEL_FONT: (&str, i32) = ("sans-serif", 15);

const TEMPERATURE_COLOR: RGBColor = RED;
const FEELS_LIKE_COLOR: RGBColor = BLUE;
const HUMIDITY_COLOR: RGBColor = GREEN;
const PRESSURE_COLOR: RGBColor = BLUE;

/// Compass sectors for the wind panel: wind direction is bucketed into one of
/// these, each with its own color.
const WIND_SECTORS: [(&str, RGBColor); 4] = [
    ("N", RGBColor(66, 133, 244)),
    ("E", RGBColor(52, 168, 83)),
    ("S", RGBColor(234, 67, 53)),
    ("W", RGBColor(170, 71, 188)),
];

const PIE_COLORS: [RGBColor; 8] = [
    RGBColor(141, 211, 199),
    RGBColor(251, 128, 114),
    RGBColor(128, 177, 211),
    RGBColor(253, 180, 98),
    RGBColor(179, 222, 105),
    RGBColor(252, 205, 229),
    RGBColor(190, 186, 218),
    RGBColor(255, 237, 111),
];

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Render the four-panel dashboard for a non-empty table and write it to
/// `path`, overwriting any existing file.
pub fn render_dashboard(table: &ForecastTable, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, DASHBOARD_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let title = format!("5-Day Weather Forecast for {}", table.city);
    let root = root.titled(&title, TITLE_FONT)?;

    let panels = root.split_evenly((2, 2));
    draw_temperature_panel(&panels[0], table)?;
    draw_humidity_pressure_panel(&panels[1], table)?;
    draw_wind_panel(&panels[2], table)?;
    draw_conditions_panel(&panels[3], table)?;

    root.present()?;

    Ok(())
}

fn draw_temperature_panel(area: &Panel<'_>, table: &ForecastTable) -> Result<()> {
    let records = &table.records;
    let x_range = time_range(records);
    let y_range = padded_range(records.iter().flat_map(|r| [r.temperature, r.feels_like]));

    let mut chart = ChartBuilder::on(area)
        .caption("Temperature vs Feels Like", PANEL_TITLE_FONT)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_labels(6)
        .x_label_formatter(&format_time_label)
        .y_desc(table.units.temperature_label())
        .label_style(LABEL_FONT)
        .draw()?;

    let temperature = records.iter().map(|r| (r.timestamp, r.temperature));
    chart
        .draw_series(LineSeries::new(temperature.clone(), &TEMPERATURE_COLOR))?
        .label("Temperature")
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], TEMPERATURE_COLOR)
        });
    chart.draw_series(temperature.map(|p| Circle::new(p, 3, TEMPERATURE_COLOR.filled())))?;

    let feels_like = records.iter().map(|r| (r.timestamp, r.feels_like));
    chart
        .draw_series(LineSeries::new(feels_like.clone(), &FEELS_LIKE_COLOR))?
        .label("Feels Like")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FEELS_LIKE_COLOR));
    chart.draw_series(feels_like.map(|p| Circle::new(p, 3, FEELS_LIKE_COLOR.filled())))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(LABEL_FONT)
        .draw()?;

    Ok(())
}

/// Humidity on the left axis, pressure on the right one, same time domain.
fn draw_humidity_pressure_panel(area: &Panel<'_>, table: &ForecastTable) -> Result<()> {
    let records = &table.records;
    let x_range = time_range(records);
    let humidity_range = padded_range(records.iter().map(|r| f64::from(r.humidity)));
    let pressure_range = padded_range(records.iter().map(|r| r.pressure));

    let mut chart = ChartBuilder::on(area)
        .caption("Humidity and Pressure", PANEL_TITLE_FONT)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .right_y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), humidity_range)?
        .set_secondary_coord(x_range, pressure_range);

    chart
        .configure_mesh()
        .x_labels(6)
        .x_label_formatter(&format_time_label)
        .y_desc("Humidity (%)")
        .label_style(LABEL_FONT)
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc("Pressure (hPa)")
        .draw()?;

    let humidity = records.iter().map(|r| (r.timestamp, f64::from(r.humidity)));
    chart
        .draw_series(LineSeries::new(humidity, &HUMIDITY_COLOR))?
        .label("Humidity")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], HUMIDITY_COLOR));

    let pressure = records.iter().map(|r| (r.timestamp, r.pressure));
    chart
        .draw_secondary_series(LineSeries::new(pressure, &PRESSURE_COLOR))?
        .label("Pressure")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], PRESSURE_COLOR));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(LABEL_FONT)
        .draw()?;

    Ok(())
}

/// Wind scatter: marker size scales with speed, color encodes the compass
/// sector the wind comes from.
fn draw_wind_panel(area: &Panel<'_>, table: &ForecastTable) -> Result<()> {
    let records = &table.records;
    let x_range = time_range(records);
    let y_range = padded_range(records.iter().map(|r| r.wind_speed));
    let max_speed = records
        .iter()
        .map(|r| r.wind_speed)
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);

    let mut chart = ChartBuilder::on(area)
        .caption("Wind Speed and Direction", PANEL_TITLE_FONT)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_labels(6)
        .x_label_formatter(&format_time_label)
        .y_desc(table.units.wind_speed_label())
        .label_style(LABEL_FONT)
        .draw()?;

    for (sector, (name, color)) in WIND_SECTORS.iter().enumerate() {
        let color = *color;
        let points = records
            .iter()
            .filter(move |r| wind_sector(r.wind_deg) == sector);

        chart
            .draw_series(points.map(|r| {
                let radius = 3 + (r.wind_speed / max_speed * 6.0).round() as i32;
                Circle::new((r.timestamp, r.wind_speed), radius, color.mix(0.8).filled())
            }))?
            .label(*name)
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(LABEL_FONT)
        .draw()?;

    Ok(())
}

/// Pie of the weather-category distribution, slices labeled with their share.
fn draw_conditions_panel(area: &Panel<'_>, table: &ForecastTable) -> Result<()> {
    let area = area.titled("Weather Conditions Distribution", PANEL_TITLE_FONT)?;

    let distribution = table.condition_distribution();
    let total: usize = distribution.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Ok(());
    }

    let sizes: Vec<f64> = distribution.iter().map(|(_, n)| *n as f64).collect();
    let labels: Vec<String> = distribution
        .iter()
        .map(|(name, n)| format!("{name} ({:.1}%)", *n as f64 / total as f64 * 100.0))
        .collect();
    let colors: Vec<RGBColor> = (0..distribution.len())
        .map(|i| PIE_COLORS[i % PIE_COLORS.len()])
        .collect();

    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.32;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(LABEL_FONT.into_font().color(&BLACK));
    area.draw(&pie)?;

    Ok(())
}

fn format_time_label(ts: &DateTime<Utc>) -> String {
    ts.format("%d %b %H:%M").to_string()
}

/// Time domain shared by the three time-series panels. A single-point table
/// still gets a non-degenerate axis.
fn time_range(records: &[ForecastRecord]) -> Range<DateTime<Utc>> {
    let first = records.first().map_or_else(Utc::now, |r| r.timestamp);
    let last = records.last().map_or(first, |r| r.timestamp);

    if first == last {
        (first - Duration::hours(1))..(last + Duration::hours(1))
    } else {
        first..last
    }
}

/// Value axis with 5% headroom; flat series are widened so the axis never
/// collapses to a point.
fn padded_range<I: IntoIterator<Item = f64>>(values: I) -> Range<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }

    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }

    let pad = ((max - min) * 0.05).max(0.5);
    (min - pad)..(max + pad)
}

/// Bucket a wind direction (degrees, 0 = from north) into a quadrant index
/// matching [`WIND_SECTORS`].
fn wind_sector(deg: f64) -> usize {
    let deg = deg.rem_euclid(360.0);
    (((deg + 45.0) / 90.0) as usize) % 4
}
