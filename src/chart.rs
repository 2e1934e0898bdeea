//! Synthetic pattern charts
//!
//! Every chart starts from the same kind of random walk: ten cumulative draws
//! from N(100, 1), seeded so a session can redraw the exact chart it showed.
//! A fixed perturbation per pattern is then applied on top, along with the
//! reference lines or bands that make the pattern visible.

use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::error::{Result, TrainerError};
use crate::types::ChartKind;

pub const SERIES_LEN: usize = 10;
const STEP_MEAN: f64 = 100.0;
const STEP_STD: f64 = 1.0;

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 400;

const PRICE_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Colors used by reference overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayColor {
    Red,
    Yellow,
    Green,
    Purple,
    Orange,
}

impl OverlayColor {
    fn rgb(self) -> RGBColor {
        match self {
            OverlayColor::Red => RGBColor(214, 39, 40),
            OverlayColor::Yellow => RGBColor(255, 215, 0),
            OverlayColor::Green => RGBColor(44, 160, 44),
            OverlayColor::Purple => RGBColor(128, 0, 128),
            OverlayColor::Orange => RGBColor(255, 165, 0),
        }
    }
}

/// Reference drawn on top of the price line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Overlay {
    /// Dashed horizontal line across the whole chart
    Level {
        label: &'static str,
        price: f64,
        color: OverlayColor,
    },
    /// Shaded vertical span between two x positions
    Band {
        label: &'static str,
        #[serde(rename = "xStart")]
        x_start: f64,
        #[serde(rename = "xEnd")]
        x_end: f64,
        color: OverlayColor,
        opacity: f64,
    },
}

/// A generated chart, ready to render
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub seed: u64,
    pub title: &'static str,
    pub prices: Vec<f64>,
    pub overlays: Vec<Overlay>,
}

/// Random walk the pattern is painted onto
pub fn base_series(seed: u64) -> Result<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let steps = Normal::new(STEP_MEAN, STEP_STD).map_err(|e| TrainerError::Chart(e.to_string()))?;

    let prices = steps
        .sample_iter(&mut rng)
        .take(SERIES_LEN)
        .scan(0.0, |total, step: f64| {
            *total += step;
            Some(*total)
        })
        .collect();

    Ok(prices)
}

/// Build the chart for a pattern from the given seed
pub fn generate(kind: ChartKind, seed: u64) -> Result<Chart> {
    let mut prices = base_series(seed)?;

    let (title, overlays) = match kind {
        ChartKind::Liquidity => {
            prices[6] += 5.0; // sweep
            prices[7] -= 6.0; // reversal
            let overlays = vec![Overlay::Level {
                label: "Previous High",
                price: prices[5],
                color: OverlayColor::Red,
            }];
            ("Liquidity Grab Example", overlays)
        }
        ChartKind::Fvg => {
            prices[4] += 5.0;
            prices[5] += 7.0;
            prices[6] += 3.0;
            let overlays = vec![Overlay::Band {
                label: "FVG",
                x_start: 4.5,
                x_end: 5.5,
                color: OverlayColor::Yellow,
                opacity: 0.3,
            }];
            ("FVG Example", overlays)
        }
        ChartKind::Bos => {
            for p in &mut prices[5..] {
                *p += 6.0;
            }
            let overlays = vec![Overlay::Level {
                label: "Structure Break",
                price: prices[4],
                color: OverlayColor::Green,
            }];
            ("Break of Structure (BOS)", overlays)
        }
        ChartKind::Orb => {
            // Range is taken from the first three prints before the pullback
            let opening = &prices[0..3];
            let low = opening.iter().copied().fold(f64::INFINITY, f64::min);
            let high = opening.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            for p in &mut prices[4..] {
                *p -= 4.0;
            }
            let overlays = vec![
                Overlay::Level {
                    label: "ORB Low",
                    price: low,
                    color: OverlayColor::Purple,
                },
                Overlay::Level {
                    label: "ORB High",
                    price: high,
                    color: OverlayColor::Orange,
                },
            ];
            ("Opening Range Breakout (ORB)", overlays)
        }
    };

    Ok(Chart {
        kind,
        seed,
        title,
        prices,
        overlays,
    })
}

impl Chart {
    /// Price range covering the series and every level, with some headroom
    pub fn y_range(&self) -> (f64, f64) {
        let levels = self.overlays.iter().filter_map(|o| match o {
            Overlay::Level { price, .. } => Some(*price),
            Overlay::Band { .. } => None,
        });

        let (min, max) = self
            .prices
            .iter()
            .copied()
            .chain(levels)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            });

        let pad = ((max - min) * 0.05).max(1.0);
        (min - pad, max + pad)
    }

    /// Render as a standalone SVG document
    pub fn render_svg(&self, width: u32, height: u32) -> Result<String> {
        let mut svg = String::new();
        self.draw(SVGBackend::with_string(&mut svg, (width, height)))
            .map_err(|e| TrainerError::Chart(e.to_string()))?;
        Ok(svg)
    }

    fn draw(&self, backend: SVGBackend) -> std::result::Result<(), DrawingAreaErrorKind<std::io::Error>> {
        let root = backend.into_drawing_area();
        root.fill(&WHITE)?;

        let x_max = (self.prices.len().max(2) - 1) as f64;
        let (y_min, y_max) = self.y_range();

        let mut chart = ChartBuilder::on(&root)
            .caption(self.title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..x_max, y_min..y_max)?;

        chart.configure_mesh().x_labels(self.prices.len()).draw()?;

        // Bands go first so the price line stays on top
        for overlay in &self.overlays {
            if let Overlay::Band {
                label,
                x_start,
                x_end,
                color,
                opacity,
            } = overlay
            {
                let fill = color.rgb().mix(*opacity);
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(*x_start, y_min), (*x_end, y_max)],
                        fill.filled(),
                    )))?
                    .label(*label)
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill.filled()));
            }
        }

        chart
            .draw_series(LineSeries::new(
                self.prices.iter().enumerate().map(|(i, p)| (i as f64, *p)),
                PRICE_COLOR.stroke_width(2),
            ))?
            .label("Price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], PRICE_COLOR.stroke_width(2)));

        for overlay in &self.overlays {
            if let Overlay::Level { label, price, color } = overlay {
                let rgb = color.rgb();
                chart
                    .draw_series(dashes(0.0, x_max, *price).map(|segment| {
                        PathElement::new(segment, rgb.stroke_width(2))
                    }))?
                    .label(*label)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], rgb.stroke_width(2)));
            }
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

/// Dash segments of a horizontal line at `y` between `from` and `to`
fn dashes(from: f64, to: f64, y: f64) -> impl Iterator<Item = Vec<(f64, f64)>> {
    const DASH: f64 = 0.2;
    const GAP: f64 = 0.12;
    let count = ((to - from) / (DASH + GAP)).ceil() as usize;
    (0..count).map(move |i| {
        let start = from + i as f64 * (DASH + GAP);
        let end = (start + DASH).min(to);
        vec![(start, y), (end, y)]
    })
}
