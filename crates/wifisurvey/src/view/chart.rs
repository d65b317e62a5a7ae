//! Grouped bar chart projections of the room store.
//!
//! Each room becomes one category, keyed by its label, with one bar per band.
//! Rooms sharing a label stay separate categories.

use serde::Serialize;

use super::ChartOptions;
use crate::room::{Field, Room};

/// One room's bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartCategory {
    /// Room label.
    pub name: String,
    /// One value per series; `None` when empty or not a number.
    pub values: Vec<Option<f64>>,
}

/// A grouped bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    /// Chart title.
    pub title: String,
    /// Fields plotted, one bar per category each.
    pub series: Vec<Field>,
    /// Fixed value axis, if the chart is clamped.
    pub domain: Option<(f64, f64)>,
    /// Categories in store order.
    pub categories: Vec<ChartCategory>,
}

/// Both survey charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    /// Signal levels per band, on a fixed dBm axis.
    pub signal: BarChart,
    /// Throughput per band, on an axis fitted to the data.
    pub speed: BarChart,
}

/// Project `rooms` onto a chart of `series`.
#[must_use]
pub fn project_chart(
    title: &str,
    rooms: &[Room],
    series: &[Field],
    domain: Option<(f64, f64)>,
) -> BarChart {
    BarChart {
        title: title.to_string(),
        series: series.to_vec(),
        domain,
        categories: rooms
            .iter()
            .map(|room| ChartCategory {
                name: room.room.clone(),
                values: series.iter().map(|&field| room.numeric(field)).collect(),
            })
            .collect(),
    }
}

/// Project `rooms` onto the signal and speed charts.
#[must_use]
pub fn project_charts(rooms: &[Room], options: &ChartOptions) -> ChartView {
    ChartView {
        signal: project_chart(
            "Nível de sinal (dbm)",
            rooms,
            &[Field::SignalLevel24, Field::SignalLevel5],
            Some(options.signal_domain),
        ),
        speed: project_chart(
            "Velocidade (Mbps)",
            rooms,
            &[Field::Speed24, Field::Speed5],
            None,
        ),
    }
}

impl BarChart {
    /// The value axis: the fixed domain, or one spanning zero and every value.
    #[must_use]
    pub fn axis(&self) -> (f64, f64) {
        if let Some(domain) = self.domain {
            return domain;
        }
        self.categories
            .iter()
            .flat_map(|category| category.values.iter().flatten())
            .fold((0.0_f64, 0.0_f64), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Length in characters of the bar for `value`, out of `width`.
    ///
    /// Bars grow from zero (or the nearest axis end) and are clamped to the
    /// axis.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn bar_len(&self, value: f64, width: usize) -> usize {
        let (lo, hi) = self.axis();
        let span = hi - lo;
        if span.is_nan() || span <= 0.0 {
            return 0;
        }
        let base = 0.0_f64.clamp(lo, hi);
        let value = value.clamp(lo, hi);
        ((value - base).abs() / span * width as f64).round() as usize
    }

    /// Render as horizontal text bars, one block per category.
    #[must_use]
    pub fn render(&self, width: usize, placeholder: &str) -> String {
        let (lo, hi) = self.axis();
        let mut out = format!("{}  [{lo}, {hi}]\n", self.title);

        if self.categories.is_empty() {
            out.push_str("  (sem dados)\n");
            return out;
        }

        let label_width = self
            .series
            .iter()
            .map(|field| field.label().chars().count())
            .max()
            .unwrap_or(0);

        for category in &self.categories {
            out.push_str(&category.name);
            out.push('\n');
            for (field, value) in self.series.iter().zip(&category.values) {
                let label = field.label();
                match value {
                    Some(v) => {
                        let bar = "█".repeat(self.bar_len(*v, width));
                        out.push_str(&format!("  {label:<label_width$} {bar} {v}\n"));
                    }
                    None => out.push_str(&format!("  {label:<label_width$} {placeholder}\n")),
                }
            }
        }
        out
    }
}

impl ChartView {
    /// Render both charts one after the other.
    #[must_use]
    pub fn render(&self, width: usize, placeholder: &str) -> String {
        format!(
            "{}\n{}",
            self.signal.render(width, placeholder),
            self.speed.render(width, placeholder)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormData, SubmissionHandler};

    fn room(name: &str, s24: &str, s5: &str, v24: &str, v5: &str) -> Room {
        let form = FormData::from_iter([
            ("room", name),
            ("signalLevel24", s24),
            ("signalLevel5", s5),
            ("speed24", v24),
            ("speed5", v5),
        ]);
        SubmissionHandler::new(crate::room::RequiredPolicy::PrimaryBand)
            .handle(&form, None)
            .unwrap()
            .room
    }

    #[test]
    fn test_single_room_charts() {
        let rooms = vec![room("Sala", "-40", "-55", "100", "50")];
        let view = project_charts(&rooms, &ChartOptions::default());

        assert_eq!(view.signal.categories.len(), 1);
        assert_eq!(view.signal.categories[0].name, "Sala");
        assert_eq!(
            view.signal.categories[0].values,
            vec![Some(-40.0), Some(-55.0)]
        );
        assert_eq!(
            view.speed.categories[0].values,
            vec![Some(100.0), Some(50.0)]
        );
        assert_eq!(view.signal.domain, Some((-90.0, 0.0)));
        assert_eq!(view.speed.domain, None);
    }

    #[test]
    fn test_duplicate_labels_not_aggregated() {
        let rooms = vec![
            room("Sala", "-40", "-55", "100", "50"),
            room("Sala", "-60", "-70", "20", "10"),
        ];
        let view = project_charts(&rooms, &ChartOptions::default());

        assert_eq!(view.signal.categories.len(), 2);
        assert_eq!(view.speed.categories[1].values, vec![Some(20.0), Some(10.0)]);
    }

    #[test]
    fn test_missing_values_are_gaps() {
        let rooms = vec![room("Quarto", "-50", "", "80", "n/a")];
        let view = project_charts(&rooms, &ChartOptions::default());

        assert_eq!(view.signal.categories[0].values, vec![Some(-50.0), None]);
        assert_eq!(view.speed.categories[0].values, vec![Some(80.0), None]);
    }

    #[test]
    fn test_speed_axis_fits_data() {
        let rooms = vec![
            room("Sala", "-40", "-55", "100", "50"),
            room("Quarto", "-60", "-70", "300", "10"),
        ];
        let view = project_charts(&rooms, &ChartOptions::default());
        assert_eq!(view.speed.axis(), (0.0, 300.0));
        assert_eq!(view.signal.axis(), (-90.0, 0.0));
    }

    #[test]
    fn test_signal_bars_clamped() {
        let rooms = vec![room("Garagem", "-120", "-45", "1", "1")];
        let chart = project_charts(&rooms, &ChartOptions::default()).signal;

        assert_eq!(chart.bar_len(-120.0, 30), 30);
        assert_eq!(chart.bar_len(-45.0, 30), 15);
        assert_eq!(chart.bar_len(10.0, 30), 0);
    }

    #[test]
    fn test_empty_axis_has_no_bars() {
        let chart = project_chart("Velocidade (Mbps)", &[], &[Field::Speed24], None);
        assert_eq!(chart.axis(), (0.0, 0.0));
        assert_eq!(chart.bar_len(5.0, 40), 0);
        assert!(chart.render(40, "-").contains("sem dados"));
    }

    #[test]
    fn test_nan_domain_has_no_bars() {
        let options = ChartOptions {
            signal_domain: (f64::NAN, 0.0),
            ..ChartOptions::default()
        };
        let rooms = vec![room("Sala", "-40", "-55", "100", "50")];
        let chart = project_charts(&rooms, &options).signal;

        assert_eq!(chart.bar_len(-40.0, 30), 0);
        assert!(chart.render(30, "-").contains("Sala"));
    }

    #[test]
    fn test_render() {
        let rooms = vec![room("Sala", "-40", "", "100", "50")];
        let text = project_charts(&rooms, &ChartOptions::default()).render(10, "-");

        assert!(text.contains("Nível de sinal (dbm)  [-90, 0]"));
        assert!(text.contains("Sala"));
        assert!(text.contains("-40"));
        assert!(text
            .lines()
            .any(|line| line.contains("Nível de sinal (dbm) 5GHz") && line.ends_with(" -")));
        assert!(text.contains(&format!("{} 100", "█".repeat(10))));
    }

    #[test]
    fn test_projection_is_idempotent() {
        let rooms = vec![room("Sala", "-40", "-55", "100", "50")];
        let options = ChartOptions::default();
        assert_eq!(
            project_charts(&rooms, &options),
            project_charts(&rooms, &options)
        );
    }
}
