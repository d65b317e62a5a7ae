//! Read-only projections of the room store.
//!
//! Projections are pure functions of a snapshot. [`Projector`] keeps the
//! latest table and charts current by observing the store.

pub mod chart;
pub mod table;

use tracing::trace;

pub use chart::{project_charts, BarChart, ChartCategory, ChartView};
pub use table::{project_table, room_columns, Column, ColumnKey, TableBody, TableRow, TableView};

use crate::config::Config;
use crate::store::{Snapshot, SnapshotObserver};

/// Placeholder shown for empty cells and missing bars.
pub const DEFAULT_PLACEHOLDER: &str = "-";

/// Message shown when no rooms are recorded.
pub const DEFAULT_EMPTY_MESSAGE: &str = "Nenhum cômodo cadastrado";

/// Table rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// Text for empty cells.
    pub placeholder: String,
    /// Text for the empty state.
    pub empty_message: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
        }
    }
}

/// Chart rendering options.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    /// Fixed axis of the signal chart, in dBm.
    pub signal_domain: (f64, f64),
    /// Length of a full-scale bar in characters.
    pub bar_width: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            signal_domain: (-90.0, 0.0),
            bar_width: 40,
        }
    }
}

/// Keeps the table and chart projections in step with the store.
///
/// Re-projects only when the store's contents changed, not on every
/// snapshot.
#[derive(Debug)]
pub struct Projector {
    columns: Vec<Column>,
    table_options: TableOptions,
    chart_options: ChartOptions,
    fingerprint: Option<String>,
    table: TableView,
    charts: ChartView,
    projections: u64,
}

impl Projector {
    /// Create a projector with the given options, showing an empty store.
    #[must_use]
    pub fn new(table_options: TableOptions, chart_options: ChartOptions) -> Self {
        let columns = room_columns();
        let table = project_table(&[], &columns, &table_options);
        let charts = project_charts(&[], &chart_options);
        Self {
            columns,
            table_options,
            chart_options,
            fingerprint: None,
            table,
            charts,
            projections: 0,
        }
    }

    /// Create a projector configured from `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.table_options(), config.chart_options())
    }

    /// The current table.
    #[must_use]
    pub fn table(&self) -> &TableView {
        &self.table
    }

    /// The current charts.
    #[must_use]
    pub fn charts(&self) -> &ChartView {
        &self.charts
    }

    /// Table rendering options.
    #[must_use]
    pub fn table_options(&self) -> &TableOptions {
        &self.table_options
    }

    /// Chart rendering options.
    #[must_use]
    pub fn chart_options(&self) -> &ChartOptions {
        &self.chart_options
    }

    /// How many times the projections were rebuilt.
    #[must_use]
    pub fn projections(&self) -> u64 {
        self.projections
    }

    /// Rendered table text.
    #[must_use]
    pub fn render_table(&self) -> String {
        self.table.render()
    }

    /// Rendered chart text.
    #[must_use]
    pub fn render_charts(&self) -> String {
        self.charts
            .render(self.chart_options.bar_width, &self.table_options.placeholder)
    }
}

impl SnapshotObserver for Projector {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        let fingerprint = snapshot.fingerprint();
        if self.fingerprint.as_deref() == Some(fingerprint.as_str()) {
            trace!(revision = snapshot.revision(), "Contents unchanged, keeping projections");
            return;
        }
        self.table = project_table(snapshot.rooms(), &self.columns, &self.table_options);
        self.charts = project_charts(snapshot.rooms(), &self.chart_options);
        self.fingerprint = Some(fingerprint);
        self.projections += 1;
        trace!(revision = snapshot.revision(), "Projections rebuilt");
    }
}
