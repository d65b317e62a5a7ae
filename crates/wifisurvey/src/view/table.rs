//! Table projection of the room store.

use serde::Serialize;

use super::TableOptions;
use crate::room::{Field, Room, RoomId};

/// What a column shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "field")]
pub enum ColumnKey {
    /// A record field.
    Field(Field),
    /// Per-row actions, addressed by the row's record id.
    Actions,
}

/// Describes one table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column content.
    pub key: ColumnKey,
    /// Header text.
    pub header: String,
    /// Fixed width in characters, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
}

impl Column {
    /// A column showing `field`, headed by its label.
    #[must_use]
    pub fn field(field: Field) -> Self {
        Self {
            key: ColumnKey::Field(field),
            header: field.label().to_string(),
            width: None,
        }
    }

    /// The trailing actions column.
    #[must_use]
    pub fn actions() -> Self {
        Self {
            key: ColumnKey::Actions,
            header: String::new(),
            width: None,
        }
    }

    /// Set a fixed width.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }
}

/// The column layout of the rooms table.
#[must_use]
pub fn room_columns() -> Vec<Column> {
    vec![
        Column::field(Field::Room),
        Column::field(Field::SignalLevel24),
        Column::field(Field::SignalLevel5),
        Column::field(Field::Speed24),
        Column::field(Field::Speed5),
        Column::field(Field::Interference).with_width(20),
        Column::actions(),
    ]
}

/// One rendered record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// The record shown.
    pub id: RoomId,
    /// Cell text, one per column.
    pub cells: Vec<String>,
}

/// Table content below the headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableBody {
    /// One row per record.
    Rows(Vec<TableRow>),
    /// No records: a single message spanning all columns.
    Empty {
        /// The message.
        message: String,
        /// Number of columns spanned.
        span: usize,
    },
}

/// A projected table, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    /// Column descriptors.
    pub columns: Vec<Column>,
    /// Rows or the empty state.
    pub body: TableBody,
}

/// Project `rooms` onto `columns`.
///
/// Empty values outside the actions column show `options.placeholder`.
#[must_use]
pub fn project_table(rooms: &[Room], columns: &[Column], options: &TableOptions) -> TableView {
    if rooms.is_empty() {
        return TableView {
            columns: columns.to_vec(),
            body: TableBody::Empty {
                message: options.empty_message.clone(),
                span: columns.len(),
            },
        };
    }

    let rows = rooms
        .iter()
        .map(|room| TableRow {
            id: room.id,
            cells: columns
                .iter()
                .map(|column| match column.key {
                    ColumnKey::Actions => room.id.short(),
                    ColumnKey::Field(field) => {
                        let value = room.value(field);
                        if value.is_empty() {
                            options.placeholder.clone()
                        } else {
                            value.to_string()
                        }
                    }
                })
                .collect(),
        })
        .collect();

    TableView {
        columns: columns.to_vec(),
        body: TableBody::Rows(rows),
    }
}

impl TableView {
    /// Whether the table shows the empty state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.body, TableBody::Empty { .. })
    }

    /// Render as aligned plain text.
    #[must_use]
    pub fn render(&self) -> String {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                column.width.unwrap_or_else(|| {
                    let cells = match &self.body {
                        TableBody::Rows(rows) => rows
                            .iter()
                            .map(|row| row.cells[i].chars().count())
                            .max()
                            .unwrap_or(0),
                        TableBody::Empty { .. } => 0,
                    };
                    cells.max(column.header.chars().count())
                })
            })
            .collect();

        let mut out = String::new();
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header.as_str()).collect();
        push_line(&mut out, &headers, &widths);

        let total = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total));
        out.push('\n');

        match &self.body {
            TableBody::Rows(rows) => {
                for row in rows {
                    let cells: Vec<&str> = row.cells.iter().map(String::as_str).collect();
                    push_line(&mut out, &cells, &widths);
                }
            }
            TableBody::Empty { message, .. } => {
                out.push_str(&format!("{message:^total$}"));
                out.push('\n');
            }
        }
        out
    }
}

fn push_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", fit(cell, width)))
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Truncate `text` to `width` characters, marking the cut with `…`.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormData, SubmissionHandler};

    fn room(name: &str, interference: &str) -> Room {
        let form = FormData::from_iter([
            ("room", name),
            ("signalLevel24", "-40"),
            ("signalLevel5", "-55"),
            ("speed24", "100"),
            ("speed5", "50"),
            ("interference", interference),
        ]);
        SubmissionHandler::default().handle(&form, None).unwrap().room
    }

    #[test]
    fn test_room_columns() {
        let columns = room_columns();
        assert_eq!(columns.len(), 7);
        assert_eq!(columns[0].header, "Cômodo");
        assert_eq!(columns[5].width, Some(20));
        assert_eq!(columns[6].key, ColumnKey::Actions);
    }

    #[test]
    fn test_empty_state() {
        let view = project_table(&[], &room_columns(), &TableOptions::default());

        assert!(view.is_empty());
        assert_eq!(
            view.body,
            TableBody::Empty {
                message: "Nenhum cômodo cadastrado".to_string(),
                span: 7,
            }
        );
        assert!(view.render().contains("Nenhum cômodo cadastrado"));
    }

    #[test]
    fn test_placeholder_for_empty_cells() {
        let sala = room("Sala", "");
        let view = project_table(
            std::slice::from_ref(&sala),
            &room_columns(),
            &TableOptions::default(),
        );

        let TableBody::Rows(rows) = &view.body else {
            panic!("expected rows");
        };
        let short = sala.id.short();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].cells,
            vec!["Sala", "-40", "-55", "100", "50", "-", short.as_str()]
        );
    }

    #[test]
    fn test_rows_follow_store_order() {
        let rooms = vec![room("Sala", "micro-ondas"), room("Quarto", "")];
        let view = project_table(&rooms, &room_columns(), &TableOptions::default());

        let TableBody::Rows(rows) = &view.body else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].id, rooms[0].id);
        assert_eq!(rows[1].id, rooms[1].id);
        assert_eq!(rows[0].cells[5], "micro-ondas");
    }

    #[test]
    fn test_projection_is_idempotent() {
        let rooms = vec![room("Sala", "")];
        let options = TableOptions::default();
        let first = project_table(&rooms, &room_columns(), &options);
        let second = project_table(&rooms, &room_columns(), &options);

        assert_eq!(first, second);
        assert_eq!(first.render(), second.render());
    }

    #[test]
    fn test_render_truncates_fixed_width() {
        let long = "vizinho com roteador no mesmo canal";
        let view = project_table(
            &[room("Sala", long)],
            &room_columns(),
            &TableOptions::default(),
        );
        let text = view.render();

        assert!(!text.contains(long));
        assert!(text.contains("vizinho com roteado…"));
    }

    #[test]
    fn test_custom_placeholder() {
        let options = TableOptions {
            placeholder: "n/a".to_string(),
            ..TableOptions::default()
        };
        let view = project_table(&[room("Sala", "")], &room_columns(), &options);
        assert!(view.render().contains("n/a"));
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("abc", 5), "abc");
        assert_eq!(fit("abcdef", 4), "abc…");
    }

    #[test]
    fn test_table_serialize() {
        let view = project_table(&[], &room_columns(), &TableOptions::default());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["body"]["empty"]["span"], 7);
        assert_eq!(json["columns"][6]["key"]["kind"], "actions");
    }
}
