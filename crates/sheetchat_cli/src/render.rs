//! Plain-text rendering of history messages.

use indexmap::IndexSet;
use sheetchat_core::{chart, ChartData, Message, Record, Session};

/// Render one message for the terminal.
pub fn render_message(message: &Message) -> String {
    match message {
        Message::User { text } => format!("you: {}", text),
        Message::AssistantText { text } => text.clone(),
        Message::AssistantTable { rows } => render_table(rows),
        Message::AssistantChart(data) => render_chart(data),
        Message::AssistantDownload { table_name } => {
            format!("Download offered: {}", sheetchat_core::export_file_name(table_name))
        }
    }
}

/// One-line summary of the bound session.
pub fn render_session_header(session: &Session) -> String {
    format!(
        "session {} on '{}', bound {}",
        session.id(),
        session.table_name(),
        session.bound_at().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Render the whole history, one block per message.
pub fn render_history(history: &[Message]) -> String {
    history
        .iter()
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_table(rows: &[Record]) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }

    let columns = column_order(rows);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(*c).map(ToString::to_string).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_line(columns.clone())];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &cells {
        lines.push(format_line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

fn render_chart(data: &ChartData) -> String {
    let Some(plan) = data.render_plan() else {
        return "(chart has too few columns)".to_string();
    };

    let mut lines = vec![format!(
        "{} chart: x = {}, series = {}",
        plan.kind,
        plan.x_axis,
        plan.series.join(", ")
    )];
    for column in &plan.series {
        let points = chart::points(&data.series, &plan, column)
            .into_iter()
            .map(|(x, y)| format!("({}, {})", x, y))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("  {}: {}", column, points));
    }
    lines.join("\n")
}

/// Columns in first-seen order across all rows.
fn column_order(rows: &[Record]) -> Vec<&str> {
    rows.iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect::<IndexSet<&str>>()
        .into_iter()
        .collect()
}
