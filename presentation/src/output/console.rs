//! Console output formatter for chat replies

use colored::Colorize;
use dbchat_application::{AnalysisAnswer, QueryAnswer, Reply};
use dbchat_domain::{
    AnalysisReport, BarChart, COMMAND_HELP, ConversationEntry, CorrelationMatrix,
    CorrelationStrength, DatasetSummary, QueryResult, Role, SchemaCache, Session, percentage_of,
    scaled_width,
};

/// Widest a table cell is drawn before it is cut
const MAX_CELL_WIDTH: usize = 40;

/// Width of a full bar in a chart
const BAR_WIDTH: usize = 40;

/// Widest a bar label is drawn
const MAX_LABEL_WIDTH: usize = 20;

/// Formats chat replies for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render a reply; `None` when there is nothing to print
    pub fn format(reply: &Reply) -> Option<String> {
        let text = match reply {
            Reply::Nothing => return None,
            Reply::Connected(session) => Self::format_connected(session),
            Reply::Answer(answer) => Self::format_answer(answer),
            Reply::Analysis(answer) => Self::format_analysis(answer),
            Reply::Message(text) => text.clone(),
            Reply::Schema(schema) => Self::format_schema(schema),
            Reply::SessionInfo(session) => Self::format_session(session.as_ref()),
            Reply::History(entries) => Self::format_history(entries),
            Reply::Help => Self::format_help(),
            Reply::Exported { path, entries } => format!(
                "{} Exported {} entries to {}",
                "v".green(),
                entries,
                path.display()
            ),
            Reply::Cleared => format!("{} Conversation history cleared.", "v".green()),
            Reply::Notice(text) => text.yellow().to_string(),
            Reply::Error(message) => format!("{} {}", "Error:".red().bold(), message),
            Reply::Exit => "Goodbye!".to_string(),
        };
        Some(text)
    }

    /// Banner printed when the REPL starts
    pub fn welcome(model: &str) -> String {
        let mut output = String::new();
        output.push('\n');
        output.push_str("╭─────────────────────────────────────────────╮\n");
        output.push_str("│           dbchat - Database Chat            │\n");
        output.push_str("╰─────────────────────────────────────────────╯\n");
        output.push('\n');
        output.push_str(&format!("{} {}\n\n", "Model:".cyan().bold(), model));
        output.push_str("Connect with /connect <uri>, then ask questions in plain language.\n");
        output.push_str("Type /help for all commands, /exit or Ctrl-D to quit.\n");
        output
    }

    pub fn format_connected(session: &Session) -> String {
        let uri = session
            .connection_uri()
            .map(|u| u.redacted())
            .unwrap_or_default();
        let mut output = format!(
            "{} Connected to {} database: {}\n",
            "v".green(),
            session.db_kind().to_string().bold(),
            uri
        );

        let names = session.schema_cache().table_names();
        if names.is_empty() {
            output.push_str("No tables found.\n");
        } else {
            output.push_str(&format!(
                "{} {}\n",
                format!("Tables ({}):", names.len()).cyan().bold(),
                names.join(", ")
            ));
        }

        if let Some(snippet) = session.connection_snippet() {
            output.push_str(&Self::section_header("Connection snippet"));
            output.push_str(&Self::indent(snippet, "  "));
            output.push('\n');
        }
        output
    }

    pub fn format_answer(answer: &QueryAnswer) -> String {
        let mut output = String::new();
        if let Some(summary) = &answer.summary {
            output.push_str(summary);
            output.push_str("\n\n");
        }
        output.push_str(&format!(
            "{} {}\n",
            "SQL:".dimmed(),
            answer.statement.dimmed()
        ));
        output.push('\n');
        output.push_str(&Self::format_table(&answer.result));
        if answer.steps > 1 {
            output.push_str(&format!(
                "\n{}\n",
                format!("(answered after {} attempts)", answer.steps).dimmed()
            ));
        }
        output
    }

    /// Render a result as an aligned text table
    pub fn format_table(result: &QueryResult) -> String {
        if let Some(affected) = result.rows_affected {
            return format!("{} row(s) affected\n", affected);
        }
        if result.columns.is_empty() {
            return "(no columns)\n".to_string();
        }

        let cells: Vec<Vec<String>> = result
            .rows
            .iter()
            .map(|row| row.iter().map(|c| clip(&c.to_string(), MAX_CELL_WIDTH)).collect())
            .collect();
        let headers: Vec<String> = result
            .columns
            .iter()
            .map(|c| clip(c, MAX_CELL_WIDTH))
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let mut output = String::new();
        let header_line = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(h, *w))
            .collect::<Vec<_>>()
            .join(" | ");
        output.push_str(&format!(" {}\n", header_line.bold()));
        let rule = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-");
        output.push_str(&format!("-{}-\n", rule));

        for row in &cells {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| pad(c, *w))
                .collect::<Vec<_>>()
                .join(" | ");
            output.push_str(&format!(" {}\n", line));
        }

        let count = result.row_count();
        let noun = if count == 1 { "row" } else { "rows" };
        if result.truncated {
            output.push_str(&format!(
                "{}\n",
                format!("({} {}, truncated)", count, noun).dimmed()
            ));
        } else {
            output.push_str(&format!("{}\n", format!("({} {})", count, noun).dimmed()));
        }
        output
    }

    pub fn format_analysis(answer: &AnalysisAnswer) -> String {
        let mut output = Self::header(&answer.report.title);
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "SQL:".dimmed(),
            answer.statement.dimmed()
        ));
        output.push_str(&Self::format_report(&answer.report));
        output.push_str(&Self::footer());
        output
    }

    /// Render the sections present in a report
    pub fn format_report(report: &AnalysisReport) -> String {
        let mut output = String::new();

        if let Some(summary) = &report.summary {
            output.push_str(&Self::format_summary(summary));
        }
        if let Some(table) = &report.table {
            output.push_str(&Self::section_header("Data"));
            output.push_str(&Self::format_table(table));
        }
        for chart in &report.charts {
            output.push_str(&Self::format_bar_chart(chart));
        }
        if let Some(matrix) = &report.correlation {
            output.push_str(&Self::format_correlation(matrix));
        }
        if !report.notes.is_empty() {
            output.push('\n');
            for note in &report.notes {
                output.push_str(&format!("  * {}\n", note));
            }
        }
        output
    }

    pub fn format_summary(summary: &DatasetSummary) -> String {
        let mut output = Self::section_header("Summary");
        output.push_str(&format!("Total records: {}\n", summary.total_records));
        output.push_str(&format!(
            "Columns: {} ({} numeric, {} text)\n",
            summary.column_count, summary.numeric_column_count, summary.text_column_count
        ));

        if !summary.numeric.is_empty() {
            output.push_str(&format!("\n{}\n", "Numeric columns:".cyan().bold()));
            for stats in &summary.numeric {
                output.push_str(&format!(
                    "  {}: count {}, mean {:.2}, min {:.2}, max {:.2}\n",
                    stats.name.bold(),
                    stats.count,
                    stats.mean,
                    stats.min,
                    stats.max
                ));
            }
        }
        if !summary.text.is_empty() {
            output.push_str(&format!("\n{}\n", "Text columns:".cyan().bold()));
            for stats in &summary.text {
                output.push_str(&format!(
                    "  {}: {} unique values\n",
                    stats.name.bold(),
                    stats.unique
                ));
            }
        }
        output
    }

    /// Horizontal bars scaled against the largest value
    pub fn format_bar_chart(chart: &BarChart) -> String {
        let mut output = Self::section_header(&chart.title);
        if chart.is_empty() {
            output.push_str("No data available\n");
            return output;
        }

        let max = chart.max_value();
        let label_width = chart
            .bars
            .iter()
            .map(|b| b.label.chars().count().min(MAX_LABEL_WIDTH))
            .max()
            .unwrap_or(0);

        for bar in &chart.bars {
            let label = pad(&clip(&bar.label, MAX_LABEL_WIDTH), label_width);
            let width = scaled_width(bar.value, max, BAR_WIDTH);
            output.push_str(&format!(
                "  {} | {} {} ({:.1}%)\n",
                label,
                pad(&"#".repeat(width), BAR_WIDTH).green(),
                format_number(bar.value),
                percentage_of(bar.value, max)
            ));
        }
        output
    }

    pub fn format_correlation(matrix: &CorrelationMatrix) -> String {
        let mut output = Self::section_header("Correlation matrix");
        let name_width = matrix
            .columns
            .iter()
            .map(|c| c.chars().count().min(MAX_LABEL_WIDTH))
            .max()
            .unwrap_or(0)
            .max(7);

        output.push_str(&" ".repeat(name_width + 2));
        for column in &matrix.columns {
            output.push_str(&format!(" {:>8}", clip(column, 8)));
        }
        output.push('\n');

        for (i, row) in matrix.values.iter().enumerate() {
            let name = matrix.columns.get(i).map(String::as_str).unwrap_or("");
            output.push_str(&format!("  {}", pad(&clip(name, MAX_LABEL_WIDTH), name_width)));
            for value in row {
                let cell = match value {
                    Some(v) => format!("{:>8.2}", v),
                    None => format!("{:>8}", "n/a"),
                };
                output.push_str(&format!(" {}", cell));
            }
            output.push('\n');
        }

        let mut notable = Vec::new();
        for (i, row) in matrix.values.iter().enumerate() {
            for (j, value) in row.iter().enumerate().skip(i + 1) {
                if let Some(v) = value {
                    let strength = CorrelationStrength::of(*v);
                    if strength != CorrelationStrength::Weak {
                        notable.push((i, j, *v, strength));
                    }
                }
            }
        }
        if !notable.is_empty() {
            output.push_str(&format!("\n{}\n", "Notable relationships:".cyan().bold()));
            for (i, j, v, strength) in notable {
                let label = match strength {
                    CorrelationStrength::Strong => "strong".red().bold(),
                    CorrelationStrength::Moderate => "moderate".yellow(),
                    CorrelationStrength::Weak => "weak".normal(),
                };
                let direction = if v >= 0.0 { "positive" } else { "negative" };
                output.push_str(&format!(
                    "  {} / {}: {:.2} ({} {})\n",
                    matrix.columns[i], matrix.columns[j], v, label, direction
                ));
            }
        }
        output
    }

    pub fn format_schema(schema: &SchemaCache) -> String {
        if schema.is_empty() {
            return "No tables found.".to_string();
        }
        let mut output = format!("{}\n", format!("Tables ({}):", schema.len()).cyan().bold());
        for (table, columns) in schema.tables() {
            output.push_str(&format!("\n  {}\n", table.bold()));
            for column in columns {
                let mut flags = Vec::new();
                if column.primary_key {
                    flags.push("PK");
                }
                if !column.nullable {
                    flags.push("NOT NULL");
                }
                let flags = if flags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", flags.join(", "))
                };
                output.push_str(&format!(
                    "    - {} {}{}\n",
                    column.name,
                    column.data_type.dimmed(),
                    flags
                ));
            }
        }
        output
    }

    pub fn format_session(session: Option<&Session>) -> String {
        let Some(session) = session.filter(|s| s.is_connected()) else {
            return "No active database session".yellow().to_string();
        };

        let mut output = Self::section_header("Session");
        let uri = session
            .connection_uri()
            .map(|u| u.redacted())
            .unwrap_or_default();
        output.push_str(&format!("{} {}\n", "URI:".cyan().bold(), uri));
        output.push_str(&format!("{} {}\n", "Type:".cyan().bold(), session.db_kind()));
        if let Some(at) = session.connected_at() {
            output.push_str(&format!(
                "{} {}\n",
                "Connected at:".cyan().bold(),
                at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
            ));
        }
        output.push_str(&format!(
            "{} {}\n",
            "Tables:".cyan().bold(),
            session.schema_cache().len()
        ));
        if let Some(snippet) = session.connection_snippet() {
            output.push_str(&format!("\n{}\n", "Connection snippet:".cyan().bold()));
            output.push_str(&Self::indent(snippet, "  "));
            output.push('\n');
        }
        output
    }

    pub fn format_history(entries: &[ConversationEntry]) -> String {
        if entries.is_empty() {
            return "No conversation history yet.".to_string();
        }
        let mut output = Self::section_header(&format!("History (last {})", entries.len()));
        for entry in entries {
            let title = match entry.role() {
                Role::User => entry.role().title().cyan().bold(),
                Role::Assistant => entry.role().title().green().bold(),
                Role::System => entry.role().title().normal(),
                Role::Error => entry.role().title().red().bold(),
            };
            output.push_str(&format!(
                "[{}] {}: {}\n",
                entry.timestamp().format("%H:%M:%S"),
                title,
                first_line(entry.content())
            ));
        }
        output
    }

    pub fn format_help() -> String {
        let mut output = format!("{}\n", "Commands:".cyan().bold());
        let width = COMMAND_HELP
            .iter()
            .map(|(usage, _)| usage.chars().count())
            .max()
            .unwrap_or(0);
        for (usage, description) in COMMAND_HELP {
            output.push_str(&format!("  {}  {}\n", pad(usage, width), description));
        }
        output.push_str("\nAnything without a leading / is routed to the best-fitting command.\n");
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

fn clip(text: &str, max: usize) -> String {
    let text = first_line(text);
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}
