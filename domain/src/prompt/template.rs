//! Prompt templates for the interpreter

use crate::analytics::report::AnalyticsKind;
use crate::session::entities::SessionContext;

/// Templates for each interpreter operation
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for translating a question into a statement
    pub fn translate_system(context: &SessionContext) -> String {
        format!(
            r#"You are an expert database assistant that writes {dialect} statements.
Translate the user's question into a single statement for the {kind} database described below.
Reply with the statement only, inside one fenced code block. Do not explain it.
Use only tables and columns that exist in the schema.

Schema:
{schema}"#,
            dialect = context.db_kind.dialect(),
            kind = context.db_kind.label(),
            schema = context.schema,
        )
    }

    /// User prompt for translation, optionally carrying the previous failed
    /// attempt so the model can correct it
    pub fn translate_prompt(question: &str, previous: Option<(&str, &str)>) -> String {
        let mut prompt = format!("Question: {}", question);
        if let Some((statement, error)) = previous {
            prompt.push_str(&format!(
                r#"

Your previous statement failed.
Statement:
```
{}
```
Error: {}

Write a corrected statement."#,
                statement, error
            ));
        }
        prompt
    }

    /// User prompt for fetching the data behind an analytics request
    pub fn analysis_prompt(request: &str, kind: AnalyticsKind) -> String {
        let shape = match kind {
            AnalyticsKind::Dashboard => {
                "Return a few descriptive columns plus the numeric columns worth charting."
            }
            AnalyticsKind::Summary => "Return the rows needed to compute summary statistics.",
            AnalyticsKind::Table => "Return the rows to display as a table.",
            AnalyticsKind::Correlation => {
                "Return at least two numeric columns whose relationship should be measured."
            }
        };
        format!(
            r#"Analytics request ({kind}): {request}

Write a read-only query that returns the data for this analysis.
{shape}
Limit the result to at most 1000 rows."#,
            kind = kind,
            request = request,
            shape = shape,
        )
    }

    /// System prompt for summarizing a result
    pub fn summarize_system() -> &'static str {
        r#"You are a data analyst. Explain query results to a non-technical user in two or three sentences.
Mention concrete numbers from the result. Do not repeat the query."#
    }

    /// User prompt for summarizing a result
    pub fn summarize_prompt(question: &str, statement: &str, preview: &str) -> String {
        format!(
            r#"Question: {}

Statement:
```
{}
```

Result:
{}"#,
            question, statement, preview
        )
    }

    /// System prompt for casual conversation
    pub fn converse_system(context: &SessionContext) -> String {
        let status = if context.connected {
            format!(
                "The user is connected to the {} database \"{}\" with tables: {}.",
                context.db_kind.label(),
                context.database.as_deref().unwrap_or("unknown"),
                if context.tables.is_empty() {
                    "(none)".to_string()
                } else {
                    context.tables.join(", ")
                }
            )
        } else {
            "The user is not connected to any database yet.".to_string()
        };
        format!(
            r#"You are a friendly assistant inside a command-line database chat tool.
{}
Answer briefly. When the user wants data, suggest the matching command:
/connect <uri>, /query <question>, /analytics <request>, /schema or /help."#,
            status
        )
    }

    /// System prompt for intent classification
    pub fn classify_system() -> &'static str {
        r#"Classify the user's message for a database chat tool.
Reply with exactly one word:
- query: the user asks for data from the connected database
- analyze: the user wants a chart, dashboard, distribution, trend or correlation
- conversation: anything else (greetings, help, general questions)"#
    }

    /// User prompt for intent classification
    pub fn classify_prompt(text: &str, context: &SessionContext) -> String {
        format!(
            "Connected: {}\nTables: {}\n\nMessage: {}",
            if context.connected { "yes" } else { "no" },
            if context.tables.is_empty() {
                "(none)".to_string()
            } else {
                context.tables.join(", ")
            },
            text
        )
    }
}
