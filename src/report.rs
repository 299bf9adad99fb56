use std::fmt::{self, Write};

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::Table;
use serde_json::json;

use crate::lookup::Outcome;
use crate::models::{columns, Condition, StudentRecord};

pub const TITLE: &str = "Grade lookup - Legal Framework of Digital Business";
pub const CREDITS: &str =
    "Application built for the Legal Framework of Digital Business course";

pub const PROMPT_NOTICE: &str = "Enter your ID number or email to see your grade.";
pub const NOT_FOUND_NOTICE: &str = "No results were found for the ID or email entered.";

/// Store column to display label. Column order of the rendered table.
pub const COLUMN_LABELS: [(&str, &str); 8] = [
    (columns::NAME, "Name"),
    (columns::ID, "ID"),
    (columns::EMAIL, "Email"),
    (columns::APPROVED, "Approved activities"),
    (columns::CONCEPT, "Concept grade (40%)"),
    (columns::PARTIAL, "Partial grade (60%)"),
    (columns::FINAL, "Final grade"),
    (columns::CONDITION, "Condition"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Info,
    Error,
}

impl fmt::Display for BannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BannerKind::Success => write!(f, "success"),
            BannerKind::Info => write!(f, "info"),
            BannerKind::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

fn template(condition: Condition) -> Option<(BannerKind, &'static str)> {
    match condition {
        Condition::Promoted => Some((
            BannerKind::Success,
            "Congratulations, {name}! You passed the course by promotion! 🎉",
        )),
        Condition::RegularPendingFinal => Some((
            BannerKind::Info,
            "Hi, {name}! We'll see you at the final exam 💪. \
             Ask us anything you need 🤗",
        )),
        Condition::Failed => Some((
            BannerKind::Error,
            "Hi, {name}! Unfortunately you did not reach the minimum objectives to stay regular. \
             Don't give up! We'll see you next term to try again with everything 💪.",
        )),
        Condition::Unknown => None,
    }
}

pub fn status_banner(record: &StudentRecord) -> Option<Banner> {
    template(record.condition).map(|(kind, text)| Banner {
        kind,
        message: text.replace("{name}", &record.name),
    })
}

pub fn build_table(records: &[StudentRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(COLUMN_LABELS.iter().map(|(_, label)| *label));

    for record in records {
        table.add_row(vec![
            record.name.clone(),
            record.id.clone(),
            record.email.clone(),
            display_value(record.approved_activities),
            display_value(record.concept_grade),
            display_value(record.partial_grade),
            display_value(record.final_grade),
            record.condition_label.clone(),
        ]);
    }

    table
}

pub fn render(outcome: &Outcome) -> String {
    let mut output = String::new();

    match outcome {
        Outcome::Prompt => {
            let _ = writeln!(output, "{PROMPT_NOTICE}");
        }
        Outcome::Found(records) => {
            let _ = writeln!(output, "Your grade:");
            let _ = writeln!(output, "{}", build_table(records));

            if let Some(banner) = records.first().and_then(status_banner) {
                let _ = writeln!(output);
                let _ = writeln!(output, "[{}] {}", banner.kind, banner.message);
            }
        }
        Outcome::NotFound => {
            let _ = writeln!(output, "{NOT_FOUND_NOTICE}");
        }
        Outcome::Error(message) => {
            let _ = writeln!(output, "Error querying the grade store: {message}");
            let _ = writeln!(output, "{NOT_FOUND_NOTICE}");
        }
    }

    output
}

pub fn render_json(outcome: &Outcome) -> serde_json::Result<String> {
    let value = match outcome {
        Outcome::Prompt => json!({ "status": "prompt", "message": PROMPT_NOTICE }),
        Outcome::Found(records) => {
            let banner = records.first().and_then(status_banner).map(|banner| {
                json!({ "kind": banner.kind.to_string(), "message": banner.message })
            });
            json!({ "status": "found", "records": records, "banner": banner })
        }
        Outcome::NotFound => json!({ "status": "not_found", "message": NOT_FOUND_NOTICE }),
        Outcome::Error(message) => json!({
            "status": "error",
            "error": message,
            "message": NOT_FOUND_NOTICE,
        }),
    };

    serde_json::to_string_pretty(&value)
}

pub fn header() -> String {
    format!("{TITLE}\n{}", "-".repeat(TITLE.chars().count()))
}

pub fn footer() -> String {
    format!("{}\n{CREDITS}", "-".repeat(CREDITS.chars().count()))
}

fn display_value<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
