use serde::{Deserialize, Serialize};

/// Column names of the hosted grade table.
pub mod columns {
    pub const NAME: &str = "Nombre";
    pub const ID: &str = "Número de ID";
    pub const EMAIL: &str = "Dirección de correo";
    pub const APPROVED: &str = "Cantidad de actividades aprobadas";
    pub const CONCEPT: &str = "Nota de concepto (40% promedio de actividades)";
    pub const PARTIAL: &str = "Nota de parciales (60% promedio de parciales)";
    pub const FINAL: &str = "Nota final";
    pub const CONDITION: &str = "Condición";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub approved_activities: Option<i64>,
    pub concept_grade: Option<f64>,
    pub partial_grade: Option<f64>,
    pub final_grade: Option<f64>,
    /// Status exactly as stored.
    #[serde(rename = "condition")]
    pub condition_label: String,
    #[serde(skip)]
    pub condition: Condition,
}

/// Term outcome stored in the `Condición` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Promoted,
    RegularPendingFinal,
    Failed,
    Unknown,
}

impl Condition {
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace('–', "-");

        match normalized.as_str() {
            "promoción" | "promocion" | "promoted" => Condition::Promoted,
            "regular - a examen final" | "regular - pending final exam" => {
                Condition::RegularPendingFinal
            }
            "desaprobado" | "failed" => Condition::Failed,
            _ => Condition::Unknown,
        }
    }
}

/// One row of the grade table with every cell as text, as read from
/// Postgres (aliased columns) or from a CSV export (original headers).
#[derive(Debug, Default, Deserialize, sqlx::FromRow)]
pub struct GradeRow {
    #[serde(rename = "Nombre")]
    pub name: Option<String>,
    #[serde(rename = "Número de ID")]
    pub id: Option<String>,
    #[serde(rename = "Dirección de correo")]
    pub email: Option<String>,
    #[serde(rename = "Cantidad de actividades aprobadas")]
    pub approved_activities: Option<String>,
    #[serde(rename = "Nota de concepto (40% promedio de actividades)")]
    pub concept_grade: Option<String>,
    #[serde(rename = "Nota de parciales (60% promedio de parciales)")]
    pub partial_grade: Option<String>,
    #[serde(rename = "Nota final")]
    pub final_grade: Option<String>,
    #[serde(rename = "Condición")]
    pub condition: Option<String>,
}

impl GradeRow {
    pub fn into_record(self) -> StudentRecord {
        let condition_label = trimmed(self.condition);

        StudentRecord {
            id: trimmed(self.id),
            email: trimmed(self.email),
            name: trimmed(self.name),
            approved_activities: self.approved_activities.as_deref().and_then(parse_count),
            concept_grade: self.concept_grade.as_deref().and_then(parse_grade),
            partial_grade: self.partial_grade.as_deref().and_then(parse_grade),
            final_grade: self.final_grade.as_deref().and_then(parse_grade),
            condition: Condition::parse(&condition_label),
            condition_label,
        }
    }
}

fn trimmed(cell: Option<String>) -> String {
    cell.map(|value| value.trim().to_string()).unwrap_or_default()
}

/// Blank or non-numeric cells are `None`. Spreadsheet exports use a decimal comma.
pub fn parse_grade(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

pub fn parse_count(raw: &str) -> Option<i64> {
    if let Ok(count) = raw.trim().parse::<i64>() {
        return Some(count);
    }

    parse_grade(raw)
        .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
        .map(|n| n as i64)
}
