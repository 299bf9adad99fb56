use std::path::Path;

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::QueryError;
use crate::models::{GradeRow, StudentRecord};
use crate::query::{classify, SearchQuery};

/// Exact-match access to the grade table.
#[async_trait]
pub trait StudentLookup: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Vec<StudentRecord>, QueryError>;

    /// `email` is already lowercased; implementations compare case-insensitively.
    async fn find_by_email(&self, email: &str) -> Result<Vec<StudentRecord>, QueryError>;
}

/// Result of one submission. Every submission starts from scratch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Prompt,
    Found(Vec<StudentRecord>),
    NotFound,
    Error(String),
}

pub async fn search(
    lookup: &dyn StudentLookup,
    query: &SearchQuery,
) -> Result<Vec<StudentRecord>, QueryError> {
    match query {
        SearchQuery::Id(id) => lookup.find_by_id(id).await,
        SearchQuery::Email(email) => lookup.find_by_email(email).await,
    }
}

pub async fn submit(lookup: &dyn StudentLookup, raw: &str) -> Outcome {
    if raw.trim().is_empty() {
        return Outcome::Prompt;
    }

    let Some(query) = classify(raw) else {
        info!("Input is neither an ID nor an email, skipping lookup");
        return Outcome::NotFound;
    };

    match search(lookup, &query).await {
        Ok(records) if records.is_empty() => Outcome::NotFound,
        Ok(records) => {
            info!("Lookup returned {} record(s)", records.len());
            Outcome::Found(records)
        }
        Err(e) => {
            error!("Lookup failed: {e}");
            Outcome::Error(e.to_string())
        }
    }
}

/// Grade table held in memory, loaded from a CSV export or built directly.
#[derive(Debug, Clone, Default)]
pub struct MemoryLookup {
    records: Vec<StudentRecord>,
}

impl MemoryLookup {
    pub fn new(records: Vec<StudentRecord>) -> Self {
        Self { records }
    }

    pub fn from_csv(csv_path: &Path) -> Result<Self, QueryError> {
        let mut reader = csv::Reader::from_path(csv_path)?;
        let mut records = Vec::new();

        for result in reader.deserialize::<GradeRow>() {
            records.push(result?.into_record());
        }

        info!(
            "Loaded {} records from {}",
            records.len(),
            csv_path.display()
        );
        Ok(Self::new(records))
    }
}

#[async_trait]
impl StudentLookup for MemoryLookup {
    async fn find_by_id(&self, id: &str) -> Result<Vec<StudentRecord>, QueryError> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.id == id)
            .cloned()
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<StudentRecord>, QueryError> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.email.to_lowercase() == email)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::models::Condition;

    fn sample_record(id: &str, email: &str, condition: &str) -> StudentRecord {
        StudentRecord {
            id: id.to_string(),
            email: email.to_string(),
            name: "Juan Perez".to_string(),
            approved_activities: Some(8),
            concept_grade: Some(8.5),
            partial_grade: Some(7.0),
            final_grade: Some(7.6),
            condition_label: condition.to_string(),
            condition: Condition::parse(condition),
        }
    }

    fn sample_lookup() -> MemoryLookup {
        MemoryLookup::new(vec![
            sample_record("123456", "Perez@Gmail.com", "Promoción"),
            sample_record("654321", "ana@utn.edu.ar", "Desaprobado"),
        ])
    }

    struct FailingLookup;

    #[async_trait]
    impl StudentLookup for FailingLookup {
        async fn find_by_id(&self, _id: &str) -> Result<Vec<StudentRecord>, QueryError> {
            Err(QueryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn find_by_email(&self, _email: &str) -> Result<Vec<StudentRecord>, QueryError> {
            Err(QueryError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[derive(Default)]
    struct CountingLookup {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StudentLookup for CountingLookup {
        async fn find_by_id(&self, _id: &str) -> Result<Vec<StudentRecord>, QueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn find_by_email(&self, _email: &str) -> Result<Vec<StudentRecord>, QueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn finds_by_exact_id() {
        let lookup = sample_lookup();
        match submit(&lookup, " 123456 ").await {
            Outcome::Found(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].id, "123456");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn partial_id_does_not_match() {
        let lookup = sample_lookup();
        assert_eq!(submit(&lookup, "12345").await, Outcome::NotFound);
    }

    #[tokio::test]
    async fn email_match_ignores_case_and_whitespace() {
        let lookup = sample_lookup();
        match submit(&lookup, "  PEREZ@Gmail.com ").await {
            Outcome::Found(records) => assert_eq!(records[0].id, "123456"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_input_prompts_without_lookup() {
        let lookup = CountingLookup::default();
        assert_eq!(submit(&lookup, "   ").await, Outcome::Prompt);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unrecognized_input_issues_no_lookup() {
        let lookup = CountingLookup::default();
        assert_eq!(submit(&lookup, "abc").await, Outcome::NotFound);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn each_submission_issues_exactly_one_query() {
        let lookup = CountingLookup::default();
        assert_eq!(submit(&lookup, "42").await, Outcome::NotFound);
        assert_eq!(submit(&lookup, "a@b.c").await, Outcome::NotFound);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn query_failure_becomes_error_outcome() {
        match submit(&FailingLookup, "123456").await {
            Outcome::Error(message) => assert!(message.contains("Database error")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn loads_csv_export() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "Nombre,Número de ID,Dirección de correo,Cantidad de actividades aprobadas,\
             Nota de concepto (40% promedio de actividades),\
             Nota de parciales (60% promedio de parciales),Nota final,Condición"
        )
        .unwrap();
        writeln!(
            file,
            "Ana Gomez,777,Ana@UTN.edu.ar,9,\"8,5\",7,\"7,6\",Promoción"
        )
        .unwrap();
        writeln!(file, "Luis Diaz,778,luis@utn.edu.ar,,,,,Libre").unwrap();
        file.flush().unwrap();

        let lookup = MemoryLookup::from_csv(file.path()).unwrap();
        assert_eq!(lookup.records.len(), 2);

        let records = lookup.find_by_email("ana@utn.edu.ar").await.unwrap();
        assert_eq!(records.len(), 1);
        let ana = &records[0];
        assert_eq!(ana.name, "Ana Gomez");
        assert_eq!(ana.approved_activities, Some(9));
        assert_eq!(ana.concept_grade, Some(8.5));
        assert_eq!(ana.final_grade, Some(7.6));
        assert_eq!(ana.condition, Condition::Promoted);

        let luis = lookup.find_by_id("778").await.unwrap();
        assert_eq!(luis[0].final_grade, None);
        assert_eq!(luis[0].approved_activities, None);
        assert_eq!(luis[0].condition, Condition::Unknown);
        assert_eq!(luis[0].condition_label, "Libre");
    }
}
