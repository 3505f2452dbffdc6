//! `Mutex`-guarded stand-in for the Postgres-backed repositories in
//! `dq-db`/`dq-incidents`, reimplementing the same incident-lifecycle and
//! history-retention semantics against plain `HashMap`s. Scenario tests that
//! only need to exercise sensor/rule/incident logic use this instead of a
//! live database; tests that exercise the actual SQL (migrations, the HTTP
//! layer, concurrent `SELECT ... FOR UPDATE` behavior) still go through
//! `dq_db::testkit_db_pool`.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use dq_schemas::{CheckResult, Incident, IncidentSeverity, IncidentStatus};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore {
    results: Mutex<HashMap<Uuid, Vec<CheckResult>>>,
    incidents: Mutex<HashMap<Uuid, Incident>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `result` to `check_id`'s history and returns the numeric
    /// values recorded so far, oldest first — the shape `dq_rules`'
    /// anomaly percentile evaluation expects.
    pub fn record_result(&self, check_id: Uuid, result: CheckResult) -> Vec<f64> {
        let mut results = self.results.lock().unwrap();
        let history = results.entry(check_id).or_default();
        history.push(result);
        history.iter().filter_map(|r| r.actual_value).collect()
    }

    pub fn history_for_check(&self, check_id: Uuid, limit: usize) -> Vec<f64> {
        let results = self.results.lock().unwrap();
        match results.get(&check_id) {
            Some(history) => history
                .iter()
                .rev()
                .take(limit)
                .filter_map(|r| r.actual_value)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Mirrors `dq_db::incidents::record_failure`: opens a new incident or
    /// bumps the existing open one for `check_id`. Severity is fixed at
    /// open time and never updated on repeat failures.
    pub fn record_failure(
        &self,
        check_id: Uuid,
        result_id: Uuid,
        severity: IncidentSeverity,
        title: &str,
        description: Option<&str>,
        occurred_at: DateTime<Utc>,
    ) -> Incident {
        let mut incidents = self.incidents.lock().unwrap();
        let non_resolved = incidents
            .values()
            .find(|i| {
                i.check_id == check_id
                    && matches!(i.status, IncidentStatus::Open | IncidentStatus::Acknowledged)
            })
            .map(|i| i.id);

        match non_resolved {
            Some(id) => {
                let incident = incidents.get_mut(&id).expect("just located by id");
                incident.result_id = result_id;
                incident.last_failure_at = occurred_at;
                incident.failure_count += 1;
                incident.clone()
            }
            None => {
                let incident = Incident {
                    id: Uuid::new_v4(),
                    check_id,
                    result_id,
                    status: IncidentStatus::Open,
                    severity,
                    title: title.to_string(),
                    description: description.map(String::from),
                    first_failure_at: occurred_at,
                    last_failure_at: occurred_at,
                    failure_count: 1,
                    acknowledged_at: None,
                    acknowledged_by: None,
                    resolved_at: None,
                    resolved_by: None,
                    resolution_notes: None,
                };
                incidents.insert(incident.id, incident.clone());
                incident
            }
        }
    }

    pub fn acknowledge(&self, id: Uuid, by: &str, at: DateTime<Utc>) {
        if let Some(incident) = self.incidents.lock().unwrap().get_mut(&id) {
            incident.status = IncidentStatus::Acknowledged;
            incident.acknowledged_at = Some(at);
            incident.acknowledged_by = Some(by.to_string());
        }
    }

    pub fn resolve(&self, id: Uuid, by: &str, notes: Option<&str>, at: DateTime<Utc>) {
        if let Some(incident) = self.incidents.lock().unwrap().get_mut(&id) {
            incident.status = IncidentStatus::Resolved;
            incident.resolved_at = Some(at);
            incident.resolved_by = Some(by.to_string());
            incident.resolution_notes = notes.map(String::from);
        }
    }

    pub fn open_for_check(&self, check_id: Uuid) -> Option<Incident> {
        self.incidents
            .lock()
            .unwrap()
            .values()
            .find(|i| {
                i.check_id == check_id
                    && matches!(i.status, IncidentStatus::Open | IncidentStatus::Acknowledged)
            })
            .cloned()
    }

    pub fn get_incident(&self, id: Uuid) -> Option<Incident> {
        self.incidents.lock().unwrap().get(&id).cloned()
    }

    pub fn list_incidents(&self, status: Option<IncidentStatus>) -> Vec<Incident> {
        let mut incidents: Vec<Incident> = self
            .incidents
            .lock()
            .unwrap()
            .values()
            .filter(|i| match status {
                Some(s) => i.status == s,
                None => true,
            })
            .cloned()
            .collect();
        incidents.sort_by_key(|i| std::cmp::Reverse(i.last_failure_at));
        incidents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(offset_secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(0, 0).unwrap() + Duration::seconds(offset_secs)
    }

    #[test]
    fn repeat_failures_bump_the_same_incident_without_raising_severity() {
        let store = InMemoryStore::new();
        let check_id = Uuid::new_v4();

        let opened = store.record_failure(
            check_id,
            Uuid::new_v4(),
            IncidentSeverity::Low,
            "row count below threshold",
            None,
            at(0),
        );
        assert_eq!(opened.failure_count, 1);
        assert_eq!(opened.severity, IncidentSeverity::Low);

        let bumped = store.record_failure(
            check_id,
            Uuid::new_v4(),
            IncidentSeverity::Critical,
            "row count below threshold",
            None,
            at(60),
        );
        assert_eq!(bumped.id, opened.id);
        assert_eq!(bumped.failure_count, 2);
        assert_eq!(bumped.severity, IncidentSeverity::Low, "severity fixed at open time");
    }

    #[test]
    fn acknowledge_then_resolve_transitions_status() {
        let store = InMemoryStore::new();
        let incident = store.record_failure(
            Uuid::new_v4(),
            Uuid::new_v4(),
            IncidentSeverity::Medium,
            "nulls percent above threshold",
            None,
            at(0),
        );

        store.acknowledge(incident.id, "oncall", at(10));
        assert_eq!(store.get_incident(incident.id).unwrap().status, IncidentStatus::Acknowledged);

        store.resolve(incident.id, "oncall", Some("source backfilled"), at(20));
        let resolved = store.get_incident(incident.id).unwrap();
        assert_eq!(resolved.status, IncidentStatus::Resolved);
        assert_eq!(resolved.resolution_notes.as_deref(), Some("source backfilled"));
    }

    fn sample_result(check_id: Uuid, actual_value: Option<f64>) -> CheckResult {
        CheckResult {
            id: Uuid::new_v4(),
            executed_at: at(0),
            check_id,
            job_id: Uuid::new_v4(),
            connection_id: Uuid::new_v4(),
            target_schema: None,
            target_table: "orders".into(),
            target_column: None,
            check_type: dq_schemas::CheckType::RowCount,
            actual_value,
            expected_value: None,
            passed: actual_value.is_some(),
            severity: dq_schemas::ResultSeverity::Passed,
            execution_time_ms: 5,
            rows_scanned: None,
            result_details: serde_json::json!({}),
            error_message: None,
            executed_sql: None,
        }
    }

    #[test]
    fn a5_null_actual_values_are_dropped_from_history() {
        let store = InMemoryStore::new();
        let check_id = Uuid::new_v4();

        store.record_result(check_id, sample_result(check_id, Some(1.0)));
        store.record_result(check_id, sample_result(check_id, None));
        store.record_result(check_id, sample_result(check_id, Some(2.0)));

        assert_eq!(store.history_for_check(check_id, 10), vec![1.0, 2.0]);
    }

    #[test]
    fn p2_two_consecutive_passes_never_touch_incidents() {
        let store = InMemoryStore::new();
        let check_id = Uuid::new_v4();

        store.record_result(check_id, sample_result(check_id, Some(20.0)));
        store.record_result(check_id, sample_result(check_id, Some(20.0)));

        assert!(store.open_for_check(check_id).is_none());
    }

    #[test]
    fn p3_n_consecutive_failures_produce_one_incident_with_failure_count_n() {
        let store = InMemoryStore::new();
        let check_id = Uuid::new_v4();

        for i in 0..3 {
            store.record_failure(check_id, Uuid::new_v4(), IncidentSeverity::High, "row_count failed", None, at(i * 60));
        }

        let incident = store.open_for_check(check_id).expect("one open incident");
        assert_eq!(incident.failure_count, 3);
        assert_eq!(incident.last_failure_at, at(2 * 60));
    }

    #[test]
    fn acknowledged_incident_still_absorbs_the_next_failure() {
        let store = InMemoryStore::new();
        let check_id = Uuid::new_v4();

        let opened =
            store.record_failure(check_id, Uuid::new_v4(), IncidentSeverity::High, "row_count failed", None, at(0));
        store.acknowledge(opened.id, "oncall", at(10));

        let bumped =
            store.record_failure(check_id, Uuid::new_v4(), IncidentSeverity::High, "row_count failed", None, at(60));
        assert_eq!(bumped.id, opened.id, "an acknowledged incident is not yet resolved, so it absorbs repeats");
        assert_eq!(bumped.failure_count, 2);
        assert_eq!(bumped.status, IncidentStatus::Acknowledged, "acknowledged status is not reset by a repeat failure");
    }

    #[test]
    fn p4_failing_then_passing_resolves_the_incident_exactly_once() {
        let store = InMemoryStore::new();
        let check_id = Uuid::new_v4();

        let incident =
            store.record_failure(check_id, Uuid::new_v4(), IncidentSeverity::High, "row_count failed", None, at(0));
        store.resolve(incident.id, "system", None, at(60));

        assert!(store.open_for_check(check_id).is_none());
        assert_eq!(store.get_incident(incident.id).unwrap().status, IncidentStatus::Resolved);
    }
}
