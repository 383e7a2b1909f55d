//! Attendance aggregation.

use tracing::debug;

use crate::error::EngineResult;
use crate::models::DateRange;
use crate::repository::PayrollRepository;

/// Counts the employee's check-ins in `[start 00:00 UTC, end + 1 day 00:00 UTC)`.
///
/// Nothing caps the count at the period's working days: weekend check-ins
/// accepted by the store are counted like any other.
pub async fn count_attendance(
    repo: &dyn PayrollRepository,
    employee_id: u64,
    range: DateRange,
) -> EngineResult<u32> {
    let days_attended = repo.count_attendance_in_range(employee_id, range).await?;
    debug!(employee_id, days_attended, "Attendance counted");
    Ok(days_attended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewEmployee;
    use crate::repository::{InMemoryRepository, RecordStore};
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_counts_only_the_employees_check_ins() {
        let store = InMemoryRepository::new();
        let alice = store
            .create_employee(NewEmployee {
                username: "alice".to_string(),
                salary: Decimal::new(5_000_000, 0),
            })
            .await
            .unwrap();
        let bob = store
            .create_employee(NewEmployee {
                username: "bob".to_string(),
                salary: Decimal::new(5_000_000, 0),
            })
            .await
            .unwrap();

        for day in 2..=6 {
            let at = Utc.with_ymd_and_hms(2025, 6, day, 8, 30, 0).unwrap();
            store.record_attendance(alice.id, at).await.unwrap();
        }
        store
            .record_attendance(bob.id, Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap())
            .await
            .unwrap();

        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        );
        assert_eq!(count_attendance(&store, alice.id, range).await.unwrap(), 5);
        assert_eq!(count_attendance(&store, bob.id, range).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_records_counts_zero() {
        let store = InMemoryRepository::new();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        );
        assert_eq!(count_attendance(&store, 1, range).await.unwrap(), 0);
    }
}
