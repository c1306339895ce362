//! Statistics aggregator
//!
//! Rollups fold exactly the records the entity repositories list for the
//! same window, so a report can always be reconciled with the listing it
//! summarizes. The aggregator never writes entity tables; its only writes
//! are the date-keyed snapshot rows.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use tracing::{debug, info, instrument};

use core_kernel::{DateWindow, StatisticsId, Timezone, UserId};
use domain_case::statistics::{self, top_violators};
use domain_case::{
    DailySnapshot, DailyStatistics, InfractionFilter, InfractionStatistics, OfficerPerformance,
    SeizureFilter, SeizureStatistics, ViolationFilter, ViolationStatistics, ViolatorCount,
};

use super::{InfractionRepository, SeizureRepository, ViolationRepository};
use crate::codec::{from_json, to_json};
use crate::error::DatabaseError;
use crate::pool::DatabasePool;

const COLUMNS: &str = "id, date, total_violations, total_seizures, total_infractions, total_fines, \
                       violations_by_type, violations_by_severity, seizures_by_category, top_violators, \
                       officer_performance, created_at, updated_at";

#[derive(Debug, FromRow)]
struct StatisticsRow {
    id: i64,
    date: NaiveDate,
    total_violations: i64,
    total_seizures: i64,
    total_infractions: i64,
    total_fines: String,
    violations_by_type: String,
    violations_by_severity: String,
    seizures_by_category: String,
    top_violators: String,
    officer_performance: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn count(column: &str, value: i64) -> Result<u64, DatabaseError> {
    u64::try_from(value)
        .map_err(|_| DatabaseError::SerializationError(format!("{}: negative count {}", column, value)))
}

impl TryFrom<StatisticsRow> for DailySnapshot {
    type Error = DatabaseError;

    fn try_from(row: StatisticsRow) -> Result<Self, Self::Error> {
        let total_fines = row
            .total_fines
            .parse()
            .map_err(|e| DatabaseError::SerializationError(format!("total_fines: {}", e)))?;
        Ok(DailySnapshot {
            id: StatisticsId::new(row.id),
            statistics: DailyStatistics {
                date: row.date,
                total_violations: count("total_violations", row.total_violations)?,
                total_seizures: count("total_seizures", row.total_seizures)?,
                total_infractions: count("total_infractions", row.total_infractions)?,
                total_fines,
                violations_by_type: from_json("violations_by_type", &row.violations_by_type)?,
                violations_by_severity: from_json("violations_by_severity", &row.violations_by_severity)?,
                seizures_by_category: from_json("seizures_by_category", &row.seizures_by_category)?,
                top_violators: from_json("top_violators", &row.top_violators)?,
                officer_performance: from_json("officer_performance", &row.officer_performance)?,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Computes rollups and maintains daily snapshots
#[derive(Debug, Clone)]
pub struct StatisticsRepository {
    pool: DatabasePool,
    violations: ViolationRepository,
    seizures: SeizureRepository,
    infractions: InfractionRepository,
    timezone: Timezone,
}

impl StatisticsRepository {
    /// `timezone` decides where a calendar day begins and ends for snapshots
    pub fn new(pool: DatabasePool, timezone: Timezone) -> Self {
        Self {
            violations: ViolationRepository::new(pool.clone()),
            seizures: SeizureRepository::new(pool.clone()),
            infractions: InfractionRepository::new(pool.clone()),
            pool,
            timezone,
        }
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    /// Violations whose date falls in `window`
    pub async fn violation_statistics(&self, window: DateWindow) -> Result<ViolationStatistics, DatabaseError> {
        let violations = self.violations.list(&ViolationFilter::within(window)).await?;
        Ok(ViolationStatistics::tally(&violations)?)
    }

    /// Seizures whose seizure date falls in `window`
    pub async fn seizure_statistics(&self, window: DateWindow) -> Result<SeizureStatistics, DatabaseError> {
        let seizures = self.seizures.list(&SeizureFilter::within(window)).await?;
        Ok(SeizureStatistics::tally(&seizures)?)
    }

    /// Infractions created within `window`
    pub async fn infraction_statistics(&self, window: DateWindow) -> Result<InfractionStatistics, DatabaseError> {
        let infractions = self.infractions.list(&InfractionFilter::within(window)).await?;
        Ok(InfractionStatistics::tally(&infractions))
    }

    /// Per-officer counts and fine sums, highest count first
    pub async fn officer_performance(
        &self,
        window: DateWindow,
        officer: Option<UserId>,
    ) -> Result<Vec<OfficerPerformance>, DatabaseError> {
        let filter = ViolationFilter {
            officer_id: officer,
            ..ViolationFilter::within(window)
        };
        let violations = self.violations.list(&filter).await?;
        Ok(statistics::rank_officers(&violations)?)
    }

    /// Most frequent violators by name
    pub async fn top_violators(&self, window: DateWindow, limit: usize) -> Result<Vec<ViolatorCount>, DatabaseError> {
        let violations = self.violations.list(&ViolationFilter::within(window)).await?;
        Ok(top_violators(&violations, limit))
    }

    /// Rollup of one calendar day in the reporting timezone, without storing it
    pub async fn compute_daily(&self, date: NaiveDate) -> Result<DailyStatistics, DatabaseError> {
        let window = self
            .timezone
            .day_window(date)
            .map_err(|e| DatabaseError::validation("DailyStatistics", "date", e.to_string()))?;

        let violations = self.violations.list(&ViolationFilter::within(window)).await?;
        let seizures = self.seizures.list(&SeizureFilter::within(window)).await?;
        let infractions = self.infractions.list(&InfractionFilter::within(window)).await?;

        Ok(DailyStatistics::compose(date, &violations, &seizures, &infractions)?)
    }

    /// Computes and upserts the snapshot for `date`
    ///
    /// The row is only rewritten when its contents differ, so recomputing an
    /// unchanged day leaves it untouched, `updated_at` included.
    #[instrument(skip(self), fields(date = %date))]
    pub async fn save_daily_snapshot(&self, date: NaiveDate) -> Result<DailySnapshot, DatabaseError> {
        let daily = self.compute_daily(date).await?;
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO statistics (
                date, total_violations, total_seizures, total_infractions, total_fines,
                violations_by_type, violations_by_severity, seizures_by_category, top_violators,
                officer_performance, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(date) DO UPDATE SET
                total_violations = excluded.total_violations,
                total_seizures = excluded.total_seizures,
                total_infractions = excluded.total_infractions,
                total_fines = excluded.total_fines,
                violations_by_type = excluded.violations_by_type,
                violations_by_severity = excluded.violations_by_severity,
                seizures_by_category = excluded.seizures_by_category,
                top_violators = excluded.top_violators,
                officer_performance = excluded.officer_performance,
                updated_at = excluded.updated_at
            WHERE statistics.total_violations IS NOT excluded.total_violations
               OR statistics.total_seizures IS NOT excluded.total_seizures
               OR statistics.total_infractions IS NOT excluded.total_infractions
               OR statistics.total_fines IS NOT excluded.total_fines
               OR statistics.violations_by_type IS NOT excluded.violations_by_type
               OR statistics.violations_by_severity IS NOT excluded.violations_by_severity
               OR statistics.seizures_by_category IS NOT excluded.seizures_by_category
               OR statistics.top_violators IS NOT excluded.top_violators
               OR statistics.officer_performance IS NOT excluded.officer_performance
            "#,
        )
        .bind(date)
        .bind(daily.total_violations as i64)
        .bind(daily.total_seizures as i64)
        .bind(daily.total_infractions as i64)
        .bind(daily.total_fines.to_storage())
        .bind(to_json("violations_by_type", &daily.violations_by_type)?)
        .bind(to_json("violations_by_severity", &daily.violations_by_severity)?)
        .bind(to_json("seizures_by_category", &daily.seizures_by_category)?)
        .bind(to_json("top_violators", &daily.top_violators)?)
        .bind(to_json("officer_performance", &daily.officer_performance)?)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, StatisticsRow>(&format!("SELECT {} FROM statistics WHERE date = ?", COLUMNS))
            .bind(date)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        let snapshot = DailySnapshot::try_from(row)?;
        info!(
            total_violations = snapshot.statistics.total_violations,
            total_fines = %snapshot.statistics.total_fines,
            "Daily snapshot saved"
        );
        Ok(snapshot)
    }

    /// Reads a stored snapshot
    pub async fn daily_snapshot(&self, date: NaiveDate) -> Result<DailySnapshot, DatabaseError> {
        let row = sqlx::query_as::<_, StatisticsRow>(&format!("SELECT {} FROM statistics WHERE date = ?", COLUMNS))
            .bind(date)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No statistics snapshot for {}", date)))?;
        debug!(date = %date, "Snapshot loaded");
        DailySnapshot::try_from(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_pool, new_violation, seed_officer};
    use chrono::Duration;
    use core_kernel::Amount;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_snapshot_is_idempotent() {
        let pool = memory_pool().await;
        let officer = seed_officer(&pool).await;
        let violations = ViolationRepository::new(pool.clone());
        let mut request = new_violation("V-1", officer);
        request.fine_amount = Some(Amount::new(dec!(150)));
        let created = violations.create(request).await.unwrap();

        let stats = StatisticsRepository::new(pool, Timezone::default());
        let date = created.violation_date.date_naive();
        let first = stats.save_daily_snapshot(date).await.unwrap();
        let second = stats.save_daily_snapshot(date).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.statistics.total_violations, 1);
        assert_eq!(first.statistics.total_fines.value(), dec!(150));
        assert_eq!(stats.daily_snapshot(date).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_snapshot_refreshes_when_contents_change() {
        let pool = memory_pool().await;
        let officer = seed_officer(&pool).await;
        let violations = ViolationRepository::new(pool.clone());
        let stats = StatisticsRepository::new(pool, Timezone::default());

        let first = violations.create(new_violation("V-1", officer)).await.unwrap();
        let date = first.violation_date.date_naive();
        let before = stats.save_daily_snapshot(date).await.unwrap();

        let mut later = new_violation("V-2", officer);
        later.violation_date = first.violation_date;
        violations.create(later).await.unwrap();
        let after = stats.save_daily_snapshot(date).await.unwrap();

        assert_eq!(after.id, before.id);
        assert_eq!(after.statistics.total_violations, 2);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_window_excludes_outside_records() {
        let pool = memory_pool().await;
        let officer = seed_officer(&pool).await;
        let violations = ViolationRepository::new(pool.clone());
        let created = violations.create(new_violation("V-1", officer)).await.unwrap();

        let stats = StatisticsRepository::new(pool, Timezone::default());
        let before = DateWindow::until(created.violation_date - Duration::seconds(1));
        assert_eq!(stats.violation_statistics(before).await.unwrap().total_violations, 0);
        let exact = DateWindow::between(created.violation_date, created.violation_date).unwrap();
        assert_eq!(stats.violation_statistics(exact).await.unwrap().total_violations, 1);
    }

    #[tokio::test]
    async fn test_missing_snapshot() {
        let stats = StatisticsRepository::new(memory_pool().await, Timezone::default());
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert!(stats.daily_snapshot(date).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_fine_overflow_is_reported_not_panicked() {
        let pool = memory_pool().await;
        let officer = seed_officer(&pool).await;
        let violations = ViolationRepository::new(pool.clone());
        for number in ["V-1", "V-2"] {
            let mut request = new_violation(number, officer);
            request.fine_amount = Some(Amount::new(dec!(50000000000000000000000000000)));
            violations.create(request).await.unwrap();
        }

        let stats = StatisticsRepository::new(pool, Timezone::default());
        let err = stats.violation_statistics(DateWindow::unbounded()).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Arithmetic(_)));
        assert_eq!(err.kind(), crate::error::ErrorKind::Internal);
        assert!(stats.officer_performance(DateWindow::unbounded(), None).await.is_err());
    }
}
