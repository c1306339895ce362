//! Statistics rollups over committed records
//!
//! Every rollup is a pure fold over the records a repository listing returns,
//! so the aggregator and the repositories cannot disagree. Breakdowns are
//! ordered maps so serialized snapshots are stable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use core_kernel::{Amount, MoneyError, StatisticsId, UserId};
use crate::infraction::Infraction;
use crate::seizure::Seizure;
use crate::violation::Violation;

/// Category name to count
pub type Breakdown = BTreeMap<String, u64>;

/// Number of violators kept in a daily snapshot
pub const TOP_VIOLATORS_IN_SNAPSHOT: usize = 10;

fn bump(breakdown: &mut Breakdown, key: &str) {
    *breakdown.entry(key.to_string()).or_insert(0) += 1;
}

/// Rollup of violations in a window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViolationStatistics {
    pub total_violations: u64,
    pub violations_by_type: Breakdown,
    pub violations_by_severity: Breakdown,
    pub violations_by_status: Breakdown,
    /// Unset fines count as zero
    pub total_fines: Amount,
}

impl ViolationStatistics {
    /// Fails with [`MoneyError::Overflow`] when the fine total leaves the
    /// representable range
    pub fn tally<'a>(violations: impl IntoIterator<Item = &'a Violation>) -> Result<Self, MoneyError> {
        let mut stats = Self::default();
        for v in violations {
            stats.total_violations += 1;
            bump(&mut stats.violations_by_type, v.violation_type.as_str());
            bump(&mut stats.violations_by_severity, v.severity_level.as_str());
            bump(&mut stats.violations_by_status, v.status.as_str());
            stats.total_fines = stats.total_fines.checked_add(v.fine_or_zero())?;
        }
        Ok(stats)
    }
}

/// Rollup of seizures in a window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeizureStatistics {
    pub total_seizures: u64,
    pub seizures_by_category: Breakdown,
    pub seizures_by_status: Breakdown,
    pub total_estimated_value: Amount,
}

impl SeizureStatistics {
    pub fn tally<'a>(seizures: impl IntoIterator<Item = &'a Seizure>) -> Result<Self, MoneyError> {
        let mut stats = Self::default();
        for s in seizures {
            stats.total_seizures += 1;
            bump(&mut stats.seizures_by_category, s.item_category.as_str());
            bump(&mut stats.seizures_by_status, s.status.as_str());
            stats.total_estimated_value = stats.total_estimated_value.checked_add(s.value_or_zero())?;
        }
        Ok(stats)
    }
}

/// Rollup of infractions in a window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfractionStatistics {
    pub total_infractions: u64,
    pub infractions_by_type: Breakdown,
    pub infractions_by_status: Breakdown,
    pub total_points: i64,
}

impl InfractionStatistics {
    pub fn tally<'a>(infractions: impl IntoIterator<Item = &'a Infraction>) -> Self {
        let mut stats = Self::default();
        for i in infractions {
            stats.total_infractions += 1;
            bump(&mut stats.infractions_by_type, &i.infraction_type);
            bump(&mut stats.infractions_by_status, i.status.as_str());
            stats.total_points = stats.total_points.saturating_add(i.points);
        }
        stats
    }
}

/// Violations recorded by one officer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficerPerformance {
    pub officer_id: UserId,
    pub violations_count: u64,
    pub total_fines: Amount,
}

/// Groups violations by officer, highest count first
///
/// Ties are ordered by ascending officer id.
pub fn rank_officers<'a>(
    violations: impl IntoIterator<Item = &'a Violation>,
) -> Result<Vec<OfficerPerformance>, MoneyError> {
    let mut by_officer: HashMap<UserId, OfficerPerformance> = HashMap::new();
    for v in violations {
        let entry = by_officer.entry(v.officer_id).or_insert_with(|| OfficerPerformance {
            officer_id: v.officer_id,
            violations_count: 0,
            total_fines: Amount::zero(),
        });
        entry.violations_count += 1;
        entry.total_fines = entry.total_fines.checked_add(v.fine_or_zero())?;
    }
    let mut ranked: Vec<_> = by_officer.into_values().collect();
    ranked.sort_by(|a, b| {
        b.violations_count
            .cmp(&a.violations_count)
            .then(a.officer_id.cmp(&b.officer_id))
    });
    Ok(ranked)
}

/// Repeat offender summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolatorCount {
    pub violator_name: String,
    pub violations_count: u64,
}

/// Most frequent violators by name, highest count first, ties alphabetical
pub fn top_violators<'a>(
    violations: impl IntoIterator<Item = &'a Violation>,
    limit: usize,
) -> Vec<ViolatorCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for v in violations {
        *counts.entry(v.violator_name.as_str()).or_insert(0) += 1;
    }
    let mut ranked: Vec<ViolatorCount> = counts
        .into_iter()
        .map(|(name, count)| ViolatorCount {
            violator_name: name.to_string(),
            violations_count: count,
        })
        .collect();
    // Stable sort keeps the alphabetical order from the BTreeMap for ties
    ranked.sort_by(|a, b| b.violations_count.cmp(&a.violations_count));
    ranked.truncate(limit);
    ranked
}

/// Content of a date-keyed statistics snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStatistics {
    pub date: NaiveDate,
    pub total_violations: u64,
    pub total_seizures: u64,
    pub total_infractions: u64,
    pub total_fines: Amount,
    pub violations_by_type: Breakdown,
    pub violations_by_severity: Breakdown,
    pub seizures_by_category: Breakdown,
    pub top_violators: Vec<ViolatorCount>,
    pub officer_performance: Vec<OfficerPerformance>,
}

impl DailyStatistics {
    /// Builds the snapshot for `date` from one day's records
    pub fn compose(
        date: NaiveDate,
        violations: &[Violation],
        seizures: &[Seizure],
        infractions: &[Infraction],
    ) -> Result<Self, MoneyError> {
        let v = ViolationStatistics::tally(violations)?;
        let s = SeizureStatistics::tally(seizures)?;
        let i = InfractionStatistics::tally(infractions);

        Ok(Self {
            date,
            total_violations: v.total_violations,
            total_seizures: s.total_seizures,
            total_infractions: i.total_infractions,
            total_fines: v.total_fines,
            violations_by_type: v.violations_by_type,
            violations_by_severity: v.violations_by_severity,
            seizures_by_category: s.seizures_by_category,
            top_violators: top_violators(violations, TOP_VIOLATORS_IN_SNAPSHOT),
            officer_performance: rank_officers(violations)?,
        })
    }
}

/// A stored snapshot row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub id: StatisticsId,
    #[serde(flatten)]
    pub statistics: DailyStatistics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
