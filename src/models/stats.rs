use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Per-topic error rate from the assignment service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicErrorStat {
    pub topic: String,
    /// Fraction in [0, 1]
    #[serde(rename = "errorRate", alias = "error_rate")]
    pub error_rate: f64,
}

/// One day of classroom progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassroomProgressStat {
    pub date: String,
    #[serde(default)]
    pub total_time_spent: f64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total_questions_answered: u64,
    /// Fraction in [0, 1]
    #[serde(default)]
    pub average_correct_rate: f64,
}

/// Classroom-level aggregate as served by the classroom service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassroomStatsSummary {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total_questions_answered: u64,
    #[serde(default)]
    pub average_time_spent_per_student: f64,
    #[serde(default)]
    pub average_correct_rate: f64,
    #[serde(default)]
    pub progress_by_day: Vec<ClassroomProgressStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentStat {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub total_time_played: f64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub questions_answered: u64,
    #[serde(default, alias = "last_active_timestamp")]
    pub last_time_active: Option<String>,
}

/// `students_stats` is optional on the wire so that a body without it can be
/// told apart from an empty collection.
#[derive(Debug, Deserialize)]
pub struct StudentStatsCollection {
    #[serde(default)]
    pub students_stats: Option<Vec<StudentStat>>,
}

/// Counts arrive as JSON integers or as integral floats (`10.0`).
#[derive(Deserialize)]
#[serde(untagged)]
enum CountRepr {
    Int(u64),
    Float(f64),
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<CountRepr>::deserialize(deserializer)? {
        None => Ok(0),
        Some(CountRepr::Int(n)) => Ok(n),
        Some(CountRepr::Float(f)) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Ok(f as u64)
        }
        Some(CountRepr::Float(f)) => Err(D::Error::custom(format!(
            "expected a non-negative whole count, got {}",
            f
        ))),
    }
}

/// Totals folded from the per-day series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressTotals {
    pub days: usize,
    pub total_time_spent: f64,
    pub total_questions_answered: u64,
    /// Correct rate weighted by questions answered per day; `None` when no
    /// question was answered in the series.
    pub weighted_correct_rate: Option<f64>,
}

/// Chart-ready classroom progress: the upstream aggregate, the raw daily
/// series and totals derived from it. No value is rounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassroomProgressAggregate {
    pub total_questions_answered: u64,
    pub average_time_spent_per_student: f64,
    pub average_correct_rate: f64,
    pub progress_by_day: Vec<ClassroomProgressStat>,
    pub totals: ProgressTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassroomStats {
    pub topics: Vec<TopicErrorStat>,
    pub progress: ClassroomProgressAggregate,
}
