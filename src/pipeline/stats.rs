use crate::api::client::{ServiceKind, Services};
use crate::core::error::DashboardError;
use crate::models::stats::{
    ClassroomProgressAggregate, ClassroomStats, ClassroomStatsSummary, ProgressTotals, StudentStat, TopicErrorStat,
};
use crate::pipeline::credential::Credential;
use std::sync::Arc;
use tracing::{debug, info};

/// Fetches the learning-stats feeds and shapes them for charting.
#[derive(Clone)]
pub struct StatsAggregator {
    services: Arc<Services>,
}

impl StatsAggregator {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    /// Topic errors and classroom progress, fetched together. Either feed
    /// failing fails the whole view.
    pub async fn load_classroom_stats(
        &self,
        classroom_id: &str,
        credential: &Credential,
    ) -> Result<ClassroomStats, DashboardError> {
        let (topics, summary) = tokio::try_join!(
            self.services.assignments.topic_errors(classroom_id, credential),
            self.services.classroom.stats(classroom_id, credential),
        )?;

        check_topics(&topics)?;
        check_summary(&summary)?;

        let progress = aggregate_progress(summary);

        info!(
            classroom_id = classroom_id,
            topics = topics.len(),
            days = progress.totals.days,
            "Classroom stats loaded"
        );

        Ok(ClassroomStats { topics, progress })
    }

    /// Every student's totals for the classroom.
    pub async fn load_student_stats(
        &self,
        classroom_id: &str,
        credential: &Credential,
    ) -> Result<Vec<StudentStat>, DashboardError> {
        let collection = self
            .services
            .assignments
            .student_stats(classroom_id, credential)
            .await?;

        collection.students_stats.ok_or_else(|| {
            DashboardError::malformed(ServiceKind::Assignments, "missing field `students_stats`")
        })
    }

    /// One student's totals, picked out of the classroom collection.
    pub async fn load_student_stat(
        &self,
        classroom_id: &str,
        user_id: &str,
        credential: &Credential,
    ) -> Result<StudentStat, DashboardError> {
        let stats = self.load_student_stats(classroom_id, credential).await?;
        let available = stats.len();

        match stats.into_iter().find(|s| s.user_id == user_id) {
            Some(stat) => Ok(stat),
            None => {
                debug!(
                    classroom_id = classroom_id,
                    user_id = user_id,
                    available = available,
                    "No stats for student"
                );
                Err(DashboardError::NotFound(format!(
                    "No stats found for student {}",
                    user_id
                )))
            }
        }
    }
}

/// Fold the daily series into totals. Upstream values pass through untouched.
pub fn aggregate_progress(summary: ClassroomStatsSummary) -> ClassroomProgressAggregate {
    let mut total_time_spent = 0.0;
    let mut total_questions_answered = 0u64;
    let mut weighted_correct = 0.0;

    for day in &summary.progress_by_day {
        total_time_spent += day.total_time_spent;
        total_questions_answered = total_questions_answered.saturating_add(day.total_questions_answered);
        weighted_correct += day.average_correct_rate * day.total_questions_answered as f64;
    }

    let weighted_correct_rate = if total_questions_answered > 0 {
        Some(weighted_correct / total_questions_answered as f64)
    } else {
        None
    };

    let totals = ProgressTotals {
        days: summary.progress_by_day.len(),
        total_time_spent,
        total_questions_answered,
        weighted_correct_rate,
    };

    ClassroomProgressAggregate {
        total_questions_answered: summary.total_questions_answered,
        average_time_spent_per_student: summary.average_time_spent_per_student,
        average_correct_rate: summary.average_correct_rate,
        progress_by_day: summary.progress_by_day,
        totals,
    }
}

fn check_topics(topics: &[TopicErrorStat]) -> Result<(), DashboardError> {
    for stat in topics {
        check_fraction(ServiceKind::Assignments, "errorRate", stat.error_rate)?;
    }
    Ok(())
}

fn check_summary(summary: &ClassroomStatsSummary) -> Result<(), DashboardError> {
    check_fraction(ServiceKind::Classroom, "average_correct_rate", summary.average_correct_rate)?;
    check_finite(
        ServiceKind::Classroom,
        "average_time_spent_per_student",
        summary.average_time_spent_per_student,
    )?;

    for day in &summary.progress_by_day {
        check_fraction(ServiceKind::Classroom, "average_correct_rate", day.average_correct_rate)?;
        check_finite(ServiceKind::Classroom, "total_time_spent", day.total_time_spent)?;
    }
    Ok(())
}

fn check_fraction(service: ServiceKind, field: &str, value: f64) -> Result<(), DashboardError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DashboardError::malformed(
            service,
            format!("`{}` must be a fraction in [0, 1], got {}", field, value),
        ))
    }
}

fn check_finite(service: ServiceKind, field: &str, value: f64) -> Result<(), DashboardError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DashboardError::malformed(
            service,
            format!("`{}` must be a finite number, got {}", field, value),
        ))
    }
}
