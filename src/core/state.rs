// Application state (AppState)

use crate::api::client::Services;
use crate::core::config::Config;
use crate::metrics::collector::Metrics;
use crate::pipeline::orchestrator::ResourceOrchestrator;
use crate::pipeline::resolver::ClassroomResolver;
use crate::pipeline::stats::StatsAggregator;
use crate::stores::assignment_cache::AssignmentIdCache;
use crate::stores::classroom_views::ClassroomViews;
use std::sync::Arc;

/// Shared application state
///
/// Everything request handlers reach for. Pipeline components hold their own
/// `Arc`s to the service clients, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Slug to classroom resolution
    pub resolver: ClassroomResolver,

    /// Roster/assignment fan-out and content authoring
    pub orchestrator: ResourceOrchestrator,

    /// Learning-stats feeds
    pub stats: StatsAggregator,

    /// Well-known game assignment ids per session
    pub assignment_cache: Arc<AssignmentIdCache>,

    /// Open classroom views and their in-flight loads
    pub views: Arc<ClassroomViews>,

    pub metrics: Arc<Metrics>,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, services: Services, assignment_cache: AssignmentIdCache) -> Self {
        let services = Arc::new(services);
        let assignment_cache = Arc::new(assignment_cache);

        Self {
            resolver: ClassroomResolver::new(services.classroom.clone()),
            orchestrator: ResourceOrchestrator::new(services.clone(), assignment_cache.clone()),
            stats: StatsAggregator::new(services),
            assignment_cache,
            views: Arc::new(ClassroomViews::new()),
            metrics: Arc::new(Metrics::new()),
            config: Arc::new(config),
        }
    }
}
