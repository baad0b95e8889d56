use crate::models::assignment::{Assignment, WellKnownGame};
use crate::stores::cache_log::{CacheLog, CacheOperation};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, info, warn};

type Slots = HashMap<WellKnownGame, String>;

/// Well-known game name → assignment id, partitioned by session scope.
///
/// Lets homework authoring and review skip re-resolving the classroom's
/// assignments. Entries may be stale between classroom visits; every
/// classroom load refreshes them.
pub struct AssignmentIdCache {
    scopes: RwLock<HashMap<String, Slots>>,
    log: Option<CacheLog>,
}

impl AssignmentIdCache {
    /// Cache without persistence
    pub fn in_memory() -> Self {
        Self {
            scopes: RwLock::new(HashMap::new()),
            log: None,
        }
    }

    /// Open the durable cache at `path`, replaying and then compacting its log.
    pub fn open(path: PathBuf) -> Result<Self> {
        let log = CacheLog::open(path).context("Failed to open assignment cache log")?;
        let operations = log.replay().context("Failed to replay assignment cache log")?;

        let mut scopes = HashMap::new();
        for op in &operations {
            apply(&mut scopes, op);
        }

        let snapshot = snapshot_operations(&scopes);
        log.rewrite(&snapshot)
            .context("Failed to compact assignment cache log")?;

        info!(
            path = %log.path().display(),
            operations_replayed = operations.len(),
            scopes = scopes.len(),
            "Assignment cache restored"
        );

        Ok(Self {
            scopes: RwLock::new(scopes),
            log: Some(log),
        })
    }

    pub fn get(&self, scope: &str, game: WellKnownGame) -> Option<String> {
        let scopes = self.scopes.read().unwrap_or_else(|e| e.into_inner());
        scopes.get(scope).and_then(|slots| slots.get(&game).cloned())
    }

    /// Both slots of a scope, absent ones omitted.
    pub fn entries(&self, scope: &str) -> HashMap<WellKnownGame, String> {
        let scopes = self.scopes.read().unwrap_or_else(|e| e.into_inner());
        scopes.get(scope).cloned().unwrap_or_default()
    }

    /// Overwrite-only refresh: each well-known game present in `assignments`
    /// overwrites its slot, the others keep whatever they held.
    /// Returns how many slots were written.
    pub fn update(&self, scope: &str, assignments: &[Assignment]) -> usize {
        let found = Self::well_known_entries(assignments);
        if found.is_empty() {
            return 0;
        }

        let mut scopes = self.scopes.write().unwrap_or_else(|e| e.into_inner());

        for (game, assignment_id) in &found {
            self.persist(&CacheOperation::Set {
                scope: scope.to_string(),
                game: *game,
                assignment_id: assignment_id.clone(),
            });
        }

        let slots = scopes.entry(scope.to_string()).or_default();
        let written = found.len();
        slots.extend(found);

        debug!(scope = scope, written = written, "Assignment cache updated");
        written
    }

    /// Clear both slots of `scope` and repopulate them from `entries` as one
    /// step: readers see either the old pair or the new pair.
    /// Returns false when the scope already held exactly `entries`; nothing
    /// is written then.
    pub fn replace_well_known_entries(&self, scope: &str, entries: HashMap<WellKnownGame, String>) -> bool {
        let mut scopes = self.scopes.write().unwrap_or_else(|e| e.into_inner());

        let unchanged = match scopes.get(scope) {
            Some(current) => *current == entries,
            None => entries.is_empty(),
        };
        if unchanged {
            return false;
        }

        self.persist(&CacheOperation::Replace {
            scope: scope.to_string(),
            entries: entries
                .iter()
                .map(|(game, id)| (game.as_str().to_string(), id.clone()))
                .collect(),
        });

        debug!(scope = scope, entries = entries.len(), "Assignment cache replaced");

        if entries.is_empty() {
            scopes.remove(scope);
        } else {
            scopes.insert(scope.to_string(), entries);
        }
        true
    }

    /// Drop every slot of `scope` (session end).
    pub fn clear(&self, scope: &str) {
        let mut scopes = self.scopes.write().unwrap_or_else(|e| e.into_inner());
        self.persist(&CacheOperation::Clear {
            scope: scope.to_string(),
        });
        scopes.remove(scope);
    }

    /// First assignment per well-known game; other game names are ignored.
    pub fn well_known_entries(assignments: &[Assignment]) -> HashMap<WellKnownGame, String> {
        let mut entries = HashMap::new();
        for assignment in assignments {
            if let Some(game) = WellKnownGame::from_game_name(&assignment.game_name) {
                entries
                    .entry(game)
                    .or_insert_with(|| assignment.assignment_id.clone());
            }
        }
        entries
    }

    /// True when writes go to a log on disk.
    pub fn is_durable(&self) -> bool {
        self.log.is_some()
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    // Callers hold the write lock so log order matches memory order. The
    // append is a blocking write of one line; unchanged refreshes skip it.
    fn persist(&self, op: &CacheOperation) {
        if let Some(log) = &self.log {
            if let Err(e) = log.append(op) {
                // Memory stays authoritative for this process
                warn!(error = %e, "Failed to persist assignment cache operation");
            }
        }
    }
}

fn apply(scopes: &mut HashMap<String, Slots>, op: &CacheOperation) {
    match op {
        CacheOperation::Set {
            scope,
            game,
            assignment_id,
        } => {
            scopes
                .entry(scope.clone())
                .or_default()
                .insert(*game, assignment_id.clone());
        }
        CacheOperation::Replace { scope, entries } => {
            let slots: Slots = entries
                .iter()
                .filter_map(|(name, id)| WellKnownGame::from_game_name(name).map(|game| (game, id.clone())))
                .collect();
            if slots.is_empty() {
                scopes.remove(scope);
            } else {
                scopes.insert(scope.clone(), slots);
            }
        }
        CacheOperation::Clear { scope } => {
            scopes.remove(scope);
        }
    }
}

fn snapshot_operations(scopes: &HashMap<String, Slots>) -> Vec<CacheOperation> {
    let mut ordered: Vec<_> = scopes.iter().collect();
    ordered.sort_by(|a, b| a.0.cmp(b.0));

    ordered
        .into_iter()
        .map(|(scope, slots)| CacheOperation::Replace {
            scope: scope.clone(),
            entries: slots
                .iter()
                .map(|(game, id)| (game.as_str().to_string(), id.clone()))
                .collect::<BTreeMap<_, _>>(),
        })
        .collect()
}
