use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use rosprolog_client::{Bindings, Reasoner};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::{NeemError, Result};
use crate::pool::WorkerPool;
use crate::pose::{Datapoint, Pose};
use crate::query;

// ---------------------------------------------------------------------------
// Default ontology types
// ---------------------------------------------------------------------------

pub const ACTION: &str = "dul:'Action'";
pub const TASK: &str = "dul:'Task'";
pub const ROLE: &str = "dul:'Role'";
pub const PHYSICAL_AGENT: &str = "dul:'PhysicalAgent'";
pub const STATE: &str = "soma:'State'";
pub const STATE_TYPE: &str = "soma:'StateType'";
pub const SITUATION: &str = "dul:'Situation'";

/// Current wall-clock time in seconds since the epoch.
pub fn now() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1e6
}

// ---------------------------------------------------------------------------
// Value objects
// ---------------------------------------------------------------------------

/// Environment and agent models an episode is recorded against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeContext {
    pub task_type: String,
    pub env_owl: String,
    pub env_owl_ind_name: String,
    pub env_urdf: String,
    pub agent_owl: String,
    pub agent_owl_ind_name: String,
    pub agent_urdf: String,
}

/// IRIs created by [`NeemInterface::assert_transition`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub transition: String,
    pub initial_state: String,
    pub terminal_state: String,
}

// ---------------------------------------------------------------------------
// NeemInterface
// ---------------------------------------------------------------------------

/// Creates and reads NEEMs through a [`Reasoner`].
///
/// Every operation renders a template from [`crate::query`] and runs it
/// synchronously, except [`assert_object_trajectory`](Self::assert_object_trajectory)
/// which fans out over the interface's worker pool. Dropping the interface
/// waits for queued trajectory inserts to finish.
pub struct NeemInterface {
    reasoner: Arc<dyn Reasoner>,
    pool: WorkerPool,
}

impl NeemInterface {
    pub fn new(reasoner: Arc<dyn Reasoner>, pool_size: usize) -> Result<Self> {
        Ok(Self {
            reasoner,
            pool: WorkerPool::new(pool_size)?,
        })
    }

    /// Build from config, loading `neem.interface_path` into the knowledge
    /// base when one is set.
    pub fn from_config(reasoner: Arc<dyn Reasoner>, config: &Config) -> Result<Self> {
        let neem = Self::new(reasoner, config.pool_size())?;
        if let Some(path) = &config.neem.interface_path {
            neem.load_interface_file(path)?;
        }
        Ok(neem)
    }

    pub fn load_interface_file(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "loading neem interface into knowledge base");
        self.reasoner
            .ensure_once(&query::ensure_loaded(&path.to_string_lossy()))?;
        Ok(())
    }

    pub fn reasoner(&self) -> &Arc<dyn Reasoner> {
        &self.reasoner
    }

    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    pub fn clear_beliefstate(&self) -> Result<()> {
        self.reasoner.ensure_once(&query::clear_memory())?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // NEEM creation
    // -----------------------------------------------------------------------

    /// Start an episode and return the IRI of its top-level action.
    pub fn start_episode(&self, ctx: &EpisodeContext, start_time: Option<f64>) -> Result<String> {
        let q = query::episode_start(
            &ctx.task_type,
            &ctx.env_owl,
            &ctx.env_owl_ind_name,
            &ctx.env_urdf,
            &ctx.agent_owl,
            &ctx.agent_owl_ind_name,
            &ctx.agent_urdf,
            start_time.unwrap_or_else(now),
        );
        let solution = self.reasoner.ensure_once(&q)?;
        bound_str(&solution, "Action", &q)
    }

    /// End the current episode and write the NEEM to `neem_path`.
    pub fn stop_episode(&self, neem_path: &str, end_time: Option<f64>) -> Result<Bindings> {
        let q = query::episode_stop(neem_path, end_time.unwrap_or_else(now));
        Ok(self.reasoner.ensure_once(&q)?)
    }

    /// IRI of the episode that is the setting for `action`.
    pub fn episode_for_action(&self, action: &str) -> Result<String> {
        let q = query::episode_for_action(action);
        let solution = self.reasoner.ensure_once(&q)?;
        bound_str(&solution, "Episode", &q)
    }

    /// Assert a sub-action of `parent` executing a new task. The interval is
    /// only recorded when both times are given.
    pub fn add_subaction_with_task(
        &self,
        parent: &str,
        sub_action_type: &str,
        task_type: &str,
        start_time: Option<f64>,
        end_time: Option<f64>,
    ) -> Result<String> {
        let q = query::add_subaction_with_task(parent, sub_action_type, task_type);
        let solution = self.reasoner.ensure_once(&q)?;
        let action = bound_str(&solution, "SubAction", &q)?;
        if let (Some(start), Some(end)) = (start_time, end_time) {
            self.reasoner
                .ensure_once(&query::project_time_interval(&action, start, end))?;
        }
        Ok(action)
    }

    /// `participant` must already exist in the knowledge base.
    pub fn add_participant_with_role(&self, action: &str, participant: &str, role_type: &str) -> Result<()> {
        self.reasoner
            .ensure_once(&query::add_participant_with_role(action, participant, role_type))?;
        Ok(())
    }

    pub fn assert_tf_trajectory(&self, points: &[Datapoint]) -> Result<()> {
        tracing::info!(count = points.len(), "inserting tf datapoints");
        for point in points {
            self.reasoner.ensure_once(&query::tf_set_pose_at(
                &point.frame,
                &point.to_knowrob_string(),
                point.timestamp,
            ))?;
        }
        Ok(())
    }

    pub fn assert_transition(&self, agent: &str, object: &str, start: f64, end: f64) -> Result<Transition> {
        let q = query::assert_transition(agent, object, start, end);
        let solution = self.reasoner.ensure_once(&q)?;
        Ok(Transition {
            transition: bound_str(&solution, "Transition", &q)?,
            initial_state: bound_str(&solution, "InitialState", &q)?,
            terminal_state: bound_str(&solution, "TerminalState", &q)?,
        })
    }

    /// Link `effector` to `agent`, creating a new agent of `agent_type` when
    /// none is given. Returns the agent IRI.
    pub fn assert_agent_with_effector(
        &self,
        effector: &str,
        agent_type: &str,
        agent: Option<&str>,
    ) -> Result<String> {
        let agent = match agent {
            Some(a) => a.to_string(),
            None => {
                let q = query::new_agent(agent_type);
                let solution = self.reasoner.ensure_once(&q)?;
                bound_str(&solution, "Agent", &q)?
            }
        };
        self.reasoner.ensure_once(&query::has_end_link(&agent, effector))?;
        Ok(agent)
    }

    pub fn assert_state(
        &self,
        participants: &[String],
        start_time: Option<f64>,
        end_time: Option<f64>,
        state_class: &str,
        state_type: &str,
    ) -> Result<String> {
        let q = query::new_state(state_class, state_type);
        let solution = self.reasoner.ensure_once(&q)?;
        let state = bound_str(&solution, "State", &q)?;
        if let (Some(start), Some(end)) = (start_time, end_time) {
            self.reasoner
                .ensure_once(&query::project_time_interval(&state, start, end))?;
        }
        for participant in participants {
            self.reasoner
                .ensure_once(&query::has_participant(&state, participant))?;
        }
        Ok(state)
    }

    pub fn assert_situation(&self, agent: &str, objects: &[String], situation_type: &str) -> Result<String> {
        let q = query::new_situation(situation_type, agent);
        let solution = self.reasoner.ensure_once(&q)?;
        let situation = bound_str(&solution, "Situation", &q)?;
        for obj in objects {
            self.reasoner
                .ensure_once(&query::situation_includes_object(&situation, obj))?;
        }
        Ok(situation)
    }

    /// Store `pose` for `obj`. Missing bounds default to now.
    pub fn assert_object_pose(
        &self,
        obj: &str,
        pose: &Pose,
        start_time: Option<f64>,
        end_time: Option<f64>,
    ) -> Result<()> {
        assert_object_pose(self.reasoner.as_ref(), obj, pose, start_time, end_time)
    }

    /// Insert a trajectory of poses for `obj` on the worker pool.
    ///
    /// Poses are queued newest first. With `insert_last_pose_synchronously`
    /// the call blocks until the chronologically last pose is stored and
    /// returns its error if that insert failed; the remaining inserts finish
    /// in the background and only log their failures.
    pub fn assert_object_trajectory(
        &self,
        obj: &str,
        poses: Vec<Pose>,
        start_times: Vec<f64>,
        end_times: Vec<f64>,
        insert_last_pose_synchronously: bool,
    ) -> Result<()> {
        if poses.len() != start_times.len() || poses.len() != end_times.len() {
            return Err(NeemError::InvalidPayload(format!(
                "trajectory needs one start and end time per pose: {} poses, {} starts, {} ends",
                poses.len(),
                start_times.len(),
                end_times.len()
            )));
        }
        tracing::info!(obj, count = poses.len(), "inserting object trajectory");
        if poses.is_empty() {
            return Ok(());
        }

        let jobs: Vec<(Pose, f64, f64)> = poses
            .into_iter()
            .zip(start_times)
            .zip(end_times)
            .map(|((pose, start), end)| (pose, start, end))
            .rev()
            .collect();

        let reasoner = Arc::clone(&self.reasoner);
        let obj_owned = obj.to_string();
        let results = self.pool.map(jobs, move |(pose, start, end)| {
            let result = assert_object_pose(reasoner.as_ref(), &obj_owned, &pose, Some(start), Some(end));
            if let Err(e) = &result {
                tracing::warn!(obj = %obj_owned, start, error = %e, "trajectory pose insert failed");
            }
            result
        })?;

        if insert_last_pose_synchronously {
            if let Some(last) = results.into_iter().next() {
                return last.recv().map_err(|_| {
                    NeemError::Io(std::io::Error::other("trajectory worker exited before inserting the last pose"))
                })?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // NEEM parsing
    // -----------------------------------------------------------------------

    /// Replace the knowledge base contents with the NEEM at `neem_path`.
    pub fn load_neem(&self, neem_path: &str) -> Result<()> {
        self.reasoner.ensure_once(&query::load_neem(neem_path))?;
        Ok(())
    }

    pub fn get_all_actions(&self, action_type: Option<&str>) -> Result<Vec<String>> {
        let q = query::all_actions(action_type);
        let found = unique_str(&self.reasoner.all_solutions(&q)?, "Action", &q)?;
        if found.is_empty() {
            return Err(NeemError::NotFound("Failed to find any actions".to_string()));
        }
        Ok(found)
    }

    pub fn get_all_states(&self) -> Result<Vec<String>> {
        let q = query::all_states();
        let found = unique_str(&self.reasoner.all_solutions(&q)?, "State", &q)?;
        if found.is_empty() {
            return Err(NeemError::NotFound("Failed to find any states".to_string()));
        }
        Ok(found)
    }

    /// `(begin, end)` of `event`, or `None` when the reasoner knows no
    /// interval for it.
    pub fn get_interval_for_event(&self, event: &str) -> Result<Option<(f64, f64)>> {
        let q = query::event_interval(event);
        let Some(solution) = self.reasoner.once(&q)? else {
            return Ok(None);
        };
        Ok(Some((bound_f64(&solution, "Begin", &q)?, bound_f64(&solution, "End", &q)?)))
    }

    pub fn get_object_pose(&self, obj: &str, timestamp: Option<f64>) -> Result<Pose> {
        let q = query::get_object_pose(obj, timestamp);
        let solution = self.reasoner.ensure_once(&q)?;
        Pose::from_prolog(bound(&solution, "Pose", &q)?)
    }

    pub fn get_tf_trajectory(&self, obj: &str, start: f64, end: f64) -> Result<Value> {
        let q = query::tf_trajectory(obj, start, end);
        let solution = self.reasoner.ensure_once(&q)?;
        Ok(bound(&solution, "Trajectory", &q)?.clone())
    }

    pub fn get_wrench_trajectory(&self, obj: &str, start: f64, end: f64) -> Result<Value> {
        let q = query::wrench_trajectory(obj, start, end);
        let solution = self.reasoner.ensure_once(&q)?;
        Ok(bound(&solution, "Trajectory", &q)?.clone())
    }

    pub fn get_tasks_for_action(&self, action: &str) -> Result<Vec<String>> {
        let q = query::tasks_for_action(action);
        self.reasoner
            .all_solutions(&q)?
            .iter()
            .map(|s| bound_str(s, "Task", &q))
            .collect()
    }

    /// Objects `X` of every `subject predicate X` triple.
    pub fn get_triple_objects(&self, subject: &str, predicate: &str) -> Result<Vec<String>> {
        let q = query::triple_objects(subject, predicate);
        let found = unique_str(&self.reasoner.all_solutions(&q)?, "X", &q)?;
        if found.is_empty() {
            return Err(NeemError::NotFound("Failed to find any objects for triple".to_string()));
        }
        Ok(found)
    }

    /// Subjects `X` of every `X predicate object` triple.
    pub fn get_triple_subjects(&self, predicate: &str, object: &str) -> Result<Vec<String>> {
        let q = query::triple_subjects(predicate, object);
        let found = unique_str(&self.reasoner.all_solutions(&q)?, "X", &q)?;
        if found.is_empty() {
            return Err(NeemError::NotFound("Failed to find any subjects for triple".to_string()));
        }
        Ok(found)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn assert_object_pose(
    reasoner: &dyn Reasoner,
    obj: &str,
    pose: &Pose,
    start_time: Option<f64>,
    end_time: Option<f64>,
) -> Result<()> {
    let (start, end) = match (start_time, end_time) {
        (Some(s), Some(e)) => (s, e),
        (Some(s), None) => (s, now()),
        _ => {
            let t = now();
            (t, t)
        }
    };
    let pose_str = pose.to_knowrob_string();
    tracing::debug!(obj, start, end, pose = %pose_str, "asserting object pose");
    reasoner.ensure_once(&query::object_pose(obj, &pose_str, start, end))?;
    Ok(())
}

pub(crate) fn bound<'a>(solution: &'a Bindings, var: &str, query: &str) -> Result<&'a Value> {
    solution.get(var).ok_or_else(|| NeemError::MissingBinding {
        var: var.to_string(),
        query: query.trim().to_string(),
    })
}

pub(crate) fn bound_str(solution: &Bindings, var: &str, query: &str) -> Result<String> {
    match bound(solution, var, query)? {
        Value::String(s) => Ok(s.clone()),
        other => Ok(other.to_string()),
    }
}

fn bound_f64(solution: &Bindings, var: &str, query: &str) -> Result<f64> {
    let value = bound(solution, var, query)?;
    crate::payload::lenient_f64(value).ok_or_else(|| NeemError::MissingBinding {
        var: format!("{var} (number, got {value})"),
        query: query.trim().to_string(),
    })
}

/// Distinct values of `var`, in first-seen order.
fn unique_str(solutions: &[Bindings], var: &str, query: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for solution in solutions {
        let value = bound_str(solution, var, query)?;
        if seen.insert(value.clone()) {
            out.push(value);
        }
    }
    Ok(out)
}
