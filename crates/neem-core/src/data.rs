//! Named, parameterless queries over a loaded NEEM, plus the VR session
//! operations exposed by the REST facade.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rosprolog_client::term::atom;
use rosprolog_client::Bindings;
use serde_json::{json, Value};

use crate::error::{NeemError, Result};
use crate::neem::NeemInterface;
use crate::payload::PouringInfo;
use crate::vr::VrSubAction;

// ---------------------------------------------------------------------------
// DataQuery
// ---------------------------------------------------------------------------

/// Catalog of canned NEEM-data queries, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataQuery {
    LoadNeemToKb,
    InsertFactToKb,
    GetAllActions,
    GetAllActionsStartTimestamps,
    GetAllActionsEndTimestamps,
    GetAllObjectsParticipatesInActions,
    GetHandposeAtStartOfAction,
    GetSourceContainerWhilePouring,
    GetSourceContainerPoseWhilePouring,
    GetTargetContainerPoseWhilePouring,
    GetAllObjRolesWhichParticipateEachEvent,
    GetShapeForSourceContainerObjects,
    GetColorForSourceContainerObjects,
    GetTargetObjForPouring,
    GetPouringSide,
    GetMaxPouringAngleForSourceObj,
    GetMinPouringAngleForSourceObj,
    GetPouringEventTimeDuration,
    GetMotionForPouring,
    GetHandUsedForPouring,
    CreateActor,
    FindAllActors,
    GetTime,
}

const POURING_TASK: &str = "has_type(Tsk, soma:'Pouring'),executes_task(Act, Tsk)";
const POURING_TASK_IRI: &str =
    "has_type(Tsk, 'http://www.ease-crc.org/ont/SOMA-ACT.owl#Pouring'),executes_task(Act, Tsk)";
const GRASPING_TASK: &str = "has_type(Tsk, soma:'Grasping'),executes_task(Act, Tsk)";

impl DataQuery {
    pub const ALL: [DataQuery; 23] = [
        DataQuery::LoadNeemToKb,
        DataQuery::InsertFactToKb,
        DataQuery::GetAllActions,
        DataQuery::GetAllActionsStartTimestamps,
        DataQuery::GetAllActionsEndTimestamps,
        DataQuery::GetAllObjectsParticipatesInActions,
        DataQuery::GetHandposeAtStartOfAction,
        DataQuery::GetSourceContainerWhilePouring,
        DataQuery::GetSourceContainerPoseWhilePouring,
        DataQuery::GetTargetContainerPoseWhilePouring,
        DataQuery::GetAllObjRolesWhichParticipateEachEvent,
        DataQuery::GetShapeForSourceContainerObjects,
        DataQuery::GetColorForSourceContainerObjects,
        DataQuery::GetTargetObjForPouring,
        DataQuery::GetPouringSide,
        DataQuery::GetMaxPouringAngleForSourceObj,
        DataQuery::GetMinPouringAngleForSourceObj,
        DataQuery::GetPouringEventTimeDuration,
        DataQuery::GetMotionForPouring,
        DataQuery::GetHandUsedForPouring,
        DataQuery::CreateActor,
        DataQuery::FindAllActors,
        DataQuery::GetTime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DataQuery::LoadNeemToKb => "load_neem_to_kb",
            DataQuery::InsertFactToKb => "insert_fact_to_kb",
            DataQuery::GetAllActions => "get_all_actions",
            DataQuery::GetAllActionsStartTimestamps => "get_all_actions_start_timestamps",
            DataQuery::GetAllActionsEndTimestamps => "get_all_actions_end_timestamps",
            DataQuery::GetAllObjectsParticipatesInActions => "get_all_objects_participates_in_actions",
            DataQuery::GetHandposeAtStartOfAction => "get_handpose_at_start_of_action",
            DataQuery::GetSourceContainerWhilePouring => "get_source_container_while_pouring",
            DataQuery::GetSourceContainerPoseWhilePouring => "get_source_container_pose_while_pouring",
            DataQuery::GetTargetContainerPoseWhilePouring => "get_target_container_pose_while_pouring",
            DataQuery::GetAllObjRolesWhichParticipateEachEvent => {
                "get_all_obj_roles_which_participate_each_event"
            }
            DataQuery::GetShapeForSourceContainerObjects => "get_shape_for_source_container_objects",
            DataQuery::GetColorForSourceContainerObjects => "get_color_for_source_container_objects",
            DataQuery::GetTargetObjForPouring => "get_target_obj_for_pouring",
            DataQuery::GetPouringSide => "get_pouring_side",
            DataQuery::GetMaxPouringAngleForSourceObj => "get_max_pouring_angle_for_source_obj",
            DataQuery::GetMinPouringAngleForSourceObj => "get_min_pouring_angle_for_source_obj",
            DataQuery::GetPouringEventTimeDuration => "get_pouring_event_time_duration",
            DataQuery::GetMotionForPouring => "get_motion_for_pouring",
            DataQuery::GetHandUsedForPouring => "get_hand_used_for_pouring",
            DataQuery::CreateActor => "create_actor",
            DataQuery::FindAllActors => "find_all_actors",
            DataQuery::GetTime => "get_time",
        }
    }

    /// Strict queries fail when there is no solution; lenient ones answer
    /// `null`.
    pub fn is_strict(self) -> bool {
        matches!(
            self,
            DataQuery::LoadNeemToKb
                | DataQuery::InsertFactToKb
                | DataQuery::GetAllActions
                | DataQuery::GetAllActionsStartTimestamps
                | DataQuery::GetAllActionsEndTimestamps
                | DataQuery::GetAllObjectsParticipatesInActions
                | DataQuery::GetSourceContainerWhilePouring
                | DataQuery::CreateActor
                | DataQuery::FindAllActors
                | DataQuery::GetTime
        )
    }

    /// Prolog text for this query. Actor and clock queries are answered by
    /// [`NeemInterface`] instead and have no text here.
    pub fn text(self, neem_uri: &str) -> Option<String> {
        let q = match self {
            DataQuery::LoadNeemToKb | DataQuery::InsertFactToKb => {
                format!("remember({})", atom(neem_uri))
            }
            DataQuery::GetAllActions => "findall([Act],is_action(Act), Act)".to_string(),
            DataQuery::GetAllActionsStartTimestamps => {
                "findall([Begin, Evt], event_interval(Evt, Begin, _), StartTimes)".to_string()
            }
            DataQuery::GetAllActionsEndTimestamps => {
                "findall([End, Evt], event_interval(Evt, _, End), EndTimes)".to_string()
            }
            DataQuery::GetAllObjectsParticipatesInActions => {
                "findall([Act, Obj], has_participant(Act, Obj), Obj)".to_string()
            }
            DataQuery::GetHandposeAtStartOfAction => "executes_task(Action, Task),has_type(Task, soma:'Grasping'),\
                event_interval(Action, Start, End),time_scope(Start, End, QScope),\
                tf:tf_get_pose('http://knowrob.org/kb/pouring_hands_map.owl#right_hand_1', [map, Pose, Rotation], QScope,_)"
                .to_string(),
            DataQuery::GetSourceContainerWhilePouring => format!(
                "{POURING_TASK}, has_participant(Act, Obj), has_type(Role, soma:'SourceContainer'), \
                 has_role(Obj, Role), has_type(Obj, ObjType)"
            ),
            DataQuery::GetSourceContainerPoseWhilePouring => container_pose("SourceContainer"),
            DataQuery::GetTargetContainerPoseWhilePouring => container_pose("DestinationContainer"),
            DataQuery::GetAllObjRolesWhichParticipateEachEvent => "findall([Act, Obj, ObjType, Role], \
                (has_participant(Act, Obj), has_type(Obj, ObjType), triple(Obj, dul:'hasRole', Role)), Obj)"
                .to_string(),
            DataQuery::GetShapeForSourceContainerObjects => format!(
                "{GRASPING_TASK}, has_participant(Act, Obj), has_type(Role, soma:'SourceContainer'),\
                 triple(Obj, dul:'hasRole', Role), triple(Obj, soma:'hasShape', Shape), has_region(Shape, ShapeRegion)"
            ),
            DataQuery::GetColorForSourceContainerObjects => format!(
                "{GRASPING_TASK}, has_participant(Act, Obj), has_type(Role, soma:'SourceContainer'),\
                 triple(Obj, dul:'hasRole', Role), triple(Obj, soma:'hasColor', Color), has_region(Color, ColorRegion)"
            ),
            DataQuery::GetTargetObjForPouring => format!(
                "{POURING_TASK}, has_participant(Act, Obj), has_type(Role, soma:'DestinationContainer'), \
                 has_role(Obj, Role), has_type(Obj, ObjType)"
            ),
            DataQuery::GetPouringSide => format!(
                "{POURING_TASK_IRI}, has_participant(Act, Obj), triple(Obj, dul:'hasLocation', Location)"
            ),
            DataQuery::GetMaxPouringAngleForSourceObj => pouring_angle("hasMaxPouringAngleData", "MAXAngle"),
            DataQuery::GetMinPouringAngleForSourceObj => pouring_angle("hasMinPouringAngleData", "MinAngle"),
            DataQuery::GetPouringEventTimeDuration => {
                format!("{POURING_TASK}, event_interval(Act, Begin, End)")
            }
            DataQuery::GetMotionForPouring => format!(
                "{POURING_TASK_IRI}, triple(Motion, dul:'classifies', Act), \
                 triple(Motion,dul:'isClassifiedBy', Role), triple(Obj, dul:'hasRole', Role)"
            ),
            DataQuery::GetHandUsedForPouring => format!("{POURING_TASK_IRI}, has_type(Hand, soma:'Hand')"),
            DataQuery::CreateActor | DataQuery::FindAllActors | DataQuery::GetTime => return None,
        };
        Some(q)
    }
}

fn container_pose(role: &str) -> String {
    format!(
        "{POURING_TASK}, has_participant(Act, Obj), has_type(Role, soma:'{role}'), has_role(Obj, Role), \
         holds(Role, dul:'isObservableAt', TI), holds(Obj, dul:'hasRegion', ThreeDPose), \
         holds(ThreeDPose, dul:'isObservableAt', TI), holds(ThreeDPose, soma:'hasPositionData', Pose)"
    )
}

fn pouring_angle(predicate: &str, var: &str) -> String {
    format!(
        "{POURING_TASK}, has_participant(Act, Obj), has_type(Role, soma:'SourceContainer'), has_role(Obj, Role), \
         holds(Role, dul:'isObservableAt', TI), holds(Obj, dul:'hasRegion', SixDPose), \
         holds(SixDPose, dul:'isObservableAt', TI), holds(SixDPose, soma:'{predicate}', {var})"
    )
}

impl fmt::Display for DataQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataQuery {
    type Err = NeemError;

    fn from_str(s: &str) -> Result<Self> {
        DataQuery::ALL
            .iter()
            .copied()
            .find(|q| q.name() == s)
            .ok_or_else(|| NeemError::UnknownQuery(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// NeemData
// ---------------------------------------------------------------------------

/// Read access to a NEEM plus the VR session operations, shaped for JSON
/// responses.
pub struct NeemData {
    neem: Arc<NeemInterface>,
    neem_uri: String,
}

impl NeemData {
    pub fn new(neem: Arc<NeemInterface>, neem_uri: impl Into<String>) -> Self {
        Self {
            neem,
            neem_uri: neem_uri.into(),
        }
    }

    pub fn neem(&self) -> &Arc<NeemInterface> {
        &self.neem
    }

    /// Run a canned query and return its result as JSON. Lenient queries
    /// without a solution answer `null`.
    pub fn run(&self, query: DataQuery) -> Result<Value> {
        match query {
            DataQuery::CreateActor => return Ok(self.neem.create_actor()?.into_value()),
            DataQuery::FindAllActors => return self.find_all_actors(),
            DataQuery::GetTime => return Ok(self.neem.get_time()?.into_value()),
            _ => {}
        }
        let text = query
            .text(&self.neem_uri)
            .ok_or_else(|| NeemError::UnknownQuery(query.name().to_string()))?;
        tracing::debug!(query = %query, "running data query");

        let reasoner = self.neem.reasoner();
        if query.is_strict() {
            Ok(reasoner.ensure_once(&text)?.into_value())
        } else {
            Ok(reasoner.once(&text)?.map(Bindings::into_value).unwrap_or(Value::Null))
        }
    }

    /// Run the canned query called `name`.
    pub fn run_named(&self, name: &str) -> Result<Value> {
        self.run(name.parse()?)
    }

    /// Every natural person as `[{"Actor": iri}, ...]`.
    pub fn find_all_actors(&self) -> Result<Value> {
        let solution = self.neem.find_all_actors()?;
        let actors: Vec<Value> = solution
            .get("Actor")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| match row {
                        Value::Array(cells) => cells.first().cloned(),
                        other => Some(other.clone()),
                    })
                    .map(|actor| json!({ "Actor": actor }))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Value::Array(actors))
    }

    pub fn create_actor_by_given_name(&self, name: &str) -> Result<Value> {
        Ok(self.neem.create_actor_by_given_name(name)?.into_value())
    }

    /// Register `participant` as a natural person, then start a VR episode
    /// performed by them.
    pub fn create_episode(&self, participant: &str, start_time: Option<f64>) -> Result<Value> {
        self.neem.create_actor_by_given_name(participant)?;
        Ok(self.neem.start_vr_episode(participant, start_time)?.into_value())
    }

    pub fn finish_episode(&self, episode: &str, end_time: Option<f64>) -> Result<Value> {
        Ok(self.neem.stop_vr_episode(episode, end_time)?.into_value())
    }

    pub fn add_subaction_with_task(&self, sub: &VrSubAction) -> Result<Value> {
        Ok(self.neem.add_vr_subaction_with_task(sub)?.into_value())
    }

    /// Summary of the applied annotations. Non-pouring types answer `{}`.
    pub fn add_additional_pouring_information(
        &self,
        sub_action_type: &str,
        info: Option<&Value>,
        time_interval: &str,
    ) -> Result<Value> {
        let applied: Option<PouringInfo> =
            self.neem
                .add_additional_pouring_information(sub_action_type, info, time_interval)?;
        Ok(match applied {
            Some(p) => json!({
                "SubActionType": sub_action_type,
                "TimeInterval": time_interval,
                "Container": p.container,
                "Role": p.role.role_class(),
                "Positions": p.positions.len(),
            }),
            None => json!({}),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosprolog_client::MockReasoner;

    fn data(mock: MockReasoner) -> (Arc<MockReasoner>, NeemData) {
        let mock = Arc::new(mock);
        let neem = Arc::new(NeemInterface::new(mock.clone(), 1).unwrap());
        (mock, NeemData::new(neem, "/data/neems/pouring"))
    }

    #[test]
    fn names_roundtrip_and_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for q in DataQuery::ALL {
            assert_eq!(q.name().parse::<DataQuery>().unwrap(), q);
            assert!(seen.insert(q.name()));
        }
        assert_eq!(seen.len(), 23);
    }

    #[test]
    fn unknown_name_is_unknown_query() {
        assert!(matches!(
            "drop_database".parse::<DataQuery>(),
            Err(NeemError::UnknownQuery(n)) if n == "drop_database"
        ));
    }

    #[test]
    fn only_actor_and_clock_queries_lack_text() {
        for q in DataQuery::ALL {
            let delegated = matches!(q, DataQuery::CreateActor | DataQuery::FindAllActors | DataQuery::GetTime);
            assert_eq!(q.text("/n").is_none(), delegated, "{q}");
        }
    }

    #[test]
    fn load_neem_uses_configured_uri() {
        let (mock, data) = data(MockReasoner::new());
        data.run(DataQuery::LoadNeemToKb).unwrap();
        assert_eq!(mock.queries(), vec!["remember('/data/neems/pouring')".to_string()]);
    }

    #[test]
    fn lenient_query_without_solution_is_null() {
        let (_, data) = data(MockReasoner::new().on("soma:'Hand'", vec![]));
        assert_eq!(data.run_named("get_hand_used_for_pouring").unwrap(), Value::Null);
    }

    #[test]
    fn strict_query_without_solution_fails() {
        let (_, data) = data(MockReasoner::new().on("is_action(Act)", vec![]));
        let err = data.run(DataQuery::GetAllActions).unwrap_err();
        assert!(err.is_empty_result());
    }

    #[test]
    fn find_all_actors_flattens_rows() {
        let (_, data) = data(MockReasoner::new().on(
            "findall([Actor]",
            vec![Bindings::new().with("Actor", json!([["actor_a"], ["actor_b"]]))],
        ));
        assert_eq!(
            data.run(DataQuery::FindAllActors).unwrap(),
            json!([{"Actor": "actor_a"}, {"Actor": "actor_b"}])
        );
    }

    #[test]
    fn create_episode_registers_actor_first() {
        let (mock, data) = data(MockReasoner::new());
        data.create_episode("Alice", None).unwrap();
        let qs = mock.queries();
        assert_eq!(qs.len(), 2);
        assert!(qs[0].contains("has_type('Alice', dul:'NaturalPerson')"));
        assert!(qs[1].starts_with("tf_logger_enable"));
    }

    #[test]
    fn pouring_summary_for_non_pouring_is_empty() {
        let (_, data) = data(MockReasoner::new());
        assert_eq!(
            data.add_additional_pouring_information("soma:'Grasping'", None, "ti").unwrap(),
            json!({})
        );
    }
}
