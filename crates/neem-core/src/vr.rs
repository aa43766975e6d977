//! Operations used by VR game clients to record their sessions as NEEMs.

use rosprolog_client::Bindings;
use serde_json::Value;

use crate::error::{NeemError, Result};
use crate::neem::{bound_str, NeemInterface};
use crate::payload::{parse_participants, PouringInfo, PouringRole};
use crate::query;

/// A sub-action logged by a VR client.
#[derive(Debug, Clone)]
pub struct VrSubAction {
    pub parent_action_iri: String,
    pub sub_action_type: String,
    pub task_type: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Bracketed `Class:Individual` list.
    pub objects_participated: String,
    /// Normalized `additional_event_info`, if any.
    pub additional_info: Option<Value>,
    pub participant: String,
}

impl NeemInterface {
    /// Binds `Actor` to a fresh natural person.
    pub fn create_actor(&self) -> Result<Bindings> {
        let solution = self.reasoner().ensure_once(&query::create_actor())?;
        tracing::info!(actor = ?solution.get_str("Actor"), "created actor");
        Ok(solution)
    }

    /// `Actor` bound to a list of `[iri]` lists.
    pub fn find_all_actors(&self) -> Result<Bindings> {
        Ok(self.reasoner().ensure_once(&query::find_all_actors())?)
    }

    pub fn create_actor_by_given_name(&self, name: &str) -> Result<Bindings> {
        Ok(self
            .reasoner()
            .ensure_once(&query::create_actor_by_given_name(name))?)
    }

    /// The reasoner's clock, bound as `Time`.
    pub fn get_time(&self) -> Result<Bindings> {
        Ok(self.reasoner().ensure_once(&query::get_time())?)
    }

    /// Start logging tf frames and project the episode skeleton. Binds
    /// `Episode`, `Action`, `TimeInterval`, `Task` and `Role`.
    pub fn start_vr_episode(&self, participant: &str, start_time: Option<f64>) -> Result<Bindings> {
        Ok(self
            .reasoner()
            .ensure_once(&query::start_vr_episode(participant, start_time))?)
    }

    /// Close the episode's interval and stop logging tf frames. Binds
    /// `Action` and `TimeInterval`.
    pub fn stop_vr_episode(&self, episode: &str, end_time: Option<f64>) -> Result<Bindings> {
        Ok(self
            .reasoner()
            .ensure_once(&query::stop_vr_episode(episode, end_time))?)
    }

    /// Project a logged sub-action with its task, interval, performer and
    /// participating objects, plus pouring annotations when the sub-action
    /// type carries them.
    pub fn add_vr_subaction_with_task(&self, sub: &VrSubAction) -> Result<Bindings> {
        let q = query::vr_subaction(
            &sub.parent_action_iri,
            &sub.sub_action_type,
            &sub.task_type,
            sub.start_time,
            sub.end_time,
            &sub.participant,
        );
        let solution = self.reasoner().ensure_once(&q)?;
        let sub_action = bound_str(&solution, "SubAction", &q)?;

        for p in parse_participants(&sub.objects_participated) {
            self.reasoner().ensure_once(&query::vr_participant(
                &sub_action,
                &p.individual_iri(),
                &p.class_iri(),
            ))?;
        }

        match &sub.additional_info {
            Some(info) => {
                let interval = bound_str(&solution, "TimeInterval", &q)?;
                self.add_additional_pouring_information(&sub.sub_action_type, Some(info), &interval)?;
            }
            None if PouringRole::for_sub_action(&sub.sub_action_type).is_some() => {
                tracing::warn!(
                    sub_action = %sub_action,
                    "pouring sub-action without additional_event_info"
                );
            }
            None => {}
        }

        Ok(solution)
    }

    /// Annotate the container of a pouring sub-action. Returns `None` without
    /// touching the knowledge base when `sub_action_type` is not a pouring
    /// type.
    pub fn add_additional_pouring_information(
        &self,
        sub_action_type: &str,
        info: Option<&Value>,
        time_interval: &str,
    ) -> Result<Option<PouringInfo>> {
        let Some(role) = PouringRole::for_sub_action(sub_action_type) else {
            return Ok(None);
        };
        let info = info.ok_or_else(|| {
            NeemError::InvalidPayload(format!("{sub_action_type} needs additional_event_info"))
        })?;
        let pouring = PouringInfo::parse(info, role)?;

        self.reasoner().ensure_once(&query::pouring_container(
            role.role_class(),
            &pouring.container,
            &pouring.max_pouring_angle.to_data(),
            &pouring.min_pouring_angle.to_data(),
            time_interval,
        ))?;
        for position in &pouring.positions {
            self.reasoner().ensure_once(&query::pouring_position(
                &pouring.container,
                &position.to_data(),
                time_interval,
            ))?;
        }
        Ok(Some(pouring))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosprolog_client::MockReasoner;
    use serde_json::json;
    use std::sync::Arc;

    fn iface(mock: MockReasoner) -> (Arc<MockReasoner>, NeemInterface) {
        let mock = Arc::new(mock);
        let neem = NeemInterface::new(mock.clone(), 1).unwrap();
        (mock, neem)
    }

    fn subaction_mock() -> MockReasoner {
        MockReasoner::new().on(
            "dul:hasConstituent",
            vec![Bindings::new()
                .with("SubAction", "http://www.ease-crc.org/ont/SOMA.owl#PouredOut_A")
                .with("Task", "task_1")
                .with("TimeInterval", "ti_1")],
        )
    }

    fn sub(sub_action_type: &str, objects: &str, info: Option<Value>) -> VrSubAction {
        VrSubAction {
            parent_action_iri: "act_0".into(),
            sub_action_type: sub_action_type.into(),
            task_type: "soma:'Pouring'".into(),
            start_time: 1.0,
            end_time: 2.0,
            objects_participated: objects.into(),
            additional_info: info,
            participant: "Alice".into(),
        }
    }

    #[test]
    fn subaction_adds_one_participant_per_entry() {
        let (mock, neem) = iface(subaction_mock());
        let solution = neem
            .add_vr_subaction_with_task(&sub("soma:'Grasping'", "[Cup:BlueCup,broken,Bowl:Bowl]", None))
            .unwrap();
        assert_eq!(solution.get_str("Task"), Some("task_1"));

        let parts = mock.queries_containing("dul:'hasParticipant'");
        assert_eq!(parts.len(), 2);
        assert!(parts[0].contains("has_type(soma:'BlueCup_1', soma:'Cup')"));
        assert!(parts[0].contains("holds('http://www.ease-crc.org/ont/SOMA.owl#PouredOut_A'"));
        assert!(parts[1].contains("soma:'Bowl_1'"));
    }

    #[test]
    fn poured_out_adds_source_container_annotations() {
        let (mock, neem) = iface(subaction_mock());
        let info = json!({
            "MaxPouringAngle": {"X": "1", "Y": "2", "Z": "3"},
            "MinPouringAngle": {"X": "4", "Y": "5", "Z": "6"},
            "SCName": "Cup",
            "SCPoses": [{"X": "0.1", "Y": "0.2", "Z": "0.3"}]
        });
        neem.add_vr_subaction_with_task(&sub("soma:'PouredOut'", "[]", Some(info)))
            .unwrap();

        let roles = mock.queries_containing("soma:'SourceContainer'");
        assert_eq!(roles.len(), 1);
        assert!(roles[0].contains("has_role(soma:'Cup', ContainerRole)"));
        assert!(roles[0].contains("'hasMaxPouringAngleData', '1,2,3'"));
        assert!(roles[0].contains("'isObservableAt', 'ti_1'"));
        let positions = mock.queries_containing("soma:'3DPosition'");
        assert_eq!(positions.len(), 1);
        assert!(positions[0].contains("'0.1,0.2,0.3'"));
    }

    #[test]
    fn non_pouring_types_are_a_no_op() {
        let (mock, neem) = iface(MockReasoner::new());
        let out = neem
            .add_additional_pouring_information("soma:'Grasping'", Some(&json!({})), "ti")
            .unwrap();
        assert!(out.is_none());
        assert!(mock.queries().is_empty());
    }

    #[test]
    fn pouring_without_info_is_invalid() {
        let (_, neem) = iface(MockReasoner::new());
        let err = neem
            .add_additional_pouring_information("soma:'PouredInTo'", None, "ti")
            .unwrap_err();
        assert!(matches!(err, NeemError::InvalidPayload(_)));
    }

    #[test]
    fn vr_episode_lifecycle_queries() {
        let (mock, neem) = iface(MockReasoner::new());
        neem.start_vr_episode("Alice", Some(100.0)).unwrap();
        neem.stop_vr_episode("ep_1", None).unwrap();
        let qs = mock.queries();
        assert!(qs[0].contains("hasIntervalBegin', 100.0)"));
        assert!(qs[1].contains("triple('ep_1', dul:'includesAction', Action)"));
        assert!(qs[1].contains("get_time(Time)"));
    }
}
