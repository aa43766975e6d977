//! Prolog goal templates for every knowledge-base operation.
//!
//! Each function only renders text; nothing here talks to the reasoner.
//! Parameters that name entities go through [`atom`], timestamps through
//! [`float`]. Variables bound by a template are listed in its doc line.

use rosprolog_client::term::{atom, float};

// ---------------------------------------------------------------------------
// Memory / episode lifecycle
// ---------------------------------------------------------------------------

pub fn clear_memory() -> String {
    "mem_clear_memory".to_string()
}

pub fn ensure_loaded(path: &str) -> String {
    format!("ensure_loaded({})", atom(path))
}

/// Binds `Action`.
#[allow(clippy::too_many_arguments)]
pub fn episode_start(
    task_type: &str,
    env_owl: &str,
    env_owl_ind_name: &str,
    env_urdf: &str,
    agent_owl: &str,
    agent_owl_ind_name: &str,
    agent_urdf: &str,
    start_time: f64,
) -> String {
    format!(
        "mem_episode_start(Action, {}, {}, {}, {}, {}, {}, {}, {})",
        atom(task_type),
        atom(env_owl),
        atom(env_owl_ind_name),
        atom(env_urdf),
        atom(agent_owl),
        atom(agent_owl_ind_name),
        atom(agent_urdf),
        float(start_time)
    )
}

pub fn episode_stop(neem_path: &str, end_time: f64) -> String {
    format!("mem_episode_stop({}, {})", atom(neem_path), float(end_time))
}

/// Binds `Episode`.
pub fn episode_for_action(action: &str) -> String {
    format!("kb_call(is_setting_for(Episode, {}))", atom(action))
}

pub fn load_neem(neem_path: &str) -> String {
    format!("mem_clear_memory, remember({})", atom(neem_path))
}

// ---------------------------------------------------------------------------
// Actions, participants, intervals
// ---------------------------------------------------------------------------

/// Binds `SubAction`.
pub fn add_subaction_with_task(parent: &str, sub_action_type: &str, task_type: &str) -> String {
    format!(
        "mem_add_subaction_with_task({},{},{},SubAction)",
        atom(parent),
        atom(sub_action_type),
        atom(task_type)
    )
}

pub fn project_time_interval(iri: &str, start: f64, end: f64) -> String {
    format!(
        "kb_project(has_time_interval({}, {}, {}))",
        atom(iri),
        float(start),
        float(end)
    )
}

pub fn add_participant_with_role(action: &str, participant: &str, role_type: &str) -> String {
    format!(
        "mem_add_participant_with_role({}, {}, {})",
        atom(action),
        atom(participant),
        atom(role_type)
    )
}

// ---------------------------------------------------------------------------
// Poses and trajectories
// ---------------------------------------------------------------------------

pub fn tf_set_pose_at(frame: &str, pose: &str, timestamp: f64) -> String {
    let t = float(timestamp);
    format!(
        "time_scope({t}, {t}, QS), tf_set_pose({}, {pose}, QS)",
        atom(frame)
    )
}

/// Store `pose` for `obj` valid over `[start, end]`, with the tf logger
/// switched on for the duration of the call.
pub fn object_pose(obj: &str, pose: &str, start: f64, end: f64) -> String {
    format!(
        "tf_logger_enable, time_scope({}, {}, QS), tf_set_pose({}, {pose}, QS), tf_logger_disable",
        float(start),
        float(end),
        atom(obj)
    )
}

/// Binds `Pose`.
pub fn get_object_pose(obj: &str, timestamp: Option<f64>) -> String {
    match timestamp {
        Some(t) => format!("mem_tf_get({}, Pose, {})", atom(obj), float(t)),
        None => format!("mem_tf_get({}, Pose)", atom(obj)),
    }
}

/// Binds `Trajectory`.
pub fn tf_trajectory(obj: &str, start: f64, end: f64) -> String {
    format!(
        "tf_mng_trajectory({}, {}, {}, Trajectory)",
        atom(obj),
        float(start),
        float(end)
    )
}

/// Binds `Trajectory`.
pub fn wrench_trajectory(obj: &str, start: f64, end: f64) -> String {
    format!(
        "wrench_mng_trajectory({}, {}, {}, Trajectory)",
        atom(obj),
        float(start),
        float(end)
    )
}

// ---------------------------------------------------------------------------
// States, transitions, agents, situations
// ---------------------------------------------------------------------------

/// Binds `Transition`, `InitialState` and `TerminalState`.
pub fn assert_transition(agent: &str, object: &str, start: f64, end: f64) -> String {
    let agent = atom(agent);
    let object = atom(object);
    let start = float(start);
    let end = float(end);
    format!(
        "kb_project([
            new_iri(InitialScene, soma:'Scene'), is_individual(InitialScene), instance_of(InitialScene, soma:'Scene'),
            new_iri(InitialState, soma:'State'), is_state(InitialState),
            has_participant(InitialState, {object}),
            has_participant(InitialState, {agent}),
            holds(InitialScene, dul:'includesEvent', InitialState),
            has_time_interval(InitialState, {start}, {start}),
            new_iri(TerminalScene, soma:'Scene'), is_individual(TerminalScene), instance_of(TerminalScene, soma:'Scene'),
            new_iri(TerminalState, soma:'State'), is_state(TerminalState),
            has_participant(TerminalState, {object}),
            has_participant(TerminalState, {agent}),
            holds(TerminalScene, dul:'includesEvent', TerminalState),
            has_time_interval(TerminalState, {end}, {end}),
            new_iri(Transition, dul:'Transition'), is_individual(Transition), instance_of(Transition, soma:'StateTransition'),
            holds(Transition, soma:'hasInitialScene', InitialScene),
            holds(Transition, soma:'hasTerminalScene', TerminalScene)
        ])"
    )
}

/// Binds `Agent`.
pub fn new_agent(agent_type: &str) -> String {
    format!(
        "kb_project([new_iri(Agent, dul:'Agent'), is_individual(Agent), instance_of(Agent, {})])",
        atom(agent_type)
    )
}

pub fn has_end_link(agent: &str, effector: &str) -> String {
    format!("kb_project(has_end_link({}, {}))", atom(agent), atom(effector))
}

/// Binds `State`.
pub fn new_state(state_class: &str, state_type: &str) -> String {
    format!(
        "kb_project([
            new_iri(State, soma:'State'), is_individual(State), instance_of(State, {}),
            new_iri(StateType, soma:'StateType'), is_individual(StateType), instance_of(StateType, {}),
            holds(StateType, dul:'classifies', State)
        ])",
        atom(state_class),
        atom(state_type)
    )
}

pub fn has_participant(event: &str, participant: &str) -> String {
    format!(
        "kb_project(has_participant({}, {}))",
        atom(event),
        atom(participant)
    )
}

/// Binds `Situation`.
pub fn new_situation(situation_type: &str, agent: &str) -> String {
    let situation_type = atom(situation_type);
    format!(
        "kb_project([
            new_iri(Situation, {situation_type}), is_individual(Situation), instance_of(Situation, {situation_type}),
            holds(Situation, dul:'includesAgent', {})
        ])",
        atom(agent)
    )
}

pub fn situation_includes_object(situation: &str, obj: &str) -> String {
    format!(
        "kb_project(holds({}, dul:'includesObject', {}))",
        atom(situation),
        atom(obj)
    )
}

// ---------------------------------------------------------------------------
// Read-only lookups
// ---------------------------------------------------------------------------

/// Binds `Action`.
pub fn all_actions(action_type: Option<&str>) -> String {
    match action_type {
        Some(t) => format!("is_action(Action), instance_of(Action, {})", atom(t)),
        None => "is_action(Action)".to_string(),
    }
}

/// Binds `State`.
pub fn all_states() -> String {
    "is_state(State)".to_string()
}

/// Binds `Begin` and `End`.
pub fn event_interval(event: &str) -> String {
    format!("event_interval({}, Begin, End)", atom(event))
}

/// Binds `Task`.
pub fn tasks_for_action(action: &str) -> String {
    format!(
        "kb_call([executes_task({}, Task), instance_of(Task, TaskType), subclass_of(TaskType, dul:'Task')])",
        atom(action)
    )
}

/// Binds `X`.
pub fn triple_objects(subject: &str, predicate: &str) -> String {
    format!("kb_call(holds({}, {}, X))", atom(subject), atom(predicate))
}

/// Binds `X`.
pub fn triple_subjects(predicate: &str, object: &str) -> String {
    format!("kb_call(holds(X, {}, {}))", atom(predicate), atom(object))
}

// ---------------------------------------------------------------------------
// VR experiment
// ---------------------------------------------------------------------------

/// Binds `Actor`.
pub fn create_actor() -> String {
    "kb_project([new_iri(Actor, dul:'NaturalPerson'), has_type(Actor, dul:'NaturalPerson')])".to_string()
}

/// Binds `Actor` to a list of one-element lists.
pub fn find_all_actors() -> String {
    "findall([Actor],(is_agent(Actor), has_type(Actor, dul:'NaturalPerson')), Actor)".to_string()
}

pub fn create_actor_by_given_name(name: &str) -> String {
    format!(
        "kb_project([has_type({}, dul:'NaturalPerson')])",
        atom(name)
    )
}

/// Binds `Time`.
pub fn get_time() -> String {
    "get_time(Time)".to_string()
}

/// Binds `Episode`, `Action`, `TimeInterval`, `Task` and `Role`. Without a
/// start time the interval begins at the reasoner's clock, read after the tf
/// logger is enabled.
pub fn start_vr_episode(participant: &str, start_time: Option<f64>) -> String {
    let participant = atom(participant);
    let (clock, begin) = match start_time {
        Some(t) => (String::new(), float(t)),
        None => ("get_time(Time),\n        ".to_string(), "Time".to_string()),
    };
    format!(
        "tf_logger_enable,
        {clock}kb_project([
            new_iri(Episode, soma:'Episode'), has_type(Episode, soma:'Episode'),
            new_iri(Action, dul:'Action'), has_type(Action, dul:'Action'),
            new_iri(TimeInterval, dul:'TimeInterval'), has_type(TimeInterval, dul:'TimeInterval'),
            holds(Action, dul:'hasTimeInterval', TimeInterval),
            holds(TimeInterval, soma:'hasIntervalBegin', {begin}),
            new_iri(Task, dul:'Task'), has_type(Task, dul:'Task'), executes_task(Action, Task),
            is_setting_for(Episode, Task),
            triple(Episode, dul:includesAction, Action),
            has_type({participant}, dul:'NaturalPerson'), is_performed_by(Action, {participant}),
            triple(Episode, dul:includesAgent, {participant}),
            new_iri(Role, soma:'AgentRole'), has_type(Role, soma:'AgentRole'), has_role({participant}, Role)
        ])"
    )
}

/// Binds `Action` and `TimeInterval`. The clock is read before the tf
/// logger is disabled when no end time is given.
pub fn stop_vr_episode(episode: &str, end_time: Option<f64>) -> String {
    let (clock, end) = match end_time {
        Some(t) => (String::new(), float(t)),
        None => ("get_time(Time),\n        ".to_string(), "Time".to_string()),
    };
    format!(
        "{clock}tf_logger_disable,
        triple({}, dul:'includesAction', Action),
        holds(Action, dul:'hasTimeInterval', TimeInterval),
        kb_project([holds(TimeInterval, soma:'hasIntervalEnd', {end})])",
        atom(episode)
    )
}

/// Binds `SubAction`, `Task` and `TimeInterval`.
pub fn vr_subaction(
    parent: &str,
    sub_action_type: &str,
    task_type: &str,
    start: f64,
    end: f64,
    participant: &str,
) -> String {
    let sub_action_type = atom(sub_action_type);
    let task_type = atom(task_type);
    let participant = atom(participant);
    format!(
        "kb_project([
            new_iri(SubAction, {sub_action_type}), has_type(SubAction, {sub_action_type}),
            subclass_of({sub_action_type}, dul:'Action'),
            new_iri(Task, {task_type}), has_type(Task, {task_type}), executes_task(SubAction, Task),
            holds({task_type}, rdfs:subClassOf, dul:'PhysicalTask'),
            triple({}, dul:hasConstituent, SubAction),
            new_iri(TimeInterval, dul:'TimeInterval'), has_type(TimeInterval, dul:'TimeInterval'),
            holds(SubAction, dul:'hasTimeInterval', TimeInterval),
            holds(TimeInterval, soma:'hasIntervalBegin', {}),
            holds(TimeInterval, soma:'hasIntervalEnd', {}),
            has_type({participant}, dul:'NaturalPerson'), is_performed_by(SubAction, {participant})
        ])",
        atom(parent),
        float(start),
        float(end)
    )
}

/// Type `individual` as `class` and make it a participant of `sub_action`.
pub fn vr_participant(sub_action: &str, individual: &str, class: &str) -> String {
    let individual = atom(individual);
    let class = atom(class);
    format!(
        "kb_project([
            has_type({individual}, {class}),
            subclass_of({class}, dul:'PhysicalObject'),
            holds({}, dul:'hasParticipant', {individual})
        ])",
        atom(sub_action)
    )
}

/// Give `container` a `role_class` role observable at `interval`, and attach
/// the max/min pouring-angle regions.
pub fn pouring_container(
    role_class: &str,
    container: &str,
    max_angle: &str,
    min_angle: &str,
    interval: &str,
) -> String {
    let role_class = atom(role_class);
    let container = atom(container);
    let interval = atom(interval);
    format!(
        "kb_project([
            new_iri(ContainerRole, {role_class}), has_type(ContainerRole, {role_class}),
            has_role({container}, ContainerRole),
            holds(ContainerRole, dul:'isObservableAt', {interval}),
            new_iri(SixDPoseMaxAngle, soma:'6DPose'), has_type(SixDPoseMaxAngle, soma:'6DPose'),
            holds(SixDPoseMaxAngle, soma:'hasMaxPouringAngleData', {}),
            holds({container}, dul:'hasRegion', SixDPoseMaxAngle),
            holds(SixDPoseMaxAngle, dul:'isObservableAt', {interval}),
            new_iri(SixDPoseMinAngle, soma:'6DPose'), has_type(SixDPoseMinAngle, soma:'6DPose'),
            holds(SixDPoseMinAngle, soma:'hasMinPouringAngleData', {}),
            holds({container}, dul:'hasRegion', SixDPoseMinAngle),
            holds(SixDPoseMinAngle, dul:'isObservableAt', {interval})
        ])",
        atom(max_angle),
        atom(min_angle)
    )
}

/// Attach one observed 3D position of `container` at `interval`.
pub fn pouring_position(container: &str, position: &str, interval: &str) -> String {
    let container = atom(container);
    format!(
        "kb_project([
            new_iri(Position, soma:'3DPosition'), has_type(Position, soma:'3DPosition'),
            holds(Position, soma:'hasPositionData', {}),
            holds({container}, dul:'hasRegion', Position),
            holds(Position, dul:'isObservableAt', {})
        ])",
        atom(position),
        atom(interval)
    )
}

// ---------------------------------------------------------------------------
// Bootstrap (task learning)
// ---------------------------------------------------------------------------

pub fn natural_language_text(text: &str) -> String {
    format!(
        "kb_project([has_type({}, soma:'Natural_Language_Text')])",
        atom(text)
    )
}

/// Binds `Task` and `Action`. Also used for primitive actions.
pub fn task_type(
    task_type: &str,
    action_type: &str,
    environment: &str,
    environment_type: &str,
    agent: &str,
    agent_type: &str,
) -> String {
    let task_type = atom(task_type);
    let action_type = atom(action_type);
    let environment = atom(environment);
    let agent = atom(agent);
    format!(
        "kb_project([
            new_iri(Task, {task_type}), has_type(Task, {task_type}),
            new_iri(Action, {action_type}), has_type(Action, dul:'Action'),
            executes_task(Action, Task),
            holds(Action, dul:'hasParticipant', {environment}), has_type({environment}, {}),
            holds(Action, dul:'hasParticipant', {agent}), has_type({agent}, {})
        ])",
        atom(environment_type),
        atom(agent_type)
    )
}

/// Add `obj` as participant of `action` playing a fresh `role` individual.
pub fn task_role_object(action: &str, obj: &str, role: &str) -> String {
    let obj = atom(obj);
    let role = atom(role);
    format!(
        "kb_project([
            holds({}, dul:'hasParticipant', {obj}),
            new_iri(Role, {role}), has_type(Role, {role}),
            has_role({obj}, Role)
        ])",
        atom(action)
    )
}

pub fn has_constituent(parent: &str, child: &str) -> String {
    format!(
        "kb_project(triple({}, dul:hasConstituent, {}))",
        atom(parent),
        atom(child)
    )
}

/// Binds `TaskGoal`.
pub fn task_goal(task: &str, goal: &str) -> String {
    format!(
        "kb_project([
            new_iri(TaskGoal, dul:'Goal'), has_type(TaskGoal, dul:'Goal'),
            holds({}, soma:'hasGoal', TaskGoal),
            new_iri(TaskGoalText, soma:'Natural_Language_Text'), has_type(TaskGoalText, soma:'Natural_Language_Text'),
            holds(TaskGoal, dul:'hasDataValue', {}),
            holds(TaskGoal, dul:'isExpressedBy', TaskGoalText)
        ])",
        atom(task),
        atom(goal)
    )
}

/// Binds `PreScene` and `PreState`.
pub fn task_start_condition(action: &str, condition: &str) -> String {
    format!(
        "kb_project([
            new_iri(PreScene, soma:'Scene'), has_type(PreScene, soma:'Scene'),
            new_iri(PreState, soma:'State'), has_type(PreState, soma:'State'),
            holds(PreState, dul:'hasDataValue', {}),
            holds(PreScene, dul:'includesEvent', PreState),
            holds({}, dul:'hasPrecondition', PreScene)
        ])",
        atom(condition),
        atom(action)
    )
}

/// Binds `Type` to a list of one-element lists.
pub fn types_of(obj: &str) -> String {
    format!("findall([Type], has_type({}, Type), Type)", atom(obj))
}

/// Binds `Role` to a list of one-element lists.
pub fn roles_of(obj: &str) -> String {
    format!("findall([Role], has_role({}, Role), Role)", atom(obj))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Brackets and parentheses outside quoted atoms must balance and no
    /// format placeholder may survive.
    fn assert_well_formed(q: &str) {
        assert!(!q.contains('{') && !q.contains('}'), "placeholder left in: {q}");
        let mut stack = Vec::new();
        let mut quoted = false;
        let mut escaped = false;
        for c in q.chars() {
            if quoted {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '\'' => quoted = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '\'' => quoted = true,
                '(' | '[' => stack.push(c),
                ')' => assert_eq!(stack.pop(), Some('('), "unbalanced ')' in: {q}"),
                ']' => assert_eq!(stack.pop(), Some('['), "unbalanced ']' in: {q}"),
                _ => {}
            }
        }
        assert!(!quoted, "unterminated atom in: {q}");
        assert!(stack.is_empty(), "unclosed {stack:?} in: {q}");
    }

    fn catalog() -> Vec<String> {
        let iri = "http://www.ease-crc.org/ont/SOMA.owl#Cup_1";
        vec![
            clear_memory(),
            ensure_loaded("/opt/neem-interface.pl"),
            episode_start("soma:'Pouring'", "env.owl", "Kitchen", "env.urdf", "pr2.owl", "PR2", "pr2.urdf", 1.5),
            episode_stop("/tmp/neem", 2.5),
            episode_for_action(iri),
            load_neem("/tmp/neem"),
            add_subaction_with_task(iri, "dul:'Action'", "dul:'Task'"),
            project_time_interval(iri, 1.0, 2.0),
            add_participant_with_role(iri, iri, "dul:'Role'"),
            tf_set_pose_at("hand", "['map', [0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]]", 3.0),
            object_pose(iri, "['map', [0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]]", 1.0, 2.0),
            get_object_pose(iri, None),
            get_object_pose(iri, Some(4.0)),
            tf_trajectory(iri, 1.0, 2.0),
            wrench_trajectory(iri, 1.0, 2.0),
            assert_transition("agent", iri, 1.0, 2.0),
            new_agent("dul:'PhysicalAgent'"),
            has_end_link("agent", "hand"),
            new_state("soma:'State'", "soma:'StateType'"),
            has_participant("state", iri),
            new_situation("dul:'Situation'", "agent"),
            situation_includes_object("situation", iri),
            all_actions(None),
            all_actions(Some("soma:'Pouring'")),
            all_states(),
            event_interval(iri),
            tasks_for_action(iri),
            triple_objects(iri, "dul:'hasRole'"),
            triple_subjects("dul:'hasRole'", iri),
            create_actor(),
            find_all_actors(),
            create_actor_by_given_name("Alice"),
            get_time(),
            start_vr_episode("Alice", None),
            start_vr_episode("Alice", Some(10.0)),
            stop_vr_episode(iri, None),
            stop_vr_episode(iri, Some(20.0)),
            vr_subaction(iri, "soma:'PouredOut'", "soma:'Pouring'", 1.0, 2.0, "Alice"),
            vr_participant(iri, "soma:'Cup_1'", "soma:'Cup'"),
            pouring_container("soma:'SourceContainer'", "soma:'Cup'", "1,2,3", "4,5,6", iri),
            pouring_position("soma:'Cup'", "1,2,3", iri),
            natural_language_text("pour water into the bowl"),
            task_type("soma:'Pouring'", "soma:'Pour'", "soma:'Kitchen'", "dul:'PhysicalPlace'", "soma:'PR2'", "dul:'Agent'"),
            task_role_object(iri, "soma:'Bowl'", "soma:'DestinationContainer'"),
            has_constituent(iri, "step_1"),
            task_goal(iri, "pour without spilling"),
            task_start_condition(iri, "cup is full"),
            types_of(iri),
            roles_of(iri),
        ]
    }

    #[test]
    fn every_template_is_well_formed() {
        for q in catalog() {
            assert_well_formed(&q);
        }
    }

    #[test]
    fn episode_start_substitutes_all_parameters() {
        let q = episode_start("soma:'Pouring'", "env.owl", "Kitchen", "env.urdf", "pr2.owl", "PR2", "pr2.urdf", 1.5);
        assert_eq!(
            q,
            "mem_episode_start(Action, soma:'Pouring', 'env.owl', 'Kitchen', 'env.urdf', 'pr2.owl', 'PR2', 'pr2.urdf', 1.5)"
        );
    }

    #[test]
    fn vr_episode_uses_reasoner_clock_without_time() {
        let q = start_vr_episode("Alice", None);
        assert!(q.contains("get_time(Time)"));
        assert!(q.contains("hasIntervalBegin', Time)"));
        let q = start_vr_episode("Alice", Some(10.0));
        assert!(!q.contains("get_time"));
        assert!(q.contains("hasIntervalBegin', 10.0)"));
        assert!(q.starts_with("tf_logger_enable"));
    }

    #[test]
    fn vr_episode_stop_reads_clock_before_disabling_logger() {
        let q = stop_vr_episode("ep", None);
        let clock = q.find("get_time(Time)").unwrap();
        let disable = q.find("tf_logger_disable").unwrap();
        assert!(clock < disable);
        assert!(q.contains("hasIntervalEnd', Time)"));
    }

    #[test]
    fn start_condition_separates_scene_and_state() {
        let q = task_start_condition("act", "cup is full");
        assert!(q.contains("holds(PreScene, dul:'includesEvent', PreState)"));
    }

    #[test]
    fn object_pose_is_wrapped_in_logger() {
        let q = object_pose("cup", "P", 1.0, 2.0);
        assert!(q.starts_with("tf_logger_enable, time_scope(1.0, 2.0, QS)"));
        assert!(q.ends_with("tf_logger_disable"));
    }
}
