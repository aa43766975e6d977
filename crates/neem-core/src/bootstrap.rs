//! Task-learning interface: turns a natural-language instruction from a
//! human instructor into task, role and goal facts in the knowledge base.

use std::str::FromStr;
use std::sync::Arc;

use rosprolog_client::{Bindings, Reasoner};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NeemError, Result};
use crate::neem::bound_str;
use crate::query;

const ENVIRONMENT_TYPE: &str = "dul:'PhysicalPlace'";
const AGENT_TYPE: &str = "dul:'Agent'";

fn soma(name: &str) -> String {
    format!("soma:'{name}'")
}

// ---------------------------------------------------------------------------
// ActionCore
// ---------------------------------------------------------------------------

/// Structured reading of an instruction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionCore {
    pub action_verb: String,
    #[serde(default)]
    pub source_object: String,
    #[serde(default)]
    pub target_object: String,
    #[serde(default)]
    pub substance: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub motion_verb: String,
}

/// Keyword reader standing in for a real language parser. Knows pouring and
/// cutting only.
pub fn parse_instruction(text: &str) -> Option<ActionCore> {
    let lower = text.to_lowercase();
    if lower.contains("pour") {
        Some(ActionCore {
            action_verb: "pouring".into(),
            substance: "Water".into(),
            target_object: "Bowl".into(),
            unit: "ml".into(),
            goal: "pour without spilling".into(),
            motion_verb: "tilting".into(),
            amount: "50".into(),
            ..Default::default()
        })
    } else if lower.contains("cut") {
        Some(ActionCore {
            action_verb: "cutting".into(),
            source_object: "Knife".into(),
            target_object: "Bread".into(),
            unit: "slice".into(),
            goal: "cut without damage".into(),
            motion_verb: "slicing".into(),
            amount: "5".into(),
            ..Default::default()
        })
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Task kinds
// ---------------------------------------------------------------------------

/// SOMA task and action class for an action verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Pouring,
    Cutting,
    Cleaning,
    Shaking,
    Opening,
}

impl TaskKind {
    pub fn from_verb(verb: &str) -> Option<Self> {
        let verb = verb.to_lowercase();
        [
            ("pour", TaskKind::Pouring),
            ("cut", TaskKind::Cutting),
            ("clean", TaskKind::Cleaning),
            ("shake", TaskKind::Shaking),
            ("open", TaskKind::Opening),
        ]
        .into_iter()
        .find(|(stem, _)| verb.contains(*stem))
        .map(|(_, kind)| kind)
    }

    pub fn task_type(self) -> &'static str {
        match self {
            TaskKind::Pouring => "soma:'Pouring'",
            TaskKind::Cutting => "soma:'Cutting'",
            TaskKind::Cleaning => "soma:'Cleaning'",
            TaskKind::Shaking => "soma:'Shaking'",
            TaskKind::Opening => "soma:'Opening'",
        }
    }

    pub fn action_type(self) -> &'static str {
        match self {
            TaskKind::Pouring => "soma:'Pour'",
            TaskKind::Cutting => "soma:'Cut'",
            TaskKind::Cleaning => "soma:'Clean'",
            TaskKind::Shaking => "soma:'Shake'",
            TaskKind::Opening => "soma:'Open'",
        }
    }
}

/// Building blocks a demonstrated task is decomposed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveAction {
    PickUp,
    Align,
    Tilt,
    PutDown,
}

impl PrimitiveAction {
    pub fn task_type(self) -> &'static str {
        match self {
            PrimitiveAction::PickUp => "soma:'PickingUp'",
            PrimitiveAction::Align => "soma:'Aligning'",
            PrimitiveAction::Tilt => "soma:'Tilting'",
            PrimitiveAction::PutDown => "soma:'PuttingDown'",
        }
    }

    pub fn action_type(self) -> &'static str {
        match self {
            PrimitiveAction::PickUp => "soma:'PickUp'",
            PrimitiveAction::Align => "soma:'Align'",
            PrimitiveAction::Tilt => "soma:'Tilt'",
            PrimitiveAction::PutDown => "soma:'PutDown'",
        }
    }
}

impl FromStr for PrimitiveAction {
    type Err = NeemError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pickup" => Ok(PrimitiveAction::PickUp),
            "align" => Ok(PrimitiveAction::Align),
            "tilt" => Ok(PrimitiveAction::Tilt),
            "putdown" => Ok(PrimitiveAction::PutDown),
            other => Err(NeemError::InvalidPayload(format!(
                "unknown primitive action '{other}' (expected pickup, align, tilt or putdown)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// BootstrapInterface
// ---------------------------------------------------------------------------

/// Bindings produced by [`BootstrapInterface::define_task`]. Optional parts
/// are `None` when the instruction did not mention them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskDefinition {
    pub task: Bindings,
    pub source: Option<Bindings>,
    pub destination: Option<Bindings>,
    pub substance: Option<Bindings>,
    pub goal: Option<Bindings>,
}

pub struct BootstrapInterface {
    reasoner: Arc<dyn Reasoner>,
}

impl BootstrapInterface {
    pub fn new(reasoner: Arc<dyn Reasoner>) -> Self {
        Self { reasoner }
    }

    /// Record `task_def` and, when it can be read, the task it describes.
    ///
    /// `environment` and `agent` are bare SOMA names. Returns `None` when the
    /// instruction is not understood; the text itself is recorded either way.
    pub fn define_task(&self, task_def: &str, environment: &str, agent: &str) -> Result<Option<TaskDefinition>> {
        self.reasoner
            .ensure_once(&query::natural_language_text(task_def))?;

        let Some(core) = parse_instruction(task_def) else {
            tracing::info!(task_def, "instruction not understood; recorded text only");
            return Ok(None);
        };
        let Some(kind) = TaskKind::from_verb(&core.action_verb) else {
            return Ok(None);
        };

        let task = self.add_task_type(kind.task_type(), kind.action_type(), environment, agent)?;
        let mut def = TaskDefinition {
            task,
            ..Default::default()
        };

        // Roles are only known for pouring.
        if kind == TaskKind::Pouring {
            if !core.source_object.is_empty() {
                def.source = Some(self.add_task_source_obj(&def.task, &core.source_object)?);
            }
            if !core.target_object.is_empty() {
                def.destination = Some(self.add_task_destination_obj(&def.task, &core.target_object)?);
            }
            if !core.substance.is_empty() {
                def.substance = Some(self.add_task_substance(&def.task, &core.substance)?);
            }
        }
        if !core.goal.is_empty() {
            def.goal = Some(self.add_task_goal(&def.task, &core.goal)?);
        }
        Ok(Some(def))
    }

    /// Project a task of `task_type` and an action of `action_type` with the
    /// environment and agent as participants. Binds `Task` and `Action`.
    pub fn add_task_type(&self, task_type: &str, action_type: &str, environment: &str, agent: &str) -> Result<Bindings> {
        Ok(self.reasoner.ensure_once(&query::task_type(
            task_type,
            action_type,
            &soma(environment),
            ENVIRONMENT_TYPE,
            &soma(agent),
            AGENT_TYPE,
        ))?)
    }

    pub fn add_task_source_obj(&self, task: &Bindings, obj: &str) -> Result<Bindings> {
        self.add_role_object(task, obj, "soma:'SourceContainer'")
    }

    pub fn add_task_destination_obj(&self, task: &Bindings, obj: &str) -> Result<Bindings> {
        self.add_role_object(task, obj, "soma:'DestinationContainer'")
    }

    pub fn add_task_substance(&self, task: &Bindings, substance: &str) -> Result<Bindings> {
        self.add_role_object(task, substance, "soma:'PouredObject'")
    }

    fn add_role_object(&self, task: &Bindings, obj: &str, role: &str) -> Result<Bindings> {
        let action = bound_str(task, "Action", "task type projection")?;
        Ok(self
            .reasoner
            .ensure_once(&query::task_role_object(&action, &soma(obj), role))?)
    }

    pub fn add_task_goal(&self, task: &Bindings, goal: &str) -> Result<Bindings> {
        let task = bound_str(task, "Task", "task type projection")?;
        Ok(self.reasoner.ensure_once(&query::task_goal(&task, goal))?)
    }

    /// Attach a precondition scene to `action`. Binds `PreScene` and
    /// `PreState`.
    pub fn add_task_start_condition(&self, action: &str, condition: &str) -> Result<Bindings> {
        Ok(self
            .reasoner
            .ensure_once(&query::task_start_condition(action, condition))?)
    }

    /// Project one task/action pair per primitive, each a constituent of
    /// `action`. Returns the bindings of every projection in order.
    pub fn add_primitive_action_to_task(
        &self,
        action: &str,
        primitives: &[PrimitiveAction],
        environment: &str,
        agent: &str,
    ) -> Result<Vec<Bindings>> {
        let mut out = Vec::with_capacity(primitives.len());
        for primitive in primitives {
            let step = self.add_task_type(primitive.task_type(), primitive.action_type(), environment, agent)?;
            let step_action = bound_str(&step, "Action", "primitive action projection")?;
            self.reasoner
                .ensure_once(&query::has_constituent(action, &step_action))?;
            out.push(step);
        }
        Ok(out)
    }

    pub fn get_type(&self, obj: &str) -> Result<Vec<String>> {
        let q = query::types_of(obj);
        Ok(flatten_rows(&self.reasoner.ensure_once(&q)?, "Type"))
    }

    pub fn get_role(&self, obj: &str) -> Result<Vec<String>> {
        let q = query::roles_of(obj);
        Ok(flatten_rows(&self.reasoner.ensure_once(&q)?, "Role"))
    }
}

/// `findall([X], ..., X)` binds a list of one-element lists.
fn flatten_rows(solution: &Bindings, var: &str) -> Vec<String> {
    solution
        .get(var)
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| match row {
                    Value::Array(cells) => cells.first().and_then(Value::as_str),
                    other => other.as_str(),
                })
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosprolog_client::MockReasoner;
    use serde_json::json;

    fn bootstrap(mock: MockReasoner) -> (Arc<MockReasoner>, BootstrapInterface) {
        let mock = Arc::new(mock);
        (mock.clone(), BootstrapInterface::new(mock))
    }

    fn task_mock() -> MockReasoner {
        MockReasoner::new().on(
            "new_iri(Task",
            vec![Bindings::new().with("Task", "task_1").with("Action", "action_1")],
        )
    }

    #[test]
    fn instruction_keywords() {
        assert_eq!(parse_instruction("Pour water into the bowl").unwrap().action_verb, "pouring");
        assert_eq!(parse_instruction("cut the bread").unwrap().source_object, "Knife");
        assert!(parse_instruction("wave hello").is_none());
    }

    #[test]
    fn verbs_map_to_task_kinds() {
        assert_eq!(TaskKind::from_verb("pouring"), Some(TaskKind::Pouring));
        assert_eq!(TaskKind::from_verb("Shake"), Some(TaskKind::Shaking));
        assert_eq!(TaskKind::Opening.action_type(), "soma:'Open'");
        assert_eq!(TaskKind::from_verb("juggling"), None);
    }

    #[test]
    fn define_pouring_task_projects_roles_and_goal() {
        let (mock, b) = bootstrap(task_mock());
        let def = b
            .define_task("pour water into the bowl", "Kitchen", "PR2")
            .unwrap()
            .unwrap();
        assert_eq!(def.task.get_str("Task"), Some("task_1"));
        // The keyword reader leaves the pouring source empty.
        assert!(def.source.is_none());
        assert!(def.destination.is_some());
        assert!(def.substance.is_some());
        assert!(def.goal.is_some());

        let qs = mock.queries();
        assert!(qs[0].contains("soma:'Natural_Language_Text'"));
        assert!(qs[1].contains("new_iri(Task, soma:'Pouring')"));
        assert!(qs[1].contains("has_type(soma:'Kitchen', dul:'PhysicalPlace')"));
        assert_eq!(mock.queries_containing("has_role(soma:'Bowl', Role)").len(), 1);
        assert_eq!(mock.queries_containing("soma:'PouredObject'").len(), 1);
        assert_eq!(mock.queries_containing("holds('task_1', soma:'hasGoal'").len(), 1);
    }

    #[test]
    fn cutting_task_has_no_roles() {
        let (mock, b) = bootstrap(task_mock());
        let def = b.define_task("Cut the bread", "Kitchen", "PR2").unwrap().unwrap();
        assert!(def.source.is_none() && def.destination.is_none());
        assert!(def.goal.is_some());
        assert!(mock.queries_containing("has_role(").is_empty());
    }

    #[test]
    fn unknown_instruction_records_text_only() {
        let (mock, b) = bootstrap(MockReasoner::new());
        assert!(b.define_task("wave hello", "Kitchen", "PR2").unwrap().is_none());
        assert_eq!(mock.queries().len(), 1);
    }

    #[test]
    fn primitives_become_constituents() {
        let (mock, b) = bootstrap(task_mock());
        let steps: Vec<PrimitiveAction> = ["pickup", "tilt", "putdown"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let out = b.add_primitive_action_to_task("pour_1", &steps, "Kitchen", "PR2").unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(mock.queries_containing("dul:hasConstituent").len(), 3);
        assert!(mock.queries()[2].contains("soma:'Tilting'"));
        assert!("wiggle".parse::<PrimitiveAction>().is_err());
    }

    #[test]
    fn type_and_role_lists_are_flattened() {
        let (_, b) = bootstrap(
            MockReasoner::new()
                .on("has_type(", vec![Bindings::new().with("Type", json!([["soma:Cup"], ["dul:PhysicalObject"]]))])
                .on("has_role(", vec![Bindings::new().with("Role", json!([]))]),
        );
        assert_eq!(b.get_type("cup").unwrap(), vec!["soma:Cup", "dul:PhysicalObject"]);
        assert!(b.get_role("cup").unwrap().is_empty());
    }
}
