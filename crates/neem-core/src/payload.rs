//! Parsing of loosely-typed request payloads sent by VR game clients.
//!
//! Clients send participant lists as bracketed text (`[Cup:BlueCup,Bowl:Bowl]`),
//! additional event info as either a JSON object or a single-quoted
//! dict literal, and numbers as either JSON numbers or numeric strings.

use crate::error::{NeemError, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// A `ClassName:IndividualName` entry from an `objects_participated` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub class: String,
    pub individual: String,
}

impl Participant {
    /// `soma:'<Class>'`
    pub fn class_iri(&self) -> String {
        format!("soma:'{}'", self.class)
    }

    /// `soma:'<Individual>_1'`, so the individual never collides with its
    /// class name.
    pub fn individual_iri(&self) -> String {
        format!("soma:'{}_1'", self.individual)
    }
}

/// Parse a bracketed, comma-separated `Class:Individual` list.
///
/// Entries without a colon, with an empty side, or with a quote or
/// backslash in either side are skipped with a warning. Blank entries are
/// skipped silently.
pub fn parse_participants(raw: &str) -> Vec<Participant> {
    raw.replace(['[', ']'], "")
        .split(',')
        .filter_map(|entry| {
            let entry = entry.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
            if entry.is_empty() {
                return None;
            }
            match entry.split_once(':') {
                Some((class, individual))
                    if is_local_name(class.trim()) && is_local_name(individual.trim()) =>
                {
                    Some(Participant {
                        class: class.trim().to_string(),
                        individual: individual.trim().to_string(),
                    })
                }
                _ => {
                    tracing::warn!(entry, "skipping malformed participant entry");
                    None
                }
            }
        })
        .collect()
}

/// Non-empty and safe to splice between the quotes of `soma:'...'`.
fn is_local_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['\'', '\\'])
}

// ---------------------------------------------------------------------------
// Additional event info
// ---------------------------------------------------------------------------

/// Normalize `additional_event_info` into a JSON value.
///
/// `null`, blank strings, `[]` and `{}` mean "no info". Strings are parsed
/// as JSON after turning single quotes into double quotes.
pub fn normalize_additional_info(value: &Value) -> Result<Option<Value>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::Array(a) if a.is_empty() => Ok(None),
        Value::Object(o) if o.is_empty() => Ok(None),
        Value::String(s) => {
            let parsed: Value = serde_json::from_str(&s.replace('\'', "\""))
                .map_err(|e| NeemError::InvalidPayload(format!("additional_event_info: {e}")))?;
            Ok(Some(parsed))
        }
        Value::Object(_) => Ok(Some(value.clone())),
        other => Err(NeemError::InvalidPayload(format!(
            "additional_event_info must be an object or string, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Pouring info
// ---------------------------------------------------------------------------

/// Which container a pouring sub-action annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PouringRole {
    Source,
    Destination,
}

impl PouringRole {
    /// `soma:'PouredOut'` annotates the source, `soma:'PouredInTo'` the
    /// destination. Other sub-action types carry no pouring info.
    pub fn for_sub_action(sub_action_type: &str) -> Option<Self> {
        match sub_action_type {
            "soma:'PouredOut'" => Some(PouringRole::Source),
            "soma:'PouredInTo'" => Some(PouringRole::Destination),
            _ => None,
        }
    }

    pub fn role_class(self) -> &'static str {
        match self {
            PouringRole::Source => "soma:'SourceContainer'",
            PouringRole::Destination => "soma:'DestinationContainer'",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Vector3 {
    #[serde(rename = "X", deserialize_with = "string_or_number")]
    pub x: String,
    #[serde(rename = "Y", deserialize_with = "string_or_number")]
    pub y: String,
    #[serde(rename = "Z", deserialize_with = "string_or_number")]
    pub z: String,
}

impl Vector3 {
    /// `X,Y,Z` as stored in `has*Data` literals.
    pub fn to_data(&self) -> String {
        format!("{},{},{}", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawPouringInfo {
    #[serde(rename = "MaxPouringAngle")]
    max_pouring_angle: Option<Vector3>,
    #[serde(rename = "MinPouringAngle")]
    min_pouring_angle: Option<Vector3>,
    #[serde(rename = "SCName")]
    sc_name: Option<String>,
    #[serde(rename = "DCName")]
    dc_name: Option<String>,
    #[serde(rename = "SCPoses", default)]
    sc_poses: Vec<Vector3>,
    #[serde(rename = "DCPoses", default)]
    dc_poses: Vec<Vector3>,
}

/// Pouring annotations for one container.
#[derive(Debug, Clone, PartialEq)]
pub struct PouringInfo {
    pub role: PouringRole,
    /// Container name, prefixed as `soma:'<Name>'`.
    pub container: String,
    pub max_pouring_angle: Vector3,
    pub min_pouring_angle: Vector3,
    pub positions: Vec<Vector3>,
}

impl PouringInfo {
    pub fn parse(info: &Value, role: PouringRole) -> Result<Self> {
        let raw: RawPouringInfo = serde_json::from_value(info.clone())
            .map_err(|e| NeemError::InvalidPayload(format!("pouring info: {e}")))?;

        let (name, positions, key) = match role {
            PouringRole::Source => (raw.sc_name, raw.sc_poses, "SCName"),
            PouringRole::Destination => (raw.dc_name, raw.dc_poses, "DCName"),
        };
        let missing = |field: &str| NeemError::InvalidPayload(format!("pouring info is missing {field}"));

        Ok(Self {
            role,
            container: format!("soma:'{}'", name.ok_or_else(|| missing(key))?),
            max_pouring_angle: raw.max_pouring_angle.ok_or_else(|| missing("MaxPouringAngle"))?,
            min_pouring_angle: raw.min_pouring_angle.ok_or_else(|| missing("MinPouringAngle"))?,
            positions,
        })
    }
}

// ---------------------------------------------------------------------------
// Lenient scalars
// ---------------------------------------------------------------------------

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Read a float that may arrive as a JSON number or a numeric string.
/// `nan` and `inf` spellings are rejected; they have no Prolog literal.
pub fn lenient_f64(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    f.filter(|f| f.is_finite())
}

/// Serde adapter for `Option<f64>` fields that accept numeric strings.
/// `null`, a missing field, and a blank string all mean `None`.
pub fn deserialize_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => lenient_f64(&v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {v}"))),
    }
}

/// Serde adapter for required `f64` fields that accept numeric strings.
pub fn deserialize_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    lenient_f64(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(class: &str, individual: &str) -> Participant {
        Participant {
            class: class.into(),
            individual: individual.into(),
        }
    }

    #[test]
    fn participants_well_formed() {
        let parsed = parse_participants("[Cup:BlueCup, Bowl:Bowl]");
        assert_eq!(parsed, vec![p("Cup", "BlueCup"), p("Bowl", "Bowl")]);
        assert_eq!(parsed[0].class_iri(), "soma:'Cup'");
        assert_eq!(parsed[0].individual_iri(), "soma:'BlueCup_1'");
    }

    #[test]
    fn participants_skip_malformed_entries() {
        let parsed = parse_participants("[Cup:BlueCup,justaname,:NoClass,Bowl:,,Spoon:Spoon]");
        assert_eq!(parsed, vec![p("Cup", "BlueCup"), p("Spoon", "Spoon")]);
    }

    #[test]
    fn participants_with_quotes_or_backslashes_are_skipped() {
        let parsed = parse_participants(r"[Cup:Blue'Cup,Bowl:Bowl,Pot\:Pot,Jug:Jug\]");
        assert_eq!(parsed, vec![p("Bowl", "Bowl")]);
        assert_eq!(parsed[0].individual_iri(), "soma:'Bowl_1'");
    }

    #[test]
    fn participants_empty_inputs() {
        assert!(parse_participants("").is_empty());
        assert!(parse_participants("[]").is_empty());
        assert!(parse_participants("[ , ]").is_empty());
    }

    #[test]
    fn participants_strip_quotes() {
        assert_eq!(parse_participants("['Cup:Mug']"), vec![p("Cup", "Mug")]);
    }

    #[test]
    fn additional_info_forms() {
        assert_eq!(normalize_additional_info(&json!(null)).unwrap(), None);
        assert_eq!(normalize_additional_info(&json!("  ")).unwrap(), None);
        assert_eq!(
            normalize_additional_info(&json!("{'SCName': 'Cup'}")).unwrap(),
            Some(json!({"SCName": "Cup"}))
        );
        assert_eq!(
            normalize_additional_info(&json!({"DCName": "Bowl"})).unwrap(),
            Some(json!({"DCName": "Bowl"}))
        );
        assert_eq!(normalize_additional_info(&json!([])).unwrap(), None);
        assert_eq!(normalize_additional_info(&json!({})).unwrap(), None);
        assert!(normalize_additional_info(&json!("{not json")).is_err());
        assert!(normalize_additional_info(&json!(3)).is_err());
        assert!(normalize_additional_info(&json!(["SCName"])).is_err());
    }

    #[test]
    fn pouring_roles() {
        assert_eq!(PouringRole::for_sub_action("soma:'PouredOut'"), Some(PouringRole::Source));
        assert_eq!(
            PouringRole::for_sub_action("soma:'PouredInTo'"),
            Some(PouringRole::Destination)
        );
        assert_eq!(PouringRole::for_sub_action("soma:'Grasping'"), None);
    }

    #[test]
    fn pouring_info_accepts_strings_and_numbers() {
        let info = json!({
            "MaxPouringAngle": {"X": "10.5", "Y": 0, "Z": "3"},
            "MinPouringAngle": {"X": 1, "Y": 2, "Z": 3},
            "SCName": "Cup",
            "SCPoses": [{"X": "1", "Y": "2", "Z": "3"}, {"X": 4, "Y": 5.5, "Z": 6}]
        });
        let parsed = PouringInfo::parse(&info, PouringRole::Source).unwrap();
        assert_eq!(parsed.container, "soma:'Cup'");
        assert_eq!(parsed.max_pouring_angle.to_data(), "10.5,0,3");
        assert_eq!(parsed.min_pouring_angle.to_data(), "1,2,3");
        assert_eq!(parsed.positions.len(), 2);
        assert_eq!(parsed.positions[1].to_data(), "4,5.5,6");
    }

    #[test]
    fn pouring_info_requires_container_name() {
        let info = json!({
            "MaxPouringAngle": {"X": 1, "Y": 2, "Z": 3},
            "MinPouringAngle": {"X": 1, "Y": 2, "Z": 3},
            "SCName": "Cup"
        });
        let err = PouringInfo::parse(&info, PouringRole::Destination).unwrap_err();
        assert!(err.to_string().contains("DCName"));
    }

    #[test]
    fn lenient_numbers() {
        assert_eq!(lenient_f64(&json!(1.5)), Some(1.5));
        assert_eq!(lenient_f64(&json!(" 2 ")), Some(2.0));
        assert_eq!(lenient_f64(&json!("abc")), None);
        assert_eq!(lenient_f64(&json!(true)), None);
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for raw in ["nan", "NaN", "inf", "-inf", "infinity", "1e400"] {
            assert_eq!(lenient_f64(&json!(raw)), None, "{raw} should be rejected");
        }
        #[derive(Debug, Deserialize)]
        struct Body {
            #[serde(deserialize_with = "deserialize_f64")]
            #[allow(dead_code)]
            t: f64,
        }
        assert!(serde_json::from_value::<Body>(json!({"t": "nan"})).is_err());
    }

    #[test]
    fn optional_number_fields() {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default, deserialize_with = "deserialize_opt_f64")]
            t: Option<f64>,
        }
        let b: Body = serde_json::from_value(json!({})).unwrap();
        assert_eq!(b.t, None);
        let b: Body = serde_json::from_value(json!({"t": "12.5"})).unwrap();
        assert_eq!(b.t, Some(12.5));
        let b: Body = serde_json::from_value(json!({"t": null})).unwrap();
        assert_eq!(b.t, None);
        assert!(serde_json::from_value::<Body>(json!({"t": "soon"})).is_err());
    }
}
