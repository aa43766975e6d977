use crate::error::{NeemError, Result};
use rosprolog_client::term::{atom, float};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A 6D pose relative to a named reference frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub reference_frame: String,
    /// `[x, y, z]`
    pub position: [f64; 3],
    /// Quaternion `[qx, qy, qz, qw]`.
    pub orientation: [f64; 4],
}

impl Pose {
    pub fn new(reference_frame: impl Into<String>, position: [f64; 3], orientation: [f64; 4]) -> Self {
        Self {
            reference_frame: reference_frame.into(),
            position,
            orientation,
        }
    }

    /// Prolog list term `[Frame, [X,Y,Z], [QX,QY,QZ,QW]]` as expected by
    /// `tf_set_pose/3`.
    pub fn to_knowrob_string(&self) -> String {
        let pos: Vec<String> = self.position.iter().map(|v| float(*v)).collect();
        let ori: Vec<String> = self.orientation.iter().map(|v| float(*v)).collect();
        format!(
            "[{}, [{}], [{}]]",
            atom(&self.reference_frame),
            pos.join(", "),
            ori.join(", ")
        )
    }

    /// Decode a pose binding as returned by `mem_tf_get/2,3`.
    pub fn from_prolog(value: &Value) -> Result<Self> {
        let parts = value
            .as_array()
            .filter(|a| a.len() == 3)
            .ok_or_else(|| NeemError::InvalidPose(format!("expected [frame, pos, rot], got {value}")))?;

        let reference_frame = parts[0]
            .as_str()
            .ok_or_else(|| NeemError::InvalidPose(format!("frame is not an atom: {}", parts[0])))?
            .to_owned();

        Ok(Self {
            reference_frame,
            position: numbers::<3>(&parts[1], "position")?,
            orientation: numbers::<4>(&parts[2], "orientation")?,
        })
    }
}

fn numbers<const N: usize>(value: &Value, what: &str) -> Result<[f64; N]> {
    let items = value
        .as_array()
        .filter(|a| a.len() == N)
        .ok_or_else(|| NeemError::InvalidPose(format!("{what} must have {N} elements, got {value}")))?;
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item
            .as_f64()
            .ok_or_else(|| NeemError::InvalidPose(format!("{what} element is not a number: {item}")))?;
    }
    Ok(out)
}

/// One timestamped sample of a tracked frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    pub timestamp: f64,
    /// The frame whose pose was sampled.
    pub frame: String,
    pub pose: Pose,
}

impl Datapoint {
    pub fn new(timestamp: f64, frame: impl Into<String>, pose: Pose) -> Self {
        Self {
            timestamp,
            frame: frame.into(),
            pose,
        }
    }

    pub fn to_knowrob_string(&self) -> String {
        self.pose.to_knowrob_string()
    }
}
