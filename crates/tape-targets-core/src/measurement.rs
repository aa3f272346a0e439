use serde::{Deserialize, Serialize};

/// Physical measurement of one paired target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Sideways offset from the optical axis, meters (positive = left).
    pub x_offset: f64,
    /// Straight-line distance, meters. `None` when the target is on the
    /// optical axis and the distance cannot be resolved.
    pub distance: Option<f64>,
    /// Horizontal bearing, radians.
    pub angle: f64,
    /// Vertical bearing of the target center, radians.
    pub vertical_angle: f64,
}

/// Column-wise view of a frame's measurements, as published to the output
/// table. Index `i` in every array refers to the same target.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementArrays {
    #[serde(rename = "xOffset")]
    pub x_offset: Vec<f64>,
    pub distance: Vec<Option<f64>>,
    pub angle: Vec<f64>,
}

impl MeasurementArrays {
    pub const X_OFFSET_KEY: &'static str = "xOffset";
    pub const DISTANCE_KEY: &'static str = "distance";
    pub const ANGLE_KEY: &'static str = "angle";

    pub fn len(&self) -> usize {
        self.angle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angle.is_empty()
    }

    pub fn push(&mut self, m: &Measurement) {
        self.x_offset.push(m.x_offset);
        self.distance.push(m.distance);
        self.angle.push(m.angle);
    }
}

impl<'a> FromIterator<&'a Measurement> for MeasurementArrays {
    fn from_iter<I: IntoIterator<Item = &'a Measurement>>(iter: I) -> Self {
        let mut out = Self::default();
        for m in iter {
            out.push(m);
        }
        out
    }
}
