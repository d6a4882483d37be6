use crate::{
    constants::{AUTOPILOT_LANE_COUNT, AUTOPILOT_ROAD_EXTENT, AUTOPILOT_ROAD_WIDTH, AUTOPILOT_ROAD_X},
    geometry::{Point, Segment},
};
use serde::{Deserialize, Serialize};

/// The serializable description of a road, as carried by training messages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadLayout {
    /// Horizontal center
    pub x: f64,
    pub width: f64,
    pub lane_count: usize,
}

impl Default for RoadLayout {
    fn default() -> Self {
        Self {
            x: AUTOPILOT_ROAD_X,
            width: AUTOPILOT_ROAD_WIDTH,
            lane_count: AUTOPILOT_LANE_COUNT,
        }
    }
}

/// A straight road along the y axis with two borders running (practically) forever
#[derive(Debug, Clone)]
pub struct Road {
    layout: RoadLayout,
    left: f64,
    borders: [Segment; 2],
}

impl Road {
    pub fn new(layout: RoadLayout) -> Self {
        let left = layout.x - layout.width / 2.;
        let right = layout.x + layout.width / 2.;
        let (top, bottom) = (-AUTOPILOT_ROAD_EXTENT, AUTOPILOT_ROAD_EXTENT);

        Self {
            layout,
            left,
            borders: [
                Segment(Point::new(left, top), Point::new(left, bottom)),
                Segment(Point::new(right, top), Point::new(right, bottom)),
            ],
        }
    }

    #[inline]
    pub fn layout(&self) -> RoadLayout {
        self.layout
    }

    #[inline]
    pub fn borders(&self) -> &[Segment] {
        &self.borders
    }

    #[inline]
    pub fn lane_count(&self) -> usize {
        self.layout.lane_count
    }

    /// x of a lane's center line. Indices past the last lane land in the last lane.
    pub fn lane_center(&self, index: usize) -> f64 {
        let lanes = self.layout.lane_count.max(1);
        let lane_width = self.layout.width / lanes as f64;
        self.left + lane_width / 2. + index.min(lanes - 1) as f64 * lane_width
    }
}

impl From<RoadLayout> for Road {
    fn from(layout: RoadLayout) -> Self {
        Self::new(layout)
    }
}
