use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PlanoError;
use crate::types::{Court, CourtMeta, Point};

const SLOT_COLUMNS: usize = 4;
const SLOT_START_X: f64 = 150.0;
const SLOT_START_Y: f64 = 100.0;
const SLOT_PITCH_X: f64 = 150.0;
const SLOT_PITCH_Y: f64 = 120.0;

/// Default placement for the `index`-th court of a fetch result: four per
/// row, 150px apart horizontally and 120px vertically.
pub fn grid_slot(index: usize) -> Point {
    let col = index % SLOT_COLUMNS;
    let row = index / SLOT_COLUMNS;
    Point::new(
        SLOT_START_X + col as f64 * SLOT_PITCH_X,
        SLOT_START_Y + row as f64 * SLOT_PITCH_Y,
    )
}

/// A court with a resolved logical position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedCourt {
    pub id: String,
    pub position: Point,
    pub meta: CourtMeta,
}

/// Committed positions of every court currently on the plane.
#[derive(Debug, Clone, Default)]
pub struct PositionStore {
    courts: Vec<PlacedCourt>,
    index: HashMap<String, usize>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set. Courts without a position get
    /// [`grid_slot`] of their index in `courts`. Later duplicates of an id
    /// are dropped.
    pub fn load(&mut self, courts: Vec<Court>) {
        self.courts.clear();
        self.index.clear();
        let mut backfilled = 0usize;

        for (i, court) in courts.into_iter().enumerate() {
            if self.index.contains_key(&court.id) {
                warn!(id = %court.id, "duplicate court id in fetch result, keeping the first");
                continue;
            }
            let position = match court.position {
                Some(p) => p,
                None => {
                    backfilled += 1;
                    grid_slot(i)
                }
            };
            self.index.insert(court.id.clone(), self.courts.len());
            self.courts.push(PlacedCourt {
                id: court.id,
                position,
                meta: court.meta,
            });
        }

        debug!(count = self.courts.len(), backfilled, "position store loaded");
    }

    pub fn get(&self, id: &str) -> Option<Point> {
        self.court(id).map(|c| c.position)
    }

    pub fn court(&self, id: &str) -> Option<&PlacedCourt> {
        self.index.get(id).map(|&i| &self.courts[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Overwrite the committed position of `id`.
    pub fn apply_committed(&mut self, id: &str, position: Point) -> Result<(), PlanoError> {
        let &i = self
            .index
            .get(id)
            .ok_or_else(|| PlanoError::NotFound(id.to_string()))?;
        self.courts[i].position = position;
        debug!(id, x = position.x, y = position.y, "position committed");
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedCourt> {
        self.courts.iter()
    }

    pub fn len(&self) -> usize {
        self.courts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courts.is_empty()
    }
}
