use std::collections::HashMap;

use crate::error::SourceError;
use crate::types::{Court, Point};

/// The persistence side the engine talks to.
pub trait CourtSource {
    /// All courts of one complex. Positions are optional.
    fn fetch_courts(&mut self, container_id: &str) -> Result<Vec<Court>, SourceError>;

    /// Store a committed position. Called once per successful drag.
    fn persist_position(&mut self, court_id: &str, position: Point) -> Result<(), SourceError>;
}

/// In-memory source that records every persistence call.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    containers: HashMap<String, Vec<Court>>,
    persisted: Vec<(String, Point)>,
    fail_persist: Option<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, container_id: impl Into<String>, courts: Vec<Court>) -> Self {
        self.containers.insert(container_id.into(), courts);
        self
    }

    /// Make every following `persist_position` fail with `reason`.
    pub fn fail_persist_with(&mut self, reason: impl Into<String>) {
        self.fail_persist = Some(reason.into());
    }

    pub fn heal(&mut self) {
        self.fail_persist = None;
    }

    /// Successful persistence calls, in order.
    pub fn persisted(&self) -> &[(String, Point)] {
        &self.persisted
    }

    pub fn courts(&self, container_id: &str) -> Option<&[Court]> {
        self.containers.get(container_id).map(Vec::as_slice)
    }
}

impl CourtSource for MemorySource {
    fn fetch_courts(&mut self, container_id: &str) -> Result<Vec<Court>, SourceError> {
        self.containers
            .get(container_id)
            .cloned()
            .ok_or_else(|| SourceError::new(format!("unknown complex `{container_id}`")))
    }

    fn persist_position(&mut self, court_id: &str, position: Point) -> Result<(), SourceError> {
        if let Some(reason) = &self.fail_persist {
            return Err(SourceError::new(reason.clone()));
        }
        let court = self
            .containers
            .values_mut()
            .flat_map(|courts| courts.iter_mut())
            .find(|c| c.id == court_id)
            .ok_or_else(|| SourceError::new(format!("unknown court `{court_id}`")))?;
        court.position = Some(position);
        self.persisted.push((court_id.to_string(), position));
        Ok(())
    }
}
