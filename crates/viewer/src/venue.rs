//! Venue files in KDL: an optional `plano` settings node and one `complex`
//! node per set of courts.
//!
//! ```kdl
//! plano min-zoom=0.5 max-zoom=3 grid-size=20 width=800 height=600
//! complex "complex-1" {
//!     court "A" name="Cancha A" sport="futbol_5" status="disponible" x=150 y=100
//!     court "B" name="Cancha B" sport="padel" status="ocupada"
//! }
//! ```
//!
//! Courts without both `x` and `y` have no stored position. Committed
//! positions are written back into the document, and into the file when the
//! venue was opened from one.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use plano::{Court, CourtMeta, CourtSource, Point, SourceError, ViewportConfig};
use tracing::{debug, info, warn};

pub struct KdlVenue {
    doc: KdlDocument,
    path: Option<PathBuf>,
}

impl KdlVenue {
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading venue file {}", path.display()))?;
        let mut venue =
            Self::parse(&content).with_context(|| format!("in venue file {}", path.display()))?;
        venue.path = Some(path.to_path_buf());
        Ok(venue)
    }

    /// A venue kept only in memory; persisted positions are not written out.
    pub fn parse(content: &str) -> Result<Self> {
        let doc = KdlDocument::parse(content).context("parsing venue KDL")?;
        Ok(Self { doc, path: None })
    }

    /// Viewport settings from the `plano` node. Missing keys keep their
    /// defaults.
    pub fn config(&self) -> Result<ViewportConfig> {
        let mut config = ViewportConfig::default();
        let Some(node) = self.doc.get("plano") else {
            return Ok(config);
        };
        let fields = [
            ("min-zoom", &mut config.min_zoom),
            ("max-zoom", &mut config.max_zoom),
            ("grid-size", &mut config.grid_size),
            ("zoom-step", &mut config.zoom_step),
            ("width", &mut config.container_width),
            ("height", &mut config.container_height),
        ];
        for (key, slot) in fields {
            if let Some(value) = node.get(key) {
                *slot = number(value).ok_or_else(|| anyhow!("plano {key}= must be a number"))?;
            }
        }
        Ok(config)
    }

    /// Ids of every `complex` node, in document order.
    pub fn complexes(&self) -> Vec<&str> {
        self.doc
            .nodes()
            .iter()
            .filter(|n| n.name().value() == "complex")
            .filter_map(|n| first_arg(n))
            .collect()
    }

    pub fn document(&self) -> &KdlDocument {
        &self.doc
    }

    fn complex(&self, id: &str) -> Option<&KdlNode> {
        self.doc
            .nodes()
            .iter()
            .find(|n| n.name().value() == "complex" && first_arg(n) == Some(id))
    }

    fn court_node_mut(&mut self, court_id: &str) -> Option<&mut KdlNode> {
        self.doc
            .nodes_mut()
            .iter_mut()
            .filter(|n| n.name().value() == "complex")
            .filter_map(|n| n.children_mut().as_mut())
            .flat_map(|children| children.nodes_mut().iter_mut())
            .find(|n| n.name().value() == "court" && first_arg(n) == Some(court_id))
    }

    fn save(&self) -> Result<(), SourceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        fs::write(path, self.doc.to_string())
            .map_err(|e| SourceError::new(format!("writing {}: {e}", path.display())))
    }
}

impl CourtSource for KdlVenue {
    fn fetch_courts(&mut self, container_id: &str) -> Result<Vec<Court>, SourceError> {
        let complex = self
            .complex(container_id)
            .ok_or_else(|| SourceError::new(format!("no complex `{container_id}` in venue")))?;
        let courts = match complex.children() {
            Some(children) => children
                .nodes()
                .iter()
                .filter(|n| n.name().value() == "court")
                .map(parse_court)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        debug!(container = container_id, count = courts.len(), "venue courts loaded");
        Ok(courts)
    }

    fn persist_position(&mut self, court_id: &str, position: Point) -> Result<(), SourceError> {
        let node = self
            .court_node_mut(court_id)
            .ok_or_else(|| SourceError::new(format!("no court `{court_id}` in venue")))?;
        let previous = node.entries().to_vec();
        set_prop(node, "x", position.x);
        set_prop(node, "y", position.y);
        if let Err(err) = self.save() {
            // Keep the venue in step with what was actually stored.
            if let Some(node) = self.court_node_mut(court_id) {
                *node.entries_mut() = previous;
            }
            warn!(court = court_id, error = %err, "venue not saved, position rolled back");
            return Err(err);
        }
        info!(court = court_id, x = position.x, y = position.y, "venue updated");
        Ok(())
    }
}

fn parse_court(node: &KdlNode) -> Result<Court, SourceError> {
    let id = first_arg(node).ok_or_else(|| SourceError::new("court node without an id"))?;
    let text = |key: &str| node.get(key).and_then(KdlValue::as_string);
    let coord = |key: &str| -> Result<Option<f64>, SourceError> {
        match node.get(key) {
            None => Ok(None),
            Some(value) => number(value)
                .map(Some)
                .ok_or_else(|| SourceError::new(format!("court `{id}`: {key}= must be a number"))),
        }
    };

    let meta = CourtMeta::new(
        text("name").unwrap_or(id),
        text("sport").unwrap_or_default(),
        text("status").unwrap_or_default(),
    );
    let mut court = Court::new(id).with_meta(meta);
    if let (Some(x), Some(y)) = (coord("x")?, coord("y")?) {
        court = court.at(x, y);
    }
    Ok(court)
}

fn first_arg(node: &KdlNode) -> Option<&str> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
}

fn number(value: &KdlValue) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
}

fn set_prop(node: &mut KdlNode, key: &str, value: f64) {
    node.entries_mut()
        .retain(|e| e.name().map(|n| n.value()) != Some(key));
    node.push(KdlEntry::new_prop(key, value));
}
