//! Declarative view of the plane for a host UI.
//!
//! [`RenderAdapter::render`] reads the viewport, the committed positions and
//! the drag in progress and describes what to draw. The only state the
//! adapter keeps is the selection highlight.

use std::collections::HashMap;

use serde::Serialize;

use crate::floorplan::Floorplan;
use crate::scheduler::FrameScheduler;
use crate::source::CourtSource;
use crate::types::{CourtMeta, Point};
use crate::viewport::GridBackground;

/// How a court is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualDescriptor {
    pub image: String,
    pub border_color: String,
    pub status_label: String,
}

#[derive(Debug, Clone, PartialEq)]
struct StatusStyle {
    color: String,
    label: String,
}

/// Lookup tables from sport to image and from status to border color and
/// label.
#[derive(Debug, Clone)]
pub struct VisualCatalog {
    sports: HashMap<String, String>,
    default_image: String,
    statuses: HashMap<String, StatusStyle>,
    unknown_status: StatusStyle,
}

impl Default for VisualCatalog {
    fn default() -> Self {
        let football = "CanchaFutbol.PNG";
        let mut catalog = Self::empty(football, "#6b7280", "Desconocido");
        for sport in ["futbol", "futbol_5", "futbol_7", "futbol_11", "hockey", "multiuso"] {
            catalog = catalog.with_sport(sport, football);
        }
        catalog
            .with_sport("tenis", "CanchaTenis.PNG")
            .with_sport("padel", "CanchaPadel.PNG")
            .with_sport("basquet", "CanchaBasket.PNG")
            .with_sport("voley", "CanchaBasket.PNG")
            .with_status("disponible", "#22c55e", "Disponible")
            .with_status("ocupada", "#ef4444", "Ocupada")
            .with_status("mantenimiento", "#f59e0b", "Mantenimiento")
            .with_status("fuera_servicio", "#6b7280", "Fuera de Servicio")
    }
}

impl VisualCatalog {
    /// A catalog with no entries; every court gets the fallbacks.
    pub fn empty(
        default_image: impl Into<String>,
        unknown_color: impl Into<String>,
        unknown_label: impl Into<String>,
    ) -> Self {
        Self {
            sports: HashMap::new(),
            default_image: default_image.into(),
            statuses: HashMap::new(),
            unknown_status: StatusStyle {
                color: unknown_color.into(),
                label: unknown_label.into(),
            },
        }
    }

    pub fn with_sport(mut self, sport: impl Into<String>, image: impl Into<String>) -> Self {
        self.sports.insert(sport.into(), image.into());
        self
    }

    pub fn with_status(
        mut self,
        status: impl Into<String>,
        color: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.statuses.insert(
            status.into(),
            StatusStyle {
                color: color.into(),
                label: label.into(),
            },
        );
        self
    }

    pub fn describe(&self, meta: &CourtMeta) -> VisualDescriptor {
        let image = self
            .sports
            .get(&meta.sport)
            .unwrap_or(&self.default_image)
            .clone();
        let status = self.statuses.get(&meta.status).unwrap_or(&self.unknown_status);
        VisualDescriptor {
            image,
            border_color: status.color.clone(),
            status_label: status.label.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisualState {
    pub selected: bool,
    pub editable: bool,
    pub dragging: bool,
}

/// Input a court element should listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventBinding {
    PointerDown,
    Click,
    Escape,
    ContextMenu,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourtView {
    pub id: String,
    pub name: String,
    /// Position inside the transformed plane.
    pub logical: Point,
    /// Container-local screen position after zoom and pan.
    pub screen: Point,
    pub left: String,
    pub top: String,
    pub state: VisualState,
    pub visual: VisualDescriptor,
    pub title: String,
    pub bindings: Vec<EventBinding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
    pub pan: Point,
    pub content_transform: String,
    pub transform_origin: &'static str,
    pub grid: GridBackground,
    pub background_size: String,
    pub background_position: String,
    pub zoom_label: String,
    pub pan_label: String,
    pub can_zoom_in: bool,
    pub can_zoom_out: bool,
    pub panning: bool,
    pub courts: Vec<CourtView>,
}

impl Scene {
    pub fn court(&self, id: &str) -> Option<&CourtView> {
        self.courts.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderAdapter {
    catalog: VisualCatalog,
    selected: Option<String>,
}

impl RenderAdapter {
    pub fn new(catalog: VisualCatalog) -> Self {
        Self {
            catalog,
            selected: None,
        }
    }

    pub fn catalog(&self) -> &VisualCatalog {
        &self.catalog
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Toggle the selection highlight. Clicks on the court in reposition
    /// mode do nothing. Returns the new selection.
    pub fn click<C: CourtSource, F: FrameScheduler>(
        &mut self,
        plan: &Floorplan<C, F>,
        id: &str,
    ) -> Option<&str> {
        if plan.reposition_target() == Some(id) || !plan.store().contains(id) {
            return self.selected.as_deref();
        }
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        } else {
            self.selected = Some(id.to_string());
        }
        self.selected.as_deref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn render<C: CourtSource, F: FrameScheduler>(&self, plan: &Floorplan<C, F>) -> Scene {
        let viewport = plan.viewport();
        let config = viewport.config();
        let transform = viewport.transform();
        let grid = viewport.grid();
        let state = viewport.state();
        let dragging_id = plan.session().map(|s| s.court_id());

        let courts = plan
            .store()
            .iter()
            .map(|court| {
                let logical = plan.display_position(&court.id).unwrap_or(court.position);
                let editable = plan.reposition_target() == Some(court.id.as_str());
                let view_state = VisualState {
                    selected: self.selected.as_deref() == Some(court.id.as_str()),
                    editable,
                    dragging: dragging_id == Some(court.id.as_str()),
                };
                let bindings = if editable {
                    vec![
                        EventBinding::PointerDown,
                        EventBinding::Escape,
                        EventBinding::ContextMenu,
                    ]
                } else {
                    vec![EventBinding::Click]
                };
                let visual = self.catalog.describe(&court.meta);
                CourtView {
                    id: court.id.clone(),
                    name: court.meta.name.clone(),
                    logical,
                    screen: transform.to_screen(logical),
                    left: format!("{}px", logical.x),
                    top: format!("{}px", logical.y),
                    state: view_state,
                    title: format!(
                        "{} - {} - {}",
                        court.meta.name, court.meta.sport, visual.status_label
                    ),
                    visual,
                    bindings,
                }
            })
            .collect();

        Scene {
            width: config.container_width,
            height: config.container_height,
            zoom: state.zoom,
            pan: state.pan,
            content_transform: transform.to_style(),
            transform_origin: "center center",
            background_size: grid.background_size(),
            background_position: grid.background_position(),
            grid,
            zoom_label: format!("Zoom: {}%", (state.zoom * 100.0).round() as i64),
            pan_label: format!(
                "Pan: ({}, {})",
                state.pan.x.round() as i64,
                state.pan.y.round() as i64
            ),
            can_zoom_in: viewport.can_zoom_in(),
            can_zoom_out: viewport.can_zoom_out(),
            panning: viewport.is_panning(),
            courts,
        }
    }
}
