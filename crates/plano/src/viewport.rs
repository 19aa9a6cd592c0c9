use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::PlanoError;
use crate::transform::Transform;
use crate::types::{Point, ViewportState};

/// Construction-time viewport settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ViewportConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub grid_size: f64,
    pub container_width: f64,
    pub container_height: f64,
    pub zoom_step: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 3.0,
            grid_size: 20.0,
            container_width: 800.0,
            container_height: 600.0,
            zoom_step: 0.2,
        }
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<(), PlanoError> {
        let fields = [
            ("min-zoom", self.min_zoom),
            ("max-zoom", self.max_zoom),
            ("grid-size", self.grid_size),
            ("zoom-step", self.zoom_step),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlanoError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("width", self.container_width),
            ("height", self.container_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlanoError::InvalidConfig(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        if self.min_zoom > self.max_zoom {
            return Err(PlanoError::InvalidZoomBounds {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        Ok(())
    }

    /// Transform origin: the container center.
    pub fn pivot(&self) -> Point {
        Point::new(self.container_width / 2.0, self.container_height / 2.0)
    }
}

/// Tile size and phase of the background grid for the current view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridBackground {
    pub tile: f64,
    pub offset: Point,
}

impl GridBackground {
    pub fn background_size(&self) -> String {
        format!("{}px {}px", self.tile, self.tile)
    }

    pub fn background_position(&self) -> String {
        format!("{}px {}px", self.offset.x, self.offset.y)
    }
}

/// Owns the zoom/pan pair and the pan gesture.
#[derive(Debug, Clone)]
pub struct Viewport {
    config: ViewportConfig,
    state: ViewportState,
    // pointer - pan at pan start
    pan_anchor: Option<Point>,
    pan_locked: bool,
    container_origin: Option<Point>,
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Result<Self, PlanoError> {
        config.validate()?;
        let zoom = 1.0f64.clamp(config.min_zoom, config.max_zoom);
        Ok(Self {
            config,
            state: ViewportState {
                zoom,
                pan: Point::ORIGIN,
            },
            pan_anchor: None,
            pan_locked: false,
            container_origin: None,
        })
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn pan(&self) -> Point {
        self.state.pan
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.state.zoom + self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.state.zoom - self.config.zoom_step);
    }

    /// Set the zoom, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        // Round so repeated steps land on the same values as a single jump.
        let zoom = ((zoom * 1e6).round() / 1e6).clamp(self.config.min_zoom, self.config.max_zoom);
        if zoom != self.state.zoom {
            debug!(from = self.state.zoom, to = zoom, "zoom changed");
            self.state.zoom = zoom;
        }
    }

    pub fn can_zoom_in(&self) -> bool {
        self.state.zoom < self.config.max_zoom
    }

    pub fn can_zoom_out(&self) -> bool {
        self.state.zoom > self.config.min_zoom
    }

    pub fn reset_view(&mut self) {
        self.state.zoom = 1.0f64.clamp(self.config.min_zoom, self.config.max_zoom);
        self.state.pan = Point::ORIGIN;
        self.pan_anchor = None;
        debug!("view reset");
    }

    pub fn pan_start(&mut self, pointer: Point) {
        if self.pan_locked {
            trace!("pan start ignored while repositioning");
            return;
        }
        self.pan_anchor = Some(pointer - self.state.pan);
    }

    pub fn pan_move(&mut self, pointer: Point) {
        if self.pan_locked {
            return;
        }
        if let Some(anchor) = self.pan_anchor {
            self.state.pan = pointer - anchor;
        }
    }

    pub fn pan_end(&mut self) {
        self.pan_anchor = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    /// While locked every pan call is a no-op. Locking also drops a pan
    /// gesture in progress.
    pub fn set_pan_locked(&mut self, locked: bool) {
        self.pan_locked = locked;
        if locked {
            self.pan_anchor = None;
        }
    }

    pub fn is_pan_locked(&self) -> bool {
        self.pan_locked
    }

    pub fn mount(&mut self, container_origin: Point) {
        self.container_origin = Some(container_origin);
    }

    pub fn unmount(&mut self) {
        self.container_origin = None;
        self.pan_anchor = None;
    }

    pub fn container_origin(&self) -> Option<Point> {
        self.container_origin
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
            self.config.container_width = width;
            self.config.container_height = height;
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::new(&self.state, self.config.pivot())
    }

    /// Page pixels to logical coordinates. Before the container is mounted
    /// the raw pointer position is returned unchanged.
    pub fn screen_to_logical(&self, screen: Point) -> Point {
        match self.container_origin {
            Some(origin) => self.transform().to_logical(screen, origin),
            None => {
                trace!("container not mounted, using identity transform");
                screen
            }
        }
    }

    /// Logical coordinates to container-local screen pixels.
    pub fn logical_to_screen(&self, logical: Point) -> Point {
        self.transform().to_screen(logical)
    }

    pub fn grid(&self) -> GridBackground {
        let tile = self.config.grid_size * self.state.zoom;
        GridBackground {
            tile,
            offset: Point::new(self.state.pan.x % tile, self.state.pan.y % tile),
        }
    }
}
