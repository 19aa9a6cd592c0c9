//! Uniform scale + translate transform between plane-logical and screen
//! coordinates.
//!
//! The plane is scaled about a pivot (the container center, matching a CSS
//! `transform-origin: center center`). With a zero pivot the mapping reduces
//! to `screen = logical * zoom + pan`.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::TransformParseError;
use crate::types::{Point, ViewportState};

const NUM: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";

static TRANSLATE_SCALE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^translate\(\s*({NUM})(?:px)?\s*,\s*({NUM})(?:px)?\s*\)\s*scale\(\s*({NUM})\s*\)$"
    ))
    .unwrap()
});

static MATRIX_RE: Lazy<Regex> = Lazy::new(|| {
    let n = format!(r"\s*({NUM})\s*");
    Regex::new(&format!(r"^matrix\({n},{n},{n},{n},{n},{n}\)$")).unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub translate: Point,
    /// Point the scale is applied about, in container-local pixels.
    pub pivot: Point,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub const fn identity() -> Self {
        Self {
            scale: 1.0,
            translate: Point::ORIGIN,
            pivot: Point::ORIGIN,
        }
    }

    pub fn new(state: &ViewportState, pivot: Point) -> Self {
        Self {
            scale: state.zoom,
            translate: state.pan,
            pivot,
        }
    }

    /// Scale used for the math. A non-positive or non-finite zoom is treated
    /// as 1 so the inverse never divides by zero.
    pub fn effective_scale(&self) -> f64 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }

    /// Logical point to container-local screen pixels.
    pub fn to_screen(&self, logical: Point) -> Point {
        self.pivot + self.translate + (logical - self.pivot) * self.effective_scale()
    }

    /// Logical point to page pixels, for a container whose top-left corner
    /// sits at `container_origin`.
    pub fn to_page(&self, logical: Point, container_origin: Point) -> Point {
        container_origin + self.to_screen(logical)
    }

    /// Page pixels back to logical coordinates.
    pub fn to_logical(&self, screen: Point, container_origin: Point) -> Point {
        let relative = screen - container_origin;
        (relative - self.pivot - self.translate) / self.effective_scale() + self.pivot
    }

    /// CSS form, e.g. `translate(12px, -4px) scale(1.2)`.
    pub fn to_style(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate.x, self.translate.y, self.scale
        )
    }

    /// Rebuild a transform from a style string, keeping the given pivot.
    /// A malformed string falls back to the identity.
    pub fn from_style_or_identity(style: &str, pivot: Point) -> Self {
        let parsed = parse_transform_or_identity(style);
        Self {
            scale: parsed.scale,
            translate: Point::new(parsed.translate_x, parsed.translate_y),
            pivot,
        }
    }
}

/// Scale and translation recovered from a transform style string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl ParsedTransform {
    pub const IDENTITY: ParsedTransform = ParsedTransform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };
}

/// Parse either our own `translate(..) scale(..)` form or a computed
/// `matrix(a, b, c, d, e, f)`. An empty string or `none` is the identity.
pub fn parse_transform(style: &str) -> Result<ParsedTransform, TransformParseError> {
    let style = style.trim();
    if style.is_empty() || style.eq_ignore_ascii_case("none") {
        return Ok(ParsedTransform::IDENTITY);
    }

    if let Some(caps) = TRANSLATE_SCALE_RE.captures(style) {
        return Ok(ParsedTransform {
            translate_x: number(&caps[1])?,
            translate_y: number(&caps[2])?,
            scale: number(&caps[3])?,
        });
    }

    if let Some(caps) = MATRIX_RE.captures(style) {
        let mut m = [0.0f64; 6];
        for (i, slot) in m.iter_mut().enumerate() {
            *slot = number(&caps[i + 1])?;
        }
        let [a, b, c, d, e, f] = m;
        if (a - d).abs() > 1e-9 || b.abs() > 1e-9 || c.abs() > 1e-9 {
            return Err(TransformParseError::NotUniformScale { a, b, c, d });
        }
        return Ok(ParsedTransform {
            scale: a,
            translate_x: e,
            translate_y: f,
        });
    }

    Err(TransformParseError::Unrecognized(style.to_string()))
}

pub fn parse_transform_or_identity(style: &str) -> ParsedTransform {
    match parse_transform(style) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(%err, "falling back to identity transform");
            ParsedTransform::IDENTITY
        }
    }
}

fn number(text: &str) -> Result<f64, TransformParseError> {
    text.parse::<f64>()
        .map_err(|_| TransformParseError::InvalidNumber(text.to_string()))
}
