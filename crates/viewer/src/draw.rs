//! Draws a [`Scene`] as a static SVG document.

use plano::{CourtView, Scene};
use svg::Document;
use svg::node::element::{Definitions, Group, Image, Path, Pattern, Rectangle, Text};

/// Footprint of one court on the plane, before zoom.
const COURT_WIDTH: f64 = 120.0;
const COURT_HEIGHT: f64 = 80.0;

pub fn render_svg(scene: &Scene) -> Document {
    let tile = scene.grid.tile;
    let grid = Pattern::new()
        .set("id", "grid")
        .set("width", tile)
        .set("height", tile)
        .set("x", scene.grid.offset.x)
        .set("y", scene.grid.offset.y)
        .set("patternUnits", "userSpaceOnUse")
        .add(
            Path::new()
                .set("d", format!("M {tile} 0 L 0 0 0 {tile}"))
                .set("fill", "none")
                .set("stroke", "#e5e7eb")
                .set("stroke-width", 1),
        );

    let mut document = Document::new()
        .set("width", scene.width)
        .set("height", scene.height)
        .set("viewBox", (0.0, 0.0, scene.width, scene.height))
        .add(Definitions::new().add(grid))
        .add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "url(#grid)"),
        );

    for court in &scene.courts {
        document = document.add(court_group(court, scene.zoom));
    }

    document
        .add(label(&scene.zoom_label, 10.0, scene.height - 28.0))
        .add(label(&scene.pan_label, 10.0, scene.height - 10.0))
}

fn court_group(court: &CourtView, zoom: f64) -> Group {
    let width = COURT_WIDTH * zoom;
    let height = COURT_HEIGHT * zoom;
    let stroke_width = if court.state.selected || court.state.dragging {
        4
    } else {
        2
    };

    let mut frame = Rectangle::new()
        .set("x", court.screen.x)
        .set("y", court.screen.y)
        .set("width", width)
        .set("height", height)
        .set("rx", 6)
        .set("fill", "white")
        .set("stroke", court.visual.border_color.as_str())
        .set("stroke-width", stroke_width);
    if court.state.editable {
        frame = frame.set("stroke-dasharray", "6 3");
    }

    let mut class = vec!["court"];
    if court.state.selected {
        class.push("selected");
    }
    if court.state.editable {
        class.push("editable");
    }
    if court.state.dragging {
        class.push("dragging");
    }

    Group::new()
        .set("id", format!("court-{}", court.id))
        .set("class", class.join(" "))
        .set("data-title", court.title.as_str())
        .add(frame)
        .add(
            Image::new()
                .set("href", court.visual.image.as_str())
                .set("x", court.screen.x + 4.0)
                .set("y", court.screen.y + 4.0)
                .set("width", width - 8.0)
                .set("height", height - 24.0),
        )
        .add(
            Text::new(court.name.as_str())
                .set("x", court.screen.x + width / 2.0)
                .set("y", court.screen.y + height - 6.0)
                .set("text-anchor", "middle")
                .set("font-size", 12.0 * zoom)
                .set("font-family", "sans-serif"),
        )
}

fn label(content: &str, x: f64, y: f64) -> Text {
    Text::new(content)
        .set("x", x)
        .set("y", y)
        .set("font-size", 12)
        .set("font-family", "monospace")
        .set("fill", "#374151")
}
