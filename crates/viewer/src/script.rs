//! Interaction scripts: a KDL document with one node per input action,
//! replayed against a [`Floorplan`].
//!
//! ```kdl
//! reposition "A"
//! down "A" x=170 y=110
//! move x=400 y=260
//! frames 30
//! up x=400 y=260
//! ```

use anyhow::{Context, Result, anyhow, bail};
use kdl::{KdlDocument, KdlNode, KdlValue};
use plano::{
    CourtSource, Floorplan, FloorplanEvent, Key, ManualFrames, Point, PointerButton,
    RenderAdapter,
};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ZoomIn,
    ZoomOut,
    Reset,
    Pan { from: Point, to: Point },
    Reposition(String),
    Down {
        id: String,
        at: Point,
        button: PointerButton,
    },
    Move(Point),
    Up(Point),
    Escape,
    ContextMenu,
    Frames(u32),
    Click(String),
    Refresh,
}

pub fn parse_script(content: &str) -> Result<Vec<Action>> {
    let doc = KdlDocument::parse(content).context("parsing script KDL")?;
    doc.nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| {
            parse_action(node)
                .with_context(|| format!("script action #{} `{}`", i + 1, node.name().value()))
        })
        .collect()
}

fn parse_action(node: &KdlNode) -> Result<Action> {
    let action = match node.name().value() {
        "zoom-in" => Action::ZoomIn,
        "zoom-out" => Action::ZoomOut,
        "reset" => Action::Reset,
        "pan" => Action::Pan {
            from: Point::new(number(node, "from-x")?, number(node, "from-y")?),
            to: Point::new(number(node, "to-x")?, number(node, "to-y")?),
        },
        "reposition" => Action::Reposition(id_arg(node)?),
        "down" => {
            let button = match node.get("button").and_then(KdlValue::as_string) {
                None | Some("primary") => PointerButton::Primary,
                Some("secondary") => PointerButton::Secondary,
                Some("middle") => PointerButton::Middle,
                Some(other) => bail!("unknown button `{other}`"),
            };
            Action::Down {
                id: id_arg(node)?,
                at: point(node)?,
                button,
            }
        }
        "move" => Action::Move(point(node)?),
        "up" => Action::Up(point(node)?),
        "escape" => Action::Escape,
        "context-menu" => Action::ContextMenu,
        "frames" => {
            let count = node
                .entries()
                .iter()
                .find(|e| e.name().is_none())
                .and_then(|e| e.value().as_integer())
                .ok_or_else(|| anyhow!("expected a frame count"))?;
            Action::Frames(u32::try_from(count).context("frame count out of range")?)
        }
        "click" => Action::Click(id_arg(node)?),
        "refresh" => Action::Refresh,
        other => bail!("unknown action `{other}`"),
    };
    Ok(action)
}

fn id_arg(node: &KdlNode) -> Result<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("expected a court id"))
}

fn point(node: &KdlNode) -> Result<Point> {
    Ok(Point::new(number(node, "x")?, number(node, "y")?))
}

fn number(node: &KdlNode, key: &str) -> Result<f64> {
    let value = node
        .get(key)
        .ok_or_else(|| anyhow!("missing {key}="))?;
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
        .ok_or_else(|| anyhow!("{key}= must be a number"))
}

/// Replay `actions` in order. Rejected input and failed commits are logged
/// and the script continues; they also show up in the returned events.
pub fn run<C: CourtSource>(
    plan: &mut Floorplan<C, ManualFrames>,
    adapter: &mut RenderAdapter,
    actions: &[Action],
) -> Result<Vec<FloorplanEvent>> {
    let mut events = Vec::new();
    for action in actions {
        debug!(?action, "script");
        match action {
            Action::ZoomIn => plan.zoom_in(),
            Action::ZoomOut => plan.zoom_out(),
            Action::Reset => plan.reset_view(),
            Action::Pan { from, to } => {
                plan.pan_start(*from);
                plan.pan_move(*to);
                plan.pan_end();
            }
            Action::Reposition(id) => plan
                .enter_reposition_mode(id)
                .with_context(|| format!("reposition `{id}`"))?,
            Action::Down { id, at, button } => {
                if let Err(err) = plan.pointer_down(id, *at, *button) {
                    warn!(error = %err, "pointer down rejected");
                }
            }
            Action::Move(at) => plan.pointer_move(*at),
            Action::Up(at) => {
                plan.pointer_move(*at);
                if let Err(err) = plan.pointer_up() {
                    warn!(error = %err, "commit failed");
                }
            }
            Action::Escape => {
                plan.key_down(Key::Escape);
            }
            Action::ContextMenu => {
                plan.context_menu();
            }
            Action::Frames(count) => {
                for _ in 0..*count {
                    if !plan.tick() {
                        break;
                    }
                }
            }
            Action::Click(id) => {
                adapter.click(plan, id);
            }
            Action::Refresh => {
                plan.reload().context("refresh")?;
            }
        }
        events.extend(plan.drain_events());
    }
    Ok(events)
}
