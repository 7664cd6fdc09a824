use mindmap_rs_renderer::layout::{AnchorSide, BoxGeometry, Point, resolve_anchors};
use mindmap_rs_renderer::layout_dump::LayoutDump;
use mindmap_rs_renderer::{LayoutConfig, Theme, ThemeId, compute_mindmap_layout, parse_note_tree};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Node box as the canvas reports it: top-left position plus measured size.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeBox {
    #[serde(default)]
    position: Option<XY>,
    #[serde(default)]
    x: Option<f32>,
    #[serde(default)]
    y: Option<f32>,
    width: f32,
    height: f32,
}

#[derive(Debug, Deserialize)]
struct XY {
    x: f32,
    y: f32,
}

impl NodeBox {
    fn geometry(&self) -> BoxGeometry {
        let (x, y) = match &self.position {
            Some(pos) => (pos.x, pos.y),
            None => (self.x.unwrap_or(0.0), self.y.unwrap_or(0.0)),
        };
        BoxGeometry::from_top_left(x, y, self.width, self.height)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EdgeParams {
    sx: f32,
    sy: f32,
    tx: f32,
    ty: f32,
    source_pos: AnchorSide,
    target_pos: AnchorSide,
}

fn to_js(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn layout_json(tree_json: &str, theme: Option<&str>) -> Result<String, String> {
    let theme = Theme::resolve(ThemeId::from_token(theme.unwrap_or("default")));
    let tree = parse_note_tree(tree_json).map_err(|err| err.to_string())?;
    let layout = compute_mindmap_layout(tree.as_ref(), &theme, &LayoutConfig::default())
        .map_err(|err| err.to_string())?;
    serde_json::to_string(&LayoutDump::from_layout(&layout)).map_err(|err| err.to_string())
}

fn edge_params_json(source_json: &str, target_json: &str) -> Result<String, String> {
    let source: NodeBox = serde_json::from_str(source_json).map_err(|err| err.to_string())?;
    let target: NodeBox = serde_json::from_str(target_json).map_err(|err| err.to_string())?;
    let anchors = resolve_anchors(&source.geometry(), &target.geometry());
    let Point { x: sx, y: sy } = anchors.source;
    let Point { x: tx, y: ty } = anchors.target;
    let params = EdgeParams {
        sx,
        sy,
        tx,
        ty,
        source_pos: anchors.source_side,
        target_pos: anchors.target_side,
    };
    serde_json::to_string(&params).map_err(|err| err.to_string())
}

/// Lays out a note tree (JSON) and returns the layout dump as JSON.
#[wasm_bindgen]
pub fn layout_mind_map(tree_json: &str, theme: Option<String>) -> Result<String, JsValue> {
    layout_json(tree_json, theme.as_deref()).map_err(to_js)
}

/// Resolves floating edge endpoints between two node boxes.
#[wasm_bindgen]
pub fn edge_params(source_json: &str, target_json: &str) -> Result<String, JsValue> {
    edge_params_json(source_json, target_json).map_err(to_js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lays_out_tree_with_requested_theme() {
        let tree = r#"{"label": "Root", "children": [{"label": "A"}, {"label": "B"}]}"#;
        let out: serde_json::Value =
            serde_json::from_str(&layout_json(tree, Some("tech")).unwrap()).unwrap();
        assert_eq!(out["theme"], "tech");
        assert_eq!(out["nodes"].as_array().map(Vec::len), Some(3));
        assert_eq!(out["edges"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn null_tree_gives_empty_layout() {
        let out: serde_json::Value =
            serde_json::from_str(&layout_json("null", None).unwrap()).unwrap();
        assert_eq!(out["nodes"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn service_error_is_reported() {
        let err = layout_json(r#"{"error": "no text found"}"#, None).unwrap_err();
        assert!(err.contains("no text found"));
    }

    #[test]
    fn edge_params_for_stacked_boxes() {
        let source = r#"{"position": {"x": 0, "y": 0}, "width": 100, "height": 40}"#;
        let target = r#"{"x": 0, "y": 200, "width": 100, "height": 40}"#;
        let out: serde_json::Value =
            serde_json::from_str(&edge_params_json(source, target).unwrap()).unwrap();
        assert_eq!(out["sourcePos"], "bottom");
        assert_eq!(out["targetPos"], "top");
        assert_eq!(out["sx"], 50.0);
        assert_eq!(out["sy"], 40.0);
        assert_eq!(out["ty"], 200.0);
    }
}
