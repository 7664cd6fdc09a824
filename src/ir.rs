use serde::Deserialize;
use thiserror::Error;

/// One concept of a note tree, as produced by the note analysis service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InputNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub children: Vec<InputNode>,
    /// Explicit box size carried over from an earlier, user-resized layout.
    #[serde(default, alias = "size")]
    pub style: Option<SizeHint>,
}

/// Raw width/height pair. Values stay untyped so that a malformed override
/// degrades to the estimator instead of failing the whole tree.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SizeHint {
    #[serde(default)]
    pub width: Option<serde_json::Value>,
    #[serde(default)]
    pub height: Option<serde_json::Value>,
}

impl SizeHint {
    pub fn numeric(width: f32, height: f32) -> Self {
        Self {
            width: serde_json::Number::from_f64(width as f64).map(serde_json::Value::Number),
            height: serde_json::Number::from_f64(height as f64).map(serde_json::Value::Number),
        }
    }

    /// Both dimensions as positive finite numbers, or `None`.
    pub fn resolve(&self) -> Option<(f32, f32)> {
        let width = self.width.as_ref()?.as_f64()? as f32;
        let height = self.height.as_ref()?.as_f64()? as f32;
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Some((width, height))
        } else {
            None
        }
    }
}

impl InputNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_children(mut self, children: Vec<InputNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.style = Some(SizeHint::numeric(width, height));
        self
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(InputNode::node_count).sum::<usize>()
    }
}

#[derive(Debug, Error)]
pub enum NoteTreeError {
    #[error("note analysis failed: {0}")]
    Service(String),
    #[error("invalid note tree JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a note tree payload. `null` decodes to `None`.
pub fn parse_note_tree(input: &str) -> Result<Option<InputNode>, NoteTreeError> {
    let value: serde_json::Value = serde_json::from_str(input.trim())?;
    if value.is_null() {
        return Ok(None);
    }
    if let Some(object) = value.as_object()
        && !object.contains_key("label")
        && !object.contains_key("children")
        && let Some(message) = object.get("error").and_then(|v| v.as_str())
    {
        return Err(NoteTreeError::Service(message.to_string()));
    }
    let node: InputNode = serde_json::from_value(value)?;
    Ok(Some(node))
}
