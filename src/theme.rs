use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    #[default]
    Default,
    Tech,
    Pink,
}

impl ThemeId {
    pub const ALL: [ThemeId; 3] = [ThemeId::Default, ThemeId::Tech, ThemeId::Pink];

    /// Unknown selectors resolve to the default theme.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "tech" | "future-tech" | "future_tech" => Self::Tech,
            "pink" | "pink-cyberpunk" | "pink_cyberpunk" => Self::Pink,
            _ => Self::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Tech => "tech",
            Self::Pink => "pink",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTheme {
    pub root_background: String,
    pub root_border: String,
    pub root_text_color: String,
    pub child_background: String,
    pub child_border: String,
    pub text_color: String,
    pub font_family: String,
    pub box_shadow: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeTheme {
    pub stroke: String,
    pub stroke_width: f32,
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: ThemeId,
    pub name: String,
    pub background: String,
    pub background_pattern: String,
    /// Accent used for child borders that carry no branch color.
    pub accent: String,
    pub node: NodeTheme,
    pub edge: EdgeTheme,
    pub branch_colors: Vec<String>,
}

fn colors(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Theme {
    pub fn resolve(id: ThemeId) -> Self {
        match id {
            ThemeId::Default => Self::light(),
            ThemeId::Tech => Self::future_tech(),
            ThemeId::Pink => Self::pink_cyberpunk(),
        }
    }

    pub fn light() -> Self {
        Self {
            id: ThemeId::Default,
            name: "Default (Light)".to_string(),
            background: "#f8fafc".to_string(),
            background_pattern: "#e2e8f0".to_string(),
            accent: "#94a3b8".to_string(),
            node: NodeTheme {
                root_background: "linear-gradient(145deg, #ffffff 0%, #f1f5f9 100%)".to_string(),
                root_border: "2px solid #94a3b8".to_string(),
                root_text_color: "#1e293b".to_string(),
                child_background: "#ffffff".to_string(),
                child_border: "1px solid #cbd5e1".to_string(),
                text_color: "#1e293b".to_string(),
                font_family: "Segoe UI, sans-serif".to_string(),
                box_shadow: "0 2px 8px rgba(0,0,0,0.1)".to_string(),
            },
            edge: EdgeTheme {
                stroke: "#64748b".to_string(),
                stroke_width: 3.0,
                filter: "none".to_string(),
            },
            branch_colors: colors(&[
                "#64748b", "#94a3b8", "#cbd5e1", "#e2e8f0", "#f1f5f9", "#f8fafc",
            ]),
        }
    }

    pub fn future_tech() -> Self {
        Self {
            id: ThemeId::Tech,
            name: "Future Tech".to_string(),
            background: "#0f172a".to_string(),
            background_pattern: "#1e293b".to_string(),
            accent: "#06b6d4".to_string(),
            node: NodeTheme {
                root_background:
                    "linear-gradient(145deg, rgba(6, 182, 212, 0.25) 0%, rgba(8, 145, 178, 0.2) 100%)"
                        .to_string(),
                root_border: "2px solid #06b6d4".to_string(),
                root_text_color: "#f8fafc".to_string(),
                child_background: "rgba(15, 23, 42, 0.85)".to_string(),
                child_border: "1px solid #06b6d4".to_string(),
                text_color: "#f8fafc".to_string(),
                font_family: "\"JetBrains Mono\", \"Fira Code\", \"Consolas\", monospace".to_string(),
                box_shadow: "0 0 20px rgba(6, 182, 212, 0.3), inset 0 1px 0 rgba(255,255,255,0.05)"
                    .to_string(),
            },
            edge: EdgeTheme {
                stroke: "#06b6d4".to_string(),
                stroke_width: 3.0,
                filter: "drop-shadow(0 0 4px rgba(6, 182, 212, 0.6))".to_string(),
            },
            branch_colors: colors(&[
                "#06b6d4", "#22d3ee", "#0ea5e9", "#38bdf8", "#7dd3fc", "#bae6fd",
            ]),
        }
    }

    pub fn pink_cyberpunk() -> Self {
        Self {
            id: ThemeId::Pink,
            name: "Pink Cyberpunk".to_string(),
            background: "#000000".to_string(),
            background_pattern: "#0a0a0a".to_string(),
            accent: "#ec4899".to_string(),
            node: NodeTheme {
                root_background:
                    "linear-gradient(145deg, rgba(236, 72, 153, 0.2) 0%, rgba(219, 39, 119, 0.15) 100%)"
                        .to_string(),
                root_border: "2px solid #ec4899".to_string(),
                root_text_color: "#fce7f3".to_string(),
                child_background: "rgba(0, 0, 0, 0.9)".to_string(),
                child_border: "1px solid #ec4899".to_string(),
                text_color: "#fce7f3".to_string(),
                font_family: "\"JetBrains Mono\", \"Fira Code\", \"Consolas\", monospace".to_string(),
                box_shadow: "0 0 20px rgba(236, 72, 153, 0.35), inset 0 1px 0 rgba(255,255,255,0.05)"
                    .to_string(),
            },
            edge: EdgeTheme {
                stroke: "#ec4899".to_string(),
                stroke_width: 3.0,
                filter: "drop-shadow(0 0 4px rgba(236, 72, 153, 0.6))".to_string(),
            },
            branch_colors: colors(&[
                "#ec4899", "#f472b6", "#f9a8d4", "#fbcfe8", "#fce7f3", "#fdf2f8",
            ]),
        }
    }

    pub fn branch_color(&self, index: usize) -> Option<&str> {
        if self.branch_colors.is_empty() {
            return None;
        }
        self.branch_colors
            .get(index % self.branch_colors.len())
            .map(String::as_str)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

/// First color of a CSS gradient or border shorthand, for SVG fills/strokes.
pub fn solid_color(css: &str) -> Option<String> {
    let start = match (css.find('#'), css.find("rgb")) {
        (Some(hash), Some(rgb)) => hash.min(rgb),
        (Some(idx), None) | (None, Some(idx)) => idx,
        (None, None) => return None,
    };
    let rest = &css[start..];
    if rest.starts_with('#') {
        let end = rest
            .char_indices()
            .skip(1)
            .find(|(_, ch)| !ch.is_ascii_hexdigit())
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        return Some(rest[..end].to_string());
    }
    let end = rest.find(')')?;
    Some(rest[..=end].to_string())
}
