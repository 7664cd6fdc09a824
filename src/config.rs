use crate::theme::{Theme, ThemeId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Constants of the label footprint heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintConfig {
    pub node_width: f32,
    pub base_node_height: f32,
    pub root_node_size: f32,
    pub padding_vertical: f32,
    pub line_height: f32,
    pub chars_per_line: usize,
    /// Horizontal inner padding used by the font-metrics estimator.
    pub node_padding: f32,
    pub font_size: f32,
    /// Face measured by the font-metrics estimator. Fixed here rather than
    /// taken from the theme, so switching themes never moves a node.
    pub font_family: String,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            node_width: 240.0,
            base_node_height: 60.0,
            root_node_size: 280.0,
            padding_vertical: 24.0,
            line_height: 22.0,
            chars_per_line: 32,
            node_padding: 10.0,
            font_size: 14.0,
            font_family: "Segoe UI, sans-serif".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub order_passes: usize,
    /// Measure labels with system font metrics instead of character counts.
    /// The face is `footprint.font_family`, never the theme's.
    pub font_metrics: bool,
    pub footprint: FootprintConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 50.0,
            rank_spacing: 200.0,
            order_passes: 4,
            font_metrics: false,
            footprint: FootprintConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1000.0,
            padding: 40.0,
            background: "#f8fafc".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    /// `themeVariables` from the config file, re-applied on every theme switch.
    pub overrides: ThemeOverrides,
}

impl Config {
    pub fn with_theme(id: ThemeId) -> Self {
        let theme = Theme::resolve(id);
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
            overrides: ThemeOverrides::default(),
        }
    }

    /// Swap the theme, keeping layout constants, canvas size and theme overrides.
    pub fn set_theme(&mut self, id: ThemeId) {
        self.theme = Theme::resolve(id);
        self.render.background = self.theme.background.clone();
        self.overrides.apply(&mut self.theme, &mut self.render);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_theme(ThemeId::Default)
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FootprintConfigFile {
    node_width: Option<f32>,
    base_node_height: Option<f32>,
    root_node_size: Option<f32>,
    padding_vertical: Option<f32>,
    line_height: Option<f32>,
    chars_per_line: Option<usize>,
    node_padding: Option<f32>,
    font_size: Option<f32>,
    font_family: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    order_passes: Option<usize>,
    font_metrics: Option<bool>,
    footprint: Option<FootprintConfigFile>,
}

/// Per-field theme overrides, layered over whichever theme is selected.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ThemeOverrides {
    pub background: Option<String>,
    pub font_family: Option<String>,
    pub text_color: Option<String>,
    pub edge_stroke: Option<String>,
    pub edge_stroke_width: Option<f32>,
    pub edge_filter: Option<String>,
    pub branch_colors: Option<Vec<String>>,
}

impl ThemeOverrides {
    pub fn apply(&self, theme: &mut Theme, render: &mut RenderConfig) {
        if let Some(v) = &self.background {
            theme.background = v.clone();
            render.background = v.clone();
        }
        if let Some(v) = &self.font_family {
            theme.node.font_family = v.clone();
        }
        if let Some(v) = &self.text_color {
            theme.node.text_color = v.clone();
        }
        if let Some(v) = &self.edge_stroke {
            theme.edge.stroke = v.clone();
        }
        if let Some(v) = self.edge_stroke_width {
            theme.edge.stroke_width = v;
        }
        if let Some(v) = &self.edge_filter {
            theme.edge.filter = v.clone();
        }
        if let Some(v) = &self.branch_colors {
            theme.branch_colors = v.clone();
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeOverrides>,
    layout: Option<LayoutConfigFile>,
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse a config file body (JSON, or JSON5 with comments and trailing commas).
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|json5_err| {
            anyhow::anyhow!("invalid config file: {json_err} (as JSON5: {json5_err})")
        })?,
    };

    let mut config = match parsed.theme.as_deref() {
        Some(name) => Config::with_theme(ThemeId::from_token(name)),
        None => Config::default(),
    };

    if let Some(overrides) = parsed.theme_variables {
        overrides.apply(&mut config.theme, &mut config.render);
        config.overrides = overrides;
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_spacing {
            config.layout.node_spacing = v;
        }
        if let Some(v) = layout.rank_spacing {
            config.layout.rank_spacing = v;
        }
        if let Some(v) = layout.order_passes {
            config.layout.order_passes = v;
        }
        if let Some(v) = layout.font_metrics {
            config.layout.font_metrics = v;
        }
        if let Some(footprint) = layout.footprint {
            let target = &mut config.layout.footprint;
            if let Some(v) = footprint.node_width {
                target.node_width = v;
            }
            if let Some(v) = footprint.base_node_height {
                target.base_node_height = v;
            }
            if let Some(v) = footprint.root_node_size {
                target.root_node_size = v;
            }
            if let Some(v) = footprint.padding_vertical {
                target.padding_vertical = v;
            }
            if let Some(v) = footprint.line_height {
                target.line_height = v;
            }
            if let Some(v) = footprint.chars_per_line {
                target.chars_per_line = v.max(1);
            }
            if let Some(v) = footprint.node_padding {
                target.node_padding = v;
            }
            if let Some(v) = footprint.font_size {
                target.font_size = v;
            }
            if let Some(v) = footprint.font_family {
                target.font_family = v;
            }
        }
    }

    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }
    if let Some(v) = parsed.padding {
        config.render.padding = v;
    }

    Ok(config)
}
