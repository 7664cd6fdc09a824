use crate::config::RenderConfig;
use crate::layout::{LayoutNode, MindMapLayout, strip_markup};
use crate::theme::{Theme, solid_color};
use anyhow::Result;
use std::path::Path;

const LABEL_CHARS_PER_LINE: usize = 32;
const LABEL_LINE_HEIGHT: f32 = 1.5;

/// Static preview of a laid-out mind map.
pub fn render_svg(layout: &MindMapLayout, theme: &Theme, config: &RenderConfig) -> String {
    let mut svg = String::new();
    let pad = config.padding.max(0.0);
    let width = (layout.width + pad * 2.0).max(200.0);
    let height = (layout.height + pad * 2.0).max(200.0);
    let view_x = layout.min_x - pad;
    let view_y = layout.min_y - pad;
    let background = if config.background.trim().is_empty() {
        paint(&theme.background, "#ffffff")
    } else {
        paint(&config.background, "#ffffff")
    };

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{view_x:.2} {view_y:.2} {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect x=\"{view_x:.2}\" y=\"{view_y:.2}\" width=\"100%\" height=\"100%\" fill=\"{background}\"/>",
    ));

    let mut marker_colors: Vec<String> = Vec::new();
    for edge in &layout.edges {
        let color = paint(&edge.style.stroke, "#64748b");
        if !marker_colors.contains(&color) {
            marker_colors.push(color);
        }
    }
    svg.push_str("<defs>");
    for (idx, color) in marker_colors.iter().enumerate() {
        svg.push_str(&format!(
            "<marker id=\"arrow-{idx}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{color}\"/></marker>",
        ));
    }
    svg.push_str("</defs>");

    for (edge, path) in layout.edges.iter().zip(layout.edge_paths()) {
        let Some(path) = path else {
            continue;
        };
        let color = paint(&edge.style.stroke, "#64748b");
        let marker = marker_colors
            .iter()
            .position(|candidate| *candidate == color)
            .map(|idx| format!(" marker-end=\"url(#arrow-{idx})\""))
            .unwrap_or_default();
        svg.push_str(&format!(
            "<path class=\"mindmap-edge\" data-id=\"{}\" d=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{:.2}\"{marker}/>",
            escape_xml(&edge.id),
            path.to_svg_path(),
            edge.style.stroke_width,
        ));
    }

    for node in &layout.nodes {
        svg.push_str(&node_svg(node));
    }

    svg.push_str("</svg>");
    svg
}

fn node_svg(node: &LayoutNode) -> String {
    let style = &node.style;
    let radius = if style.border_radius.trim_end().ends_with('%') {
        node.width.min(node.height) / 2.0
    } else {
        leading_px(&style.border_radius).unwrap_or(0.0)
    };
    let mut out = format!(
        "<rect class=\"mindmap-node\" data-id=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
        escape_xml(&node.id),
        node.position.x,
        node.position.y,
        node.width,
        node.height,
        paint(&style.background, "#ffffff"),
        paint(&style.border, "#94a3b8"),
        leading_px(&style.border).unwrap_or(1.0),
    );

    let lines = wrap_label(&strip_markup(&node.label), LABEL_CHARS_PER_LINE);
    let center = node.center();
    let line_step = style.font_size * LABEL_LINE_HEIGHT;
    let total_height = lines.len() as f32 * line_step;
    let start_y = center.y - total_height / 2.0 + style.font_size;
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\">",
        center.x,
        escape_xml(&style.font_family),
        style.font_size,
        style.font_weight,
        paint(&style.color, "#1e293b"),
    ));
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_step };
        out.push_str(&format!(
            "<tspan x=\"{:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            center.x,
            escape_xml(line)
        ));
    }
    out.push_str("</text>");
    out
}

/// Greedy word wrap; words longer than a line are split.
fn wrap_label(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut current = String::new();
        for word in raw.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                lines.push(word.drain(..max_chars).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn paint(css: &str, fallback: &str) -> String {
    solid_color(css).unwrap_or_else(|| fallback.to_string())
}

/// First `<number>px` token of a CSS shorthand such as `2px solid #94a3b8`.
fn leading_px(css: &str) -> Option<f32> {
    css.split_whitespace()
        .find_map(|token| token.strip_suffix("px")?.parse::<f32>().ok())
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Segoe UI".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
