use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::FootprintConfig;
use crate::ir::SizeHint;
use crate::text_metrics;

use super::Size;

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Strategy that turns a label into an on-screen box.
///
/// Implementations must be pure: the same label always yields the same size,
/// otherwise re-layout stops being reproducible.
pub trait SizeEstimator {
    fn estimate(&self, label: &str, is_root: bool) -> Size;
}

/// Character-count heuristic. Width is constant, height grows with the
/// number of wrapped lines.
#[derive(Debug, Clone, Default)]
pub struct HeuristicEstimator {
    config: FootprintConfig,
}

impl HeuristicEstimator {
    pub fn new(config: FootprintConfig) -> Self {
        Self { config }
    }
}

impl SizeEstimator for HeuristicEstimator {
    fn estimate(&self, label: &str, is_root: bool) -> Size {
        if is_root {
            return root_size(&self.config);
        }
        let plain = strip_markup(label);
        let lines = wrapped_line_count(&plain, self.config.chars_per_line);
        Size::new(self.config.node_width, content_height(&self.config, lines))
    }
}

/// Word-wraps labels against measured glyph advances of
/// `FootprintConfig::font_family`. The theme font is never consulted, so
/// geometry stays theme independent.
#[derive(Debug, Clone)]
pub struct FontMetricsEstimator {
    config: FootprintConfig,
    fast_metrics: bool,
}

impl FontMetricsEstimator {
    pub fn new(config: FootprintConfig) -> Self {
        Self {
            config,
            fast_metrics: false,
        }
    }

    /// Use the built-in character width table only; never loads system fonts.
    pub fn with_fast_metrics(mut self, fast: bool) -> Self {
        self.fast_metrics = fast;
        self
    }

    fn inner_width(&self) -> f32 {
        (self.config.node_width - self.config.node_padding * 2.0).max(1.0)
    }
}

impl SizeEstimator for FontMetricsEstimator {
    fn estimate(&self, label: &str, is_root: bool) -> Size {
        if is_root {
            return root_size(&self.config);
        }
        let measure = Advance {
            font_size: self.config.font_size,
            font_family: &self.config.font_family,
            fast: self.fast_metrics,
        };
        let max_width = self.inner_width();
        let lines = strip_markup(label)
            .split('\n')
            .map(|line| measured_line_count(line.trim(), max_width, &measure))
            .sum();
        Size::new(self.config.node_width, content_height(&self.config, lines))
    }
}

/// Size for a node, honoring an explicit override when it resolves to two
/// positive numbers.
pub(super) fn resolve_size(
    estimator: &dyn SizeEstimator,
    label: &str,
    is_root: bool,
    hint: Option<&SizeHint>,
) -> Size {
    if let Some(hint) = hint {
        if let Some((width, height)) = hint.resolve() {
            return Size::new(width, height);
        }
        tracing::warn!(?hint, "ignoring unusable size override");
    }
    estimator.estimate(label, is_root)
}

pub fn strip_markup(label: &str) -> String {
    MARKUP_RE.replace_all(label, "").trim().to_string()
}

/// Number of wrapped lines for plain text; blank lines still take one line.
pub fn wrapped_line_count(text: &str, chars_per_line: usize) -> usize {
    let per_line = chars_per_line.max(1);
    text.split('\n')
        .map(|line| {
            let line = line.trim();
            if line.is_empty() {
                1
            } else {
                line.chars().count().div_ceil(per_line).max(1)
            }
        })
        .sum()
}

fn root_size(config: &FootprintConfig) -> Size {
    Size::new(config.root_node_size, config.root_node_size)
}

fn content_height(config: &FootprintConfig, lines: usize) -> f32 {
    let content = lines as f32 * config.line_height;
    (content + config.padding_vertical)
        .ceil()
        .max(config.base_node_height)
}

/// Horizontal advance of a text run at one font size.
struct Advance<'a> {
    font_size: f32,
    font_family: &'a str,
    fast: bool,
}

impl Advance<'_> {
    fn width(&self, text: &str) -> f32 {
        if !self.fast {
            if let Some(width) = text_metrics::measure_text_width(text, self.font_size, self.font_family) {
                return width;
            }
        }
        text.chars().map(em_advance).sum::<f32>() * self.font_size
    }
}

/// Lines a single paragraph needs when words are packed greedily into
/// `max_width`. A word wider than the line still takes one line on its own.
fn measured_line_count(line: &str, max_width: f32, measure: &Advance<'_>) -> usize {
    let space = measure.width(" ");
    let mut lines = 1;
    let mut used: Option<f32> = None;
    for word in line.split_whitespace() {
        let width = measure.width(word);
        used = match used {
            None => Some(width),
            Some(run) if run + space + width <= max_width => Some(run + space + width),
            Some(_) => {
                lines += 1;
                Some(width)
            }
        };
    }
    lines
}

/// Approximate advance in ems by glyph class, used when no font resolves.
fn em_advance(ch: char) -> f32 {
    match ch {
        'i' | 'j' | 'l' | 'I' | '\'' | '.' | ',' | ':' | ';' | '|' | '!' => 0.25,
        ' ' | 'f' | 'r' | 't' | '(' | ')' | '[' | ']' | '{' | '}' | '-' => 0.33,
        'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' => 0.9,
        c if c.is_ascii_uppercase() => 0.68,
        c if c.is_ascii_digit() => 0.6,
        c if c.is_ascii_lowercase() => 0.56,
        c if c as u32 >= 0x2E80 => 1.0,
        _ => 0.6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristic() -> HeuristicEstimator {
        HeuristicEstimator::new(FootprintConfig::default())
    }

    #[test]
    fn root_is_fixed_square() {
        let size = heuristic().estimate(&"very long root label ".repeat(20), true);
        assert_eq!(size, Size::new(280.0, 280.0));
    }

    #[test]
    fn short_label_clamps_to_base_height() {
        let size = heuristic().estimate("Cell", false);
        assert_eq!(size, Size::new(240.0, 60.0));
    }

    #[test]
    fn sixty_five_chars_wrap_to_three_lines() {
        let label = "a".repeat(65);
        assert_eq!(wrapped_line_count(&label, 32), 3);
        let size = heuristic().estimate(&label, false);
        assert_eq!(size.height, 3.0 * 22.0 + 24.0);
        assert_eq!(size.width, 240.0);
    }

    #[test]
    fn blank_lines_still_count() {
        assert_eq!(wrapped_line_count("one\n\n  \nfour", 32), 4);
        assert_eq!(wrapped_line_count("", 32), 1);
        assert_eq!(wrapped_line_count("a\r\nb", 32), 2);
        let size = heuristic().estimate("one\n\n\nfour", false);
        assert_eq!(size.height, 4.0 * 22.0 + 24.0);
    }

    #[test]
    fn markup_is_ignored_for_length() {
        assert_eq!(strip_markup("<p><b>Mitosis</b> phases</p>"), "Mitosis phases");
        let tagged = format!("<strong>{}</strong>", "x".repeat(32));
        assert_eq!(heuristic().estimate(&tagged, false).height, 60.0);
    }

    #[test]
    fn estimates_are_deterministic() {
        let estimator = heuristic();
        let label = "Chlorophyll absorbs light mostly in the blue and red wavelengths";
        assert_eq!(estimator.estimate(label, false), estimator.estimate(label, false));
    }

    #[test]
    fn explicit_override_wins() {
        let estimator = heuristic();
        let hint = SizeHint::numeric(310.0, 75.0);
        let size = resolve_size(&estimator, "label", false, Some(&hint));
        assert_eq!(size, Size::new(310.0, 75.0));
        let root = resolve_size(&estimator, "root", true, Some(&hint));
        assert_eq!(root, Size::new(310.0, 75.0));
    }

    #[test]
    fn broken_override_falls_back() {
        let estimator = heuristic();
        let hint = SizeHint {
            width: Some(serde_json::json!("wide")),
            height: Some(serde_json::json!(40)),
        };
        let size = resolve_size(&estimator, "label", false, Some(&hint));
        assert_eq!(size, Size::new(240.0, 60.0));
    }

    fn table_advance() -> Advance<'static> {
        Advance {
            font_size: 14.0,
            font_family: "sans-serif",
            fast: true,
        }
    }

    #[test]
    fn font_metrics_estimator_wraps_by_width() {
        let estimator = FontMetricsEstimator::new(FootprintConfig::default()).with_fast_metrics(true);
        assert_eq!(estimator.estimate("Short", false).height, 60.0);
        let long = "the quick brown fox jumps over the lazy dog ".repeat(4);
        let size = estimator.estimate(&long, false);
        assert_eq!(size.width, 240.0);
        assert!(size.height > 60.0, "expected wrapped height, got {}", size.height);
        assert_eq!(estimator.estimate("anything", true), Size::new(280.0, 280.0));
    }

    #[test]
    fn packs_words_until_the_line_is_full() {
        // "mmmm" is 4 * 0.9 * 14 = 50.4 wide, a space 0.33 * 14 = 4.62
        let measure = table_advance();
        assert_eq!(measured_line_count("mmmm mmmm", 110.0, &measure), 1);
        assert_eq!(measured_line_count("mmmm mmmm", 100.0, &measure), 2);
        assert_eq!(measured_line_count("mmmm mmmm mmmm", 110.0, &measure), 2);
    }

    #[test]
    fn blank_and_overlong_lines_take_one_line() {
        let measure = table_advance();
        assert_eq!(measured_line_count("", 100.0, &measure), 1);
        assert_eq!(measured_line_count(&"W".repeat(40), 100.0, &measure), 1);
    }
}
