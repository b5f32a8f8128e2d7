//! SVG bar chart of per-category accuracy.
//!
//! Produces a self-contained SVG: one bar per category on a fixed 0–100 y-axis,
//! each bar annotated with its percentage to two decimals.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use faroetest_core::statistics::AccuracySummary;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 500.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const BAR_FILL: f64 = 0.8;

pub const TITLE: &str = "Model Accuracy by Test Category";

/// Viridis stops, dark to light.
const PALETTE: [&str; 5] = ["#440154", "#3b528b", "#21918c", "#5ec962", "#fde725"];

/// Escape a string for safe XML insertion.
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn bar_color(index: usize, count: usize) -> &'static str {
    if count <= 1 {
        return PALETTE[PALETTE.len() / 2];
    }
    PALETTE[index * (PALETTE.len() - 1) / (count - 1)]
}

/// Render the chart as an SVG document.
pub fn render_svg(summary: &AccuracySummary) -> String {
    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + plot_height;

    let mut svg = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        svg,
        "<svg width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" xmlns=\"http://www.w3.org/2000/svg\" font-family=\"sans-serif\">"
    );
    let _ = writeln!(
        svg,
        "  <rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"#ffffff\"/>"
    );
    let _ = writeln!(
        svg,
        "  <text x=\"{}\" y=\"28\" font-size=\"18\" text-anchor=\"middle\">{TITLE}</text>",
        WIDTH / 2.0
    );

    // Grid and y-axis ticks, whitegrid style.
    for tick in (0..=100).step_by(20) {
        let y = baseline - plot_height * f64::from(tick) / 100.0;
        let _ = writeln!(
            svg,
            "  <line x1=\"{MARGIN_LEFT}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#e5e7eb\"/>",
            MARGIN_LEFT + plot_width
        );
        let _ = writeln!(
            svg,
            "  <text x=\"{:.1}\" y=\"{y:.1}\" font-size=\"12\" text-anchor=\"end\" dominant-baseline=\"middle\">{tick}</text>",
            MARGIN_LEFT - 8.0
        );
    }

    let count = summary.len();
    let slot = if count == 0 {
        plot_width
    } else {
        plot_width / count as f64
    };
    let bar_width = slot * BAR_FILL;

    for (i, entry) in summary.categories.iter().enumerate() {
        let percentage = entry.percentage.clamp(0.0, 100.0);
        let height = plot_height * percentage / 100.0;
        let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_width) / 2.0;
        let y = baseline - height;
        let center = x + bar_width / 2.0;

        let _ = writeln!(
            svg,
            "  <rect class=\"bar\" x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_width:.1}\" height=\"{height:.1}\" fill=\"{}\"/>",
            bar_color(i, count)
        );
        let _ = writeln!(
            svg,
            "  <text class=\"value\" x=\"{center:.1}\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\">{}</text>",
            y - 6.0,
            entry.display_percentage()
        );
        let _ = writeln!(
            svg,
            "  <text x=\"{center:.1}\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\">{}</text>",
            baseline + 20.0,
            xml_escape(entry.category.label())
        );
    }

    // Axes and labels.
    let _ = writeln!(
        svg,
        "  <line x1=\"{MARGIN_LEFT}\" y1=\"{MARGIN_TOP}\" x2=\"{MARGIN_LEFT}\" y2=\"{baseline}\" stroke=\"#374151\"/>"
    );
    let _ = writeln!(
        svg,
        "  <line x1=\"{MARGIN_LEFT}\" y1=\"{baseline}\" x2=\"{:.1}\" y2=\"{baseline}\" stroke=\"#374151\"/>",
        MARGIN_LEFT + plot_width
    );
    let _ = writeln!(
        svg,
        "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"14\" text-anchor=\"middle\">Category</text>",
        MARGIN_LEFT + plot_width / 2.0,
        HEIGHT - 12.0
    );
    let _ = writeln!(
        svg,
        "  <text x=\"20\" y=\"{:.1}\" font-size=\"14\" text-anchor=\"middle\" transform=\"rotate(-90 20 {:.1})\">Accuracy (%)</text>",
        MARGIN_TOP + plot_height / 2.0,
        MARGIN_TOP + plot_height / 2.0
    );

    svg.push_str("</svg>\n");
    svg
}

/// Write the chart to `path`, creating parent directories.
pub fn write_chart(summary: &AccuracySummary, path: &Path) -> Result<()> {
    let svg = render_svg(summary);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, svg)
        .with_context(|| format!("failed to write chart to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use faroetest_core::model::Category;
    use faroetest_core::statistics::CategoryAccuracy;

    fn entry(category: Category, correct: usize, total: usize) -> CategoryAccuracy {
        CategoryAccuracy {
            category,
            correct,
            total,
            percentage: 100.0 * correct as f64 / total as f64,
        }
    }

    fn summary() -> AccuracySummary {
        AccuracySummary {
            categories: vec![
                entry(Category::GrammarRuleApplication, 3, 7),
                entry(Category::MorphologicalUnderstanding, 0, 4),
                entry(Category::TranslationAccuracy, 5, 5),
            ],
        }
    }

    #[test]
    fn one_bar_per_category_with_labels() {
        let svg = render_svg(&summary());
        assert_eq!(svg.matches("class=\"bar\"").count(), 3);
        assert!(svg.contains("42.86%"));
        assert!(svg.contains("0.00%"));
        assert!(svg.contains("100.00%"));
        assert!(svg.contains(">grammar<"));
        assert!(svg.contains(">morphological<"));
        assert!(svg.contains(">translation<"));
        assert!(svg.contains(TITLE));
        assert!(svg.contains("Accuracy (%)"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn bar_height_tracks_fixed_axis() {
        let svg = render_svg(&summary());
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        // 100% spans the whole plot; 0% is flat.
        assert!(svg.contains(&format!("height=\"{plot_height:.1}\" fill")));
        assert!(svg.contains("height=\"0.0\" fill"));
    }

    #[test]
    fn bars_use_distinct_colors() {
        assert_eq!(bar_color(0, 3), "#440154");
        assert_eq!(bar_color(1, 3), "#21918c");
        assert_eq!(bar_color(2, 3), "#fde725");
        assert_eq!(bar_color(0, 1), "#21918c");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(xml_escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("accuracy_plot.svg");
        write_chart(&summary(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<svg"));
    }
}
