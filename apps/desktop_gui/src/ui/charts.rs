//! Painter-drawn bar charts for the analytics panel.

use client_core::analytics::{ChartPoint, ChartSeries};
use eframe::egui;

const CHART_HEIGHT: f32 = 150.0;
const LABEL_BAND: f32 = 16.0;
const LABEL_CHARS: usize = 10;

/// Bar rectangles inside `area`, scaled to the series maximum and leaving a
/// band at the bottom for labels.
pub fn bar_rects(series: &ChartSeries, area: egui::Rect) -> Vec<egui::Rect> {
    if series.is_empty() {
        return Vec::new();
    }
    let max = series.max_value();
    let slot = area.width() / series.points.len() as f32;
    let bar_width = (slot * 0.7).max(1.0);
    let baseline = area.bottom() - LABEL_BAND;
    let usable = (baseline - area.top() - 4.0).max(0.0);

    series
        .points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let fraction = if max > 0.0 {
                (point.value / max).clamp(0.0, 1.0) as f32
            } else {
                0.0
            };
            let left = area.left() + slot * index as f32 + (slot - bar_width) / 2.0;
            egui::Rect::from_min_max(
                egui::pos2(left, baseline - usable * fraction),
                egui::pos2(left + bar_width, baseline),
            )
        })
        .collect()
}

fn short_label(label: &str) -> String {
    if label.chars().count() <= LABEL_CHARS {
        label.to_string()
    } else {
        let head: String = label.chars().take(LABEL_CHARS - 1).collect();
        format!("{head}…")
    }
}

fn tooltip(series: &ChartSeries, point: &ChartPoint) -> String {
    if series.title.starts_with("Price") {
        format!("{}: {}", point.label, client_core::display::format_inr(point.value))
    } else {
        format!("{}: {}", point.label, point.value)
    }
}

pub fn bar_chart(ui: &mut egui::Ui, series: &ChartSeries, color: egui::Color32) {
    ui.label(egui::RichText::new(series.title).strong());
    if series.is_empty() {
        ui.weak("No data yet");
        return;
    }

    let size = egui::vec2(ui.available_width(), CHART_HEIGHT);
    let (area, response) = ui.allocate_exact_size(size, egui::Sense::hover());
    let painter = ui.painter_at(area);
    painter.rect_filled(area, egui::CornerRadius::same(4), ui.visuals().extreme_bg_color);

    let text_color = ui.visuals().text_color();
    let hover_color = ui.visuals().selection.bg_fill;
    let bars = bar_rects(series, area);
    let mut hovered = None;
    for (bar, point) in bars.iter().zip(&series.points) {
        let hot = response
            .hover_pos()
            .is_some_and(|pos| pos.x >= bar.left() && pos.x <= bar.right());
        let fill = if hot {
            hovered = Some(point);
            hover_color
        } else {
            color
        };
        painter.rect_filled(*bar, egui::CornerRadius::same(3), fill);
        painter.text(
            egui::pos2(bar.center().x, bar.bottom() + 2.0),
            egui::Align2::CENTER_TOP,
            short_label(&point.label),
            egui::FontId::proportional(10.0),
            text_color,
        );
    }

    if let Some(point) = hovered {
        response.on_hover_text_at_pointer(tooltip(series, point));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> ChartSeries {
        ChartSeries {
            title: "Quantity Distribution",
            points: values
                .iter()
                .enumerate()
                .map(|(i, value)| ChartPoint {
                    label: format!("Phone {i}"),
                    value: *value,
                })
                .collect(),
        }
    }

    #[test]
    fn tallest_bar_spans_the_usable_height() {
        let area = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(300.0, 120.0));
        let bars = bar_rects(&series(&[10.0, 20.0, 5.0]), area);

        assert_eq!(bars.len(), 3);
        let baseline = 120.0 - LABEL_BAND;
        assert!(bars.iter().all(|bar| bar.bottom() == baseline));
        assert_eq!(bars[1].top(), 4.0);
        assert!((bars[0].height() - bars[1].height() / 2.0).abs() < 0.01);
        assert!(bars[0].right() <= bars[1].left());
    }

    #[test]
    fn all_zero_values_draw_flat_bars() {
        let area = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 80.0));
        let bars = bar_rects(&series(&[0.0, 0.0]), area);
        assert!(bars.iter().all(|bar| bar.height() == 0.0));
        assert!(bar_rects(&series(&[]), area).is_empty());
    }

    #[test]
    fn long_labels_are_shortened() {
        assert_eq!(short_label("Pixel 8"), "Pixel 8");
        assert_eq!(short_label("Samsung Galaxy S24 Ultra"), "Samsung G…");
    }
}
