use eframe::egui::Ui;
use egui_plot::{Corner, Legend, Line, MarkerShape, Plot, PlotBounds, PlotPoints, Points};

use crate::cmd::{AxisLimits, CmdFrame};
use crate::color::{isochrone_color, star_color};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Two-panel CMD (central panel)
// ---------------------------------------------------------------------------
//
// egui_plot has no inverted axes, so magnitudes are plotted negated and the
// axis labels / hover text negate them back.

#[derive(Clone, Copy, PartialEq)]
enum Side {
    Kept,
    Removed,
}

impl Side {
    fn title(self) -> &'static str {
        match self {
            Side::Kept => "Kept",
            Side::Removed => "Removed",
        }
    }

    fn series_name(self) -> &'static str {
        match self {
            Side::Kept => "Stars",
            Side::Removed => "Not Stars",
        }
    }
}

/// Render both CMD panels in the central panel.
pub fn cmd_plot(ui: &mut Ui, state: &mut AppState) {
    let reset = state.take_bounds_reset();

    let Some(frame) = &state.frame else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a photometry catalog to start  (File → Open catalog…)");
        });
        return;
    };

    ui.columns(2, |cols: &mut [Ui]| {
        cmd_panel(&mut cols[0], frame, Side::Kept, reset);
        cmd_panel(&mut cols[1], frame, Side::Removed, reset);
    });
}

fn to_plot_bounds(limits: &AxisLimits) -> PlotBounds {
    PlotBounds::from_min_max(
        [limits.color_min, -limits.mag_faint],
        [limits.color_max, -limits.mag_bright],
    )
}

fn cmd_panel(ui: &mut Ui, frame: &CmdFrame, side: Side, reset: bool) {
    let (stars, limits) = match side {
        Side::Kept => (&frame.kept, &frame.left),
        Side::Removed => (&frame.removed, &frame.right),
    };
    // Only the right panel carries a legend.
    let legend = side == Side::Removed;

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(side.title());
    });

    let color_label = frame.color_label();
    let mag_label = frame.magnitude_label();
    let hover_color = color_label.clone();

    let mut plot = Plot::new(("cmd_panel", side.title()))
        .x_axis_label(color_label)
        .y_axis_label(mag_label)
        .y_axis_formatter(|mark, _range| format!("{:.1}", -mark.value))
        .label_formatter(move |name, value| {
            let head = if name.is_empty() {
                String::new()
            } else {
                format!("{name}\n")
            };
            format!(
                "{head}{hover_color} = {:.3}\n{mag_label} = {:.3}",
                value.x, -value.y
            )
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if legend {
        plot = plot.legend(Legend::default().position(Corner::RightTop));
    }

    plot.show(ui, |plot_ui| {
        let points: PlotPoints = stars.iter().map(|p| [p[0], -p[1]]).collect();
        let mut markers = Points::new(points)
            .shape(MarkerShape::Circle)
            .filled(true)
            .radius(2.0)
            .color(star_color());
        if legend {
            markers = markers.name(side.series_name());
        }
        plot_ui.points(markers);

        for curve in &frame.isochrones {
            let points: PlotPoints = curve.points.iter().map(|p| [p[0], -p[1]]).collect();
            let mut line = Line::new(points)
                .color(isochrone_color(curve.slot))
                .width(2.0);
            if legend {
                line = line.name(curve.label());
            }
            plot_ui.line(line);
        }

        if reset {
            plot_ui.set_plot_bounds(to_plot_bounds(limits));
        }
    });
}
