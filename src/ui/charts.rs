use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

use crate::color::generate_palette;
use crate::data::aggregate::{AggregateResult, RankedEntry};
use crate::data::model::HistoryDataset;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the central dashboard: metric, ranked tables, charts, raw data.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a listening history to get started  (File → Open…)");
            });
            return;
        }
    };

    if state.visible.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(
                RichText::new("No plays match the current filters.").color(Color32::YELLOW),
            );
        });
        return;
    }

    let agg = &state.aggregates;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label(
                RichText::new(format!("Total listening time: {:.1} h", agg.total_hours()))
                    .size(22.0)
                    .strong(),
            );
            ui.separator();

            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].strong("Top 10 Artists");
                ranked_table(&mut cols[0], "top_artists", "Artist", &agg.top_artists);
                cols[1].strong("Top 10 Tracks");
                ranked_table(&mut cols[1], "top_tracks", "Track", &agg.top_tracks);
            });

            ui.separator();
            ui.strong("Plays by hour of day");
            hourly_chart(ui, agg);

            ui.separator();
            ui.strong("Playtime distribution (5 s and longer)");
            duration_chart(ui, agg);

            ui.separator();
            ui.strong("Platforms");
            platform_chart(ui, state, agg);

            ui.separator();
            egui::CollapsingHeader::new("Filtered raw data")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    raw_table(ui, state, dataset);
                });
        });
}

// ---------------------------------------------------------------------------
// Ranked tables
// ---------------------------------------------------------------------------

fn ranked_table(ui: &mut Ui, id: &str, label: &str, entries: &[RankedEntry]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            // The dashboard already scrolls; the table must not.
            .vscroll(false)
            .column(Column::remainder())
            .column(Column::auto())
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong(label);
                });
                header.col(|ui| {
                    ui.strong("Hours");
                });
            })
            .body(|mut body| {
                for entry in entries {
                    body.row(16.0, |mut row| {
                        row.col(|ui| {
                            ui.label(&entry.name);
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.1}", entry.hours));
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Plays per hour of day as a line with point markers.
fn hourly_chart(ui: &mut Ui, agg: &AggregateResult) {
    let line_points: PlotPoints = agg
        .hourly
        .iter()
        .enumerate()
        .map(|(hour, &plays)| [hour as f64, plays as f64])
        .collect();
    let markers: PlotPoints = agg
        .hourly
        .iter()
        .enumerate()
        .map(|(hour, &plays)| [hour as f64, plays as f64])
        .collect();

    Plot::new("hourly_plot")
        .height(240.0)
        .x_axis_label("Hour of day")
        .y_axis_label("Plays")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(line_points).color(Color32::RED).width(1.5));
            plot_ui.points(Points::new(markers).color(Color32::RED).radius(3.0));
        });
}

/// Histogram of play durations, one bar per bin.
fn duration_chart(ui: &mut Ui, agg: &AggregateResult) {
    if agg.duration_bins.is_empty() {
        ui.label("No plays of 5 seconds or longer.");
        return;
    }

    let palette = generate_palette(agg.duration_bins.len());
    let bars: Vec<Bar> = agg
        .duration_bins
        .iter()
        .zip(palette)
        .map(|(bin, color)| {
            let center = (bin.lo_s + bin.hi_s) / 2.0;
            // A collapsed single-bin histogram still needs a visible bar.
            let width = if bin.hi_s > bin.lo_s {
                bin.hi_s - bin.lo_s
            } else {
                1.0
            };
            Bar::new(center, bin.count as f64).width(width).fill(color)
        })
        .collect();

    Plot::new("duration_plot")
        .height(240.0)
        .x_axis_label("Playtime (s)")
        .y_axis_label("Plays")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// One horizontal bar per platform, ranked by play count, coloured per
/// platform.
fn platform_chart(ui: &mut Ui, state: &AppState, agg: &AggregateResult) {
    let bars: Vec<Bar> = agg
        .platform_counts
        .iter()
        .enumerate()
        .map(|(i, (platform, count))| {
            Bar::new(i as f64, *count as f64)
                .name(platform)
                .fill(state.color_map.color_for(platform))
        })
        .collect();

    let names: Vec<String> = agg
        .platform_counts
        .iter()
        .map(|(platform, _)| platform.clone())
        .collect();

    Plot::new("platform_plot")
        .height(40.0 + 24.0 * names.len() as f32)
        .x_axis_label("Plays")
        .y_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() < 1e-3 && i >= 0.0 && (i as usize) < names.len() {
                names[i as usize].clone()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Raw data table
// ---------------------------------------------------------------------------

/// The filtered rows, in source order, virtualised for large histories.
fn raw_table(ui: &mut Ui, state: &AppState, dataset: &HistoryDataset) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto())
        .column(Column::remainder())
        .column(Column::remainder())
        .column(Column::remainder())
        .column(Column::auto())
        .column(Column::auto())
        .header(18.0, |mut header| {
            for title in ["Timestamp", "Artist", "Album", "Track", "Platform", "Playtime (s)"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(16.0, state.visible.len(), |mut row| {
                let play = &dataset.plays[state.visible[row.index()]];
                row.col(|ui| {
                    ui.label(play.ts.format("%Y-%m-%d %H:%M:%S").to_string());
                });
                row.col(|ui| {
                    ui.label(&play.artist_name);
                });
                row.col(|ui| {
                    ui.label(&play.album_name);
                });
                row.col(|ui| {
                    ui.label(&play.track_name);
                });
                row.col(|ui| {
                    ui.label(&play.platform);
                });
                row.col(|ui| {
                    ui.label(format!("{:.1}", play.playtime_s));
                });
            });
        });
}
