// Chart series for the productivity trend plots.
//
// The renderer is external; this module only decides what gets drawn: one
// panel per phase present in the data, one line per Plan/Target/Actual.
use crate::phase::PhaseGroup;
use crate::types::{Column, DailyKey, ProductivityTable};
use chrono::NaiveDate;
use serde::Serialize;

pub const Y_AXIS_TITLE: &str = "Productivity (seconds per unit)";

pub fn series_color(column: Column) -> &'static str {
    match column {
        Column::Plan => "lightgreen",
        Column::Target => "green",
        Column::Actual => "darkgreen",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub name: String,
    pub column: Column,
    pub color: &'static str,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhasePanel {
    pub phase: PhaseGroup,
    pub title: String,
    pub series: Vec<TrendSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub title: String,
    pub material: String,
    pub x_axis_title: &'static str,
    pub y_axis_title: &'static str,
    pub panels: Vec<PhasePanel>,
}

/// Phases in the order they first appear in the table.
pub fn phases_present(table: &ProductivityTable<DailyKey>) -> Vec<PhaseGroup> {
    let mut phases = Vec::new();
    for key in table.keys() {
        if !phases.contains(&key.phase) {
            phases.push(key.phase);
        }
    }
    phases
}

fn series_for(table: &ProductivityTable<DailyKey>, phase: PhaseGroup) -> Vec<TrendSeries> {
    Column::ALL
        .iter()
        .map(|&column| TrendSeries {
            name: format!("{} {}", phase, column.name()),
            column,
            color: series_color(column),
            points: table
                .iter()
                .filter(|(key, _)| key.phase == phase)
                .map(|(key, row)| TrendPoint {
                    date: key.date,
                    value: row.get(column),
                })
                .collect(),
        })
        .collect()
}

/// One stacked panel per phase; lines named after the phase, e.g. `Cutting Plan`.
pub fn all_phase_trends(table: &ProductivityTable<DailyKey>, material: &str) -> TrendChart {
    let panels = phases_present(table)
        .into_iter()
        .map(|phase| PhasePanel {
            phase,
            title: format!("{} ({})", phase, material),
            series: series_for(table, phase),
        })
        .collect();
    TrendChart {
        title: format!("{} Productivity per Phase", material),
        material: material.to_string(),
        x_axis_title: "Date",
        y_axis_title: Y_AXIS_TITLE,
        panels,
    }
}
