//! Visualization utilities for TSP solutions.
//!
//! Generates SVG plots of tours and exports data for external plotting.

use crate::error::{Result, TspError};
use crate::instance::{Instance, Point};
use crate::solution::Solution;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Node radius
    pub node_radius: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 6.0,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate SVG visualization of a solution.
    ///
    /// Only instances with coordinates can be drawn.
    pub fn generate_svg(&self, instance: &Instance, solution: &Solution) -> Result<String> {
        let points = instance.coordinates().ok_or(TspError::NoCoordinates)?;
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = bounds(points);

        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1e-9);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1e-9);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .node {{ fill: #3498db; stroke: #2c3e50; stroke-width: 1.5; }}
    .start {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 1.5; }}
    .edge {{ stroke: #34495e; stroke-width: 1.5; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Instance: {} | {} | Cost: {:.2}</text>
"##,
            self.margin,
            escape_xml(&instance.name),
            escape_xml(&solution.algorithm),
            solution.cost
        ));

        let transform = |p: &Point| -> (f64, f64) {
            let tx = self.margin + (p.x - min_x) * scale;
            let ty = self.height - self.margin - (p.y - min_y) * scale;
            (tx, ty)
        };

        let m = solution.tour.len();
        if m > 1 {
            for i in 0..m {
                let (x1, y1) = transform(&points[solution.tour[i]]);
                let (x2, y2) = transform(&points[solution.tour[(i + 1) % m]]);

                svg.push_str(&format!(
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge"/>
"#,
                    x1, y1, x2, y2
                ));
            }
        }

        let start = solution.tour.first().copied();
        for (i, point) in points.iter().enumerate() {
            let (x, y) = transform(point);
            let class = if Some(i) == start { "start" } else { "node" };

            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                x, y, self.node_radius, class
            ));

            svg.push_str(&format!(
                r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                x,
                y - self.node_radius - 3.0,
                escape_xml(instance.node_id(i))
            ));
        }

        svg.push_str("</svg>");

        Ok(svg)
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    /// Export data for external plotting (e.g., matplotlib)
    pub fn export_plot_data(&self, instance: &Instance, solution: &Solution) -> String {
        let mut data = String::new();

        data.push_str("# TSP Solution Data\n");
        data.push_str(&format!("# Instance: {}\n", instance.name));
        data.push_str(&format!("# Algorithm: {}\n", solution.algorithm));
        data.push_str(&format!("# Cost: {:.2}\n\n", solution.cost));

        if let Some(points) = instance.coordinates() {
            data.push_str("# Nodes: id, x, y\n");
            for (id, p) in instance.node_ids().iter().zip(points) {
                data.push_str(&format!("{},{},{}\n", id, p.x, p.y));
            }
            data.push('\n');
        }

        data.push_str("# Route: node ids, start repeated at the end\n");
        data.push_str(&solution.route_ids(instance).join(","));
        data.push('\n');

        data
    }
}

/// Get coordinate bounds
fn bounds(points: &[Point]) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    (min_x, max_x, min_y, max_y)
}

/// Escape text placed inside an SVG element
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
