//! Visualization utilities for TSP solutions.
//!
//! Generates SVG drawings of tours and of the best-distance convergence curve.

use crate::instance::TspInstance;
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
    /// City radius
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

    /// Generate SVG visualization of a solution
    pub fn generate_svg(&self, instance: &TspInstance, solution: &Solution) -> String {
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = self.get_bounds(instance);

        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1.0);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1.0);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .city {{ fill: #3498db; stroke: #2c3e50; stroke-width: 2; }}
    .start {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 2; }}
    .edge {{ stroke: #34495e; stroke-width: 2; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Instance: {} | Distance: {:.2} | Generations: {}</text>
"##,
            self.margin,
            escape_xml(&instance.name),
            solution.distance,
            solution.generations
        ));

        let transform = |x: f64, y: f64| -> (f64, f64) {
            let tx = self.margin + (x - min_x) * scale;
            let ty = self.height - self.margin - (y - min_y) * scale;
            (tx, ty)
        };

        if solution.tour.len() > 1 {
            for i in 0..solution.tour.len() {
                let from = &instance.cities[solution.tour[i]];
                let to = &instance.cities[solution.tour[(i + 1) % solution.tour.len()]];

                let (x1, y1) = transform(from.x, from.y);
                let (x2, y2) = transform(to.x, to.y);

                svg.push_str(&format!(
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge"/>
"#,
                    x1, y1, x2, y2
                ));
            }
        }

        let start = solution.tour.first().copied();
        for (id, city) in instance.cities.iter().enumerate() {
            let (x, y) = transform(city.x, city.y);
            let class = if Some(id) == start { "start" } else { "city" };

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
                id
            ));
        }

        svg.push_str("</svg>");

        svg
    }

    /// Generate SVG of the best-so-far distance per generation
    pub fn generate_convergence_svg(&self, solution: &Solution) -> String {
        let curve = &solution.convergence;
        let mut svg = String::new();

        let width = self.width;
        let height = 300.0;
        let margin = 50.0;

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .line {{ stroke: #3498db; stroke-width: 2; fill: none; }}
    .axis {{ stroke: #2c3e50; stroke-width: 1; }}
    .label {{ font-family: Arial; font-size: 12px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            width, height, width, height
        ));

        svg.push_str(&format!(
            r#"<text x="{}" y="25" class="title">Best distance per generation</text>
"#,
            margin
        ));

        let plot_width = width - 2.0 * margin;
        let plot_height = height - 2.0 * margin;

        svg.push_str(&format!(
            r##"<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>
<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>
"##,
            margin,
            height - margin,
            width - margin,
            height - margin,
            margin,
            margin,
            margin,
            height - margin
        ));

        if !curve.is_empty() {
            let y_max = curve.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let y_min = curve.iter().cloned().fold(f64::INFINITY, f64::min);
            let span = (y_max - y_min).max(1e-9);
            let x_scale = plot_width / (curve.len().max(2) - 1) as f64;

            let mut path = String::new();
            for (i, &value) in curve.iter().enumerate() {
                let x = margin + i as f64 * x_scale;
                let y = margin + (y_max - value) / span * plot_height;

                if i == 0 {
                    path.push_str(&format!("M {:.2} {:.2}", x, y));
                } else {
                    path.push_str(&format!(" L {:.2} {:.2}", x, y));
                }
            }

            svg.push_str(&format!(
                r##"<path d="{}" class="line"/>
<text x="{}" y="{}" class="label">{:.2}</text>
<text x="{}" y="{}" class="label">{:.2}</text>
"##,
                path,
                5.0,
                margin + 4.0,
                y_max,
                5.0,
                height - margin,
                y_min
            ));
        }

        svg.push_str("</svg>");

        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    fn get_bounds(&self, instance: &TspInstance) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for city in &instance.cities {
            min_x = min_x.min(city.x);
            max_x = max_x.max(city.x);
            min_y = min_y.min(city.y);
            max_y = max_y.max(city.y);
        }

        (min_x, max_x, min_y, max_y)
    }
}

/// Escape text for use inside SVG elements
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::City;

    fn create_test_instance() -> TspInstance {
        TspInstance::new(
            "test",
            vec![
                City::new(0.0, 0.0),
                City::new(1.0, 0.0),
                City::new(2.0, 0.0),
                City::new(1.0, 1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_visualizer() {
        let instance = create_test_instance();
        let solution = Solution::from_tour(&instance, vec![0, 1, 2, 3], "test");

        let viz = Visualizer::new();
        let svg = viz.generate_svg(&instance, &solution);

        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert_eq!(svg.matches("class=\"edge\"").count(), 4);
        assert_eq!(svg.matches("<circle").count(), 4);
    }

    #[test]
    fn test_instance_name_is_escaped() {
        let mut instance = create_test_instance();
        instance.name = "a<b & c>d".to_string();
        let solution = Solution::from_tour(&instance, vec![0, 1, 2, 3], "test");

        let svg = Visualizer::new().generate_svg(&instance, &solution);

        assert!(svg.contains("Instance: a&lt;b &amp; c&gt;d |"));
        assert!(!svg.contains("a<b"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("plain"), "plain");
        assert_eq!(escape_xml("<&>"), "&lt;&amp;&gt;");
    }

    #[test]
    fn test_convergence_svg() {
        let instance = create_test_instance();
        let mut solution = Solution::from_tour(&instance, vec![0, 1, 2, 3], "test");
        solution.convergence = vec![6.0, 5.5, 5.5, 4.8];

        let svg = Visualizer::new().generate_convergence_svg(&solution);
        assert!(svg.contains("<path d=\"M "));
        assert_eq!(svg.matches(" L ").count(), 3);
    }
}
