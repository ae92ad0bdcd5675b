use std::io::{self, Write};

use lpp3d_solver::{Renderer, Surface, VisualizationData};

/// Writes each constraint plane as a table of z heights, `-` for cells below
/// the ground plane.
pub struct TextRenderer<W> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    type Error = io::Error;

    fn render(&mut self, data: &VisualizationData) -> Result<(), Self::Error> {
        let out = &mut self.out;
        let p = data.optimum;

        writeln!(out, "{}", data.title())?;
        writeln!(out, "Optimal point: x={:.2}, y={:.2}, z={:.2}", p.x, p.y, p.z)?;
        writeln!(out, "Grid: [0, {:.2}] x [0, {:.2}], {} samples per axis", data.extent, data.extent, data.xs.len())?;

        for s in &data.surfaces {
            writeln!(out)?;
            match &s.surface {
                Surface::Vertical => {
                    writeln!(out, "{} ({}): vertical plane, not drawn", s.name, s.color.name())?;
                }
                Surface::Plane(rows) => {
                    writeln!(out, "{} ({}):", s.name, s.color.name())?;
                    write!(out, "{:>10} |", "y \\ x")?;
                    for x in &data.xs {
                        write!(out, " {:>8.2}", x)?;
                    }
                    writeln!(out)?;
                    for (y, row) in data.ys.iter().zip(rows) {
                        write!(out, "{:>10.2} |", y)?;
                        for z in row {
                            match z {
                                Some(z) => write!(out, " {:>8.2}", z)?,
                                None => write!(out, " {:>8}", "-")?,
                            }
                        }
                        writeln!(out)?;
                    }
                }
            }
        }

        Ok(())
    }
}

/// Writes the projection as pretty-printed JSON for an external plotter
pub struct JsonRenderer<W> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    type Error = serde_json::Error;

    fn render(&mut self, data: &VisualizationData) -> Result<(), Self::Error> {
        serde_json::to_writer_pretty(&mut self.out, data)?;
        writeln!(self.out).map_err(serde_json::Error::io)
    }
}
