//! Result writers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use grindpix_core::{AnalysisResult, AnalyzedParticle};

use crate::Result;

/// Buffered writer for analysis output.
pub struct ResultWriter<W: Write = File> {
    writer: BufWriter<W>,
}

impl ResultWriter<File> {
    /// Creates a writer for a new file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> ResultWriter<W> {
    /// Wraps any byte sink.
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
        }
    }

    /// Writes the particle table as CSV, one row per particle in discovery
    /// order.
    pub fn write_particles_csv(&mut self, particles: &[AnalyzedParticle]) -> Result<()> {
        writeln!(
            self.writer,
            "index,min_x,min_y,max_x,max_y,area_px,boundary_px,diameter_px,diameter_um,circularity,aspect_ratio,category"
        )?;

        for (i, p) in particles.iter().enumerate() {
            let bbox = p.particle.bounding_box;
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{:.4},{:.4},{:.2},{:.4},{:.4},{}",
                i,
                bbox.min_x,
                bbox.min_y,
                bbox.max_x,
                bbox.max_y,
                p.particle.area_pixels,
                p.particle.boundary_length_pixels,
                p.diameter_px,
                p.diameter_um,
                p.circularity,
                p.aspect_ratio,
                p.category.label()
            )?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes the full result as pretty-printed JSON.
    pub fn write_json(&mut self, result: &AnalysisResult) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, result)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes `result` as JSON to `path`.
pub fn write_result_json<P: AsRef<Path>>(path: P, result: &AnalysisResult) -> Result<()> {
    let path = path.as_ref();
    ResultWriter::create(path)?.write_json(result)?;
    log::debug!("wrote result to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grindpix_core::{BoundingBox, Particle, PixelCoord, SizeCategory};
    use tempfile::NamedTempFile;

    fn particle() -> AnalyzedParticle {
        let mut bounding_box = BoundingBox::from_pixel(PixelCoord::new(3, 4));
        bounding_box.include(PixelCoord::new(6, 5));
        AnalyzedParticle {
            particle: Particle {
                bounding_box,
                area_pixels: 8,
                boundary_length_pixels: 6.0,
            },
            diameter_px: 3.1915,
            diameter_um: 159.58,
            circularity: 2.7925,
            aspect_ratio: 2.0,
            category: SizeCategory::Fines,
        }
    }

    #[test]
    fn test_write_particles_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = ResultWriter::create(file.path()).unwrap();
        writer.write_particles_csv(&[particle()]).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("index,min_x,min_y"));
        assert_eq!(
            lines.next().unwrap(),
            "0,3,4,6,5,8,6.0000,3.1915,159.58,2.7925,2.0000,Fines"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_to_memory() {
        let mut buffer = Vec::new();
        ResultWriter::new(&mut buffer)
            .write_particles_csv(&[])
            .unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap().lines().count(), 1);
    }
}
