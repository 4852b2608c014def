//! Export helpers for CSV and JSON artifacts.

pub mod ledger {
    use std::fs::{self, File};
    use std::io::{self, BufWriter, Write};
    use std::path::Path;

    const HEADER: &str = "ut,elapsed_s,vessel_id,persistent_part_id,title,status,reason,fuel_requirement_met,thrust_kn,delta_v_m_s,propellant_demand";

    /// Create a writer for the target path, handling stdout (`-`) by convention.
    pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
        if path == Path::new("-") {
            return Ok(Box::new(BufWriter::new(io::stdout())));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    /// Write the tick ledger CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// One engine's outcome for one tick.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub ut: f64,
        pub elapsed_s: f64,
        pub vessel_id: &'a str,
        pub persistent_part_id: u32,
        pub title: &'a str,
        pub applied: bool,
        /// Idle reason label; empty when applied.
        pub reason: &'a str,
        pub fuel_requirement_met: f64,
        pub thrust_kn: f64,
        pub delta_v_m_s: f64,
        pub propellant_demand: f64,
    }

    impl<'a> Record<'a> {
        /// Serialize the record to CSV, matching the header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(
                writer,
                "{:.3},{:.3},{},{},{},{},{},{:.6},{:.6},{:.6},{:.6}",
                self.ut,
                self.elapsed_s,
                self.vessel_id,
                self.persistent_part_id,
                self.title,
                if self.applied { "applied" } else { "idle" },
                self.reason,
                self.fuel_requirement_met,
                self.thrust_kn,
                self.delta_v_m_s,
                self.propellant_demand,
            )
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn record_matches_header_columns() {
            let record = Record {
                ut: 10.0,
                elapsed_s: 5.0,
                vessel_id: "relay",
                persistent_part_id: 7,
                title: "IX-6315 Dawn",
                applied: false,
                reason: "misaligned",
                fuel_requirement_met: 0.0,
                thrust_kn: 0.0,
                delta_v_m_s: 0.0,
                propellant_demand: 0.0,
            };
            let mut buffer = Vec::new();
            record.write_to(&mut buffer).unwrap();
            let line = String::from_utf8(buffer).unwrap();
            assert!(line.starts_with("10.000,5.000,relay,7,IX-6315 Dawn,idle,misaligned,"));
            assert_eq!(
                line.trim_end().split(',').count(),
                HEADER.split(',').count()
            );
        }
    }
}

pub mod report {
    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use std::collections::BTreeMap;
    use std::io::{self, Write};
    use std::path::Path;

    use crate::ledger::writer_for_path;

    /// Per-tick aggregate included in the run report.
    #[derive(Debug, Clone, Serialize)]
    pub struct TickSample {
        pub ut: f64,
        pub landed: bool,
        pub total_persistent_thrust_kn: f64,
        pub applied_engines: usize,
        pub delta_v_m_s: f64,
        pub vessel_mass_t: f64,
    }

    /// Whole-run summary written as a JSON sidecar.
    #[derive(Debug, Clone, Serialize)]
    pub struct RunReport<'a> {
        pub vessel_id: &'a str,
        pub vessel_name: &'a str,
        pub start_ut: f64,
        pub end_ut: f64,
        pub ticks: usize,
        /// Magnitude of the summed delta-v vectors over the run.
        pub total_delta_v_m_s: f64,
        pub initial_resources: &'a BTreeMap<String, f64>,
        pub final_resources: &'a BTreeMap<String, f64>,
        pub resource_changes: BTreeMap<String, f64>,
        pub samples: &'a [TickSample],
    }

    /// Write `report` as pretty JSON to `path` (`-` for stdout).
    pub fn write_report(path: &Path, report: &RunReport<'_>) -> io::Result<()> {
        let mut writer = writer_for_path(path)?;
        to_writer_pretty(&mut writer, report)?;
        writeln!(writer)?;
        writer.flush()
    }

}
