// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV serialization and legacy-encoding output for exports

mod csv_writer;

pub use csv_writer::{CsvExport, CsvExporter};
