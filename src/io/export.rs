//! CSV export of the dashboard history.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::ExportError;
use crate::monitor::history::HistoryStore;
use crate::monitor::types::Status;

/// Column header for the history CSV.
const HEADER: [&str; 7] = [
    "#",
    "Hour",
    "Weather",
    "Homes",
    "Demand(kW)",
    "Supply(kW)",
    "Status",
];

/// Default file name for history exports.
pub const DEFAULT_CSV_NAME: &str = "microgrid_history.csv";

/// Exports the history to a CSV file at the given path.
///
/// The file is only created once the empty-history check has passed, so a
/// rejected export leaves nothing behind.
///
/// # Errors
///
/// Returns [`ExportError::EmptyHistory`] if there is nothing to export, or
/// an I/O / CSV error if writing fails.
pub fn export_csv(history: &HistoryStore, path: &Path) -> Result<(), ExportError> {
    if history.is_empty() {
        return Err(ExportError::EmptyHistory);
    }
    let file = File::create(path)?;
    write_csv(history, io::BufWriter::new(file))
}

/// Writes the history as CSV to any writer.
///
/// One row per entry in display order (row 1 = most recent). The status
/// column is recomputed from supply and demand rather than read from the
/// stored classification.
///
/// # Errors
///
/// Returns [`ExportError::EmptyHistory`] if the history is empty; nothing
/// is written in that case.
pub fn write_csv(history: &HistoryStore, writer: impl Write) -> Result<(), ExportError> {
    if history.is_empty() {
        return Err(ExportError::EmptyHistory);
    }

    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(HEADER)?;

    for (idx, entry) in history.iter().enumerate() {
        let s = &entry.snapshot;
        let status = Status::classify(s.total_demand_kw, s.total_supply_kw);
        wtr.write_record(&[
            (idx + 1).to_string(),
            s.hour.to_string(),
            s.weather.clone(),
            s.homes.to_string(),
            s.total_demand_kw.to_string(),
            s.total_supply_kw.to_string(),
            status.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::fixtures::snapshot;

    fn history_of(pairs: &[(f64, f64)]) -> HistoryStore {
        let mut store = HistoryStore::new();
        for &(d, s) in pairs {
            let c = store.classify(snapshot(d, s));
            store.push(c);
        }
        store
    }

    fn render(history: &HistoryStore) -> String {
        let mut buf = Vec::new();
        write_csv(history, &mut buf).expect("export should succeed");
        String::from_utf8(buf).expect("csv output should be valid UTF-8")
    }

    #[test]
    fn header_has_seven_fixed_columns() {
        let out = render(&history_of(&[(1.0, 2.0)]));
        assert_eq!(
            out.lines().next(),
            Some("#,Hour,Weather,Homes,Demand(kW),Supply(kW),Status")
        );
    }

    #[test]
    fn rows_follow_display_order() {
        let out = render(&history_of(&[(100.0, 120.0), (150.0, 120.0), (150.0, 130.5)]));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "1,12,sunny,20,150,130.5,SHORTAGE");
        assert_eq!(lines[2], "2,12,sunny,20,150,120,SHORTAGE");
        assert_eq!(lines[3], "3,12,sunny,20,100,120,OK");
    }

    #[test]
    fn status_is_recomputed_at_export_time() {
        let mut store = history_of(&[(100.0, 120.0)]);
        // Tamper with the stored classification; export must ignore it.
        let mut entry = store.newest().cloned().expect("entry");
        entry.status = Status::Shortage;
        store.clear();
        store.push(entry);

        let out = render(&store);
        assert!(out.lines().nth(1).is_some_and(|l| l.ends_with(",OK")));
    }

    #[test]
    fn empty_history_is_rejected_without_output() {
        let store = HistoryStore::new();
        let mut buf = Vec::new();
        let err = write_csv(&store, &mut buf);
        assert!(matches!(err, Err(ExportError::EmptyHistory)));
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_history_creates_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(DEFAULT_CSV_NAME);
        let err = export_csv(&HistoryStore::new(), &path);
        assert!(matches!(err, Err(ExportError::EmptyHistory)));
        assert!(!path.exists());
    }

    #[test]
    fn weather_with_comma_is_quoted() {
        let mut store = HistoryStore::new();
        let mut s = snapshot(1.0, 2.0);
        s.weather = "cloudy, windy".into();
        let c = store.classify(s);
        store.push(c);

        let mut buf = Vec::new();
        write_csv(&store, &mut buf).expect("export should succeed");
        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let rec = rdr.records().next().and_then(Result::ok).expect("one row");
        assert_eq!(rec.len(), 7);
        assert_eq!(&rec[2], "cloudy, windy");
    }
}
