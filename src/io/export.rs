//! CSV export of hourly dispatch ledgers.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::kpi::ComparisonResult;
use crate::sim::types::StrategyResult;

/// Column header of the ledger CSV.
const HEADER: &str = "strategy,hour,period,solar_kw,load_kw,price,soc,grid_kw,\
                       battery_kw,charge_kw,discharge_kw,curtailed_kw,cost";

/// Exports both ledgers of a comparison to a CSV file at the given path.
///
/// Baseline rows come first, then Smart rows. Produces deterministic output
/// for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(result: &ComparisonResult, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(&[&result.baseline, &result.smart], buf)
}

/// Writes ledgers as CSV to any writer.
///
/// # Arguments
///
/// * `runs` - Strategy results, written in order
/// * `writer` - Destination implementing `Write`
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(runs: &[&StrategyResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for run in runs {
        let strategy = run.strategy.to_string();
        for r in &run.records {
            wtr.write_record(&[
                strategy.clone(),
                r.hour.to_string(),
                r.period.to_string(),
                format!("{:.4}", r.solar_kw),
                format!("{:.4}", r.load_kw),
                format!("{:.2}", r.price),
                format!("{:.4}", r.soc),
                format!("{:.4}", r.grid_kw),
                format!("{:.4}", r.battery_kw),
                format!("{:.4}", r.charge_kw),
                format!("{:.4}", r.discharge_kw),
                format!("{:.4}", r.curtailed_kw),
                format!("{:.4}", r.cost()),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::{AnomalyFlags, HourlyRecord, StrategyKind};
    use crate::tariff::TouPeriod;

    fn make_run(strategy: StrategyKind, hours: usize) -> StrategyResult {
        let records = (0..hours)
            .map(|hour| HourlyRecord {
                hour,
                period: TouPeriod::OffPeak,
                solar_kw: 0.0,
                load_kw: 1.5,
                price: 4.0,
                soc: 0.5,
                grid_kw: 1.5,
                battery_kw: 0.0,
                charge_kw: 0.0,
                discharge_kw: 0.0,
                curtailed_kw: 0.0,
            })
            .collect();
        StrategyResult::new(strategy, records, AnomalyFlags::default())
    }

    #[test]
    fn header_matches_columns() {
        let run = make_run(StrategyKind::Baseline, 1);
        let mut buf = Vec::new();
        write_csv(&[&run], &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let first_line = output.as_deref().unwrap_or("").lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "strategy,hour,period,solar_kw,load_kw,price,soc,grid_kw,\
             battery_kw,charge_kw,discharge_kw,curtailed_kw,cost"
        );
    }

    #[test]
    fn row_count_matches_both_ledgers() {
        let baseline = make_run(StrategyKind::Baseline, 24);
        let smart = make_run(StrategyKind::Smart, 24);
        let mut buf = Vec::new();
        write_csv(&[&baseline, &smart], &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        // 1 header + 48 data rows
        assert_eq!(lines.len(), 49);
        assert!(lines[1].starts_with("baseline,0,off_peak,"));
        assert!(lines[25].starts_with("smart,0,off_peak,"));
    }

    #[test]
    fn deterministic_output() {
        let run = make_run(StrategyKind::Smart, 5);
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_csv(&[&run], &mut buf1).ok();
        write_csv(&[&run], &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn round_trip_parseable() {
        let run = make_run(StrategyKind::Smart, 3);
        let mut buf = Vec::new();
        write_csv(&[&run], &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(13));

        let mut row_count = 0;
        for record in rdr.records() {
            let rec = record.expect("every row should parse");
            for i in 3..13 {
                let val: Result<f64, _> = rec[i].parse();
                assert!(val.is_ok(), "column {i} should parse as f64");
            }
            // 1.5 kW at 4.00
            assert_eq!(&rec[12], "6.0000");
            row_count += 1;
        }
        assert_eq!(row_count, 3);
    }
}
