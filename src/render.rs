use analytics::AnalyticsReport;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use wfo::WalkForwardSummary;

fn new_table(header: Vec<String>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn right(text: impl ToString) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

fn pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub fn print_report(report: &AnalyticsReport) {
    let periods: Vec<&str> = report.periods.iter().map(|p| p.as_str()).collect();
    println!(
        "Periods: {} | Records: {} | Group by: {} | Bin size: {}%",
        periods.join(", "),
        report.record_count,
        report.group_by,
        report.bin_size_pct
    );
    if report.is_empty() {
        println!("No records matched the selection.");
        return;
    }

    let header = |first: &str| {
        std::iter::once(first.to_string())
            .chain(report.group_keys.iter().cloned())
            .collect::<Vec<_>>()
    };

    let mut histogram = new_table(header("CAGR bin (%)"));
    for bin in &report.histogram {
        let mut row = vec![right(format!("{:.2} .. {:.2}", bin.floor, bin.floor + report.bin_size_pct))];
        row.extend(report.group_keys.iter().map(|key| right(bin.count(key))));
        histogram.add_row(row);
    }
    println!("\nHistogram\n{histogram}");

    let mut cdf = new_table(header("CAGR ≥ (%)"));
    for point in &report.reverse_cdf {
        let mut row = vec![right(format!("{:.2}", point.floor))];
        row.extend(report.group_keys.iter().map(|key| {
            right(point.percentage(key).map_or_else(|| "-".to_string(), |p| format!("{p:.1}%")))
        }));
        cdf.add_row(row);
    }
    println!("\nShare of trials at or above each bin\n{cdf}");
}

pub fn print_summary(summary: &WalkForwardSummary) {
    let months = |m: Option<u32>| m.map_or_else(|| "-".to_string(), |m| format!("{m} months"));
    println!(
        "Walk-forward: {} windows | Train {} | Test {} | Step {}",
        summary.total_windows,
        months(summary.train_period_months),
        months(summary.test_period_months),
        months(summary.step_months)
    );

    let mut performance = new_table(vec!["Metric".to_string(), "Value".to_string()]);
    performance.add_row(vec![
        Cell::new("Aggregated test CAGR (geometric mean)"),
        right(pct(summary.aggregated.test_cagr)),
    ]);
    performance.add_row(vec![
        Cell::new("Average test max drawdown"),
        right(pct(summary.aggregated.avg_test_max_drawdown)),
    ]);
    performance.add_row(vec![Cell::new("Windows with tests"), right(summary.aggregated.windows)]);
    let counts = summary.simulations;
    performance.add_row(vec![
        Cell::new("Simulations (ok / failed / profitable)"),
        right(format!("{} / {} / {}", counts.successful, counts.failed, counts.profitable)),
    ]);
    if let Some(chain) = &summary.portfolio {
        performance.add_row(vec![
            Cell::new("Simulated period"),
            right(format!("{} .. {}", or_unknown(chain.start_date), or_unknown(chain.end_date))),
        ]);
        performance.add_row(vec![
            Cell::new("Portfolio capital"),
            right(format!("{:.2} → {:.2}", chain.initial_capital, chain.final_capital)),
        ]);
        performance.add_row(vec![
            Cell::new("Portfolio total return"),
            right(format!("{:.2}%", chain.total_return_pct)),
        ]);
        performance.add_row(vec![Cell::new("Portfolio CAGR"), right(pct(chain.cagr))]);
    }
    println!("\n{performance}");

    if summary.parameter_frequency.is_empty() {
        return;
    }
    let mut frequency = new_table(vec![
        "Parameters".to_string(),
        "Wins".to_string(),
        "Windows".to_string(),
    ]);
    for entry in &summary.parameter_frequency {
        let windows: Vec<String> = entry.windows.iter().map(u32::to_string).collect();
        frequency.add_row(vec![
            Cell::new(&entry.key),
            right(entry.count),
            Cell::new(windows.join(", ")),
        ]);
    }
    println!("\nWinning parameter frequency\n{frequency}");
}
