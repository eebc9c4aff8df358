use crate::schema::{RunReport, TriggerEntry, YieldRow};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

pub fn single_pb(length: u64) -> ProgressBar {
    let pb = ProgressBar::new(length);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [ {bar:50} ] {pos}/{len} {msg} {spinner}")
            .unwrap()
            .progress_chars("#|-"),
    );
    pb
}

pub fn print_yield_table(heading: &str, rows: &[YieldRow]) {
    println!("\n=== {} ===", heading.bold());
    if rows.is_empty() {
        println!("(no valid rows)");
        return;
    }

    println!(
        "{}",
        format!(
            "{:<10} {:>10} {:>8} {:>8} {:>8} {:>8} {:>7} {:>8} {:>8}",
            "symbol", "price", "eps_ttm", "base_q", "next_q", "next_yr", "payout", "est_div", "yield_%"
        )
        .cyan()
    );
    for row in rows {
        println!(
            "{:<10} {:>10.2} {:>8.2} {:>8.3} {:>8.3} {:>8.2} {:>7.3} {:>8.2} {:>8.2}",
            row.symbol,
            row.price,
            row.trailing_eps_ttm,
            row.base_q_eps,
            row.next_q_eps_est,
            row.next_year_eps_est,
            row.avg_payout_ratio,
            row.est_dividend,
            row.est_yield_pct,
        );
    }
}

pub fn print_trigger_log(triggered: &[String], log: &[TriggerEntry]) {
    println!("\n=== {} ===", "Triggered Symbols (this run)".bold());
    if triggered.is_empty() {
        println!("(none)");
    } else {
        println!("{}", triggered.join(", "));
    }

    println!("\n=== {} ===", "Trigger Reasons".bold());
    if log.is_empty() {
        println!("(none)");
    }
    for entry in log {
        println!("- {}: {}", entry.symbol, entry.reasons.join(" | "));
    }
}

pub fn print_report(report: &RunReport, threshold: f64, event: bool) {
    if event {
        print_trigger_log(&report.triggered, &report.trigger_log);
        print_yield_table("Recalculated Yields (Triggered)", &report.rows);
        print_yield_table(
            &format!("High Yield among Triggered (>= {:.0}%)", threshold * 100.0),
            &report.high_rows,
        );
    } else {
        print_yield_table("All Estimated Yields", &report.rows);
        print_yield_table(
            &format!("High Yield (>= {:.0}%)", threshold * 100.0),
            &report.high_rows,
        );
    }
}
