//! Demo entry point: load both collections and print the current week with
//! coverage statistics.

use shiftplan::services::dashboard::Dashboard;
use shiftplan::types::Config;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(1);
        }
    };

    let mut dashboard = Dashboard::new(&config);
    if let Err(e) = dashboard.load().await {
        // Both collections or nothing; a single combined failure state.
        eprintln!("Load failed: {}", e);
        std::process::exit(1);
    }

    let stats = dashboard.stats();
    println!(
        "Diese Woche: {} Schichten | Dieser Monat: {} Schichten | {} Mitarbeiter | {} Tage ohne Abdeckung",
        stats.shifts_this_week,
        stats.shifts_this_month,
        stats.employee_count,
        stats.uncovered_days_this_month
    );

    for cell in dashboard.day_cells() {
        let day = cell.date.format("%a %Y-%m-%d");
        if cell.uncovered {
            println!("{}  (keine Schichten)", day);
            continue;
        }
        for a in &cell.assignments {
            let label = a
                .shift_type
                .map(|t| t.label())
                .unwrap_or("Schicht");
            println!("{}  {}  {}", day, label, a.employee_name);
        }
    }
}
