#![allow(dead_code)]

use std::fs::File;
use std::io::{Error, Write};
use std::path::{Path, PathBuf};

/// Config with every simulated latency and the prompt delay set to zero.
pub const INSTANT_CONFIG: &str = r#"
[momo]
prompt_delay_ms = 0

[mock]
exam_pricing_ms = 0
bulk_pricing_ms = 0
process_payment_ms = 0
momo_initiate_ms = 0
send_code_ms = 0
verify_code_ms = 0
fetch_results_ms = 0
user_orders_ms = 0
dashboard_stats_ms = 0
bulk_order_ms = 0
"#;

pub fn write_instant_config(dir: &Path) -> Result<PathBuf, Error> {
    let path = dir.join("resultgate.toml");
    let mut file = File::create(&path)?;
    file.write_all(INSTANT_CONFIG.as_bytes())?;
    Ok(path)
}

pub fn generate_pin_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["pin", "serial", "exam_type"])?;
    for i in 1..=rows {
        wtr.write_record([
            &format!("PIN{i:08}"),
            &format!("WA2024{i:09}"),
            "WASSCE",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
