use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::Config;
use crate::tick::{price_to_tick, tick_variation};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One raw bar from the source file. Other OHLC columns are ignored.
#[derive(Debug, Clone)]
pub struct RawBar {
    pub date: u32,
    pub time: String,
    pub close: f64,
}

/// One row of the prepared dataset: raw close plus the derived tick columns.
/// The first source row is dropped during preparation (no predecessor for the
/// tick variation), so every prepared row has a defined `tick_variation`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRow {
    pub date: u32,
    pub datetime: NaiveDateTime,
    pub close: f64,
    pub tick: i64,
    pub tick_variation: f64,
}

/// Combine a YYYYMMDD date and a time-of-day string into a single timestamp.
pub fn normalize_datetime(date: u32, time: &str) -> Result<NaiveDateTime, String> {
    let year = (date / 10_000) as i32;
    let month = (date / 100) % 100;
    let day = date % 100;

    let d = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("Invalid date: {}", date))?;

    let t = NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .map_err(|_| format!("Invalid time: {}", time))?;

    Ok(d.and_time(t))
}

/// Read a delimited market data file with a header line naming at least the
/// `date` (YYYYMMDD), `time`, and `close` columns.
pub fn read_raw_file<P: AsRef<Path>>(filename: P) -> Result<Vec<RawBar>, String> {
    let file = File::open(filename.as_ref())
        .map_err(|e| format!("Cannot open market history file: {}", e))?;

    let reader = BufReader::new(file);
    let mut lines = reader.lines().enumerate();

    // Header line gives the column positions
    let header = loop {
        match lines.next() {
            Some((line_num, line_result)) => {
                let line = line_result
                    .map_err(|e| format!("Error reading line {}: {}", line_num + 1, e))?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err("No valid data found in file".to_string()),
        }
    };

    let columns: Vec<String> = split_fields(&header)
        .iter()
        .map(|s| s.to_ascii_lowercase())
        .collect();

    let date_col = find_column(&columns, "date")?;
    let time_col = find_column(&columns, "time")?;
    let close_col = find_column(&columns, "close")?;

    let mut bars = Vec::new();

    for (line_num, line_result) in lines {
        let line = line_result
            .map_err(|e| format!("Error reading line {}: {}", line_num + 1, e))?;

        if line.trim().is_empty() {
            continue;
        }

        let fields = split_fields(&line);
        let needed = date_col.max(time_col).max(close_col);
        if fields.len() <= needed {
            return Err(format!("Insufficient columns on line {}", line_num + 1));
        }

        let date_str = fields[date_col];
        if date_str.len() != 8 || !date_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("Invalid date on line {}", line_num + 1));
        }
        let date = date_str
            .parse::<u32>()
            .map_err(|_| format!("Invalid date on line {}", line_num + 1))?;

        let close = fields[close_col]
            .parse::<f64>()
            .map_err(|_| format!("Invalid close price on line {}", line_num + 1))?;

        if close <= 0.0 {
            return Err(format!("Non-positive price on line {}", line_num + 1));
        }

        bars.push(RawBar {
            date,
            time: fields[time_col].to_string(),
            close,
        });
    }

    if bars.is_empty() {
        return Err("No valid data found in file".to_string());
    }

    Ok(bars)
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split([',', ' ', '\t'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn find_column(columns: &[String], name: &str) -> Result<usize, String> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| format!("Missing '{}' column in header", name))
}

/// Prepare the dataset from raw bars: convert closes to ticks, compute the
/// tick variation, attach normalized timestamps, and drop the first row.
pub fn prepare_dataset(bars: &[RawBar]) -> Result<Vec<PreparedRow>, String> {
    if bars.len() < 2 {
        return Err(format!(
            "Need at least 2 bars to compute tick variation, got {}",
            bars.len()
        ));
    }

    let ticks: Vec<i64> = bars.iter().map(|b| price_to_tick(b.close)).collect();
    let variation = tick_variation(&ticks);

    let mut rows = Vec::with_capacity(bars.len() - 1);
    for (i, var) in variation.iter().enumerate() {
        let bar = &bars[i + 1];
        let datetime = normalize_datetime(bar.date, &bar.time)?;
        rows.push(PreparedRow {
            date: bar.date,
            datetime,
            close: bar.close,
            tick: ticks[i + 1],
            tick_variation: *var,
        });
    }

    Ok(rows)
}

/// Write the prepared dataset to the cache file so later runs skip preparation.
pub fn write_prepared<P: AsRef<Path>>(path: P, rows: &[PreparedRow]) -> Result<(), String> {
    let mut file = File::create(path.as_ref())
        .map_err(|e| format!("Cannot create cache file: {}", e))?;

    writeln!(file, "date,datetime,close,tick,tick_variation")
        .map_err(|e| format!("Error writing cache file: {}", e))?;

    for row in rows {
        writeln!(
            file,
            "{},{},{},{},{}",
            row.date,
            row.datetime.format(DATETIME_FORMAT),
            row.close,
            row.tick,
            row.tick_variation
        )
        .map_err(|e| format!("Error writing cache file: {}", e))?;
    }

    Ok(())
}

/// Read the prepared dataset back from the cache file.
pub fn read_prepared<P: AsRef<Path>>(path: P) -> Result<Vec<PreparedRow>, String> {
    let file = File::open(path.as_ref())
        .map_err(|e| format!("Cannot open cache file: {}", e))?;

    let reader = BufReader::new(file);
    let mut rows = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result
            .map_err(|e| format!("Error reading line {}: {}", line_num + 1, e))?;

        if line_num == 0 || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(|s| s.trim()).collect();
        if fields.len() < 5 {
            return Err(format!("Malformed cache row on line {}", line_num + 1));
        }

        let date = fields[0]
            .parse::<u32>()
            .map_err(|_| format!("Invalid date on line {}", line_num + 1))?;
        let datetime = NaiveDateTime::parse_from_str(fields[1], DATETIME_FORMAT)
            .map_err(|_| format!("Invalid datetime on line {}", line_num + 1))?;
        let close = fields[2]
            .parse::<f64>()
            .map_err(|_| format!("Invalid close on line {}", line_num + 1))?;
        let tick = fields[3]
            .parse::<i64>()
            .map_err(|_| format!("Invalid tick on line {}", line_num + 1))?;
        let variation = fields[4]
            .parse::<f64>()
            .map_err(|_| format!("Invalid tick variation on line {}", line_num + 1))?;

        rows.push(PreparedRow {
            date,
            datetime,
            close,
            tick,
            tick_variation: variation,
        });
    }

    if rows.is_empty() {
        return Err("No valid data found in cache file".to_string());
    }

    Ok(rows)
}

/// Load the prepared dataset, preparing it from the raw file only when the
/// cache file is absent. No staleness check against the source file.
pub fn load_or_prepare(config: &Config) -> Result<Vec<PreparedRow>, String> {
    if config.cache_file.exists() {
        println!("Using cached dataset {}", config.cache_file.display());
        return read_prepared(&config.cache_file);
    }

    println!("Preparing dataset from {}", config.data_file.display());
    let bars = read_raw_file(&config.data_file)?;
    let rows = prepare_dataset(&bars)?;
    write_prepared(&config.cache_file, &rows)?;
    println!("Prepared dataset written to {}", config.cache_file.display());

    Ok(rows)
}
