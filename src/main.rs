// Entry point and batch flow.
//
// One run goes: load (cache, else parse the source, fetching it if absent)
// -> filter to the analysis window -> normalize event types -> aggregate
// -> export CSV/JSON and print the top-N rankings.
mod config;
mod damage;
mod error;
mod filter;
mod loader;
mod normalize;
mod output;
mod reports;
mod types;
mod util;

use clap::Parser;
use config::Args;
use loader::{DatasetCache, FileCache, HttpFetcher, LoadOrigin, NoCache};
use normalize::Normalizer;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use types::StormRecord;

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the full dataset and print a short diagnostic line.
fn handle_load(args: &Args) -> error::Result<Vec<StormRecord>> {
    let file_cache;
    let cache: &dyn DatasetCache = if args.no_cache {
        &NoCache
    } else {
        file_cache = FileCache::new(&args.cache);
        &file_cache
    };
    let fetcher = HttpFetcher::new(args.url.as_str());
    let (records, origin) = loader::load_dataset(&args.source, cache, &fetcher)?;

    match origin {
        LoadOrigin::Cache => println!(
            "Loaded {} records from cache ({}).",
            util::format_int(records.len()),
            args.cache.display()
        ),
        LoadOrigin::Parsed(report) => {
            println!(
                "Processing dataset... ({} rows read, {} records loaded)",
                util::format_int(report.total_rows),
                util::format_int(records.len())
            );
            if report.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to parse errors.",
                    util::format_int(report.parse_errors)
                );
            }
            if report.bad_dates > 0 {
                warn!(bad_dates = report.bad_dates, "records with unparsable BGN_DATE");
            }
        }
    }
    Ok(records)
}

/// Filter, normalize, aggregate and write every output.
fn handle_generate_reports(args: &Args, records: &[StormRecord]) -> error::Result<()> {
    let filter_cfg = args.filter_config()?;
    let (mut data, filter_report) = filter_cfg.apply(records);
    info!(
        input = filter_report.input,
        retained = filter_report.retained,
        by_date = filter_report.dropped_by_date,
        excluded = filter_report.dropped_excluded,
        no_impact = filter_report.dropped_no_impact,
        "filtered"
    );
    println!(
        "{} records with casualties or damage since {}.",
        util::format_int(data.len()),
        filter_cfg.since.date()
    );

    let norm = Normalizer::default().normalize_records(&mut data);
    info!(
        before = norm.distinct_before,
        after = norm.distinct_after,
        rewritten = norm.rewritten,
        "normalized event types"
    );
    println!(
        "Event types: {} distinct raw labels -> {} after normalization.\n",
        util::format_int(norm.distinct_before),
        util::format_int(norm.distinct_after)
    );

    std::fs::create_dir_all(&args.out_dir)
        .map_err(|e| error::StormError::file(&args.out_dir, e))?;
    let out = |name: &str| args.out_dir.join(name);

    let casualties = reports::aggregate_casualties(&data);
    write_report(
        &out("report1_casualties.csv"),
        &reports::render_casualties(&casualties),
    )?;
    let top1 = reports::render_casualties(&reports::top_n(&casualties, args.top));
    output::preview_table(
        "Report 1: Event Types Most Harmful to Population Health",
        Some(format!("Top {} by TotalCasualties", args.top).as_str()),
        &top1,
        top1.len(),
    );

    let damage = reports::aggregate_damage(&data);
    write_report(
        &out("report2_economic_damage.csv"),
        &reports::render_damage(&damage),
    )?;
    let top2 = reports::render_damage(&reports::top_n(&damage, args.top));
    output::preview_table(
        "Report 2: Event Types With the Greatest Economic Consequences",
        Some(format!("Top {} by TotalDamage, USD", args.top).as_str()),
        &top2,
        top2.len(),
    );

    if args.list_labels {
        let labels = reports::render_label_counts(&normalize::label_counts(&data));
        write_report(&out("event_type_counts.csv"), &labels)?;
        output::preview_table("Normalized Event Types", None, &labels, labels.len());
    }

    let summary = reports::generate_summary(records.len(), norm.distinct_before, &data);
    let summary_path = out("summary.json");
    output::write_json(&summary_path, &summary)?;
    println!("Summary Stats ({}):", summary_path.display());
    println!(
        "{{\"total_casualties\": {}, \"total_damage\": {}}}\n",
        util::format_int(summary.total_fatalities + summary.total_injuries),
        util::format_number(summary.total_property_damage + summary.total_crop_damage, 2)
    );
    Ok(())
}

fn write_report<T: serde::Serialize>(path: &Path, rows: &[T]) -> error::Result<()> {
    output::write_csv(path, rows)?;
    info!(path = %path.display(), rows = rows.len(), "wrote report");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_logging(&args.log_level);
    info!(source = %args.source.display(), "storm-report starting");

    let records = handle_load(&args)?;
    handle_generate_reports(&args, &records)?;
    Ok(())
}
