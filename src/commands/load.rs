use std::fs;
use std::time::{Duration, Instant};

use clap::{value_parser, Arg, ArgMatches, Command};
use cli_table::{format::Justify, print_stdout, Table, WithTitle};

use crate::load::{analyze_results, LoadClient, LoadTestReport, TestSummary};
use crate::load::client::DEFAULT_TIMEOUT;

pub(crate) fn command_config() -> Command {
    Command::new("load")
        .about("Send load to a running server to provoke scaling")
        .arg(
            Arg::new("url")
                .long("url")
                .required(true)
                .help("Base URL of the application")
        )
        .arg(
            Arg::new("test-type")
                .long("test-type")
                .value_parser(["burst", "sustained", "ramp"])
                .default_value("burst")
                .help("Load pattern")
        )
        .arg(
            Arg::new("requests")
                .long("requests")
                .value_parser(value_parser!(usize))
                .default_value("100")
                .help("Number of requests (burst)")
        )
        .arg(
            Arg::new("concurrency")
                .long("concurrency")
                .value_parser(value_parser!(usize))
                .default_value("10")
                .help("Requests in flight (burst)")
        )
        .arg(
            Arg::new("duration")
                .long("duration")
                .value_parser(value_parser!(u64))
                .default_value("60")
                .help("Duration in seconds (sustained/ramp)")
        )
        .arg(
            Arg::new("rps")
                .long("rps")
                .value_parser(value_parser!(u32))
                .default_value("10")
                .help("Requests per second (sustained/ramp)")
        )
        .arg(
            Arg::new("steps")
                .long("steps")
                .value_parser(value_parser!(u32))
                .default_value("10")
                .help("Number of steps (ramp)")
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .default_value("/stress?cpu=2&duration=15")
                .help("Endpoint to hit")
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_parser(value_parser!(u64))
                .default_value("30")
                .help("Per request timeout in seconds")
        )
        .arg(
            Arg::new("output")
                .long("output")
                .required(false)
                .help("File to write the JSON results to")
        )
}

#[derive(Table)]
struct SummaryTableItem {
    #[table(title = "Metric", justify = "Justify::Right")]
    metric: &'static str,
    #[table(title = "Value")]
    value: String,
}

fn summary_table(summary: &TestSummary, elapsed: Duration) -> Vec<SummaryTableItem> {
    let row = |metric, value| SummaryTableItem { metric, value };

    vec![
        row("Total time", format!("{:.2}s", elapsed.as_secs_f64())),
        row("Total requests", summary.total_requests.to_string()),
        row("Successful", summary.successful_requests.to_string()),
        row("Failed", summary.failed_requests.to_string()),
        row("Success rate", format!("{:.1}%", summary.success_rate())),
        row("Average", format!("{:.2}ms", summary.avg_response_time * 1000.0)),
        row("Min", format!("{:.2}ms", summary.min_response_time * 1000.0)),
        row("Max", format!("{:.2}ms", summary.max_response_time * 1000.0)),
        row("P95", format!("{:.2}ms", summary.p95_response_time * 1000.0)),
        row("Effective RPS", format!("{:.2}", summary.requests_per_second)),
    ]
}

pub(crate) async fn execute(args: &ArgMatches) {
    let url = args.get_one::<String>("url").cloned().unwrap_or_default();
    let test_type = args.get_one::<String>("test-type").cloned().unwrap_or_else(|| "burst".to_string());
    let endpoint = args.get_one::<String>("endpoint").cloned().unwrap_or_default();
    let requests = *args.get_one::<usize>("requests").unwrap_or(&100);
    let concurrency = *args.get_one::<usize>("concurrency").unwrap_or(&10);
    let duration = Duration::from_secs(*args.get_one::<u64>("duration").unwrap_or(&60));
    let rps = *args.get_one::<u32>("rps").unwrap_or(&10);
    let steps = *args.get_one::<u32>("steps").unwrap_or(&10);
    let timeout = Duration::from_secs(*args.get_one::<u64>("timeout").unwrap_or(&DEFAULT_TIMEOUT.as_secs()));

    println!("Starting {} load test against {}{}", test_type, url, endpoint);

    let client = LoadClient::new(&url, timeout);
    let start = Instant::now();
    let pattern = test_type.clone();

    let run = tokio::task::spawn_blocking(move || match pattern.as_str() {
        "sustained" => client.sustained_load(&endpoint, duration, rps),
        "ramp" => client.ramp_up_load(&endpoint, duration, rps, steps),
        _ => client.burst_load(&endpoint, requests, concurrency),
    })
    .await;

    let results = match run {
        Ok(results) => results,
        Err(err) => {
            error!("Load test aborted: {}", err);
            std::process::exit(1);
        }
    };

    let elapsed = start.elapsed();
    let summary = analyze_results(&results, &test_type);

    if let Err(err) = print_stdout(summary_table(&summary, elapsed).with_title()) {
        eprintln!("Unable to print summary: {}", err);
    }

    if let Some(output) = args.get_one::<String>("output") {
        let report = LoadTestReport {
            summary: &summary,
            results: &results,
        };

        let written = serde_json::to_string_pretty(&report)
            .map_err(|err| err.to_string())
            .and_then(|content| fs::write(output, content).map_err(|err| err.to_string()));

        match written {
            Ok(()) => println!("Results written to {}", output),
            Err(err) => eprintln!("Unable to write {}: {}", output, err),
        }
    }
}
