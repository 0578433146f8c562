use financial_sheet_normalizer::{
    table_from_records, DashboardConfig, MetricSpec, RelativeWindow, SheetProcessor,
};

const EXPORT: &str = "\
기준월,메모,현금,주식합계,부채합계
2023-03-31,,\"₩1,100,000\",\"2,100,000\",\"$480,000\"
2023-06-30,분기,\"₩1,050,000\",\"2,500,000\",\"$460,000\"
2023-09-30,,\"₩1,200,000\",,\"$440,000\"
2023-12-31,연말,\"₩1,300,000\",\"2,900,000\",\"$420,000\"
2024-01-31,,\"₩1,100,000\",\"3,100,000\",\"$400,000\"
";

fn main() {
    let mut reader = csv::Reader::from_reader(EXPORT.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .expect("export should have a header row")
        .iter()
        .map(str::to_string)
        .collect();
    let records: Vec<Vec<String>> = reader
        .records()
        .map(|record| {
            record
                .expect("record should parse")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();

    let raw = table_from_records(&headers, &records).expect("export should form a table");

    let dashboard = DashboardConfig::new(vec![
        MetricSpec::new("현금", "C"),
        MetricSpec::new("주식합계", "D"),
        MetricSpec::new("부채합계", "E"),
    ])
    .with_default_window(RelativeWindow::Last6Months);
    let processor = SheetProcessor::default();

    for window in [dashboard.default_window, RelativeWindow::All] {
        let processed = processor
            .process(&raw, window, &dashboard)
            .expect("sheet should process");

        println!("{}", processed.caption());
        for summary in &processed.metrics.summaries {
            println!(
                " - {} ({})",
                summary.headline(),
                summary.delta.sign.color_hint()
            );
        }
        for failure in &processed.metrics.failures {
            println!(" ! {}: {}", failure.name, failure.reason);
        }
    }

    println!(
        "Config schema: {}",
        financial_sheet_normalizer::NormalizerConfig::schema_as_json()
            .expect("schema should serialize")
    );
}
