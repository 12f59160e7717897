use clap::arg;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitecrawler")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitecrawler")
        .about(
            "Crawl a single website, recording every page's title and status code. \
        Results are written as CSV (or JSON) reports.",
        )
        .styles(CLAP_STYLING)
        .arg(
            arg!(<DOMAIN>)
                .required(true)
                .help("The domain to crawl, e.g. www.example.com or http://localhost:8080"),
        )
        .arg(
            arg!(-r --"recursive")
                .required(false)
                .help("Follow internal links on every page (default: only the start page's links)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-e --"external")
                .required(false)
                .help("Collect links that point off the domain into a separate report")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-p --"pages-only")
                .required(false)
                .help("Skip links to images, documents and other non-page assets")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"include-subdomains")
                .required(false)
                .help("Treat any host containing the domain as internal")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"delay" <SECONDS>)
                .required(false)
                .help("Pause between requests in seconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("1"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(-o --"output-dir" <PATH>)
                .required(false)
                .help("Directory to write reports into")
                .default_value("."),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: csv, json")
                .value_parser(["csv", "json"])
                .default_value("csv"),
        )
        .arg(
            arg!(-v --"verbose")
                .required(false)
                .help("Enable debug logging")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-q --"quiet")
                .required(false)
                .help("Suppress progress and per-page output")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
}
