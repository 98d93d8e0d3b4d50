use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("lapse")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("lapse")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("hunt")
                .about(
                    "Crawl seed pages and hunt for expired or unregistered domains behind \
                their outbound links. Findings are appended to a Markdown report.",
                )
                .arg(
                    arg!(-t --"targets" <PATH>)
                        .required(false)
                        .help("Newline-delimited file of seed URLs ('#' starts a comment)")
                        .value_parser(clap::value_parser!(String))
                        .default_value(lapse_core::config::DEFAULT_TARGETS_FILE),
                )
                .arg(
                    arg!(--"hubs" <PATH>)
                        .required(false)
                        .help("Hub patterns that trigger a recursive dive")
                        .value_parser(clap::value_parser!(String))
                        .default_value(lapse_core::config::DEFAULT_HUBS_FILE),
                )
                .arg(
                    arg!(--"blacklist" <PATH>)
                        .required(false)
                        .help("Domain substrings never probed (built-in list if missing)")
                        .value_parser(clap::value_parser!(String))
                        .default_value(lapse_core::config::DEFAULT_BLACKLIST_FILE),
                )
                .arg(
                    arg!(--"platforms" <PATH>)
                        .required(false)
                        .help("Hosting platform suffixes that cannot be registered on their own")
                        .value_parser(clap::value_parser!(String))
                        .default_value(lapse_core::config::DEFAULT_PLATFORMS_FILE),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Markdown report to append this run to")
                        .value_parser(clap::value_parser!(String))
                        .default_value(lapse_core::config::DEFAULT_REPORT_FILE),
                )
                .arg(
                    arg!(-d --"max-depth" <DEPTH>)
                        .required(false)
                        .help("How many hub levels to dive below each seed (0 disables diving)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(--"tld" <TLDS>)
                        .required(false)
                        .help("Comma-separated TLD allow-list, e.g. 'de,com'"),
                )
                .arg(
                    arg!(-w --"workers" <NUM_WORKERS>)
                        .required(false)
                        .help("Concurrent link checks per page")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("20"),
                )
                .arg(
                    arg!(--"debug")
                        .required(false)
                        .help("Check links one at a time with a verbose trace")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"whois-failure" <POLICY>)
                        .required(false)
                        .help("Verdict for a failed WHOIS query")
                        .value_parser(["free", "registered"])
                        .default_value("free"),
                )
                .arg(
                    arg!(--"page-budget" <PAGES>)
                        .required(false)
                        .help("Stop fetching pages after this many (seeds and hubs together)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Also print this run's findings as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
