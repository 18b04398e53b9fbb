//! Shared start-up for the aisle binaries: arguments, config, logging, catalog.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use aisle_context::VendorScope;
use aisle_core::catalog::{Catalog, LoadReport};
use aisle_core::config::{Config, Settings};
use aisle_session::Assistant;
use aisle_translate::RuleTranslator;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub data_dir: Option<PathBuf>,
    pub limit: Option<usize>,
    pub help: bool,
    pub positional: Vec<String>,
}

/// `--data <dir>`, `--limit <n>`, `--help`; everything else is positional.
pub fn parse_args<I>(args: I) -> Result<Options>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-d" | "--data" => {
                let dir = args.next().context("--data requires a directory")?;
                options.data_dir = Some(PathBuf::from(dir));
            }
            "-n" | "--limit" => {
                let raw = args.next().context("--limit requires a number")?;
                let limit = raw.parse().with_context(|| format!("--limit expects a number, got {raw:?}"))?;
                options.limit = Some(limit);
            }
            "-h" | "--help" => options.help = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => options.positional.push(arg),
        }
    }
    Ok(options)
}

/// Log to stderr. `RUST_LOG` wins over the configured level.
pub fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

pub struct Runtime {
    pub catalog: Arc<Catalog>,
    pub report: LoadReport,
    pub limit: usize,
}

impl Runtime {
    /// Load config, start logging and read the catalog.
    pub fn bootstrap(options: &Options) -> Result<Self> {
        let config = Config::load().context("loading configuration")?;
        let settings = config.settings()?;
        init_tracing(&settings);

        let data_dir = match &options.data_dir {
            Some(dir) => dir.clone(),
            None => config.data_dir()?,
        };
        let (catalog, report) = Catalog::load_dir(&data_dir);
        let limit = settings.clamp_limit(options.limit.unwrap_or(settings.search.default_limit));
        tracing::debug!(data_dir = %data_dir.display(), limit, "runtime ready");
        Ok(Self { catalog: Arc::new(catalog), report, limit })
    }

    pub fn assistant(&self) -> Assistant<RuleTranslator> {
        let translator = RuleTranslator::from_catalog(&self.catalog);
        Assistant::new(Arc::clone(&self.catalog), translator).with_limit(self.limit)
    }
}

/// Parse a shop choice: `any`, `not A, B`, or `A, B`.
///
/// Names are matched to the catalog's spelling ignoring case; unknown names pass through.
pub fn parse_shop(arg: &str, known: &[String]) -> Option<VendorScope> {
    let arg = arg.trim();
    if arg.eq_ignore_ascii_case("any") || arg.eq_ignore_ascii_case("all") {
        return Some(VendorScope::Any);
    }
    let (excluding, list) = match arg.strip_prefix("not ").or_else(|| arg.strip_prefix('-')) {
        Some(rest) => (true, rest),
        None => (false, arg),
    };
    let vendors: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            known
                .iter()
                .find(|k| k.eq_ignore_ascii_case(name))
                .cloned()
                .unwrap_or_else(|| name.to_string())
        })
        .collect();
    if vendors.is_empty() {
        None
    } else if excluding {
        Some(VendorScope::Except(vendors))
    } else {
        Some(VendorScope::Only(vendors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_positionals() {
        let options = parse_args(args(&["--data", "fixtures", "show me coke", "-n", "5"])).unwrap();
        assert_eq!(options.data_dir, Some(PathBuf::from("fixtures")));
        assert_eq!(options.limit, Some(5));
        assert_eq!(options.positional, vec!["show me coke"]);
        assert!(!options.help);
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(parse_args(args(&["--limit", "many"])).is_err());
        assert!(parse_args(args(&["--data"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
    }

    #[test]
    fn shop_choices() {
        let known = args(&["ASDA", "Subway"]);
        assert_eq!(parse_shop("any", &known), Some(VendorScope::Any));
        assert_eq!(parse_shop("asda, subway", &known), Some(VendorScope::Only(args(&["ASDA", "Subway"]))));
        assert_eq!(parse_shop("not asda", &known), Some(VendorScope::Except(args(&["ASDA"]))));
        assert_eq!(parse_shop("-Lidl", &known), Some(VendorScope::Except(args(&["Lidl"]))));
        assert_eq!(parse_shop("  ", &known), None);
    }
}
