#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args by hand. Supports environment variable overrides via the
//! `PWIN_DEMO_*` prefix; explicit flags win over the environment.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
pwin demo: a scripted scroll session over a paged photo listing

USAGE:
    pwin-demo [OPTIONS]

OPTIONS:
    --source=NAME        'synthetic' (default) or 'picsum'
    --pages=N            Synthetic collection size in pages, 0 = endless (default: 10)
    --latency-ms=N       Synthetic fetch latency (default: 20)
    --steps=N            Scroll steps to run (default: 40)
    --step=PX            Pixels scrolled per step (default: 250)
    --width=PX           Viewport width (default: 1024)
    --height=PX          Viewport height (default: 600)
    --row-height=PX      Grid row height (default: 300)
    --start-page=N       First page to load (default: 1)
    --bounce             Scroll back up after reaching the last step
    --json               Print one JSON object per step
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    PWIN_DEMO_SOURCE        Override --source
    PWIN_DEMO_PAGES         Override --pages
    PWIN_DEMO_LATENCY_MS    Override --latency-ms
    PWIN_DEMO_STEPS         Override --steps
    PWIN_DEMO_STEP          Override --step
    PWIN_OVERSCAN, PWIN_LOAD_THRESHOLD, PWIN_PAGE_SIZE,
    PWIN_INITIAL_PAGES, PWIN_START_PAGE
                            Window tuning
    RUST_LOG                Log filter (default: warn)";

/// Where pages come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Synthetic,
    Picsum,
}

impl SourceKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "synthetic" | "synth" | "s" => Some(Self::Synthetic),
            "picsum" | "http" | "p" => Some(Self::Picsum),
            _ => None,
        }
    }
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    pub source: SourceKind,
    /// Synthetic pages before the collection ends (0 = endless).
    pub pages: u32,
    pub latency_ms: u64,
    pub steps: u32,
    /// Pixels per scroll step.
    pub step: f64,
    pub width: f64,
    pub height: f64,
    pub row_height: f64,
    /// Overrides the window config's start page when set.
    pub start_page: Option<u32>,
    pub bounce: bool,
    pub json: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            source: SourceKind::Synthetic,
            pages: 10,
            latency_ms: 20,
            steps: 40,
            step: 250.0,
            width: 1024.0,
            height: 600.0,
            row_height: 300.0,
            start_page: None,
            bounce: false,
            json: false,
        }
    }
}

/// Outcome of parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse process arguments and environment, exiting on help, version, or error.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args, |key| env::var(key).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("pwin-demo {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` (without the program name) with a custom environment lookup.
    ///
    /// # Errors
    /// Returns a message naming the offending flag.
    pub fn parse_from<F>(args: &[String], get_env: F) -> Result<Parsed, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Environment first; flags below override.
        if let Some(kind) = get_env("PWIN_DEMO_SOURCE").and_then(|v| SourceKind::parse(&v)) {
            opts.source = kind;
        }
        if let Some(n) = get_env("PWIN_DEMO_PAGES").and_then(|v| v.parse().ok()) {
            opts.pages = n;
        }
        if let Some(n) = get_env("PWIN_DEMO_LATENCY_MS").and_then(|v| v.parse().ok()) {
            opts.latency_ms = n;
        }
        if let Some(n) = get_env("PWIN_DEMO_STEPS").and_then(|v| v.parse().ok()) {
            opts.steps = n;
        }
        if let Some(n) = get_env("PWIN_DEMO_STEP").and_then(|v| v.parse().ok()) {
            opts.step = n;
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--bounce" => opts.bounce = true,
                "--json" => opts.json = true,
                other => {
                    let Some((flag, val)) = other.split_once('=') else {
                        return Err(format!("Unknown argument: {other}"));
                    };
                    match flag {
                        "--source" => {
                            opts.source = SourceKind::parse(val)
                                .ok_or_else(|| format!("Invalid --source value: {val}"))?;
                        }
                        "--pages" => opts.pages = number(flag, val)?,
                        "--latency-ms" => opts.latency_ms = number(flag, val)?,
                        "--steps" => opts.steps = number(flag, val)?,
                        "--step" => opts.step = number(flag, val)?,
                        "--width" => opts.width = number(flag, val)?,
                        "--height" => opts.height = number(flag, val)?,
                        "--row-height" => opts.row_height = number(flag, val)?,
                        "--start-page" => {
                            let n: u32 = number(flag, val)?;
                            if n == 0 {
                                return Err("Invalid --start-page value: pages start at 1".into());
                            }
                            opts.start_page = Some(n);
                        }
                        _ => return Err(format!("Unknown argument: {other}")),
                    }
                }
            }
        }

        Ok(Parsed::Run(opts))
    }
}

fn number<T: std::str::FromStr>(flag: &str, val: &str) -> Result<T, String> {
    val.parse()
        .map_err(|_| format!("Invalid {flag} value: {val}"))
}
