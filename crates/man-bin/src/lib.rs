//! Front end shared by the `apropos` and `whatis` binaries: argument
//! surface, logging setup, and the glue from compiled search terms to
//! formatted result lines.

use clap::Parser;

pub mod config;
pub mod expr;
pub mod search;

/// Command line arguments common to both binaries.
#[derive(Parser, Debug)]
#[command(about = "search the manual page databases")]
pub struct Args {
    /// Use this colon-separated path list instead of the defaults.
    #[arg(short = 'M', value_name = "defpaths")]
    pub defpaths: Option<String>,
    /// Append this colon-separated path list to the defaults.
    #[arg(short = 'm', value_name = "auxpaths")]
    pub auxpaths: Option<String>,
    /// Restrict the search to the given architecture.
    #[arg(short = 'S', value_name = "arch")]
    pub arch: Option<String>,
    /// Restrict the search to the given manual section.
    #[arg(short = 's', value_name = "section")]
    pub section: Option<String>,
    /// Search expression; literal keywords under whatis.
    #[arg(value_name = "expression")]
    pub terms: Vec<String>,
}

/// Install the stderr tracing subscriber, filtered by `MANVIEW_LOG`.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("MANVIEW_LOG"))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run one search invocation and return the process exit code: 0 on
/// success including an empty result set, 1 on expression or database
/// errors.
pub fn run(progname: &str, args: Args, whatis: bool) -> i32 {
    init_logging();
    if args.terms.is_empty() {
        return 0;
    }

    let cfg = config::load_from(None);
    let paths = config::manpath(&cfg, args.defpaths.as_deref(), args.auxpaths.as_deref());

    let terms = match expr::compile(&args.terms, whatis) {
        Ok(terms) => terms,
        Err(err) => {
            eprintln!("{progname}: bad expression: {err}");
            return 1;
        }
    };

    let filters = search::Filters {
        arch: args.arch,
        section: args.section,
    };
    match search::search(&paths, &filters, &terms) {
        Ok(hits) => {
            for h in &hits {
                match &h.arch {
                    Some(arch) => println!("{}({}/{}) - {}", h.name, h.sect, arch, h.desc),
                    None => println!("{}({}) - {}", h.name, h.sect, h.desc),
                }
            }
            0
        }
        Err(err) => {
            eprintln!("{progname}: error reading manual database: {err}");
            1
        }
    }
}
