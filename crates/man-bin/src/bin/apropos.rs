//! Keyword search over the manual page databases.

use clap::Parser;
use manview::Args;

fn main() {
    let args = Args::parse();
    std::process::exit(manview::run("apropos", args, false));
}
