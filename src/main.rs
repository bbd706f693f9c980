use std::path::Path;

use symbol_iface::{config, output};

const USAGE: &str = "Usage: symbol-iface input.txt [output.txt]\n\
The output file is optional, when it is omitted the input file will be overwritten.";

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let (input, output) = match args.as_slice() {
        [_, input] => (Path::new(input), None),
        [_, input, output] => (Path::new(input), Some(Path::new(output))),
        _ => {
            println!("{}", USAGE);
            std::process::exit(1);
        }
    };

    let settings = config::resolve(input.parent());
    match output::convert_file(input, output, &settings) {
        Ok(report) => {
            tracing::info!(
                "Converted {}: {} declarations, {} suppressed, {} blank lines",
                input.display(),
                report.emitted,
                report.suppressed,
                report.skipped_blank
            );
        }
        Err(e) => {
            println!("{}", e);
            std::process::exit(1);
        }
    }
}
