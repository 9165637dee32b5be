use tili_cli::{build_cli, dispatch, init_tracing};

fn main() {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match dispatch(&matches) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
