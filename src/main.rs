use log::debug;
use std::io;
use std::process::ExitCode;

use cmdtree::shell::Shell;
use cmdtree::utils::config::Config;
use cmdtree::utils::log::init_logger;

const USAGE: &str = "usage: cmdtree [-c LINE]";

fn main() -> ExitCode {
    let config = Config::new();
    if let Err(e) = init_logger(&config) {
        eprintln!("cmdtree: cannot open log in {}: {}", config.logger_dir.display(), e);
    }
    debug!("配置加载成功 {}", config.logger_dir.display());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut shell = Shell::new(&config);

    let code = match args.as_slice() {
        [flag, line] if flag == "-c" => {
            shell.handle_input(line);
            shell.exit_code()
        }
        [] => match shell.run(io::stdin().lock()) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("cmdtree: {}", e);
                1
            }
        },
        _ => {
            eprintln!("{}", USAGE);
            2
        }
    };

    ExitCode::from(code as u8)
}
