use dotenv::dotenv;
use log::warn;
use std::env;
use std::os::fd::RawFd;
use std::path::PathBuf;

pub struct Config {
    pub name: String,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    /// Extra descriptor held open for an external tracing tool; `exit`
    /// closes it together with the standard streams.
    pub trace_fd: Option<RawFd>,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/cmdtree")
        } else {
            PathBuf::from("tmp")
        }
    }

    fn default() -> Self {
        let config_dir = Self::get_config_dir();
        Config {
            name: String::from("cmdtree"),
            logger_level: String::from("warn"),
            logger_dir: config_dir.join("logs"),
            trace_fd: None,
        }
    }

    pub fn new() -> Self {
        // 优先加载环境变量
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        Self::from_env()
    }

    /// Default configuration overridden by `CMDTREE_*` variables.
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(level) = env::var("CMDTREE_LOG_LEVEL") {
            config.logger_level = level;
        }

        if let Ok(dir) = env::var("CMDTREE_LOG_DIR") {
            config.logger_dir = PathBuf::from(dir);
        }

        if let Ok(fd) = env::var("CMDTREE_TRACE_FD") {
            config.trace_fd = parse_fd(&fd);
        }

        config
    }
}

fn parse_fd(value: &str) -> Option<RawFd> {
    match value.trim().parse::<RawFd>() {
        // 0..=2 are the standard streams, already closed by `exit`
        Ok(fd) if fd > 2 => Some(fd),
        _ => {
            warn!("忽略无效的 CMDTREE_TRACE_FD: {:?}", value);
            None
        }
    }
}
