use env_logger::{Builder, Env, Target};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Where the interactive view logs, since stderr is hidden behind the
/// alternate screen
pub fn log_file_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mindroots")
        .join("mindroots.log")
}

/// Open `path` for appending, creating its directory first
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize `log` output. `RUST_LOG` overrides the `warn` default.
/// With `to_file`, records are appended to `log_file_path()` instead of
/// stderr. If that file can't be opened, a note is printed before the
/// terminal enters raw mode and logging stays on stderr.
pub fn init_logging(to_file: bool) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));

    if to_file {
        let path = log_file_path();
        match open_log_file(&path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("mindroots: cannot log to {}: {}", path.display(), e),
        }
    }

    // A second init (e.g. from tests) is harmless
    let _ = builder.try_init();
}
