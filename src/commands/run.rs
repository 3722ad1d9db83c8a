use std::fs;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use crate::cli_util::print_run_error;
use crate::config::Settings;
use crate::{AddressingMode, EofBehavior, Executor, Program};

/// Exit status used when the run is interrupted with Ctrl+C.
const INTERRUPTED: i32 = 130;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Make the tape circular: moving off one end wraps to the other
    #[arg(short = 'c', long = "circular", conflicts_with = "bounded")]
    pub circular: bool,

    /// Make moving off either end of the tape an error, overriding BFRUN_CIRCULAR and the config file
    #[arg(short = 'b', long = "bounded")]
    pub bounded: bool,

    /// Number of tape cells (fallback BFRUN_TAPE_LENGTH; default 65536)
    #[arg(short = 's', long = "size", value_name = "CELLS")]
    pub size: Option<NonZeroUsize>,

    /// Value stored by ',' at end of input: zero, max or unchanged (fallback BFRUN_EOF; default zero)
    #[arg(long = "eof", value_name = "POLICY")]
    pub eof: Option<EofBehavior>,

    /// Run CODE instead of reading a program file
    #[arg(short = 'e', long = "code", value_name = "CODE", conflicts_with = "file")]
    pub code: Option<String>,

    /// Program file to run
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

impl RunArgs {
    fn settings(&self) -> Settings {
        Settings {
            tape_length: self.size,
            addressing: if self.circular {
                Some(AddressingMode::Circular)
            } else if self.bounded {
                Some(AddressingMode::Bounded)
            } else {
                None
            },
            eof: self.eof,
        }
    }
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let (origin, source) = match (&args.code, &args.file) {
        (Some(code), _) => ("<code>".to_string(), code.clone()),
        (None, Some(path)) => {
            if !path.is_file() {
                eprintln!("{program}: file not found: {}", path.display());
                let _ = io::stderr().flush();
                return 1;
            }
            // Invalid UTF-8 can only appear in comments, so decode lossily.
            match fs::read(path) {
                Ok(bytes) => (
                    path.display().to_string(),
                    String::from_utf8_lossy(&bytes).into_owned(),
                ),
                Err(e) => {
                    eprintln!("{program}: failed to read {}: {e}", path.display());
                    let _ = io::stderr().flush();
                    return 1;
                }
            }
        }
        (None, None) => usage_and_exit(program, 2),
    };

    // flags -> env -> config file -> defaults
    let config = Settings::from_config_file()
        .merge(Settings::from_env())
        .merge(args.settings())
        .into_machine_config();
    debug!(?config, %origin, "resolved machine config");

    // Install SIGINT (ctrl+c) handler to flush whatever the program printed so far
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(INTERRUPTED);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    let parsed = match Program::parse(&source) {
        Ok(p) => p,
        Err(err) => {
            print_run_error(&origin, &source, &err);
            return 1;
        }
    };

    // Unlocked handles: the ctrl+c handler must be able to take the stdout lock.
    let mut executor = match Executor::new(&parsed, &config) {
        Ok(executor) => executor,
        Err(err) => {
            print_run_error(&origin, &source, &err);
            return 1;
        }
    };
    match executor.run(io::stdin(), io::stdout()) {
        Ok(()) => 0,
        Err(err) => {
            print_run_error(&origin, &source, &err);
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} [OPTIONS] <FILE>        # Run the program in FILE
  {0} [OPTIONS] --code <CODE> # Run CODE given on the command line

Options:
  --circular, -c        Make the tape circular (default: moving off either end is an error)
  --bounded,  -b        Keep the tape bounded even if BFRUN_CIRCULAR or the config file says circular
  --size,     -s <N>    Number of tape cells (default 65536)
  --eof <POLICY>        Value stored by ',' at end of input: zero (default), max, unchanged
  --code,     -e <CODE> Run CODE instead of a file
  --help,     -h        Show this help

Notes:
- Characters outside of ><+-.,[] are ignored and may be used as comments.
- Input (`,`) reads a single byte from stdin.
- Defaults may also come from BFRUN_TAPE_LENGTH, BFRUN_CIRCULAR, BFRUN_EOF
  or an [interpreter] section in ~/.config/bfrun.toml.
- Set BFRUN_LOG=debug to see interpreter diagnostics on stderr.

Examples:
- Echo stdin back until end of input:
    {0} --code ",[.,]" < input.txt
- Run on a small wrapping tape:
    {0} -c -s 16 ./program.bf
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
