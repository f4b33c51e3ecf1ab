use std::{
    iter,
    path::{Path, PathBuf},
};

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[command(
    about = "forksrv-shim",
    long_about = "One-shot adapter launching a plain binary under the forkserver descriptor contract"
)]
#[readonly::make]
pub struct Args {
    #[arg(help = "File whose content becomes the target's stdin")]
    input: PathBuf,

    #[arg(help = "Address space limit for the target, in megabytes")]
    mem_limit: String,

    #[arg(help = "Path of the target binary to launch")]
    program: String,

    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Arguments passed to the target"
    )]
    args: Vec<String>,
}

impl Args {
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// The megabyte count the caller asked for.
    ///
    /// An unparsable value degrades to 0 instead of being rejected, that is
    /// what existing callers relying on `atoi` semantics get.
    pub fn mem_limit_mb(&self) -> u64 {
        self.mem_limit.parse().unwrap_or_else(|_| {
            warn!(
                "Memory limit {:?} is not a number, limiting to 0 MB",
                self.mem_limit
            );
            0
        })
    }

    /// The target's full argument vector, its own path in `argv[0]` position.
    pub fn argv(&self) -> Vec<String> {
        iter::once(&self.program)
            .chain(self.args.iter())
            .cloned()
            .collect::<Vec<String>>()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;

    #[test]
    fn parses_the_launch_grammar() {
        let args = Args::try_parse_from([
            "forksrv-shim",
            "testcase.bin",
            "25",
            "/usr/bin/target",
            "--flag",
            "-x",
        ])
        .unwrap();
        assert_eq!(args.input.as_os_str(), "testcase.bin");
        assert_eq!(args.mem_limit_mb(), 25);
        assert_eq!(args.argv(), vec!["/usr/bin/target", "--flag", "-x"]);
    }

    #[test]
    fn target_path_lands_in_argv0() {
        let args =
            Args::try_parse_from(["forksrv-shim", "testcase.bin", "25", "/usr/bin/target"]).unwrap();
        assert_eq!(args.argv(), vec!["/usr/bin/target"]);
    }

    #[test]
    fn rejects_missing_positionals() {
        assert!(Args::try_parse_from(["forksrv-shim"]).is_err());
        assert!(Args::try_parse_from(["forksrv-shim", "testcase.bin"]).is_err());
        assert!(Args::try_parse_from(["forksrv-shim", "testcase.bin", "25"]).is_err());
    }

    #[test]
    fn unparsable_mem_limit_degrades_to_zero() {
        let args =
            Args::try_parse_from(["forksrv-shim", "testcase.bin", "none", "/usr/bin/target"])
                .unwrap();
        assert_eq!(args.mem_limit_mb(), 0);
    }
}
