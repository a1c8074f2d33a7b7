use std::path::{Path, PathBuf};

use clap::Parser;
use constraint_script::{parse_script, ScriptError, Session};
use miette::{Diagnostic, IntoDiagnostic, NamedSource, SourceSpan, WrapErr};
use thiserror::Error;
use typecheck::SolveError;

mod config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Constraint script to solve
    script: PathBuf,

    /// Path to typecheck.toml (default: search upward from the script)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum search nodes per independent group of variables
    #[arg(long)]
    node_limit: Option<u64>,

    /// Also list names the solver left unresolved
    #[arg(long)]
    all: bool,
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(typecheck::script))]
struct ScriptDiagnostic {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: Option<SourceSpan>,
}

#[derive(Debug, Error, Diagnostic)]
#[error("cannot solve {path}")]
#[diagnostic(
    code(typecheck::solve),
    help("look for conflicting binds, or conversions that only go the other way")
)]
struct SolveDiagnostic {
    path: String,
    #[source]
    source: SolveError,
}

fn main() -> miette::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let config_path = args.config.clone().or_else(|| {
        let dir = args.script.parent().unwrap_or(Path::new("."));
        config::find_config(dir)
    });
    let (toml_config, config_dir) = match &config_path {
        Some(path) => {
            log::debug!("using config {}", path.display());
            let loaded = config::load_config(path).into_diagnostic()?;
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (loaded, dir)
        }
        None => Default::default(),
    };

    let mut solver_config = toml_config.solver_config();
    if let Some(limit) = args.node_limit {
        solver_config = solver_config.with_node_limit(limit);
    }

    let mut session = Session::new(solver_config);
    for prelude in &toml_config.prelude {
        apply_file(&mut session, &config_dir.join(prelude))?;
    }
    apply_file(&mut session, &args.script)?;

    let bindings = session.solve().map_err(|source| SolveDiagnostic {
        path: args.script.display().to_string(),
        source,
    })?;

    for (name, ty) in bindings.iter() {
        match ty {
            Some(ty) => println!("{name}: {ty}"),
            None if args.all => println!("{name}: <unresolved>"),
            None => {}
        }
    }
    Ok(())
}

fn apply_file(session: &mut Session, path: &Path) -> miette::Result<()> {
    let source = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;

    parse_script(&source)
        .and_then(|script| session.apply(&script))
        .map_err(|err| script_diagnostic(path, source.clone(), err))?;
    Ok(())
}

fn script_diagnostic(path: &Path, source: String, err: ScriptError) -> ScriptDiagnostic {
    let message = match &err {
        ScriptError::Parse(parse) => format!("syntax error: {}", parse.variant.message()),
        other => other.to_string(),
    };
    let span = err.line().and_then(|line| line_span(&source, line));
    ScriptDiagnostic {
        message,
        src: NamedSource::new(path.display().to_string(), source),
        span,
    }
}

/// Byte span of a 1-based line, without its line ending.
fn line_span(source: &str, line: usize) -> Option<SourceSpan> {
    let mut offset = 0;
    for (idx, text) in source.split_inclusive('\n').enumerate() {
        if idx + 1 == line {
            return Some((offset, text.trim_end().len()).into());
        }
        offset += text.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_spans() {
        let source = "type int\n\nbind a int  \n";
        assert_eq!(line_span(source, 1), Some((0, 8).into()));
        assert_eq!(line_span(source, 2), Some((9, 0).into()));
        assert_eq!(line_span(source, 3), Some((10, 10).into()));
        assert_eq!(line_span(source, 4), None);
    }
}
