//! Verification driver
//!
//! Per source file:
//!
//! ```text
//! compile → list functions → list undefined → classify
//!         → safety instrumentation (once, only if something is enforceable)
//!         → per function: harness → relink → contract instrumentation → cbmc
//! ```
//!
//! Strictly sequential. The first error from any step ends the whole run;
//! artifacts of steps that already finished stay on disk.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::artifact::{artifact_path, prepare_output};
use crate::compdb::CompileDatabase;
use crate::config::{RunConfig, Toolchain};
use crate::contracts::Classification;
use crate::error::Result;
use crate::harness::{HarnessPlan, plan_harnesses, safety_instrumentation};
use crate::resolver::{CompileDbResolver, ResolvedSource, SourceResolver};
use crate::symbols::SymbolTable;
use crate::tool::{ToolCommand, ToolRunner};

/// Flags appended to every database compile command
pub const COMPILE_FLAGS: &[&str] = &["-w", "-D__CPROVER__=1"];

/// The database compile command, retargeted at `goto-cc` and writing
/// `artifact`
pub fn compile_command(toolchain: &Toolchain, argv: &[String], artifact: &Path) -> ToolCommand {
    ToolCommand::new(&toolchain.goto_cc)
        .args(argv.iter().skip(1).cloned())
        .args(COMPILE_FLAGS.iter().copied())
        .arg("-o")
        .path_arg(artifact)
        .arg("--export-file-local-symbols")
}

/// What was checked for one source file
#[derive(Debug, Clone)]
pub struct FileReport {
    /// Source path relative to the working root
    pub source: PathBuf,
    pub artifact: PathBuf,
    pub contracts: Classification,
    /// Harnesses that were built and checked, in check order
    pub harnesses: Vec<HarnessPlan>,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
}

impl RunSummary {
    /// Number of functions whose contracts were checked
    pub fn checked_functions(&self) -> usize {
        self.files.iter().map(|f| f.harnesses.len()).sum()
    }

    /// Allow-listed names never enforced in any file
    pub fn unmatched_allowed<'a>(&self, allow: &'a BTreeSet<String>) -> Vec<&'a str> {
        allow
            .iter()
            .filter(|name| {
                !self
                    .files
                    .iter()
                    .any(|f| f.contracts.enforceable.contains(*name))
            })
            .map(String::as_str)
            .collect()
    }
}

/// Drives the CBMC tools over resolved source files
pub struct Verifier<'a, R: ToolRunner + ?Sized> {
    config: &'a RunConfig,
    runner: &'a R,
}

impl<'a, R: ToolRunner + ?Sized> Verifier<'a, R> {
    pub fn new(config: &'a RunConfig, runner: &'a R) -> Self {
        Self { config, runner }
    }

    /// Check every file in order, stopping at the first failure
    pub fn verify_all(&self, sources: &[ResolvedSource]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for source in sources {
            summary.files.push(self.verify_file(source)?);
        }
        Ok(summary)
    }

    /// Compile, classify and check all enforceable contracts of one file
    pub fn verify_file(&self, source: &ResolvedSource) -> Result<FileReport> {
        info!(file = %source.relative.display(), "checking contracts");

        let toolchain = &self.config.toolchain;
        let artifact = artifact_path(&self.config.build_dir, &source.relative);

        let argv = source.entry.argv()?;
        self.fresh(&artifact)?;
        self.exec(compile_command(toolchain, &argv, &artifact))?;

        let symbols = self.list_functions(&artifact)?;
        let undefined = self.list_undefined(&artifact)?;
        let contracts =
            Classification::new(symbols.defined(), &undefined, self.config.allow_list.as_ref());

        debug!(
            enforceable = ?contracts.enforceable,
            usable = ?contracts.usable,
            "classified contracts"
        );

        if contracts.has_enforceable() {
            self.exec(safety_instrumentation(toolchain, &artifact))?;
        }
        let harnesses = plan_harnesses(&artifact, &symbols, &contracts);
        for plan in &harnesses {
            self.check_harness(plan)?;
        }

        Ok(FileReport {
            source: source.relative.clone(),
            artifact,
            contracts,
            harnesses,
        })
    }

    fn check_harness(&self, plan: &HarnessPlan) -> Result<()> {
        info!(function = %plan.function, "checking function");
        self.fresh(&plan.path)?;
        for step in plan.steps(&self.config.toolchain) {
            self.exec(step)?;
        }
        Ok(())
    }

    fn list_functions(&self, artifact: &Path) -> Result<SymbolTable> {
        let cmd = ToolCommand::new(&self.config.toolchain.goto_instrument)
            .arg("--list-goto-functions")
            .path_arg(artifact);
        SymbolTable::from_listing(self.exec_lines(cmd)?)
    }

    fn list_undefined(&self, artifact: &Path) -> Result<BTreeSet<String>> {
        let cmd = ToolCommand::new(&self.config.toolchain.goto_instrument)
            .arg("--list-undefined-functions")
            .path_arg(artifact);
        Ok(self.exec_lines(cmd)?.into_iter().collect())
    }

    fn fresh(&self, path: &Path) -> Result<()> {
        prepare_output(&self.config.resolve(path))
    }

    fn exec(&self, cmd: ToolCommand) -> Result<()> {
        self.runner.run(&cmd.current_dir(&self.config.working_root))
    }

    fn exec_lines(&self, cmd: ToolCommand) -> Result<Vec<String>> {
        self.runner
            .run_lines(&cmd.current_dir(&self.config.working_root))
    }
}

/// Load the compilation database, resolve `requested` and check everything
pub fn run<R: ToolRunner + ?Sized>(
    config: &RunConfig,
    requested: &[PathBuf],
    runner: &R,
) -> Result<RunSummary> {
    let db_path = config.compile_db_path();
    let db = CompileDatabase::load(&db_path)?;
    if db.is_empty() {
        warn!(path = %db_path.display(), "compilation database has no entries");
    }

    let sources = CompileDbResolver::new(&config.working_root, &db).resolve(requested)?;
    let summary = Verifier::new(config, runner).verify_all(&sources)?;

    if let Some(allow) = &config.allow_list {
        for name in summary.unmatched_allowed(allow) {
            warn!(contract = name, "requested contract was not enforced in any file");
        }
    }

    info!(
        files = summary.files.len(),
        functions = summary.checked_functions(),
        "contract checking finished"
    );
    Ok(summary)
}
