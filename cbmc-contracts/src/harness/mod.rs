//! Harness synthesis
//!
//! Each enforceable function gets its own goto binary: a generated `main`
//! calling just that function, linked against the file's artifact, then
//! instrumented so that
//!
//! - the function's own contract is enforced, and
//! - every call to another usable contract is replaced by that contract
//!   (assume the precondition, assert nothing about the body, assume the
//!   postcondition).
//!
//! Proving `f` therefore only explores `f` plus the declared behavior of
//! what it calls. A harness never stubs out its own target.
//!
//! Plans are pure data. The driver decides when the commands run.

use std::path::{Path, PathBuf};

use crate::artifact::harness_path;
use crate::config::Toolchain;
use crate::contracts::Classification;
use crate::symbols::SymbolTable;
use crate::tool::ToolCommand;

/// Name of the generated entry point
pub const HARNESS_ENTRY: &str = "main";

/// Property checks and environment modelling applied once per artifact,
/// before any harness is generated from it
pub const SAFETY_INSTRUMENTATION: &[&str] = &[
    "--unsigned-overflow-check",
    "--conversion-check",
    "--enum-range-check",
    "--nondet-static",
    "--add-library",
];

/// Instrument `artifact` in place with [`SAFETY_INSTRUMENTATION`]
pub fn safety_instrumentation(toolchain: &Toolchain, artifact: &Path) -> ToolCommand {
    ToolCommand::new(&toolchain.goto_instrument)
        .path_arg(artifact)
        .path_arg(artifact)
        .args(SAFETY_INSTRUMENTATION.iter().copied())
}

/// Everything needed to build and check the harness of one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessPlan {
    /// Exposed name of the function under proof
    pub function: String,
    /// Artifact the harness is generated from
    pub artifact: PathBuf,
    /// Output path, unique to this function
    pub path: PathBuf,
    /// Symbol the generated entry point calls
    pub entry_symbol: String,
    /// Contract to enforce, in `internal/exposed` form when aliased
    pub enforce: String,
    /// Contracts replacing calls, sorted, never including `function`
    pub replace: Vec<String>,
}

impl HarnessPlan {
    pub fn new(
        function: &str,
        artifact: &Path,
        symbols: &SymbolTable,
        contracts: &Classification,
    ) -> Self {
        let binding = symbols.binding(function);
        let replace = contracts
            .stubs_for(function)
            .map(|stub| symbols.binding(stub).qualified_name())
            .collect();

        Self {
            function: function.to_string(),
            artifact: artifact.to_path_buf(),
            path: harness_path(artifact, function),
            entry_symbol: binding.internal.clone(),
            enforce: binding.qualified_name(),
            replace,
        }
    }

    /// `goto-harness` invocation producing the entry point
    pub fn generate(&self, toolchain: &Toolchain) -> ToolCommand {
        ToolCommand::new(&toolchain.goto_harness)
            .path_arg(&self.artifact)
            .path_arg(&self.path)
            .args(["--harness-function-name", HARNESS_ENTRY])
            .args(["--harness-type", "call-function"])
            .args(["--function", self.entry_symbol.as_str()])
    }

    /// Relink the harness into a standalone goto binary
    pub fn relink(&self, toolchain: &Toolchain) -> ToolCommand {
        ToolCommand::new(&toolchain.goto_cc)
            .arg("-o")
            .path_arg(&self.path)
            .path_arg(&self.path)
    }

    /// Contract instrumentation flags, in the order they are passed
    pub fn directives(&self) -> Vec<String> {
        let mut directives = vec![
            "--dfcc".to_string(),
            HARNESS_ENTRY.to_string(),
            "--apply-loop-contracts".to_string(),
            "--enforce-contract".to_string(),
            self.enforce.clone(),
        ];
        for stub in &self.replace {
            directives.push("--replace-call-with-contract".to_string());
            directives.push(stub.clone());
        }
        directives
    }

    /// Instrument the harness in place with [`Self::directives`]
    pub fn instrument(&self, toolchain: &Toolchain) -> ToolCommand {
        ToolCommand::new(&toolchain.goto_instrument)
            .path_arg(&self.path)
            .path_arg(&self.path)
            .args(self.directives())
    }

    /// Model check the finished harness
    pub fn check(&self, toolchain: &Toolchain) -> ToolCommand {
        ToolCommand::new(&toolchain.cbmc).path_arg(&self.path)
    }

    /// All steps in execution order
    pub fn steps(&self, toolchain: &Toolchain) -> [ToolCommand; 4] {
        [
            self.generate(toolchain),
            self.relink(toolchain),
            self.instrument(toolchain),
            self.check(toolchain),
        ]
    }
}

/// One plan per enforceable contract, ordered by function name
pub fn plan_harnesses(
    artifact: &Path,
    symbols: &SymbolTable,
    contracts: &Classification,
) -> Vec<HarnessPlan> {
    contracts
        .enforceable
        .iter()
        .map(|function| HarnessPlan::new(function, artifact, symbols, contracts))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn fixture() -> (SymbolTable, Classification) {
        let symbols = SymbolTable::from_listing([
            "foo /* foo */",
            "bar /* bar_impl */",
            "baz /* baz */",
        ])
        .unwrap();
        let contracts = Classification::new(
            symbols.defined(),
            &set(&["contract::foo", "contract::bar", "contract::ext", "ext"]),
            None,
        );
        (symbols, contracts)
    }

    #[test]
    fn test_plan_for_plain_function() {
        let (symbols, contracts) = fixture();
        let plan = HarnessPlan::new("foo", Path::new("build/cbmc/a.c.goto"), &symbols, &contracts);
        assert_eq!(plan.path, PathBuf::from("build/cbmc/a.c.goto::foo.goto"));
        assert_eq!(plan.entry_symbol, "foo");
        assert_eq!(plan.enforce, "foo");
        assert_eq!(plan.replace, vec!["bar_impl/bar", "ext"]);
    }

    #[test]
    fn test_plan_for_aliased_function() {
        let (symbols, contracts) = fixture();
        let plan = HarnessPlan::new("bar", Path::new("a.goto"), &symbols, &contracts);
        assert_eq!(plan.entry_symbol, "bar_impl");
        assert_eq!(plan.enforce, "bar_impl/bar");
        assert_eq!(plan.replace, vec!["ext", "foo"]);
    }

    #[test]
    fn test_self_never_replaced() {
        let (symbols, contracts) = fixture();
        for plan in plan_harnesses(Path::new("a.goto"), &symbols, &contracts) {
            let own = symbols.binding(&plan.function).qualified_name();
            assert!(!plan.replace.contains(&own), "{} stubs itself", plan.function);
        }
    }

    #[test]
    fn test_plans_follow_enforceable_set() {
        let (symbols, contracts) = fixture();
        let plans = plan_harnesses(Path::new("a.goto"), &symbols, &contracts);
        let names: Vec<_> = plans.iter().map(|p| p.function.as_str()).collect();
        assert_eq!(names, vec!["bar", "foo"]);
    }

    #[test]
    fn test_step_commands() {
        let (symbols, contracts) = fixture();
        let toolchain = Toolchain::default();
        let plan = HarnessPlan::new("bar", Path::new("build/cbmc/a.c.goto"), &symbols, &contracts);
        let [generate, relink, instrument, check] = plan.steps(&toolchain);

        insta::assert_snapshot!(
            generate.to_string(),
            @"goto-harness build/cbmc/a.c.goto build/cbmc/a.c.goto::bar.goto --harness-function-name main --harness-type call-function --function bar_impl"
        );
        insta::assert_snapshot!(
            relink.to_string(),
            @"goto-cc -o build/cbmc/a.c.goto::bar.goto build/cbmc/a.c.goto::bar.goto"
        );
        insta::assert_snapshot!(
            instrument.to_string(),
            @"goto-instrument build/cbmc/a.c.goto::bar.goto build/cbmc/a.c.goto::bar.goto --dfcc main --apply-loop-contracts --enforce-contract bar_impl/bar --replace-call-with-contract ext --replace-call-with-contract foo"
        );
        insta::assert_snapshot!(check.to_string(), @"cbmc build/cbmc/a.c.goto::bar.goto");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_reach_tools_unchanged() {
        use crate::artifact::artifact_path;
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (symbols, contracts) = fixture();
        let source = Path::new(OsStr::from_bytes(b"src/caf\xe9.c"));
        let artifact = artifact_path(Path::new("build"), source);
        assert_eq!(artifact.as_os_str().as_bytes(), b"build/cbmc/src/caf\xe9.c.goto");

        let plan = HarnessPlan::new("foo", &artifact, &symbols, &contracts);
        assert_eq!(
            plan.path.as_os_str().as_bytes(),
            b"build/cbmc/src/caf\xe9.c.goto::foo.goto"
        );

        let toolchain = Toolchain::default();
        let [generate, relink, instrument, check] = plan.steps(&toolchain);
        assert_eq!(generate.args[0], artifact.as_os_str());
        assert_eq!(generate.args[1], plan.path.as_os_str());
        assert_eq!(relink.args[1], plan.path.as_os_str());
        assert_eq!(relink.args[2], plan.path.as_os_str());
        assert_eq!(instrument.args[0], plan.path.as_os_str());
        assert_eq!(check.args[0], plan.path.as_os_str());

        let safety = safety_instrumentation(&toolchain, &artifact);
        assert_eq!(safety.args[0], artifact.as_os_str());
    }

    #[test]
    fn test_safety_instrumentation_command() {
        let cmd = safety_instrumentation(&Toolchain::default(), Path::new("build/cbmc/a.c.goto"));
        insta::assert_snapshot!(
            cmd.to_string(),
            @"goto-instrument build/cbmc/a.c.goto build/cbmc/a.c.goto --unsigned-overflow-check --conversion-check --enum-range-check --nondet-static --add-library"
        );
    }
}
