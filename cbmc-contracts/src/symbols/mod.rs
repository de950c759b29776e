//! Symbol extraction
//!
//! Parses the function listing of a goto binary
//! (`goto-instrument --list-goto-functions`). Each useful line is either a
//! bare identifier or an aliased pair `exposed /* internal */`, where the
//! binary exports `exposed` but reaches the body through `internal` (file
//! local functions renamed by `--export-file-local-symbols`). Anything else
//! in the listing is ignored.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::error::{CheckError, Result};

static BARE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z_][a-zA-Z0-9_]*)$").expect("valid regex"));

static ALIASED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z_][a-zA-Z0-9_]*) /\* ([a-zA-Z_][a-zA-Z0-9_]*) \*/$")
        .expect("valid regex")
});

/// One recognized line of a function listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingLine {
    /// `name`
    Bare(String),
    /// `exposed /* internal */`
    Aliased { exposed: String, internal: String },
}

impl ListingLine {
    /// Classify a listing line; `None` for anything unrecognized
    pub fn parse(line: &str) -> Option<Self> {
        if let Some(caps) = ALIASED_LINE.captures(line) {
            return Some(Self::Aliased {
                exposed: caps[1].to_string(),
                internal: caps[2].to_string(),
            });
        }
        BARE_LINE
            .captures(line)
            .map(|caps| Self::Bare(caps[1].to_string()))
    }

    /// The name the artifact defines a body for
    pub fn defined_name(&self) -> &str {
        match self {
            Self::Bare(name) => name,
            Self::Aliased { exposed, .. } => exposed,
        }
    }
}

/// An exported function name and the symbol its body is reached through
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FunctionBinding {
    pub exposed: String,
    pub internal: String,
}

impl FunctionBinding {
    /// Name as understood by `--enforce-contract` and
    /// `--replace-call-with-contract`
    pub fn qualified_name(&self) -> String {
        if self.exposed == self.internal {
            self.exposed.clone()
        } else {
            format!("{}/{}", self.internal, self.exposed)
        }
    }
}

/// Functions with a body in one artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    /// exposed name -> internal symbol
    bindings: BTreeMap<String, String>,
    defined: BTreeSet<String>,
}

impl SymbolTable {
    /// Build the table from raw listing lines.
    ///
    /// Fails if one exposed name is bound to two different internal symbols.
    pub fn from_listing<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        for line in lines {
            let line = line.as_ref();
            match ListingLine::parse(line) {
                Some(parsed) => table.insert(parsed)?,
                None => trace!(line, "skipping unrecognized listing line"),
            }
        }
        Ok(table)
    }

    fn insert(&mut self, line: ListingLine) -> Result<()> {
        self.defined.insert(line.defined_name().to_string());

        let ListingLine::Aliased { exposed, internal } = line else {
            return Ok(());
        };

        match self.bindings.get(&exposed) {
            Some(existing) if *existing != internal => Err(CheckError::internal(format!(
                "function '{exposed}' is bound to both '{existing}' and '{internal}'"
            ))),
            Some(_) => Ok(()),
            None => {
                self.bindings.insert(exposed, internal);
                Ok(())
            }
        }
    }

    /// Every name the artifact has a body for, sorted
    pub fn defined(&self) -> &BTreeSet<String> {
        &self.defined
    }

    /// Aliased bindings, sorted by exposed name
    pub fn bindings(&self) -> impl Iterator<Item = FunctionBinding> + '_ {
        self.bindings.iter().map(|(exposed, internal)| FunctionBinding {
            exposed: exposed.clone(),
            internal: internal.clone(),
        })
    }

    /// Binding for `name`, falling back to an identity binding when the
    /// listing carried no alias for it
    pub fn binding(&self, name: &str) -> FunctionBinding {
        FunctionBinding {
            exposed: name.to_string(),
            internal: self.internal_symbol(name).to_string(),
        }
    }

    /// Symbol a harness has to call to reach `name`'s body
    pub fn internal_symbol<'a>(&'a self, name: &'a str) -> &'a str {
        self.bindings.get(name).map(String::as_str).unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_shapes() {
        assert_eq!(ListingLine::parse("main"), Some(ListingLine::Bare("main".into())));
        assert_eq!(
            ListingLine::parse("bar /* bar_impl */"),
            Some(ListingLine::Aliased {
                exposed: "bar".into(),
                internal: "bar_impl".into(),
            })
        );
    }

    #[test]
    fn test_parse_rejects_other_output() {
        for line in [
            "",
            "  foo",
            "foo /* bar",
            "contract::foo",
            "foo /* 1bar */",
            "foo  /* bar */",
            "**** WARNING: no body for function x",
        ] {
            assert_eq!(ListingLine::parse(line), None, "line {line:?}");
        }
    }

    #[test]
    fn test_table_from_listing() {
        let table =
            SymbolTable::from_listing(["foo /* foo */", "bar /* bar_impl */", "helper", "noise!"])
                .unwrap();

        let bindings: Vec<_> = table.bindings().collect();
        assert_eq!(
            bindings,
            vec![
                FunctionBinding {
                    exposed: "bar".into(),
                    internal: "bar_impl".into()
                },
                FunctionBinding {
                    exposed: "foo".into(),
                    internal: "foo".into()
                },
            ]
        );
        assert_eq!(
            table.defined().iter().collect::<Vec<_>>(),
            vec!["bar", "foo", "helper"]
        );
        assert!(!table.defined().contains("noise"));
    }

    #[test]
    fn test_conflicting_alias_is_internal_error() {
        let err = SymbolTable::from_listing(["foo /* a */", "foo /* b */"]).unwrap_err();
        assert!(matches!(err, CheckError::InternalConsistency { .. }));
        assert!(err.to_string().contains("'foo'"));
    }

    #[test]
    fn test_repeated_identical_alias_is_accepted() {
        let table = SymbolTable::from_listing(["foo /* a */", "foo /* a */"]).unwrap();
        assert_eq!(table.bindings().count(), 1);
    }

    #[test]
    fn test_internal_symbol_fallback() {
        let table = SymbolTable::from_listing(["bar /* bar_impl */", "plain"]).unwrap();
        assert_eq!(table.internal_symbol("bar"), "bar_impl");
        assert_eq!(table.internal_symbol("plain"), "plain");
        assert_eq!(table.internal_symbol("absent"), "absent");
    }

    #[test]
    fn test_qualified_name() {
        let table = SymbolTable::from_listing(["foo /* foo */", "bar /* bar_impl */"]).unwrap();
        assert_eq!(table.binding("foo").qualified_name(), "foo");
        assert_eq!(table.binding("bar").qualified_name(), "bar_impl/bar");
        assert_eq!(table.binding("other").qualified_name(), "other");
    }
}
