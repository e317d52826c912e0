//! Static scanner for Go spec files written against Ginkgo v2.
//!
//! Nothing is compiled or run. The scanner tokenizes the source, finds the
//! Ginkgo DSL calls and turns them into [`Declaration`]s that the tree
//! builder expands like any other front-end's output:
//!
//! ```
//! let source = r#"
//!     var _ = Describe("Math Operations", func() {
//!         DescribeTable("Addition",
//!             func(a, b, expected int) {
//!                 Expect(a + b).To(Equal(expected))
//!             },
//!             Entry("1 + 1 = 2", 1, 1, 2),
//!             Entry("2 + 3 = 5", 2, 3, 5),
//!         )
//!     })
//! "#;
//!
//! let declarations = spectree::ginkgo::scan_str(source).unwrap();
//! let tree = spectree::TreeBuilder::new().build(declarations).unwrap();
//! let tree = spectree::NameResolver::default().resolve(tree);
//! assert_eq!(tree.count(), 2);
//! assert_eq!(
//!     tree.all_leaves().next().unwrap().path().as_str(),
//!     "Math Operations > 1 + 1 = 2"
//! );
//! ```
//!
//! Test bodies become no-op units of work. Entry arguments keep their literal
//! values; anything the scanner cannot evaluate is kept as source text.

mod lexer;
mod parser;

use std::fs;
use std::path::Path;

use tracing::{debug, instrument};

use crate::declaration::Declaration;
use crate::error::{Result, SpecError};
use lexer::tokenize;
use parser::Parser;

/// Scan Go source text held in memory.
pub fn scan_str(source: &str) -> Result<Vec<Declaration>> {
    scan_named("<source>", source)
}

/// Read and scan a Go source file.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn scan_file(path: impl AsRef<Path>) -> Result<Vec<Declaration>> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    scan_named(&path.display().to_string(), &source)
}

fn scan_named(name: &str, source: &str) -> Result<Vec<Declaration>> {
    let tokens = tokenize(source).map_err(|err| {
        SpecError::structural(format!("{name}:{}:{}", err.line, err.column), err.message)
    })?;
    let declarations = Parser::new(source, &tokens).parse_file();
    debug!(
        source = name,
        tokens = tokens.len(),
        declarations = declarations.len(),
        "scanned ginkgo source"
    );
    Ok(declarations)
}
