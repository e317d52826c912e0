//! Raw declarations, the input of the tree builder.

use crate::model::UnitOfWork;
use crate::table::TableSpec;

/// One declaration in a spec source, before expansion.
///
/// `Describe`, `Context` and `When` all become [`Declaration::Container`];
/// they differ only in naming convention. `It` and `Specify` become
/// [`Declaration::Leaf`].
#[derive(Debug, Clone)]
pub enum Declaration {
    Container {
        label: String,
        body: Vec<Declaration>,
    },
    Leaf {
        label: String,
        body: UnitOfWork,
    },
    Table(TableSpec),
}

impl Declaration {
    pub fn container(label: impl Into<String>, body: Vec<Declaration>) -> Self {
        Declaration::Container {
            label: label.into(),
            body,
        }
    }

    pub fn leaf(label: impl Into<String>, body: UnitOfWork) -> Self {
        Declaration::Leaf {
            label: label.into(),
            body,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Declaration::Container { label, .. } | Declaration::Leaf { label, .. } => label,
            Declaration::Table(table) => &table.label,
        }
    }
}

impl From<TableSpec> for Declaration {
    fn from(table: TableSpec) -> Self {
        Declaration::Table(table)
    }
}
