//! The fixed reporting schema.
//!
//! The execution service exposes a flattened view of the OpenFoodFacts-style
//! database, so the set of tables and the columns each one reports are known
//! ahead of time and never change while the program runs.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::ErrorKind;

/// One of the fixed schema entities.
///
/// Keeping this closed as an enum means the core never has to deal with a
/// table it doesn't know; unknown names are rejected at the string boundary
/// by [FromStr] and serde.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    Produto,
    Categoria,
    Marca,
    Ingrediente,
    Nutriente,
    Tag,
}

/// A `table.attribute` identifier naming one reportable field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualifiedColumn(String);

static CATALOG: Lazy<BTreeMap<TableName, Vec<QualifiedColumn>>> = Lazy::new(|| {
    let columns = |names: &[&str]| names.iter().map(|name| (*name).into()).collect();

    BTreeMap::from([
        (
            TableName::Produto,
            columns(&[
                "produto.codigo",
                "produto.nome",
                "produto.nutriscore",
                "produto.novascore",
                "produto.ecoscore",
            ]),
        ),
        (TableName::Categoria, columns(&["categoria.nome"])),
        (TableName::Marca, columns(&["marca.nome"])),
        (
            TableName::Ingrediente,
            columns(&[
                "ingrediente.nome",
                "ingrediente.vegano",
                "ingrediente.vegetariano",
            ]),
        ),
        (
            TableName::Nutriente,
            columns(&["nutriente.nome", "nutriente.unidade"]),
        ),
        (TableName::Tag, columns(&["tag.nome", "tag.tipo"])),
    ])
});

/// Every table, in the canonical order the dashboard listed them.
pub fn all_tables() -> [TableName; 6] {
    [
        TableName::Produto,
        TableName::Categoria,
        TableName::Marca,
        TableName::Ingrediente,
        TableName::Nutriente,
        TableName::Tag,
    ]
}

/// The ordered columns a table reports.
pub fn columns_of(table: TableName) -> &'static [QualifiedColumn] {
    CATALOG
        .get(&table)
        .expect("the catalog covers every TableName variant")
}

impl TableName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Produto => "produto",
            TableName::Categoria => "categoria",
            TableName::Marca => "marca",
            TableName::Ingrediente => "ingrediente",
            TableName::Nutriente => "nutriente",
            TableName::Tag => "tag",
        }
    }
}

impl FromStr for TableName {
    type Err = crate::Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        all_tables()
            .into_iter()
            .find(|table| table.as_str() == input)
            .ok_or_else(|| ErrorKind::UnknownTable(input.to_string()).into())
    }
}

impl Display for TableName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl QualifiedColumn {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key the execution service uses for this column in result rows.
    ///
    /// The service lower-cases the qualified name, so `produto.codigo` comes
    /// back under `produto.codigo` and a hypothetical `Marca.Nome` would come
    /// back under `marca.nome`.
    pub fn row_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl<T: Into<String>> From<T> for QualifiedColumn {
    fn from(name: T) -> QualifiedColumn {
        QualifiedColumn(name.into())
    }
}

impl PartialEq<&str> for QualifiedColumn {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Display for QualifiedColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
