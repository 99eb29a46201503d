//! What comes back from the execution service: plain JSON rows keyed by the
//! lower-cased qualified column name.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub type Row = BTreeMap<String, CellValue>;

/// A single result cell. The service only ever returns scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// Presentation the way the dashboard showed cells: booleans become
/// `Sim`/`Não`, nulls display as nothing at all.
impl Display for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(true) => write!(f, "Sim"),
            CellValue::Bool(false) => write!(f, "Não"),
            CellValue::Number(number) => write!(f, "{number}"),
            CellValue::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_decode_from_the_services_scalars() {
        let row: Row = serde_json::from_str(
            r#"{"produto.nome": "Arroz", "produto.nutriscore": 3, "ingrediente.vegano": true, "marca.nome": null}"#,
        )
        .unwrap();

        assert_eq!(row["produto.nome"], CellValue::Text("Arroz".to_string()));
        assert_eq!(row["produto.nutriscore"], CellValue::Number(3.0));
        assert_eq!(row["ingrediente.vegano"], CellValue::Bool(true));
        assert_eq!(row["marca.nome"], CellValue::Null);
    }

    #[test]
    fn cells_display_like_the_dashboard_did() {
        assert_eq!(CellValue::Bool(true).to_string(), "Sim");
        assert_eq!(CellValue::Bool(false).to_string(), "Não");
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(3.5).to_string(), "3.5");
    }
}
