//! Static column table for the PCJ basin SNIS export.
//!
//! One declarative [`ColumnSchema`] replaces the per-variant rename tables
//! the source exports have accumulated. Each canonical field lists every
//! raw header spelling observed in the wild: the correctly accented form,
//! unaccented typists' forms, and the UTF-8-read-as-Latin-1 mojibake
//! renderings produced by older export tooling. A label that is not listed
//! here is passed through verbatim, not guessed at.

use crate::types::{ColumnSchema, ColumnSpec, DerivedSpec, FieldKind};

/// Canonical name of the natural-key column.
pub const KEY_COLUMN: &str = "municipio";

/// Canonical name of the distribution-loss metric used by the loss ranking.
pub const LOSS_FIELD: &str = "perdas_totais";

/// Canonical name of the per-connection loss metric.
pub const LOSS_PER_CONNECTION_FIELD: &str = "perdas_por_ligacao";

/// Column schema for the PCJ basin dataset.
///
/// Built once at startup; [`ColumnSchema::validate`] is expected to pass on
/// the table below and is still called so that edits here fail fast.
pub fn pcj_schema() -> ColumnSchema {
    let columns = vec![
        ColumnSpec::new(
            KEY_COLUMN,
            FieldKind::Text,
            ["Município", "Municipio", "MunicÃ­pio"],
        ),
        ColumnSpec::new("uf", FieldKind::Categorical, ["UF"]),
        ColumnSpec::new(
            "macrorregiao",
            FieldKind::Categorical,
            ["Macrorregião", "Macrorregiao", "MacrorregiÃ£o"],
        ),
        ColumnSpec::new(
            "natureza_juridica",
            FieldKind::Categorical,
            ["Natureza Juridica", "Natureza Jurídica", "Natureza JurÃ­dica"],
        ),
        ColumnSpec::new(
            "pop_total",
            FieldKind::Numeric,
            [
                "População total atendida com abastecimento de água",
                "Populacao total atendida com abastecimento de agua",
                "PopulaÃ§Ã£o total atendida com abastecimento de Ã¡gua",
            ],
        ),
        ColumnSpec::new(
            "pop_urbana",
            FieldKind::Numeric,
            [
                "População urbana atendida com abastecimento de água",
                "Populacao urbana atendida com abastecimento de agua",
                "PopulaÃ§Ã£o urbana atendida com abastecimento de Ã¡gua",
            ],
        ),
        ColumnSpec::new(
            LOSS_FIELD,
            FieldKind::Numeric,
            [
                "Perdas totais de água na distribuição",
                "Perdas totais de agua na distribuicao",
                "Perdas totais de Ã¡gua na distribuiÃ§Ã£o",
            ],
        ),
        ColumnSpec::new(
            LOSS_PER_CONNECTION_FIELD,
            FieldKind::Numeric,
            [
                "Índice de perdas por ligação",
                "Indice de perdas por ligacao",
                "Ãndice de perdas por ligaÃ§Ã£o",
            ],
        ),
        ColumnSpec::new(
            "consumo_per_capita",
            FieldKind::Numeric,
            [
                "Consumo médio per capita de água",
                "Consumo medio per capita de agua",
                "Consumo mÃ©dio per capita de Ã¡gua",
            ],
        ),
        ColumnSpec::new(
            "atendimento_agua",
            FieldKind::Numeric,
            [
                "Índice de atendimento total de água",
                "Indice de atendimento total de agua",
                "Ãndice de atendimento total de Ã¡gua",
            ],
        ),
        ColumnSpec::new(
            "atendimento_esgoto",
            FieldKind::Numeric,
            [
                "Índice de atendimento total de esgoto",
                "Indice de atendimento total de esgoto",
            ],
        ),
    ];

    let derived = vec![DerivedSpec::new("pct_pop_urbana", "pop_urbana", "pop_total")];

    ColumnSchema::new(columns, KEY_COLUMN, derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcj_schema_is_valid() {
        pcj_schema().validate().unwrap();
    }

    #[test]
    fn key_column_resolves_under_mojibake_spelling() {
        let schema = pcj_schema();
        let spec = schema.resolve("MunicÃ­pio").unwrap();
        assert_eq!(spec.canonical, KEY_COLUMN);
    }

    #[test]
    fn ranking_fields_are_declared_numeric() {
        let schema = pcj_schema();
        for field in [LOSS_FIELD, LOSS_PER_CONNECTION_FIELD] {
            assert_eq!(schema.spec(field).unwrap().kind, FieldKind::Numeric);
        }
    }
}
