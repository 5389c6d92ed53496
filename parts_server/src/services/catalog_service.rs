//! Dropdown option lists.

use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::catalog::{labels, LabelRow, ServiceLabelRow};

/// The option lists the dashboard can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Models,
    OdometerModels,
    Workshops,
    Sections,
    Parts,
    Vehicles,
    PartGroups,
    Lines,
}

impl Catalog {
    pub const ALL: [Catalog; 8] = [
        Self::Models,
        Self::OdometerModels,
        Self::Workshops,
        Self::Sections,
        Self::Parts,
        Self::Vehicles,
        Self::PartGroups,
        Self::Lines,
    ];

    /// Path segment under `/api/catalog`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Models => "models",
            Self::OdometerModels => "odometer-models",
            Self::Workshops => "workshops",
            Self::Sections => "sections",
            Self::Parts => "parts",
            Self::Vehicles => "vehicles",
            Self::PartGroups => "part-groups",
            Self::Lines => "lines",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    fn sql(self) -> &'static str {
        match self {
            Self::Models => {
                r#"SELECT DISTINCT "MODELO"::text AS label FROM pecas_gerais
                   WHERE "MODELO" IS NOT NULL ORDER BY label"#
            }
            Self::OdometerModels => {
                r#"SELECT DISTINCT modelo_frota::text AS label FROM mat_view_os_pecas_hodometro_v3
                   WHERE modelo_frota IS NOT NULL ORDER BY label"#
            }
            Self::Workshops => {
                r#"SELECT DISTINCT "DESCRICAO DA OFICINA"::text AS label FROM mat_view_retrabalho_10_dias
                   WHERE "DESCRICAO DA OFICINA" IS NOT NULL ORDER BY label"#
            }
            Self::Sections => {
                r#"SELECT DISTINCT "DESCRICAO DA SECAO"::text AS label FROM mat_view_retrabalho_10_dias
                   WHERE "DESCRICAO DA SECAO" IS NOT NULL ORDER BY label"#
            }
            Self::Parts => {
                r#"SELECT DISTINCT "PRODUTO"::text AS label FROM pecas_gerais
                   WHERE "PRODUTO" IS NOT NULL ORDER BY label"#
            }
            Self::Vehicles => {
                r#"SELECT DISTINCT "EQUIPAMENTO"::text AS label FROM pecas_gerais
                   WHERE "EQUIPAMENTO" IS NOT NULL ORDER BY label"#
            }
            Self::PartGroups => {
                r#"SELECT DISTINCT "GRUPO"::text AS label FROM pecas_gerais
                   WHERE "GRUPO" IS NOT NULL ORDER BY label"#
            }
            Self::Lines => {
                r#"SELECT DISTINCT linhanumero::text AS label FROM rmtc_linha_info
                   WHERE linhanumero IS NOT NULL ORDER BY label"#
            }
        }
    }
}

pub async fn list(conn: &mut AsyncPgConnection, catalog: Catalog) -> anyhow::Result<Vec<String>> {
    let rows: Vec<LabelRow> = diesel::sql_query(catalog.sql()).load(conn).await?;
    Ok(labels(rows))
}

/// Service descriptions with the section each belongs to.
pub async fn list_services(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<ServiceLabelRow>> {
    let rows = diesel::sql_query(
        r#"SELECT DISTINCT
               "DESCRICAO DA SECAO"::text AS section,
               "DESCRICAO DO SERVICO"::text AS label
           FROM mat_view_retrabalho_10_dias
           WHERE "DESCRICAO DO SERVICO" IS NOT NULL
           ORDER BY label"#,
    )
    .load(conn)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for catalog in Catalog::ALL {
            assert_eq!(Catalog::from_name(catalog.name()), Some(catalog));
        }
        assert_eq!(Catalog::from_name("mechanics"), None);
    }

    #[test]
    fn every_catalog_is_distinct_ordered_and_drops_nulls() {
        for catalog in Catalog::ALL {
            let sql = catalog.sql();
            assert!(sql.starts_with("SELECT DISTINCT"), "{}", catalog.name());
            assert!(sql.contains("AS label"), "{}", catalog.name());
            assert!(sql.contains("IS NOT NULL"), "{}", catalog.name());
            assert!(sql.trim_end().ends_with("ORDER BY label"), "{}", catalog.name());
        }
    }
}
