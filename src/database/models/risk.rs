use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The nine Business Model Canvas blocks, used as a fixed risk taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "bmc_block", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BmcBlock {
    SociosClave,
    ActividadesClave,
    RecursosClave,
    PropuestaValor,
    RelacionesClientes,
    Canales,
    SegmentosClientes,
    EstructuraCostes,
    FuentesIngresos,
}

impl BmcBlock {
    /// Canvas order, left to right then bottom row.
    pub const ALL: [BmcBlock; 9] = [
        BmcBlock::SociosClave,
        BmcBlock::ActividadesClave,
        BmcBlock::RecursosClave,
        BmcBlock::PropuestaValor,
        BmcBlock::RelacionesClientes,
        BmcBlock::Canales,
        BmcBlock::SegmentosClientes,
        BmcBlock::EstructuraCostes,
        BmcBlock::FuentesIngresos,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BmcBlock::SociosClave => "Socios clave",
            BmcBlock::ActividadesClave => "Actividades clave",
            BmcBlock::RecursosClave => "Recursos clave",
            BmcBlock::PropuestaValor => "Propuesta de valor",
            BmcBlock::RelacionesClientes => "Relaciones con clientes",
            BmcBlock::Canales => "Canales",
            BmcBlock::SegmentosClientes => "Segmentos de clientes",
            BmcBlock::EstructuraCostes => "Estructura de costes",
            BmcBlock::FuentesIngresos => "Fuentes de ingresos",
        }
    }
}

/// Traffic-light risk level. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "risk_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Verde,
    Amarillo,
    Rojo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RiskAssessment {
    pub id: Uuid,
    pub company_id: Uuid,
    pub block: BmcBlock,
    pub level: RiskLevel,
    pub notes: Option<String>,
    pub assessed_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiskInput {
    pub level: RiskLevel,
    pub notes: Option<String>,
}
