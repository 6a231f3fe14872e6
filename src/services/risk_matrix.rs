use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{BmcBlock, RiskAssessment, RiskLevel};

#[derive(Debug, Clone, Serialize)]
pub struct RiskCell {
    pub block: BmcBlock,
    pub label: &'static str,
    pub assessment: Option<RiskAssessment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiskSummary {
    pub verde: usize,
    pub amarillo: usize,
    pub rojo: usize,
    pub unassessed: usize,
    /// Worst assessed level, `None` when nothing has been assessed.
    pub overall: Option<RiskLevel>,
}

/// Business Model Canvas risk matrix for one company.
#[derive(Debug, Clone, Serialize)]
pub struct RiskMatrix {
    pub company_id: Uuid,
    pub cells: Vec<RiskCell>,
    pub summary: RiskSummary,
}

impl RiskMatrix {
    pub fn build(company_id: Uuid, assessments: Vec<RiskAssessment>) -> Self {
        let cells: Vec<RiskCell> = BmcBlock::ALL
            .iter()
            .map(|block| RiskCell {
                block: *block,
                label: block.label(),
                assessment: assessments
                    .iter()
                    .find(|a| a.block == *block && a.company_id == company_id)
                    .cloned(),
            })
            .collect();

        let mut summary = RiskSummary::default();
        for cell in &cells {
            match cell.assessment.as_ref().map(|a| a.level) {
                Some(RiskLevel::Verde) => summary.verde += 1,
                Some(RiskLevel::Amarillo) => summary.amarillo += 1,
                Some(RiskLevel::Rojo) => summary.rojo += 1,
                None => summary.unassessed += 1,
            }
        }
        summary.overall = cells
            .iter()
            .filter_map(|c| c.assessment.as_ref().map(|a| a.level))
            .max();

        Self {
            company_id,
            cells,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn assessment(company_id: Uuid, block: BmcBlock, level: RiskLevel) -> RiskAssessment {
        RiskAssessment {
            id: Uuid::new_v4(),
            company_id,
            block,
            level,
            notes: None,
            assessed_by: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_matrix_has_nine_unassessed_cells() {
        let matrix = RiskMatrix::build(Uuid::new_v4(), vec![]);
        assert_eq!(matrix.cells.len(), 9);
        assert_eq!(matrix.summary.unassessed, 9);
        assert_eq!(matrix.summary.overall, None);
    }

    #[test]
    fn cells_follow_canvas_order() {
        let company = Uuid::new_v4();
        let matrix = RiskMatrix::build(
            company,
            vec![
                assessment(company, BmcBlock::FuentesIngresos, RiskLevel::Amarillo),
                assessment(company, BmcBlock::SociosClave, RiskLevel::Verde),
            ],
        );
        assert_eq!(matrix.cells[0].block, BmcBlock::SociosClave);
        assert!(matrix.cells[0].assessment.is_some());
        assert_eq!(matrix.cells[8].block, BmcBlock::FuentesIngresos);
        assert_eq!(matrix.cells[8].label, "Fuentes de ingresos");
    }

    #[test]
    fn summary_counts_and_worst_level() {
        let company = Uuid::new_v4();
        let matrix = RiskMatrix::build(
            company,
            vec![
                assessment(company, BmcBlock::Canales, RiskLevel::Verde),
                assessment(company, BmcBlock::RecursosClave, RiskLevel::Rojo),
                assessment(company, BmcBlock::PropuestaValor, RiskLevel::Amarillo),
                assessment(Uuid::new_v4(), BmcBlock::SociosClave, RiskLevel::Rojo),
            ],
        );
        assert_eq!(
            matrix.summary,
            RiskSummary {
                verde: 1,
                amarillo: 1,
                rojo: 1,
                unassessed: 6,
                overall: Some(RiskLevel::Rojo),
            }
        );
    }
}
