// src/services/bulk_generator.rs

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::work_orders::{QuantityCell, SubJobDraft};

/// Um departamento selecionado, com suas etapas (já ordenadas) e todas as suas equipes.
#[derive(Debug, Clone)]
pub struct DepartmentPlan {
    pub department_id: Uuid,
    pub work_step_ids: Vec<Uuid>,
    pub team_ids: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct GeneratorInput {
    pub product_name: String,
    pub production_cost: Decimal,
    pub departments: Vec<DepartmentPlan>,
    pub selected_team_ids: HashSet<Uuid>,
    pub color_ids: Vec<Uuid>,
    pub size_ids: Vec<Uuid>,
    /// (departamento, cor, tamanho) -> quantidade
    pub quantities: HashMap<(Uuid, Uuid, Uuid), i32>,
}

pub fn quantity_matrix(cells: &[QuantityCell]) -> HashMap<(Uuid, Uuid, Uuid), i32> {
    cells
        .iter()
        .map(|c| ((c.department_id, c.color_id, c.size_id), c.quantity))
        .collect()
}

/// Expande departamento × etapa × cor × tamanho × equipe em rascunhos.
///
/// Só entram combinações com quantidade > 0. Se nenhuma equipe do departamento
/// foi selecionada, sai um rascunho sem equipe por combinação.
pub fn generate_sub_job_drafts(input: &GeneratorInput) -> Vec<SubJobDraft> {
    let mut drafts = Vec::new();

    for department in &input.departments {
        let teams: Vec<Option<Uuid>> = {
            let selected: Vec<Option<Uuid>> = department
                .team_ids
                .iter()
                .filter(|id| input.selected_team_ids.contains(id))
                .map(|id| Some(*id))
                .collect();
            if selected.is_empty() { vec![None] } else { selected }
        };

        for work_step_id in &department.work_step_ids {
            for color_id in &input.color_ids {
                for size_id in &input.size_ids {
                    let quantity = input
                        .quantities
                        .get(&(department.department_id, *color_id, *size_id))
                        .copied()
                        .unwrap_or(0);
                    if quantity <= 0 {
                        continue;
                    }

                    for team_id in &teams {
                        drafts.push(SubJobDraft {
                            product_name: input.product_name.clone(),
                            department_id: department.department_id,
                            work_step_id: *work_step_id,
                            team_id: *team_id,
                            color_id: *color_id,
                            size_id: *size_id,
                            quantity,
                            production_cost: input.production_cost,
                            total_cost: Decimal::from(quantity) * input.production_cost,
                        });
                    }
                }
            }
        }
    }

    drafts
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        dept: Uuid,
        steps: Vec<Uuid>,
        teams: Vec<Uuid>,
        colors: Vec<Uuid>,
        sizes: Vec<Uuid>,
    }

    fn fixture() -> Fixture {
        Fixture {
            dept: Uuid::new_v4(),
            steps: vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()],
            teams: vec![Uuid::new_v4(), Uuid::new_v4()],
            colors: vec![Uuid::new_v4(), Uuid::new_v4()],
            sizes: vec![Uuid::new_v4(), Uuid::new_v4()],
        }
    }

    fn input(f: &Fixture, selected: &[Uuid], qty: i32) -> GeneratorInput {
        let mut quantities = HashMap::new();
        for c in &f.colors {
            for s in &f.sizes {
                quantities.insert((f.dept, *c, *s), qty);
            }
        }
        GeneratorInput {
            product_name: "Polo".to_string(),
            production_cost: Decimal::from(5),
            departments: vec![DepartmentPlan {
                department_id: f.dept,
                work_step_ids: f.steps.clone(),
                team_ids: f.teams.clone(),
            }],
            selected_team_ids: selected.iter().copied().collect(),
            color_ids: f.colors.clone(),
            size_ids: f.sizes.clone(),
            quantities,
        }
    }

    #[test]
    fn without_teams_emits_one_draft_per_step_color_size() {
        let f = fixture();
        let drafts = generate_sub_job_drafts(&input(&f, &[], 10));

        assert_eq!(drafts.len(), f.steps.len() * 2 * 2);
        assert!(drafts.iter().all(|d| d.team_id.is_none()));
        assert!(drafts.iter().all(|d| d.total_cost == Decimal::from(50)));
    }

    #[test]
    fn multiplies_by_selected_teams_of_the_department() {
        let f = fixture();
        let outsider = Uuid::new_v4();
        let drafts = generate_sub_job_drafts(&input(&f, &[f.teams[0], f.teams[1], outsider], 1));

        assert_eq!(drafts.len(), f.steps.len() * 2 * 2 * 2);
        assert!(drafts.iter().all(|d| d.team_id != Some(outsider)));
    }

    #[test]
    fn skips_cells_without_positive_quantity() {
        let f = fixture();
        let mut gen_input = input(&f, &[], 3);
        gen_input.quantities.insert((f.dept, f.colors[0], f.sizes[0]), 0);
        gen_input.quantities.remove(&(f.dept, f.colors[1], f.sizes[1]));

        let drafts = generate_sub_job_drafts(&gen_input);
        assert_eq!(drafts.len(), f.steps.len() * 2);
    }

    #[test]
    fn builds_matrix_from_cells() {
        let (d, c, s) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let matrix = quantity_matrix(&[QuantityCell { department_id: d, color_id: c, size_id: s, quantity: 7 }]);
        assert_eq!(matrix.get(&(d, c, s)), Some(&7));
    }
}
