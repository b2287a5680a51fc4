// src/services/sub_job_sync.rs

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::work_orders::{ReconciliationSummary, SubJobInput},
};

/// Campos gravados num sub-job (insert ou update).
#[derive(Debug, Clone, PartialEq)]
pub struct SubJobValues {
    pub product_name: String,
    pub department_id: Uuid,
    pub work_step_id: Uuid,
    pub color_id: Uuid,
    pub size_id: Uuid,
    pub quantity: i32,
    pub production_cost: Decimal,
    pub total_cost: Decimal,
    pub sort_order: i32,
}

impl SubJobValues {
    /// `position` é 0-based; sort_order vira posição + 1 se não vier explícito.
    pub fn from_input(input: &SubJobInput, position: usize) -> Self {
        let default_order = i32::try_from(position + 1).unwrap_or(i32::MAX);
        Self {
            product_name: input.product_name.clone(),
            department_id: input.department_id,
            work_step_id: input.work_step_id,
            color_id: input.color_id,
            size_id: input.size_id,
            quantity: input.quantity,
            production_cost: input.production_cost,
            total_cost: Decimal::from(input.quantity) * input.production_cost,
            sort_order: input.sort_order.unwrap_or(default_order),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubJobChange {
    Kept { id: Uuid, values: SubJobValues },
    Inserted { values: SubJobValues },
    Deleted { id: Uuid },
}

/// Monta o plano "substituir por diff": a lista recebida é a lista desejada inteira.
///
/// Um id recebido que existe é atualizado no lugar; sem id (ou id desconhecido) é
/// inserido; o que existia e não foi citado é apagado. Um id repetido só conta na
/// primeira ocorrência, as seguintes viram inserts.
pub fn plan_sub_job_sync(existing_ids: &[Uuid], incoming: &[SubJobInput]) -> Vec<SubJobChange> {
    let existing: HashSet<Uuid> = existing_ids.iter().copied().collect();
    let mut kept: HashSet<Uuid> = HashSet::with_capacity(incoming.len());
    let mut changes = Vec::with_capacity(incoming.len() + existing_ids.len());

    for (position, item) in incoming.iter().enumerate() {
        let values = SubJobValues::from_input(item, position);
        match item.id {
            Some(id) if existing.contains(&id) && kept.insert(id) => {
                changes.push(SubJobChange::Kept { id, values });
            }
            _ => changes.push(SubJobChange::Inserted { values }),
        }
    }

    changes.extend(
        existing_ids
            .iter()
            .filter(|id| !kept.contains(id))
            .map(|id| SubJobChange::Deleted { id: *id }),
    );

    changes
}

/// Ids distintos, na ordem em que aparecem.
pub fn distinct_ids(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// A etapa de cada sub-job tem que ser do departamento do próprio sub-job.
/// `step_departments` traz etapa → departamento só das etapas da loja;
/// etapa ausente ali é de outra loja ou não existe.
pub fn check_step_departments(
    incoming: &[SubJobInput],
    step_departments: &HashMap<Uuid, Uuid>,
) -> Result<(), AppError> {
    for item in incoming {
        match step_departments.get(&item.work_step_id) {
            None => return Err(AppError::ResourceNotFound(format!("Work step {}", item.work_step_id))),
            Some(department_id) if *department_id != item.department_id => {
                return Err(AppError::BadRequest(format!(
                    "work step {} does not belong to department {}",
                    item.work_step_id, item.department_id
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

pub fn summarize(changes: &[SubJobChange]) -> ReconciliationSummary {
    changes.iter().fold(ReconciliationSummary::default(), |mut acc, change| {
        match change {
            SubJobChange::Kept { .. } => acc.kept += 1,
            SubJobChange::Inserted { .. } => acc.inserted += 1,
            SubJobChange::Deleted { .. } => acc.deleted += 1,
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: Option<Uuid>, name: &str, quantity: i32, cost: i64) -> SubJobInput {
        SubJobInput {
            id,
            product_name: name.to_string(),
            department_id: Uuid::nil(),
            work_step_id: Uuid::nil(),
            color_id: Uuid::nil(),
            size_id: Uuid::nil(),
            quantity,
            production_cost: Decimal::from(cost),
            sort_order: None,
        }
    }

    #[test]
    fn keeps_matched_inserts_new_and_deletes_the_rest() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let incoming = vec![input(Some(a), "A'", 10, 5), input(None, "D", 4, 3)];

        let plan = plan_sub_job_sync(&[a, b, c], &incoming);

        assert_eq!(plan.len(), 4);
        assert!(matches!(&plan[0], SubJobChange::Kept { id, values } if *id == a && values.product_name == "A'"));
        assert!(matches!(&plan[1], SubJobChange::Inserted { values } if values.product_name == "D"));
        assert_eq!(plan[2], SubJobChange::Deleted { id: b });
        assert_eq!(plan[3], SubJobChange::Deleted { id: c });
        assert_eq!(
            summarize(&plan),
            ReconciliationSummary { kept: 1, inserted: 1, deleted: 2 }
        );
    }

    #[test]
    fn computes_total_cost_and_one_based_sort_order() {
        let plan = plan_sub_job_sync(&[], &[input(None, "X", 3, 7), input(None, "Y", 2, 10)]);
        let SubJobChange::Inserted { values } = &plan[1] else {
            panic!("expected insert");
        };
        assert_eq!(values.total_cost, Decimal::from(20));
        assert_eq!(values.sort_order, 2);
    }

    #[test]
    fn explicit_sort_order_wins_over_position() {
        let mut item = input(None, "X", 1, 1);
        item.sort_order = Some(9);
        let plan = plan_sub_job_sync(&[], &[item]);
        assert!(matches!(&plan[0], SubJobChange::Inserted { values } if values.sort_order == 9));
    }

    #[test]
    fn unknown_ids_are_inserted() {
        let stranger = Uuid::new_v4();
        let plan = plan_sub_job_sync(&[], &[input(Some(stranger), "X", 1, 1)]);
        assert!(matches!(plan[0], SubJobChange::Inserted { .. }));
    }

    #[test]
    fn repeated_id_is_only_kept_once() {
        let a = Uuid::new_v4();
        let plan = plan_sub_job_sync(&[a], &[input(Some(a), "A1", 1, 1), input(Some(a), "A2", 1, 1)]);
        assert_eq!(summarize(&plan), ReconciliationSummary { kept: 1, inserted: 1, deleted: 0 });
    }

    #[test]
    fn step_must_belong_to_the_sub_job_department() {
        let (cutting, printing) = (Uuid::new_v4(), Uuid::new_v4());
        let (cut_step, print_step) = (Uuid::new_v4(), Uuid::new_v4());
        let steps = HashMap::from([(cut_step, cutting), (print_step, printing)]);

        let mut ok = input(None, "X", 1, 1);
        ok.department_id = cutting;
        ok.work_step_id = cut_step;
        assert!(check_step_departments(&[ok.clone()], &steps).is_ok());

        let mut crossed = ok.clone();
        crossed.work_step_id = print_step;
        assert!(matches!(
            check_step_departments(&[ok.clone(), crossed], &steps),
            Err(AppError::BadRequest(_))
        ));

        let mut foreign = ok;
        foreign.work_step_id = Uuid::new_v4();
        assert!(matches!(
            check_step_departments(&[foreign], &steps),
            Err(AppError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn distinct_ids_keeps_first_occurrence_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(distinct_ids([a, b, a, b]), vec![a, b]);
    }

    #[test]
    fn empty_list_deletes_everything() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let plan = plan_sub_job_sync(&[a, b], &[]);
        assert_eq!(plan, vec![SubJobChange::Deleted { id: a }, SubJobChange::Deleted { id: b }]);
    }
}
