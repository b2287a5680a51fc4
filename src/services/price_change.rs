// src/services/price_change.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::work_orders::{EditedSubJob, SubJob};

/// Foto do preço de um sub-job tirada quando a ordem foi carregada.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub id: Uuid,
    pub product_name: String,
    pub color_id: Uuid,
    pub size_id: Uuid,
    pub production_cost: Decimal,
}

impl From<&SubJob> for PriceSnapshot {
    fn from(sub_job: &SubJob) -> Self {
        Self {
            id: sub_job.id,
            product_name: sub_job.product_name.clone(),
            color_id: sub_job.color_id,
            size_id: sub_job.size_id,
            production_cost: sub_job.production_cost,
        }
    }
}

fn find_match<'a>(original: &'a [PriceSnapshot], edited: &EditedSubJob) -> Option<&'a PriceSnapshot> {
    let by_id = edited
        .id
        .and_then(|id| original.iter().find(|snap| snap.id == id));

    // Sub-job novo (sem id): compara por (produto, cor, tamanho)
    by_id.or_else(|| {
        original.iter().find(|snap| {
            snap.product_name == edited.product_name
                && edited.color_id == Some(snap.color_id)
                && edited.size_id == Some(snap.size_id)
        })
    })
}

/// `true` se algum sub-job editado tem custo de produção diferente do original.
/// Itens sem correspondência não contam.
pub fn detect_price_change(original: &[PriceSnapshot], edited: &[EditedSubJob]) -> bool {
    edited.iter().any(|current| {
        find_match(original, current)
            .is_some_and(|snap| snap.production_cost != current.production_cost)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(id: Uuid, name: &str, color: Uuid, size: Uuid, cost: i64) -> PriceSnapshot {
        PriceSnapshot {
            id,
            product_name: name.to_string(),
            color_id: color,
            size_id: size,
            production_cost: Decimal::from(cost),
        }
    }

    fn edited(id: Option<Uuid>, name: &str, color: Uuid, size: Uuid, cost: i64) -> EditedSubJob {
        EditedSubJob {
            id,
            product_name: name.to_string(),
            color_id: Some(color),
            size_id: Some(size),
            production_cost: Decimal::from(cost),
        }
    }

    #[test]
    fn flags_cost_change_on_same_id() {
        let (id, color, size) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let original = vec![snap(id, "Polo", color, size, 10)];

        assert!(detect_price_change(&original, &[edited(Some(id), "Polo", color, size, 12)]));
        assert!(!detect_price_change(&original, &[edited(Some(id), "Polo", color, size, 10)]));
    }

    #[test]
    fn falls_back_to_product_color_size_without_id() {
        let (color, size) = (Uuid::new_v4(), Uuid::new_v4());
        let original = vec![snap(Uuid::new_v4(), "Polo", color, size, 10)];

        assert!(detect_price_change(&original, &[edited(None, "Polo", color, size, 11)]));
        // outro tamanho: sem correspondência, não conta
        assert!(!detect_price_change(&original, &[edited(None, "Polo", color, Uuid::new_v4(), 11)]));
    }

    #[test]
    fn id_match_takes_precedence_over_tuple_match() {
        let (color, size) = (Uuid::new_v4(), Uuid::new_v4());
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let original = vec![snap(first, "Polo", color, size, 10), snap(second, "Polo", color, size, 15)];

        // mesmo produto/cor/tamanho que `first`, mas o id aponta para `second` com o mesmo preço
        assert!(!detect_price_change(&original, &[edited(Some(second), "Polo", color, size, 15)]));
    }

    #[test]
    fn non_numeric_cost_compares_as_zero() {
        let (id, color, size) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let original = vec![snap(id, "Polo", color, size, 0)];
        let parsed: EditedSubJob = serde_json::from_value(serde_json::json!({
            "id": id,
            "productName": "Polo",
            "productionCost": "n/a"
        }))
        .unwrap();

        assert!(!detect_price_change(&original, &[parsed]));
    }

    #[test]
    fn empty_edit_list_has_no_change() {
        let original = vec![snap(Uuid::new_v4(), "Polo", Uuid::new_v4(), Uuid::new_v4(), 10)];
        assert!(!detect_price_change(&original, &[]));
    }
}
