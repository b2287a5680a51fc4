// src/services/cost_calculator.rs

use rust_decimal::Decimal;

use crate::models::organization::{EntityStatus, Employee};

/// Custo diário de um grupo de pessoas.
///
/// ```text
/// base           = count * wage
/// withOverhead   = base + base * overhead%
/// total          = withOverhead + withOverhead * management%
/// ```
///
/// Qualquer entrada ausente devolve 0. Valores negativos não são rejeitados aqui
/// (a validação dos payloads cuida disso).
pub fn daily_cost(
    count: Option<Decimal>,
    wage: Option<Decimal>,
    overhead_pct: Option<Decimal>,
    management_pct: Option<Decimal>,
) -> Decimal {
    let (Some(count), Some(wage), Some(overhead_pct), Some(management_pct)) =
        (count, wage, overhead_pct, management_pct)
    else {
        return Decimal::ZERO;
    };

    let base = count * wage;
    let overhead_cost = base * (overhead_pct / Decimal::ONE_HUNDRED);
    let with_overhead = base + overhead_cost;
    let management_cost = with_overhead * (management_pct / Decimal::ONE_HUNDRED);

    with_overhead + management_cost
}

impl Employee {
    pub fn daily_cost(&self) -> Decimal {
        daily_cost(
            Some(Decimal::from(self.count)),
            Some(self.average_wage),
            Some(self.overhead_percentage),
            Some(self.management_percentage),
        )
    }
}

/// Soma o custo dos registros ativos da equipe. Devolve (headcount, custo).
pub fn team_daily_cost(employees: &[Employee]) -> (i64, Decimal) {
    employees
        .iter()
        .filter(|e| e.status == EntityStatus::Active)
        .fold((0, Decimal::ZERO), |(headcount, total), e| {
            (headcount + i64::from(e.count), total + e.daily_cost())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    fn d(v: i64) -> Option<Decimal> {
        Some(Decimal::from(v))
    }

    fn employee(count: i32, wage: i64, status: EntityStatus) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            count,
            average_wage: Decimal::from(wage),
            overhead_percentage: Decimal::from(15),
            management_percentage: Decimal::from(10),
            description: None,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn applies_overhead_then_management_on_top() {
        // 5 * 400 * 1.15 * 1.10
        assert_eq!(daily_cost(d(5), d(400), d(15), d(10)), Decimal::from(2530));
    }

    #[test]
    fn zero_percentages_return_base_cost() {
        assert_eq!(daily_cost(d(3), d(350), d(0), d(0)), Decimal::from(1050));
    }

    #[rstest]
    #[case(None, d(400), d(15), d(10))]
    #[case(d(5), None, d(15), d(10))]
    #[case(d(5), d(400), None, d(10))]
    #[case(d(5), d(400), d(15), None)]
    fn any_missing_input_costs_zero(
        #[case] count: Option<Decimal>,
        #[case] wage: Option<Decimal>,
        #[case] overhead: Option<Decimal>,
        #[case] management: Option<Decimal>,
    ) {
        assert_eq!(daily_cost(count, wage, overhead, management), Decimal::ZERO);
    }

    #[test]
    fn negative_wage_is_not_rejected() {
        assert_eq!(daily_cost(d(1), d(-100), d(0), d(0)), Decimal::from(-100));
    }

    #[test]
    fn team_cost_ignores_inactive_records() {
        let employees = vec![
            employee(5, 400, EntityStatus::Active),
            employee(2, 500, EntityStatus::Inactive),
        ];
        let (headcount, cost) = team_daily_cost(&employees);
        assert_eq!(headcount, 5);
        assert_eq!(cost, Decimal::from(2530));
    }
}
