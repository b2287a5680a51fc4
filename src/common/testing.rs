// src/common/testing.rs

// Dados mínimos para os testes que rodam contra o Postgres (#[sqlx::test]).
// Dois departamentos, cada um com uma etapa e uma equipe.

use sqlx::PgPool;
use uuid::Uuid;

pub struct Factory {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub cutting_department: Uuid,
    pub cutting_step: Uuid,
    pub cutting_team: Uuid,
    pub printing_department: Uuid,
    pub printing_step: Uuid,
    pub printing_team: Uuid,
    pub color_id: Uuid,
    pub size_id: Uuid,
}

async fn insert_returning_id(pool: &PgPool, sql: &str, binds: &[Uuid]) -> sqlx::Result<Uuid> {
    let mut query = sqlx::query_scalar::<_, Uuid>(sql);
    for value in binds {
        query = query.bind(*value);
    }
    query.fetch_one(pool).await
}

pub async fn seed(pool: &PgPool) -> sqlx::Result<Factory> {
    let user_id = insert_returning_id(
        pool,
        "INSERT INTO users (email, password_hash) VALUES ('lider@fabrica.com', 'x') RETURNING id",
        &[],
    )
    .await?;
    let tenant_id = insert_returning_id(pool, "INSERT INTO tenants (name) VALUES ('Fábrica Teste') RETURNING id", &[]).await?;

    let department = "INSERT INTO departments (tenant_id, name, department_type) VALUES ($1, $2, 'production') RETURNING id";
    let cutting_department = sqlx::query_scalar::<_, Uuid>(department)
        .bind(tenant_id)
        .bind("Corte")
        .fetch_one(pool)
        .await?;
    let printing_department = sqlx::query_scalar::<_, Uuid>(department)
        .bind(tenant_id)
        .bind("Estamparia")
        .fetch_one(pool)
        .await?;

    let step = "INSERT INTO work_steps (tenant_id, department_id, name, step_order) VALUES ($1, $2, 'Etapa', 1) RETURNING id";
    let cutting_step = insert_returning_id(pool, step, &[tenant_id, cutting_department]).await?;
    let printing_step = insert_returning_id(pool, step, &[tenant_id, printing_department]).await?;

    let team = "INSERT INTO teams (tenant_id, department_id, name) VALUES ($1, $2, 'Equipe') RETURNING id";
    let cutting_team = insert_returning_id(pool, team, &[tenant_id, cutting_department]).await?;
    let printing_team = insert_returning_id(pool, team, &[tenant_id, printing_department]).await?;

    let color_id = insert_returning_id(
        pool,
        "INSERT INTO colors (tenant_id, name) VALUES ($1, 'Azul') RETURNING id",
        &[tenant_id],
    )
    .await?;
    let size_id = insert_returning_id(
        pool,
        "INSERT INTO sizes (tenant_id, name) VALUES ($1, 'M') RETURNING id",
        &[tenant_id],
    )
    .await?;

    Ok(Factory {
        user_id,
        tenant_id,
        cutting_department,
        cutting_step,
        cutting_team,
        printing_department,
        printing_step,
        printing_team,
        color_id,
        size_id,
    })
}

/// Outra loja com um departamento e uma equipe, para testes de isolamento.
/// Devolve (tenant_id, team_id).
pub async fn other_tenant(pool: &PgPool) -> sqlx::Result<(Uuid, Uuid)> {
    let tenant_id = insert_returning_id(pool, "INSERT INTO tenants (name) VALUES ('Outra Fábrica') RETURNING id", &[]).await?;
    let department = insert_returning_id(
        pool,
        "INSERT INTO departments (tenant_id, name, department_type) VALUES ($1, 'Costura', 'production') RETURNING id",
        &[tenant_id],
    )
    .await?;
    let team = insert_returning_id(
        pool,
        "INSERT INTO teams (tenant_id, department_id, name) VALUES ($1, $2, 'Equipe B') RETURNING id",
        &[tenant_id, department],
    )
    .await?;
    Ok((tenant_id, team))
}
