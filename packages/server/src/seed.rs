use sea_orm::*;
use tracing::info;

use crate::config::SeedConfig;
use crate::entity::{role, role_permission, user};
use crate::utils::hash;

/// Staff roles seeded on startup.
pub const STAFF_ROLES: &[&str] = &["superadmin", "editor", "sales"];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Superadmin: all permissions
    ("superadmin", "service:create"),
    ("superadmin", "service:edit"),
    ("superadmin", "service:delete"),
    ("superadmin", "product:create"),
    ("superadmin", "product:edit"),
    ("superadmin", "product:delete"),
    ("superadmin", "price:manage"),
    ("superadmin", "project:create"),
    ("superadmin", "project:edit"),
    ("superadmin", "project:delete"),
    ("superadmin", "client:create"),
    ("superadmin", "client:edit"),
    ("superadmin", "client:delete"),
    ("superadmin", "post:create"),
    ("superadmin", "post:edit"),
    ("superadmin", "post:delete"),
    ("superadmin", "inquiry:manage"),
    ("superadmin", "settings:edit"),
    ("superadmin", "user:manage"),
    ("superadmin", "dashboard:view"),
    // Editor: content only
    ("editor", "service:create"),
    ("editor", "service:edit"),
    ("editor", "product:create"),
    ("editor", "product:edit"),
    ("editor", "price:manage"),
    ("editor", "project:create"),
    ("editor", "project:edit"),
    ("editor", "client:create"),
    ("editor", "client:edit"),
    ("editor", "post:create"),
    ("editor", "post:edit"),
    ("editor", "post:delete"),
    ("editor", "inquiry:manage"),
    ("editor", "dashboard:view"),
    // Sales: inbound leads
    ("sales", "inquiry:manage"),
    ("sales", "dashboard:view"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_roles_and_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut roles_inserted = 0u32;
    for &name in STAFF_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(role::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => perms_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Create the bootstrap superadmin account, if configured and not present.
pub async fn seed_admin_user(db: &DatabaseConnection, seed: &SeedConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&seed.admin_email, &seed.admin_password) else {
        return Ok(());
    };

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let hashed = hash::hash_password(password)
        .map_err(|e| anyhow::anyhow!("Failed to hash seed admin password: {e}"))?;

    let admin = user::ActiveModel {
        name: Set("Administrator".to_string()),
        email: Set(email.clone()),
        password: Set(hashed),
        role: Set("superadmin".to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    admin.insert(db).await?;

    info!("Seeded bootstrap superadmin account for {email}");
    Ok(())
}
