use bcrypt::hash;
use tracing::{debug, info};

use crate::models::auth::UserRole;
use crate::models::user::NewUser;
use crate::repositories::UserStore;
use crate::utils::errors::{AppError, AppResult};

/// Usuarios de demostración: (usuario, contraseña, rol)
const DEMO_USERS: &[(&str, &str, UserRole)] = &[
    ("admin", "admin", UserRole::Admin),
    ("editor", "editorpassword", UserRole::Editor),
    ("student", "studentpassword", UserRole::Student),
    ("driver1", "driverpass1", UserRole::Driver),
    ("driver2", "driverpass2", UserRole::Driver),
    ("driver3", "driverpass3", UserRole::Driver),
];

/// Coste bcrypt reducido: son cuentas de desarrollo
const DEMO_HASH_COST: u32 = 6;

/// Crea las cuentas de demostración que falten. Devuelve cuántas creó.
pub async fn seed_demo_users(users: &dyn UserStore) -> AppResult<usize> {
    let mut created = 0;

    for (username, password, role) in DEMO_USERS {
        if users.find_user_by_username(username).await?.is_some() {
            debug!("👤 {} ya existe, se omite", username);
            continue;
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash(password, DEMO_HASH_COST))
            .await
            .map_err(|e| AppError::Internal(format!("Hash task failed: {}", e)))?
            .map_err(|e| AppError::Hash(e.to_string()))?;

        users
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash,
                role: *role,
            })
            .await?;
        created += 1;
    }

    if created > 0 {
        info!("🌱 {} usuarios de demostración creados", created);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryStore::new();

        assert_eq!(seed_demo_users(&store).await.unwrap(), DEMO_USERS.len());
        assert_eq!(seed_demo_users(&store).await.unwrap(), 0);

        let drivers = store.list_users_by_role(UserRole::Driver).await.unwrap();
        let names: Vec<&str> = drivers.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["driver1", "driver2", "driver3"]);

        let admin = store.find_user_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert!(bcrypt::verify("admin", &admin.password_hash).unwrap());
    }
}
