use crate::password::Credentials;
use crate::user::{self, Email, RegisterError, UserStore};

/// Registers `test-1@user.net` and `test-2@user.net`, with passwords `test-1` and `test-2`.
/// Users that already exist are left alone.
pub async fn seed_development_data<S: UserStore + ?Sized>(
    store: &S,
    credentials: &Credentials,
) -> Result<(), RegisterError> {
    seed_test_user(store, credentials, 1).await?;
    seed_test_user(store, credentials, 2).await?;
    Ok(())
}

async fn seed_test_user<S: UserStore + ?Sized>(
    store: &S,
    credentials: &Credentials,
    index: u32,
) -> Result<(), RegisterError> {
    let email = Email(format!("test-{}@user.net", index));
    if store.find_user_by_email(&email).await?.is_some() {
        return Ok(());
    }
    match user::register(
        store,
        credentials,
        format!("Test User {}", index),
        email,
        &format!("test-{}", index),
    )
    .await
    {
        Ok(user) => {
            log::info!("seeded test user {:?}", user.id);
            Ok(())
        }
        Err(RegisterError::DuplicateEmail(_)) => Ok(()),
        Err(e) => Err(e),
    }
}
