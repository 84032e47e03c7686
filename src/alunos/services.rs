use tracing::{debug, info, warn};

use crate::alunos::{
    password,
    repo::StudentStore,
    repo_types::Aluno,
};
use crate::errors::ApiError;

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Resolve the login identifier to a record.
///
/// Tries, in order: the normalized email, the email exactly as supplied and,
/// when `name_fallback` is set, the supplied value as a student name. The first
/// hit wins.
pub async fn resolve_aluno(
    store: &dyn StudentStore,
    email: &str,
    name_fallback: bool,
) -> anyhow::Result<Option<Aluno>> {
    let email_norm = normalize_email(email);
    debug!(email_raw = %email, email_norm = %email_norm, "trying login");

    if let Some(aluno) = store.find_unique_by_email(&email_norm).await? {
        return Ok(Some(aluno));
    }

    debug!("normalized lookup failed, trying fallbacks");
    let mut found = store.find_first_by_email(email).await?;
    if found.is_none() && name_fallback {
        found = store.find_first_by_name(email).await?;
    }
    debug!(
        found = found.is_some(),
        id = ?found.as_ref().map(|a| a.id_aluno),
        "fallback result"
    );
    Ok(found)
}

/// Full credential check. Unknown account and wrong password both end in
/// `ApiError::AuthenticationFailed`.
pub async fn authenticate(
    store: &dyn StudentStore,
    email: &str,
    senha: &str,
    name_fallback: bool,
) -> Result<Aluno, ApiError> {
    let Some(aluno) = resolve_aluno(store, email, name_fallback).await? else {
        warn!("login unknown account");
        return Err(ApiError::AuthenticationFailed);
    };

    debug!(
        id_aluno = aluno.id_aluno,
        stored_looks_like_hash = aluno.senha.as_deref().is_some_and(password::is_hash_format),
        "aluno found"
    );

    let check = password::verify(senha, aluno.senha.as_deref()).await;
    if !check.is_match() {
        warn!(id_aluno = aluno.id_aluno, "login invalid password");
        return Err(ApiError::AuthenticationFailed);
    }

    info!(id_aluno = aluno.id_aluno, "aluno logged in");
    Ok(aluno)
}
