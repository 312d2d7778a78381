use crate::domain::{Actor, Registration};

use super::{Result, ServiceDependencies};

/// 会員登録
///
/// 入力を検証してから名簿に送信し、発行された資格情報でログインする。
/// 検証に失敗した場合は送信しない。
#[tracing::instrument(skip(deps, registration), fields(email = %registration.email))]
pub async fn register(deps: &ServiceDependencies, registration: Registration) -> Result<Actor> {
    registration.validate(deps.config.min_password_length)?;

    let enrollment = deps.directory.register(registration).await?;
    let actor = enrollment.actor();
    deps.session.sign_in(actor.clone()).await;

    tracing::info!(role = %actor.role(), "registered");
    Ok(actor)
}
