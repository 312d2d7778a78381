use serde::{Deserialize, Serialize};

use super::{MemberId, RegistrationError, StaffId};

/// 利用者のロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// 未ログイン
    Unauthenticated,
    /// 会員
    Member,
    /// 司書
    Librarian,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Unauthenticated => "unauthenticated",
            Role::Member => "member",
            Role::Librarian => "librarian",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ベアラートークン
///
/// ログイン・登録時に外部のセッション協力者が取得する不透明な値。
/// 中身は解釈せず、書き込み要求に添付するだけ。
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Authorizationヘッダー用の表現
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// トークンをログに出さない
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// 現在の操作主体
///
/// セッション協力者が解決する。資格情報が無い・期限切れの場合は`Unauthenticated`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Unauthenticated,
    Member {
        member_id: MemberId,
        credential: Credential,
    },
    Librarian {
        staff_id: StaffId,
        credential: Credential,
    },
}

impl Actor {
    pub fn member(member_id: MemberId, credential: Credential) -> Self {
        Actor::Member {
            member_id,
            credential,
        }
    }

    pub fn librarian(staff_id: StaffId, credential: Credential) -> Self {
        Actor::Librarian {
            staff_id,
            credential,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Actor::Unauthenticated => Role::Unauthenticated,
            Actor::Member { .. } => Role::Member,
            Actor::Librarian { .. } => Role::Librarian,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Actor::Unauthenticated => None,
            Actor::Member { credential, .. } | Actor::Librarian { credential, .. } => {
                Some(credential)
            }
        }
    }

    pub fn member_id(&self) -> Option<MemberId> {
        match self {
            Actor::Member { member_id, .. } => Some(*member_id),
            _ => None,
        }
    }

    pub fn staff_id(&self) -> Option<StaffId> {
        match self {
            Actor::Librarian { staff_id, .. } => Some(*staff_id),
            _ => None,
        }
    }
}

/// 会員登録の入力
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    /// 登録入力を検証する（純粋関数）
    ///
    /// ビジネスルール：
    /// - すべての項目が入力されていること
    /// - メールアドレスに`@`が含まれること
    /// - パスワードが`min_password_length`文字以上であること
    /// - 確認用パスワードが一致すること
    pub fn validate(&self, min_password_length: usize) -> Result<(), RegistrationError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() || self.confirm_password.is_empty() {
            return Err(RegistrationError::MissingField);
        }
        if !email.contains('@') {
            return Err(RegistrationError::InvalidEmail);
        }
        if self.password != self.confirm_password {
            return Err(RegistrationError::PasswordMismatch);
        }
        if self.password.chars().count() < min_password_length {
            return Err(RegistrationError::PasswordTooShort {
                min_length: min_password_length,
            });
        }
        Ok(())
    }
}

/// アカウントID - 会員は`MemberId`、司書は`StaffId`で識別する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum AccountId {
    Member(MemberId),
    Librarian(StaffId),
}

impl AccountId {
    pub fn role(&self) -> Role {
        match self {
            AccountId::Member(_) => Role::Member,
            AccountId::Librarian(_) => Role::Librarian,
        }
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountId::Member(id) => write!(f, "member {}", id),
            AccountId::Librarian(id) => write!(f, "librarian {}", id),
        }
    }
}

/// 登録済みのアカウント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub email: String,
}

impl Account {
    pub fn role(&self) -> Role {
        self.account_id.role()
    }

    /// 資格情報と組み合わせて操作主体にする
    pub fn actor(&self, credential: Credential) -> Actor {
        match self.account_id {
            AccountId::Member(member_id) => Actor::member(member_id, credential),
            AccountId::Librarian(staff_id) => Actor::librarian(staff_id, credential),
        }
    }
}

/// 登録・ログインの結果：アカウントと発行された資格情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub account: Account,
    pub credential: Credential,
}

impl Enrollment {
    pub fn actor(&self) -> Actor {
        self.account.actor(self.credential.clone())
    }
}

/// 司書が作成するアカウントの入力
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewAccount {
    /// 入力を検証する（純粋関数）
    ///
    /// 確認用パスワードが無い点を除き、会員登録と同じ規則。
    pub fn validate(&self, min_password_length: usize) -> Result<(), RegistrationError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(RegistrationError::MissingField);
        }
        if !email.contains('@') {
            return Err(RegistrationError::InvalidEmail);
        }
        if self.password.chars().count() < min_password_length {
            return Err(RegistrationError::PasswordTooShort {
                min_length: min_password_length,
            });
        }
        Ok(())
    }

    /// 実際に付与するロール。司書以外の指定はすべて会員になる
    pub fn granted_role(&self) -> Role {
        match self.role {
            Role::Librarian => Role::Librarian,
            Role::Member | Role::Unauthenticated => Role::Member,
        }
    }
}
