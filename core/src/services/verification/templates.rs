//! Email bodies per code purpose. Users are Brazilian, so copy is pt-BR.

use crate::domain::entities::user::User;
use crate::domain::entities::verification_token::TokenPurpose;

use super::traits::EmailMessage;

fn subject(purpose: TokenPurpose) -> &'static str {
    match purpose {
        TokenPurpose::EmailVerification => "Verificação de Email - Sombreando",
        TokenPurpose::PasswordReset => "Reset de Senha - Sombreando",
        TokenPurpose::Login2fa => "Código de Verificação - Sombreando",
        TokenPurpose::AccountChange => "Verificação de Mudança de Conta - Sombreando",
    }
}

pub fn render_verification_email(
    user: &User,
    purpose: TokenPurpose,
    code: &str,
    expiration_hours: i64,
) -> EmailMessage {
    let body = format!(
        "Olá {name},\n\n\
         Seu código de verificação é: {code}\n\n\
         Este código expira em {hours} horas.\n\n\
         Se você não solicitou este código, ignore este email.\n\n\
         Atenciosamente,\n\
         Equipe Sombreando\n",
        name = user.first_name,
        code = code,
        hours = expiration_hours,
    );

    EmailMessage {
        to: user.email.clone(),
        subject: subject(purpose).to_string(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_code_and_name() {
        let user = User::new(
            "ana@sombreando.com".into(),
            "ana".into(),
            "hash".into(),
            "Ana".into(),
            "Lima".into(),
        );
        let message = render_verification_email(&user, TokenPurpose::PasswordReset, "123456", 24);
        assert_eq!(message.to, "ana@sombreando.com");
        assert_eq!(message.subject, "Reset de Senha - Sombreando");
        assert!(message.body.contains("Olá Ana"));
        assert!(message.body.contains("123456"));
        assert!(message.body.contains("24 horas"));
    }
}
