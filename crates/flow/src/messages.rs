//! User-facing message catalog (pt-BR)
//!
//! Every [`FailureClass`] maps to a distinct title/description pair plus the
//! recovery affordance the screen should render. Copy lives only here.

use notapay_gateway::DeclineCode;

use crate::classify::{BusinessRule, FailureClass};

/// Recovery affordance offered alongside an error message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Keep the flow open and let the user trigger the action again
    Retry,
    /// Collect a (different) payment credential
    AddCard,
    /// Point the user at the support channel
    ContactSupport,
}

/// Localized copy for one failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub title: &'static str,
    pub description: &'static str,
    pub action: RecoveryAction,
}

/// Resolve the catalog entry for a classified failure
pub fn user_message(class: &FailureClass) -> UserMessage {
    match class {
        FailureClass::CredentialRequired => UserMessage {
            title: "Cadastre um cartão",
            description: "Para emitir notas no plano por uso, adicione um cartão de crédito.",
            action: RecoveryAction::AddCard,
        },
        FailureClass::CredentialRejected(reason) => decline_message(*reason),
        FailureClass::StepUpRequired { .. } => UserMessage {
            title: "Autenticação necessária",
            description: "Seu banco exige uma verificação adicional. Tente novamente para concluir a autenticação.",
            action: RecoveryAction::Retry,
        },
        FailureClass::BusinessRuleViolation(rule) => business_message(*rule),
        FailureClass::Transient => UserMessage {
            title: "Falha temporária",
            description: "Não foi possível concluir a operação. Verifique sua conexão e tente novamente.",
            action: RecoveryAction::Retry,
        },
        FailureClass::Unknown => UserMessage {
            title: "Erro inesperado",
            description: "Algo deu errado ao processar sua solicitação. Tente novamente ou fale com o suporte.",
            action: RecoveryAction::ContactSupport,
        },
    }
}

fn decline_message(reason: DeclineCode) -> UserMessage {
    let description = match reason {
        DeclineCode::InsufficientFunds => {
            "Seu cartão está sem saldo suficiente. Use outro cartão ou tente novamente mais tarde."
        }
        DeclineCode::ExpiredCard => "O cartão informado está vencido. Use outro cartão.",
        DeclineCode::IncorrectCvc => "O código de segurança informado está incorreto.",
        DeclineCode::IncorrectNumber => "O número do cartão informado está incorreto.",
        DeclineCode::ProcessingError => {
            "Houve um erro ao processar o cartão. Tente novamente em instantes."
        }
        DeclineCode::CardDeclined => {
            "O cartão foi recusado pelo emissor. Use outro cartão ou contate seu banco."
        }
    };
    UserMessage {
        title: "Pagamento recusado",
        description,
        action: RecoveryAction::AddCard,
    }
}

fn business_message(rule: BusinessRule) -> UserMessage {
    match rule {
        BusinessRule::CompanyNotConfigured => UserMessage {
            title: "Empresa não configurada",
            description: "Configure os dados fiscais da sua empresa antes de emitir notas.",
            action: RecoveryAction::Retry,
        },
        BusinessRule::FiscalError => UserMessage {
            title: "Erro na prefeitura",
            description: "A prefeitura recusou a emissão da nota. Verifique os dados e tente novamente.",
            action: RecoveryAction::Retry,
        },
        BusinessRule::InvalidClient => UserMessage {
            title: "Tomador inválido",
            description: "Os dados do tomador são inválidos. Verifique o CPF/CNPJ e tente novamente.",
            action: RecoveryAction::Retry,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_copy_mentions_balance() {
        let msg = user_message(&FailureClass::CredentialRejected(
            DeclineCode::InsufficientFunds,
        ));
        assert!(msg.description.contains("saldo"));
        assert_ne!(msg.description, user_message(&FailureClass::Unknown).description);
    }

    #[test]
    fn test_each_class_has_distinct_copy() {
        let classes = [
            FailureClass::CredentialRequired,
            FailureClass::CredentialRejected(DeclineCode::CardDeclined),
            FailureClass::StepUpRequired {
                client_secret: "pi_1_secret_2".to_string(),
            },
            FailureClass::BusinessRuleViolation(BusinessRule::FiscalError),
            FailureClass::Transient,
            FailureClass::Unknown,
        ];
        let mut seen = std::collections::HashSet::new();
        for class in &classes {
            assert!(seen.insert(user_message(class).description));
        }
    }

    #[test]
    fn test_unknown_points_at_support() {
        assert_eq!(
            user_message(&FailureClass::Unknown).action,
            RecoveryAction::ContactSupport
        );
    }

    #[test]
    fn test_credential_required_offers_add_card() {
        assert_eq!(
            user_message(&FailureClass::CredentialRequired).action,
            RecoveryAction::AddCard
        );
    }
}
