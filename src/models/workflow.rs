// src/models/workflow.rs
//
// Máquina de estados compartilhada pelos documentos operacionais. Cada
// status implementa o trait com sua tabela de transições; a validação de
// pré-condição fica num lugar só em vez de repetida em cada endpoint.

use crate::common::error::AppError;
use crate::models::inventory::TransferStatus;
use crate::models::operations::{OrderStatus, ReceivingStatus, ReturnStatus, ShipmentStatus};

// O 'static garante que as tabelas de transição possam viver em slices
// estáticos devolvidos por allowed_transitions.
pub trait Workflow: Sized + Copy + PartialEq + 'static {
    /// Nome legível do documento, usado nas mensagens de erro.
    const DOCUMENT: &'static str;

    /// Estados alcançáveis a partir deste.
    fn allowed_transitions(self) -> &'static [Self];

    /// Valor do status no formato da API (snake_case).
    fn label(self) -> &'static str;

    fn can_transition(self, to: Self) -> bool {
        self.allowed_transitions().contains(&to)
    }

    fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Erro 400 com mensagem pronta quando a transição não é permitida.
    fn ensure(self, to: Self) -> Result<(), AppError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(AppError::PreconditionFailed(format!(
                "{} com status '{}' não pode mudar para '{}'.",
                Self::DOCUMENT,
                self.label(),
                to.label(),
            )))
        }
    }
}

impl Workflow for TransferStatus {
    const DOCUMENT: &'static str = "Transferência";

    fn allowed_transitions(self) -> &'static [Self] {
        use TransferStatus::*;
        match self {
            Pending => &[Approved, Cancelled],
            Approved => &[InTransit, Completed, Cancelled],
            InTransit => &[Completed],
            Completed => &[],
            Cancelled => &[],
        }
    }

    fn label(self) -> &'static str {
        use TransferStatus::*;
        match self {
            Pending => "pending",
            Approved => "approved",
            InTransit => "in_transit",
            Completed => "completed",
            Cancelled => "cancelled",
        }
    }
}

impl Workflow for ReceivingStatus {
    const DOCUMENT: &'static str = "Recebimento";

    fn allowed_transitions(self) -> &'static [Self] {
        use ReceivingStatus::*;
        match self {
            Draft => &[Received],
            Received => &[Inspected],
            Inspected => &[Approved, Rejected],
            Approved => &[],
            Rejected => &[],
        }
    }

    fn label(self) -> &'static str {
        use ReceivingStatus::*;
        match self {
            Draft => "draft",
            Received => "received",
            Inspected => "inspected",
            Approved => "approved",
            Rejected => "rejected",
        }
    }
}

impl Workflow for ShipmentStatus {
    const DOCUMENT: &'static str = "Expedição";

    fn allowed_transitions(self) -> &'static [Self] {
        use ShipmentStatus::*;
        match self {
            Draft => &[Packed, Cancelled],
            Packed => &[Shipped, Cancelled],
            Shipped => &[Delivered],
            Delivered => &[],
            Cancelled => &[],
        }
    }

    fn label(self) -> &'static str {
        use ShipmentStatus::*;
        match self {
            Draft => "draft",
            Packed => "packed",
            Shipped => "shipped",
            Delivered => "delivered",
            Cancelled => "cancelled",
        }
    }
}

impl Workflow for ReturnStatus {
    const DOCUMENT: &'static str = "Devolução";

    fn allowed_transitions(self) -> &'static [Self] {
        use ReturnStatus::*;
        match self {
            Received => &[Inspected],
            Inspected => &[Approved, Rejected],
            Approved => &[Processed],
            Rejected => &[],
            Processed => &[],
        }
    }

    fn label(self) -> &'static str {
        use ReturnStatus::*;
        match self {
            Received => "received",
            Inspected => "inspected",
            Approved => "approved",
            Rejected => "rejected",
            Processed => "processed",
        }
    }
}

impl Workflow for OrderStatus {
    const DOCUMENT: &'static str = "Pedido";

    fn allowed_transitions(self) -> &'static [Self] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[Processing, Cancelled],
            Processing => &[Shipped, Cancelled],
            Shipped => &[Delivered],
            Delivered => &[],
            Cancelled => &[],
        }
    }

    fn label(self) -> &'static str {
        use OrderStatus::*;
        match self {
            Pending => "pending",
            Confirmed => "confirmed",
            Processing => "processing",
            Shipped => "shipped",
            Delivered => "delivered",
            Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_executes_only_from_approved() {
        use TransferStatus::*;
        assert!(!Pending.can_transition(Completed));
        assert!(Approved.can_transition(Completed));
        assert!(InTransit.can_transition(Completed));
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn transfer_cancel_window() {
        use TransferStatus::*;
        assert!(Pending.can_transition(Cancelled));
        assert!(Approved.can_transition(Cancelled));
        assert!(!InTransit.can_transition(Cancelled));
        assert!(!Completed.can_transition(Cancelled));
    }

    #[test]
    fn receiving_is_linear_until_inspection() {
        use ReceivingStatus::*;
        assert!(Draft.can_transition(Received));
        assert!(!Draft.can_transition(Approved));
        assert!(Received.can_transition(Inspected));
        assert!(Inspected.can_transition(Approved));
        assert!(Inspected.can_transition(Rejected));
        assert!(Approved.is_terminal());
        assert!(Rejected.is_terminal());
    }

    #[test]
    fn shipment_cannot_skip_packing() {
        use ShipmentStatus::*;
        assert!(!Draft.can_transition(Shipped));
        assert!(Draft.can_transition(Packed));
        assert!(Packed.can_transition(Shipped));
        assert!(Shipped.can_transition(Delivered));
        assert!(!Shipped.can_transition(Cancelled));
        assert!(Delivered.is_terminal());
    }

    #[test]
    fn return_processing_requires_approval() {
        use ReturnStatus::*;
        assert!(!Received.can_transition(Processed));
        assert!(!Inspected.can_transition(Processed));
        assert!(Approved.can_transition(Processed));
        assert!(Rejected.is_terminal());
    }

    #[test]
    fn order_lifecycle() {
        use OrderStatus::*;
        assert!(Pending.can_transition(Confirmed));
        assert!(Confirmed.can_transition(Processing));
        assert!(Processing.can_transition(Shipped));
        assert!(Shipped.can_transition(Delivered));
        assert!(!Pending.can_transition(Shipped));
        assert!(Processing.can_transition(Cancelled));
        assert!(!Shipped.can_transition(Cancelled));
    }

    #[test]
    fn ensure_reports_both_states() {
        use TransferStatus::*;
        let err = Pending.ensure(Completed).unwrap_err();
        match err {
            AppError::PreconditionFailed(msg) => {
                assert!(msg.contains("pending"));
                assert!(msg.contains("completed"));
            }
            _ => panic!("esperava erro de pré-condição"),
        }
    }
}
