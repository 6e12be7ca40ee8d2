//! Order status projection
//!
//! Pure mapping from a fetched order to what the tracking views display.

use rust_decimal::Decimal;
use shared::models::{Order, OrderStatus, PaymentMethod, PaymentStatus};

/// Kitchen stepper stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Placed,
    Preparing,
    Ready,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Placed => "Order Placed",
            Stage::Preparing => "Preparing",
            Stage::Ready => "Ready to Serve",
        }
    }
}

/// Stepper layout
///
/// `TwoStage` folds "preparing" into "placed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageModel {
    #[default]
    ThreeStage,
    TwoStage,
}

impl StageModel {
    pub fn stages(&self) -> &'static [Stage] {
        match self {
            StageModel::ThreeStage => &[Stage::Placed, Stage::Preparing, Stage::Ready],
            StageModel::TwoStage => &[Stage::Placed, Stage::Ready],
        }
    }

    pub fn stage_count(&self) -> usize {
        self.stages().len()
    }

    /// Stage index for a status, −1 when the status has no stage.
    pub fn stage_index(&self, status: &OrderStatus) -> i32 {
        let last = self.stage_count() as i32 - 1;
        match (self, status) {
            (_, OrderStatus::Pending | OrderStatus::Paid) => 0,
            (StageModel::ThreeStage, OrderStatus::Preparing) => 1,
            (StageModel::TwoStage, OrderStatus::Preparing) => 0,
            (_, OrderStatus::Ready | OrderStatus::Completed) => last,
            _ => -1,
        }
    }
}

/// Electronic payment banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentBanner {
    Success,
    Processing,
    Failure,
}

/// What a tracking view shows for one order
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    /// Customer must pay a cashier; replaces the stepper entirely
    AwaitingCashPayment {
        total_price: Decimal,
        order_number: String,
    },
    Tracking {
        stage_index: i32,
        stage_count: usize,
        banner: Option<PaymentBanner>,
    },
}

impl DisplayState {
    /// Stepper fill in [0, 1]; zero while waiting for cash
    pub fn progress_fraction(&self) -> f64 {
        match self {
            DisplayState::AwaitingCashPayment { .. } => 0.0,
            DisplayState::Tracking {
                stage_index,
                stage_count,
                ..
            } => progress_fraction(*stage_index, *stage_count),
        }
    }

    pub fn banner(&self) -> Option<PaymentBanner> {
        match self {
            DisplayState::Tracking { banner, .. } => *banner,
            DisplayState::AwaitingCashPayment { .. } => None,
        }
    }
}

/// Project an order for display (first matching rule wins).
pub fn project_status(order: &Order, model: StageModel) -> DisplayState {
    if order.status == OrderStatus::WaitingForCash {
        return DisplayState::AwaitingCashPayment {
            total_price: order.total_price,
            order_number: order.order_number.clone(),
        };
    }

    DisplayState::Tracking {
        stage_index: model.stage_index(&order.status),
        stage_count: model.stage_count(),
        banner: payment_banner(order),
    }
}

fn payment_banner(order: &Order) -> Option<PaymentBanner> {
    if order.payment_method != PaymentMethod::Paymob {
        return None;
    }
    match order.payment_status {
        PaymentStatus::Paid => Some(PaymentBanner::Success),
        PaymentStatus::Failed => Some(PaymentBanner::Failure),
        PaymentStatus::Unpaid if order.status == OrderStatus::AwaitingPayment => {
            Some(PaymentBanner::Processing)
        }
        _ => None,
    }
}

/// `max(0, index) / (count − 1)`, clamped into [0, 1]
pub fn progress_fraction(stage_index: i32, stage_count: usize) -> f64 {
    if stage_count < 2 {
        return if stage_index >= 0 { 1.0 } else { 0.0 };
    }
    (f64::from(stage_index.max(0)) / (stage_count - 1) as f64).clamp(0.0, 1.0)
}

/// Per-stage flags for rendering the stepper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageState {
    pub stage: Stage,
    pub completed: bool,
    pub current: bool,
}

pub fn stage_states(model: StageModel, stage_index: i32) -> Vec<StageState> {
    model
        .stages()
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            let i = i as i32;
            StageState {
                stage: *stage,
                completed: i <= stage_index,
                current: i == stage_index,
            }
        })
        .collect()
}

/// Caption under the stepper on the single-order view
pub fn status_message(status: &OrderStatus) -> Option<&'static str> {
    match status {
        OrderStatus::Pending => Some("Waiting for kitchen confirmation..."),
        OrderStatus::Preparing => Some("Barista is brewing your coffee..."),
        OrderStatus::Ready => Some("Order Ready! Please pick it up from the counter."),
        OrderStatus::Completed => Some("Order picked up. Enjoy!"),
        _ => None,
    }
}
