//! Subscription admin views

mod api;
mod components;

pub use components::{PaymentsToggleButton, SubscriptionList};

use leptos::prelude::*;

use checkout_core::admin::PaymentsToggle;

/// Subscription list with its payments switches
#[component]
pub fn SubscriptionAdmin(currency: String) -> impl IntoView {
    view! {
        <div class="subscription-admin">
            <div class="actions">
                <PaymentsToggleButton toggle=PaymentsToggle::CoursePayments />
                <PaymentsToggleButton toggle=PaymentsToggle::CourseIndividualPayments />
            </div>
            <SubscriptionList currency=currency />
        </div>
    }
}
