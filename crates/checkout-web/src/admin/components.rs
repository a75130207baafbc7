//! Admin UI Components

use leptos::prelude::*;

use checkout_core::admin::{ListContext, PaymentsToggle, SubscriptionRow};

use super::api;

/// Subscription table
#[component]
pub fn SubscriptionList(currency: String) -> impl IntoView {
    let (rows, set_rows) = signal(Vec::<SubscriptionRow>::new());
    let (error, set_error) = signal(None::<String>);
    let (loading, set_loading) = signal(true);

    let ctx = ListContext { currency };
    leptos::task::spawn_local(async move {
        match api::fetch_subscriptions().await {
            Ok(records) => {
                set_rows.set(records.iter().map(|r| SubscriptionRow::from_record(r, &ctx)).collect());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Subscription list failed to load");
                set_error.set(Some(e));
            }
        }
        set_loading.set(false);
    });

    view! {
        <div class="subscription-list">
            <Show when=move || error.get().is_some()>
                <div class="alert alert-danger">{move || error.get().unwrap_or_default()}</div>
            </Show>
            <table class="table table-striped">
                <thead>
                    <tr>
                        <th>"Title"</th>
                        <th>"Type"</th>
                        <th>"Actual Price"</th>
                        <th>"Price"</th>
                        <th>"Status"</th>
                        <th>"Date Created"</th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || rows.get()
                        key=|row| row.id
                        children=move |row| view! { <SubscriptionRowView row=row /> }
                    />
                </tbody>
            </table>
            <Show when=move || loading.get()>
                <div class="loading">"..."</div>
            </Show>
        </div>
    }
}

#[component]
fn SubscriptionRowView(row: SubscriptionRow) -> impl IntoView {
    let href = row.detail_path();
    view! {
        <tr>
            <td><a href=href>{row.title}</a></td>
            <td>{row.subscription_type}</td>
            <td>{row.subscription_actual_price}</td>
            <td>{row.subscription_price}</td>
            <td>{row.subscription_status}</td>
            <td>{row.date_created}</td>
        </tr>
    }
}

/// Enable/Disable button for a payments switch
///
/// Reads the current state on mount when the switch has a status endpoint,
/// and flips it after confirmation.
#[component]
pub fn PaymentsToggleButton(toggle: PaymentsToggle, #[prop(optional)] initial: Option<bool>) -> impl IntoView {
    let (enabled, set_enabled) = signal(initial.unwrap_or(true));
    let (busy, set_busy) = signal(false);

    leptos::task::spawn_local(async move {
        match api::fetch_toggle_state(toggle).await {
            Some(Ok(state)) => set_enabled.set(state),
            Some(Err(e)) => tracing::warn!(error = %e, "Payments status unavailable"),
            None => {}
        }
    });

    let on_click = move |_| {
        if busy.get() {
            return;
        }
        let confirmed = web_sys::window()
            .and_then(|w| w.confirm_with_message(toggle.button_label(enabled.get())).ok())
            .unwrap_or(false);
        if !confirmed {
            return;
        }

        set_busy.set(true);
        leptos::task::spawn_local(async move {
            match api::flip_toggle(toggle).await {
                Ok(state) => set_enabled.set(state),
                Err(e) => tracing::warn!(error = %e, "Toggle request failed"),
            }
            set_busy.set(false);
        });
    };

    let name = match toggle {
        PaymentsToggle::CoursePayments => "course-payments",
        PaymentsToggle::CourseIndividualPayments => "course-individual-payments",
    };

    view! {
        <button class="btn btn-default" name=name disabled=move || busy.get() on:click=on_click>
            {move || toggle.button_label(enabled.get())}
        </button>
    }
}
