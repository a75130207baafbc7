//! Subscription admin views
//!
//! Row formatting for the subscription list and the course-payments toggles.
//! Display context (currency) is passed in, never read from globals.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Subscription list endpoint
pub const SUBSCRIPTIONS_PATH: &str = "/api/v2/subscriptions/";

/// Course payments status endpoint
pub const COURSE_PAYMENTS_STATUS_PATH: &str = "/api/v2/subscriptions/course_payments_status/";

/// Course payments toggle endpoint, POST only
pub const TOGGLE_COURSE_PAYMENTS_PATH: &str = "/api/v2/subscriptions/toggle_course_payments/";

/// Course individual payments toggle endpoint
pub const TOGGLE_INDIVIDUAL_PAYMENTS_PATH: &str =
    "/api/v2/subscriptions/toggle_course_individual_payments/";

/// Cookie carrying the CSRF token for admin API calls
pub const CSRF_COOKIE: &str = "ecommerce_csrftoken";

/// Header the admin API expects the CSRF token in
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Find a cookie's value in a `document.cookie` string
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}

/// Subscription as returned by the admin API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: u64,
    pub title: String,
    pub subscription_type: String,
    pub subscription_actual_price: Decimal,
    pub subscription_price: Decimal,
    pub subscription_status: bool,
    pub date_created: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub course_payments: bool,
}

fn default_true() -> bool {
    true
}

/// List endpoint body, paginated or bare
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum SubscriptionListing {
    Page { results: Vec<SubscriptionRecord> },
    Bare(Vec<SubscriptionRecord>),
}

impl SubscriptionListing {
    pub fn parse(body: &str) -> crate::Result<Vec<SubscriptionRecord>> {
        Ok(match serde_json::from_str(body)? {
            SubscriptionListing::Page { results } => results,
            SubscriptionListing::Bare(records) => records,
        })
    }
}

/// Subscription plan kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriptionType {
    LimitedAccess,
    FullAccessCourses,
    FullAccessTimePeriod,
    LifetimeAccess,
}

impl SubscriptionType {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "limited-access" => Some(SubscriptionType::LimitedAccess),
            "full-access-courses" => Some(SubscriptionType::FullAccessCourses),
            "full-access-time-period" => Some(SubscriptionType::FullAccessTimePeriod),
            "lifetime-access" => Some(SubscriptionType::LifetimeAccess),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubscriptionType::LimitedAccess => "Limited Access",
            SubscriptionType::FullAccessCourses => "Full Access (Courses)",
            SubscriptionType::FullAccessTimePeriod => "Full Access (Time Period)",
            SubscriptionType::LifetimeAccess => "Lifetime Access",
        }
    }
}

/// Label for a slug; unknown slugs render empty
pub fn format_subscription_type(slug: &str) -> &'static str {
    SubscriptionType::from_slug(slug).map_or("", |t| t.label())
}

/// Values the list renders with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListContext {
    /// Currency code appended to prices
    pub currency: String,
}

/// One display row of the subscription table
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubscriptionRow {
    pub id: u64,
    pub title: String,
    pub subscription_type: String,
    pub subscription_actual_price: String,
    pub subscription_price: String,
    pub subscription_status: String,
    pub date_created: String,
    pub course_payments: bool,
}

impl SubscriptionRow {
    pub fn from_record(record: &SubscriptionRecord, ctx: &ListContext) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            subscription_type: format_subscription_type(&record.subscription_type).to_string(),
            subscription_actual_price: format!("{} {}", record.subscription_actual_price, ctx.currency),
            subscription_price: format!("{} {}", record.subscription_price, ctx.currency),
            subscription_status: if record.subscription_status { "Active" } else { "Inactive" }.into(),
            date_created: record.date_created.format("%B %d, %Y, %-I:%M %p").to_string(),
            course_payments: record.course_payments,
        }
    }

    /// Link target of the title cell
    pub fn detail_path(&self) -> String {
        format!("/subscriptions/{}/", self.id)
    }
}

/// Answer of the course payments status endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct CoursePaymentsStatus {
    pub course_payments: bool,
}

/// Answer of the individual payments toggle endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct IndividualPaymentsToggle {
    pub course_individual_payments: bool,
}

/// HTTP method of an admin API call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminMethod {
    Get,
    Post,
}

/// Which payments switch a button controls
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentsToggle {
    CoursePayments,
    CourseIndividualPayments,
}

impl PaymentsToggle {
    /// Button text offering the opposite of the current state
    pub fn button_label(&self, enabled: bool) -> &'static str {
        match (self, enabled) {
            (PaymentsToggle::CoursePayments, true) => "Disable Course Payments",
            (PaymentsToggle::CoursePayments, false) => "Enable Course Payments",
            (PaymentsToggle::CourseIndividualPayments, true) => "Disable Course Individual Payments",
            (PaymentsToggle::CourseIndividualPayments, false) => "Enable Course Individual Payments",
        }
    }

    /// Endpoint reporting the current state, if the switch has one
    pub fn status_path(&self) -> Option<&'static str> {
        match self {
            PaymentsToggle::CoursePayments => Some(COURSE_PAYMENTS_STATUS_PATH),
            PaymentsToggle::CourseIndividualPayments => None,
        }
    }

    /// Call that flips the switch; both answer with the new state
    pub fn flip_request(&self) -> (AdminMethod, &'static str) {
        match self {
            PaymentsToggle::CoursePayments => (AdminMethod::Post, TOGGLE_COURSE_PAYMENTS_PATH),
            PaymentsToggle::CourseIndividualPayments => (AdminMethod::Get, TOGGLE_INDIVIDUAL_PAYMENTS_PATH),
        }
    }

    /// Read the switch state out of the endpoint's JSON body
    pub fn parse_state(&self, body: &str) -> crate::Result<bool> {
        Ok(match self {
            PaymentsToggle::CoursePayments => {
                serde_json::from_str::<CoursePaymentsStatus>(body)?.course_payments
            }
            PaymentsToggle::CourseIndividualPayments => {
                serde_json::from_str::<IndividualPaymentsToggle>(body)?.course_individual_payments
            }
        })
    }
}
